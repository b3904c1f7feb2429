//! Route guard: allow/redirect decision evaluated before a page is served.
//!
//! The guard only inspects credential *presence* (via the cookie mirror);
//! an expired-but-present token passes here and is caught later by the
//! transport layer's 401 handling. The page under `/` performs its own
//! client-side check; the two layers are deliberately independent.

/// Paths accessible without a credential.
const PUBLIC_PATHS: &[&str] = &["/", "/login"];

/// Path prefixes the guard never inspects (API routes and static assets).
const BYPASS_PREFIXES: &[&str] = &["/api", "/_next/static", "/_next/image", "/favicon.ico"];

/// Outcome of evaluating the guard for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Serve the requested page.
    Allow,
    /// Redirect to `/login`.
    RedirectToLogin,
    /// Redirect to `/`.
    RedirectHome,
}

/// Whether the guard applies to this path at all.
pub fn is_guarded(path: &str) -> bool {
    !BYPASS_PREFIXES.iter().any(|p| path.starts_with(p))
}

/// Evaluate the guard for a request path and credential presence.
pub fn evaluate(path: &str, token_present: bool) -> GuardDecision {
    if !is_guarded(path) {
        return GuardDecision::Allow;
    }

    let is_public = PUBLIC_PATHS.contains(&path);

    // Protected route without a credential.
    if !is_public && !token_present {
        return GuardDecision::RedirectToLogin;
    }

    // An authenticated user re-visiting a public page other than home.
    if is_public && token_present && path != "/" {
        return GuardDecision::RedirectHome;
    }

    GuardDecision::Allow
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protected_paths_without_token_redirect_to_login() {
        for path in ["/protocols", "/protocols/42", "/settings", "/anything"] {
            assert_eq!(
                evaluate(path, false),
                GuardDecision::RedirectToLogin,
                "path: {path}"
            );
        }
    }

    #[test]
    fn test_protected_paths_with_token_allow() {
        for path in ["/protocols", "/protocols/42", "/settings"] {
            assert_eq!(evaluate(path, true), GuardDecision::Allow, "path: {path}");
        }
    }

    #[test]
    fn test_login_with_token_redirects_home() {
        assert_eq!(evaluate("/login", true), GuardDecision::RedirectHome);
    }

    #[test]
    fn test_login_without_token_allows() {
        assert_eq!(evaluate("/login", false), GuardDecision::Allow);
    }

    #[test]
    fn test_root_is_always_allowed() {
        // "/" is public regardless of credential state; the page itself
        // re-checks on the client side.
        assert_eq!(evaluate("/", false), GuardDecision::Allow);
        assert_eq!(evaluate("/", true), GuardDecision::Allow);
    }

    #[test]
    fn test_bypass_prefixes_are_not_guarded() {
        for path in [
            "/api/protocols",
            "/_next/static/chunk.js",
            "/_next/image?url=x",
            "/favicon.ico",
        ] {
            assert!(!is_guarded(path), "path: {path}");
            assert_eq!(evaluate(path, false), GuardDecision::Allow, "path: {path}");
        }
    }
}
