//! Navigation seam for the transport's authentication-failure recovery.
//!
//! The 401 handler needs to force the application to the login view. That
//! side effect is injected as a trait object rather than reaching for any
//! global location state, so tests can observe it.

use parking_lot::RwLock;

/// Receiver for forced navigation.
pub trait Navigator: Send + Sync {
    /// Navigate the application to the given path.
    fn navigate(&self, path: &str);

    /// The path the application is currently on.
    fn current_path(&self) -> String;
}

/// Navigator that does nothing; suitable for headless use of the client.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn navigate(&self, _path: &str) {}

    fn current_path(&self) -> String {
        "/".to_string()
    }
}

/// Navigator that records every forced navigation.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    current: RwLock<String>,
    visits: RwLock<Vec<String>>,
}

impl RecordingNavigator {
    /// Create a recording navigator positioned at the given path.
    pub fn new(start: &str) -> Self {
        Self {
            current: RwLock::new(start.to_string()),
            visits: RwLock::new(Vec::new()),
        }
    }

    /// All paths navigated to, in order.
    pub fn visits(&self) -> Vec<String> {
        self.visits.read().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str) {
        self.visits.write().push(path.to_string());
        *self.current.write() = path.to_string();
    }

    fn current_path(&self) -> String {
        self.current.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_navigator_tracks_visits() {
        let nav = RecordingNavigator::new("/protocols");
        assert_eq!(nav.current_path(), "/protocols");

        nav.navigate("/login");
        assert_eq!(nav.current_path(), "/login");
        assert_eq!(nav.visits(), vec!["/login"]);
    }
}
