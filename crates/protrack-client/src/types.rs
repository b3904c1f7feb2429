//! Request and response types for the protrack API.
//!
//! These types mirror the server's API contract: camelCase field names on
//! the wire, kebab-case protocol status values.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Auth
// ─────────────────────────────────────────────────────────────────────────────

/// An authenticated user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// User ID.
    pub id: String,
    /// Login name.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Role, when the server assigns one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// Credentials for a login request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginCredentials {
    pub username: String,
    pub password: String,
}

/// Payload for a registration request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterData {
    pub username: String,
    pub email: String,
    pub password: String,
    pub name: String,
}

/// Response to a successful login or registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    /// The authenticated user.
    pub user: User,
    /// Bearer token for subsequent requests.
    pub token: String,
    /// Refresh token, when the server issues one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

/// Request body for the token refresh endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RefreshRequest {
    pub refresh_token: String,
}

/// Request body for a password change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Request body for a password reset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
}

/// Envelope for the current-user endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct UserResponse {
    pub user: User,
}

/// Envelope for the refresh endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct TokenResponse {
    pub token: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Protocols
// ─────────────────────────────────────────────────────────────────────────────

/// Lifecycle status of a protocol record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProtocolStatus {
    Uploaded,
    VerificationPending,
    Verified,
    Duplicate,
}

impl ProtocolStatus {
    /// The status a record is created with.
    ///
    /// `VerificationPending` if and only if a non-empty externally-supplied
    /// protocol identifier was present at creation; otherwise `Uploaded`.
    pub fn initial_for(protocol_id: Option<&str>) -> Self {
        match protocol_id {
            Some(id) if !id.trim().is_empty() => ProtocolStatus::VerificationPending,
            _ => ProtocolStatus::Uploaded,
        }
    }
}

/// A protocol record as held by the remote store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Protocol {
    /// Record ID.
    pub id: String,
    /// Principal investigator name.
    pub pi: String,
    /// Indication under study.
    pub indication: String,
    /// Enrollment start date (ISO 8601 date).
    pub enrollment_start_date: String,
    /// Whether this upload updates a previous version.
    pub is_updated: bool,
    /// Externally-supplied protocol identifier, if one was provided.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol_id: Option<String>,
    /// When the record was uploaded (ISO 8601).
    pub upload_date: String,
    /// Current lifecycle status.
    pub status: ProtocolStatus,
    /// Whether the verification agent has confirmed the record.
    pub agent_verified: bool,
    /// Owning user ID.
    pub user_id: String,
}

/// Fields supplied when creating a protocol record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProtocolData {
    pub pi: String,
    pub indication: String,
    pub enrollment_start_date: String,
    pub is_updated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol_id: Option<String>,
}

impl CreateProtocolData {
    /// The status the remote store assigns this record at creation.
    pub fn initial_status(&self) -> ProtocolStatus {
        ProtocolStatus::initial_for(self.protocol_id.as_deref())
    }
}

/// Fields that may be changed on an existing protocol record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProtocolData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pi: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indication: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrollment_start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_updated: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ProtocolStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_verified: Option<bool>,
}

/// Result of a duplicate check against an external protocol identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateCheck {
    pub is_duplicate: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub existing_protocol: Option<Protocol>,
}

/// Result of a document upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentUpload {
    pub document_url: String,
}

/// Envelope for single-protocol endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ProtocolResponse {
    pub protocol: Protocol,
}

/// Envelope for the list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ProtocolListResponse {
    pub protocols: Vec<Protocol>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_status_invariant() {
        assert_eq!(
            ProtocolStatus::initial_for(Some("NCT-001")),
            ProtocolStatus::VerificationPending
        );
        assert_eq!(ProtocolStatus::initial_for(None), ProtocolStatus::Uploaded);
        assert_eq!(ProtocolStatus::initial_for(Some("")), ProtocolStatus::Uploaded);
        assert_eq!(
            ProtocolStatus::initial_for(Some("   ")),
            ProtocolStatus::Uploaded
        );
    }

    #[test]
    fn test_status_wire_values() {
        assert_eq!(
            serde_json::to_string(&ProtocolStatus::VerificationPending).unwrap(),
            "\"verification-pending\""
        );
        assert_eq!(
            serde_json::from_str::<ProtocolStatus>("\"duplicate\"").unwrap(),
            ProtocolStatus::Duplicate
        );
    }

    #[test]
    fn test_protocol_camel_case_wire_format() {
        let json = r#"{
            "id": "p1",
            "pi": "Dr. Chen",
            "indication": "Hypertension",
            "enrollmentStartDate": "2025-03-01",
            "isUpdated": false,
            "protocolId": "NCT-001",
            "uploadDate": "2025-02-01T12:00:00Z",
            "status": "verification-pending",
            "agentVerified": false,
            "userId": "u1"
        }"#;

        let protocol: Protocol = serde_json::from_str(json).unwrap();
        assert_eq!(protocol.enrollment_start_date, "2025-03-01");
        assert_eq!(protocol.status, ProtocolStatus::VerificationPending);
        assert_eq!(protocol.protocol_id.as_deref(), Some("NCT-001"));
    }

    #[test]
    fn test_update_data_skips_absent_fields() {
        let update = UpdateProtocolData {
            agent_verified: Some(true),
            ..Default::default()
        };
        let json = serde_json::to_string(&update).unwrap();
        assert_eq!(json, r#"{"agentVerified":true}"#);
    }
}
