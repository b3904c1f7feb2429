//! Protocols API.

use crate::client::ApiClient;
use crate::error::Result;
use crate::types::{
    CreateProtocolData, DocumentUpload, DuplicateCheck, Protocol, ProtocolListResponse,
    ProtocolResponse, UpdateProtocolData,
};

/// Multipart field name the server expects for document uploads.
const DOCUMENT_FIELD: &str = "document";

/// Protocols API client.
pub struct ProtocolsApi {
    client: ApiClient,
}

impl ProtocolsApi {
    pub(crate) fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Create a protocol record.
    pub async fn create(&self, data: &CreateProtocolData) -> Result<Protocol> {
        let response: ProtocolResponse = self
            .client
            .post("/api/protocols", data)
            .await
            .map_err(|e| e.or_fallback("Failed to create protocol"))?;
        Ok(response.protocol)
    }

    /// List all protocol records.
    pub async fn list(&self) -> Result<Vec<Protocol>> {
        let response: ProtocolListResponse = self
            .client
            .get("/api/protocols")
            .await
            .map_err(|e| e.or_fallback("Failed to fetch protocols"))?;
        Ok(response.protocols)
    }

    /// Get a protocol record by ID.
    pub async fn get(&self, id: &str) -> Result<Protocol> {
        let response: ProtocolResponse = self
            .client
            .get(&format!("/api/protocols/{id}"))
            .await
            .map_err(|e| e.or_fallback("Failed to fetch protocol"))?;
        Ok(response.protocol)
    }

    /// Update a protocol record.
    pub async fn update(&self, id: &str, data: &UpdateProtocolData) -> Result<Protocol> {
        let response: ProtocolResponse = self
            .client
            .put(&format!("/api/protocols/{id}"), data)
            .await
            .map_err(|e| e.or_fallback("Failed to update protocol"))?;
        Ok(response.protocol)
    }

    /// Delete a protocol record.
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.client
            .delete(&format!("/api/protocols/{id}"))
            .await
            .map_err(|e| e.or_fallback("Failed to delete protocol"))
    }

    /// Record a verification outcome for a protocol.
    pub async fn verify(&self, id: &str) -> Result<Protocol> {
        let response: ProtocolResponse = self
            .client
            .post_empty(&format!("/api/protocols/{id}/verify"))
            .await
            .map_err(|e| e.or_fallback("Failed to verify protocol"))?;
        Ok(response.protocol)
    }

    /// Check whether an external protocol identifier already exists.
    pub async fn check_duplicate(&self, protocol_id: &str) -> Result<DuplicateCheck> {
        self.client
            .get(&format!("/api/protocols/check-duplicate/{protocol_id}"))
            .await
            .map_err(|e| e.or_fallback("Failed to check for duplicates"))
    }

    /// Upload the protocol document for a record.
    ///
    /// The only validation applied is presence: callers supply the bytes
    /// and a file name, and the server owns anything content-related.
    pub async fn upload_document(
        &self,
        id: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<DocumentUpload> {
        self.client
            .post_multipart(
                &format!("/api/protocols/{id}/upload-document"),
                DOCUMENT_FIELD,
                file_name,
                bytes,
            )
            .await
            .map_err(|e| e.or_fallback("Failed to upload document"))
    }
}
