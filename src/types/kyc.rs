#![allow(missing_docs)]
//! KYC document upload types.

use serde::{Deserialize, Serialize};

/// A document accepted by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedDocument {
    #[serde(alias = "documentId")]
    pub id: String,
    /// Raw server value; map with [`DocumentType::from_server`](crate::types::DocumentType::from_server).
    pub document_type: String,
    #[serde(default)]
    pub person_pan: Option<String>,
    #[serde(default)]
    pub holder_index: Option<usize>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default, alias = "fileUrl")]
    pub url: Option<String>,
}

/// A document rejected by the server, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedDocument {
    pub document_type: String,
    #[serde(default)]
    pub person_pan: Option<String>,
    #[serde(default)]
    pub holder_index: Option<usize>,
    #[serde(alias = "message", alias = "reason")]
    pub error: String,
}

/// Response of the single and batch upload endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KycBatchResponse {
    #[serde(default)]
    pub uploaded_documents: Vec<UploadedDocument>,
    #[serde(default)]
    pub failed_documents: Vec<FailedDocument>,
}

// ---------------------------------------------------------------------------
// Upload requests
// ---------------------------------------------------------------------------

/// File content of a KYC document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KycFile {
    pub file_name: String,
    pub mime_type: Option<String>,
    pub content: bytes::Bytes,
}

/// One document of an upload batch.
///
/// `person_pan` attributes the document to a party on the server and must
/// not be empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KycUploadItem {
    pub holder_index: usize,
    pub document_type: crate::types::enums::DocumentType,
    pub person_pan: String,
    pub person_name: Option<String>,
    pub file: KycFile,
}
