//! KYC document upload endpoints: single and batch.

use reqwest::multipart::{Form, Part};

use crate::client::BackofficeClient;
use crate::error::Result;
use crate::types::DataEnvelope;
use crate::types::kyc::*;

impl BackofficeClient {
    /// Upload a single KYC document.
    ///
    /// **Endpoint:** `POST /persons/upload-kyc`
    pub async fn upload_kyc(&self, item: &KycUploadItem) -> Result<UploadedDocument> {
        let mut form = Form::new()
            .part("file", file_part(&item.file)?)
            .text("documentType", item.document_type.as_server_str())
            .text("personPan", item.person_pan.clone());
        if let Some(name) = &item.person_name {
            form = form.text("personName", name.clone());
        }

        let env: DataEnvelope<UploadedDocument> =
            self.post_multipart("/persons/upload-kyc", form).await?;
        Ok(env.data)
    }

    /// Upload several KYC documents in one request.
    ///
    /// Items are independent: the response lists accepted and rejected
    /// documents separately and a rejection never rolls back the others.
    ///
    /// **Endpoint:** `POST /persons/upload-kyc/batch`
    pub async fn upload_kyc_batch(&self, items: &[KycUploadItem]) -> Result<KycBatchResponse> {
        let mut form = Form::new();
        for (i, item) in items.iter().enumerate() {
            form = form
                .part(format!("documents[{i}][file]"), file_part(&item.file)?)
                .text(
                    format!("documents[{i}][documentType]"),
                    item.document_type.as_server_str(),
                )
                .text(format!("documents[{i}][personPan]"), item.person_pan.clone())
                .text(
                    format!("documents[{i}][holderIndex]"),
                    item.holder_index.to_string(),
                );
            if let Some(name) = &item.person_name {
                form = form.text(format!("documents[{i}][personName]"), name.clone());
            }
        }

        tracing::debug!(count = items.len(), "uploading KYC batch");
        self.post_multipart("/persons/upload-kyc/batch", form).await
    }
}

fn file_part(file: &KycFile) -> Result<Part> {
    let part = Part::bytes(file.content.to_vec()).file_name(file.file_name.clone());
    Ok(match &file.mime_type {
        Some(mime) => part.mime_str(mime)?,
        None => part,
    })
}
