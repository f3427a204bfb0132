//! PDF text-layer extraction.

use async_trait::async_trait;
use claimdesk_core::{AdapterError, AdapterKind, Blob, TextExtractor};
use tracing::debug;

#[derive(Debug, Default, Clone, Copy)]
pub struct PdfTextExtractor;

impl PdfTextExtractor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TextExtractor for PdfTextExtractor {
    fn name(&self) -> &str {
        "pdf-text"
    }

    async fn extract(&self, blob: &Blob) -> Result<String, AdapterError> {
        debug!(bytes = blob.len(), "extracting pdf text layer");
        let bytes = blob.bytes.clone();
        // pdf-extract is CPU bound and may panic on malformed input.
        let result = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
            .await
            .map_err(|e| {
                AdapterError::fatal(AdapterKind::Extraction, format!("PDF parser aborted: {e}"))
            })?;

        result.map_err(|e| AdapterError::fatal(AdapterKind::Extraction, format!("unreadable PDF: {e}")))
    }
}
