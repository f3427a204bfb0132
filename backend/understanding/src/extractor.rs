//! The extractor the router talks to: picks PDF, OCR or plain decoding by
//! format and cleans up whatever comes back.

use std::sync::Arc;

use async_trait::async_trait;
use claimdesk_core::{AdapterError, AdapterKind, Blob, TextExtractor};
use tracing::info;

use crate::doc_parse::PdfTextExtractor;
use crate::mime_detect::{detect_format, BlobFormat};
use crate::sanitize::sanitize_extracted_text;

pub struct CompositeExtractor {
    pdf: Arc<dyn TextExtractor>,
    image: Arc<dyn TextExtractor>,
}

impl CompositeExtractor {
    /// PDFs go through the text layer, images through `image`.
    pub fn new(image: Arc<dyn TextExtractor>) -> Self {
        Self {
            pdf: Arc::new(PdfTextExtractor::new()),
            image,
        }
    }

    pub fn with_pdf(mut self, pdf: Arc<dyn TextExtractor>) -> Self {
        self.pdf = pdf;
        self
    }
}

#[async_trait]
impl TextExtractor for CompositeExtractor {
    fn name(&self) -> &str {
        "composite"
    }

    async fn extract(&self, blob: &Blob) -> Result<String, AdapterError> {
        if blob.is_empty() {
            return Err(AdapterError::fatal(AdapterKind::Extraction, "the file is empty"));
        }

        let format = detect_format(blob);
        info!(?format, bytes = blob.len(), "extracting text");
        let raw = match format {
            BlobFormat::Pdf => self.pdf.extract(blob).await?,
            BlobFormat::Image => self.image.extract(blob).await?,
            BlobFormat::PlainText => String::from_utf8_lossy(&blob.bytes).into_owned(),
            BlobFormat::Unsupported => {
                return Err(AdapterError::fatal(
                    AdapterKind::Extraction,
                    format!(
                        "unsupported file type{}",
                        blob.mime_type.as_deref().map(|m| format!(" ({m})")).unwrap_or_default()
                    ),
                ))
            }
        };

        let text = sanitize_extracted_text(&raw);
        if text.is_empty() {
            return Err(AdapterError::fatal(
                AdapterKind::Extraction,
                "no readable text was found in the file",
            ));
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use claimdesk_core::mock::MockExtractor;

    fn composite(image: Arc<MockExtractor>, pdf: Arc<MockExtractor>) -> CompositeExtractor {
        CompositeExtractor::new(image).with_pdf(pdf)
    }

    #[tokio::test]
    async fn test_routes_images_to_ocr() {
        let image = Arc::new(MockExtractor::returning("  Số   hồ sơ: 42 \n"));
        let pdf = Arc::new(MockExtractor::returning("unused"));
        let out = composite(image.clone(), pdf.clone())
            .extract(&Blob::new(vec![0xFF, 0xD8, 0xFF]).with_mime_type("image/jpeg"))
            .await
            .unwrap();
        assert_eq!(out, "Số hồ sơ: 42");
        assert_eq!(image.calls(), 1);
        assert_eq!(pdf.calls(), 0);
    }

    #[tokio::test]
    async fn test_routes_pdfs_to_text_layer() {
        let image = Arc::new(MockExtractor::returning("unused"));
        let pdf = Arc::new(MockExtractor::returning("Hợp đồng bảo hiểm"));
        let out = composite(image.clone(), pdf.clone())
            .extract(&Blob::new(b"%PDF-1.5".to_vec()).with_file_name("hop_dong.pdf"))
            .await
            .unwrap();
        assert_eq!(out, "Hợp đồng bảo hiểm");
        assert_eq!(pdf.calls(), 1);
        assert_eq!(image.calls(), 0);
    }

    #[tokio::test]
    async fn test_plain_text_is_decoded_directly() {
        let image = Arc::new(MockExtractor::returning("unused"));
        let pdf = Arc::new(MockExtractor::returning("unused"));
        let out = composite(image.clone(), pdf.clone())
            .extract(&Blob::new("ghi chú\n".as_bytes().to_vec()).with_file_name("notes.txt"))
            .await
            .unwrap();
        assert_eq!(out, "ghi chú");
        assert_eq!(image.calls() + pdf.calls(), 0);
    }

    #[tokio::test]
    async fn test_blank_output_is_an_error() {
        let image = Arc::new(MockExtractor::returning("   \n\t"));
        let pdf = Arc::new(MockExtractor::returning("unused"));
        let err = composite(image, pdf)
            .extract(&Blob::new(vec![0x89, b'P', b'N', b'G']))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), AdapterKind::Extraction);
        assert!(!err.retryable());
    }

    #[tokio::test]
    async fn test_unsupported_format_is_rejected() {
        let image = Arc::new(MockExtractor::returning("unused"));
        let pdf = Arc::new(MockExtractor::returning("unused"));
        let err = composite(image, pdf)
            .extract(&Blob::new(vec![0x00, 0xFF, 0xFE]).with_mime_type("application/zip"))
            .await
            .unwrap_err();
        assert!(err.cause().contains("unsupported"));
    }

    #[tokio::test]
    async fn test_ocr_failure_passes_through() {
        let image = Arc::new(MockExtractor::failing(AdapterError::transient(
            AdapterKind::Extraction,
            "engine busy",
        )));
        let pdf = Arc::new(MockExtractor::returning("unused"));
        let err = composite(image, pdf)
            .extract(&Blob::new(vec![0xFF, 0xD8, 0xFF]))
            .await
            .unwrap_err();
        assert!(err.retryable());
    }
}
