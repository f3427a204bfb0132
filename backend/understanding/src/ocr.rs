//! Local OCR through the Tesseract command line tool.
//!
//! The image is streamed on stdin and the recognized text is read back from
//! stdout, so nothing touches the filesystem.

use std::io::ErrorKind;
use std::process::Stdio;

use async_trait::async_trait;
use claimdesk_core::{AdapterError, AdapterKind, Blob, TextExtractor};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

pub struct TesseractOcr {
    binary: String,
    language: String,
}

impl TesseractOcr {
    pub fn new(binary: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            language: language.into(),
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }
}

impl Default for TesseractOcr {
    fn default() -> Self {
        Self::new("tesseract", "vie")
    }
}

#[async_trait]
impl TextExtractor for TesseractOcr {
    fn name(&self) -> &str {
        "tesseract"
    }

    async fn extract(&self, blob: &Blob) -> Result<String, AdapterError> {
        debug!(bytes = blob.len(), lang = %self.language, "running tesseract");

        let mut child = Command::new(&self.binary)
            .args(["stdin", "stdout", "-l", &self.language])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => AdapterError::fatal(
                    AdapterKind::Extraction,
                    format!("OCR engine '{}' is not installed", self.binary),
                ),
                _ => AdapterError::transient(
                    AdapterKind::Extraction,
                    format!("failed to start OCR engine: {e}"),
                ),
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            let bytes = blob.bytes.clone();
            tokio::spawn(async move {
                if let Err(e) = stdin.write_all(&bytes).await {
                    warn!(error = %e, "failed to stream image to tesseract");
                }
            });
        }

        let output = child.wait_with_output().await.map_err(|e| {
            AdapterError::transient(AdapterKind::Extraction, format!("OCR engine did not finish: {e}"))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AdapterError::fatal(
                AdapterKind::Extraction,
                format!("OCR engine exited with {}: {}", output.status, stderr.trim()),
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
