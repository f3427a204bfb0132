use async_trait::async_trait;

use crate::error::AdapterError;
use crate::types::{Blob, Turn};

/// Turns image or document bytes into text (OCR, PDF text layer, ...).
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Backend name for logging (e.g., "tesseract").
    fn name(&self) -> &str;

    /// Extract the text content of `blob`. Failures are `AdapterError::Extraction`.
    async fn extract(&self, blob: &Blob) -> Result<String, AdapterError>;
}

/// Retrieves a web page and returns its normalized text.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch `url`. Failures are `AdapterError::Fetch`.
    async fn fetch(&self, url: &str) -> Result<String, AdapterError>;
}

/// Request to a chat-completion provider.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Prepended as a `system` message when present.
    pub system_prompt: Option<String>,
    /// Conversation turns in chronological order.
    pub turns: Vec<Turn>,
    /// Overrides the provider's default completion budget.
    pub max_tokens: Option<u32>,
}

impl CompletionRequest {
    pub fn new(turns: Vec<Turn>) -> Self {
        Self {
            system_prompt: None,
            turns,
            max_tokens: None,
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        let prompt = prompt.into();
        if !prompt.trim().is_empty() {
            self.system_prompt = Some(prompt);
        }
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Trait for language-model providers.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Provider name (e.g., "openai").
    fn name(&self) -> &str;

    /// Generate the next assistant reply. Failures are `AdapterError::Completion`.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, AdapterError>;
}

/// Produces the watermarked report document.
#[async_trait]
pub trait ReportRenderer: Send + Sync {
    /// Render `body` under `title`; returns the document bytes.
    /// Failures are `AdapterError::Render`.
    async fn render(&self, title: &str, body: &str) -> Result<Vec<u8>, AdapterError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_system_prompt_is_dropped() {
        let req = CompletionRequest::new(vec![]).with_system_prompt("   ");
        assert!(req.system_prompt.is_none());
        let req = CompletionRequest::new(vec![]).with_system_prompt("Trả lời ngắn gọn");
        assert_eq!(req.system_prompt.as_deref(), Some("Trả lời ngắn gọn"));
    }
}
