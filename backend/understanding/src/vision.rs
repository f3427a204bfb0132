//! OCR through an OpenAI-compatible vision model.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use claimdesk_core::{AdapterError, AdapterKind, Blob, TextExtractor};
use reqwest::Client;
use tracing::info;

use crate::http::{from_reqwest, from_status};

const TRANSCRIBE_PROMPT: &str = "Transcribe all text visible in this image exactly as written, \
preserving line breaks. Output only the transcribed text.";

pub struct VisionOcr {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl VisionOcr {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
        })
    }
}

#[async_trait]
impl TextExtractor for VisionOcr {
    fn name(&self) -> &str {
        "vision"
    }

    async fn extract(&self, blob: &Blob) -> Result<String, AdapterError> {
        info!(model = %self.model, bytes = blob.len(), "transcribing image via vision model");
        let mime = blob.mime_type.as_deref().unwrap_or("image/jpeg");
        let body = serde_json::json!({
            "model": self.model,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": TRANSCRIBE_PROMPT },
                    { "type": "image_url",
                      "image_url": { "url": format!("data:{};base64,{}", mime, STANDARD.encode(&blob.bytes)) } }
                ]
            }]
        });

        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| from_reqwest(AdapterKind::Extraction, &e))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(from_status(AdapterKind::Extraction, status, &text));
        }

        let json: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| from_reqwest(AdapterKind::Extraction, &e))?;
        json["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| AdapterError::fatal(AdapterKind::Extraction, "vision response had no content"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn ocr_for(server: &MockServer) -> VisionOcr {
        VisionOcr::new(server.uri(), "sk-test", "gpt-4o", Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_returns_transcription() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{ "message": { "role": "assistant", "content": "BIÊN BẢN GIÁM ĐỊNH" } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = ocr_for(&server)
            .extract(&Blob::new(vec![0xFF, 0xD8, 0xFF]).with_mime_type("image/jpeg"))
            .await
            .unwrap();
        assert_eq!(text, "BIÊN BẢN GIÁM ĐỊNH");
    }

    #[tokio::test]
    async fn test_rate_limit_is_retryable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .mount(&server)
            .await;

        let err = ocr_for(&server).extract(&Blob::new(vec![1, 2, 3])).await.unwrap_err();
        assert_eq!(err.kind(), AdapterKind::Extraction);
        assert!(err.retryable());
    }

    #[tokio::test]
    async fn test_bad_request_is_permanent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad image"))
            .mount(&server)
            .await;

        let err = ocr_for(&server).extract(&Blob::new(vec![1, 2, 3])).await.unwrap_err();
        assert!(!err.retryable());
        assert!(err.cause().contains("400"));
    }
}
