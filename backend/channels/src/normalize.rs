//! Mapping Telegram messages onto pipeline events.

use claimdesk_commands::{looks_like_command, Command, CommandRegistry};
use claimdesk_core::{AdapterError, AdapterKind, Blob, InboundEvent, UserId};
use claimdesk_routing::messages::user_message;

/// A text message becomes a `command` event when it looks like one, and a
/// plain `text` event otherwise.
pub fn text_event(user: impl Into<UserId>, text: &str, registry: &CommandRegistry) -> InboundEvent {
    if looks_like_command(text, registry) {
        InboundEvent::command(user, text)
    } else {
        InboundEvent::text(user, text)
    }
}

pub(crate) fn blob(
    bytes: Vec<u8>,
    file_name: Option<String>,
    mime_type: Option<String>,
    caption: Option<&str>,
) -> Blob {
    let mut blob = Blob::new(bytes);
    blob.file_name = file_name;
    blob.mime_type = mime_type;
    blob.caption = caption.map(str::to_string);
    blob
}

/// Notice sent before handlers that usually take a while.
pub fn acknowledgement(command: &Command) -> Option<&'static str> {
    match command {
        Command::Extract => Some("Đang trích xuất văn bản..."),
        Command::Fetch(_) => Some("Đang tải nội dung trang..."),
        Command::Report => Some("Đang tạo báo cáo..."),
        Command::Start | Command::Chat(_) => None,
    }
}

/// Reply for a photo or document that could not be downloaded from Telegram.
pub fn download_failure_reply() -> String {
    user_message(&AdapterError::transient(
        AdapterKind::Extraction,
        "không tải được tệp từ Telegram",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use claimdesk_core::EventKind;

    #[test]
    fn test_text_event_kinds() {
        let registry = CommandRegistry::new();
        assert_eq!(text_event(1i64, "/start", &registry).kind, EventKind::Command);
        assert_eq!(text_event(1i64, "tạo báo cáo", &registry).kind, EventKind::Command);
        assert_eq!(text_event(1i64, "xe bị trầy cửa", &registry).kind, EventKind::Text);
    }

    #[test]
    fn test_blob_keeps_caption() {
        let blob = blob(vec![1, 2], Some("a.pdf".into()), Some("application/pdf".into()), Some("ghi chú"));
        assert_eq!(blob.caption.as_deref(), Some("ghi chú"));
        assert_eq!(blob.file_name.as_deref(), Some("a.pdf"));
        assert_eq!(blob.len(), 2);
    }

    #[test]
    fn test_download_failure_reply_asks_to_retry() {
        let reply = download_failure_reply();
        assert!(reply.starts_with("Không trích xuất được nội dung"));
        assert!(reply.contains("không tải được tệp"));
        assert!(reply.ends_with(claimdesk_routing::messages::RETRY_LATER));
    }

    #[test]
    fn test_acknowledgements() {
        assert!(acknowledgement(&Command::Report).is_some());
        assert!(acknowledgement(&Command::Fetch("http://x".into())).is_some());
        assert!(acknowledgement(&Command::Chat("hi".into())).is_none());
        assert!(acknowledgement(&Command::Start).is_none());
    }
}
