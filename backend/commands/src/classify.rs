//! Event classification: resolve an inbound event to exactly one [`Command`].
use claimdesk_core::{EventKind, InboundEvent};
use tracing::debug;

use crate::detection::detect_command;
use crate::registry::CommandRegistry;
use crate::types::Command;

/// Classify `event`; the first matching rule wins:
///
/// 1. a `command` event whose text starts with a known verb → that command;
/// 2. a `photo` or `document` event → [`Command::Extract`];
/// 3. anything else → [`Command::Chat`] with the raw text.
pub fn classify(event: &InboundEvent, registry: &CommandRegistry) -> Command {
    if event.kind == EventKind::Command {
        if let Some(inv) = event.text_content().and_then(|t| detect_command(t, registry)) {
            debug!(user = %event.user, verb = %inv.verb, "Classified as command");
            return inv.into();
        }
    }

    match event.kind {
        EventKind::Photo | EventKind::Document => Command::Extract,
        EventKind::Text | EventKind::Command => {
            Command::Chat(event.text_content().unwrap_or_default().to_string())
        }
    }
}
