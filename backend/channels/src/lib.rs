use std::sync::Arc;

use async_trait::async_trait;
use claimdesk_routing::Router;

pub mod chunk;
pub mod media;
pub mod normalize;
pub mod telegram;

pub use chunk::{split_message, TELEGRAM_MESSAGE_LIMIT};
pub use media::MediaArchive;
pub use normalize::{acknowledgement, text_event};
pub use telegram::{TelegramAdapter, TelegramSettings};

/// A transport that feeds inbound messages to the router and delivers its results.
#[async_trait]
pub trait ChannelAdapter: Send + Sync {
    /// Human-readable adapter name for logging.
    fn name(&self) -> &str;

    /// Run until the transport shuts down (Ctrl-C for long polling).
    async fn start(&self, router: Arc<Router>) -> anyhow::Result<()>;
}
