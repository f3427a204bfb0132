//! Telegram long-polling binding.

use std::sync::Arc;

use async_trait::async_trait;
use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::{ChatAction, InputFile, Message};
use tracing::{debug, error, info, warn};

use claimdesk_commands::classify;
use claimdesk_core::{InboundEvent, OutboundResult};
use claimdesk_routing::Router;

use crate::chunk::{split_message, TELEGRAM_MESSAGE_LIMIT};
use crate::media::MediaArchive;
use crate::normalize::{acknowledgement, blob, download_failure_reply, text_event};
use crate::ChannelAdapter;

#[derive(Debug, Clone, Default)]
pub struct TelegramSettings {
    /// Where inbound photos and documents are copied, if anywhere.
    pub media_dir: Option<std::path::PathBuf>,
    pub ack_messages: bool,
}

pub struct TelegramAdapter {
    bot: Bot,
    settings: Arc<TelegramSettings>,
}

impl TelegramAdapter {
    pub fn new(token: impl Into<String>, settings: TelegramSettings) -> Self {
        Self {
            bot: Bot::new(token),
            settings: Arc::new(settings),
        }
    }
}

#[async_trait]
impl ChannelAdapter for TelegramAdapter {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn start(&self, router: Arc<Router>) -> anyhow::Result<()> {
        info!("Starting Telegram adapter");

        let handler = Update::filter_message().endpoint(
            |bot: Bot, msg: Message, router: Arc<Router>, settings: Arc<TelegramSettings>| async move {
                if let Err(e) = handle_message(&bot, &msg, &router, &settings).await {
                    error!(chat_id = msg.chat.id.0, error = %e, "Failed to handle Telegram message");
                }
                respond(())
            },
        );

        Dispatcher::builder(self.bot.clone(), handler)
            .dependencies(dptree::deps![router, self.settings.clone()])
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;

        info!("Telegram adapter stopped");
        Ok(())
    }
}

async fn download(bot: &Bot, file_id: &str) -> anyhow::Result<Vec<u8>> {
    let file = bot.get_file(file_id.to_string()).await?;
    let mut buf = Vec::with_capacity(file.size as usize);
    bot.download_file(&file.path, &mut buf).await?;
    Ok(buf)
}

async fn archive(settings: &TelegramSettings, user: &str, file_id: &str, name: Option<&str>, bytes: &[u8]) {
    if let Some(dir) = &settings.media_dir {
        let name = MediaArchive::file_name(user, file_id, name);
        MediaArchive::new(dir).store(&name, bytes).await;
    }
}

/// Turn a Telegram message into an event, downloading media when present.
async fn to_event(bot: &Bot, msg: &Message, router: &Router, settings: &TelegramSettings) -> anyhow::Result<Option<InboundEvent>> {
    let chat_id = msg.chat.id.0;
    let user = chat_id.to_string();

    if let Some(sizes) = msg.photo() {
        let Some(largest) = sizes.iter().max_by_key(|p| p.width * p.height) else {
            return Ok(None);
        };
        let bytes = download(bot, &largest.file.id).await?;
        archive(settings, &user, &largest.file.id, None, &bytes).await;
        let blob = blob(bytes, None, Some("image/jpeg".to_string()), msg.caption());
        return Ok(Some(InboundEvent::photo(chat_id, blob)));
    }

    if let Some(doc) = msg.document() {
        let bytes = download(bot, &doc.file.id).await?;
        archive(settings, &user, &doc.file.id, doc.file_name.as_deref(), &bytes).await;
        let mime = doc.mime_type.as_ref().map(|m| m.to_string());
        let blob = blob(bytes, doc.file_name.clone(), mime, msg.caption());
        return Ok(Some(InboundEvent::document(chat_id, blob)));
    }

    Ok(msg.text().map(|text| text_event(chat_id, text, router.registry())))
}

async fn handle_message(bot: &Bot, msg: &Message, router: &Router, settings: &TelegramSettings) -> anyhow::Result<()> {
    let chat = msg.chat.id;
    let event = match to_event(bot, msg, router, settings).await {
        Ok(Some(event)) => event,
        Ok(None) => {
            debug!(chat_id = chat.0, "Ignoring unsupported Telegram message");
            return Ok(());
        }
        Err(e) => {
            warn!(chat_id = chat.0, error = %e, "Failed to download attachment");
            bot.send_message(chat, download_failure_reply()).await?;
            return Ok(());
        }
    };

    if settings.ack_messages {
        let command = classify(&event, router.registry());
        if let Some(notice) = acknowledgement(&command) {
            bot.send_message(chat, notice).await?;
        }
    }
    if let Err(e) = bot.send_chat_action(chat, ChatAction::Typing).await {
        debug!(chat_id = chat.0, error = %e, "Chat action failed");
    }

    let result = router.respond(event).await;
    deliver(bot, chat, result).await
}

async fn deliver(bot: &Bot, chat: ChatId, result: OutboundResult) -> anyhow::Result<()> {
    let (reply, document) = result.into_parts();

    if let Some(doc) = document {
        let size = doc.bytes.len();
        let file = InputFile::memory(doc.bytes.to_vec()).file_name(doc.file_name.clone());
        bot.send_document(chat, file).await?;
        info!(chat_id = chat.0, file = %doc.file_name, size, "Sent report");
    }

    if let Some(text) = reply {
        for part in split_message(&text, TELEGRAM_MESSAGE_LIMIT) {
            if part.trim().is_empty() {
                continue;
            }
            if let Err(e) = bot.send_message(chat, part).await {
                warn!(chat_id = chat.0, error = %e, "Failed to send reply chunk");
                return Err(e.into());
            }
        }
    }
    Ok(())
}
