use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use futures::FutureExt;
use tracing::{debug, info, warn};
use url::Url;

use claimdesk_commands::{classify, detect_command, Command, CommandRegistry};
use claimdesk_core::{
    preview, truncate, AdapterError, AdapterKind, Attachment, Blob, CompletionProvider, CompletionRequest,
    InboundEvent, OutboundResult, PageFetcher, ReportRenderer, SourceTag, TextExtractor, Turn, UserId,
};
use claimdesk_logging::{EventLogger, PipelineEvent};
use claimdesk_memory::ContextStore;

use crate::lanes::UserLanes;
use crate::messages;
use crate::settings::RouterSettings;
use crate::transcript::{report_body, report_file_name};

/// The external collaborators the router calls.
#[derive(Clone)]
pub struct Adapters {
    pub extractor: Arc<dyn TextExtractor>,
    pub fetcher: Arc<dyn PageFetcher>,
    pub completion: Arc<dyn CompletionProvider>,
    pub renderer: Arc<dyn ReportRenderer>,
}

pub struct Router {
    store: Arc<ContextStore>,
    registry: CommandRegistry,
    adapters: Adapters,
    settings: RouterSettings,
    lanes: UserLanes,
}

async fn bounded<T>(
    kind: AdapterKind,
    limit: Duration,
    call: impl Future<Output = Result<T, AdapterError>>,
) -> Result<T, AdapterError> {
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(AdapterError::timed_out(kind, limit)),
    }
}

fn parse_fetch_url(raw: &str) -> Result<Url, AdapterError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(AdapterError::fatal(AdapterKind::Fetch, "missing URL, use: fetch <url>"));
    }
    let url = Url::parse(raw)
        .map_err(|e| AdapterError::fatal(AdapterKind::Fetch, format!("invalid URL '{raw}': {e}")))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(AdapterError::fatal(
            AdapterKind::Fetch,
            format!("only absolute http(s) URLs are supported, got '{raw}'"),
        ));
    }
    Ok(url)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

impl Router {
    pub fn new(store: Arc<ContextStore>, adapters: Adapters, settings: RouterSettings) -> Self {
        Self {
            store,
            registry: CommandRegistry::new(),
            adapters,
            settings,
            lanes: UserLanes::new(),
        }
    }

    pub fn with_registry(mut self, registry: CommandRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn store(&self) -> &Arc<ContextStore> {
        &self.store
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &RouterSettings {
        &self.settings
    }

    /// Classify and handle one event. Events of one user are handled one at
    /// a time, in the order this method was called.
    pub async fn handle(&self, event: InboundEvent) -> Result<OutboundResult, AdapterError> {
        let command = classify(&event, &self.registry);
        self.process(&event, command).await
    }

    /// Like [`handle`](Self::handle), but always produces something to send:
    /// adapter errors become an explanation and panics a generic apology.
    pub async fn respond(&self, event: InboundEvent) -> OutboundResult {
        let command = classify(&event, &self.registry);
        let name = command.name();
        let user = event.user.clone();
        let started = Instant::now();

        match AssertUnwindSafe(self.process(&event, command)).catch_unwind().await {
            Ok(Ok(result)) => {
                EventLogger::log_event(
                    user.as_str(),
                    PipelineEvent::Handled {
                        command: name.to_string(),
                        elapsed_ms: started.elapsed().as_millis() as u64,
                        turns: self.store.snapshot(&user).len(),
                    },
                );
                result
            }
            Ok(Err(err)) => {
                EventLogger::log_event(
                    user.as_str(),
                    PipelineEvent::AdapterFailure {
                        command: name.to_string(),
                        adapter: err.kind().to_string(),
                        cause: err.cause().to_string(),
                        retryable: err.retryable(),
                    },
                );
                OutboundResult::text(messages::user_message(&err))
            }
            Err(payload) => {
                EventLogger::log_event(
                    user.as_str(),
                    PipelineEvent::InternalError {
                        command: name.to_string(),
                        message: panic_message(payload.as_ref()),
                    },
                );
                OutboundResult::text(messages::INTERNAL_ERROR)
            }
        }
    }

    async fn process(&self, event: &InboundEvent, command: Command) -> Result<OutboundResult, AdapterError> {
        let user = &event.user;
        let lane = self.lanes.acquire(user).await;
        debug!(user = %user, command = command.name(), "handling event");

        let result = match command {
            Command::Start => Ok(OutboundResult::text(messages::GREETING)),
            Command::Fetch(raw_url) => self.fetch(user, &raw_url).await,
            Command::Extract => self.extract(event).await,
            Command::Report => self.report(user).await,
            Command::Chat(text) => self.chat(user, &text).await,
        };

        drop(lane);
        result
    }

    async fn fetch(&self, user: &UserId, raw_url: &str) -> Result<OutboundResult, AdapterError> {
        let url = parse_fetch_url(raw_url)?;
        if !self.settings.fetch_enabled {
            return Err(AdapterError::fatal(AdapterKind::Completion, messages::FETCH_DISABLED));
        }

        let content = bounded(
            AdapterKind::Fetch,
            self.settings.fetch_timeout,
            self.adapters.fetcher.fetch(url.as_str()),
        )
        .await?;

        let stored = truncate(content.trim(), self.settings.text_limit);
        if stored.is_empty() {
            return Err(AdapterError::fatal(AdapterKind::Fetch, "the page has no readable text"));
        }
        let chars = stored.chars().count();
        self.store.append(user, Turn::user(stored, SourceTag::Fetch));
        info!(user = %user, url = %url, chars, "fetched page added to context");

        Ok(OutboundResult::text(messages::fetch_confirmation(
            url.as_str(),
            chars,
            &preview(stored, 200),
        )))
    }

    async fn extract(&self, event: &InboundEvent) -> Result<OutboundResult, AdapterError> {
        let user = &event.user;
        let blob = event
            .blob()
            .ok_or_else(|| AdapterError::fatal(AdapterKind::Extraction, messages::ATTACH_A_FILE))?;

        let text = bounded(
            AdapterKind::Extraction,
            self.settings.extraction_timeout,
            self.adapters.extractor.extract(blob),
        )
        .await?;

        let stored = truncate(text.trim(), self.settings.text_limit);
        if stored.is_empty() {
            return Err(AdapterError::fatal(AdapterKind::Extraction, messages::NO_TEXT_FOUND));
        }
        if let Some(caption) = self.caption_text(blob) {
            self.store.append(user, Turn::user(caption, SourceTag::Chat));
        }
        self.store.append(user, Turn::user(stored, SourceTag::Ocr));
        info!(user = %user, chars = stored.chars().count(), "extracted text added to context");

        let mut reply = messages::extraction_reply(&preview(stored, messages::PREVIEW_CHARS));
        if self.settings.auto_analyze {
            match self.complete_session(user, None, self.settings.max_tokens).await {
                Ok(analysis) => {
                    self.store.append(user, Turn::assistant(analysis.as_str()));
                    reply.push_str("\n\n");
                    reply.push_str(&analysis);
                }
                Err(err) => {
                    warn!(user = %user, error = %err, "automatic analysis failed");
                    reply.push_str("\n\n");
                    reply.push_str(&messages::analysis_failed_note(&err));
                }
            }
        }
        Ok(OutboundResult::text(reply))
    }

    async fn report(&self, user: &UserId) -> Result<OutboundResult, AdapterError> {
        let mut turns = self.store.snapshot(user);
        if turns.is_empty() {
            return Err(AdapterError::fatal(AdapterKind::Render, messages::NOTHING_TO_REPORT));
        }

        let analysis = if self.settings.include_analysis {
            let analysis = self
                .complete_session(
                    user,
                    Some(self.settings.analysis_prompt.as_str()),
                    self.settings.report_max_tokens,
                )
                .await?;
            self.store.append(user, Turn::assistant(analysis.as_str()));
            turns = self.store.snapshot(user);
            Some(analysis)
        } else {
            None
        };

        let now = Utc::now();
        let body = report_body(user, now, &turns, analysis.as_deref());
        let bytes = bounded(
            AdapterKind::Render,
            self.settings.render_timeout,
            self.adapters.renderer.render(&self.settings.report_title, &body),
        )
        .await?;

        let file_name = report_file_name(user, now);
        if let Some(dir) = &self.settings.archive_dir {
            let path = dir.join(&file_name);
            let saved = async {
                tokio::fs::create_dir_all(dir).await?;
                tokio::fs::write(&path, &bytes).await
            };
            match saved.await {
                Ok(()) => debug!(path = %path.display(), "report archived"),
                Err(e) => warn!(path = %path.display(), error = %e, "failed to archive report"),
            }
        }

        info!(user = %user, turns = turns.len(), bytes = bytes.len(), "report rendered");
        Ok(OutboundResult::file(Attachment::pdf(bytes, file_name)).with_reply(messages::REPORT_READY))
    }

    async fn chat(&self, user: &UserId, text: &str) -> Result<OutboundResult, AdapterError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(OutboundResult::text(messages::EMPTY_MESSAGE_HINT));
        }

        self.store
            .append(user, Turn::user(truncate(text, self.settings.text_limit), SourceTag::Chat));

        let reply = self.complete_session(user, None, self.settings.max_tokens).await?;
        self.store.append(user, Turn::assistant(reply.as_str()));
        Ok(OutboundResult::text(reply))
    }

    /// The user's description sent along with a file, unless it only names a command.
    fn caption_text<'b>(&self, blob: &'b Blob) -> Option<&'b str> {
        let caption = blob.caption.as_deref()?.trim();
        if caption.is_empty() || detect_command(caption, &self.registry).is_some() {
            return None;
        }
        Some(truncate(caption, self.settings.text_limit))
    }

    /// Ask the completion adapter for the next reply over the user's whole
    /// session, with `extra` appended to the system prompt.
    async fn complete_session(
        &self,
        user: &UserId,
        extra: Option<&str>,
        max_tokens: Option<u32>,
    ) -> Result<String, AdapterError> {
        let system = match extra.map(str::trim).filter(|e| !e.is_empty()) {
            Some(extra) if self.settings.system_prompt.trim().is_empty() => extra.to_string(),
            Some(extra) => format!("{}\n\n{extra}", self.settings.system_prompt),
            None => self.settings.system_prompt.clone(),
        };

        let mut request = CompletionRequest::new(self.store.snapshot(user)).with_system_prompt(system);
        if let Some(max_tokens) = max_tokens {
            request = request.with_max_tokens(max_tokens);
        }

        bounded(
            AdapterKind::Completion,
            self.settings.completion_timeout,
            self.adapters.completion.complete(&request),
        )
        .await
    }
}
