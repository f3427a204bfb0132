//! Building pipeline components from the loaded configuration.

use std::sync::Arc;

use anyhow::{Context, Result};

use claimdesk_config::{ClaimDeskConfig, OcrBackend};
use claimdesk_core::TextExtractor;
use claimdesk_memory::StoreLimits;
use claimdesk_planner::{OpenAiProvider, ANALYSIS_REQUEST, DEFAULT_SYSTEM_PROMPT};
use claimdesk_report::PdfReportRenderer;
use claimdesk_routing::{Adapters, RouterSettings};
use claimdesk_understanding::{CompositeExtractor, LinkFetcher, PdfTextExtractor, TesseractOcr, VisionOcr};

pub fn store_limits(config: &ClaimDeskConfig) -> StoreLimits {
    StoreLimits {
        max_turns: config.session.max_turns,
        idle_timeout: config.session.idle_timeout(),
    }
}

pub fn router_settings(config: &ClaimDeskConfig) -> RouterSettings {
    let system_prompt = config
        .completion
        .system_prompt
        .clone()
        .filter(|p| !p.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());

    RouterSettings {
        fetch_enabled: config.fetch.enabled,
        system_prompt,
        analysis_prompt: ANALYSIS_REQUEST.to_string(),
        text_limit: config.session.text_limit,
        max_tokens: Some(config.completion.max_tokens),
        report_max_tokens: Some(config.completion.report_max_tokens),
        extraction_timeout: config.extraction.timeout(),
        fetch_timeout: config.fetch.timeout(),
        completion_timeout: config.completion.timeout(),
        render_timeout: config.report.timeout(),
        report_title: config.report.title.clone(),
        auto_analyze: config.extraction.auto_analyze,
        include_analysis: config.report.include_analysis,
        archive_dir: config.report.archive_dir.clone(),
    }
}

fn api_key(config: &ClaimDeskConfig) -> Result<String> {
    config
        .completion
        .api_key
        .clone()
        .filter(|k| !k.trim().is_empty())
        .context("completion.apiKey is not set (or set OPENAI_API_KEY)")
}

fn image_extractor(config: &ClaimDeskConfig) -> Result<Arc<dyn TextExtractor>> {
    let extraction = &config.extraction;
    Ok(match extraction.backend {
        OcrBackend::Tesseract => Arc::new(TesseractOcr::new(
            &extraction.tesseract_path,
            &extraction.language,
        )),
        OcrBackend::Vision => Arc::new(VisionOcr::new(
            &config.completion.base_url,
            api_key(config)?,
            &extraction.vision_model,
            extraction.timeout(),
        )?),
    })
}

pub fn build_renderer(config: &ClaimDeskConfig) -> PdfReportRenderer {
    PdfReportRenderer::new(&config.report.watermark)
}

pub fn build_adapters(config: &ClaimDeskConfig) -> Result<Adapters> {
    let extractor =
        CompositeExtractor::new(image_extractor(config)?).with_pdf(Arc::new(PdfTextExtractor));

    let fetcher = config
        .fetch
        .allowed_hosts
        .iter()
        .fold(LinkFetcher::new(config.fetch.timeout())?, |fetcher, host| fetcher.allow_host(host))
        .allow_private_hosts(config.fetch.allow_private_hosts)
        .with_max_chars(config.fetch.max_chars);

    let completion = OpenAiProvider::new(
        api_key(config)?,
        &config.completion.model,
        config.completion.timeout(),
    )?
    .with_base_url(&config.completion.base_url)
    .with_temperature(config.completion.temperature)
    .with_max_tokens(config.completion.max_tokens);

    Ok(Adapters {
        extractor: Arc::new(extractor),
        fetcher: Arc::new(fetcher),
        completion: Arc::new(completion),
        renderer: Arc::new(build_renderer(config)),
    })
}
