//! `claimdesk render-report`: offline report rendering from a text file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use claimdesk_config::load_config;
use claimdesk_report::PdfReportRenderer;

use crate::wiring::build_renderer;

pub struct RenderOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub title: Option<String>,
    pub watermark: Option<String>,
}

pub async fn run(config_path: &Path, options: RenderOptions) -> Result<()> {
    let config = load_config(config_path).await?;
    let renderer = match &options.watermark {
        Some(watermark) => PdfReportRenderer::new(watermark),
        None => build_renderer(&config),
    };
    let title = options.title.as_deref().unwrap_or(&config.report.title);

    let size = render_file(&renderer, title, &options.input, &options.output).await?;
    println!("Wrote {} ({size} bytes)", options.output.display());
    Ok(())
}

async fn render_file(renderer: &PdfReportRenderer, title: &str, input: &Path, output: &Path) -> Result<usize> {
    let body = tokio::fs::read_to_string(input)
        .await
        .with_context(|| format!("reading {}", input.display()))?;
    let pdf = renderer.render_bytes(title, &body)?;
    tokio::fs::write(output, &pdf)
        .await
        .with_context(|| format!("writing {}", output.display()))?;
    Ok(pdf.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_render_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("body.txt");
        let output = dir.path().join("report.pdf");
        tokio::fs::write(&input, "Người dùng: 42\n\nuser: xe bị trầy cửa trước").await.unwrap();

        let size = render_file(&PdfReportRenderer::new("Mr.P"), "BÁO CÁO", &input, &output)
            .await
            .unwrap();

        let bytes = std::fs::read(&output).unwrap();
        assert_eq!(bytes.len(), size);
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn test_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = render_file(
            &PdfReportRenderer::new("Mr.P"),
            "T",
            &dir.path().join("nope.txt"),
            &dir.path().join("out.pdf"),
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("nope.txt"));
    }
}
