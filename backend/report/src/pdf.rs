use async_trait::async_trait;
use claimdesk_core::{AdapterError, AdapterKind, ReportRenderer};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use tracing::debug;

use crate::encoding::to_win_ansi;
use crate::layout::{paginate, wrap_text, PageLayout};

const BODY_FONT: &str = "F1";
const TITLE_FONT: &str = "F2";
const MARK_FONT: &str = "F3";

/// Renders reports as A4 PDFs with the watermark on every page.
#[derive(Debug, Clone)]
pub struct PdfReportRenderer {
    watermark: String,
    layout: PageLayout,
}

impl PdfReportRenderer {
    pub fn new(watermark: impl Into<String>) -> Self {
        Self {
            watermark: watermark.into(),
            layout: PageLayout::default(),
        }
    }

    pub fn with_layout(mut self, layout: PageLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn watermark(&self) -> &str {
        &self.watermark
    }

    /// Synchronous rendering; `render` runs this on the blocking pool.
    pub fn render_bytes(&self, title: &str, body: &str) -> Result<Vec<u8>, AdapterError> {
        let lines = wrap_text(body, self.layout.chars_per_line);
        let pages = paginate(lines, &self.layout);
        let total = pages.len();

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let body_font = doc_font(&mut doc, "Helvetica");
        let title_font = doc_font(&mut doc, "Helvetica-Bold");
        let mark_font = doc_font(&mut doc, "Helvetica-Oblique");
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                BODY_FONT => body_font,
                TITLE_FONT => title_font,
                MARK_FONT => mark_font,
            },
        });

        let mut kids: Vec<Object> = Vec::with_capacity(total);
        for (index, lines) in pages.iter().enumerate() {
            let title = (index == 0).then_some(title);
            let content = self.page_content(title, lines, index + 1, total);
            let encoded = content.encode().map_err(|e| render_error(&e))?;
            let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => total as i64,
                "Resources" => resources_id,
                "MediaBox" => vec![
                    0.into(),
                    0.into(),
                    Object::Real(self.layout.width),
                    Object::Real(self.layout.height),
                ],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.compress();

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).map_err(|e| render_error(&e))?;
        debug!(pages = total, bytes = bytes.len(), "report rendered");
        Ok(bytes)
    }

    /// Drawing operations for one page.
    pub(crate) fn page_content(
        &self,
        title: Option<&str>,
        lines: &[String],
        page_no: usize,
        total: usize,
    ) -> Content {
        let l = &self.layout;
        let mut ops = Vec::new();

        self.draw_watermark(&mut ops);

        let mut top = l.height - l.margin;
        if let Some(title) = title {
            ops.push(Operation::new("BT", vec![]));
            ops.push(Operation::new("Tf", vec![TITLE_FONT.into(), 14.into()]));
            ops.push(Operation::new("Td", vec![Object::Real(l.margin), Object::Real(top - 14.0)]));
            ops.push(Operation::new("Tj", vec![Object::string_literal(to_win_ansi(title))]));
            ops.push(Operation::new("ET", vec![]));
            top -= 40.0;
        }

        ops.push(Operation::new("BT", vec![]));
        ops.push(Operation::new("Tf", vec![BODY_FONT.into(), Object::Real(l.font_size)]));
        ops.push(Operation::new("TL", vec![Object::Real(l.leading)]));
        ops.push(Operation::new("Td", vec![Object::Real(l.margin), Object::Real(top - l.font_size)]));
        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                ops.push(Operation::new("T*", vec![]));
            }
            ops.push(Operation::new("Tj", vec![Object::string_literal(to_win_ansi(line))]));
        }
        ops.push(Operation::new("ET", vec![]));

        // Footer: watermark text and page counter.
        ops.push(Operation::new("BT", vec![]));
        ops.push(Operation::new("Tf", vec![MARK_FONT.into(), 8.into()]));
        ops.push(Operation::new("Td", vec![Object::Real(l.margin), 30.into()]));
        ops.push(Operation::new("Tj", vec![Object::string_literal(to_win_ansi(&self.watermark))]));
        ops.push(Operation::new("ET", vec![]));
        ops.push(Operation::new("BT", vec![]));
        ops.push(Operation::new("Tf", vec![BODY_FONT.into(), 8.into()]));
        ops.push(Operation::new("Td", vec![Object::Real(l.width - l.margin - 40.0), 30.into()]));
        ops.push(Operation::new(
            "Tj",
            vec![Object::string_literal(format!("{page_no}/{total}"))],
        ));
        ops.push(Operation::new("ET", vec![]));

        Content { operations: ops }
    }

    /// Large light-grey diagonal text across the middle of the page.
    fn draw_watermark(&self, ops: &mut Vec<Operation>) {
        if self.watermark.trim().is_empty() {
            return;
        }
        let l = &self.layout;
        let (c, s) = (std::f32::consts::FRAC_1_SQRT_2, std::f32::consts::FRAC_1_SQRT_2);
        ops.push(Operation::new("q", vec![]));
        ops.push(Operation::new("g", vec![Object::Real(0.85)]));
        ops.push(Operation::new("BT", vec![]));
        ops.push(Operation::new("Tf", vec![MARK_FONT.into(), 36.into()]));
        ops.push(Operation::new(
            "Tm",
            vec![
                Object::Real(c),
                Object::Real(s),
                Object::Real(-s),
                Object::Real(c),
                Object::Real(l.width * 0.2),
                Object::Real(l.height * 0.3),
            ],
        ));
        ops.push(Operation::new("Tj", vec![Object::string_literal(to_win_ansi(&self.watermark))]));
        ops.push(Operation::new("ET", vec![]));
        ops.push(Operation::new("Q", vec![]));
    }
}

fn doc_font(doc: &mut Document, base: &str) -> ObjectId {
    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => Object::Name(base.as_bytes().to_vec()),
        "Encoding" => "WinAnsiEncoding",
    })
}

fn render_error(err: &dyn std::fmt::Display) -> AdapterError {
    AdapterError::fatal(AdapterKind::Render, format!("PDF generation failed: {err}"))
}

#[async_trait]
impl ReportRenderer for PdfReportRenderer {
    async fn render(&self, title: &str, body: &str) -> Result<Vec<u8>, AdapterError> {
        let renderer = self.clone();
        let (title, body) = (title.to_string(), body.to_string());
        tokio::task::spawn_blocking(move || renderer.render_bytes(&title, &body))
            .await
            .map_err(|e| AdapterError::fatal(AdapterKind::Render, format!("renderer aborted: {e}")))?
    }
}
