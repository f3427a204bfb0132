//! PDF rendering of conversation reports.
//!
//! Text is laid out on A4 pages with the standard Helvetica fonts, so no font
//! files are embedded; characters outside WinAnsi are folded to their closest
//! Latin-1 form. Every page carries the watermark.

mod encoding;
mod layout;
mod pdf;

pub use encoding::to_win_ansi;
pub use layout::{paginate, wrap_text, PageLayout};
pub use pdf::PdfReportRenderer;
