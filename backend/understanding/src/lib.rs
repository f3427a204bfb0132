//! Adapters that turn user-provided material into text: OCR and PDF text
//! extraction for photos and documents, and web page fetching.

pub mod doc_parse;
pub mod extractor;
mod http;
pub mod link;
pub mod mime_detect;
pub mod ocr;
pub mod sanitize;
pub mod vision;

pub use doc_parse::PdfTextExtractor;
pub use extractor::CompositeExtractor;
pub use link::{LinkFetcher, LinkUnderstanding};
pub use mime_detect::{detect_format, BlobFormat};
pub use ocr::TesseractOcr;
pub use sanitize::sanitize_extracted_text;
pub use vision::VisionOcr;
