//! Format detection for inbound blobs.
//!
//! Declared MIME type wins, then the file extension, then magic bytes.

use std::path::Path;

use claimdesk_core::Blob;

/// How a blob's text should be obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobFormat {
    Pdf,
    Image,
    PlainText,
    Unsupported,
}

fn from_mime(mime: &str) -> Option<BlobFormat> {
    let mime = mime.to_ascii_lowercase();
    if mime == "application/pdf" {
        Some(BlobFormat::Pdf)
    } else if mime.starts_with("image/") {
        Some(BlobFormat::Image)
    } else if mime.starts_with("text/") || mime == "application/json" || mime == "application/xml" {
        Some(BlobFormat::PlainText)
    } else {
        None
    }
}

fn from_extension(name: &str) -> Option<BlobFormat> {
    let ext = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "pdf" => Some(BlobFormat::Pdf),
        "jpg" | "jpeg" | "png" | "gif" | "webp" | "bmp" | "tiff" | "tif" => Some(BlobFormat::Image),
        "txt" | "md" | "csv" | "json" | "xml" | "html" | "htm" | "log" => Some(BlobFormat::PlainText),
        _ => None,
    }
}

fn from_magic(bytes: &[u8]) -> BlobFormat {
    if bytes.starts_with(b"%PDF") {
        BlobFormat::Pdf
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF])
        || bytes.starts_with(&[0x89, b'P', b'N', b'G'])
        || bytes.starts_with(b"GIF8")
        || bytes.starts_with(b"II*\0")
        || bytes.starts_with(b"MM\0*")
        || (bytes.len() > 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP")
    {
        BlobFormat::Image
    } else if !bytes.is_empty() && std::str::from_utf8(bytes).is_ok() {
        BlobFormat::PlainText
    } else {
        BlobFormat::Unsupported
    }
}

/// Decide how to read `blob`.
pub fn detect_format(blob: &Blob) -> BlobFormat {
    blob.mime_type
        .as_deref()
        .and_then(from_mime)
        .or_else(|| blob.file_name.as_deref().and_then(from_extension))
        .unwrap_or_else(|| from_magic(&blob.bytes))
}
