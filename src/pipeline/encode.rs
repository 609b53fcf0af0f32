//! File encoding: raw bytes → base64 payload plus MIME type.
//!
//! The model service needs a MIME type for every inline part. Browsers get
//! one from the OS; here it comes from, in order: an explicit override, the
//! origin's declared type, magic bytes, then the file extension.

use crate::pipeline::input::SourceFile;
use crate::quiz::EncodedFile;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::debug;

const OCTET_STREAM: &str = "application/octet-stream";

/// Encode a loaded file for inline upload.
pub fn encode_file(source: &SourceFile, mime_override: Option<&str>) -> EncodedFile {
    let mime_type = mime_override
        .map(str::to_string)
        .or_else(|| {
            source
                .declared_mime
                .clone()
                .filter(|m| m != OCTET_STREAM)
        })
        .unwrap_or_else(|| detect_mime_type(&source.name, &source.bytes).to_string());

    let data_base64 = STANDARD.encode(&source.bytes);
    debug!(
        "Encoded {} as {} → {} bytes base64",
        source.name,
        mime_type,
        data_base64.len()
    );

    EncodedFile {
        name: source.name.clone(),
        mime_type,
        data_base64,
    }
}

/// Guess a MIME type from content, falling back to the file extension.
pub fn detect_mime_type(name: &str, bytes: &[u8]) -> &'static str {
    if let Some(m) = sniff_magic(bytes) {
        return m;
    }
    let ext = name
        .rsplit_once('.')
        .map(|(_, e)| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => "application/pdf",
        "txt" | "text" | "log" => "text/plain",
        "md" | "markdown" => "text/markdown",
        "csv" => "text/csv",
        "html" | "htm" => "text/html",
        "xml" => "text/xml",
        "json" => "application/json",
        "rtf" => "text/rtf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        _ => OCTET_STREAM,
    }
}

fn sniff_magic(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(b"%PDF") {
        Some("application/pdf")
    } else if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
        Some("image/png")
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("image/jpeg")
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        Some("image/gif")
    } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        Some("image/webp")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(name: &str, bytes: &[u8]) -> SourceFile {
        SourceFile {
            name: name.to_string(),
            declared_mime: None,
            bytes: bytes.to_vec(),
        }
    }

    #[test]
    fn encode_pdf_bytes() {
        let enc = encode_file(&source("notes.bin", b"%PDF-1.4 body"), None);
        assert_eq!(enc.mime_type, "application/pdf");
        assert_eq!(enc.name, "notes.bin");
        let decoded = STANDARD.decode(&enc.data_base64).expect("valid base64");
        assert_eq!(decoded, b"%PDF-1.4 body");
        assert!(!enc.data_base64.starts_with("data:"));
    }

    #[test]
    fn magic_beats_extension() {
        assert_eq!(
            detect_mime_type("photo.pdf", &[0x89, b'P', b'N', b'G', 0x0D]),
            "image/png"
        );
    }

    #[test]
    fn extension_fallback() {
        assert_eq!(detect_mime_type("README.MD", b"# Title"), "text/markdown");
        assert_eq!(detect_mime_type("notes.txt", b"plain"), "text/plain");
        assert_eq!(detect_mime_type("noext", b"???"), "application/octet-stream");
    }

    #[test]
    fn override_and_declared_mime() {
        let mut src = source("a.txt", b"hello");
        src.declared_mime = Some("text/html".into());
        assert_eq!(encode_file(&src, None).mime_type, "text/html");
        assert_eq!(encode_file(&src, Some("text/csv")).mime_type, "text/csv");

        src.declared_mime = Some("application/octet-stream".into());
        assert_eq!(encode_file(&src, None).mime_type, "text/plain");
    }
}
