//! Input resolution: load a user-selected file from disk or an HTTP(S) URL.
//!
//! The whole file is held in memory because the model service takes it as
//! inline data. The size cap is checked before reading a local file (from
//! metadata) and again after a download, so an oversized document fails
//! fast with [`QuizError::FileTooLarge`] instead of at the service.

use crate::error::QuizError;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A file loaded into memory, as the file picker would hand it over.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Display name (last path or URL segment).
    pub name: String,
    /// MIME type declared by the origin (HTTP `Content-Type`), if any.
    pub declared_mime: Option<String>,
    pub bytes: Vec<u8>,
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Load `input` (local path or URL) into memory.
pub async fn resolve_input(
    input: &str,
    timeout_secs: u64,
    max_bytes: u64,
) -> Result<SourceFile, QuizError> {
    if is_url(input) {
        download_url(input, timeout_secs, max_bytes).await
    } else {
        read_local(Path::new(input), max_bytes).await
    }
}

/// Read a local file, validating existence, permissions and size.
async fn read_local(path: &Path, max_bytes: u64) -> Result<SourceFile, QuizError> {
    let path_buf = path.to_path_buf();
    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|e| io_error(path_buf.clone(), e))?;

    if !metadata.is_file() {
        return Err(QuizError::FileRead {
            path: path_buf,
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a regular file"),
        });
    }

    let name = display_name(path);
    if metadata.len() > max_bytes {
        return Err(QuizError::FileTooLarge {
            name,
            size: metadata.len(),
            limit: max_bytes,
        });
    }

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| io_error(path_buf, e))?;

    debug!("Read local file {} ({} bytes)", path.display(), bytes.len());
    Ok(SourceFile {
        name,
        declared_mime: None,
        bytes,
    })
}

fn io_error(path: PathBuf, e: std::io::Error) -> QuizError {
    match e.kind() {
        std::io::ErrorKind::NotFound => QuizError::FileNotFound { path },
        std::io::ErrorKind::PermissionDenied => QuizError::PermissionDenied { path },
        _ => QuizError::FileRead { path, source: e },
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Download a URL into memory.
async fn download_url(url: &str, timeout_secs: u64, max_bytes: u64) -> Result<SourceFile, QuizError> {
    info!("Downloading document from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| QuizError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            QuizError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            QuizError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    if !response.status().is_success() {
        return Err(QuizError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let name = filename_from_url(url);

    if let Some(len) = response.content_length() {
        if len > max_bytes {
            return Err(QuizError::FileTooLarge {
                name,
                size: len,
                limit: max_bytes,
            });
        }
    }

    let declared_mime = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(';').next().unwrap_or(v).trim().to_string())
        .filter(|v| !v.is_empty());

    let bytes = response.bytes().await.map_err(|e| {
        if e.is_timeout() {
            QuizError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            QuizError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    if bytes.len() as u64 > max_bytes {
        return Err(QuizError::FileTooLarge {
            name,
            size: bytes.len() as u64,
            limit: max_bytes,
        });
    }

    info!("Downloaded {} ({} bytes)", name, bytes.len());
    Ok(SourceFile {
        name,
        declared_mime,
        bytes: bytes.to_vec(),
    })
}

/// Extract a reasonable filename from the URL path.
fn filename_from_url(url: &str) -> String {
    if let Ok(parsed) = reqwest::Url::parse(url) {
        if let Some(mut segments) = parsed.path_segments() {
            if let Some(last) = segments.next_back() {
                if !last.is_empty() {
                    return last.to_string();
                }
            }
        }
    }

    "downloaded-document".to_string()
}
