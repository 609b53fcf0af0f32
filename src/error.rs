//! Error types for the docquiz library.
//!
//! [`QuizError`] is what every public entry point returns. Two stages have
//! enough distinct failure causes to warrant their own enums:
//!
//! * [`GenerationError`]: the model call failed, or its reply could not be
//!   turned into a [`crate::quiz::Quiz`].
//! * [`ExportError`]: the quiz region could not be rasterised or the PDF
//!   could not be assembled.
//!
//! Both convert into [`QuizError`] via `From`, so `?` works across stages.
//!
//! `Display` carries the technical detail and is meant for logs. The single
//! human-readable banner text shown to a user comes from
//! [`QuizError::user_message`].

use std::path::PathBuf;
use thiserror::Error;

/// The five user-facing error kinds, plus two for the ambient stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    NoFileSelected,
    NoQuestionsRequested,
    FileReadError,
    GenerationError,
    ExportError,
    Configuration,
    Internal,
}

/// All errors returned by the docquiz library.
#[derive(Debug, Error)]
pub enum QuizError {
    // ── Form validation ───────────────────────────────────────────────────
    /// Generation was requested with no file selected.
    #[error("No file selected")]
    NoFileSelected,

    /// Both question counts are zero.
    #[error("No questions requested: both MCQ and true/false counts are zero")]
    NoQuestionsRequested,

    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("File not found: '{path}'")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'")]
    PermissionDenied { path: PathBuf },

    /// Reading the file failed part-way.
    #[error("Failed to read '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is larger than the service accepts as inline data.
    #[error("File '{name}' is {size} bytes; the limit for inline upload is {limit} bytes")]
    FileTooLarge { name: String, size: u64, limit: u64 },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'")]
    DownloadTimeout { url: String, secs: u64 },

    // ── Stage errors ──────────────────────────────────────────────────────
    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Export(#[from] ExportError),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// No API key in the environment or configuration.
    #[error("No API key configured.\nSet GEMINI_API_KEY (or API_KEY), or pass --api-key.")]
    MissingApiKey,

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl QuizError {
    /// Classify this error into one of the [`ErrorKind`]s.
    pub fn kind(&self) -> ErrorKind {
        match self {
            QuizError::NoFileSelected => ErrorKind::NoFileSelected,
            QuizError::NoQuestionsRequested => ErrorKind::NoQuestionsRequested,
            QuizError::FileNotFound { .. }
            | QuizError::PermissionDenied { .. }
            | QuizError::FileRead { .. }
            | QuizError::FileTooLarge { .. }
            | QuizError::DownloadFailed { .. }
            | QuizError::DownloadTimeout { .. } => ErrorKind::FileReadError,
            QuizError::Generation(_) => ErrorKind::GenerationError,
            QuizError::Export(_) | QuizError::OutputWriteFailed { .. } => ErrorKind::ExportError,
            QuizError::MissingApiKey | QuizError::InvalidConfig(_) => ErrorKind::Configuration,
            QuizError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// The one-line message shown in the error banner.
    ///
    /// Configuration and internal errors fall back to the full `Display` text
    /// since there is no friendlier wording that would still be actionable.
    pub fn user_message(&self) -> String {
        match self.kind() {
            ErrorKind::NoFileSelected => "Please select a file first.".to_string(),
            ErrorKind::NoQuestionsRequested => "Please request at least one question.".to_string(),
            ErrorKind::FileReadError => "Failed to read the file.".to_string(),
            ErrorKind::GenerationError => {
                "Failed to generate quiz. The AI model may have had trouble processing the document."
                    .to_string()
            }
            ErrorKind::ExportError => "Sorry, there was an issue creating the PDF file.".to_string(),
            ErrorKind::Configuration | ErrorKind::Internal => self.to_string(),
        }
    }
}

/// Why a generation call produced no quiz.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenerationError {
    /// Transport-level failure (DNS, TLS, connection reset, timeout).
    #[error("Request to {service} failed: {detail}")]
    Transport { service: String, detail: String },

    /// The service rejected the API key (401/403).
    #[error("Authentication error from {service}: {detail}")]
    Auth { service: String, detail: String },

    /// HTTP 429 from the service.
    #[error("Rate limit exceeded for {service}")]
    RateLimited {
        service: String,
        retry_after_secs: Option<u64>,
    },

    /// Any other non-success HTTP status.
    #[error("{service} returned HTTP {status}: {message}")]
    Api {
        service: String,
        status: u16,
        message: String,
    },

    /// The service answered but produced no usable text.
    #[error("Model returned no content ({reason})")]
    EmptyResponse { reason: String },

    /// The reply text is not valid JSON.
    #[error("Model reply is not valid JSON: {detail}")]
    MalformedJson { detail: String },

    /// The reply is JSON but does not have the quiz shape.
    #[error("Model reply does not match the quiz schema: {detail}")]
    SchemaMismatch { detail: String },

    /// Neither `mcqs` nor `trueFalse` is present.
    #[error("AI response is missing required quiz sections")]
    MissingSections,
}

/// Why the PDF export failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExportError {
    /// Could not bind to a PDFium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium or install pdfium on the library search path."
    )]
    EngineUnavailable(String),

    /// The configured TrueType font could not be read or embedded.
    #[error("Failed to load font '{path}': {reason}")]
    FontUnavailable { path: String, reason: String },

    /// The laid-out region is taller than a raster canvas may be.
    #[error("Quiz region is {height_px}px tall at the configured scale; the maximum is {max_px}px")]
    RegionTooTall { height_px: u32, max_px: u32 },

    /// Drawing or rasterising the region failed.
    #[error("Rasterisation failed: {0}")]
    Capture(String),

    /// Building or saving the PDF document failed.
    #[error("PDF assembly failed: {0}")]
    Assembly(String),
}
