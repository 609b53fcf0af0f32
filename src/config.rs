//! Configuration types for quiz generation and PDF export.
//!
//! Generation is controlled through [`QuizConfig`], built via its
//! [`QuizConfigBuilder`]. Export settings live in the nested
//! [`ExportConfig`] so the exporter can be driven on its own (e.g. when
//! re-exporting a saved quiz without any model access).

use crate::error::QuizError;
use crate::progress::ProgressCallback;
use crate::quiz::QuestionCounts;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Default Gemini model.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Default Gemini REST endpoint root.
pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Environment variables consulted for the API key, in order.
pub const API_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

/// File name of the exported quiz.
pub const DEFAULT_PDF_FILE_NAME: &str = "ai-generated-quiz.pdf";

/// Configuration for quiz generation.
///
/// # Example
/// ```rust
/// use docquiz::{QuizConfig, QuestionCounts};
///
/// let config = QuizConfig::builder()
///     .counts(QuestionCounts::new(3, 2))
///     .model("gemini-2.5-flash")
///     .build()
///     .unwrap();
/// assert_eq!(config.counts.mcq, 3);
/// ```
#[derive(Clone)]
pub struct QuizConfig {
    /// Model identifier. Default: `gemini-2.5-flash`.
    pub model: String,

    /// REST endpoint root, without the `/models/...` suffix.
    pub api_base_url: String,

    /// API key. If None, resolved from the environment by [`QuizConfig::resolve_api_key`].
    pub api_key: Option<String>,

    /// Question counts to request. Default: 5 MCQ, 5 true/false.
    pub counts: QuestionCounts,

    /// Override for the instruction text. `{mcq_count}` and
    /// `{true_false_count}` are substituted.
    pub prompt_template: Option<String>,

    /// Sampling temperature. None leaves the service default.
    pub temperature: Option<f32>,

    /// Per-request timeout. None means no client-side timeout; the
    /// service's own limit is the effective bound.
    pub request_timeout_secs: Option<u64>,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Largest file accepted for inline upload. Default: 20 MiB.
    pub max_file_bytes: u64,

    /// Force this MIME type instead of sniffing the file.
    pub mime_type: Option<String>,

    /// PDF export settings.
    pub export: ExportConfig,

    /// Optional progress events sink.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_key: None,
            counts: QuestionCounts::default(),
            prompt_template: None,
            temperature: None,
            request_timeout_secs: None,
            download_timeout_secs: 120,
            max_file_bytes: 20 * 1024 * 1024,
            mime_type: None,
            export: ExportConfig::default(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for QuizConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizConfig")
            .field("model", &self.model)
            .field("api_base_url", &self.api_base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("counts", &self.counts)
            .field("prompt_template", &self.prompt_template.is_some())
            .field("temperature", &self.temperature)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_file_bytes", &self.max_file_bytes)
            .field("mime_type", &self.mime_type)
            .field("export", &self.export)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn QuizProgressCallback>"),
            )
            .finish()
    }
}

impl QuizConfig {
    /// Create a new builder for `QuizConfig`.
    pub fn builder() -> QuizConfigBuilder {
        QuizConfigBuilder {
            config: Self::default(),
        }
    }

    /// The configured key, else the first non-empty of [`API_KEY_ENV_VARS`].
    pub fn resolve_api_key(&self) -> Result<String, QuizError> {
        if let Some(key) = self.api_key.as_ref().filter(|k| !k.trim().is_empty()) {
            return Ok(key.clone());
        }
        API_KEY_ENV_VARS
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|v| !v.trim().is_empty())
            .ok_or(QuizError::MissingApiKey)
    }
}

/// Builder for [`QuizConfig`].
pub struct QuizConfigBuilder {
    config: QuizConfig,
}

impl QuizConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_base_url = url.into();
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn counts(mut self, counts: QuestionCounts) -> Self {
        self.config.counts = counts;
        self
    }

    pub fn prompt_template(mut self, template: impl Into<String>) -> Self {
        self.config.prompt_template = Some(template.into());
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = Some(t.clamp(0.0, 2.0));
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = Some(secs);
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn max_file_bytes(mut self, bytes: u64) -> Self {
        self.config.max_file_bytes = bytes;
        self
    }

    pub fn mime_type(mut self, mime: impl Into<String>) -> Self {
        self.config.mime_type = Some(mime.into());
        self
    }

    pub fn export(mut self, export: ExportConfig) -> Self {
        self.config.export = export;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<QuizConfig, QuizError> {
        let c = &self.config;
        if c.model.trim().is_empty() {
            return Err(QuizError::InvalidConfig("Model must not be empty".into()));
        }
        if !c.api_base_url.starts_with("http://") && !c.api_base_url.starts_with("https://") {
            return Err(QuizError::InvalidConfig(format!(
                "API base URL must be http(s), got '{}'",
                c.api_base_url
            )));
        }
        if c.max_file_bytes == 0 {
            return Err(QuizError::InvalidConfig(
                "max_file_bytes must be > 0".into(),
            ));
        }
        c.export.validate()?;
        Ok(self.config)
    }
}

// ── Export ───────────────────────────────────────────────────────────────

/// Settings for rasterising the quiz region and paginating it into a PDF.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Output paper size. Default: A4 portrait.
    pub paper: PaperSize,

    /// Margin on every side, in millimetres. Default: 10.
    pub margin_mm: f32,

    /// Pixel density multiplier for the capture. Default: 2.0.
    pub scale: f32,

    /// Width of the laid-out quiz region in points. Default: 720.
    pub region_width_pt: f32,

    /// Name of the written file. Default: `ai-generated-quiz.pdf`.
    pub file_name: String,

    /// TrueType font embedded for all quiz text. Default: none, which uses
    /// the built-in Helvetica and only covers Latin-1 (WinAnsi) text.
    #[serde(default)]
    pub font_path: Option<PathBuf>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            paper: PaperSize::default(),
            margin_mm: 10.0,
            scale: 2.0,
            region_width_pt: 720.0,
            file_name: DEFAULT_PDF_FILE_NAME.to_string(),
            font_path: None,
        }
    }
}

impl ExportConfig {
    pub fn validate(&self) -> Result<(), QuizError> {
        let (w, h) = self.paper.dimensions_mm();
        if !(self.margin_mm >= 0.0 && self.margin_mm * 2.0 < w.min(h)) {
            return Err(QuizError::InvalidConfig(format!(
                "Margin {}mm leaves no printable area on a {}x{}mm page",
                self.margin_mm, w, h
            )));
        }
        if !(self.scale > 0.0 && self.scale <= 8.0) {
            return Err(QuizError::InvalidConfig(format!(
                "Capture scale must be in (0, 8], got {}",
                self.scale
            )));
        }
        if self.region_width_pt < 200.0 {
            return Err(QuizError::InvalidConfig(format!(
                "Region width must be at least 200pt, got {}",
                self.region_width_pt
            )));
        }
        if self.file_name.trim().is_empty() || self.file_name.contains(['/', '\\']) {
            return Err(QuizError::InvalidConfig(format!(
                "Invalid output file name '{}'",
                self.file_name
            )));
        }
        Ok(())
    }
}

/// Output paper size, portrait orientation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum PaperSize {
    #[default]
    A4,
    Letter,
    /// Width and height in millimetres.
    Custom { width_mm: f32, height_mm: f32 },
}

impl PaperSize {
    /// `(width, height)` in millimetres.
    pub fn dimensions_mm(&self) -> (f32, f32) {
        match *self {
            PaperSize::A4 => (210.0, 297.0),
            PaperSize::Letter => (215.9, 279.4),
            PaperSize::Custom {
                width_mm,
                height_mm,
            } => (width_mm, height_mm),
        }
    }
}
