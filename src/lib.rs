//! # docquiz
//!
//! Generate a multiple-choice and true/false quiz from a document with a
//! Gemini model, then render it and export it as a paginated PDF.
//!
//! ## Pipeline Overview
//!
//! ```text
//! file
//!  │
//!  ├─ 1. Input     load a local file or download from a URL
//!  ├─ 2. Encode    sniff MIME type, base64 inline data
//!  ├─ 3. Generate  one structured-output call → validated Quiz
//!  ├─ 4. Render    Quiz → QuizView (HTML, text, PDF layout)
//!  └─ 5. Export    QuizView → 2x capture → A4 pages → PDF
//! ```
//!
//! [`Session`] drives these stages as a small state machine, the way an
//! interactive front end would.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docquiz::{GeminiService, QuestionCounts, QuizConfig, Session};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // API key from GEMINI_API_KEY or API_KEY
//!     let config = QuizConfig::default();
//!     let service = Arc::new(GeminiService::from_config(&config)?);
//!
//!     let mut session = Session::new(service, config);
//!     session.open("lecture-notes.pdf").await?;
//!     session.set_counts(QuestionCounts::new(3, 2));
//!     let quiz = session.generate().await?;
//!     println!("{} questions", quiz.question_count());
//!
//!     let path = session.download(".").await?;
//!     println!("saved {}", path.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `docquiz` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! PDF export binds the PDFium shared library at runtime: set
//! `PDFIUM_LIB_PATH`, or install it on the system library path.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod export;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod quiz;
pub mod render;
pub mod service;
pub mod session;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ExportConfig, PaperSize, QuizConfig, QuizConfigBuilder};
pub use error::{ErrorKind, ExportError, GenerationError, QuizError};
pub use export::{export_to_file, export_to_pdf, export_to_pdf_with_progress, ExportedPdf};
pub use pipeline::encode::{detect_mime_type, encode_file};
pub use pipeline::generate::{generate_quiz, parse_quiz_response};
pub use pipeline::input::{resolve_input, SourceFile};
pub use progress::{NoopProgressCallback, ProgressCallback, QuizProgressCallback};
pub use quiz::{EncodedFile, GenerationRequest, McqItem, QuestionCounts, Quiz, TrueFalseItem};
pub use render::html::render_html;
pub use render::text::render_text;
pub use render::{render_quiz, QuizView};
pub use service::{ContentRequest, GeminiService, QuizService};
pub use session::{ErrorBanner, Session, SessionState};
