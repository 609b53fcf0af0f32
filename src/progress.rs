//! Progress-callback trait for generation and export events.
//!
//! Inject an [`Arc<dyn QuizProgressCallback>`] via
//! [`crate::config::QuizConfigBuilder::progress_callback`] to be told when
//! the model call starts and finishes, and as each PDF page is assembled.
//!
//! # Example
//!
//! ```rust
//! use docquiz::{QuizConfig, QuizProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct PageCounter {
//!     pages: AtomicUsize,
//! }
//!
//! impl QuizProgressCallback for PageCounter {
//!     fn on_export_page(&self, _page_num: usize, _total_pages: usize) {
//!         self.pages.fetch_add(1, Ordering::SeqCst);
//!     }
//! }
//!
//! let counter = Arc::new(PageCounter { pages: AtomicUsize::new(0) });
//!
//! let config = QuizConfig::builder()
//!     .progress_callback(counter as Arc<dyn QuizProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::quiz::QuestionCounts;
use std::sync::Arc;

/// Called by the pipeline as a quiz is generated and exported.
///
/// `Send + Sync` because export events fire from the blocking thread pool.
/// All methods default to no-ops.
pub trait QuizProgressCallback: Send + Sync {
    /// Called just before the model request is sent.
    fn on_generation_start(&self, file_name: &str, counts: QuestionCounts) {
        let _ = (file_name, counts);
    }

    /// Called when a quiz was parsed successfully.
    ///
    /// # Arguments
    /// * `mcqs` / `true_false`: number of items actually returned
    /// * `duration_ms`: wall-clock time of the model call
    fn on_generation_complete(&self, mcqs: usize, true_false: usize, duration_ms: u64) {
        let _ = (mcqs, true_false, duration_ms);
    }

    /// Called when generation fails. `error` is the log-level detail.
    fn on_generation_error(&self, error: &str) {
        let _ = error;
    }

    /// Called once the quiz region has been rasterised.
    fn on_export_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called after each PDF page is added (1-indexed).
    fn on_export_page(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called when the PDF bytes are ready.
    fn on_export_complete(&self, total_pages: usize, bytes: usize) {
        let _ = (total_pages, bytes);
    }
}

/// Convenience alias for a shared, heap-allocated progress callback.
pub type ProgressCallback = Arc<dyn QuizProgressCallback>;

/// No-op implementation; useful as an explicit placeholder.
pub struct NoopProgressCallback;

impl QuizProgressCallback for NoopProgressCallback {}
