//! Quiz session: the user-facing state machine.
//!
//! ```text
//!            select_file                generate
//!   Idle ───────────────▶ Configuring ───────────▶ Generating ──▶ Ready
//!    ▲                        ▲                        │            │
//!    │ start_over             │ dismiss_error          ▼            │ download
//!    └──────────────────── Errored ◀───────────────────┴────────────┘ (on failure)
//! ```
//!
//! Every action takes `&mut self`, so two actions can never overlap; the
//! `Generating` state is only observable from inside [`Session::generate`]
//! (and through the progress callback while the request is in flight).
//! Question counts are form inputs held beside the state and survive
//! [`Session::start_over`].

use crate::config::QuizConfig;
use crate::error::{ErrorKind, QuizError};
use crate::export;
use crate::pipeline::encode::encode_file;
use crate::pipeline::generate::generate_quiz;
use crate::pipeline::input::{resolve_input, SourceFile};
use crate::quiz::{GenerationRequest, QuestionCounts, Quiz};
use crate::render::{render_quiz, QuizView};
use crate::service::QuizService;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The single error message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBanner {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&QuizError> for ErrorBanner {
    fn from(err: &QuizError) -> Self {
        Self {
            kind: err.kind(),
            message: err.user_message(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Configuring {
        file: SourceFile,
    },
    Generating {
        file: SourceFile,
    },
    Ready {
        file: SourceFile,
        quiz: Quiz,
    },
    Errored {
        file: Option<SourceFile>,
        quiz: Option<Quiz>,
        error: ErrorBanner,
    },
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Configuring { .. } => "configuring",
            SessionState::Generating { .. } => "generating",
            SessionState::Ready { .. } => "ready",
            SessionState::Errored { .. } => "errored",
        }
    }
}

pub struct Session {
    service: Arc<dyn QuizService>,
    config: QuizConfig,
    counts: QuestionCounts,
    state: SessionState,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("service", &self.service.name())
            .field("counts", &self.counts)
            .field("state", &self.state.name())
            .finish()
    }
}

impl Session {
    /// A fresh session. Counts start from `config.counts`.
    pub fn new(service: Arc<dyn QuizService>, config: QuizConfig) -> Self {
        Self {
            service,
            counts: config.counts,
            config,
            state: SessionState::Idle,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn counts(&self) -> QuestionCounts {
        self.counts
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.state, SessionState::Generating { .. })
    }

    pub fn file(&self) -> Option<&SourceFile> {
        match &self.state {
            SessionState::Idle => None,
            SessionState::Configuring { file }
            | SessionState::Generating { file }
            | SessionState::Ready { file, .. } => Some(file),
            SessionState::Errored { file, .. } => file.as_ref(),
        }
    }

    pub fn quiz(&self) -> Option<&Quiz> {
        match &self.state {
            SessionState::Ready { quiz, .. } => Some(quiz),
            SessionState::Errored { quiz, .. } => quiz.as_ref(),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ErrorBanner> {
        match &self.state {
            SessionState::Errored { error, .. } => Some(error),
            _ => None,
        }
    }

    /// The rendered quiz, when one is held.
    pub fn view(&self) -> Option<QuizView> {
        self.quiz().map(render_quiz)
    }

    /// Choose a file; any previous quiz or error is discarded.
    pub fn select_file(&mut self, file: SourceFile) {
        info!("Selected '{}' ({} bytes)", file.name, file.bytes.len());
        self.state = SessionState::Configuring { file };
    }

    /// Load `input` (path or URL) and select it.
    ///
    /// On failure the session moves to `Errored` with no file.
    pub async fn open(&mut self, input: &str) -> Result<(), QuizError> {
        match resolve_input(
            input,
            self.config.download_timeout_secs,
            self.config.max_file_bytes,
        )
        .await
        {
            Ok(file) => {
                self.select_file(file);
                Ok(())
            }
            Err(e) => {
                warn!("Could not open '{}': {}", input, e);
                self.state = SessionState::Errored {
                    file: None,
                    quiz: None,
                    error: ErrorBanner::from(&e),
                };
                Err(e)
            }
        }
    }

    /// Update the requested counts. The state is unchanged.
    pub fn set_counts(&mut self, counts: QuestionCounts) {
        debug!("Counts set to {} MCQ / {} T/F", counts.mcq, counts.true_false);
        self.counts = counts;
    }

    /// Generate a quiz for the selected file.
    ///
    /// Without a file, or with both counts zero, the session moves to
    /// `Errored` and the service is not called.
    pub async fn generate(&mut self) -> Result<&Quiz, QuizError> {
        let (file, held) = match std::mem::take(&mut self.state) {
            SessionState::Configuring { file } => (file, None),
            SessionState::Ready { file, quiz } => (file, Some(quiz)),
            SessionState::Errored {
                file: Some(file),
                quiz,
                ..
            } => (file, quiz),
            other => {
                let quiz = match other {
                    SessionState::Errored { quiz, .. } => quiz,
                    _ => None,
                };
                return Err(self.fail(None, quiz, QuizError::NoFileSelected));
            }
        };

        // A rejected request never started, so the held quiz stays.
        if self.counts.is_empty() {
            return Err(self.fail(Some(file), held, QuizError::NoQuestionsRequested));
        }

        let request = GenerationRequest {
            file: encode_file(&file, self.config.mime_type.as_deref()),
            counts: self.counts,
        };
        self.state = SessionState::Generating { file };

        let result = generate_quiz(self.service.as_ref(), &request, &self.config).await;
        let file = match std::mem::take(&mut self.state) {
            SessionState::Generating { file } => file,
            other => {
                self.state = other;
                return Err(QuizError::Internal(
                    "session left the generating state during a request".into(),
                ));
            }
        };

        match result {
            Ok(quiz) => {
                self.state = SessionState::Ready { file, quiz };
                self.quiz()
                    .ok_or_else(|| QuizError::Internal("quiz missing after generation".into()))
            }
            Err(e) => Err(self.fail(Some(file), None, e)),
        }
    }

    /// Export the held quiz as a PDF into `dir`.
    ///
    /// On success the state is unchanged. On failure the session moves to
    /// `Errored`, keeping the file and quiz so the user can retry.
    pub async fn download(&mut self, dir: impl AsRef<Path>) -> Result<PathBuf, QuizError> {
        let Some(view) = self.view() else {
            return Err(QuizError::Internal("there is no quiz to download".into()));
        };

        match export::export_to_file(
            &view,
            dir,
            &self.config.export,
            self.config.progress_callback.clone(),
        )
        .await
        {
            Ok(path) => Ok(path),
            Err(e) => {
                let (file, quiz) = match std::mem::take(&mut self.state) {
                    SessionState::Ready { file, quiz } => (Some(file), Some(quiz)),
                    SessionState::Errored { file, quiz, .. } => (file, quiz),
                    other => {
                        self.state = other;
                        return Err(e);
                    }
                };
                Err(self.fail(file, quiz, e))
            }
        }
    }

    /// Hide the error banner, returning to whatever the session still holds.
    pub fn dismiss_error(&mut self) {
        if !matches!(self.state, SessionState::Errored { .. }) {
            return;
        }
        if let SessionState::Errored { file, quiz, .. } = std::mem::take(&mut self.state) {
            self.state = match (file, quiz) {
                (Some(file), Some(quiz)) => SessionState::Ready { file, quiz },
                (Some(file), None) => SessionState::Configuring { file },
                (None, _) => SessionState::Idle,
            };
        }
    }

    /// Back to the initial empty state. Counts are kept.
    pub fn start_over(&mut self) {
        info!("Starting over");
        self.state = SessionState::Idle;
    }

    fn fail(&mut self, file: Option<SourceFile>, quiz: Option<Quiz>, err: QuizError) -> QuizError {
        let error = ErrorBanner::from(&err);
        warn!("{}: {}", error.message, err);
        self.state = SessionState::Errored { file, quiz, error };
        err
    }
}
