//! CLI binary for docquiz.
//!
//! A thin shim over the library crate: maps CLI flags to `QuizConfig`,
//! drives a `Session` through open → generate → download, and prints the
//! quiz to stdout.

use anyhow::{Context, Result};
use clap::Parser;
use docquiz::{
    export_to_file, render_html, render_quiz, render_text, ExportConfig, GeminiService, PaperSize,
    ProgressCallback, QuestionCounts, Quiz, QuizConfig, QuizError, QuizProgressCallback, QuizView,
    Session,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Spinner while the model works, then a page bar while the PDF is built.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);
        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl QuizProgressCallback for CliProgressCallback {
    fn on_generation_start(&self, file_name: &str, counts: QuestionCounts) {
        self.bar.set_prefix("Generating");
        self.bar.set_message(format!(
            "{file_name}: {} multiple choice + {} true/false…",
            counts.mcq, counts.true_false
        ));
    }

    fn on_generation_complete(&self, mcqs: usize, true_false: usize, duration_ms: u64) {
        self.bar.println(format!(
            "  {} Quiz ready  {}  {}",
            green("✓"),
            dim(&format!("{mcqs} MCQ / {true_false} T/F")),
            dim(&format!("{:.1}s", duration_ms as f64 / 1000.0)),
        ));
        self.bar.set_prefix("Done");
        self.bar.set_message("");
    }

    fn on_generation_error(&self, error: &str) {
        let msg = if error.chars().count() > 100 {
            format!("{}\u{2026}", error.chars().take(99).collect::<String>())
        } else {
            error.to_string()
        };
        self.bar.println(format!("  {} {}", red("✗"), red(&msg)));
    }

    fn on_export_start(&self, total_pages: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}/{len} pages",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);
        self.bar.set_style(style);
        self.bar.set_length(total_pages as u64);
        self.bar.set_position(0);
        self.bar.set_prefix("Exporting");
    }

    fn on_export_page(&self, page_num: usize, _total_pages: usize) {
        self.bar.set_position(page_num as u64);
    }

    fn on_export_complete(&self, total_pages: usize, bytes: usize) {
        self.bar.println(format!(
            "  {} PDF assembled  {}",
            green("✓"),
            dim(&format!("{total_pages} page(s), {} KiB", bytes / 1024)),
        ));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # 5 multiple-choice + 5 true/false questions, PDF in the current directory
  docquiz lecture.pdf

  # Choose the mix and the output directory
  docquiz --mcq 3 --tf 2 -o quizzes/ chapter-4.pdf

  # From a URL, also saving the raw quiz and an HTML page
  docquiz https://arxiv.org/pdf/1706.03762 --json quiz.json --html quiz.html

  # Re-render a saved quiz without calling the model (no API key needed)
  docquiz --from-json quiz.json --html quiz.html

  # Terminal only, no PDF
  docquiz --no-pdf notes.md

SUPPORTED INPUTS:
  PDF, PNG, JPEG, GIF, WEBP, plain text, Markdown, CSV, HTML, JSON, and any
  other type the model accepts as inline data (use --mime-type to force one).
  Files are limited to 20 MiB.

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY          Google Gemini API key (API_KEY is also accepted)
  DOCQUIZ_MODEL           Override model ID (default: gemini-2.5-flash)
  PDFIUM_LIB_PATH         Path to libpdfium (file or directory) for PDF export
  RUST_LOG                Log filter, e.g. docquiz=debug

SETUP:
  1. Set API key:     export GEMINI_API_KEY=...
  2. Install PDFium:  put libpdfium on the library path or set PDFIUM_LIB_PATH
  3. Generate:        docquiz document.pdf
"#;

/// Generate a quiz from a document with Gemini and export it as PDF.
#[derive(Parser, Debug)]
#[command(
    name = "docquiz",
    version,
    about = "Generate multiple-choice and true/false quizzes from documents",
    long_about = "Upload a document (local file or URL) to a Gemini model, get back a quiz of \
multiple-choice and true/false questions, print it, and export it as a paginated A4 PDF.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local file path or HTTP/HTTPS URL.
    #[arg(required_unless_present = "from_json")]
    input: Option<String>,

    /// Number of multiple-choice questions.
    #[arg(long = "mcq", env = "DOCQUIZ_MCQ", default_value_t = 5)]
    mcq: u32,

    /// Number of true/false questions.
    #[arg(long = "tf", env = "DOCQUIZ_TF", default_value_t = 5)]
    true_false: u32,

    /// Gemini model ID.
    #[arg(long, env = "DOCQUIZ_MODEL", default_value = docquiz::config::DEFAULT_MODEL)]
    model: String,

    /// Gemini API key.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Gemini API base URL.
    #[arg(long, env = "DOCQUIZ_API_BASE_URL", default_value = docquiz::config::DEFAULT_API_BASE_URL)]
    api_base_url: String,

    /// Directory the PDF is written to.
    #[arg(short, long, env = "DOCQUIZ_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// PDF file name.
    #[arg(long, env = "DOCQUIZ_PDF_NAME", default_value = docquiz::config::DEFAULT_PDF_FILE_NAME)]
    pdf_name: String,

    /// Skip the PDF export.
    #[arg(long, env = "DOCQUIZ_NO_PDF")]
    no_pdf: bool,

    /// Also write the quiz as a standalone HTML page.
    #[arg(long, env = "DOCQUIZ_HTML")]
    html: Option<PathBuf>,

    /// Also write the quiz as JSON (reusable with --from-json).
    #[arg(long, env = "DOCQUIZ_JSON")]
    json: Option<PathBuf>,

    /// Render a previously saved quiz JSON instead of calling the model.
    #[arg(long, conflicts_with = "input")]
    from_json: Option<PathBuf>,

    /// Force the MIME type sent with the file.
    #[arg(long, env = "DOCQUIZ_MIME_TYPE")]
    mime_type: Option<String>,

    /// Path to a text file with a custom instruction. `{mcq_count}` and
    /// `{true_false_count}` are substituted.
    #[arg(long, env = "DOCQUIZ_PROMPT_FILE")]
    prompt_file: Option<PathBuf>,

    /// Sampling temperature (0.0–2.0).
    #[arg(long, env = "DOCQUIZ_TEMPERATURE")]
    temperature: Option<f32>,

    /// Model request timeout in seconds (default: none).
    #[arg(long, env = "DOCQUIZ_API_TIMEOUT")]
    api_timeout: Option<u64>,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "DOCQUIZ_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Paper size of the PDF.
    #[arg(long, env = "DOCQUIZ_PAPER", value_enum, default_value = "a4")]
    paper: PaperArg,

    /// Page margin in millimetres.
    #[arg(long, env = "DOCQUIZ_MARGIN_MM", default_value_t = 10.0)]
    margin_mm: f32,

    /// Capture pixel density.
    #[arg(long, env = "DOCQUIZ_SCALE", default_value_t = 2.0)]
    scale: f32,

    /// TrueType font for PDF text; needed for non-Latin scripts.
    #[arg(long, env = "DOCQUIZ_FONT")]
    font: Option<PathBuf>,

    /// Disable the progress spinner.
    #[arg(long, env = "DOCQUIZ_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DOCQUIZ_VERBOSE")]
    verbose: bool,

    /// Suppress everything on stderr except errors.
    #[arg(short, long, env = "DOCQUIZ_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum PaperArg {
    A4,
    Letter,
}

impl From<PaperArg> for PaperSize {
    fn from(v: PaperArg) -> Self {
        match v {
            PaperArg::A4 => PaperSize::A4,
            PaperArg::Letter => PaperSize::Letter,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner gives the feedback that matters; INFO logs would tear it.
    let show_progress = !cli.quiet && !cli.no_progress;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let progress = show_progress.then(CliProgressCallback::new);
    let progress_cb: Option<ProgressCallback> = progress
        .clone()
        .map(|cb| cb as Arc<dyn QuizProgressCallback>);

    let config = build_config(&cli, progress_cb).await?;

    // ── Re-render mode ───────────────────────────────────────────────────
    if let Some(ref path) = cli.from_json {
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read quiz JSON from {}", path.display()))?;
        let quiz: Quiz = serde_json::from_str(&raw)
            .with_context(|| format!("{} is not a saved quiz", path.display()))?;
        let result = emit(&cli, &config, &quiz).await;
        if let Some(ref p) = progress {
            p.finish();
        }
        return result;
    }

    // ── Generate ─────────────────────────────────────────────────────────
    let input = cli
        .input
        .as_deref()
        .context("An input file or URL is required")?;
    let service = GeminiService::from_config(&config).map_err(banner)?;
    let mut session = Session::new(Arc::new(service), config.clone());

    let outcome = async {
        session.open(input).await.map_err(banner)?;
        session.set_counts(QuestionCounts::new(cli.mcq, cli.true_false));
        let quiz = session.generate().await.map_err(banner)?.clone();
        emit_with_session(&cli, &config, &mut session, &quiz).await
    }
    .await;

    if let Some(ref p) = progress {
        p.finish();
    }
    outcome
}

/// Print and save the quiz, exporting through the session so a failed
/// export is reflected in its state.
async fn emit_with_session(
    cli: &Cli,
    config: &QuizConfig,
    session: &mut Session,
    quiz: &Quiz,
) -> Result<()> {
    let view = render_quiz(quiz);
    write_side_outputs(cli, quiz, &view).await?;
    print_quiz(&view)?;

    if !cli.no_pdf {
        let path = session.download(&cli.output_dir).await.map_err(banner)?;
        report_pdf(cli, config, &path);
    }
    Ok(())
}

/// [`emit_with_session`] for a quiz loaded from disk.
async fn emit(cli: &Cli, config: &QuizConfig, quiz: &Quiz) -> Result<()> {
    let view = render_quiz(quiz);
    write_side_outputs(cli, quiz, &view).await?;
    print_quiz(&view)?;

    if !cli.no_pdf {
        let path = export_to_file(
            &view,
            &cli.output_dir,
            &config.export,
            config.progress_callback.clone(),
        )
        .await
        .map_err(banner)?;
        report_pdf(cli, config, &path);
    }
    Ok(())
}

async fn write_side_outputs(cli: &Cli, quiz: &Quiz, view: &QuizView) -> Result<()> {
    if let Some(ref path) = cli.json {
        let json = serde_json::to_string_pretty(quiz).context("Failed to serialise quiz")?;
        write_file(path, json.as_bytes()).await?;
    }
    if let Some(ref path) = cli.html {
        let html = render_html(view, "AI Generated Quiz").map_err(banner)?;
        write_file(path, html.as_bytes()).await?;
    }
    Ok(())
}

fn print_quiz(view: &QuizView) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(render_text(view).as_bytes())
        .context("Failed to write to stdout")?;
    Ok(())
}

fn report_pdf(cli: &Cli, config: &QuizConfig, path: &Path) {
    if !cli.quiet {
        eprintln!(
            "{}  {}  →  {}",
            green("✔"),
            config.export.file_name,
            bold(&path.display().to_string()),
        );
    }
}

async fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    tokio::fs::write(path, bytes)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))
}

/// Attach the user-facing message to a library error.
fn banner(err: QuizError) -> anyhow::Error {
    let message = err.user_message();
    anyhow::Error::new(err).context(message)
}

/// Map CLI args to `QuizConfig`.
async fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<QuizConfig> {
    let prompt_template = if let Some(ref path) = cli.prompt_file {
        Some(
            tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read prompt from {:?}", path))?,
        )
    } else {
        None
    };

    let export = ExportConfig {
        paper: cli.paper.into(),
        margin_mm: cli.margin_mm,
        scale: cli.scale,
        file_name: cli.pdf_name.clone(),
        font_path: cli.font.clone(),
        ..ExportConfig::default()
    };

    let mut builder = QuizConfig::builder()
        .model(cli.model.clone())
        .api_base_url(cli.api_base_url.clone())
        .counts(QuestionCounts::new(cli.mcq, cli.true_false))
        .download_timeout_secs(cli.download_timeout)
        .export(export);

    if let Some(ref key) = cli.api_key {
        builder = builder.api_key(key.clone());
    }
    if let Some(template) = prompt_template {
        builder = builder.prompt_template(template);
    }
    if let Some(t) = cli.temperature {
        builder = builder.temperature(t);
    }
    if let Some(secs) = cli.api_timeout {
        builder = builder.request_timeout_secs(secs);
    }
    if let Some(ref mime) = cli.mime_type {
        builder = builder.mime_type(mime.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
