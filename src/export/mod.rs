//! PDF Exporter.
//!
//! ```text
//! QuizView ──▶ layout ──▶ capture ──▶ paginate ──▶ pdf
//!             (draw ops)  (pdfium,    (slice       (one A4 page
//!                          2x bitmap)  plan)        per slice)
//! ```
//!
//! Everything after layout touches PDFium and runs inside
//! `spawn_blocking`; the C library is CPU-bound and not async-safe.

pub mod capture;
pub mod engine;
pub mod layout;
pub mod paginate;
pub mod pdf;

use crate::config::ExportConfig;
use crate::error::{ExportError, QuizError};
use crate::progress::ProgressCallback;
use crate::render::QuizView;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// A finished PDF held in memory.
#[derive(Debug, Clone)]
pub struct ExportedPdf {
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

/// Export `view` as a paginated PDF.
pub async fn export_to_pdf(view: &QuizView, config: &ExportConfig) -> Result<ExportedPdf, QuizError> {
    export_to_pdf_with_progress(view, config, None).await
}

/// [`export_to_pdf`] reporting page progress to `progress`.
pub async fn export_to_pdf_with_progress(
    view: &QuizView,
    config: &ExportConfig,
    progress: Option<ProgressCallback>,
) -> Result<ExportedPdf, QuizError> {
    config.validate()?;

    let region = layout::layout_quiz(view, config.region_width_pt);
    debug!(
        "Laid out quiz region: {}x{:.0}pt, {} draw ops",
        region.width_pt,
        region.height_pt,
        region.ops.len()
    );
    let scale = config.scale;
    let paper = config.paper;
    let margin_mm = config.margin_mm;
    let font_path = config.font_path.clone();
    let start = Instant::now();

    let exported = tokio::task::spawn_blocking(move || -> Result<ExportedPdf, QuizError> {
        let font_data = font_path.as_deref().map(read_font).transpose()?;
        let font_name = font_path
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        let font = font_data.as_deref().map(|data| capture::EmbeddedFont {
            name: &font_name,
            data,
        });

        let pdfium = engine::bind_pdfium()?;
        let image = capture::capture_region(&pdfium, &region, scale, font)?;
        let plan = paginate::plan_pages(image.width(), image.height(), paper, margin_mm);

        if let Some(cb) = &progress {
            cb.on_export_start(plan.page_count());
        }
        let bytes = pdf::assemble_pdf(&pdfium, &image, &plan, progress.as_ref())?;
        if let Some(cb) = &progress {
            cb.on_export_complete(plan.page_count(), bytes.len());
        }

        Ok(ExportedPdf {
            bytes,
            page_count: plan.page_count(),
        })
    })
    .await
    .map_err(|e| QuizError::Internal(format!("Export task panicked: {}", e)))??;

    info!(
        "Exported PDF: {} page(s), {} bytes in {}ms",
        exported.page_count,
        exported.bytes.len(),
        start.elapsed().as_millis()
    );
    Ok(exported)
}

fn read_font(path: &Path) -> Result<Vec<u8>, ExportError> {
    std::fs::read(path).map_err(|e| ExportError::FontUnavailable {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Export `view` and write it to `dir/<config.file_name>`.
///
/// The PDF is written to a temporary sibling first and renamed into place, so
/// a failed export never leaves a partial file behind.
pub async fn export_to_file(
    view: &QuizView,
    dir: impl AsRef<Path>,
    config: &ExportConfig,
    progress: Option<ProgressCallback>,
) -> Result<PathBuf, QuizError> {
    let exported = export_to_pdf_with_progress(view, config, progress).await?;
    let path = dir.as_ref().join(&config.file_name);
    write_atomic(&path, &exported.bytes).await?;
    info!("Wrote {}", path.display());
    Ok(path)
}

async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), QuizError> {
    let write_err = |e: std::io::Error| QuizError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let tmp_path = path.with_extension("pdf.tmp");
    if let Err(e) = tokio::fs::write(&tmp_path, bytes).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(write_err(e));
    }
    if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(write_err(e));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::{McqItem, Quiz, TrueFalseItem};
    use crate::render::render_quiz;

    /// Skip unless a PDFium library is available to bind.
    macro_rules! skip_unless_pdfium {
        () => {{
            if !engine::is_configured() && std::env::var("E2E_ENABLED").is_err() {
                println!("SKIP: set PDFIUM_LIB_PATH or E2E_ENABLED=1 to run PDFium tests");
                return;
            }
        }};
    }

    fn quiz(mcqs: usize, tfs: usize) -> Quiz {
        Quiz {
            mcqs: (0..mcqs)
                .map(|i| McqItem {
                    question: format!("What does section {i} describe?"),
                    options: vec![
                        "The introduction".into(),
                        "The method".into(),
                        "The results".into(),
                        "The appendix".into(),
                    ],
                    answer: "The method".into(),
                })
                .collect(),
            true_false: (0..tfs)
                .map(|i| TrueFalseItem {
                    question: format!("Claim {i} is supported by the text."),
                    answer: i % 2 == 1,
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn write_atomic_creates_file_and_leaves_no_temp() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("quiz.pdf");
        write_atomic(&path, b"%PDF-1.7").await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.7");
        assert!(!path.with_extension("pdf.tmp").exists());
    }

    #[tokio::test]
    async fn write_atomic_reports_unwritable_target() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();
        // A regular file cannot be used as a directory.
        let err = write_atomic(&blocker.join("quiz.pdf"), b"data")
            .await
            .unwrap_err();
        assert!(matches!(err, QuizError::OutputWriteFailed { .. }));
    }

    #[tokio::test]
    async fn invalid_config_fails_before_pdfium() {
        let config = ExportConfig {
            margin_mm: 200.0,
            ..ExportConfig::default()
        };
        let err = export_to_pdf(&render_quiz(&quiz(1, 1)), &config)
            .await
            .unwrap_err();
        assert!(matches!(err, QuizError::InvalidConfig(_)));
    }

    #[tokio::test]
    async fn short_quiz_is_one_page() {
        skip_unless_pdfium!();
        let exported = export_to_pdf(&render_quiz(&quiz(1, 2)), &ExportConfig::default())
            .await
            .expect("export should succeed");
        assert_eq!(exported.page_count, 1);
        assert!(exported.bytes.starts_with(b"%PDF"));
    }

    /// Page count the default A4 export should produce for `view`.
    fn expected_pages(view: &QuizView, config: &ExportConfig) -> usize {
        let region = layout::layout_quiz(view, config.region_width_pt);
        let (width_px, height_px) = capture::capture_size(&region, config.scale).unwrap();
        let (page_w, page_h) = config.paper.dimensions_mm();
        let height_mm = height_px as f32 * (page_w - 2.0 * config.margin_mm) / width_px as f32;
        paginate::page_count(height_mm, page_h, config.margin_mm)
    }

    #[test]
    fn twenty_mcq_layout_paginates_by_usable_height() {
        let config = ExportConfig::default();
        let view = render_quiz(&quiz(20, 0));
        let region = layout::layout_quiz(&view, config.region_width_pt);
        let (width_px, height_px) = capture::capture_size(&region, config.scale).unwrap();
        let plan = paginate::plan_pages(width_px, height_px, config.paper, config.margin_mm);

        let height_mm = f64::from(height_px) * 190.0 / f64::from(width_px);
        let expected = (height_mm / 277.0).ceil() as usize;
        assert!(expected > 1, "20 MCQs should not fit on one page");
        assert_eq!(plan.page_count(), expected);
        assert_eq!(expected_pages(&view, &config), expected);

        let covered: u32 = plan.slices.iter().map(|s| s.src_height_px).sum();
        assert_eq!(covered, height_px);
    }

    #[tokio::test]
    async fn missing_font_file_is_an_export_error() {
        let config = ExportConfig {
            font_path: Some(PathBuf::from("/nonexistent/NotoSansCJK.ttf")),
            ..ExportConfig::default()
        };
        let err = export_to_pdf(&render_quiz(&quiz(1, 1)), &config)
            .await
            .unwrap_err();
        match err {
            QuizError::Export(ExportError::FontUnavailable { path, .. }) => {
                assert!(path.ends_with("NotoSansCJK.ttf"))
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn long_quiz_spans_pages() {
        skip_unless_pdfium!();
        let config = ExportConfig::default();
        let view = render_quiz(&quiz(20, 20));
        let exported = export_to_pdf(&view, &config)
            .await
            .expect("export should succeed");
        assert!(exported.page_count > 1, "got {} page(s)", exported.page_count);
        assert_eq!(exported.page_count, expected_pages(&view, &config));
    }

    #[tokio::test]
    async fn export_to_file_writes_named_pdf() {
        skip_unless_pdfium!();
        let dir = tempfile::tempdir().unwrap();
        let path = export_to_file(&render_quiz(&quiz(3, 2)), dir.path(), &ExportConfig::default(), None)
            .await
            .expect("export should succeed");
        assert_eq!(path.file_name().unwrap(), "ai-generated-quiz.pdf");
        assert!(std::fs::read(&path).unwrap().starts_with(b"%PDF"));
    }
}
