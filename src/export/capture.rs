//! Draw a [`RegionLayout`] on a single PDFium page and rasterise it.

use crate::error::ExportError;
use crate::export::layout::{DrawOp, RegionLayout, Rgb};
use image::DynamicImage;
use pdfium_render::prelude::*;
use tracing::{debug, warn};

/// Largest bitmap edge the capture will produce.
pub const MAX_CANVAS_PX: u32 = 32_767;

/// Pixel size of the capture of `layout` at `scale`.
pub fn capture_size(layout: &RegionLayout, scale: f32) -> Result<(u32, u32), ExportError> {
    let width_px = (layout.width_pt * scale).ceil().max(1.0) as u32;
    let height_px = (layout.height_pt * scale).ceil().max(1.0) as u32;
    if height_px > MAX_CANVAS_PX {
        return Err(ExportError::RegionTooTall {
            height_px,
            max_px: MAX_CANVAS_PX,
        });
    }
    if width_px > MAX_CANVAS_PX {
        return Err(ExportError::Capture(format!(
            "capture width {width_px}px exceeds {MAX_CANVAS_PX}px"
        )));
    }
    Ok((width_px, height_px))
}

/// A TrueType font to embed instead of the built-in Helvetica.
#[derive(Debug, Clone, Copy)]
pub struct EmbeddedFont<'a> {
    /// Shown in errors.
    pub name: &'a str,
    pub data: &'a [u8],
}

/// Rasterise `layout` at `scale` pixels per point.
///
/// With `font`, every run (bold ones included) is drawn in that font.
/// Without it, text outside WinAnsi has no glyphs and a warning is logged.
pub fn capture_region(
    pdfium: &Pdfium,
    layout: &RegionLayout,
    scale: f32,
    font: Option<EmbeddedFont<'_>>,
) -> Result<DynamicImage, ExportError> {
    let (width_px, height_px) = capture_size(layout, scale)?;
    let capture_err = |e: PdfiumError| ExportError::Capture(format!("{e:?}"));

    let mut document = pdfium.create_new_pdf().map_err(capture_err)?;
    let (regular, bold) = match font {
        Some(font) => {
            let token = document
                .fonts_mut()
                .load_true_type_from_bytes(font.data, true)
                .map_err(|e| ExportError::FontUnavailable {
                    path: font.name.to_string(),
                    reason: format!("{e:?}"),
                })?;
            (token, token)
        }
        None => {
            let missing = layout.non_win_ansi_chars();
            if !missing.is_empty() {
                warn!(
                    "{} character(s) cannot be drawn with the built-in font (e.g. {:?}); \
                     configure a TrueType font to render them",
                    missing.len(),
                    missing.iter().take(8).collect::<String>()
                );
            }
            (
                document.fonts_mut().helvetica(),
                document.fonts_mut().helvetica_bold(),
            )
        }
    };

    let mut page = document
        .pages_mut()
        .create_page_at_end(PdfPagePaperSize::Custom(
            PdfPoints::new(layout.width_pt),
            PdfPoints::new(layout.height_pt),
        ))
        .map_err(capture_err)?;

    let height = layout.height_pt;
    for op in &layout.ops {
        match op {
            DrawOp::Rect {
                x,
                y,
                width,
                height: h,
                fill,
            } => {
                if *h <= 0.0 || *width <= 0.0 {
                    continue;
                }
                let rect = PdfRect::new_from_values(height - (y + h), *x, height - y, x + width);
                page.objects_mut()
                    .create_path_object_rect(rect, None, None, Some(color(*fill)))
                    .map_err(capture_err)?;
            }
            DrawOp::Text {
                x,
                y,
                text,
                size,
                bold: is_bold,
                color: ink,
            } => {
                let font = if *is_bold { bold } else { regular };
                let mut object =
                    PdfPageTextObject::new(&document, text, font, PdfPoints::new(*size))
                        .map_err(capture_err)?;
                object.set_fill_color(color(*ink)).map_err(capture_err)?;
                object
                    .translate(PdfPoints::new(*x), PdfPoints::new(height - y))
                    .map_err(capture_err)?;
                page.objects_mut()
                    .add_text_object(object)
                    .map_err(capture_err)?;
            }
        }
    }

    let render_config = PdfRenderConfig::new()
        .set_target_width(width_px as i32)
        .set_maximum_height(height_px as i32);
    let bitmap = page.render_with_config(&render_config).map_err(capture_err)?;
    let image = bitmap.as_image();

    debug!(
        "Captured quiz region {}x{}pt → {}x{} px",
        layout.width_pt,
        layout.height_pt,
        image.width(),
        image.height()
    );
    Ok(image)
}

fn color(rgb: Rgb) -> PdfColor {
    PdfColor::new(rgb.0, rgb.1, rgb.2, 255)
}
