//! Assemble the paginated PDF from a captured image and a [`PagePlan`].

use crate::error::ExportError;
use crate::export::paginate::PagePlan;
use crate::progress::ProgressCallback;
use image::DynamicImage;
use pdfium_render::prelude::*;
use tracing::debug;

/// Build a PDF with one page per slice of `plan` and return its bytes.
pub fn assemble_pdf(
    pdfium: &Pdfium,
    image: &DynamicImage,
    plan: &PagePlan,
    progress: Option<&ProgressCallback>,
) -> Result<Vec<u8>, ExportError> {
    let assembly_err = |e: PdfiumError| ExportError::Assembly(format!("{e:?}"));
    let total = plan.page_count();

    let mut document = pdfium.create_new_pdf().map_err(assembly_err)?;
    for slice in &plan.slices {
        let cropped = image.crop_imm(0, slice.src_top_px, image.width(), slice.src_height_px);

        let mut page = document
            .pages_mut()
            .create_page_at_end(PdfPagePaperSize::Custom(
                PdfPoints::from_mm(plan.page_width_mm),
                PdfPoints::from_mm(plan.page_height_mm),
            ))
            .map_err(assembly_err)?;

        // PDF y runs upwards: the slice's bottom edge sits `margin + height`
        // below the top of the page.
        let y_mm = plan.page_height_mm - plan.margin_mm - slice.height_mm;
        page.objects_mut()
            .create_image_object(
                PdfPoints::from_mm(plan.margin_mm),
                PdfPoints::from_mm(y_mm),
                &cropped,
                Some(PdfPoints::from_mm(plan.image_width_mm)),
                Some(PdfPoints::from_mm(slice.height_mm)),
            )
            .map_err(assembly_err)?;

        debug!(
            "Page {}/{}: rows {}..{} ({:.1}mm)",
            slice.index + 1,
            total,
            slice.src_top_px,
            slice.src_top_px + slice.src_height_px,
            slice.height_mm
        );
        if let Some(cb) = progress {
            cb.on_export_page(slice.index + 1, total);
        }
    }

    document.save_to_bytes().map_err(assembly_err)
}
