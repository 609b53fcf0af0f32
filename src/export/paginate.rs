//! Page-slicing plan for a captured quiz image.
//!
//! The image is scaled to the printable width (`page_width - 2*margin`). Its
//! scaled height is cut into slices of at most `page_height - 2*margin`; each
//! slice is cropped from the source image and placed at the top margin of
//! its own page.

use crate::config::PaperSize;

/// Guards against an extra near-empty page when the height is an exact
/// multiple of the usable height but picks up float noise.
const PAGE_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq)]
pub struct PagePlan {
    pub page_width_mm: f32,
    pub page_height_mm: f32,
    pub margin_mm: f32,
    /// Width the image is drawn at.
    pub image_width_mm: f32,
    /// Full scaled image height.
    pub image_height_mm: f32,
    /// `page_height - 2*margin`.
    pub usable_height_mm: f32,
    pub slices: Vec<PageSlice>,
}

impl PagePlan {
    pub fn page_count(&self) -> usize {
        self.slices.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageSlice {
    /// 0-based page index.
    pub index: usize,
    /// First source pixel row of this slice.
    pub src_top_px: u32,
    pub src_height_px: u32,
    /// Drawn height of this slice on the page.
    pub height_mm: f32,
    /// Vertical offset at which the whole image would be placed on this
    /// page to show the same slice: `margin - index * usable`.
    pub offset_mm: f32,
}

/// Number of pages for an image `image_height_mm` tall.
pub fn page_count(image_height_mm: f32, page_height_mm: f32, margin_mm: f32) -> usize {
    let usable = f64::from(page_height_mm - 2.0 * margin_mm);
    let ratio = f64::from(image_height_mm) / usable;
    ((ratio - PAGE_EPSILON).ceil() as usize).max(1)
}

/// Plan the pages for an image of `image_width_px` x `image_height_px`.
pub fn plan_pages(
    image_width_px: u32,
    image_height_px: u32,
    paper: PaperSize,
    margin_mm: f32,
) -> PagePlan {
    let (page_width_mm, page_height_mm) = paper.dimensions_mm();
    let image_width_mm = page_width_mm - 2.0 * margin_mm;
    let usable_height_mm = page_height_mm - 2.0 * margin_mm;

    let width_px = image_width_px.max(1);
    let height_px = image_height_px.max(1);
    let px_per_mm = f64::from(width_px) / f64::from(image_width_mm);
    let image_height_mm = (f64::from(height_px) / px_per_mm) as f32;

    let pages = page_count(image_height_mm, page_height_mm, margin_mm);
    let mut slices = Vec::with_capacity(pages);

    for index in 0..pages {
        let top_mm = index as f64 * f64::from(usable_height_mm);
        let bottom_mm = (top_mm + f64::from(usable_height_mm)).min(f64::from(image_height_mm));

        let src_top_px = ((top_mm * px_per_mm).round() as u32).min(height_px - 1);
        let src_bottom_px = ((bottom_mm * px_per_mm).round() as u32).min(height_px);
        let src_height_px = src_bottom_px.saturating_sub(src_top_px).max(1);

        slices.push(PageSlice {
            index,
            src_top_px,
            src_height_px,
            height_mm: (f64::from(src_height_px) / px_per_mm) as f32,
            offset_mm: margin_mm - index as f32 * usable_height_mm,
        });
    }

    PagePlan {
        page_width_mm,
        page_height_mm,
        margin_mm,
        image_width_mm,
        image_height_mm,
        usable_height_mm,
        slices,
    }
}
