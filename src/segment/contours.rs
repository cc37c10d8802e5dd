// Phase 2: contour extraction: 0/255 mask -> outlines (bbox + area)

use image::GrayImage;
use imageproc::contours::{BorderType, Contour, find_contours};
use imageproc::geometry::contour_area;

use super::Rect;

/// Bounding box and enclosed area of one outline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Outline {
    pub bbox: Rect,
    pub area: f64,
}

/// Outermost outlines only: nested holes and anything inside them are skipped.
pub fn outer_outlines(mask: &GrayImage) -> Vec<Outline> {
    find_contours::<u32>(mask)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .filter_map(|c| outline_of(&c))
        .collect()
}

/// Row coordinate of every point on every outline, outer and hole alike.
pub fn outline_rows(mask: &GrayImage) -> Vec<u32> {
    find_contours::<u32>(mask)
        .into_iter()
        .flat_map(|c| c.points.into_iter().map(|p| p.y))
        .collect()
}

fn outline_of(contour: &Contour<u32>) -> Option<Outline> {
    let first = contour.points.first()?;
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
    for p in &contour.points {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    Some(Outline {
        bbox: Rect::new(min_x, min_y, max_x - min_x + 1, max_y - min_y + 1),
        area: contour_area(&contour.points),
    })
}
