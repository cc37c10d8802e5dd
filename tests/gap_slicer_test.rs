// Gap slicing: band construction and detection on synthetic pages

use image::{DynamicImage, GrayImage, Luma};

use manga_frames::segment::gap_slicer::{Band, GapSlicer, clip_bands, slice_bands};
use manga_frames::segment::{PageImage, PageRef, RegionDetector, RegionKind};

fn page_from(gray: GrayImage) -> PageImage {
    PageImage {
        source: PageRef {
            path: "chapter_1/001.png".into(),
            chapter: 1,
            page: 1,
        },
        image: DynamicImage::ImageLuma8(gray),
    }
}

/// White page with solid black boxes spanning the given row ranges.
fn page_with_boxes(width: u32, height: u32, rows: &[(u32, u32)]) -> PageImage {
    let mut gray = GrayImage::from_pixel(width, height, Luma([255]));
    for &(top, bottom) in rows {
        for y in top..bottom {
            for x in 40..width - 40 {
                gray.put_pixel(x, y, Luma([0]));
            }
        }
    }
    page_from(gray)
}

// ============================================================
// 1. Band construction
// ============================================================

#[test]
fn test_slice_bands_splits_at_large_gap() {
    let bands = slice_bands(&[10, 12, 15, 200, 205], 120, 30);
    assert_eq!(
        bands,
        vec![
            Band { start: 10, end: 45 },
            Band {
                start: 170,
                end: 235
            },
        ]
    );
}

#[test]
fn test_slice_bands_unsorted_input() {
    let bands = slice_bands(&[205, 15, 200, 10, 12], 120, 30);
    assert_eq!(bands.len(), 2);
    assert_eq!(bands[0], Band { start: 10, end: 45 });
}

#[test]
fn test_slice_bands_no_gap_single_band() {
    let bands = slice_bands(&[5, 50, 100, 150], 120, 30);
    assert_eq!(bands, vec![Band { start: 5, end: 180 }]);
}

#[test]
fn test_slice_bands_gap_equal_to_threshold_does_not_split() {
    let bands = slice_bands(&[0, 120], 120, 0);
    assert_eq!(bands, vec![Band { start: 0, end: 120 }]);
}

#[test]
fn test_slice_bands_empty() {
    assert!(slice_bands(&[], 120, 30).is_empty());
}

#[test]
fn test_clip_bands_clamps_to_height() {
    let bands = [
        Band {
            start: -20,
            end: 40,
        },
        Band {
            start: 180,
            end: 260,
        },
    ];
    assert_eq!(clip_bands(&bands, 200), vec![(0, 40), (180, 200)]);
}

#[test]
fn test_clip_bands_drops_empty() {
    let bands = [Band {
        start: 250,
        end: 300,
    }];
    assert!(clip_bands(&bands, 200).is_empty());
}

// ============================================================
// 2. Detection
// ============================================================

#[test]
fn test_detect_two_stacked_panels() {
    let page = page_with_boxes(300, 800, &[(60, 240), (500, 700)]);
    let candidates = GapSlicer::new(120, 30)
        .detect(&page)
        .expect("detection should succeed");

    assert_eq!(candidates.len(), 2, "expected two bands: {candidates:?}");
    for c in &candidates {
        assert_eq!(c.kind, RegionKind::Unclassified);
        assert_eq!(c.bbox.x, 0);
        assert_eq!(c.bbox.width, 300, "bands span the full page width");
        assert_eq!(c.area, c.bbox.width as f64 * c.bbox.height as f64);
    }

    let first = candidates[0].bbox;
    let second = candidates[1].bbox;
    assert!(first.y <= 62 && first.bottom() >= 238, "first: {first:?}");
    assert!(second.y <= 502 && second.bottom() >= 698, "second: {second:?}");
    assert!(first.bottom() <= second.y, "bands must not overlap");
}

#[test]
fn test_detect_blank_page_yields_nothing() {
    let page = page_from(GrayImage::from_pixel(200, 300, Luma([255])));
    let candidates = GapSlicer::default()
        .detect(&page)
        .expect("detection should succeed");
    assert!(candidates.is_empty());
}

#[test]
fn test_detect_empty_image_fails() {
    let page = page_from(GrayImage::new(0, 0));
    assert!(GapSlicer::default().detect(&page).is_err());
}
