// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document boundary detection.
//
// Finds the quadrilateral most likely bounding a physical document in a
// captured frame. Detection never fails the flow: when no usable contour
// survives filtering, a centered fallback rectangle is synthesized and the
// caller is told so via `DetectionMethod::Fallback`.

use imageproc::contours::{BorderType, find_contours};
use imageproc::distance_transform::Norm;
use imageproc::filter::gaussian_blur_f32;
use imageproc::geometry::{approximate_polygon_dp, arc_length};
use imageproc::morphology::close;
use imageproc::point::Point as ContourPoint;
use quire_core::config::CaptureConfig;
use quire_core::types::{CornerSet, DetectionMethod, Point};
use tracing::{debug, instrument, warn};

use crate::frame::CapturedFrame;
use crate::threshold::dark_mask;

/// Result of boundary detection. Always carries a valid corner set.
#[derive(Debug, Clone, Copy)]
pub struct Detection {
    pub corners: CornerSet,
    pub method: DetectionMethod,
}

/// Detect the document boundary in a captured frame.
///
/// ## Pipeline
///
/// 1. Convert to grayscale
/// 2. Gaussian blur to suppress noise-driven false edges
/// 3. Adaptive threshold into a locally-dark edge mask
/// 4. Morphological closing to merge fragmented edge segments
/// 5. Extract outer contours of connected regions
/// 6. Keep contours that reduce to a convex 4-vertex polygon covering at
///    least `min_area_frac` of the frame
/// 7. Take the largest surviving quadrilateral and classify its vertices
///    into corner roles
///
/// Any miss falls back to a centered rectangle inset by
/// `fallback_margin_frac` of each frame dimension.
#[instrument(skip_all, fields(width = frame.width(), height = frame.height()))]
pub fn detect_document(frame: &CapturedFrame, config: &CaptureConfig) -> Detection {
    let (width, height) = frame.dimensions();

    match find_document_quad(frame, config) {
        Some(points) => {
            let corners = CornerSet::from_unordered(points).clamp(width, height);
            debug!(?corners, "Document boundary detected");
            Detection {
                corners,
                method: DetectionMethod::Auto,
            }
        }
        None => {
            warn!("No document boundary found; falling back to inset rectangle");
            Detection {
                corners: CornerSet::inset(width, height, config.fallback_margin_frac),
                method: DetectionMethod::Fallback,
            }
        }
    }
}

fn find_document_quad(frame: &CapturedFrame, config: &CaptureConfig) -> Option<[Point; 4]> {
    let gray = frame.image().to_luma8();
    let blurred = gaussian_blur_f32(&gray, config.blur_sigma);
    let mask = dark_mask(&blurred, config.detect_block_radius, config.detect_bias);
    let closed = close(&mask, Norm::LInf, config.close_radius);

    let contours = find_contours::<i32>(&closed);
    debug!(contour_count = contours.len(), "Contours extracted");

    let min_area = frame.width() as f64 * frame.height() as f64 * config.min_area_frac;

    let mut best: Option<(f64, [Point; 4])> = None;
    for contour in &contours {
        if contour.border_type != BorderType::Outer {
            continue;
        }
        // Cheap reject: a contour whose bounding box is below the area gate
        // cannot enclose enough area either.
        if bounding_box_area(&contour.points) < min_area {
            continue;
        }

        let perimeter = arc_length(&contour.points, true);
        let approx =
            approximate_polygon_dp(&contour.points, perimeter * config.approx_eps_frac, true);
        if approx.len() != 4 {
            continue;
        }

        let quad = [
            Point::new(approx[0].x as f32, approx[0].y as f32),
            Point::new(approx[1].x as f32, approx[1].y as f32),
            Point::new(approx[2].x as f32, approx[2].y as f32),
            Point::new(approx[3].x as f32, approx[3].y as f32),
        ];
        if !is_convex_quad(&quad) {
            continue;
        }

        let area = shoelace_area(&quad);
        if area < min_area {
            continue;
        }
        if best.is_none_or(|(best_area, _)| area > best_area) {
            best = Some((area, quad));
        }
    }

    best.map(|(area, quad)| {
        debug!(area, "Best quadrilateral candidate selected");
        quad
    })
}

fn bounding_box_area(points: &[ContourPoint<i32>]) -> f64 {
    let mut min_x = i32::MAX;
    let mut max_x = i32::MIN;
    let mut min_y = i32::MAX;
    let mut max_y = i32::MIN;
    for p in points {
        min_x = min_x.min(p.x);
        max_x = max_x.max(p.x);
        min_y = min_y.min(p.y);
        max_y = max_y.max(p.y);
    }
    if min_x > max_x || min_y > max_y {
        return 0.0;
    }
    (max_x - min_x) as f64 * (max_y - min_y) as f64
}

/// A quadrilateral is convex when every consecutive edge pair turns the same
/// way. Collinear vertices (zero cross product) count as degenerate, not
/// convex.
fn is_convex_quad(quad: &[Point; 4]) -> bool {
    let mut positive = 0;
    let mut negative = 0;
    for i in 0..4 {
        let a = quad[i];
        let b = quad[(i + 1) % 4];
        let c = quad[(i + 2) % 4];
        let cross = (b.x - a.x) * (c.y - b.y) - (b.y - a.y) * (c.x - b.x);
        if cross > 0.0 {
            positive += 1;
        } else if cross < 0.0 {
            negative += 1;
        } else {
            return false;
        }
    }
    positive == 4 || negative == 4
}

/// Enclosed area of a quadrilateral via the shoelace formula. Vertices must
/// be in order (either winding).
fn shoelace_area(quad: &[Point; 4]) -> f64 {
    let mut area = 0.0f64;
    for i in 0..4 {
        let j = (i + 1) % 4;
        area += quad[i].x as f64 * quad[j].y as f64;
        area -= quad[j].x as f64 * quad[i].y as f64;
    }
    area.abs() / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, GrayImage, Luma};

    fn frame_from_gray(img: GrayImage) -> CapturedFrame {
        CapturedFrame::new(DynamicImage::ImageLuma8(img))
    }

    #[test]
    fn all_black_frame_falls_back_to_inset_rectangle() {
        let frame = frame_from_gray(GrayImage::from_pixel(1920, 1080, Luma([0u8])));
        let detection = detect_document(&frame, &CaptureConfig::default());

        assert_eq!(detection.method, DetectionMethod::Fallback);
        let c = detection.corners;
        assert_eq!(c.tl, Point::new(96.0, 54.0));
        assert_eq!(c.tr, Point::new(1824.0, 54.0));
        assert_eq!(c.bl, Point::new(96.0, 1026.0));
        assert_eq!(c.br, Point::new(1824.0, 1026.0));
    }

    #[test]
    fn bright_rectangle_on_dark_background_is_detected() {
        let (w, h) = (400u32, 500u32);
        let mut img = GrayImage::from_pixel(w, h, Luma([30u8]));
        for y in 60..440 {
            for x in 50..350 {
                img.put_pixel(x, y, Luma([240u8]));
            }
        }
        let frame = frame_from_gray(img);
        let detection = detect_document(&frame, &CaptureConfig::default());

        assert_eq!(detection.method, DetectionMethod::Auto);
        let c = detection.corners;
        // The detected outline sits on the edge band around the rectangle,
        // which extends outward by up to the threshold window radius.
        let tolerance = 25.0;
        assert!(c.tl.distance(&Point::new(50.0, 60.0)) < tolerance, "tl = {:?}", c.tl);
        assert!(c.tr.distance(&Point::new(350.0, 60.0)) < tolerance, "tr = {:?}", c.tr);
        assert!(c.bl.distance(&Point::new(50.0, 440.0)) < tolerance, "bl = {:?}", c.bl);
        assert!(c.br.distance(&Point::new(350.0, 440.0)) < tolerance, "br = {:?}", c.br);
    }

    #[test]
    fn small_speck_is_rejected_in_favour_of_fallback() {
        let (w, h) = (400u32, 400u32);
        let mut img = GrayImage::from_pixel(w, h, Luma([30u8]));
        // 20x20 = 0.25% of the frame, well under the 10% gate.
        for y in 100..120 {
            for x in 100..120 {
                img.put_pixel(x, y, Luma([240u8]));
            }
        }
        let frame = frame_from_gray(img);
        let detection = detect_document(&frame, &CaptureConfig::default());
        assert_eq!(detection.method, DetectionMethod::Fallback);
    }

    #[test]
    fn convexity_check_accepts_rectangles_and_rejects_bowties() {
        let rect = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ];
        assert!(is_convex_quad(&rect));

        let bowtie = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(10.0, 0.0),
            Point::new(0.0, 10.0),
        ];
        assert!(!is_convex_quad(&bowtie));
    }

    #[test]
    fn shoelace_area_rectangle() {
        let rect = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 5.0),
            Point::new(0.0, 5.0),
        ];
        assert!((shoelace_area(&rect) - 50.0).abs() < 1e-6);
    }
}
