// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Perspective normalization — warps the committed corner quadrilateral into
// an upright rectangle.

use std::sync::Arc;

use image::{DynamicImage, Rgba, RgbaImage};
use imageproc::geometric_transformations::{Interpolation, Projection, warp_into};
use quire_core::types::CornerSet;
use tracing::{debug, instrument, warn};

use crate::frame::CapturedFrame;

/// An upright page bitmap produced by perspective normalization.
///
/// Immutable; the unfiltered page is retained for as long as the user keeps
/// switching filters, so every filter derives from the same pixels.
#[derive(Clone)]
pub struct CroppedPage {
    image: Arc<DynamicImage>,
}

impl CroppedPage {
    pub fn new(image: DynamicImage) -> Self {
        Self {
            image: Arc::new(image),
        }
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    /// Shared handle to the underlying bitmap.
    pub fn image_arc(&self) -> Arc<DynamicImage> {
        Arc::clone(&self.image)
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

impl std::fmt::Debug for CroppedPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CroppedPage")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

/// Warp the corner quadrilateral of `frame` into an upright rectangle.
///
/// The output rectangle is sized by [`CornerSet::output_size`]: the longer of
/// each pair of opposing edges, so foreshortened content is never cropped.
/// Pixels mapping outside the source are filled with white.
///
/// Degenerate corner sets (near-zero area, collinear points) never panic:
/// the output size is clamped to at least 1x1, and if no projective
/// transform exists the axis-aligned bounding box of the corners is cropped
/// and resized as a best-effort result.
#[instrument(skip(frame), fields(width = frame.width(), height = frame.height()))]
pub fn normalize(frame: &CapturedFrame, corners: &CornerSet) -> CroppedPage {
    let (out_w, out_h) = corners.output_size();

    let src: [(f32, f32); 4] = [
        (corners.tl.x, corners.tl.y),
        (corners.tr.x, corners.tr.y),
        (corners.br.x, corners.br.y),
        (corners.bl.x, corners.bl.y),
    ];
    let dest: [(f32, f32); 4] = [
        (0.0, 0.0),
        (out_w as f32, 0.0),
        (out_w as f32, out_h as f32),
        (0.0, out_h as f32),
    ];

    let projection = match Projection::from_control_points(src, dest) {
        Some(p) => p,
        None => {
            warn!("Degenerate corner set; cropping bounding box instead of warping");
            return bounding_box_crop(frame, corners, out_w, out_h);
        }
    };

    let rgba_input = frame.image().to_rgba8();
    let background = Rgba([255u8, 255, 255, 255]);
    let mut output = RgbaImage::new(out_w, out_h);

    warp_into(
        &rgba_input,
        &projection,
        Interpolation::Bilinear,
        background,
        &mut output,
    );

    debug!(out_w, out_h, "Perspective normalization applied");
    CroppedPage::new(DynamicImage::ImageRgba8(output))
}

/// Best-effort output for corner sets that admit no projective transform:
/// crop the axis-aligned bounding box of the corners (clamped into the
/// frame, at least one pixel) and resize it to the computed output size.
fn bounding_box_crop(
    frame: &CapturedFrame,
    corners: &CornerSet,
    out_w: u32,
    out_h: u32,
) -> CroppedPage {
    let xs = [corners.tl.x, corners.tr.x, corners.bl.x, corners.br.x];
    let ys = [corners.tl.y, corners.tr.y, corners.bl.y, corners.br.y];

    let min_x = xs.iter().fold(f32::INFINITY, |a, &b| a.min(b)).max(0.0);
    let min_y = ys.iter().fold(f32::INFINITY, |a, &b| a.min(b)).max(0.0);
    let max_x = xs.iter().fold(f32::NEG_INFINITY, |a, &b| a.max(b));
    let max_y = ys.iter().fold(f32::NEG_INFINITY, |a, &b| a.max(b));

    let (frame_w, frame_h) = frame.dimensions();
    let x = (min_x as u32).min(frame_w.saturating_sub(1));
    let y = (min_y as u32).min(frame_h.saturating_sub(1));
    let w = (((max_x - min_x).ceil() as u32).max(1)).min(frame_w - x);
    let h = (((max_y - min_y).ceil() as u32).max(1)).min(frame_h - y);

    let cropped = frame.image().crop_imm(x, y, w.max(1), h.max(1));
    let resized = cropped.resize_exact(out_w, out_h, image::imageops::FilterType::Lanczos3);
    CroppedPage::new(resized)
}
