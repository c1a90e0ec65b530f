// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page filters — selectable visual treatments applied to a cropped page.
//
// Filters are non-destructive: each application derives a fresh bitmap from
// the retained unfiltered page, so the user can switch modes freely and
// always get back to a pixel-identical `Normal` rendition.

use image::{DynamicImage, Rgba};
use quire_core::config::CaptureConfig;
use quire_core::error::QuireError;
use quire_core::types::FilterMode;
use tracing::{debug, instrument};

use crate::threshold::binarize;
use crate::warp::CroppedPage;

/// Apply the selected filter to a cropped page, producing the preview bitmap.
#[instrument(skip(page, config), fields(width = page.width(), height = page.height()))]
pub fn apply(
    page: &CroppedPage,
    mode: FilterMode,
    config: &CaptureConfig,
) -> Result<DynamicImage, QuireError> {
    let result = match mode {
        FilterMode::Normal => page.image().clone(),
        FilterMode::Bw => black_and_white(page, config),
        FilterMode::Enhance => enhance(page, config),
    };
    debug!("Filter applied");
    Ok(result)
}

/// Scan-style binarization: grayscale, adaptive threshold with a larger
/// neighbourhood and bias than the detection pass (tuned for readability),
/// re-expanded to RGBA so every stored page shares one channel layout.
fn black_and_white(page: &CroppedPage, config: &CaptureConfig) -> DynamicImage {
    let gray = page.image().to_luma8();
    let bin = binarize(&gray, config.bw_block_radius, config.bw_bias);
    DynamicImage::ImageRgba8(DynamicImage::ImageLuma8(bin).to_rgba8())
}

/// Linear contrast/brightness remap simulating a brightened scan:
/// `out = in * contrast + brightness`, clamped per channel. Alpha is kept.
fn enhance(page: &CroppedPage, config: &CaptureConfig) -> DynamicImage {
    let rgba = page.image().to_rgba8();
    let contrast = config.enhance_contrast;
    let brightness = config.enhance_brightness;

    let remapped = image::ImageBuffer::from_fn(rgba.width(), rgba.height(), |x, y| {
        let Rgba([r, g, b, a]) = *rgba.get_pixel(x, y);
        let remap = |channel: u8| -> u8 {
            (channel as f32 * contrast + brightness).clamp(0.0, 255.0) as u8
        };
        Rgba([remap(r), remap(g), remap(b), a])
    });

    DynamicImage::ImageRgba8(remapped)
}
