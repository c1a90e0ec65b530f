// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Frame acquisition — turns a raw grabbed bitmap into an immutable
// `CapturedFrame`, bounded to a fixed pixel budget.

use std::sync::Arc;

use image::DynamicImage;
use quire_core::error::QuireError;
use tracing::{debug, info, instrument};

/// A single still frame captured from the camera stream.
///
/// Immutable once created; cloning is cheap (the bitmap is shared), which
/// lets a frame cross a task boundary for background detection without
/// copying pixels.
#[derive(Clone)]
pub struct CapturedFrame {
    image: Arc<DynamicImage>,
}

impl CapturedFrame {
    pub fn new(image: DynamicImage) -> Self {
        Self {
            image: Arc::new(image),
        }
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }
}

impl std::fmt::Debug for CapturedFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapturedFrame")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

/// Acquire a still frame from a raw grabbed bitmap.
///
/// Rejects zero-dimension input (the video source has not produced a frame
/// yet). Frames whose longest side exceeds `max_dim` are downscaled to fit,
/// preserving aspect ratio, to bound downstream processing cost.
#[instrument(skip(raw), fields(width = raw.width(), height = raw.height(), max_dim))]
pub fn acquire(raw: DynamicImage, max_dim: u32) -> Result<CapturedFrame, QuireError> {
    let (w, h) = (raw.width(), raw.height());
    if w == 0 || h == 0 {
        return Err(QuireError::EmptyFrame);
    }

    if w.max(h) <= max_dim {
        debug!("Frame within pixel budget, no downscale");
        return Ok(CapturedFrame::new(raw));
    }

    let scaled = raw.resize(max_dim, max_dim, image::imageops::FilterType::Lanczos3);
    info!(
        from_w = w,
        from_h = h,
        to_w = scaled.width(),
        to_h = scaled.height(),
        "Frame downscaled to capture budget"
    );
    Ok(CapturedFrame::new(scaled))
}
