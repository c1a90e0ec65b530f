// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Vision engine seam.
//
// The capture session talks to the image pipeline exclusively through this
// trait, so tests can substitute a mock engine and the production pipeline
// stays swappable.

use image::DynamicImage;
use quire_core::config::CaptureConfig;
use quire_core::error::QuireError;
use quire_core::types::{CornerSet, FilterMode};

use crate::detect::{self, Detection};
use crate::filter;
use crate::frame::CapturedFrame;
use crate::warp::{self, CroppedPage};

/// Image-processing capabilities the capture pipeline depends on.
pub trait VisionEngine: Send + Sync {
    /// Propose a document boundary for a captured frame. Never fails:
    /// a fallback corner set is returned when detection finds nothing.
    fn detect_document(&self, frame: &CapturedFrame) -> Detection;

    /// Warp the corner quadrilateral into an upright rectangle.
    fn normalize(&self, frame: &CapturedFrame, corners: &CornerSet) -> CroppedPage;

    /// Derive the filtered preview bitmap for a page. Must not mutate the
    /// page itself.
    fn apply_filter(
        &self,
        page: &CroppedPage,
        mode: FilterMode,
    ) -> Result<DynamicImage, QuireError>;
}

/// Production vision engine backed by the `image`/`imageproc` pipeline.
#[derive(Debug, Clone, Default)]
pub struct DocumentVision {
    config: CaptureConfig,
}

impl DocumentVision {
    pub fn new(config: CaptureConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }
}

impl VisionEngine for DocumentVision {
    fn detect_document(&self, frame: &CapturedFrame) -> Detection {
        detect::detect_document(frame, &self.config)
    }

    fn normalize(&self, frame: &CapturedFrame, corners: &CornerSet) -> CroppedPage {
        warp::normalize(frame, corners)
    }

    fn apply_filter(
        &self,
        page: &CroppedPage,
        mode: FilterMode,
    ) -> Result<DynamicImage, QuireError> {
        filter::apply(page, mode, &self.config)
    }
}
