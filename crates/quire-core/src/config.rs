// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pipeline tuning configuration.

use serde::{Deserialize, Serialize};

/// Numeric tuning for the capture pipeline.
///
/// The defaults are the values the pipeline ships with; every stage reads
/// its constants from here so they can be adjusted in one place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Longest side of a captured frame, in pixels. Larger camera frames are
    /// downscaled to this budget before any processing (quality/performance
    /// trade-off, not a correctness requirement).
    pub max_capture_dim: u32,
    /// Gaussian blur sigma applied before edge analysis.
    pub blur_sigma: f32,
    /// Neighbourhood radius for the detection-pass adaptive threshold.
    pub detect_block_radius: u32,
    /// Bias subtracted from the local mean in the detection pass.
    pub detect_bias: i32,
    /// Radius of the morphological closing that merges fragmented edges.
    pub close_radius: u8,
    /// Minimum candidate area as a fraction of total frame area.
    pub min_area_frac: f64,
    /// Polygon approximation tolerance as a fraction of contour perimeter.
    pub approx_eps_frac: f64,
    /// Fallback rectangle inset as a fraction of each frame dimension.
    pub fallback_margin_frac: f32,
    /// Neighbourhood radius for the black-and-white filter threshold.
    /// Larger than the detection pass: tuned for readability, not edges.
    pub bw_block_radius: u32,
    /// Bias subtracted from the local mean in the black-and-white filter.
    pub bw_bias: i32,
    /// Contrast factor for the enhance filter.
    pub enhance_contrast: f32,
    /// Brightness offset for the enhance filter.
    pub enhance_brightness: f32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            max_capture_dim: 1600,
            blur_sigma: 2.0,
            detect_block_radius: 10,
            detect_bias: 5,
            close_radius: 3,
            min_area_frac: 0.10,
            approx_eps_frac: 0.02,
            fallback_margin_frac: 0.05,
            bw_block_radius: 15,
            bw_bias: 10,
            enhance_contrast: 1.3,
            enhance_brightness: 18.0,
        }
    }
}
