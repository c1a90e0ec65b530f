// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// quire-vision — Image pipeline for the Quire capture flow.
//
// Provides frame acquisition (downscale to a pixel budget), document boundary
// detection (adaptive threshold + contour analysis), perspective normalization
// (projective warp to an upright rectangle), and page filtering (black-and-white
// binarization, contrast enhancement).

pub mod detect;
pub mod engine;
pub mod filter;
pub mod frame;
pub mod threshold;
pub mod warp;

// Re-export the primary types so callers can use `quire_vision::CapturedFrame` etc.
pub use detect::Detection;
pub use engine::{DocumentVision, VisionEngine};
pub use frame::CapturedFrame;
pub use warp::CroppedPage;
