// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic trait definitions for camera capture.

use image::DynamicImage;
use quire_core::error::Result;

/// Constraints requested when opening a camera stream.
#[derive(Debug, Clone)]
pub struct CameraPrefs {
    /// Prefer the rear-facing camera where the device has more than one.
    pub prefer_back_camera: bool,
    /// Requested stream width in pixels (a hint, not a guarantee).
    pub target_width: u32,
    /// Requested stream height in pixels (a hint, not a guarantee).
    pub target_height: u32,
}

impl Default for CameraPrefs {
    fn default() -> Self {
        Self {
            prefer_back_camera: true,
            target_width: 1920,
            target_height: 1080,
        }
    }
}

/// A live camera stream.
///
/// The stream is a shared hardware resource with single-owner discipline:
/// whoever opened it must call [`stop`](CameraStream::stop) on every path
/// that leaves the scanning stage. `stop` must be idempotent.
pub trait CameraStream: Send {
    /// Grab one still bitmap from the stream. Grabbing does not stop the
    /// stream. Errors when the source has not produced a frame yet.
    fn grab_frame(&mut self) -> Result<DynamicImage>;

    /// Release the underlying capture resource (stop tracks).
    fn stop(&mut self);

    /// Whether the stream is still running.
    fn is_active(&self) -> bool;
}

/// Opens camera streams.
pub trait CameraOpener: Send + Sync {
    /// Request a live stream honouring the given preferences.
    fn open(&self, prefs: &CameraPrefs) -> Result<Box<dyn CameraStream>>;
}
