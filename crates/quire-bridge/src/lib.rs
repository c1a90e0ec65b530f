// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// quire-bridge — Camera stream acquisition for the Quire capture pipeline.
//
// The capture session interacts with the camera only through the
// `CameraOpener` / `CameraStream` traits, so the same pipeline runs over a
// live device camera, a file queue (the desktop substitute for a camera),
// an in-memory frame queue, or nothing at all.

pub mod file;
pub mod memory;
pub mod stub;
pub mod traits;

pub use file::{FileCamera, FileOpener};
pub use memory::{MemoryCamera, MemoryOpener};
pub use stub::StubOpener;
pub use traits::{CameraOpener, CameraPrefs, CameraStream};

/// The default opener for the current platform.
///
/// Native capture backends (AVFoundation, Camera2) slot in here per target
/// OS; everywhere else the stub reports the capability as unavailable and
/// callers fall back to an explicit [`FileOpener`] or [`MemoryOpener`].
pub fn platform_opener() -> Box<dyn CameraOpener> {
    Box::new(stub::StubOpener)
}
