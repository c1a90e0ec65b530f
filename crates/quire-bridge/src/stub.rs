// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stub opener for builds without any capture capability.

use quire_core::error::{QuireError, Result};

use crate::traits::{CameraOpener, CameraPrefs, CameraStream};

/// Opener that always reports the camera as unavailable.
pub struct StubOpener;

impl CameraOpener for StubOpener {
    fn open(&self, _prefs: &CameraPrefs) -> Result<Box<dyn CameraStream>> {
        tracing::warn!("CameraOpener::open called on stub opener");
        Err(QuireError::PlatformUnavailable)
    }
}
