// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory camera — a queue of pre-decoded frames, for tests and for
// embedding the pipeline behind a host that supplies its own bitmaps.

use std::collections::VecDeque;

use image::DynamicImage;
use quire_core::error::{QuireError, Result};

use crate::traits::{CameraOpener, CameraPrefs, CameraStream};

/// Camera stream fed by a queue of decoded images.
pub struct MemoryCamera {
    queue: VecDeque<DynamicImage>,
    active: bool,
}

impl MemoryCamera {
    pub fn new(frames: impl IntoIterator<Item = DynamicImage>) -> Self {
        Self {
            queue: frames.into_iter().collect(),
            active: true,
        }
    }
}

impl CameraStream for MemoryCamera {
    fn grab_frame(&mut self) -> Result<DynamicImage> {
        if !self.active {
            return Err(QuireError::CameraInactive);
        }
        self.queue.pop_front().ok_or(QuireError::EmptyFrame)
    }

    fn stop(&mut self) {
        self.active = false;
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

/// Opener handing out a fresh [`MemoryCamera`] over the same frames.
pub struct MemoryOpener {
    frames: Vec<DynamicImage>,
}

impl MemoryOpener {
    pub fn new(frames: impl IntoIterator<Item = DynamicImage>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }
}

impl CameraOpener for MemoryOpener {
    fn open(&self, _prefs: &CameraPrefs) -> Result<Box<dyn CameraStream>> {
        Ok(Box::new(MemoryCamera::new(self.frames.clone())))
    }
}
