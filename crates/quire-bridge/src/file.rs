// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// File-backed camera — the desktop substitute for live capture. Each grab
// pops the next image path off the queue and decodes it.
//
// The opener hands out streams drawing from one shared queue, so a capture
// flow that stops and reopens the camera between pages continues with the
// next file rather than starting over.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use image::DynamicImage;
use quire_core::error::{QuireError, Result};
use tracing::{debug, info};

use crate::traits::{CameraOpener, CameraPrefs, CameraStream};

type SharedQueue = Arc<Mutex<VecDeque<PathBuf>>>;

/// Camera stream fed by a queue of image files.
pub struct FileCamera {
    queue: SharedQueue,
    active: bool,
}

impl FileCamera {
    pub fn new(paths: impl IntoIterator<Item = PathBuf>) -> Self {
        Self::over(Arc::new(Mutex::new(paths.into_iter().collect())))
    }

    fn over(queue: SharedQueue) -> Self {
        Self {
            queue,
            active: true,
        }
    }

    /// Number of frames remaining in the queue.
    pub fn remaining(&self) -> usize {
        lock_queue(&self.queue).len()
    }
}

impl CameraStream for FileCamera {
    fn grab_frame(&mut self) -> Result<DynamicImage> {
        if !self.active {
            return Err(QuireError::CameraInactive);
        }
        let path = lock_queue(&self.queue)
            .pop_front()
            .ok_or(QuireError::EmptyFrame)?;
        let img = image::open(&path).map_err(|err| {
            QuireError::ImageError(format!("failed to decode {}: {}", path.display(), err))
        })?;
        debug!(path = %path.display(), width = img.width(), height = img.height(), "Frame grabbed from file");
        Ok(img)
    }

    fn stop(&mut self) {
        if self.active {
            info!("File camera stopped");
        }
        self.active = false;
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

/// Opener whose streams share one path queue.
pub struct FileOpener {
    queue: SharedQueue,
}

impl FileOpener {
    pub fn new(paths: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            queue: Arc::new(Mutex::new(paths.into_iter().collect())),
        }
    }
}

impl CameraOpener for FileOpener {
    fn open(&self, _prefs: &CameraPrefs) -> Result<Box<dyn CameraStream>> {
        Ok(Box::new(FileCamera::over(Arc::clone(&self.queue))))
    }
}

fn lock_queue(queue: &SharedQueue) -> std::sync::MutexGuard<'_, VecDeque<PathBuf>> {
    queue.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
