// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// `quire detect` — run boundary detection on one image and print the
// proposed corner set as JSON.

use std::path::Path;

use quire_core::config::CaptureConfig;
use quire_core::types::{CornerSet, DetectionMethod};
use quire_vision::{DocumentVision, VisionEngine, frame};
use serde::Serialize;

#[derive(Serialize)]
struct DetectOutput {
    method: &'static str,
    width: u32,
    height: u32,
    corners: CornerSet,
}

pub fn run(image: &Path) -> Result<(), i32> {
    let raw = match image::open(image) {
        Ok(img) => img,
        Err(err) => {
            eprintln!("error: failed to open {}: {err}", image.display());
            return Err(1);
        }
    };

    let config = CaptureConfig::default();
    let frame = match frame::acquire(raw, config.max_capture_dim) {
        Ok(frame) => frame,
        Err(err) => {
            eprintln!("error: {err}");
            return Err(1);
        }
    };

    let engine = DocumentVision::new(config);
    let detection = engine.detect_document(&frame);

    let output = DetectOutput {
        method: match detection.method {
            DetectionMethod::Auto => "auto",
            DetectionMethod::Fallback => "fallback",
        },
        width: frame.width(),
        height: frame.height(),
        corners: detection.corners,
    };

    match serde_json::to_string_pretty(&output) {
        Ok(json) => {
            println!("{json}");
            Ok(())
        }
        Err(err) => {
            eprintln!("error: {err}");
            Err(1)
        }
    }
}
