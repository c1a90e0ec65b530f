// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Coordinate mapping between the displayed view and native frame space.
//
// Every interactive handler goes through this one utility instead of
// recomputing ad hoc scale factors, so the two coordinate spaces cannot
// drift apart.

use quire_core::types::Point;
use serde::{Deserialize, Serialize};

/// The rectangle the frame is displayed in, in display pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl ViewRect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Two-way mapping between display space and frame space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMap {
    frame_width: u32,
    frame_height: u32,
    view: ViewRect,
}

impl CoordinateMap {
    pub fn new(frame_width: u32, frame_height: u32, view: ViewRect) -> Self {
        Self {
            frame_width,
            frame_height,
            view,
        }
    }

    /// Translate a display-space point into frame pixel space, clamped into
    /// frame bounds.
    pub fn to_frame(&self, display: Point) -> Point {
        let scale_x = self.frame_width as f32 / self.view.width.max(f32::EPSILON);
        let scale_y = self.frame_height as f32 / self.view.height.max(f32::EPSILON);

        let x = (display.x - self.view.x) * scale_x;
        let y = (display.y - self.view.y) * scale_y;

        let max_x = (self.frame_width.saturating_sub(1)) as f32;
        let max_y = (self.frame_height.saturating_sub(1)) as f32;
        Point::new(x.clamp(0.0, max_x), y.clamp(0.0, max_y))
    }

    /// Translate a frame-space point into display space.
    pub fn to_view(&self, frame: Point) -> Point {
        let scale_x = self.view.width / (self.frame_width.max(1)) as f32;
        let scale_y = self.view.height / (self.frame_height.max(1)) as f32;
        Point::new(
            self.view.x + frame.x * scale_x,
            self.view.y + frame.y * scale_y,
        )
    }
}
