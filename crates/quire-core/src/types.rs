// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Quire capture pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A 2D point in source-frame pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: &Point) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Identity of one of the four draggable corner handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    /// All four corners, in (tl, tr, bl, br) order.
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];
}

/// Four corner points bounding a document region within a captured frame.
///
/// Corners are held by role (top-left, top-right, bottom-left, bottom-right)
/// in the pixel space of the frame they were detected in. All four points are
/// expected to lie within frame bounds; convexity and non-degeneracy are NOT
/// enforced — downstream normalization tolerates degenerate quadrilaterals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CornerSet {
    pub tl: Point,
    pub tr: Point,
    pub bl: Point,
    pub br: Point,
}

impl CornerSet {
    pub fn new(tl: Point, tr: Point, bl: Point, br: Point) -> Self {
        Self { tl, tr, bl, br }
    }

    /// Classify four unordered vertices into corner roles.
    ///
    /// Top-left is the vertex minimising `x + y`, bottom-right the one
    /// maximising it; top-right minimises `y - x`, bottom-left maximises it.
    /// The sum/difference assignment holds for quadrilaterals rotated up to
    /// roughly 45 degrees from axis alignment; beyond that the roles can
    /// swap. Documents photographed at steeper angles are a known limitation.
    pub fn from_unordered(points: [Point; 4]) -> Self {
        let sum = |p: &Point| p.x + p.y;
        let diff = |p: &Point| p.y - p.x;

        let mut tl = points[0];
        let mut br = points[0];
        let mut tr = points[0];
        let mut bl = points[0];

        for p in &points[1..] {
            if sum(p) < sum(&tl) {
                tl = *p;
            }
            if sum(p) > sum(&br) {
                br = *p;
            }
            if diff(p) < diff(&tr) {
                tr = *p;
            }
            if diff(p) > diff(&bl) {
                bl = *p;
            }
        }

        Self { tl, tr, bl, br }
    }

    /// Default corner set for a frame where detection found nothing usable:
    /// a centered rectangle inset from each edge by `margin_frac` of the
    /// frame dimension.
    pub fn inset(width: u32, height: u32, margin_frac: f32) -> Self {
        let mx = width as f32 * margin_frac;
        let my = height as f32 * margin_frac;
        let w = width as f32;
        let h = height as f32;
        Self {
            tl: Point::new(mx, my),
            tr: Point::new(w - mx, my),
            bl: Point::new(mx, h - my),
            br: Point::new(w - mx, h - my),
        }
    }

    /// Read one corner by handle identity.
    pub fn point(&self, corner: Corner) -> Point {
        match corner {
            Corner::TopLeft => self.tl,
            Corner::TopRight => self.tr,
            Corner::BottomLeft => self.bl,
            Corner::BottomRight => self.br,
        }
    }

    /// Replace one corner by handle identity. Corners are independent:
    /// moving one never moves or constrains the others.
    pub fn set_point(&mut self, corner: Corner, p: Point) {
        match corner {
            Corner::TopLeft => self.tl = p,
            Corner::TopRight => self.tr = p,
            Corner::BottomLeft => self.bl = p,
            Corner::BottomRight => self.br = p,
        }
    }

    /// Clamp all four points into the bounds of a `width` x `height` frame.
    pub fn clamp(&self, width: u32, height: u32) -> Self {
        let max_x = (width.saturating_sub(1)) as f32;
        let max_y = (height.saturating_sub(1)) as f32;
        let clamp_pt = |p: Point| Point::new(p.x.clamp(0.0, max_x), p.y.clamp(0.0, max_y));
        Self {
            tl: clamp_pt(self.tl),
            tr: clamp_pt(self.tr),
            bl: clamp_pt(self.bl),
            br: clamp_pt(self.br),
        }
    }

    /// Output rectangle dimensions for perspective normalization.
    ///
    /// Width is the longer of the top and bottom edges, height the longer of
    /// the left and right edges. Taking the maximum of both opposing edges
    /// compensates for foreshortening so no content is cropped. Both
    /// dimensions are clamped to at least one pixel so a degenerate corner
    /// set still yields a valid output size.
    pub fn output_size(&self) -> (u32, u32) {
        let top = self.tl.distance(&self.tr);
        let bottom = self.bl.distance(&self.br);
        let left = self.tl.distance(&self.bl);
        let right = self.tr.distance(&self.br);

        let width = top.max(bottom).round().max(1.0) as u32;
        let height = left.max(right).round().max(1.0) as u32;
        (width, height)
    }
}

/// How a corner set was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DetectionMethod {
    /// Detected automatically from the frame contents.
    Auto,
    /// Synthesized default rectangle — detection found no usable contour.
    Fallback,
}

/// Visual filter applied to a cropped page before finalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
    /// Passthrough — the cropped page as warped.
    #[default]
    Normal,
    /// Scan-style adaptive black-and-white binarization.
    Bw,
    /// Brightened, higher-contrast rendition without full binarization.
    Enhance,
}

/// Unique identifier for a finalized scanned page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageId(pub Uuid);

impl PageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Metadata for a finalized page, recorded at accept time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageMeta {
    pub id: PageId,
    /// Filter mode the page was accepted with.
    pub filter: FilterMode,
    /// SHA-256 hash of the page's raw pixel data (hex).
    pub content_hash: String,
    pub captured_at: DateTime<Utc>,
}

/// Standard paper sizes for PDF assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaperSize {
    A4,
    A3,
    A5,
    Letter,
    Legal,
    Custom { width_mm: u32, height_mm: u32 },
}

impl PaperSize {
    /// Dimensions in millimetres (width, height).
    pub fn dimensions_mm(&self) -> (u32, u32) {
        match self {
            Self::A4 => (210, 297),
            Self::A3 => (297, 420),
            Self::A5 => (148, 210),
            Self::Letter => (216, 279),
            Self::Legal => (216, 356),
            Self::Custom {
                width_mm,
                height_mm,
            } => (*width_mm, *height_mm),
        }
    }
}
