// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// quire-session — Interactive capture session for the Quire pipeline.
//
// Owns the stage machine (scanning → editing → filtering), enforces the
// single-owner camera discipline, guards against stale asynchronous results,
// and accumulates accepted pages for PDF assembly.

pub mod coords;
pub mod session;

pub use coords::{CoordinateMap, ViewRect};
pub use session::{
    CaptureSession, DetectJob, Notice, NoticeKind, ScannedPage, StageKind,
};
