// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Quire.

use thiserror::Error;

/// Top-level error type for all Quire operations.
#[derive(Debug, Error)]
pub enum QuireError {
    // -- Camera errors --
    #[error("camera unavailable: {0}")]
    CameraUnavailable(String),

    #[error("camera stream is not active")]
    CameraInactive,

    #[error("video source has not produced a frame yet")]
    EmptyFrame,

    // -- Pipeline errors --
    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("filter application failed: {0}")]
    FilterError(String),

    // -- PDF assembly --
    #[error("PDF assembly failed: {0}")]
    PdfError(String),

    #[error("no pages to assemble")]
    NoPages,

    // -- Background tasks --
    #[error("background task failed: {0}")]
    Task(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // -- Platform bridge --
    #[error("feature not available on this platform")]
    PlatformUnavailable,
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, QuireError>;
