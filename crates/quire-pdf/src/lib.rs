// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// quire-pdf — PDF assembly for the Quire capture pipeline.
//
// Consumes the session's ordered page bitmaps and produces a single
// downloadable PDF using `printpdf` 0.8.

pub mod assembler;

pub use assembler::PdfAssembler;
