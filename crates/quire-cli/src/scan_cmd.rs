// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// `quire scan` — run every input image through the capture pipeline and
// assemble the accepted pages into one PDF.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use quire_bridge::FileOpener;
use quire_core::config::CaptureConfig;
use quire_session::{CaptureSession, NoticeKind, StageKind};
use quire_vision::DocumentVision;
use tracing::info;

use crate::cli::{FilterArg, PaperArg};

pub fn run(
    images: &[PathBuf],
    out: &Path,
    filter: FilterArg,
    paper: PaperArg,
    title: Option<&str>,
    no_autodetect: bool,
) -> Result<(), i32> {
    let config = CaptureConfig::default();
    let engine = Arc::new(DocumentVision::new(config.clone()));
    let opener = Arc::new(FileOpener::new(images.iter().cloned()));
    let mut session = CaptureSession::new(engine, opener, config);

    session.start();
    if session.stage_kind() != StageKind::Scanning {
        drain_notices(&mut session);
        eprintln!("error: could not open the image source");
        return Err(1);
    }

    for path in images {
        let captured = if no_autodetect {
            session.capture().is_some()
        } else {
            session.capture_and_detect_blocking()
        };
        if !captured && session.stage_kind() != StageKind::Editing {
            drain_notices(&mut session);
            eprintln!("error: could not capture {}", path.display());
            return Err(1);
        }

        session.commit_crop();
        session.set_filter(filter.into());
        if session.accept_page().is_none() {
            drain_notices(&mut session);
            eprintln!("error: could not finalize {}", path.display());
            return Err(1);
        }
        drain_notices(&mut session);
    }

    session.finish();
    let pages = session.take_pages();
    info!(pages = pages.len(), "Scan complete");
    eprintln!("{} page(s) scanned", pages.len());

    let mut assembler = quire_pdf::PdfAssembler::new(paper.into());
    if let Some(title) = title {
        assembler.set_title(title);
    }
    let bitmaps = pages.iter().map(|p| p.image());
    if let Err(err) = assembler.write_to_file(bitmaps, out) {
        eprintln!("error: {err}");
        return Err(1);
    }

    eprintln!("wrote {}", out.display());
    Ok(())
}

/// Print queued session notices to stderr.
fn drain_notices(session: &mut CaptureSession) {
    while let Some(notice) = session.pop_notice() {
        match notice.kind {
            NoticeKind::Info => eprintln!("note: {}", notice.message),
            NoticeKind::Warning => eprintln!("warning: {}", notice.message),
            NoticeKind::Error => eprintln!("error: {}", notice.message),
        }
    }
}
