// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The capture session — one in-progress page at a time, plus the ordered
// list of accepted pages.
//
// Every per-stage failure is converted into a user-facing `Notice` at the
// stage boundary; nothing propagates out of the pipeline. The camera stream
// is owned by the Scanning stage alone and is released on every path that
// leaves it, including drop.

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::Utc;
use image::DynamicImage;
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument, warn};

use quire_bridge::{CameraOpener, CameraPrefs, CameraStream};
use quire_core::config::CaptureConfig;
use quire_core::error::QuireError;
use quire_core::types::{Corner, CornerSet, DetectionMethod, FilterMode, PageId, PageMeta, Point};
use quire_vision::detect::Detection;
use quire_vision::{CapturedFrame, CroppedPage, VisionEngine, frame};

use crate::coords::CoordinateMap;

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Warning,
    Error,
}

/// Non-blocking message surfaced to the user.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

/// Which stage the session is in, for display purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    /// No camera, no in-progress page.
    Idle,
    /// Camera running, waiting for a capture trigger.
    Scanning,
    /// A frame is captured; corners are adjustable.
    Editing,
    /// The crop is committed; filters are selectable.
    Filtering,
}

/// A finalized page in the session's output sequence.
#[derive(Clone)]
pub struct ScannedPage {
    meta: PageMeta,
    image: Arc<DynamicImage>,
}

impl ScannedPage {
    pub fn id(&self) -> PageId {
        self.meta.id
    }

    pub fn meta(&self) -> &PageMeta {
        &self.meta
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }
}

impl std::fmt::Debug for ScannedPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScannedPage")
            .field("id", &self.meta.id)
            .field("filter", &self.meta.filter)
            .field("width", &self.image.width())
            .field("height", &self.image.height())
            .finish()
    }
}

/// Handle for delivering a boundary-detection result back to the session.
///
/// Carries the epoch the capture happened in; a result delivered after the
/// session has moved on (retake, drag, new capture) is dropped, not applied.
#[derive(Debug, Clone)]
pub struct DetectJob {
    pub epoch: u64,
    pub frame: CapturedFrame,
}

struct EditState {
    frame: CapturedFrame,
    corners: CornerSet,
    method: DetectionMethod,
    drag: Option<Corner>,
}

struct FilterState {
    page: CroppedPage,
    mode: FilterMode,
    preview: Arc<DynamicImage>,
}

enum Stage {
    Idle,
    Scanning { stream: Box<dyn CameraStream> },
    Editing(EditState),
    Filtering(FilterState),
}

/// The interactive capture session.
pub struct CaptureSession {
    engine: Arc<dyn VisionEngine>,
    opener: Arc<dyn CameraOpener>,
    prefs: CameraPrefs,
    config: CaptureConfig,
    stage: Stage,
    /// Bumped on every state-discarding user action. Asynchronous results
    /// carrying an older epoch are stale and must be dropped: last committed
    /// action wins.
    epoch: u64,
    pages: Vec<ScannedPage>,
    notices: VecDeque<Notice>,
}

impl CaptureSession {
    pub fn new(
        engine: Arc<dyn VisionEngine>,
        opener: Arc<dyn CameraOpener>,
        config: CaptureConfig,
    ) -> Self {
        Self {
            engine,
            opener,
            prefs: CameraPrefs::default(),
            config,
            stage: Stage::Idle,
            epoch: 0,
            pages: Vec::new(),
            notices: VecDeque::new(),
        }
    }

    pub fn set_camera_prefs(&mut self, prefs: CameraPrefs) {
        self.prefs = prefs;
    }

    // -- Observers ------------------------------------------------------------

    pub fn stage_kind(&self) -> StageKind {
        match self.stage {
            Stage::Idle => StageKind::Idle,
            Stage::Scanning { .. } => StageKind::Scanning,
            Stage::Editing(_) => StageKind::Editing,
            Stage::Filtering(_) => StageKind::Filtering,
        }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Current corner set, while editing.
    pub fn corners(&self) -> Option<CornerSet> {
        match &self.stage {
            Stage::Editing(edit) => Some(edit.corners),
            _ => None,
        }
    }

    /// How the current corner set was produced, while editing.
    pub fn detection_method(&self) -> Option<DetectionMethod> {
        match &self.stage {
            Stage::Editing(edit) => Some(edit.method),
            _ => None,
        }
    }

    /// The captured frame being edited.
    pub fn editing_frame(&self) -> Option<&CapturedFrame> {
        match &self.stage {
            Stage::Editing(edit) => Some(&edit.frame),
            _ => None,
        }
    }

    /// Currently displayed filter preview, while filtering.
    pub fn preview(&self) -> Option<&DynamicImage> {
        match &self.stage {
            Stage::Filtering(f) => Some(&f.preview),
            _ => None,
        }
    }

    /// Active filter mode, while filtering.
    pub fn filter_mode(&self) -> Option<FilterMode> {
        match &self.stage {
            Stage::Filtering(f) => Some(f.mode),
            _ => None,
        }
    }

    /// Accepted pages, in order.
    pub fn pages(&self) -> &[ScannedPage] {
        &self.pages
    }

    /// Hand the ordered page list to the assembly collaborator.
    pub fn take_pages(&mut self) -> Vec<ScannedPage> {
        std::mem::take(&mut self.pages)
    }

    /// Drain the next queued user-facing notice.
    pub fn pop_notice(&mut self) -> Option<Notice> {
        self.notices.pop_front()
    }

    // -- Stage transitions ----------------------------------------------------

    /// Enter the scanning stage: open the camera stream.
    ///
    /// On failure the session stays idle and a notice is queued; camera
    /// problems are never fatal.
    #[instrument(skip(self))]
    pub fn start(&mut self) {
        match self.stage {
            Stage::Idle => self.enter_scanning(),
            Stage::Scanning { .. } => {}
            Stage::Editing(_) | Stage::Filtering(_) => {
                self.notice(
                    NoticeKind::Info,
                    "A page is in progress — accept or retake it first.",
                );
            }
        }
    }

    /// Capture one still frame from the running stream.
    ///
    /// Leaving the scanning stage releases the camera. On success the
    /// session enters Editing with the fallback corner set and returns a
    /// [`DetectJob`]; run detection (inline or on a worker) and deliver the
    /// result through [`apply_detection`](Self::apply_detection).
    #[instrument(skip(self))]
    pub fn capture(&mut self) -> Option<DetectJob> {
        let Stage::Scanning { stream } = &mut self.stage else {
            self.notice(NoticeKind::Info, "Nothing to capture — not scanning.");
            return None;
        };

        let raw = match stream.grab_frame() {
            Ok(raw) => raw,
            Err(err) => {
                warn!(%err, "Frame grab failed");
                self.notice_for(&err);
                return None;
            }
        };

        let frame = match frame::acquire(raw, self.config.max_capture_dim) {
            Ok(frame) => frame,
            Err(err) => {
                warn!(%err, "Frame acquisition rejected");
                self.notice_for(&err);
                return None;
            }
        };

        // Out of Scanning: the stream must be released on this path too.
        self.release_camera();
        self.epoch += 1;

        let corners = CornerSet::inset(
            frame.width(),
            frame.height(),
            self.config.fallback_margin_frac,
        );
        info!(width = frame.width(), height = frame.height(), epoch = self.epoch, "Frame captured");
        let job = DetectJob {
            epoch: self.epoch,
            frame: frame.clone(),
        };
        self.stage = Stage::Editing(EditState {
            frame,
            corners,
            method: DetectionMethod::Fallback,
            drag: None,
        });
        Some(job)
    }

    /// Deliver a boundary-detection result for the capture identified by
    /// `epoch`. Returns whether the result was applied; a stale result (the
    /// user has already retaken, dragged, or moved on) is dropped.
    #[instrument(skip(self, detection))]
    pub fn apply_detection(&mut self, epoch: u64, detection: Detection) -> bool {
        if epoch != self.epoch {
            debug!(current = self.epoch, "Stale detection result dropped");
            return false;
        }
        let Stage::Editing(edit) = &mut self.stage else {
            debug!("Detection result arrived outside editing; dropped");
            return false;
        };

        edit.corners = detection
            .corners
            .clamp(edit.frame.width(), edit.frame.height());
        edit.method = detection.method;

        if detection.method == DetectionMethod::Fallback {
            self.notice(
                NoticeKind::Warning,
                "Couldn't find the document edges — adjust the corners manually.",
            );
        }
        true
    }

    /// Capture and run detection inline.
    pub fn capture_and_detect_blocking(&mut self) -> bool {
        let Some(job) = self.capture() else {
            return false;
        };
        let detection = self.engine.detect_document(&job.frame);
        self.apply_detection(job.epoch, detection)
    }

    /// Capture and run detection on a blocking worker, keeping the caller's
    /// task free. The epoch guard drops the result if the user acts in the
    /// meantime.
    pub async fn capture_and_detect(&mut self) -> bool {
        let Some(job) = self.capture() else {
            return false;
        };
        let engine = Arc::clone(&self.engine);
        let frame = job.frame.clone();
        match tokio::task::spawn_blocking(move || engine.detect_document(&frame)).await {
            Ok(detection) => self.apply_detection(job.epoch, detection),
            Err(err) => {
                warn!(%err, "Detection task failed");
                self.notice_for(&QuireError::Task(err.to_string()));
                false
            }
        }
    }

    // -- Corner dragging ------------------------------------------------------

    /// Begin dragging one corner handle. At most one corner drags at a time;
    /// a second pointer-down while dragging is ignored. Starting a drag is a
    /// committed user action: it supersedes any in-flight detection.
    pub fn begin_drag(&mut self, corner: Corner) {
        let Stage::Editing(edit) = &mut self.stage else {
            return;
        };
        if edit.drag.is_some() {
            return;
        }
        edit.drag = Some(corner);
        self.epoch += 1;
        debug!(?corner, "Drag started");
    }

    /// Move the actively dragged corner to a display-space position,
    /// translated through the coordinate map and clamped into frame bounds.
    /// Only the dragged corner moves.
    pub fn drag_to(&mut self, display: Point, map: &CoordinateMap) {
        let Stage::Editing(edit) = &mut self.stage else {
            return;
        };
        let Some(corner) = edit.drag else {
            return;
        };
        let frame_pt = map.to_frame(display);
        edit.corners.set_point(corner, frame_pt);
        edit.corners = edit.corners.clamp(edit.frame.width(), edit.frame.height());
    }

    /// End the drag (pointer-up or pointer-leave).
    pub fn end_drag(&mut self) {
        if let Stage::Editing(edit) = &mut self.stage {
            edit.drag = None;
        }
    }

    // -- Crop, filter, accept -------------------------------------------------

    /// Commit the corner set and warp the frame into an upright page.
    /// The captured frame is discarded; the session enters Filtering with a
    /// passthrough preview.
    #[instrument(skip(self))]
    pub fn commit_crop(&mut self) {
        let Stage::Editing(_) = &self.stage else {
            self.notice(NoticeKind::Info, "Nothing to crop.");
            return;
        };
        self.epoch += 1;
        let Stage::Editing(edit) = std::mem::replace(&mut self.stage, Stage::Idle) else {
            unreachable!("stage checked above");
        };

        let page = self.engine.normalize(&edit.frame, &edit.corners);
        info!(width = page.width(), height = page.height(), "Crop committed");
        let preview = page.image_arc();
        self.stage = Stage::Filtering(FilterState {
            page,
            mode: FilterMode::Normal,
            preview,
        });
    }

    /// Switch the filter preview. The unfiltered page is retained, so any
    /// number of switches can always return to a pixel-identical Normal
    /// rendition. A filter failure keeps the previous preview and mode.
    #[instrument(skip(self))]
    pub fn set_filter(&mut self, mode: FilterMode) {
        let Stage::Filtering(state) = &mut self.stage else {
            self.notice(NoticeKind::Info, "No page to filter.");
            return;
        };
        if state.mode == mode {
            return;
        }

        if mode == FilterMode::Normal {
            state.preview = state.page.image_arc();
            state.mode = mode;
            return;
        }

        match self.engine.apply_filter(&state.page, mode) {
            Ok(filtered) => {
                state.preview = Arc::new(filtered);
                state.mode = mode;
            }
            Err(err) => {
                warn!(%err, ?mode, "Filter failed; keeping previous preview");
                self.notice(
                    NoticeKind::Error,
                    format!("Filter failed: {err}. Showing the previous preview."),
                );
            }
        }
    }

    /// Accept the current preview as a finalized page. Appends exactly one
    /// entry to the page list, clears all pipeline-local state, and returns
    /// to scanning, ready for the next page.
    #[instrument(skip(self))]
    pub fn accept_page(&mut self) -> Option<PageId> {
        let Stage::Filtering(_) = &self.stage else {
            self.notice(NoticeKind::Info, "No page to accept.");
            return None;
        };
        self.epoch += 1;
        let Stage::Filtering(state) = std::mem::replace(&mut self.stage, Stage::Idle) else {
            unreachable!("stage checked above");
        };

        let meta = PageMeta {
            id: PageId::new(),
            filter: state.mode,
            content_hash: hash_image(&state.preview),
            captured_at: Utc::now(),
        };
        let id = meta.id;
        info!(%id, filter = ?state.mode, total = self.pages.len() + 1, "Page accepted");
        self.pages.push(ScannedPage {
            meta,
            image: state.preview,
        });

        self.enter_scanning();
        Some(id)
    }

    /// Discard the in-progress page and go back to scanning. Any in-flight
    /// detection for the discarded frame becomes stale.
    #[instrument(skip(self))]
    pub fn retake(&mut self) {
        match self.stage {
            Stage::Editing(_) | Stage::Filtering(_) => {
                self.epoch += 1;
                self.stage = Stage::Idle;
                info!("Page discarded; returning to scanning");
                self.enter_scanning();
            }
            Stage::Scanning { .. } | Stage::Idle => {}
        }
    }

    /// Remove one accepted page by identity. The relative order of the
    /// remaining pages is preserved.
    pub fn remove_page(&mut self, id: PageId) -> bool {
        let before = self.pages.len();
        self.pages.retain(|p| p.meta.id != id);
        let removed = self.pages.len() < before;
        if removed {
            info!(%id, remaining = self.pages.len(), "Page removed");
        }
        removed
    }

    /// Leave the capture flow entirely. Releases the camera on this path
    /// like every other; accepted pages are kept.
    #[instrument(skip(self))]
    pub fn finish(&mut self) {
        self.epoch += 1;
        self.release_camera();
        if !matches!(self.stage, Stage::Idle) {
            self.stage = Stage::Idle;
        }
    }

    // -- Internals ------------------------------------------------------------

    fn enter_scanning(&mut self) {
        match self.opener.open(&self.prefs) {
            Ok(stream) => {
                info!("Camera stream opened");
                self.stage = Stage::Scanning { stream };
            }
            Err(err) => {
                warn!(%err, "Camera unavailable");
                self.notice(
                    NoticeKind::Error,
                    format!("Camera unavailable: {err}"),
                );
                self.stage = Stage::Idle;
            }
        }
    }

    /// Stop and drop the stream if the session currently owns one.
    fn release_camera(&mut self) {
        if matches!(self.stage, Stage::Scanning { .. }) {
            if let Stage::Scanning { mut stream } = std::mem::replace(&mut self.stage, Stage::Idle)
            {
                stream.stop();
                info!("Camera stream released");
            }
        }
    }

    fn notice(&mut self, kind: NoticeKind, message: impl Into<String>) {
        self.notices.push_back(Notice {
            kind,
            message: message.into(),
        });
    }

    fn notice_for(&mut self, err: &QuireError) {
        let kind = match err {
            QuireError::EmptyFrame => NoticeKind::Warning,
            _ => NoticeKind::Error,
        };
        self.notice(kind, err.to_string());
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        // Guaranteed release: leaving scope counts as leaving the scanning
        // stage.
        self.release_camera();
    }
}

/// SHA-256 over the page's RGBA pixel data and dimensions, hex-encoded.
fn hash_image(image: &DynamicImage) -> String {
    let rgba = image.to_rgba8();
    let mut hasher = Sha256::new();
    hasher.update(image.width().to_le_bytes());
    hasher.update(image.height().to_le_bytes());
    hasher.update(rgba.as_raw());
    hex::encode(hasher.finalize())
}
