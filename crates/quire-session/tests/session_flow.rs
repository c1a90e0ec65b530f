// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Integration tests for the capture session: stage transitions, camera
// ownership, stale-result dropping, corner dragging, filtering, and the
// accepted page list.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use image::{DynamicImage, GrayImage, Luma, Rgba, RgbaImage};

use quire_bridge::{CameraOpener, CameraPrefs, CameraStream, MemoryOpener, StubOpener};
use quire_core::config::CaptureConfig;
use quire_core::error::{QuireError, Result};
use quire_core::types::{Corner, CornerSet, DetectionMethod, FilterMode, Point};
use quire_session::{CaptureSession, CoordinateMap, NoticeKind, StageKind, ViewRect};
use quire_vision::detect::Detection;
use quire_vision::{CapturedFrame, CroppedPage, DocumentVision, VisionEngine};

// -- Test doubles -------------------------------------------------------------

/// Camera that counts opens and stops, serving a fixed gray frame forever.
struct CountingCamera {
    stops: Arc<AtomicUsize>,
    active: bool,
}

impl CameraStream for CountingCamera {
    fn grab_frame(&mut self) -> Result<DynamicImage> {
        if !self.active {
            return Err(QuireError::CameraInactive);
        }
        Ok(DynamicImage::ImageLuma8(GrayImage::from_pixel(
            320,
            240,
            Luma([120u8]),
        )))
    }

    fn stop(&mut self) {
        if self.active {
            self.stops.fetch_add(1, Ordering::SeqCst);
        }
        self.active = false;
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

struct CountingOpener {
    opens: Arc<AtomicUsize>,
    stops: Arc<AtomicUsize>,
}

impl CountingOpener {
    fn new() -> (Self, Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let opens = Arc::new(AtomicUsize::new(0));
        let stops = Arc::new(AtomicUsize::new(0));
        (
            Self {
                opens: Arc::clone(&opens),
                stops: Arc::clone(&stops),
            },
            opens,
            stops,
        )
    }
}

impl CameraOpener for CountingOpener {
    fn open(&self, _prefs: &CameraPrefs) -> Result<Box<dyn CameraStream>> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(CountingCamera {
            stops: Arc::clone(&self.stops),
            active: true,
        }))
    }
}

/// Vision engine returning a fixed detection, with optionally failing
/// filters.
struct MockEngine {
    corners: CornerSet,
    method: DetectionMethod,
    fail_filters: bool,
}

impl MockEngine {
    fn auto() -> Self {
        Self {
            corners: CornerSet::new(
                Point::new(20.0, 20.0),
                Point::new(300.0, 25.0),
                Point::new(15.0, 220.0),
                Point::new(305.0, 225.0),
            ),
            method: DetectionMethod::Auto,
            fail_filters: false,
        }
    }

    fn with_failing_filters(mut self) -> Self {
        self.fail_filters = true;
        self
    }
}

impl VisionEngine for MockEngine {
    fn detect_document(&self, _frame: &CapturedFrame) -> Detection {
        Detection {
            corners: self.corners,
            method: self.method,
        }
    }

    fn normalize(&self, _frame: &CapturedFrame, corners: &CornerSet) -> CroppedPage {
        let (w, h) = corners.output_size();
        CroppedPage::new(DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            w,
            h,
            Rgba([128u8, 128, 128, 255]),
        )))
    }

    fn apply_filter(&self, page: &CroppedPage, mode: FilterMode) -> Result<DynamicImage> {
        if self.fail_filters {
            return Err(QuireError::FilterError("mock filter failure".into()));
        }
        let value = match mode {
            FilterMode::Normal => return Ok(page.image().clone()),
            FilterMode::Bw => 0u8,
            FilterMode::Enhance => 255u8,
        };
        Ok(DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            page.width(),
            page.height(),
            Rgba([value, value, value, 255]),
        )))
    }
}

fn counting_session(engine: MockEngine) -> (CaptureSession, Arc<AtomicUsize>, Arc<AtomicUsize>) {
    let (opener, opens, stops) = CountingOpener::new();
    let session = CaptureSession::new(
        Arc::new(engine),
        Arc::new(opener),
        CaptureConfig::default(),
    );
    (session, opens, stops)
}

// -- Stage machine ------------------------------------------------------------

#[test]
fn accept_appends_one_page_and_resets_pipeline_state() {
    let (mut session, opens, _stops) = counting_session(MockEngine::auto());

    session.start();
    assert_eq!(session.stage_kind(), StageKind::Scanning);

    assert!(session.capture_and_detect_blocking());
    assert_eq!(session.stage_kind(), StageKind::Editing);
    assert_eq!(session.detection_method(), Some(DetectionMethod::Auto));

    session.commit_crop();
    assert_eq!(session.stage_kind(), StageKind::Filtering);
    assert_eq!(session.filter_mode(), Some(FilterMode::Normal));

    let id = session.accept_page().expect("accept should yield a page id");
    assert_eq!(session.pages().len(), 1);
    assert_eq!(session.pages()[0].id(), id);

    // Pipeline-local state is gone and the camera is running again.
    assert_eq!(session.stage_kind(), StageKind::Scanning);
    assert!(session.corners().is_none());
    assert!(session.preview().is_none());
    assert_eq!(opens.load(Ordering::SeqCst), 2);
}

#[test]
fn capture_releases_the_camera_stream() {
    let (mut session, opens, stops) = counting_session(MockEngine::auto());

    session.start();
    assert_eq!(opens.load(Ordering::SeqCst), 1);
    assert_eq!(stops.load(Ordering::SeqCst), 0);

    session.capture();
    // Leaving Scanning (into Editing) must stop the stream.
    assert_eq!(stops.load(Ordering::SeqCst), 1);

    session.retake();
    assert_eq!(opens.load(Ordering::SeqCst), 2);

    session.finish();
    assert_eq!(stops.load(Ordering::SeqCst), 2);
    assert_eq!(session.stage_kind(), StageKind::Idle);
}

#[test]
fn dropping_the_session_releases_the_camera() {
    let (mut session, _opens, stops) = counting_session(MockEngine::auto());
    session.start();
    drop(session);
    assert_eq!(stops.load(Ordering::SeqCst), 1);
}

#[test]
fn camera_unavailable_is_a_notice_not_a_failure() {
    let mut session = CaptureSession::new(
        Arc::new(MockEngine::auto()),
        Arc::new(StubOpener),
        CaptureConfig::default(),
    );
    session.start();
    assert_eq!(session.stage_kind(), StageKind::Idle);
    let notice = session.pop_notice().expect("a notice should be queued");
    assert_eq!(notice.kind, NoticeKind::Error);
    assert!(notice.message.contains("Camera unavailable"));
}

#[test]
fn capture_on_dry_stream_stays_scanning() {
    let opener = MemoryOpener::new([]);
    let mut session = CaptureSession::new(
        Arc::new(MockEngine::auto()),
        Arc::new(opener),
        CaptureConfig::default(),
    );
    session.start();
    assert!(session.capture().is_none());
    assert_eq!(session.stage_kind(), StageKind::Scanning);
    let notice = session.pop_notice().expect("a notice should be queued");
    assert_eq!(notice.kind, NoticeKind::Warning);
}

// -- Stale-result dropping ----------------------------------------------------

#[test]
fn stale_detection_after_retake_is_dropped() {
    let (mut session, _opens, _stops) = counting_session(MockEngine::auto());

    session.start();
    let job = session.capture().expect("capture should succeed");

    // User retakes before the (slow) detection completes.
    session.retake();
    let detection = Detection {
        corners: CornerSet::inset(320, 240, 0.2),
        method: DetectionMethod::Auto,
    };
    assert!(!session.apply_detection(job.epoch, detection));
    assert_eq!(session.stage_kind(), StageKind::Scanning);
}

#[test]
fn drag_supersedes_in_flight_detection() {
    let (mut session, _opens, _stops) = counting_session(MockEngine::auto());

    session.start();
    let job = session.capture().expect("capture should succeed");
    let map = CoordinateMap::new(320, 240, ViewRect::new(0.0, 0.0, 320.0, 240.0));

    session.begin_drag(Corner::TopLeft);
    session.drag_to(Point::new(12.0, 14.0), &map);
    session.end_drag();

    // The user's manual correction wins over the late detection result.
    let detection = Detection {
        corners: CornerSet::inset(320, 240, 0.25),
        method: DetectionMethod::Auto,
    };
    assert!(!session.apply_detection(job.epoch, detection));
    assert_eq!(session.corners().unwrap().tl, Point::new(12.0, 14.0));
}

// -- Corner dragging ----------------------------------------------------------

#[test]
fn drag_moves_only_the_active_corner() {
    let (mut session, _opens, _stops) = counting_session(MockEngine::auto());
    session.start();
    assert!(session.capture_and_detect_blocking());

    let before = session.corners().unwrap();
    let map = CoordinateMap::new(320, 240, ViewRect::new(0.0, 0.0, 640.0, 480.0));

    session.begin_drag(Corner::BottomRight);
    // A second pointer-down while dragging is ignored.
    session.begin_drag(Corner::TopLeft);
    session.drag_to(Point::new(600.0, 400.0), &map);
    session.end_drag();

    let after = session.corners().unwrap();
    assert_eq!(after.br, Point::new(300.0, 200.0));
    assert_eq!(after.tl, before.tl);
    assert_eq!(after.tr, before.tr);
    assert_eq!(after.bl, before.bl);
}

#[test]
fn drag_clamps_to_frame_bounds() {
    let (mut session, _opens, _stops) = counting_session(MockEngine::auto());
    session.start();
    assert!(session.capture_and_detect_blocking());

    let map = CoordinateMap::new(320, 240, ViewRect::new(0.0, 0.0, 320.0, 240.0));
    session.begin_drag(Corner::TopLeft);
    session.drag_to(Point::new(-100.0, 9000.0), &map);
    session.end_drag();

    let corners = session.corners().unwrap();
    assert_eq!(corners.tl, Point::new(0.0, 239.0));
}

// -- Filtering ----------------------------------------------------------------

#[test]
fn filter_switching_round_trips_to_identical_normal() {
    let (mut session, _opens, _stops) = counting_session(MockEngine::auto());
    session.start();
    assert!(session.capture_and_detect_blocking());
    session.commit_crop();

    let normal = session.preview().unwrap().to_rgba8();

    session.set_filter(FilterMode::Bw);
    assert_eq!(session.filter_mode(), Some(FilterMode::Bw));
    assert_ne!(session.preview().unwrap().to_rgba8().as_raw(), normal.as_raw());

    session.set_filter(FilterMode::Enhance);
    session.set_filter(FilterMode::Normal);
    assert_eq!(session.filter_mode(), Some(FilterMode::Normal));
    assert_eq!(session.preview().unwrap().to_rgba8().as_raw(), normal.as_raw());
}

#[test]
fn filter_failure_keeps_previous_preview_and_mode() {
    let (mut session, _opens, _stops) =
        counting_session(MockEngine::auto().with_failing_filters());
    session.start();
    assert!(session.capture_and_detect_blocking());
    session.commit_crop();

    let before = session.preview().unwrap().to_rgba8();
    session.set_filter(FilterMode::Bw);

    assert_eq!(session.filter_mode(), Some(FilterMode::Normal));
    assert_eq!(session.preview().unwrap().to_rgba8().as_raw(), before.as_raw());
    let notice = session.pop_notice().expect("a notice should be queued");
    assert_eq!(notice.kind, NoticeKind::Error);
}

// -- Page list ----------------------------------------------------------------

#[test]
fn removing_a_page_preserves_order_of_the_rest() {
    let (mut session, _opens, _stops) = counting_session(MockEngine::auto());
    session.start();

    let mut ids = Vec::new();
    for _ in 0..3 {
        assert!(session.capture_and_detect_blocking());
        session.commit_crop();
        ids.push(session.accept_page().unwrap());
    }
    assert_eq!(session.pages().len(), 3);

    assert!(session.remove_page(ids[1]));
    let remaining: Vec<_> = session.pages().iter().map(|p| p.id()).collect();
    assert_eq!(remaining, vec![ids[0], ids[2]]);

    // Removing the same id twice is a no-op.
    assert!(!session.remove_page(ids[1]));
    assert_eq!(session.pages().len(), 2);
}

#[test]
fn pages_record_filter_mode_and_content_hash() {
    let (mut session, _opens, _stops) = counting_session(MockEngine::auto());
    session.start();
    assert!(session.capture_and_detect_blocking());
    session.commit_crop();
    session.set_filter(FilterMode::Bw);
    session.accept_page().unwrap();

    let page = &session.pages()[0];
    assert_eq!(page.meta().filter, FilterMode::Bw);
    assert_eq!(page.meta().content_hash.len(), 64);
}

// -- Async detection ----------------------------------------------------------

#[tokio::test]
async fn async_capture_and_detect_applies_the_result() {
    let (mut session, _opens, _stops) = counting_session(MockEngine::auto());
    session.start();
    assert!(session.capture_and_detect().await);
    assert_eq!(session.stage_kind(), StageKind::Editing);
    assert_eq!(session.detection_method(), Some(DetectionMethod::Auto));
}

// -- End to end with the production engine ------------------------------------

#[test]
fn production_engine_detects_synthetic_document() {
    let mut img = GrayImage::from_pixel(400, 500, Luma([30u8]));
    for y in 60..440 {
        for x in 50..350 {
            img.put_pixel(x, y, Luma([240u8]));
        }
    }
    let opener = MemoryOpener::new([DynamicImage::ImageLuma8(img)]);
    let mut session = CaptureSession::new(
        Arc::new(DocumentVision::new(CaptureConfig::default())),
        Arc::new(opener),
        CaptureConfig::default(),
    );

    session.start();
    assert!(session.capture_and_detect_blocking());
    assert_eq!(session.detection_method(), Some(DetectionMethod::Auto));

    session.commit_crop();
    let preview = session.preview().expect("preview should exist");
    // The warped page tracks the detected quad, roughly the 300x380 document.
    assert!(preview.width() > 250 && preview.width() < 360);
    assert!(preview.height() > 330 && preview.height() < 440);
}
