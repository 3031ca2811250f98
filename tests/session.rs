// SPDX-License-Identifier: GPL-3.0-or-later
// tests/session.rs
//
// Full crop sessions against in-memory collaborators.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use image::DynamicImage;
use tokio::sync::Notify;
use tokio::sync::mpsc::{self, UnboundedReceiver};

use cropframe::app::document::{EncodedImage, ImageHandle, ImageSource, Rasterizer, SourceImage};
use cropframe::app::view::RenderStats;
use cropframe::domain::crop::{CropRect, Handle, Point, SourceRect};
use cropframe::{
    CropController, LayoutConfig, PointerEvent, SessionConfig, SessionError, SessionEvent,
    Viewport,
};

// =============================================================================
// Fakes
// =============================================================================

struct MemorySource {
    image: Option<DynamicImage>,
}

impl MemorySource {
    fn sized(width: u32, height: u32) -> Self {
        Self {
            image: Some(DynamicImage::new_rgb8(width, height)),
        }
    }
}

#[async_trait]
impl ImageSource for MemorySource {
    async fn load_image(&self) -> anyhow::Result<Option<SourceImage>> {
        Ok(self
            .image
            .clone()
            .map(|image| SourceImage::from_handle(ImageHandle::new("memory.png", image))))
    }
}

/// Holds the load until the test releases it.
struct GatedSource {
    gate: Arc<Notify>,
}

#[async_trait]
impl ImageSource for GatedSource {
    async fn load_image(&self) -> anyhow::Result<Option<SourceImage>> {
        self.gate.notified().await;
        let image = DynamicImage::new_rgb8(1200, 900);
        Ok(Some(SourceImage::from_handle(ImageHandle::new("slow.png", image))))
    }
}

struct BrokenSource;

#[async_trait]
impl ImageSource for BrokenSource {
    async fn load_image(&self) -> anyhow::Result<Option<SourceImage>> {
        anyhow::bail!("not an image")
    }
}

#[derive(Clone, Default)]
struct RecordingRasterizer {
    calls: Arc<Mutex<Vec<SourceRect>>>,
    gate: Option<Arc<Notify>>,
    fail: bool,
}

impl RecordingRasterizer {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn gated(gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<SourceRect> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Rasterizer for RecordingRasterizer {
    async fn render(
        &self,
        handle: &ImageHandle,
        region: SourceRect,
        _quality: f32,
    ) -> anyhow::Result<EncodedImage> {
        self.calls.lock().unwrap().push(region);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if self.fail {
            anyhow::bail!("disk full");
        }
        let image = handle.image();
        let pixels = region
            .to_region(image.width(), image.height())
            .ok_or_else(|| anyhow::anyhow!("empty crop"))?;
        Ok(EncodedImage {
            path: PathBuf::from("memory/crop.jpg"),
            width: pixels.width,
            height: pixels.height,
        })
    }
}

// =============================================================================
// Helpers
// =============================================================================

type Events = UnboundedReceiver<SessionEvent>;

fn harness<S: ImageSource, R: Rasterizer>(
    source: S,
    rasterizer: R,
) -> (CropController<S, R>, Events) {
    let (tx, rx) = mpsc::unbounded_channel();
    let controller = CropController::new(
        source,
        rasterizer,
        LayoutConfig::default(),
        Viewport::new(500.0, 600.0),
        tx,
    );
    (controller, rx)
}

fn drain(rx: &mut Events) -> Vec<SessionEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn assert_close(actual: f64, expected: f64) {
    assert!((actual - expected).abs() < 1e-2, "{actual} != {expected}");
}

fn assert_rect(actual: CropRect, expected: CropRect) {
    for (a, e) in [
        (actual.x, expected.x),
        (actual.y, expected.y),
        (actual.width, expected.width),
        (actual.height, expected.height),
    ] {
        assert!((a - e).abs() < 1e-2, "{actual:?} != {expected:?}");
    }
}

/// Press, move once a frame later, release.
fn swipe<S: ImageSource, R: Rasterizer>(
    controller: &mut CropController<S, R>,
    from: Point,
    to: Point,
    start: Instant,
) -> Option<CropRect> {
    controller.handle_pointer(PointerEvent::Down {
        position: from,
        at: start,
    });
    let moved = controller.handle_pointer(PointerEvent::Move {
        position: to,
        at: start + Duration::from_millis(20),
    });
    controller.handle_pointer(PointerEvent::Up {
        at: start + Duration::from_millis(25),
    });
    moved
}

// =============================================================================
// Lifecycle
// =============================================================================

#[tokio::test]
async fn drag_resize_and_commit_maps_to_source_pixels() {
    let rasterizer = RecordingRasterizer::default();
    let (mut controller, mut events) = harness(MemorySource::sized(1200, 900), rasterizer.clone());

    assert!(controller.open(SessionConfig::default()).await.unwrap());
    let session = controller.session().unwrap();
    assert_close(f64::from(session.bounds.width), 400.0);
    assert_close(f64::from(session.bounds.height), 300.0);
    assert_rect(session.rect(), CropRect::new(110.0, 60.0, 180.0, 180.0));

    let start = Instant::now();
    let dragged = swipe(
        &mut controller,
        Point::new(200.0, 150.0),
        Point::new(190.0, 165.0),
        start,
    );
    assert_rect(dragged.unwrap(), CropRect::new(100.0, 75.0, 180.0, 180.0));

    let corner = controller.session().unwrap().rect().corner(Handle::BottomRight);
    let resized = swipe(
        &mut controller,
        corner,
        Point::new(corner.x + 20.0, corner.y - 30.0),
        start + Duration::from_millis(100),
    );
    assert_rect(resized.unwrap(), CropRect::new(100.0, 75.0, 200.0, 150.0));

    let artifact = controller.commit().await.unwrap();
    assert_eq!((artifact.width, artifact.height), (600, 450));

    let calls = rasterizer.calls();
    assert_eq!(calls.len(), 1);
    assert_close(calls[0].x, 300.0);
    assert_close(calls[0].y, 225.0);
    assert_close(calls[0].width, 600.0);
    assert_close(calls[0].height, 450.0);

    assert_eq!(
        drain(&mut events),
        vec![SessionEvent::Cropped {
            artifact_path: PathBuf::from("memory/crop.jpg"),
            width: 600,
            height: 450,
        }]
    );
    assert!(controller.state().is_dormant());
    assert!(!controller.pipeline().is_attached());
}

#[tokio::test]
async fn picker_cancel_emits_cancelled() {
    let (mut controller, mut events) =
        harness(MemorySource { image: None }, RecordingRasterizer::default());

    assert!(!controller.open(SessionConfig::default()).await.unwrap());
    assert_eq!(drain(&mut events), vec![SessionEvent::Cancelled]);
    assert!(controller.state().is_dormant());
}

#[tokio::test]
async fn load_error_ends_session_as_cancelled() {
    let (mut controller, mut events) = harness(BrokenSource, RecordingRasterizer::default());

    let result = controller.open(SessionConfig::default()).await;
    assert!(matches!(result, Err(SessionError::Load(_))));
    assert_eq!(drain(&mut events), vec![SessionEvent::Cancelled]);
}

#[tokio::test]
async fn invalid_config_is_rejected_before_loading() {
    let (mut controller, mut events) =
        harness(MemorySource::sized(100, 100), RecordingRasterizer::default());

    let config = SessionConfig {
        quality: 1.5,
        ..SessionConfig::default()
    };
    let result = controller.open(config).await;
    assert!(matches!(result, Err(SessionError::InvalidConfig(_))));
    assert!(drain(&mut events).is_empty());
    assert!(controller.state().is_dormant());
}

#[tokio::test]
async fn second_open_is_rejected_while_active() {
    let (mut controller, mut events) =
        harness(MemorySource::sized(1200, 900), RecordingRasterizer::default());

    controller.open(SessionConfig::default()).await.unwrap();
    let result = controller.open(SessionConfig::default()).await;
    assert!(matches!(result, Err(SessionError::AlreadyActive)));
    assert!(drain(&mut events).is_empty());
    assert!(controller.session().is_some());
}

#[tokio::test]
async fn cancel_emits_exactly_one_event() {
    let rasterizer = RecordingRasterizer::default();
    let (mut controller, mut events) = harness(MemorySource::sized(1200, 900), rasterizer.clone());

    controller.open(SessionConfig::default()).await.unwrap();
    controller.cancel().unwrap();
    assert!(matches!(controller.cancel(), Err(SessionError::NoActiveSession)));
    assert!(matches!(
        controller.commit().await,
        Err(SessionError::NoActiveSession)
    ));
    controller.close();

    assert_eq!(drain(&mut events), vec![SessionEvent::Cancelled]);
    assert!(rasterizer.calls().is_empty());
}

#[tokio::test]
async fn rasterize_failure_emits_failed() {
    let (mut controller, mut events) =
        harness(MemorySource::sized(1200, 900), RecordingRasterizer::failing());

    controller.open(SessionConfig::default()).await.unwrap();
    let result = controller.commit().await;
    assert!(matches!(result, Err(SessionError::Rasterize(_))));

    let events = drain(&mut events);
    assert_eq!(events.len(), 1);
    match &events[0] {
        SessionEvent::Failed { reason } => assert!(reason.contains("disk full"), "{reason}"),
        other => panic!("unexpected event {other:?}"),
    }
    assert!(controller.state().is_dormant());
}

#[tokio::test]
async fn sessions_can_follow_each_other() {
    let (mut controller, mut events) =
        harness(MemorySource::sized(1200, 900), RecordingRasterizer::default());

    controller.open(SessionConfig::default()).await.unwrap();
    controller.cancel().unwrap();
    controller.open(SessionConfig::default()).await.unwrap();
    controller.commit().await.unwrap();

    let events = drain(&mut events);
    assert_eq!(events.len(), 2);
    assert_eq!(events[0], SessionEvent::Cancelled);
    assert!(matches!(events[1], SessionEvent::Cropped { .. }));
}

// =============================================================================
// Close while pending
// =============================================================================

#[tokio::test]
async fn close_during_load_discards_the_image() {
    let gate = Arc::new(Notify::new());
    let (mut controller, mut events) = harness(
        GatedSource {
            gate: Arc::clone(&gate),
        },
        RecordingRasterizer::default(),
    );
    let handle = controller.close_handle();

    let (result, ()) = tokio::join!(controller.open(SessionConfig::default()), async {
        tokio::task::yield_now().await;
        handle.close();
        gate.notify_one();
    });

    assert!(matches!(result, Err(SessionError::Closed)));
    assert_eq!(drain(&mut events), vec![SessionEvent::Cancelled]);
    assert!(controller.state().is_dormant());
    assert!(!controller.pipeline().is_attached());
}

#[tokio::test]
async fn close_during_commit_suppresses_cropped() {
    let gate = Arc::new(Notify::new());
    let rasterizer = RecordingRasterizer::gated(Arc::clone(&gate));
    let (mut controller, mut events) = harness(MemorySource::sized(1200, 900), rasterizer.clone());
    controller.open(SessionConfig::default()).await.unwrap();
    let handle = controller.close_handle();

    let (result, ()) = tokio::join!(controller.commit(), async {
        tokio::task::yield_now().await;
        handle.close();
        gate.notify_one();
    });

    assert!(matches!(result, Err(SessionError::Closed)));
    assert_eq!(rasterizer.calls().len(), 1);
    assert_eq!(drain(&mut events), vec![SessionEvent::Cancelled]);
}

#[tokio::test]
async fn close_handle_ends_an_idle_session_before_rasterizing() {
    let rasterizer = RecordingRasterizer::default();
    let (mut controller, mut events) = harness(MemorySource::sized(1200, 900), rasterizer.clone());
    controller.open(SessionConfig::default()).await.unwrap();

    controller.close_handle().close();
    let moved = swipe(
        &mut controller,
        Point::new(200.0, 150.0),
        Point::new(190.0, 165.0),
        Instant::now(),
    );
    assert!(moved.is_none());
    assert!(controller.state().is_dormant());

    assert!(matches!(
        controller.commit().await,
        Err(SessionError::NoActiveSession)
    ));
    assert!(rasterizer.calls().is_empty());
    assert_eq!(drain(&mut events), vec![SessionEvent::Cancelled]);
}

#[tokio::test]
async fn commit_after_close_skips_the_rasterizer() {
    let rasterizer = RecordingRasterizer::default();
    let (mut controller, mut events) = harness(MemorySource::sized(1200, 900), rasterizer.clone());
    controller.open(SessionConfig::default()).await.unwrap();

    controller.close_handle().close();
    assert!(matches!(controller.commit().await, Err(SessionError::Closed)));
    assert!(rasterizer.calls().is_empty());
    assert!(!controller.pipeline().is_attached());
    assert_eq!(drain(&mut events), vec![SessionEvent::Cancelled]);
}

#[tokio::test]
async fn closed_flag_is_reset_for_the_next_session() {
    let (mut controller, mut events) =
        harness(MemorySource::sized(1200, 900), RecordingRasterizer::default());

    controller.close();
    assert!(controller.open(SessionConfig::default()).await.unwrap());
    controller.commit().await.unwrap();
    assert!(matches!(
        drain(&mut events).as_slice(),
        [SessionEvent::Cropped { .. }]
    ));
}

// =============================================================================
// Gestures and rendering
// =============================================================================

#[tokio::test]
async fn burst_of_moves_publishes_last_position_once() {
    let (mut controller, _events) =
        harness(MemorySource::sized(1200, 900), RecordingRasterizer::default());
    controller.open(SessionConfig::default()).await.unwrap();
    let before = controller.pipeline().stats();

    let start = Instant::now();
    controller.handle_pointer(PointerEvent::Down {
        position: Point::new(200.0, 150.0),
        at: start,
    });
    for step in 1..=5u64 {
        let published = controller.handle_pointer(PointerEvent::Move {
            position: Point::new(200.0 + step as f32 * 4.0, 150.0),
            at: start + Duration::from_millis(step * 2),
        });
        assert!(published.is_none());
    }
    let published = controller.handle_pointer(PointerEvent::Up {
        at: start + Duration::from_millis(12),
    });

    assert_rect(published.unwrap(), CropRect::new(130.0, 60.0, 180.0, 180.0));
    assert_eq!(
        controller.pipeline().stats(),
        RenderStats {
            image_draws: before.image_draws,
            overlay_draws: before.overlay_draws + 1,
        }
    );
}

#[tokio::test]
async fn tick_flushes_a_pending_move() {
    let (mut controller, _events) =
        harness(MemorySource::sized(1200, 900), RecordingRasterizer::default());
    controller.open(SessionConfig::default()).await.unwrap();

    let start = Instant::now();
    controller.handle_pointer(PointerEvent::Down {
        position: Point::new(200.0, 150.0),
        at: start,
    });
    let early = controller.handle_pointer(PointerEvent::Move {
        position: Point::new(200.0, 140.0),
        at: start + Duration::from_millis(5),
    });
    assert!(early.is_none());
    assert!(controller.tick(start + Duration::from_millis(8)).is_none());

    let flushed = controller.tick(start + Duration::from_millis(20));
    assert_rect(flushed.unwrap(), CropRect::new(110.0, 50.0, 180.0, 180.0));
}

#[tokio::test]
async fn image_surface_is_drawn_once_per_session() {
    let (mut controller, _events) =
        harness(MemorySource::sized(1200, 900), RecordingRasterizer::default());
    controller.open(SessionConfig::default()).await.unwrap();

    let start = Instant::now();
    for round in 0..10u64 {
        swipe(
            &mut controller,
            Point::new(200.0, 150.0),
            Point::new(205.0, 150.0),
            start + Duration::from_millis(round * 50),
        );
        // (200, 150) stays inside the box as it walks right.
        let rect = controller.session().unwrap().rect();
        assert!(rect.x >= 0.0 && rect.right() <= 400.0 + 1e-3);
    }

    let stats = controller.pipeline().stats();
    assert_eq!(stats.image_draws, 1);
    assert_eq!(stats.overlay_draws, 11);
}

#[tokio::test]
async fn pointer_input_is_ignored_without_a_session() {
    let (mut controller, _events) =
        harness(MemorySource::sized(1200, 900), RecordingRasterizer::default());

    let start = Instant::now();
    assert!(
        controller
            .handle_pointer(PointerEvent::Down {
                position: Point::new(10.0, 10.0),
                at: start,
            })
            .is_none()
    );
    assert!(controller.tick(start).is_none());
    assert_eq!(controller.pipeline().stats(), RenderStats::default());
}

#[tokio::test]
async fn oversized_min_size_degrades_to_canvas() {
    let (mut controller, _events) =
        harness(MemorySource::sized(100, 80), RecordingRasterizer::default());
    controller.open(SessionConfig::default()).await.unwrap();

    let session = controller.session().unwrap();
    assert_eq!(session.bounds.width, 100.0);
    assert_eq!(session.bounds.height, 80.0);
    assert_rect(session.rect(), CropRect::new(10.0, 0.0, 80.0, 80.0));
    assert!(session.rect().is_within(session.bounds));
}

#[tokio::test]
async fn viewport_change_rescales_the_box() {
    let (mut controller, _events) =
        harness(MemorySource::sized(1200, 900), RecordingRasterizer::default());
    controller.open(SessionConfig::default()).await.unwrap();

    controller.set_viewport(Viewport::new(250.0, 600.0));

    let session = controller.session().unwrap();
    assert_close(f64::from(session.bounds.width), 200.0);
    assert_close(f64::from(session.bounds.height), 150.0);
    assert_rect(session.rect(), CropRect::new(55.0, 30.0, 100.0, 100.0));
    assert_eq!(controller.pipeline().stats().image_draws, 2);
}

#[tokio::test]
async fn locked_ratio_survives_a_session() {
    let (mut controller, _events) =
        harness(MemorySource::sized(1200, 900), RecordingRasterizer::default());
    let config = SessionConfig {
        aspect_ratio: 16.0 / 9.0,
        ..SessionConfig::default()
    };
    controller.open(config).await.unwrap();

    let corner = controller.session().unwrap().rect().corner(Handle::TopLeft);
    swipe(
        &mut controller,
        corner,
        Point::new(corner.x - 300.0, corner.y - 300.0),
        Instant::now(),
    );

    let session = controller.session().unwrap();
    let rect = session.rect();
    assert!((rect.ratio() - 16.0 / 9.0).abs() < 1e-3, "{rect:?}");
    assert!(rect.is_within(session.bounds));
}
