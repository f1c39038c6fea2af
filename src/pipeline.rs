//! The render loop: one frame at a time, acquire → target → overlay → show,
//! until the session stops.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::display::Display;
use crate::error::Error;
use crate::render::Overlay;
use crate::session::{Handler, Message, Session};
use crate::shm::SharedMemory;
use crate::source::SharedFrameSource;
use crate::target::TargetChannel;

/// What a finished [`RenderLoop::run`] did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: u64,
    pub display_errors: u64,
}

/// Bus handler that feeds `Direction` messages into `target`.
///
/// The float to integer conversion happens before the lock is taken, so the
/// critical section is just the store.
pub fn direction_handler(target: Arc<TargetChannel>) -> Handler {
    Box::new(move |msg: &Message| {
        let Message::Direction(dir) = msg;
        let (x, y) = (dir.azimuth_angle as i32, dir.zenith_angle as i32);
        target.set(x, y);
    })
}

pub struct RenderLoop<M> {
    source: SharedFrameSource<M>,
    target: Arc<TargetChannel>,
    overlay: Overlay,
    display: Option<Box<dyn Display>>,
}

impl<M: SharedMemory> RenderLoop<M> {
    pub fn new(source: SharedFrameSource<M>, target: Arc<TargetChannel>, overlay: Overlay) -> Self {
        Self { source, target, overlay, display: None }
    }

    pub fn with_display(mut self, display: Box<dyn Display>) -> Self {
        self.display = Some(display);
        self
    }

    pub fn source(&self) -> &SharedFrameSource<M> {
        &self.source
    }

    /// Run until `session` stops. Nothing inside an iteration ends the loop.
    pub fn run<S: Session + ?Sized>(&mut self, session: &S) -> RunSummary {
        let mut summary = RunSummary::default();
        let mut last_fps_time = Instant::now();
        let mut frames_this_second: u32 = 0;

        while session.is_running() {
            // 1) Block until the producer has a new frame, copy it out.
            let mut frame = self.source.acquire_frame();

            // 2) Latest aim point; the lock is released before drawing.
            let target = self.target.get();

            // 3) Curve, markers, target on top.
            self.overlay.render(&mut frame, target);
            log::trace!(
                "frame {} rendered, target at ({}, {})",
                summary.frames,
                target.x,
                target.y
            );

            // 4) Present when a display is attached.
            if let Some(display) = self.display.as_mut() {
                match display.show(&frame) {
                    Ok(()) => {}
                    Err(Error::WindowClosed) => {
                        log::info!("display closed, continuing without it");
                        self.display = None;
                    }
                    Err(err) => {
                        summary.display_errors += 1;
                        log::warn!("skipping display of frame {}: {err}", summary.frames);
                    }
                }
            }

            summary.frames += 1;

            // 5) FPS, once per second.
            frames_this_second += 1;
            let now = Instant::now();
            if now.duration_since(last_fps_time) >= Duration::from_secs(1) {
                let secs = now.duration_since(last_fps_time).as_secs_f32();
                log::debug!("FPS: {:.1}", frames_this_second as f32 / secs);
                frames_this_second = 0;
                last_fps_time = now;
            }
        }

        log::info!("session stopped after {} frames", summary.frames);
        summary
    }
}
