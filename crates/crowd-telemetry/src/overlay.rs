use crate::scheduler::{lock, Scheduler, TimerToken};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

/// Percent-of-frame rectangle drawn over the video area.
#[derive(Clone, Copy, Debug, Serialize, PartialEq)]
pub struct DetectionBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct OverlayFrame {
    pub playing: bool,
    /// Playback position in percent, wraps at 100.
    pub progress: f64,
    pub boxes: Vec<DetectionBox>,
}

struct OverlayState {
    frame: OverlayFrame,
    timer: Option<TimerToken>,
}

struct OverlayInner {
    state: Mutex<OverlayState>,
    rng: Mutex<StdRng>,
}

/// Decorative playback simulation for the video panel. Runs on its own timer
/// and is unrelated to the telemetry feed.
#[derive(Clone)]
pub struct VideoOverlay {
    inner: Arc<OverlayInner>,
}

impl VideoOverlay {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn with_rng(rng: StdRng) -> Self {
        Self {
            inner: Arc::new(OverlayInner {
                state: Mutex::new(OverlayState {
                    frame: OverlayFrame {
                        playing: true,
                        progress: 0.0,
                        boxes: Vec::new(),
                    },
                    timer: None,
                }),
                rng: Mutex::new(rng),
            }),
        }
    }

    /// Starts the frame timer. Restarting replaces the previous timer.
    pub fn start(&self, scheduler: &dyn Scheduler, interval: Duration) {
        let weak: Weak<OverlayInner> = Arc::downgrade(&self.inner);
        let token = scheduler.schedule_every(
            interval,
            Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.advance();
                }
            }),
        );
        if let Some(previous) = lock(&self.inner.state).timer.replace(token) {
            previous.cancel();
        }
    }

    pub fn stop(&self) {
        if let Some(token) = lock(&self.inner.state).timer.take() {
            token.cancel();
        }
    }

    pub fn is_running(&self) -> bool {
        lock(&self.inner.state).timer.is_some()
    }

    /// Flips play/pause and returns the new playing state.
    pub fn toggle_playback(&self) -> bool {
        let mut state = lock(&self.inner.state);
        state.frame.playing = !state.frame.playing;
        state.frame.playing
    }

    pub fn frame(&self) -> OverlayFrame {
        lock(&self.inner.state).frame.clone()
    }
}

impl Default for VideoOverlay {
    fn default() -> Self {
        Self::new()
    }
}

impl OverlayInner {
    fn advance(&self) {
        let mut state = lock(&self.state);
        if !state.frame.playing {
            return;
        }
        let boxes = {
            let mut rng = lock(&self.rng);
            random_boxes(&mut *rng)
        };
        state.frame.progress = (state.frame.progress + 0.1) % 100.0;
        state.frame.boxes = boxes;
    }
}

fn random_boxes<R: Rng + ?Sized>(rng: &mut R) -> Vec<DetectionBox> {
    let count = rng.gen_range(5..20);
    (0..count)
        .map(|_| DetectionBox {
            x: rng.gen_range(10.0..90.0),
            y: rng.gen_range(20.0..80.0),
            width: rng.gen_range(4.0..12.0),
            height: rng.gen_range(8.0..20.0),
        })
        .collect()
}
