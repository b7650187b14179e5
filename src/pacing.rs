//! Frame rate measurement and pacing

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::consts::FPS_SMOOTHING;

/// Moving-average frames-per-second over the last few frames
#[derive(Debug, Clone)]
pub struct FpsCounter {
    frame_times: VecDeque<Duration>,
    last: Instant,
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl FpsCounter {
    pub fn new() -> Self {
        Self {
            frame_times: VecDeque::with_capacity(FPS_SMOOTHING),
            last: Instant::now(),
        }
    }

    /// Mark the end of a frame
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let elapsed = now - self.last;
        self.last = now;
        self.record(elapsed)
    }

    /// Add one measured frame time
    pub fn record(&mut self, frame_time: Duration) -> f32 {
        self.frame_times.push_back(frame_time);
        while self.frame_times.len() > FPS_SMOOTHING {
            self.frame_times.pop_front();
        }
        self.fps()
    }

    /// Averaged rate; 0 before the first frame
    pub fn fps(&self) -> f32 {
        if self.frame_times.is_empty() {
            return 0.0;
        }
        let total: Duration = self.frame_times.iter().sum();
        let avg = total.as_secs_f32() / self.frame_times.len() as f32;
        if avg > 0.0 { 1.0 / avg } else { 0.0 }
    }
}

/// Sleeps away whatever is left of each frame's time budget
#[derive(Debug, Clone)]
pub struct FrameClock {
    budget: Option<Duration>,
    frame_start: Instant,
}

impl FrameClock {
    /// A target of 0 disables pacing
    pub fn new(target_fps: u32) -> Self {
        Self {
            budget: (target_fps > 0).then(|| Duration::from_secs_f64(1.0 / target_fps as f64)),
            frame_start: Instant::now(),
        }
    }

    /// Time still available in the current frame
    pub fn remaining(&self) -> Duration {
        self.budget
            .map(|b| b.saturating_sub(self.frame_start.elapsed()))
            .unwrap_or_default()
    }

    /// Block until the frame budget is used up, then start the next frame
    pub fn wait(&mut self) {
        let remaining = self.remaining();
        if !remaining.is_zero() {
            std::thread::sleep(remaining);
        }
        self.frame_start = Instant::now();
    }
}
