use std::time::{Duration, Instant};

/// Frame timing for one reporting window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    /// Duration of the most recent frame.
    pub last_frame: Duration,
    /// Frames completed since the previous report.
    pub frames: u32,
}

/// Counts frames and reports roughly once per second
#[derive(Debug)]
pub struct FrameStats {
    last_frame_at: Instant,
    last_report_at: Instant,
    frames: u32,
    interval: Duration,
}

impl FrameStats {
    pub fn new(now: Instant) -> Self {
        Self {
            last_frame_at: now,
            last_report_at: now,
            frames: 0,
            interval: Duration::from_secs(1),
        }
    }

    /// Records a finished frame; yields a report once the interval has passed.
    pub fn record(&mut self, now: Instant) -> Option<FrameReport> {
        self.frames += 1;
        let last_frame = now.saturating_duration_since(self.last_frame_at);
        self.last_frame_at = now;

        if now.saturating_duration_since(self.last_report_at) > self.interval {
            let report = FrameReport {
                last_frame,
                frames: self.frames,
            };
            self.last_report_at = now;
            self.frames = 0;
            Some(report)
        } else {
            None
        }
    }
}

/// Time left in the frame budget after `elapsed`.
pub fn pacing_delay(budget: Duration, elapsed: Duration) -> Duration {
    budget.saturating_sub(elapsed)
}

/// Time left in the frame budget for a frame that began at `started`, checked at `now`.
///
/// Call it once the frame has been ticked and drawn, so rendering is charged
/// against the budget as well.
pub fn frame_delay(budget: Duration, started: Instant, now: Instant) -> Duration {
    pacing_delay(budget, now.saturating_duration_since(started))
}

/// Milliseconds to pass to `wait_key`; never 0, which would block forever.
pub fn wait_millis(delay: Duration) -> i32 {
    delay.as_millis().clamp(1, i32::MAX as u128) as i32
}
