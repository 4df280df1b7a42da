//! Frame statistics and periodic reporting

use std::collections::VecDeque;
use std::time::Duration;

/// Rolling window of frame times
#[derive(Debug)]
pub struct FrameStats {
    frame_times: VecDeque<Duration>,
    max_samples: usize,
    fps: f32,
    avg_frame_time_ms: f32,
    max_frame_time_ms: f32,
    total_frames: u64,
}

impl FrameStats {
    /// Create a tracker keeping `max_samples` frames
    pub fn with_samples(max_samples: usize) -> Self {
        let max_samples = max_samples.max(1);
        Self {
            frame_times: VecDeque::with_capacity(max_samples),
            max_samples,
            fps: 0.0,
            avg_frame_time_ms: 0.0,
            max_frame_time_ms: 0.0,
            total_frames: 0,
        }
    }

    /// Record a frame with the given delta time
    pub fn record_frame(&mut self, delta: Duration) {
        self.total_frames += 1;

        if self.frame_times.len() >= self.max_samples {
            self.frame_times.pop_front();
        }
        self.frame_times.push_back(delta);

        let total: Duration = self.frame_times.iter().sum();
        let max = self.frame_times.iter().max().copied().unwrap_or_default();
        let count = self.frame_times.len() as f32;
        let total_secs = total.as_secs_f32();

        if total_secs > 0.0 {
            self.avg_frame_time_ms = (total_secs / count) * 1000.0;
            self.fps = count / total_secs;
        } else {
            self.avg_frame_time_ms = 0.0;
            self.fps = 0.0;
        }
        self.max_frame_time_ms = max.as_secs_f32() * 1000.0;
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }

    pub fn avg_frame_time_ms(&self) -> f32 {
        self.avg_frame_time_ms
    }

    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }

    /// One-line summary for the log
    pub fn format_stats(&self) -> String {
        format!(
            "FPS: {:.1} | Frame: {:.2}ms (max: {:.2}) | Frames: {}",
            self.fps, self.avg_frame_time_ms, self.max_frame_time_ms, self.total_frames
        )
    }
}

impl Default for FrameStats {
    fn default() -> Self {
        Self::with_samples(120)
    }
}

/// Frame statistics plus a timer deciding when to log them
#[derive(Debug)]
pub struct DebugInfo {
    pub frame_stats: FrameStats,
    report_interval: Duration,
    since_report: Duration,
}

impl DebugInfo {
    pub fn new(report_interval: Duration) -> Self {
        Self {
            frame_stats: FrameStats::default(),
            report_interval,
            since_report: Duration::ZERO,
        }
    }

    /// Record a frame; returns true once per report interval
    pub fn record_frame(&mut self, delta: Duration) -> bool {
        self.frame_stats.record_frame(delta);
        self.since_report += delta;
        if self.since_report >= self.report_interval {
            self.since_report = Duration::ZERO;
            return true;
        }
        false
    }
}

impl Default for DebugInfo {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}
