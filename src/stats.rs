//! Rolling frame timing

use std::collections::VecDeque;
use std::time::{Duration, Instant};

const WINDOW: usize = 100;

pub struct FrameStats {
    frame_times: VecDeque<f32>,
    last_report: Instant,
    report_interval: Duration,
}

impl FrameStats {
    pub fn new(now: Instant, report_interval: Duration) -> Self {
        Self {
            frame_times: VecDeque::with_capacity(WINDOW),
            last_report: now,
            report_interval,
        }
    }

    pub fn record(&mut self, frame_time: Duration) {
        if self.frame_times.len() == WINDOW {
            self.frame_times.pop_front();
        }
        self.frame_times.push_back(frame_time.as_secs_f32() * 1000.0);
    }

    /// Average frame time in milliseconds
    pub fn average_ms(&self) -> f32 {
        if self.frame_times.is_empty() {
            return 0.0;
        }
        self.frame_times.iter().sum::<f32>() / self.frame_times.len() as f32
    }

    pub fn fps(&self) -> f32 {
        let average = self.average_ms();
        if average > 0.0 {
            1000.0 / average
        } else {
            0.0
        }
    }

    /// True at most once per report interval
    pub fn should_report(&mut self, now: Instant) -> bool {
        if now.saturating_duration_since(self.last_report) >= self.report_interval {
            self.last_report = now;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_over_window() {
        let mut stats = FrameStats::new(Instant::now(), Duration::from_secs(1));
        assert_eq!(stats.fps(), 0.0);

        for _ in 0..WINDOW {
            stats.record(Duration::from_millis(40));
        }
        for _ in 0..WINDOW {
            stats.record(Duration::from_millis(20));
        }
        assert!((stats.average_ms() - 20.0).abs() < 1e-3);
        assert!((stats.fps() - 50.0).abs() < 1e-2);
    }

    #[test]
    fn test_report_interval() {
        let start = Instant::now();
        let mut stats = FrameStats::new(start, Duration::from_secs(5));
        assert!(!stats.should_report(start + Duration::from_secs(1)));
        assert!(stats.should_report(start + Duration::from_secs(5)));
        assert!(!stats.should_report(start + Duration::from_secs(6)));
    }
}
