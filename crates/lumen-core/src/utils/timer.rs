// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Monotonic timing for the frame loop.

use std::time::{Duration, Instant};

/// Measures the time elapsed since it was started.
#[derive(Debug, Clone)]
pub struct Stopwatch {
    start_time: Instant,
}

impl Stopwatch {
    /// Creates a new, running stopwatch.
    #[inline]
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
        }
    }

    /// Returns the elapsed time since the stopwatch was started.
    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Returns the elapsed time in seconds as `f32`.
    #[inline]
    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed().as_secs_f32()
    }
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

/// Produces the `dt` fed to luminance adaptation.
///
/// `dt` is the wall-clock time between two consecutive [`sample_dt`](Self::sample_dt)
/// calls. The frame loop samples once per presented frame, right after the luminance
/// read back, so `dt` tracks the real frame period even when frame times vary. The
/// first sample has no predecessor and reports `0`.
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last_sample: Option<Instant>,
}

impl FrameClock {
    /// Creates a clock that has not been sampled yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the seconds since the previous sample, or `0.0` on the first one.
    pub fn sample_dt(&mut self) -> f32 {
        self.sample_dt_at(Instant::now())
    }

    fn sample_dt_at(&mut self, now: Instant) -> f32 {
        let dt = self
            .last_sample
            .map(|last| now.saturating_duration_since(last).as_secs_f32())
            .unwrap_or(0.0);
        self.last_sample = Some(now);
        dt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    const SLEEP_DURATION_MS: u64 = 20;

    #[test]
    fn stopwatch_measures_sleep() {
        let watch = Stopwatch::new();
        thread::sleep(Duration::from_millis(SLEEP_DURATION_MS));
        assert!(watch.elapsed() >= Duration::from_millis(SLEEP_DURATION_MS));
        assert!(watch.elapsed_secs() >= SLEEP_DURATION_MS as f32 / 1000.0);
    }

    #[test]
    fn frame_clock_first_dt_is_zero() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.sample_dt(), 0.0);
        thread::sleep(Duration::from_millis(SLEEP_DURATION_MS));
        assert!(clock.sample_dt() >= SLEEP_DURATION_MS as f32 / 1000.0);
    }

    #[test]
    fn frame_clock_reports_interval_between_samples() {
        let mut clock = FrameClock::new();
        let t0 = Instant::now();
        assert_eq!(clock.sample_dt_at(t0), 0.0);
        let dt = clock.sample_dt_at(t0 + Duration::from_millis(250));
        assert!((dt - 0.25).abs() < 1e-6);
        // A clock going backwards never yields a negative interval.
        assert_eq!(clock.sample_dt_at(t0), 0.0);
    }
}
