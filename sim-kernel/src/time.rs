// Copyright 2025 John Brosnihan
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
//! Frame clock
//!
//! [`Time`] is owned by the simulation driver and handed to every system
//! through its context. It never reads a wall clock: the driver feeds it the
//! measured frame delta, which keeps ticks reproducible in tests.

use std::time::Duration;

/// Per-frame timing state
#[derive(Debug, Clone, PartialEq)]
pub struct Time {
    delta: f32,
    elapsed: f64,
    frame: u64,
    frame_rate: u32,
    frame_delay: Duration,
    measured_fps: u32,
    frames_in_window: u32,
    window_start: f64,
}

impl Time {
    /// Create a clock targeting `frame_rate` frames per second
    ///
    /// A zero rate is treated as 1; [`EngineConfig::validate`](crate::config::EngineConfig::validate)
    /// rejects it before a driver gets here.
    pub fn new(frame_rate: u32) -> Self {
        let frame_rate = frame_rate.max(1);
        Time {
            delta: 0.0,
            elapsed: 0.0,
            frame: 0,
            frame_rate,
            frame_delay: Duration::from_nanos(1_000_000_000 / u64::from(frame_rate)),
            measured_fps: 0,
            frames_in_window: 0,
            window_start: 0.0,
        }
    }

    /// Advance by one frame of `delta` seconds
    pub fn advance(&mut self, delta: f32) {
        self.delta = delta;
        self.elapsed += f64::from(delta);
        self.frame += 1;
        self.frames_in_window += 1;

        if self.elapsed - self.window_start >= 1.0 {
            self.measured_fps = self.frames_in_window;
            self.frames_in_window = 0;
            self.window_start = self.elapsed;
        }
    }

    /// Return to the state of a freshly created clock
    pub fn reset(&mut self) {
        *self = Time::new(self.frame_rate);
    }

    /// Seconds covered by the current frame
    pub fn delta(&self) -> f32 {
        self.delta
    }

    /// Seconds since the clock was created or reset
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Number of frames advanced so far
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Target frame rate
    pub fn frame_rate(&self) -> u32 {
        self.frame_rate
    }

    /// Target duration of one frame
    pub fn frame_delay(&self) -> Duration {
        self.frame_delay
    }

    /// Frames counted during the last full second of simulated time
    pub fn measured_fps(&self) -> u32 {
        self.measured_fps
    }

    /// How long a frame limiter should wait after spending `frame_time` on a frame
    pub fn remaining_frame_budget(&self, frame_time: Duration) -> Option<Duration> {
        self.frame_delay
            .checked_sub(frame_time)
            .filter(|remaining| !remaining.is_zero())
    }
}

impl Default for Time {
    fn default() -> Self {
        Time::new(60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance() {
        let mut time = Time::new(60);
        time.advance(0.5);
        time.advance(0.25);
        assert_eq!(time.delta(), 0.25);
        assert_eq!(time.elapsed(), 0.75);
        assert_eq!(time.frame(), 2);
    }

    #[test]
    fn test_measured_fps() {
        let mut time = Time::new(4);
        for _ in 0..4 {
            time.advance(0.25);
        }
        assert_eq!(time.measured_fps(), 4);
    }

    #[test]
    fn test_reset_keeps_rate() {
        let mut time = Time::new(30);
        time.advance(1.0);
        time.reset();
        assert_eq!(time.frame(), 0);
        assert_eq!(time.elapsed(), 0.0);
        assert_eq!(time.frame_rate(), 30);
    }

    #[test]
    fn test_frame_budget() {
        let time = Time::new(10);
        assert_eq!(
            time.remaining_frame_budget(Duration::from_millis(40)),
            Some(Duration::from_millis(60))
        );
        assert_eq!(time.remaining_frame_budget(Duration::from_millis(100)), None);
        assert_eq!(time.remaining_frame_budget(Duration::from_millis(250)), None);
    }
}
