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

//! Temporal smoothing of the measured log-average luminance.

use serde::{Deserialize, Serialize};

/// Tunables of the luminance pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdaptationSettings {
    /// Time constant `tau` of the exponential filter, in seconds.
    pub time_constant: f32,
    /// Added to the luminance before taking its logarithm.
    pub log_epsilon: f32,
    /// Middle-grey key value the adapted luminance is mapped to.
    pub key_value: f32,
}

impl Default for AdaptationSettings {
    fn default() -> Self {
        Self {
            time_constant: 1.0,
            log_epsilon: 1e-4,
            key_value: 0.18,
        }
    }
}

/// Exponentially smoothed log-average luminance.
///
/// Each [`step`](Self::step) moves the adapted value towards the measurement by
/// `(measured - adapted) * (1 - exp(-dt / tau))`, so the estimate converges with
/// time constant `tau` regardless of the frame rate and never jumps by the full
/// difference in a single frame. The very first measurement initializes the state.
#[derive(Debug, Clone, PartialEq)]
pub struct LuminanceAdaptation {
    time_constant: f32,
    adapted: Option<f32>,
}

impl LuminanceAdaptation {
    /// Creates an empty adaptation state with time constant `tau` in seconds.
    pub fn new(time_constant: f32) -> Self {
        Self {
            time_constant,
            adapted: None,
        }
    }

    /// Creates an adaptation state that already holds `adapted`.
    pub fn starting_at(time_constant: f32, adapted: f32) -> Self {
        Self {
            time_constant,
            adapted: Some(adapted),
        }
    }

    /// The time constant in seconds.
    pub fn time_constant(&self) -> f32 {
        self.time_constant
    }

    /// The current adapted log-luminance, if any measurement was taken.
    pub fn adapted(&self) -> Option<f32> {
        self.adapted
    }

    /// The blend factor applied for an interval of `dt` seconds.
    ///
    /// Non-finite or negative intervals count as zero. A non-positive time constant
    /// adapts instantly.
    pub fn blend_factor(&self, dt: f32) -> f32 {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        if self.time_constant <= 0.0 {
            return 1.0;
        }
        1.0 - (-dt / self.time_constant).exp()
    }

    /// Feeds a new measurement taken `dt` seconds after the previous one and
    /// returns the updated adapted value.
    ///
    /// Non-finite measurements are ignored; before the first valid one the returned
    /// value is `0.0` and the state stays unset.
    pub fn step(&mut self, measured: f32, dt: f32) -> f32 {
        if !measured.is_finite() {
            log::warn!("Ignoring non-finite luminance measurement: {measured}");
            return self.adapted.unwrap_or(0.0);
        }
        let adapted = match self.adapted {
            None => measured,
            Some(current) => current + (measured - current) * self.blend_factor(dt),
        };
        self.adapted = Some(adapted);
        adapted
    }

    /// Forgets the adapted value.
    pub fn reset(&mut self) {
        self.adapted = None;
    }
}

/// Converts an adapted log-luminance into a linear exposure multiplier.
///
/// The log-average luminance `exp(adapted)` is mapped onto `key_value`.
///
/// # Examples
///
/// ```
/// use lumen_core::luminance::exposure_from_log_luminance;
/// assert_eq!(exposure_from_log_luminance(0.0, 0.18), 0.18);
/// ```
pub fn exposure_from_log_luminance(adapted_log_luminance: f32, key_value: f32) -> f32 {
    key_value / adapted_log_luminance.exp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_first_measurement_initializes() {
        let mut a = LuminanceAdaptation::new(1.0);
        assert_eq!(a.adapted(), None);
        assert_eq!(a.step(-2.5, 0.0), -2.5);
        assert_eq!(a.adapted(), Some(-2.5));
    }

    #[test]
    fn test_zero_dt_keeps_value() {
        let mut a = LuminanceAdaptation::starting_at(1.0, 0.5);
        assert_eq!(a.step(10.0, 0.0), 0.5);
    }

    #[test]
    fn test_convergence_follows_exponential() {
        let tau: f32 = 1.0;
        let target: f32 = -1.0;
        let initial: f32 = 2.0;
        let dt: f32 = 1.0 / 60.0;
        let mut a = LuminanceAdaptation::starting_at(tau, initial);
        let mut previous_gap = (initial - target).abs();
        for frame in 1..=240 {
            let value = a.step(target, dt);
            let gap = (value - target).abs();
            assert!(gap < previous_gap, "not monotonic at frame {frame}");
            previous_gap = gap;

            let t = frame as f32 * dt;
            let expected = (initial - target).abs() * (-t / tau).exp();
            assert_relative_eq!(gap, expected, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_spike_is_damped() {
        let dt: f32 = 1.0 / 30.0;
        let mut a = LuminanceAdaptation::starting_at(1.0, 0.0);
        let spike: f32 = 8.0;
        let value = a.step(spike, dt);
        let bound = spike * (1.0 - (-dt).exp());
        assert!(value <= bound + 1e-6);
        assert!(value < spike);
        // Back to the baseline the next frame, no overshoot.
        let after = a.step(0.0, dt);
        assert!(after < value && after > 0.0);
    }

    #[test]
    fn test_frame_rate_independence() {
        let mut fast = LuminanceAdaptation::starting_at(0.5, 0.0);
        let mut slow = LuminanceAdaptation::starting_at(0.5, 0.0);
        for _ in 0..120 {
            fast.step(1.0, 1.0 / 120.0);
        }
        for _ in 0..30 {
            slow.step(1.0, 1.0 / 30.0);
        }
        assert_relative_eq!(
            fast.adapted().unwrap(),
            slow.adapted().unwrap(),
            epsilon = 1e-4
        );
    }

    #[test]
    fn test_degenerate_inputs() {
        let mut a = LuminanceAdaptation::starting_at(1.0, 0.25);
        assert_eq!(a.step(f32::NAN, 0.1), 0.25);
        assert_eq!(a.step(1.0, -3.0), 0.25);
        assert_eq!(a.step(1.0, f32::INFINITY), 0.25);

        let mut instant = LuminanceAdaptation::starting_at(0.0, 0.0);
        assert_eq!(instant.step(3.0, 0.01), 3.0);

        a.reset();
        assert_eq!(a.adapted(), None);
    }

    #[test]
    fn test_non_finite_first_measurement_leaves_state_unset() {
        let mut a = LuminanceAdaptation::new(1.0);
        a.step(f32::NAN, 0.0);
        a.step(f32::NEG_INFINITY, 0.1);
        assert_eq!(a.adapted(), None);

        // The next valid measurement still initializes directly.
        assert_eq!(a.step(-1.5, 0.1), -1.5);
        assert_eq!(a.adapted(), Some(-1.5));
    }

    #[test]
    fn test_exposure_maps_average_to_key() {
        let log_avg = 1.5_f32.ln();
        assert_relative_eq!(exposure_from_log_luminance(log_avg, 0.18) * 1.5, 0.18, epsilon = 1e-6);
    }
}
