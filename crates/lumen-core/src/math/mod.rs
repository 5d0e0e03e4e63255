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

//! Provides the linear algebra primitives used by the renderer.
//!
//! The conventions follow the rest of the renderer: a **left-handed** world with
//! `+Y` up and `+Z` forward, column-major matrices multiplied as `M * v`, and
//! clip-space depth in the `[0, 1]` range. All angles are in **radians**.

// --- Fundamental Constants ---

/// A small constant for floating-point comparisons.
pub const EPSILON: f32 = 1e-5;

pub use std::f32::consts::{FRAC_PI_2, PI, TAU};

// --- Declare Sub-Modules ---

pub mod dimension;
pub mod geometry;
pub mod matrix;
pub mod quaternion;
pub mod vector;

// --- Re-export Principal Types ---

pub use self::dimension::Extent2D;
pub use self::geometry::WorldBorders;
pub use self::matrix::Mat4;
pub use self::quaternion::Quaternion;
pub use self::vector::{Vec2, Vec3, Vec4};

// --- Utility Functions ---

/// Checks if two floating-point numbers are approximately equal using [`EPSILON`].
///
/// # Examples
///
/// ```
/// use lumen_core::math::approx_eq;
/// assert!(approx_eq(0.1 + 0.2, 0.3));
/// assert!(!approx_eq(0.1, 0.2));
/// ```
#[inline]
pub fn approx_eq(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

/// Converts a gamma-encoded color channel to linear space with a `2.2` power curve.
///
/// # Examples
///
/// ```
/// use lumen_core::math::srgb_to_linear;
/// assert_eq!(srgb_to_linear(0.0), 0.0);
/// assert_eq!(srgb_to_linear(1.0), 1.0);
/// ```
#[inline]
pub fn srgb_to_linear(channel: f32) -> f32 {
    channel.max(0.0).powf(2.2)
}

/// Returns `floor(log2(value))` for a non-zero integer.
///
/// # Examples
///
/// ```
/// use lumen_core::math::floor_log2;
/// assert_eq!(floor_log2(1), 0);
/// assert_eq!(floor_log2(512), 9);
/// assert_eq!(floor_log2(300), 8);
/// ```
#[inline]
pub fn floor_log2(value: u32) -> u32 {
    debug_assert!(value > 0, "floor_log2 is undefined for zero");
    u32::BITS - 1 - value.leading_zeros()
}
