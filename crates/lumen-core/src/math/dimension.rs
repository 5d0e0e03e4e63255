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

//! Integer extents for surfaces and render targets.

/// A two-dimensional extent in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Extent2D {
    /// The width component of the extent.
    pub width: u32,
    /// The height component of the extent.
    pub height: u32,
}

impl Extent2D {
    /// Creates a new extent.
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Creates a square extent with the given side length.
    #[inline]
    pub const fn square(side: u32) -> Self {
        Self {
            width: side,
            height: side,
        }
    }

    /// Returns the smaller of the two dimensions.
    #[inline]
    pub fn min_dimension(&self) -> u32 {
        self.width.min(self.height)
    }

    /// Returns a copy with both dimensions raised to at least `min`.
    #[inline]
    pub fn clamped_min(&self, min: u32) -> Self {
        Self {
            width: self.width.max(min),
            height: self.height.max(min),
        }
    }

    /// Returns `true` if either dimension is zero.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Width divided by height, or `1.0` for a degenerate extent.
    #[inline]
    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamped_min_raises_small_sides_only() {
        let e = Extent2D::new(3, 600).clamped_min(8);
        assert_eq!(e, Extent2D::new(8, 600));
    }

    #[test]
    fn test_aspect_ratio_handles_zero_height() {
        assert_eq!(Extent2D::new(800, 0).aspect_ratio(), 1.0);
        assert_eq!(Extent2D::new(800, 400).aspect_ratio(), 2.0);
        assert!(Extent2D::new(0, 10).is_empty());
    }
}
