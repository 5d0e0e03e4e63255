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

//! Sizing of the square reduction chain.

use crate::math::{floor_log2, Extent2D};

/// The smallest viewport side the chain is built for.
pub const MIN_VIEWPORT_DIMENSION: u32 = 8;

/// Level sizes of the luminance reduction chain for one viewport size.
///
/// For a viewport whose smaller side is `m` (raised to at least
/// [`MIN_VIEWPORT_DIMENSION`]), `n = floor(log2(m))`. The HDR frame is copied into a
/// `2^n` square, level `0` is `2^n` and level `i` is `2^(n - i)`, down to the single
/// texel at level `n`.
///
/// # Examples
///
/// ```
/// use lumen_core::luminance::LuminanceChainLayout;
/// use lumen_core::math::Extent2D;
///
/// let layout = LuminanceChainLayout::for_viewport(Extent2D::new(512, 512));
/// assert_eq!(layout.level_count(), 10);
/// let layout = LuminanceChainLayout::for_viewport(Extent2D::new(300, 300));
/// assert_eq!(layout.level_count(), 9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LuminanceChainLayout {
    exponent: u32,
}

impl LuminanceChainLayout {
    /// Computes the layout for a viewport of the given size.
    pub fn for_viewport(viewport: Extent2D) -> Self {
        let side = viewport.clamped_min(MIN_VIEWPORT_DIMENSION).min_dimension();
        Self {
            exponent: floor_log2(side),
        }
    }

    /// `n`, the base-two logarithm of the square side.
    pub fn exponent(&self) -> u32 {
        self.exponent
    }

    /// The number of chain levels, `n + 1`.
    pub fn level_count(&self) -> usize {
        self.exponent as usize + 1
    }

    /// Size of the square copy of the HDR frame, equal to level `0`.
    pub fn square_size(&self) -> Extent2D {
        Extent2D::square(1 << self.exponent)
    }

    /// Size of `level`, or `None` past the last level.
    pub fn level_size(&self, level: usize) -> Option<Extent2D> {
        (level < self.level_count()).then(|| Extent2D::square(1 << (self.exponent as usize - level)))
    }

    /// Sizes of every level, largest first.
    pub fn level_sizes(&self) -> impl Iterator<Item = Extent2D> + '_ {
        (0..self.level_count()).filter_map(move |level| self.level_size(level))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_512_square_has_ten_levels() {
        let layout = LuminanceChainLayout::for_viewport(Extent2D::new(512, 512));
        assert_eq!(layout.exponent(), 9);
        assert_eq!(layout.level_count(), 10);
        assert_eq!(layout.square_size(), Extent2D::square(512));
        let sizes: Vec<u32> = layout.level_sizes().map(|e| e.width).collect();
        assert_eq!(sizes, vec![512, 256, 128, 64, 32, 16, 8, 4, 2, 1]);
    }

    #[test]
    fn test_resize_to_300_rebuilds_nine_levels() {
        let layout = LuminanceChainLayout::for_viewport(Extent2D::new(300, 300));
        assert_eq!(layout.exponent(), 8);
        assert_eq!(layout.level_count(), 9);
        assert_eq!(layout.square_size(), Extent2D::square(256));
        assert_eq!(layout.level_size(8), Some(Extent2D::square(1)));
        assert_eq!(layout.level_size(9), None);
    }

    #[test]
    fn test_uses_smaller_side() {
        let layout = LuminanceChainLayout::for_viewport(Extent2D::new(1920, 1080));
        assert_eq!(layout.square_size(), Extent2D::square(1024));
        assert_eq!(layout.level_count(), 11);
    }

    #[test]
    fn test_degenerate_viewport_is_clamped() {
        for size in [Extent2D::new(0, 0), Extent2D::new(1, 600), Extent2D::new(7, 7)] {
            let layout = LuminanceChainLayout::for_viewport(size);
            assert_eq!(layout.exponent(), 3);
            assert_eq!(layout.level_count(), 4);
        }
    }
}
