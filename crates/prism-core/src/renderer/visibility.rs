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

//! Per-renderable visibility bits.
//!
//! Bit layout of a [`VisibleMask`]:
//!
//! ```text
//! bit 0        renderable visible from the camera
//! bit 1        directional shadow caster
//! bits 2..16   spot shadow caster, one bit per shadow-map slot
//! ```

use crate::limits::MAX_SHADOW_CASTING_SPOTS;

/// Per-renderable visibility bitmask.
pub type VisibleMask = u16;

/// Bit index of [`VISIBLE_RENDERABLE`].
pub const VISIBLE_RENDERABLE_BIT: u32 = 0;
/// Bit index of [`VISIBLE_DIR_SHADOW_RENDERABLE`].
pub const VISIBLE_DIR_SHADOW_RENDERABLE_BIT: u32 = 1;
/// Bit index of the first spot-shadow slot.
pub const VISIBLE_SPOT_SHADOW_RENDERABLE_BIT: u32 = 2;

/// Set when the renderable is visible from the camera.
pub const VISIBLE_RENDERABLE: VisibleMask = 1 << VISIBLE_RENDERABLE_BIT;
/// Set when the renderable casts into the directional shadow map.
pub const VISIBLE_DIR_SHADOW_RENDERABLE: VisibleMask = 1 << VISIBLE_DIR_SHADOW_RENDERABLE_BIT;
/// The two bits used to order the first three partition buckets.
pub const VISIBLE_DIR_AND_RENDERABLE: VisibleMask =
    VISIBLE_RENDERABLE | VISIBLE_DIR_SHADOW_RENDERABLE;
/// Union of all spot-shadow slots.
pub const VISIBLE_SPOT_SHADOW_RENDERABLE: VisibleMask = !VISIBLE_DIR_AND_RENDERABLE;

// Every spot slot must fit in the mask.
const _: () = assert!(
    VISIBLE_SPOT_SHADOW_RENDERABLE_BIT as usize + MAX_SHADOW_CASTING_SPOTS
        <= VisibleMask::BITS as usize
);

/// Bit index of spot-shadow slot `slot`.
#[inline]
pub const fn visible_spot_shadow_renderable_n_bit(slot: usize) -> u32 {
    VISIBLE_SPOT_SHADOW_RENDERABLE_BIT + slot as u32
}

/// Mask of spot-shadow slot `slot`.
#[inline]
pub const fn visible_spot_shadow_renderable_n(slot: usize) -> VisibleMask {
    1 << visible_spot_shadow_renderable_n_bit(slot)
}

/// Per-renderable visibility configuration, set by the scene.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityState {
    /// Frustum culling applies to this renderable.
    pub culling: bool,
    /// The renderable casts shadows.
    pub cast_shadows: bool,
    /// The renderable receives shadows.
    pub receive_shadows: bool,
}

impl VisibilityState {
    /// A culled, shadow-casting and shadow-receiving renderable.
    pub const DEFAULT_CASTER: Self = Self {
        culling: true,
        cast_shadows: true,
        receive_shadows: true,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spot_bits_do_not_overlap_low_bits() {
        for slot in 0..MAX_SHADOW_CASTING_SPOTS {
            let bit = visible_spot_shadow_renderable_n(slot);
            assert_eq!(bit & VISIBLE_DIR_AND_RENDERABLE, 0);
            assert_ne!(bit & VISIBLE_SPOT_SHADOW_RENDERABLE, 0);
        }
        assert_eq!(visible_spot_shadow_renderable_n(13), 1 << 15);
    }
}
