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

//! Branch-free composition of the final per-renderable visibility bits.

use prism_core::limits::{MAX_SHADOW_CASTING_SPOTS, RENDERABLE_PADDING};
use prism_core::renderer::visibility::{
    visible_spot_shadow_renderable_n, visible_spot_shadow_renderable_n_bit,
    VISIBLE_DIR_SHADOW_RENDERABLE, VISIBLE_DIR_SHADOW_RENDERABLE_BIT, VISIBLE_RENDERABLE,
};
use prism_core::renderer::{VisibilityState, VisibleMask};

/// Combines the culling results already stored in `masks` with layer membership and
/// shadow participation.
///
/// Per element, with `visible = !culling || frustum_bit`:
///
/// ```text
/// in_layer           = layers & visible_layers != 0
/// renderable         = visible(bit 0) && in_layer
/// caster             = cast_shadows || (vsm && receive_shadows)
/// directional caster = visible(bit 1) && in_layer && caster
/// spot caster j      = visible(bit 2 + j) && in_layer && caster
/// ```
///
/// The loop runs over `count` rounded up to 16, which the stores guarantee is in bounds.
/// Padding rows have no layer and always end up with an empty mask.
pub fn compute_visibility_masks(
    visible_layers: u8,
    layers: &[u8],
    visibility: &[VisibilityState],
    masks: &mut [VisibleMask],
    count: usize,
    vsm: bool,
) {
    let count = prism_data::round_up(count, RENDERABLE_PADDING);
    for ((mask, &layer), v) in masks[..count]
        .iter_mut()
        .zip(&layers[..count])
        .zip(&visibility[..count])
    {
        let m = *mask;
        let in_layer = (layer & visible_layers) != 0;
        let not_culled = !v.culling;
        let caster = v.cast_shadows | (vsm & v.receive_shadows);

        let renderable = (not_culled | ((m & VISIBLE_RENDERABLE) != 0)) & in_layer;
        let dir_caster =
            (not_culled | ((m & VISIBLE_DIR_SHADOW_RENDERABLE) != 0)) & in_layer & caster;

        let mut out = VisibleMask::from(renderable)
            | (VisibleMask::from(dir_caster) << VISIBLE_DIR_SHADOW_RENDERABLE_BIT);
        for j in 0..MAX_SHADOW_CASTING_SPOTS {
            let spot = (not_culled | ((m & visible_spot_shadow_renderable_n(j)) != 0))
                & in_layer
                & caster;
            out |= VisibleMask::from(spot) << visible_spot_shadow_renderable_n_bit(j);
        }
        *mask = out;
    }
}
