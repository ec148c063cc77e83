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

//! Shadow-caster classification and the visibility partition of renderables.
//!
//! Classification registers the shadow maps of the frame with the shadow-map manager:
//! cascades for the directional light if it casts shadows, then one map per
//! shadow-casting spot light in selection order, up to `max_shadow_casting_spots`.
//!
//! The partition then reorders the renderable store into five buckets,
//!
//! ```text
//! [ renderable | renderable + dir caster | dir caster | spot caster | invisible ]
//! ```
//!
//! the first three keyed on the two lowest mask bits only. It reports both the disjoint
//! buckets and the overlapping draw ranges consumed downstream.

use prism_core::lane::{Lane, LaneKind};
use prism_core::limits::{SceneLimits, DIRECTIONAL_LIGHTS_COUNT, MAX_SHADOW_CASCADES};
use prism_core::renderer::visibility::{
    VISIBLE_DIR_AND_RENDERABLE, VISIBLE_DIR_SHADOW_RENDERABLE, VISIBLE_RENDERABLE,
    VISIBLE_SPOT_SHADOW_RENDERABLE,
};
use prism_core::renderer::{LightManager, ShadowMapManager, VisibleMask};
use prism_data::{partition_rows, LightSoa, Range, RenderableSoa};

/// The shadow maps registered for a frame.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ShadowCasters {
    /// The directional light casts cascaded shadows.
    pub directional: bool,
    /// Light-store rows of the shadow-casting spot lights, in slot order.
    pub spot_lights: Vec<usize>,
}

/// Disjoint buckets of the partitioned renderable store, in store order. Together they
/// cover every row.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityBuckets {
    /// Rows visible from the camera. Rows from `first_directional_caster` on also cast
    /// directional shadows.
    pub renderable: Range,
    /// Start of the directional casters inside `renderable`.
    pub first_directional_caster: usize,
    /// Directional shadow casters not visible from the camera.
    pub directional_caster_only: Range,
    /// Rows that only cast spot shadows.
    pub spot_caster_only: Range,
    /// Rows drawn by no pass.
    pub invisible: Range,
}

impl VisibilityBuckets {
    /// The four buckets in store order.
    pub fn ranges(&self) -> [Range; 4] {
        [
            self.renderable,
            self.directional_caster_only,
            self.spot_caster_only,
            self.invisible,
        ]
    }
}

/// Index ranges of the partitioned renderable store.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityRanges {
    /// Disjoint buckets the draw ranges below are derived from.
    pub buckets: VisibilityBuckets,
    /// Renderables visible from the camera, casters or not.
    pub visible_renderables: Range,
    /// Directional shadow casters, visible from the camera or not.
    pub directional_casters: Range,
    /// Everything that may be drawn into a spot shadow map.
    pub spot_casters: Range,
    /// Every renderable that is drawn at all.
    pub merged: Range,
}

/// Classifies shadow casters and partitions renderables by visibility.
#[derive(Debug, Default, Clone, Copy)]
pub struct ShadowCasterLane {
    limits: SceneLimits,
}

impl ShadowCasterLane {
    /// Creates the lane with the given capacity limits.
    pub fn new(limits: SceneLimits) -> Self {
        debug_assert!(
            limits.max_shadow_casting_spots <= prism_core::limits::MAX_SHADOW_CASTING_SPOTS,
            "the visibility mask has room for {} spot shadows",
            prism_core::limits::MAX_SHADOW_CASTING_SPOTS
        );
        Self { limits }
    }

    /// Registers this frame's shadow maps with `manager`. `lights` must hold the output
    /// of light selection.
    pub fn classify(
        &self,
        lcm: &dyn LightManager,
        lights: &LightSoa,
        manager: &mut dyn ShadowMapManager,
    ) -> ShadowCasters {
        manager.reset();
        let mut casters = ShadowCasters::default();

        if let Some(sun) = lights.directional() {
            if lcm.is_shadow_caster(sun) {
                let options = lcm.shadow_options(sun);
                debug_assert!(
                    (1..=MAX_SHADOW_CASCADES).contains(&options.shadow_cascades),
                    "invalid cascade count {}",
                    options.shadow_cascades
                );
                manager.set_shadow_cascades(0, options);
                casters.directional = true;
            }
        }

        let max_spots = self.limits.max_shadow_casting_spots;
        for (l, instance) in lights.instances()[..lights.len()]
            .iter()
            .enumerate()
            .skip(DIRECTIONAL_LIGHTS_COUNT)
        {
            debug_assert_ne!(lights.visibility()[l], 0, "light {l} was not selected");
            let Some(li) = *instance else { continue };
            if !lcm.is_shadow_caster(li) || !lcm.is_spot_light(li) {
                continue;
            }
            if casters.spot_lights.len() == max_spots {
                log::debug!(
                    "ShadowCaster: spot shadow capacity {max_spots} reached, ignoring from light {l}"
                );
                break;
            }
            manager.add_spot_shadow_map(l, lcm.shadow_options(li));
            casters.spot_lights.push(l);
        }

        log::trace!(
            "ShadowCaster: directional {}, {} spot shadow maps",
            casters.directional,
            casters.spot_lights.len()
        );
        casters
    }

    /// Partitions `renderables` by their composed visibility masks.
    pub fn partition(&self, renderables: &mut RenderableSoa) -> VisibilityRanges {
        let end = renderables.len();

        let begin_casters = partition_rows(renderables, 0, end, low_bits_eq(VISIBLE_RENDERABLE));
        let begin_casters_only =
            partition_rows(renderables, begin_casters, end, low_bits_eq(VISIBLE_DIR_AND_RENDERABLE));
        let begin_spot_only = partition_rows(
            renderables,
            begin_casters_only,
            end,
            low_bits_eq(VISIBLE_DIR_SHADOW_RENDERABLE),
        );
        let end_spot_only = partition_rows(renderables, begin_spot_only, end, |s, i| {
            s.visible_masks()[i] & VISIBLE_SPOT_SHADOW_RENDERABLE != 0
        });

        VisibilityRanges {
            buckets: VisibilityBuckets {
                renderable: Range::new(0, begin_casters_only),
                first_directional_caster: begin_casters,
                directional_caster_only: Range::new(begin_casters_only, begin_spot_only),
                spot_caster_only: Range::new(begin_spot_only, end_spot_only),
                invisible: Range::new(end_spot_only, end),
            },
            visible_renderables: Range::new(0, begin_casters_only),
            directional_casters: Range::new(begin_casters, begin_spot_only),
            spot_casters: Range::new(0, end_spot_only),
            merged: Range::new(0, end_spot_only),
        }
    }
}

/// Matches rows whose two lowest mask bits equal `bits`, ignoring the spot bits.
fn low_bits_eq(bits: VisibleMask) -> impl Fn(&RenderableSoa, usize) -> bool {
    move |s, i| s.visible_masks()[i] & VISIBLE_DIR_AND_RENDERABLE == bits
}

impl Lane for ShadowCasterLane {
    fn strategy_name(&self) -> &'static str {
        "VisibilityPartition"
    }

    fn lane_kind(&self) -> LaneKind {
        LaneKind::Shadow
    }
}

#[cfg(test)]
mod tests;
