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

//! Light selection: culls, filters and sorts the lights of a frame, then truncates
//! the set to the capacity of the GPU light buffer.
//!
//! After [`LightSelectionLane::execute`] the light store holds, in order, the
//! directional row followed by the visible positional lights sorted by increasing
//! camera distance, at most `max_lights` of them.

use crate::culling_lane::intersects_spheres;
use prism_core::lane::{Lane, LaneKind};
use prism_core::limits::{SceneLimits, DIRECTIONAL_LIGHTS_COUNT, LIGHT_PADDING};
use prism_core::math::{Frustum, Vec3};
use prism_core::renderer::{CameraInfo, LightManager};
use prism_data::{partition_rows, permute_rows, round_up, LightSoa};

/// Counters reported by a light selection pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LightSelection {
    /// Positional lights that survived culling and filtering.
    pub visible: usize,
    /// Positional lights kept after truncation.
    pub kept: usize,
    /// Visible positional lights dropped for lack of capacity.
    pub dropped: usize,
}

/// Selects the lights that contribute to the frame.
#[derive(Debug, Default, Clone, Copy)]
pub struct LightSelectionLane {
    limits: SceneLimits,
}

impl LightSelectionLane {
    /// Creates the lane with the given capacity limits.
    pub fn new(limits: SceneLimits) -> Self {
        Self { limits }
    }

    /// The capacity limits applied by this lane.
    pub fn limits(&self) -> &SceneLimits {
        &self.limits
    }

    /// Runs the whole selection over `lights`, in place.
    pub fn execute(
        &self,
        lcm: &dyn LightManager,
        camera: &CameraInfo,
        frustum: &Frustum,
        lights: &mut LightSoa,
    ) -> LightSelection {
        debug_assert!(!lights.is_empty(), "light store lost its directional row");
        if lights.len() == DIRECTIONAL_LIGHTS_COUNT {
            return LightSelection::default();
        }

        let visible_end = self.cull_and_filter(lcm, frustum, lights);
        let visible = visible_end - DIRECTIONAL_LIGHTS_COUNT;
        if visible > 0 {
            sort_by_camera_distance(camera, lights, visible_end);
        }

        let kept_end = visible_end.min(self.limits.max_light_rows());
        lights.truncate(kept_end);

        let selection = LightSelection {
            visible,
            kept: kept_end - DIRECTIONAL_LIGHTS_COUNT,
            dropped: visible_end - kept_end,
        };
        if selection.dropped > 0 {
            log::debug!(
                "LightSelection: {} visible lights exceed capacity {}, dropped the {} farthest",
                visible,
                self.limits.max_lights,
                selection.dropped
            );
        }
        log::trace!("LightSelection: {selection:?}");
        selection
    }

    /// Frustum-culls the positional lights, drops the ones that cannot contribute and
    /// moves the survivors right after the directional row. Returns the end of the
    /// visible rows.
    fn cull_and_filter(&self, lcm: &dyn LightManager, frustum: &Frustum, lights: &mut LightSoa) -> usize {
        let len = lights.len();
        let padded = lights.padded_len();
        let columns = lights.columns_mut();

        columns.visibility.fill(0);
        intersects_spheres(columns.visibility, frustum, columns.position_radius, padded, 0);
        // The directional light is exempt from culling.
        columns.visibility[0] = 1;

        for i in DIRECTIONAL_LIGHTS_COUNT..len {
            if columns.visibility[i] == 0 {
                continue;
            }
            let keep = match columns.light_instance[i] {
                Some(li) => {
                    lcm.is_light_caster(li)
                        && lcm.intensity(li) > 0.0
                        && !(lcm.is_spot_light(li)
                            && spot_outside_frustum(
                                frustum,
                                columns.position_radius[i].truncate(),
                                columns.direction[i],
                                lcm.cos_outer_squared(li),
                            ))
                }
                None => false,
            };
            columns.visibility[i] = u8::from(keep);
        }

        partition_rows(lights, DIRECTIONAL_LIGHTS_COUNT, len, |s, i| s.visibility()[i] != 0)
    }
}

/// Conservative cone test: `true` only when, for some plane, the whole cone points away
/// from the frustum from a position already outside that plane.
///
/// A light is never rejected unless it is invisible; some invisible lights survive.
pub fn spot_outside_frustum(frustum: &Frustum, position: Vec3, axis: Vec3, cos_outer_squared: f32) -> bool {
    let mut invisible = false;
    for plane in &frustum.planes {
        let n = plane.normal;
        let p = (position + n * plane.distance).dot(n);
        let c = n.dot(axis);
        invisible |= (1.0 - c * c) < cos_outer_squared && c > 0.0 && p > 0.0;
    }
    invisible
}

/// Sorts rows `1..end` by increasing forward distance to the camera, moving whole rows.
fn sort_by_camera_distance(camera: &CameraInfo, lights: &mut LightSoa, end: usize) {
    // Padded to 4 so the distance loop runs over whole chunks.
    let count = round_up(end, LIGHT_PADDING);
    let distances: Vec<f32> = lights.position_radius()[..count]
        .iter()
        .map(|sphere| camera.forward_distance(sphere.truncate()))
        .collect();

    let mut order: Vec<usize> = (DIRECTIONAL_LIGHTS_COUNT..end).collect();
    order.sort_by(|&a, &b| distances[a].total_cmp(&distances[b]));
    permute_rows(lights, DIRECTIONAL_LIGHTS_COUNT, &order);
}

impl Lane for LightSelectionLane {
    fn strategy_name(&self) -> &'static str {
        "DistanceSortedLights"
    }

    fn lane_kind(&self) -> LaneKind {
        LaneKind::Lighting
    }
}
