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

//! Renderable culling: the camera frustum test followed by mask composition.

mod culler;
mod mask;

pub use culler::{intersects_aabbs, intersects_spheres};
pub use mask::compute_visibility_masks;

use prism_core::lane::{Lane, LaneKind};
use prism_core::math::Frustum;
use prism_core::renderer::visibility::{VISIBLE_RENDERABLE, VISIBLE_RENDERABLE_BIT};
use prism_data::RenderableSoa;

/// Culls renderables against the camera frustum and composes their final masks.
#[derive(Debug, Default, Clone, Copy)]
pub struct RenderableCullingLane;

impl RenderableCullingLane {
    /// Creates the lane.
    pub fn new() -> Self {
        Self
    }

    /// Resets every mask, then sets [`VISIBLE_RENDERABLE`] on renderables inside
    /// `frustum`. With culling disabled every real row is marked visible.
    pub fn cull(&self, frustum: &Frustum, renderables: &mut RenderableSoa, culling_enabled: bool) {
        let len = renderables.len();
        let padded = renderables.padded_len();
        let columns = renderables.columns_mut();
        columns.visible_mask.fill(0);

        if culling_enabled {
            intersects_aabbs(
                columns.visible_mask,
                frustum,
                columns.world_aabb_center,
                columns.world_aabb_extent,
                padded,
                VISIBLE_RENDERABLE_BIT,
            );
        } else {
            columns.visible_mask[..len].fill(VISIBLE_RENDERABLE);
        }
        log::trace!("RenderableCulling: culled {len} renderables (enabled: {culling_enabled})");
    }

    /// Folds layers and shadow participation into the masks. Must run after every
    /// culling pass, including the shadow-camera ones.
    pub fn compose(&self, renderables: &mut RenderableSoa, visible_layers: u8, vsm: bool) {
        let len = renderables.len();
        let columns = renderables.columns_mut();
        compute_visibility_masks(
            visible_layers,
            columns.layers,
            columns.visibility,
            columns.visible_mask,
            len,
            vsm,
        );
    }
}

impl Lane for RenderableCullingLane {
    fn strategy_name(&self) -> &'static str {
        "FrustumCulling"
    }

    fn lane_kind(&self) -> LaneKind {
        LaneKind::Culling
    }
}
