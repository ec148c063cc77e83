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

//! Shadow-map bookkeeping contract.

use super::{camera::CameraInfo, light::ShadowOptions, visibility::VisibleMask};
use crate::math::{Vec3, Vec4};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// The shadowing techniques a frame needs, as reported by the shadow-map manager.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ShadowTechnique: u8 {
        /// At least one shadow map must be rendered.
        const SHADOW_MAP = 1 << 0;
        /// Screen-space contact shadows are needed.
        const SCREEN_SPACE = 1 << 1;
    }
}

/// Shadow filtering technique of a view.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShadowType {
    /// Percentage-closer filtering.
    #[default]
    Pcf,
    /// Variance shadow maps. Shadow receivers are rendered into the caster pass too.
    Vsm,
    /// PCF with contact hardening.
    Dpcf,
    /// Percentage-closer soft shadows.
    Pcss,
}

/// Frame data handed to [`ShadowMapManager::update`].
///
/// The manager owns shadow-camera culling and may set the directional and spot caster
/// bits of `visible_mask`; it must leave bit 0 untouched.
pub struct ShadowUpdate<'a> {
    /// The viewing camera of this frame.
    pub camera: &'a CameraInfo,
    /// World-space AABB centers of the renderables.
    pub world_aabb_center: &'a [Vec3],
    /// World-space AABB half extents of the renderables.
    pub world_aabb_extent: &'a [Vec3],
    /// Renderable visibility masks.
    pub visible_mask: &'a mut [VisibleMask],
    /// Bounding spheres of the selected lights. Row 0 is the directional light.
    pub light_position_radius: &'a [Vec4],
    /// Directions of the selected lights.
    pub light_direction: &'a [Vec3],
}

/// Collects the shadow maps required by a frame.
pub trait ShadowMapManager: Send {
    /// Forgets every shadow map registered during the previous frame.
    fn reset(&mut self);

    /// Registers the cascaded shadow map of the directional light at `light_index`.
    fn set_shadow_cascades(&mut self, light_index: usize, options: &ShadowOptions);

    /// Registers a spot-light shadow map. Slots are assigned in call order.
    fn add_spot_shadow_map(&mut self, light_index: usize, options: &ShadowOptions);

    /// Culls shadow casters for every registered map and reports the techniques in use.
    fn update(&mut self, frame: &mut ShadowUpdate<'_>) -> ShadowTechnique;
}
