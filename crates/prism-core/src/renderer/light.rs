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

//! Light instances and the light-manager contract.

use serde::{Deserialize, Serialize};

/// An opaque handle to a light owned by the light manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LightInstance(pub u32);

/// Shadow-map configuration of a single light.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowOptions {
    /// Edge size of the shadow map, in texels.
    pub map_size: u32,
    /// Number of cascades. Only meaningful for directional lights, `1..=4`.
    pub shadow_cascades: u8,
    /// Constant depth bias, in world units.
    pub constant_bias: f32,
    /// Bias along the surface normal, in texels.
    pub normal_bias: f32,
    /// Distance from the camera beyond which no shadow is cast. `0` means the far plane.
    pub shadow_far: f32,
}

impl Default for ShadowOptions {
    fn default() -> Self {
        Self {
            map_size: 1024,
            shadow_cascades: 1,
            constant_bias: 0.001,
            normal_bias: 1.0,
            shadow_far: 0.0,
        }
    }
}

/// Read-only access to per-light parameters.
///
/// Queried from the light-selection job, hence `Sync`.
pub trait LightManager: Send + Sync {
    /// Whether the light contributes illumination at all.
    fn is_light_caster(&self, light: LightInstance) -> bool;

    /// The light's intensity. Lights with a non-positive intensity are dropped.
    fn intensity(&self, light: LightInstance) -> f32;

    /// Whether the light is a spot light.
    fn is_spot_light(&self, light: LightInstance) -> bool;

    /// Squared cosine of the spot light's outer half-angle.
    fn cos_outer_squared(&self, light: LightInstance) -> f32;

    /// Whether the light casts shadows.
    fn is_shadow_caster(&self, light: LightInstance) -> bool;

    /// The light's shadow configuration.
    fn shadow_options(&self, light: LightInstance) -> &ShadowOptions;
}
