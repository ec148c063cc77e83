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

//! Capacity limits of the scene-preparation pipeline.

use serde::{Deserialize, Serialize};

/// Default number of positional lights kept after light selection.
pub const DEFAULT_MAX_LIGHTS: usize = 256;

/// Number of spot-shadow slots in a renderable visibility mask.
pub const MAX_SHADOW_CASTING_SPOTS: usize = 14;

/// Maximum number of cascades for the directional shadow map.
pub const MAX_SHADOW_CASCADES: u8 = 4;

/// Number of directional light rows at the front of the light store.
pub const DIRECTIONAL_LIGHTS_COUNT: usize = 1;

/// Row padding of the renderable store.
pub const RENDERABLE_PADDING: usize = 16;

/// Padding of the light store and of the light distance scratch buffer.
pub const LIGHT_PADDING: usize = 4;

/// Capacity limits applied during light selection and shadow classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneLimits {
    /// Maximum number of positional lights kept after selection.
    pub max_lights: usize,
    /// Maximum number of shadow-casting spot lights, at most [`MAX_SHADOW_CASTING_SPOTS`].
    pub max_shadow_casting_spots: usize,
}

impl Default for SceneLimits {
    fn default() -> Self {
        Self {
            max_lights: DEFAULT_MAX_LIGHTS,
            max_shadow_casting_spots: MAX_SHADOW_CASTING_SPOTS,
        }
    }
}

impl SceneLimits {
    /// Total number of light rows, including the directional row, that survive selection.
    #[inline]
    pub fn max_light_rows(&self) -> usize {
        DIRECTIONAL_LIGHTS_COUNT + self.max_lights
    }
}
