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

//! The view agent: per-view state and the per-frame preparation sequence.
//!
//! A frame runs in this order:
//!
//! 1. Camera and world origin setup, scene preparation.
//! 2. Renderable culling and light selection, as two jobs joined before going on.
//! 3. Shadow-caster classification and the shadow-map manager update.
//! 4. Visibility mask composition and the renderable partition.
//! 5. Renderable uniform sizing and upload, then dynamic light preparation.
//!
//! Steps 3 to 5 run on the calling thread; they mutate the stores in place.

mod agent;
mod picking;
mod uniforms;

pub use agent::ViewAgent;
pub use picking::{PickingCallback, PickingQueue};
pub use uniforms::{
    grown_capacity, ViewUniforms, LIGHT_UNIFORM_SIZE, RENDERABLE_UNIFORM_SIZE, SHADOW_UNIFORM_SIZE,
};

use prism_control::ConfigError;
use prism_core::renderer::ShadowType;
use prism_core::SceneLimits;
use prism_lanes::VisibilityRanges;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned by [`ViewAgent`].
#[derive(Debug, Error)]
pub enum PrepareError {
    /// `prepare` was called before a scene was attached.
    #[error("No scene attached to the view")]
    NoScene,
    /// The worker pool could not be started.
    #[error("Failed to start the job system: {0}")]
    JobSystem(#[from] rayon::ThreadPoolBuildError),
}

/// Static configuration of a view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Runs the camera frustum test. When off, every renderable is visible.
    pub frustum_culling_enabled: bool,
    /// Classifies shadow casters and updates the shadow-map manager.
    pub shadowing_enabled: bool,
    /// Shadow filtering; [`ShadowType::Vsm`] widens the caster predicate.
    pub shadow_type: ShadowType,
    /// Layers rendered by this view.
    pub visible_layers: u8,
    /// Re-centers the world on the camera.
    pub camera_at_origin: bool,
    /// Light and shadow capacities.
    pub limits: SceneLimits,
    /// Worker count of the job system, `0` for one per core.
    pub worker_threads: usize,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            frustum_culling_enabled: true,
            shadowing_enabled: true,
            shadow_type: ShadowType::Pcf,
            visible_layers: 0x1,
            camera_at_origin: true,
            limits: SceneLimits::default(),
            worker_threads: 0,
        }
    }
}

impl ViewConfig {
    /// Parses a configuration from RON, e.g. `(shadow_type: Vsm, visible_layers: 3)`.
    pub fn from_ron_str(document: &str) -> Result<Self, ConfigError> {
        prism_control::from_ron_str(document)
    }
}

/// What a `prepare` call did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PrepareStats {
    /// Positional lights that passed culling and filtering.
    pub visible_lights: usize,
    /// Positional lights dropped for capacity.
    pub dropped_lights: usize,
    /// Spot lights with a shadow map this frame.
    pub shadow_casting_spots: usize,
    /// Whether the directional light casts shadows this frame.
    pub directional_shadow: bool,
    /// Renderable ranges after the partition.
    pub ranges: VisibilityRanges,
    /// Whether the renderable uniform buffer was reallocated.
    pub renderable_buffer_reallocated: bool,
}
