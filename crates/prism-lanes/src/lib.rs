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

//! # Prism Lanes
//!
//! Hot-path stages of frame preparation. Each lane is stateless between frames and
//! operates on the columnar stores of `prism-data`:
//!
//! - [`RenderableCullingLane`]: frustum culling and visibility mask composition.
//! - [`LightSelectionLane`]: light culling, filtering, distance sort and truncation.
//! - [`ShadowCasterLane`]: shadow-caster classification and the renderable partition.

#![warn(missing_docs)]

pub mod culling_lane;
pub mod light_lane;
pub mod shadow_lane;

pub use culling_lane::RenderableCullingLane;
pub use light_lane::{LightSelection, LightSelectionLane};
pub use shadow_lane::{ShadowCasterLane, ShadowCasters, VisibilityBuckets, VisibilityRanges};
