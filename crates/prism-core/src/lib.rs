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

//! # Prism Core
//!
//! Foundational crate containing math primitives, the per-renderable visibility
//! bit layout, and the interface contracts of every collaborator the scene
//! preparation pipeline talks to (light manager, shadow maps, buffer allocation,
//! pixel readback, scene storage).

#![warn(missing_docs)]

pub mod lane;
pub mod limits;
pub mod math;
pub mod renderer;

pub use lane::{Lane, LaneKind};
pub use limits::SceneLimits;
