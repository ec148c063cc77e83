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

//! # Lane Abstraction
//!
//! A **Lane** is one self-contained stage of frame preparation, owned and sequenced
//! by an agent. Every lane shares this small base trait for identity. The execution
//! entry point is lane-specific, since each stage borrows a different subset of the
//! scene's columnar stores:
//!
//! - `RenderableCullingLane`: frustum culling and visibility mask composition
//! - `LightSelectionLane`: light culling, filtering, sorting and truncation
//! - `ShadowCasterLane`: shadow-caster classification and renderable partitioning
//!
//! Lanes hold configuration only. They never keep per-frame state between calls.

use std::fmt;

/// Classification of lane types, used for logging and statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LaneKind {
    /// Renderable frustum culling and mask composition.
    Culling,
    /// Light selection.
    Lighting,
    /// Shadow-caster classification and partitioning.
    Shadow,
}

impl fmt::Display for LaneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaneKind::Culling => write!(f, "Culling"),
            LaneKind::Lighting => write!(f, "Lighting"),
            LaneKind::Shadow => write!(f, "Shadow"),
        }
    }
}

/// The base trait shared by every lane.
pub trait Lane: Send + Sync {
    /// Human-readable name identifying this lane's strategy.
    fn strategy_name(&self) -> &'static str;

    /// The kind of processing this lane performs.
    fn lane_kind(&self) -> LaneKind;
}
