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

//! # Prism Data
//!
//! Columnar (structure-of-arrays) storage for the renderables and lights of a scene,
//! together with the row-level primitives frame preparation needs: half-open index
//! ranges, an in-place row partition and permutation by row swaps.
//!
//! Every store keeps its columns padded to a fixed row multiple so that vectorized
//! loops can always run over whole chunks without bounds checks on the tail.

#![warn(missing_docs)]

pub mod range;
pub mod scene;
pub mod soa;

pub use range::{round_up, Range};
pub use scene::{Scene, SceneLight, SceneProvider, SceneRenderable};
pub use soa::{
    partition_rows, permute_rows, LightColumnsMut, LightRow, LightSoa, RenderableColumnsMut,
    RenderableRow, RenderableSoa, SwapRows,
};
