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

//! Backend-agnostic contracts between the scene-preparation pipeline and the rest of
//! the renderer.
//!
//! The pipeline never talks to a GPU API directly. Everything it consumes from the
//! outside world (light parameters, shadow-map bookkeeping, buffer allocation, pixel
//! readback) goes through the traits defined here, so that lanes and agents can be
//! driven by a real backend or by test doubles alike.

pub mod buffer;
pub mod camera;
pub mod light;
pub mod picking;
pub mod shadow;
pub mod visibility;

pub use self::buffer::{BufferAllocator, BufferBinding, BufferHandle, BufferUsage};
pub use self::camera::{CameraInfo, CameraSnapshot, Viewport};
pub use self::light::{LightInstance, LightManager, ShadowOptions};
pub use self::picking::{PickingQueryResult, PixelReadback, PixelReadout, ReadbackCompletion};
pub use self::shadow::{ShadowMapManager, ShadowTechnique, ShadowType, ShadowUpdate};
pub use self::visibility::{VisibilityState, VisibleMask};
