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

//! Uniform buffers owned by a view.

use prism_core::limits::{MAX_SHADOW_CASCADES, MAX_SHADOW_CASTING_SPOTS};
use prism_core::renderer::{BufferAllocator, BufferBinding, BufferHandle, BufferUsage};
use prism_core::SceneLimits;

/// Size of one renderable row in the renderable uniform buffer.
pub const RENDERABLE_UNIFORM_SIZE: usize = 256;
/// Size of one light in the light uniform buffer.
pub const LIGHT_UNIFORM_SIZE: usize = 64;
/// Size of one shadow map entry in the shadow uniform buffer.
pub const SHADOW_UNIFORM_SIZE: usize = 128;

const MIN_RENDERABLE_ROWS: usize = 16;

/// Row capacity allocated when `count` rows no longer fit.
pub fn grown_capacity(count: usize) -> usize {
    MIN_RENDERABLE_ROWS.max((4 * count + 2) / 3)
}

/// The renderable, light and shadow uniform buffers of a view.
#[derive(Debug)]
pub struct ViewUniforms {
    renderables: Option<BufferHandle>,
    renderable_capacity: usize,
    lights: BufferHandle,
    shadows: BufferHandle,
}

impl ViewUniforms {
    /// Creates the light and shadow buffers. The renderable buffer is created on demand.
    pub fn new(allocator: &mut dyn BufferAllocator, limits: &SceneLimits) -> Self {
        let lights = allocator.create_buffer(
            limits.max_lights * LIGHT_UNIFORM_SIZE,
            BufferBinding::Uniform,
            BufferUsage::Dynamic,
        );
        let shadow_maps = MAX_SHADOW_CASTING_SPOTS + usize::from(MAX_SHADOW_CASCADES);
        let shadows = allocator.create_buffer(
            shadow_maps * SHADOW_UNIFORM_SIZE,
            BufferBinding::Uniform,
            BufferUsage::Dynamic,
        );
        Self {
            renderables: None,
            renderable_capacity: 0,
            lights,
            shadows,
        }
    }

    /// Makes room for `count` renderable rows. Returns the buffer and whether it was
    /// reallocated. Never shrinks.
    pub fn reserve_renderables(
        &mut self,
        allocator: &mut dyn BufferAllocator,
        count: usize,
    ) -> (BufferHandle, bool) {
        if let Some(handle) = self.renderables {
            if count <= self.renderable_capacity {
                return (handle, false);
            }
            allocator.destroy_buffer(handle);
        }

        let capacity = grown_capacity(count);
        let handle = allocator.create_buffer(
            capacity * RENDERABLE_UNIFORM_SIZE,
            BufferBinding::Uniform,
            BufferUsage::Stream,
        );
        log::debug!(
            "ViewUniforms: renderable buffer grown to {} rows ({} requested)",
            capacity,
            count
        );
        self.renderables = Some(handle);
        self.renderable_capacity = capacity;
        (handle, true)
    }

    /// Rows available in the renderable buffer.
    pub fn renderable_capacity(&self) -> usize {
        self.renderable_capacity
    }

    /// The renderable buffer, once created.
    pub fn renderables(&self) -> Option<BufferHandle> {
        self.renderables
    }

    /// The light buffer.
    pub fn lights(&self) -> BufferHandle {
        self.lights
    }

    /// The shadow buffer.
    pub fn shadows(&self) -> BufferHandle {
        self.shadows
    }

    /// Destroys every buffer.
    pub fn destroy(self, allocator: &mut dyn BufferAllocator) {
        if let Some(handle) = self.renderables {
            allocator.destroy_buffer(handle);
        }
        allocator.destroy_buffer(self.lights);
        allocator.destroy_buffer(self.shadows);
    }
}
