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

//! Uniform buffer allocation contract.

/// An opaque handle to a GPU buffer object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub u64);

/// Where a buffer is bound in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferBinding {
    /// Uniform buffer.
    Uniform,
    /// Shader storage buffer.
    Storage,
}

/// Expected update frequency of a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferUsage {
    /// Written once.
    Static,
    /// Written occasionally.
    Dynamic,
    /// Rewritten every frame.
    Stream,
}

/// Creates and destroys buffer objects on behalf of the pipeline.
///
/// Allocation failures are handled by the implementor; the pipeline always receives a
/// handle.
pub trait BufferAllocator {
    /// Creates a buffer of `size` bytes.
    fn create_buffer(&mut self, size: usize, binding: BufferBinding, usage: BufferUsage)
        -> BufferHandle;

    /// Destroys a buffer previously returned by [`BufferAllocator::create_buffer`].
    fn destroy_buffer(&mut self, handle: BufferHandle);

    /// Whether the backend can measure GPU frame times. Dynamic resolution needs it.
    fn is_frame_time_supported(&self) -> bool;
}
