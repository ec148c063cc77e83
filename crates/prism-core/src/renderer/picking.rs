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

//! Pixel readback contract used by picking queries.

use crate::math::Vec3;

/// The raw content of a picked pixel.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct PixelReadout {
    /// Identifier of the renderable covering the pixel, `0` for none.
    pub renderable: u32,
    /// Depth buffer value at the pixel, in `[0, 1]`.
    pub depth: f32,
}

/// The result delivered to a picking callback.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct PickingQueryResult {
    /// Identifier of the renderable covering the pixel, `0` for none.
    pub renderable: u32,
    /// Depth buffer value at the pixel.
    pub depth: f32,
    /// Requested `(x, y)` in viewport pixels and `1 - depth`.
    pub frag_coords: Vec3,
}

/// Invoked by the backend once a readback is complete. May be called from any thread.
pub type ReadbackCompletion = Box<dyn FnOnce(PixelReadout) + Send>;

/// Asynchronous single-pixel readback from the structure buffer.
pub trait PixelReadback {
    /// Schedules a read of pixel `(x, y)`. `completion` is invoked exactly once.
    fn read_pixels(&mut self, x: u32, y: u32, completion: ReadbackCompletion);
}
