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

//! Columnar storage of the renderables of a scene.

use super::SwapRows;
use crate::range::round_up;
use prism_core::limits::RENDERABLE_PADDING;
use prism_core::math::{Aabb, Vec3};
use prism_core::renderer::{VisibilityState, VisibleMask};

/// One renderable, as pushed into a [`RenderableSoa`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderableRow {
    /// Identifier of the renderable, reported back by picking.
    pub instance: u32,
    /// World-space bounding box.
    pub world_aabb: Aabb,
    /// Layer membership bits.
    pub layers: u8,
    /// Culling and shadow participation.
    pub visibility: VisibilityState,
}

/// Structure-of-arrays storage of renderables.
///
/// Every column holds `padded_len()` entries, a multiple of 16. Padding rows are
/// zero-filled: their layer mask is empty, so they never become visible.
#[derive(Debug, Default, Clone)]
pub struct RenderableSoa {
    len: usize,
    instance: Vec<u32>,
    world_aabb_center: Vec<Vec3>,
    world_aabb_extent: Vec<Vec3>,
    layers: Vec<u8>,
    visibility: Vec<VisibilityState>,
    visible_mask: Vec<VisibleMask>,
}

/// Simultaneous access to every column of a [`RenderableSoa`], with only the visibility
/// mask writable. Slices span the padded length.
pub struct RenderableColumnsMut<'a> {
    /// Renderable identifiers.
    pub instance: &'a [u32],
    /// World-space AABB centers.
    pub world_aabb_center: &'a [Vec3],
    /// World-space AABB half extents.
    pub world_aabb_extent: &'a [Vec3],
    /// Layer membership bits.
    pub layers: &'a [u8],
    /// Culling and shadow participation.
    pub visibility: &'a [VisibilityState],
    /// Output visibility bits.
    pub visible_mask: &'a mut [VisibleMask],
}

impl RenderableSoa {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store with room for `capacity` rows.
    pub fn with_capacity(capacity: usize) -> Self {
        let padded = round_up(capacity, RENDERABLE_PADDING);
        Self {
            len: 0,
            instance: Vec::with_capacity(padded),
            world_aabb_center: Vec::with_capacity(padded),
            world_aabb_extent: Vec::with_capacity(padded),
            layers: Vec::with_capacity(padded),
            visibility: Vec::with_capacity(padded),
            visible_mask: Vec::with_capacity(padded),
        }
    }

    /// Number of real rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the store holds no rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of rows including padding, a multiple of 16.
    #[inline]
    pub fn padded_len(&self) -> usize {
        self.visible_mask.len()
    }

    /// Appends a row.
    pub fn push(&mut self, row: RenderableRow) {
        if self.len == self.padded_len() {
            self.resize_columns(round_up(self.len + 1, RENDERABLE_PADDING));
        }
        let i = self.len;
        self.instance[i] = row.instance;
        self.world_aabb_center[i] = row.world_aabb.center();
        self.world_aabb_extent[i] = row.world_aabb.half_extents();
        self.layers[i] = row.layers;
        self.visibility[i] = row.visibility;
        self.visible_mask[i] = 0;
        self.len += 1;
    }

    /// Removes every row, keeping the allocation.
    pub fn clear(&mut self) {
        self.len = 0;
        self.resize_columns(0);
    }

    fn resize_columns(&mut self, padded: usize) {
        self.instance.resize(padded, 0);
        self.world_aabb_center.resize(padded, Vec3::ZERO);
        self.world_aabb_extent.resize(padded, Vec3::ZERO);
        self.layers.resize(padded, 0);
        self.visibility.resize(padded, VisibilityState::default());
        self.visible_mask.resize(padded, 0);
    }

    /// Renderable identifiers, padded.
    #[inline]
    pub fn instances(&self) -> &[u32] {
        &self.instance
    }

    /// World-space AABB centers, padded.
    #[inline]
    pub fn world_aabb_centers(&self) -> &[Vec3] {
        &self.world_aabb_center
    }

    /// World-space AABB half extents, padded.
    #[inline]
    pub fn world_aabb_extents(&self) -> &[Vec3] {
        &self.world_aabb_extent
    }

    /// Layer bits, padded.
    #[inline]
    pub fn layers(&self) -> &[u8] {
        &self.layers
    }

    /// Visibility configuration, padded.
    #[inline]
    pub fn visibility(&self) -> &[VisibilityState] {
        &self.visibility
    }

    /// Visibility masks, padded.
    #[inline]
    pub fn visible_masks(&self) -> &[VisibleMask] {
        &self.visible_mask
    }

    /// Writable visibility masks, padded.
    #[inline]
    pub fn visible_masks_mut(&mut self) -> &mut [VisibleMask] {
        &mut self.visible_mask
    }

    /// Borrows all columns at once with the mask column writable.
    pub fn columns_mut(&mut self) -> RenderableColumnsMut<'_> {
        RenderableColumnsMut {
            instance: &self.instance,
            world_aabb_center: &self.world_aabb_center,
            world_aabb_extent: &self.world_aabb_extent,
            layers: &self.layers,
            visibility: &self.visibility,
            visible_mask: &mut self.visible_mask,
        }
    }
}

impl SwapRows for RenderableSoa {
    fn swap_rows(&mut self, a: usize, b: usize) {
        self.instance.swap(a, b);
        self.world_aabb_center.swap(a, b);
        self.world_aabb_extent.swap(a, b);
        self.layers.swap(a, b);
        self.visibility.swap(a, b);
        self.visible_mask.swap(a, b);
    }
}
