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

//! Columnar storage of the lights of a scene.

use super::SwapRows;
use crate::range::round_up;
use prism_core::limits::{DIRECTIONAL_LIGHTS_COUNT, LIGHT_PADDING};
use prism_core::math::{Vec3, Vec4};
use prism_core::renderer::LightInstance;

/// One positional light, as pushed into a [`LightSoa`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightRow {
    /// The light-manager handle. `None` marks an invalid light.
    pub instance: Option<LightInstance>,
    /// World-space position.
    pub position: Vec3,
    /// Radius of influence.
    pub radius: f32,
    /// Normalized direction, meaningful for spot lights.
    pub direction: Vec3,
}

/// Structure-of-arrays storage of lights.
///
/// Row 0 is always reserved for the directional light, whose instance is `None` when
/// the scene has no sun. Columns are padded to a multiple of 4 rows.
#[derive(Debug, Clone)]
pub struct LightSoa {
    len: usize,
    position_radius: Vec<Vec4>,
    direction: Vec<Vec3>,
    light_instance: Vec<Option<LightInstance>>,
    visibility: Vec<u8>,
}

/// Simultaneous access to every column of a [`LightSoa`], with only the visibility
/// column writable. Slices span the padded length.
pub struct LightColumnsMut<'a> {
    /// Bounding spheres as `(position, radius)`.
    pub position_radius: &'a [Vec4],
    /// Directions.
    pub direction: &'a [Vec3],
    /// Light-manager handles.
    pub light_instance: &'a [Option<LightInstance>],
    /// Visibility flags, non-zero when visible.
    pub visibility: &'a mut [u8],
}

impl Default for LightSoa {
    fn default() -> Self {
        Self::new()
    }
}

impl LightSoa {
    /// Creates a store holding only an empty directional row.
    pub fn new() -> Self {
        let mut soa = Self {
            len: DIRECTIONAL_LIGHTS_COUNT,
            position_radius: Vec::new(),
            direction: Vec::new(),
            light_instance: Vec::new(),
            visibility: Vec::new(),
        };
        soa.resize_columns(round_up(DIRECTIONAL_LIGHTS_COUNT, LIGHT_PADDING));
        soa
    }

    /// Number of real rows, directional row included.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the store has no rows. The directional row is permanent, so
    /// this never holds for a store built by [`LightSoa::new`].
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of positional lights.
    #[inline]
    pub fn positional_len(&self) -> usize {
        self.len - DIRECTIONAL_LIGHTS_COUNT
    }

    /// Number of rows including padding, a multiple of 4.
    #[inline]
    pub fn padded_len(&self) -> usize {
        self.visibility.len()
    }

    /// Sets the directional light of row 0.
    pub fn set_directional(&mut self, instance: Option<LightInstance>, direction: Vec3) {
        self.light_instance[0] = instance;
        self.direction[0] = direction.normalize();
        self.position_radius[0] = Vec4::ZERO;
        self.visibility[0] = 1;
    }

    /// Appends a positional light.
    pub fn push(&mut self, row: LightRow) {
        if self.len == self.padded_len() {
            self.resize_columns(round_up(self.len + 1, LIGHT_PADDING));
        }
        let i = self.len;
        self.position_radius[i] = Vec4::from_vec3(row.position, row.radius);
        self.direction[i] = row.direction;
        self.light_instance[i] = row.instance;
        self.visibility[i] = 0;
        self.len += 1;
    }

    /// Shrinks the store to its first `len` rows. The directional row is always kept.
    pub fn truncate(&mut self, len: usize) {
        let len = len.max(DIRECTIONAL_LIGHTS_COUNT);
        if len >= self.len {
            return;
        }
        self.len = len;
        // Re-zero what becomes padding before dropping the tail.
        let padded = round_up(len, LIGHT_PADDING);
        for i in len..padded {
            self.position_radius[i] = Vec4::ZERO;
            self.direction[i] = Vec3::ZERO;
            self.light_instance[i] = None;
            self.visibility[i] = 0;
        }
        self.resize_columns(padded);
    }

    /// Removes every positional light, keeping the directional row.
    pub fn clear_positional(&mut self) {
        self.truncate(DIRECTIONAL_LIGHTS_COUNT);
    }

    fn resize_columns(&mut self, padded: usize) {
        self.position_radius.resize(padded, Vec4::ZERO);
        self.direction.resize(padded, Vec3::ZERO);
        self.light_instance.resize(padded, None);
        self.visibility.resize(padded, 0);
    }

    /// Bounding spheres, padded.
    #[inline]
    pub fn position_radius(&self) -> &[Vec4] {
        &self.position_radius
    }

    /// Directions, padded.
    #[inline]
    pub fn directions(&self) -> &[Vec3] {
        &self.direction
    }

    /// Light-manager handles, padded.
    #[inline]
    pub fn instances(&self) -> &[Option<LightInstance>] {
        &self.light_instance
    }

    /// Visibility flags, padded.
    #[inline]
    pub fn visibility(&self) -> &[u8] {
        &self.visibility
    }

    /// The directional light handle, if the scene has one.
    #[inline]
    pub fn directional(&self) -> Option<LightInstance> {
        self.light_instance[0]
    }

    /// Borrows all columns at once with the visibility column writable.
    pub fn columns_mut(&mut self) -> LightColumnsMut<'_> {
        LightColumnsMut {
            position_radius: &self.position_radius,
            direction: &self.direction,
            light_instance: &self.light_instance,
            visibility: &mut self.visibility,
        }
    }
}

impl SwapRows for LightSoa {
    fn swap_rows(&mut self, a: usize, b: usize) {
        self.position_radius.swap(a, b);
        self.direction.swap(a, b);
        self.light_instance.swap(a, b);
        self.visibility.swap(a, b);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn light(id: u32) -> LightRow {
        LightRow {
            instance: Some(LightInstance(id)),
            position: Vec3::new(id as f32, 0.0, 0.0),
            radius: 1.0,
            direction: Vec3::new(0.0, 0.0, -1.0),
        }
    }

    #[test]
    fn test_new_reserves_directional_row() {
        let soa = LightSoa::new();
        assert_eq!(soa.len(), 1);
        assert_eq!(soa.positional_len(), 0);
        assert_eq!(soa.padded_len(), 4);
        assert_eq!(soa.directional(), None);
    }

    #[test]
    fn test_push_and_truncate_keep_padding() {
        let mut soa = LightSoa::new();
        for id in 1..=5 {
            soa.push(light(id));
        }
        assert_eq!(soa.len(), 6);
        assert_eq!(soa.padded_len(), 8);
        soa.truncate(3);
        assert_eq!(soa.len(), 3);
        assert_eq!(soa.padded_len(), 4);
        assert_eq!(soa.instances()[3], None);
        soa.truncate(0);
        assert_eq!(soa.len(), 1);
        assert!(!soa.is_empty());
    }

    #[test]
    fn test_set_directional_normalizes() {
        let mut soa = LightSoa::new();
        soa.set_directional(Some(LightInstance(7)), Vec3::new(0.0, -2.0, 0.0));
        assert_eq!(soa.directional(), Some(LightInstance(7)));
        assert_eq!(soa.directions()[0], Vec3::new(0.0, -1.0, 0.0));
    }
}
