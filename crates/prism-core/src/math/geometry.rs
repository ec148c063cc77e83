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

//! Bounding volumes attached to renderables and lights.

use super::{matrix::Mat4, vector::Vec3};
use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box defined by its minimum and maximum corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// The corner with the smallest coordinates.
    pub min: Vec3,
    /// The corner with the largest coordinates.
    pub max: Vec3,
}

impl Aabb {
    /// An empty box, suitable as the identity for [`Aabb::merge`].
    pub const INVALID: Self = Self {
        min: Vec3::new(f32::MAX, f32::MAX, f32::MAX),
        max: Vec3::new(f32::MIN, f32::MIN, f32::MIN),
    };

    /// Creates a box from two corners, ordering the components so `min <= max`.
    #[inline]
    pub fn from_min_max(min_pt: Vec3, max_pt: Vec3) -> Self {
        Self {
            min: min_pt.min(max_pt),
            max: min_pt.max(max_pt),
        }
    }

    /// Creates a box from its center and half extents. Negative extents are mirrored.
    #[inline]
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        let h = half_extents.abs();
        Self {
            min: center - h,
            max: center + h,
        }
    }

    /// Returns the center point of the box.
    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Returns half the size of the box along each axis.
    #[inline]
    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Returns `true` when `min <= max` on every axis.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y && self.min.z <= self.max.z
    }

    /// Returns the smallest box enclosing both `self` and `other`.
    #[inline]
    pub fn merge(&self, other: &Aabb) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Transforms the box by an affine matrix and returns the enclosing axis-aligned box.
    pub fn transform(&self, m: &Mat4) -> Self {
        let center = m.transform_point(self.center());
        let h = self.half_extents();
        let ext = Vec3::new(
            m.cols[0].x.abs() * h.x + m.cols[1].x.abs() * h.y + m.cols[2].x.abs() * h.z,
            m.cols[0].y.abs() * h.x + m.cols[1].y.abs() * h.y + m.cols[2].y.abs() * h.z,
            m.cols[0].z.abs() * h.x + m.cols[1].z.abs() * h.y + m.cols[2].z.abs() * h.z,
        );
        Self::from_center_half_extents(center, ext)
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::INVALID
    }
}
