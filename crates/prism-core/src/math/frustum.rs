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

//! Frustum planes extracted from a view-projection matrix.
//!
//! Planes are stored with unit-length normals pointing *out* of the visible
//! volume: a point `p` lies outside plane `(n, d)` when `dot(n, p) + d > 0`.

use super::{matrix::Mat4, vector::Vec3, vector::Vec4};
use serde::{Deserialize, Serialize};

/// A plane `dot(normal, p) + distance = 0`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    /// Unit normal, pointing out of the frustum.
    pub normal: Vec3,
    /// Signed distance term.
    pub distance: f32,
}

impl Plane {
    /// Builds a plane from unnormalized coefficients `(a, b, c, d)`.
    ///
    /// Degenerate coefficients yield a plane with a null normal, which never rejects.
    pub fn from_coefficients(v: Vec4) -> Self {
        let n = v.truncate();
        let len = n.length();
        if len > 0.0 {
            Self {
                normal: n / len,
                distance: v.w / len,
            }
        } else {
            Self {
                normal: Vec3::ZERO,
                distance: 0.0,
            }
        }
    }

    /// Signed distance from the plane to `p`; positive values are outside.
    #[inline]
    pub fn signed_distance(&self, p: Vec3) -> f32 {
        self.normal.dot(p) + self.distance
    }
}

/// Index of each plane inside [`Frustum::planes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum FrustumPlane {
    /// `x = -w`
    Left = 0,
    /// `x = w`
    Right,
    /// `y = -w`
    Bottom,
    /// `y = w`
    Top,
    /// `z = 0`
    Near,
    /// `z = w`
    Far,
}

/// The six planes bounding a camera's visible volume.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frustum {
    /// Planes in [`FrustumPlane`] order.
    pub planes: [Plane; 6],
}

impl Frustum {
    /// Extracts the planes of a right-handed view-projection matrix with `[0, 1]` depth.
    pub fn from_view_projection(m: &Mat4) -> Self {
        let r0 = m.get_row(0);
        let r1 = m.get_row(1);
        let r2 = m.get_row(2);
        let r3 = m.get_row(3);

        // Inward-facing half-spaces, negated below.
        let inward = [r3 + r0, r3 - r0, r3 + r1, r3 - r1, r2, r3 - r2];
        let mut planes = [Plane::default(); 6];
        for (plane, coefficients) in planes.iter_mut().zip(inward) {
            *plane = Plane::from_coefficients(-coefficients);
        }
        Self { planes }
    }

    /// Returns a single plane.
    #[inline]
    pub fn plane(&self, which: FrustumPlane) -> &Plane {
        &self.planes[which as usize]
    }

    /// Returns `true` if the sphere is not entirely outside any plane.
    #[inline]
    pub fn intersects_sphere(&self, center: Vec3, radius: f32) -> bool {
        self.planes
            .iter()
            .all(|p| p.signed_distance(center) <= radius)
    }

    /// Returns `true` if the box `center ± extent` is not entirely outside any plane.
    #[inline]
    pub fn intersects_aabb(&self, center: Vec3, extent: Vec3) -> bool {
        self.planes
            .iter()
            .all(|p| p.signed_distance(center) <= p.normal.abs().dot(extent))
    }
}
