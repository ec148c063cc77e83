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

//! Frustum tests over padded columns.
//!
//! Both entry points process whole chunks of elements and only OR their result bit
//! into the output, so several passes (camera, shadow cameras) can share one mask
//! column. Inner loops are written without data-dependent branches.

use prism_core::limits::{LIGHT_PADDING, RENDERABLE_PADDING};
use prism_core::math::{Frustum, Vec3, Vec4};
use prism_core::renderer::VisibleMask;

/// Per-plane constants, hoisted out of the element loop.
struct PlaneSet {
    normal: [Vec3; 6],
    abs_normal: [Vec3; 6],
    distance: [f32; 6],
}

impl PlaneSet {
    fn new(frustum: &Frustum) -> Self {
        let mut set = Self {
            normal: [Vec3::ZERO; 6],
            abs_normal: [Vec3::ZERO; 6],
            distance: [0.0; 6],
        };
        for (i, p) in frustum.planes.iter().enumerate() {
            set.normal[i] = p.normal;
            set.abs_normal[i] = p.normal.abs();
            set.distance[i] = p.distance;
        }
        set
    }

    #[inline(always)]
    fn aabb_inside(&self, center: Vec3, extent: Vec3) -> bool {
        let mut outside = false;
        for i in 0..6 {
            let dist = self.normal[i].dot(center) + self.distance[i];
            let reach = self.abs_normal[i].dot(extent);
            outside |= dist > reach;
        }
        !outside
    }

    #[inline(always)]
    fn sphere_inside(&self, sphere: Vec4) -> bool {
        let center = sphere.truncate();
        let mut outside = false;
        for i in 0..6 {
            outside |= self.normal[i].dot(center) + self.distance[i] > sphere.w;
        }
        !outside
    }
}

/// Sets `bit` in `results[i]` for every box `centers[i] ± extents[i]` that intersects
/// the frustum.
///
/// `count` must be a multiple of 16 and every slice must hold at least `count`
/// entries. Bits of boxes outside the frustum are left as they were.
pub fn intersects_aabbs(
    results: &mut [VisibleMask],
    frustum: &Frustum,
    centers: &[Vec3],
    extents: &[Vec3],
    count: usize,
    bit: u32,
) {
    debug_assert_eq!(count % RENDERABLE_PADDING, 0, "culling count must be padded");
    let planes = PlaneSet::new(frustum);
    let chunks = results[..count]
        .chunks_exact_mut(RENDERABLE_PADDING)
        .zip(centers[..count].chunks_exact(RENDERABLE_PADDING))
        .zip(extents[..count].chunks_exact(RENDERABLE_PADDING));
    for ((out, c), e) in chunks {
        for i in 0..RENDERABLE_PADDING {
            out[i] |= VisibleMask::from(planes.aabb_inside(c[i], e[i])) << bit;
        }
    }
}

/// Sets `bit` in `results[i]` for every sphere `spheres[i]` (center, radius) that
/// intersects the frustum.
///
/// `count` must be a multiple of 4.
pub fn intersects_spheres(results: &mut [u8], frustum: &Frustum, spheres: &[Vec4], count: usize, bit: u32) {
    debug_assert_eq!(count % LIGHT_PADDING, 0, "culling count must be padded");
    let planes = PlaneSet::new(frustum);
    let chunks = results[..count]
        .chunks_exact_mut(LIGHT_PADDING)
        .zip(spheres[..count].chunks_exact(LIGHT_PADDING));
    for (out, s) in chunks {
        for i in 0..LIGHT_PADDING {
            out[i] |= u8::from(planes.sphere_inside(s[i])) << bit;
        }
    }
}
