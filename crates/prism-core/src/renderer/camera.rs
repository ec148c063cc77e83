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

//! Camera data consumed by frame preparation.

use crate::math::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// A rectangular region of the render target, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    /// Left edge.
    pub left: i32,
    /// Bottom edge.
    pub bottom: i32,
    /// Width in pixels. Must be positive.
    pub width: u32,
    /// Height in pixels. Must be positive.
    pub height: u32,
}

impl Viewport {
    /// Creates a viewport anchored at the origin.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            left: 0,
            bottom: 0,
            width,
            height,
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

/// The state of a camera as handed over by the scene graph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraSnapshot {
    /// Projection used for rendering.
    pub projection: Mat4,
    /// Projection used for culling. Usually the same as `projection` with a closer far plane.
    pub culling_projection: Mat4,
    /// Camera-to-world transform.
    pub model: Mat4,
    /// Near plane distance.
    pub near: f32,
    /// Far plane distance.
    pub far: f32,
    /// Exposure value at ISO 100.
    pub ev100: f32,
}

impl CameraSnapshot {
    /// A camera looking down `-Z` from `position` with a symmetric perspective projection.
    pub fn perspective(position: Vec3, fov_y_radians: f32, aspect: f32, near: f32, far: f32) -> Self {
        let projection = Mat4::perspective_rh_zo(fov_y_radians, aspect, near, far);
        Self {
            projection,
            culling_projection: projection,
            model: Mat4::from_translation(position),
            near,
            far,
            ev100: 0.0,
        }
    }

    /// World-space position of the camera.
    #[inline]
    pub fn position(&self) -> Vec3 {
        self.model.translation()
    }
}

/// Per-frame camera parameters, expressed relative to the world origin of the frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraInfo {
    /// Projection used for rendering.
    pub projection: Mat4,
    /// Camera-to-world transform with the world origin applied.
    pub model: Mat4,
    /// World-to-camera transform, inverse of `model`.
    pub view: Mat4,
    /// Transform applied to every object of the scene this frame.
    pub world_origin: Mat4,
    /// Near plane distance.
    pub near: f32,
    /// Far plane distance.
    pub far: f32,
    /// Exposure value at ISO 100.
    pub ev100: f32,
    /// World-space position of the camera, before the world origin is applied.
    pub position: Vec3,
}

impl CameraInfo {
    /// Derives the frame camera from a snapshot and a world origin transform.
    pub fn new(camera: &CameraSnapshot, world_origin: &Mat4) -> Self {
        let model = *world_origin * camera.model;
        let view = model.affine_inverse().unwrap_or_else(|| {
            log::warn!("CameraInfo: camera transform is not invertible, using identity view");
            Mat4::IDENTITY
        });
        Self {
            projection: camera.projection,
            model,
            view,
            world_origin: *world_origin,
            near: camera.near,
            far: camera.far,
            ev100: camera.ev100,
            position: camera.position(),
        }
    }

    /// Distance of `p` along the camera's forward axis. The camera looks down `-Z`.
    #[inline]
    pub fn forward_distance(&self, p: Vec3) -> f32 {
        -self.view.transform_point(p).z
    }

    /// Photometric exposure derived from `ev100`.
    #[inline]
    pub fn exposure(&self) -> f32 {
        1.0 / (1.2 * 2.0_f32.powf(self.ev100))
    }
}

impl Default for CameraInfo {
    fn default() -> Self {
        Self::new(
            &CameraSnapshot::perspective(Vec3::ZERO, crate::math::FRAC_PI_2, 1.0, 0.1, 100.0),
            &Mat4::IDENTITY,
        )
    }
}
