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

//! The scene contract consumed by frame preparation, and a simple in-memory scene.

use crate::range::Range;
use crate::soa::{LightRow, LightSoa, RenderableRow, RenderableSoa};
use prism_core::math::{Aabb, Mat4, Vec3};
use prism_core::renderer::{BufferHandle, CameraInfo, LightInstance, VisibilityState};

/// A scene as seen by the preparation pipeline.
///
/// The stores are borrowed exclusively for the duration of one frame preparation.
pub trait SceneProvider: Send {
    /// Rebuilds the columnar stores, applying `world_origin` to every object.
    ///
    /// `vsm` is set when the view renders variance shadow maps.
    fn prepare(&mut self, world_origin: &Mat4, vsm: bool);

    /// The renderable store.
    fn renderable_data(&self) -> &RenderableSoa;

    /// The light store.
    fn light_data(&self) -> &LightSoa;

    /// Borrows both stores mutably at once.
    fn data_mut(&mut self) -> (&mut RenderableSoa, &mut LightSoa);

    /// Uploads per-renderable uniforms of `range` into `buffer`.
    fn update_uniforms(&mut self, range: Range, buffer: BufferHandle);

    /// Uploads the selected positional lights into `buffer`.
    fn prepare_dynamic_lights(&mut self, camera: &CameraInfo, buffer: BufferHandle);
}

/// A renderable of a [`Scene`], in object space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneRenderable {
    /// Identifier reported back by picking.
    pub instance: u32,
    /// Object-space bounding box.
    pub local_aabb: Aabb,
    /// Object-to-world transform.
    pub transform: Mat4,
    /// Layer membership bits.
    pub layers: u8,
    /// Culling and shadow participation.
    pub visibility: VisibilityState,
}

/// A positional light of a [`Scene`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneLight {
    /// The light-manager handle.
    pub instance: LightInstance,
    /// World-space position.
    pub position: Vec3,
    /// Radius of influence.
    pub radius: f32,
    /// Direction, for spot lights.
    pub direction: Vec3,
}

/// An in-memory scene that rebuilds its stores from object lists on every `prepare`.
#[derive(Debug, Default)]
pub struct Scene {
    renderables: Vec<SceneRenderable>,
    lights: Vec<SceneLight>,
    sun: Option<(LightInstance, Vec3)>,
    renderable_data: RenderableSoa,
    light_data: LightSoa,
    last_uniform_update: Option<(Range, BufferHandle)>,
    dynamic_light_uploads: usize,
}

impl Scene {
    /// Creates an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a renderable.
    pub fn add_renderable(&mut self, renderable: SceneRenderable) {
        self.renderables.push(renderable);
    }

    /// Adds a positional light.
    pub fn add_light(&mut self, light: SceneLight) {
        self.lights.push(light);
    }

    /// Sets or removes the directional light.
    pub fn set_directional_light(&mut self, sun: Option<(LightInstance, Vec3)>) {
        self.sun = sun;
    }

    /// The renderables of the scene.
    pub fn renderables(&self) -> &[SceneRenderable] {
        &self.renderables
    }

    /// Mutable access to the renderables, e.g. to animate transforms.
    pub fn renderables_mut(&mut self) -> &mut [SceneRenderable] {
        &mut self.renderables
    }

    /// The last range uploaded through [`SceneProvider::update_uniforms`].
    pub fn last_uniform_update(&self) -> Option<(Range, BufferHandle)> {
        self.last_uniform_update
    }

    /// How many times dynamic lights were uploaded.
    pub fn dynamic_light_uploads(&self) -> usize {
        self.dynamic_light_uploads
    }
}

impl SceneProvider for Scene {
    fn prepare(&mut self, world_origin: &Mat4, vsm: bool) {
        log::trace!(
            "Scene: preparing {} renderables, {} lights (vsm: {vsm})",
            self.renderables.len(),
            self.lights.len()
        );

        self.renderable_data.clear();
        for r in &self.renderables {
            self.renderable_data.push(RenderableRow {
                instance: r.instance,
                world_aabb: r.local_aabb.transform(&(*world_origin * r.transform)),
                layers: r.layers,
                visibility: r.visibility,
            });
        }

        self.light_data.clear_positional();
        match self.sun {
            Some((instance, direction)) => self
                .light_data
                .set_directional(Some(instance), world_origin.transform_vector(direction)),
            None => self.light_data.set_directional(None, Vec3::new(0.0, -1.0, 0.0)),
        }
        for l in &self.lights {
            self.light_data.push(LightRow {
                instance: Some(l.instance),
                position: world_origin.transform_point(l.position),
                radius: l.radius,
                direction: world_origin.transform_vector(l.direction).normalize(),
            });
        }
    }

    fn renderable_data(&self) -> &RenderableSoa {
        &self.renderable_data
    }

    fn light_data(&self) -> &LightSoa {
        &self.light_data
    }

    fn data_mut(&mut self) -> (&mut RenderableSoa, &mut LightSoa) {
        (&mut self.renderable_data, &mut self.light_data)
    }

    fn update_uniforms(&mut self, range: Range, buffer: BufferHandle) {
        self.last_uniform_update = Some((range, buffer));
    }

    fn prepare_dynamic_lights(&mut self, _camera: &CameraInfo, _buffer: BufferHandle) {
        self.dynamic_light_uploads += 1;
    }
}
