//! Mock collaborators shared by the agent integration tests.

#![allow(dead_code)]

use prism_core::math::{Aabb, FRAC_PI_2, Mat4, Vec3};
use prism_core::renderer::visibility::{
    visible_spot_shadow_renderable_n, VISIBLE_DIR_SHADOW_RENDERABLE,
};
use prism_core::renderer::{
    BufferAllocator, BufferBinding, BufferHandle, BufferUsage, CameraInfo, CameraSnapshot,
    LightInstance, LightManager, ShadowMapManager, ShadowOptions, ShadowTechnique, ShadowUpdate,
    VisibilityState,
};
use prism_data::{LightSoa, Range, RenderableSoa, Scene, SceneProvider, SceneRenderable};
use std::sync::{Arc, Mutex};

// ── Buffers ──

pub struct MockAllocator {
    next: u64,
    pub live: Vec<(BufferHandle, usize)>,
    pub created: usize,
    pub frame_time_supported: bool,
}

impl MockAllocator {
    pub fn new() -> Self {
        Self {
            next: 0,
            live: Vec::new(),
            created: 0,
            frame_time_supported: true,
        }
    }
}

impl BufferAllocator for MockAllocator {
    fn create_buffer(&mut self, size: usize, _: BufferBinding, _: BufferUsage) -> BufferHandle {
        self.next += 1;
        self.created += 1;
        let handle = BufferHandle(self.next);
        self.live.push((handle, size));
        handle
    }

    fn destroy_buffer(&mut self, handle: BufferHandle) {
        let before = self.live.len();
        self.live.retain(|(h, _)| *h != handle);
        assert_eq!(before, self.live.len() + 1, "destroyed unknown buffer {handle:?}");
    }

    fn is_frame_time_supported(&self) -> bool {
        self.frame_time_supported
    }
}

// ── Lights ──

#[derive(Debug, Clone)]
pub struct MockLight {
    pub caster: bool,
    pub intensity: f32,
    pub spot: bool,
    pub cos_outer_squared: f32,
    pub shadow_caster: bool,
}

impl Default for MockLight {
    fn default() -> Self {
        Self {
            caster: true,
            intensity: 100.0,
            spot: false,
            cos_outer_squared: 0.5,
            shadow_caster: false,
        }
    }
}

#[derive(Default)]
pub struct MockLightManager {
    pub lights: Vec<MockLight>,
    pub options: ShadowOptions,
}

impl MockLightManager {
    pub fn add(&mut self, light: MockLight) -> LightInstance {
        self.lights.push(light);
        LightInstance(self.lights.len() as u32 - 1)
    }
}

impl LightManager for MockLightManager {
    fn is_light_caster(&self, li: LightInstance) -> bool {
        self.lights[li.0 as usize].caster
    }
    fn intensity(&self, li: LightInstance) -> f32 {
        self.lights[li.0 as usize].intensity
    }
    fn is_spot_light(&self, li: LightInstance) -> bool {
        self.lights[li.0 as usize].spot
    }
    fn cos_outer_squared(&self, li: LightInstance) -> f32 {
        self.lights[li.0 as usize].cos_outer_squared
    }
    fn is_shadow_caster(&self, li: LightInstance) -> bool {
        self.lights[li.0 as usize].shadow_caster
    }
    fn shadow_options(&self, _li: LightInstance) -> &ShadowOptions {
        &self.options
    }
}

// ── Shadows ──

#[derive(Debug, Default)]
pub struct ShadowLog {
    pub resets: usize,
    pub cascades: Vec<usize>,
    pub spots: Vec<usize>,
    pub updates: usize,
}

/// Marks renderables below y = 0 as directional casters and renderables left of x = 0 as
/// casters for every registered spot map.
pub struct MockShadowMaps {
    pub log: Arc<Mutex<ShadowLog>>,
    pub technique: ShadowTechnique,
    directional: bool,
    spots: usize,
}

impl MockShadowMaps {
    pub fn new(technique: ShadowTechnique) -> (Self, Arc<Mutex<ShadowLog>>) {
        let log = Arc::new(Mutex::new(ShadowLog::default()));
        (
            Self {
                log: log.clone(),
                technique,
                directional: false,
                spots: 0,
            },
            log,
        )
    }
}

impl ShadowMapManager for MockShadowMaps {
    fn reset(&mut self) {
        self.directional = false;
        self.spots = 0;
        self.log.lock().unwrap().resets += 1;
    }

    fn set_shadow_cascades(&mut self, light_index: usize, _options: &ShadowOptions) {
        self.directional = true;
        self.log.lock().unwrap().cascades.push(light_index);
    }

    fn add_spot_shadow_map(&mut self, light_index: usize, _options: &ShadowOptions) {
        self.spots += 1;
        self.log.lock().unwrap().spots.push(light_index);
    }

    fn update(&mut self, frame: &mut ShadowUpdate<'_>) -> ShadowTechnique {
        self.log.lock().unwrap().updates += 1;
        for (i, mask) in frame.visible_mask.iter_mut().enumerate() {
            let c = frame.world_aabb_center[i];
            if self.directional && c.y < 0.0 {
                *mask |= VISIBLE_DIR_SHADOW_RENDERABLE;
            }
            if c.x < 0.0 {
                for slot in 0..self.spots {
                    *mask |= visible_spot_shadow_renderable_n(slot);
                }
            }
        }
        self.technique
    }
}

// ── Scene ──

#[derive(Debug, Default)]
pub struct SceneEvents {
    pub uniform_updates: Vec<(Range, BufferHandle)>,
    pub dynamic_light_uploads: usize,
}

/// A [`Scene`] reporting its uniform uploads through a shared log.
pub struct RecordingScene {
    pub inner: Scene,
    pub events: Arc<Mutex<SceneEvents>>,
}

impl RecordingScene {
    pub fn new(inner: Scene) -> (Box<Self>, Arc<Mutex<SceneEvents>>) {
        let events = Arc::new(Mutex::new(SceneEvents::default()));
        (
            Box::new(Self {
                inner,
                events: events.clone(),
            }),
            events,
        )
    }
}

impl SceneProvider for RecordingScene {
    fn prepare(&mut self, world_origin: &Mat4, vsm: bool) {
        self.inner.prepare(world_origin, vsm);
    }

    fn renderable_data(&self) -> &RenderableSoa {
        self.inner.renderable_data()
    }

    fn light_data(&self) -> &LightSoa {
        self.inner.light_data()
    }

    fn data_mut(&mut self) -> (&mut RenderableSoa, &mut LightSoa) {
        self.inner.data_mut()
    }

    fn update_uniforms(&mut self, range: Range, buffer: BufferHandle) {
        self.inner.update_uniforms(range, buffer);
        self.events.lock().unwrap().uniform_updates.push((range, buffer));
    }

    fn prepare_dynamic_lights(&mut self, camera: &CameraInfo, buffer: BufferHandle) {
        self.inner.prepare_dynamic_lights(camera, buffer);
        self.events.lock().unwrap().dynamic_light_uploads += 1;
    }
}

// ── Helpers ──

pub fn renderable(instance: u32, center: Vec3, layers: u8, visibility: VisibilityState) -> SceneRenderable {
    SceneRenderable {
        instance,
        local_aabb: Aabb::from_center_half_extents(center, Vec3::new(0.5, 0.5, 0.5)),
        transform: Mat4::IDENTITY,
        layers,
        visibility,
    }
}

/// Camera at `position` looking down -Z with a 90 degree field of view.
pub fn camera_at(position: Vec3) -> CameraSnapshot {
    CameraSnapshot::perspective(position, FRAC_PI_2, 1.0, 0.1, 1000.0)
}
