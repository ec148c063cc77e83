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

//! Prepares a synthetic city block for a few frames and logs what each stage did.
//!
//! Usage: `sandbox [view_config.ron]`. Set `PRISM_PID_GAINS` in debug builds to try
//! other controller gains.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use prism_agents::{ViewAgent, ViewConfig};
use prism_control::{DynamicResolutionOptions, FrameInfo, PidTuning};
use prism_core::math::{Aabb, Mat4, Vec3, FRAC_PI_4};
use prism_core::renderer::visibility::{
    visible_spot_shadow_renderable_n, VISIBLE_DIR_SHADOW_RENDERABLE,
};
use prism_core::renderer::{
    BufferAllocator, BufferBinding, BufferHandle, BufferUsage, CameraSnapshot, LightInstance,
    LightManager, PickingQueryResult, PixelReadback, PixelReadout, ReadbackCompletion,
    ShadowMapManager, ShadowOptions, ShadowTechnique, ShadowUpdate, Viewport, VisibilityState,
};
use prism_data::{Scene, SceneLight, SceneRenderable};

const GRID: u32 = 48;
const POINT_LIGHTS: u32 = 400;
const FRAMES: u32 = 8;

struct SandboxLight {
    intensity: f32,
    spot: bool,
    shadow_caster: bool,
}

struct SandboxLights {
    lights: Vec<SandboxLight>,
    options: ShadowOptions,
}

impl LightManager for SandboxLights {
    fn is_light_caster(&self, light: LightInstance) -> bool {
        self.lights[light.0 as usize].intensity > 0.0
    }
    fn intensity(&self, light: LightInstance) -> f32 {
        self.lights[light.0 as usize].intensity
    }
    fn is_spot_light(&self, light: LightInstance) -> bool {
        self.lights[light.0 as usize].spot
    }
    fn cos_outer_squared(&self, _light: LightInstance) -> f32 {
        // 45 degree half angle.
        0.5
    }
    fn is_shadow_caster(&self, light: LightInstance) -> bool {
        self.lights[light.0 as usize].shadow_caster
    }
    fn shadow_options(&self, _light: LightInstance) -> &ShadowOptions {
        &self.options
    }
}

/// Marks every renderable as a directional caster and the ones inside a spot light's
/// range as casters for that spot.
#[derive(Default)]
struct SandboxShadowMaps {
    directional: bool,
    spots: Vec<usize>,
}

impl ShadowMapManager for SandboxShadowMaps {
    fn reset(&mut self) {
        self.directional = false;
        self.spots.clear();
    }

    fn set_shadow_cascades(&mut self, _light_index: usize, _options: &ShadowOptions) {
        self.directional = true;
    }

    fn add_spot_shadow_map(&mut self, light_index: usize, _options: &ShadowOptions) {
        self.spots.push(light_index);
    }

    fn update(&mut self, frame: &mut ShadowUpdate<'_>) -> ShadowTechnique {
        for (i, mask) in frame.visible_mask.iter_mut().enumerate() {
            if self.directional {
                *mask |= VISIBLE_DIR_SHADOW_RENDERABLE;
            }
            let center = frame.world_aabb_center[i];
            for (slot, &light) in self.spots.iter().enumerate() {
                let sphere = frame.light_position_radius[light];
                if (center - sphere.truncate()).length() <= sphere.w {
                    *mask |= visible_spot_shadow_renderable_n(slot);
                }
            }
        }
        if self.directional || !self.spots.is_empty() {
            ShadowTechnique::SHADOW_MAP
        } else {
            ShadowTechnique::empty()
        }
    }
}

#[derive(Default)]
struct SandboxAllocator {
    next: u64,
    bytes: usize,
}

impl BufferAllocator for SandboxAllocator {
    fn create_buffer(&mut self, size: usize, binding: BufferBinding, usage: BufferUsage) -> BufferHandle {
        self.next += 1;
        self.bytes += size;
        log::debug!("Sandbox: buffer #{} ({size} bytes, {binding:?}, {usage:?})", self.next);
        BufferHandle(self.next)
    }

    fn destroy_buffer(&mut self, handle: BufferHandle) {
        log::debug!("Sandbox: destroyed buffer #{}", handle.0);
    }

    fn is_frame_time_supported(&self) -> bool {
        true
    }
}

/// Answers readbacks immediately with the renderable index encoded in the pixel.
struct SandboxReadback;

impl PixelReadback for SandboxReadback {
    fn read_pixels(&mut self, x: u32, y: u32, completion: ReadbackCompletion) {
        completion(PixelReadout {
            renderable: x ^ y,
            depth: 0.5,
        });
    }
}

fn build_scene() -> (Scene, SandboxLights) {
    let mut scene = Scene::new();
    let mut lights = Vec::new();

    lights.push(SandboxLight {
        intensity: 100_000.0,
        spot: false,
        shadow_caster: true,
    });
    scene.set_directional_light(Some((LightInstance(0), Vec3::new(0.3, -1.0, 0.2))));

    for i in 0..GRID * GRID {
        let x = (i % GRID) as f32 * 4.0 - GRID as f32 * 2.0;
        let z = -((i / GRID) as f32) * 4.0;
        let height = 1.0 + (i % 7) as f32;
        scene.add_renderable(SceneRenderable {
            instance: i + 1,
            local_aabb: Aabb::from_center_half_extents(Vec3::ZERO, Vec3::new(1.0, height, 1.0)),
            transform: Mat4::from_translation(Vec3::new(x, height, z)),
            layers: if i % 11 == 0 { 0x2 } else { 0x1 },
            visibility: VisibilityState {
                culling: true,
                cast_shadows: i % 5 != 0,
                receive_shadows: true,
            },
        });
    }

    for i in 0..POINT_LIGHTS {
        let instance = LightInstance(lights.len() as u32);
        lights.push(SandboxLight {
            intensity: if i % 37 == 0 { 0.0 } else { 500.0 },
            spot: i % 4 == 0,
            shadow_caster: i % 8 == 0,
        });
        let x = ((i * 13) % 96) as f32 - 48.0;
        let z = -(((i * 7) % 190) as f32);
        scene.add_light(SceneLight {
            instance,
            position: Vec3::new(x, 6.0, z),
            radius: 12.0,
            direction: Vec3::new(0.0, -1.0, -0.2),
        });
    }

    (
        scene,
        SandboxLights {
            lights,
            options: ShadowOptions::default(),
        },
    )
}

fn load_config() -> Result<ViewConfig> {
    match std::env::args().nth(1) {
        Some(path) => {
            let document = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read view configuration '{path}'"))?;
            let config = ViewConfig::from_ron_str(&document)
                .with_context(|| format!("Invalid view configuration '{path}'"))?;
            log::info!("Sandbox: loaded view configuration from {path}");
            Ok(config)
        }
        None => Ok(ViewConfig::default()),
    }
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = load_config()?;
    let (scene, lights) = build_scene();
    let mut allocator = SandboxAllocator::default();

    let mut view = ViewAgent::new(
        config,
        Arc::new(lights),
        Box::new(SandboxShadowMaps::default()),
        &mut allocator,
        PidTuning::from_env(),
    )?;
    view.set_scene(Box::new(scene));
    view.set_viewport(Viewport::new(1920, 1080));
    view.set_dynamic_resolution_options(DynamicResolutionOptions {
        enabled: true,
        ..Default::default()
    });

    for frame in 0..FRAMES {
        // GPU time creeps over budget, then recovers.
        let gpu_ms = if frame < FRAMES / 2 { 24.0 } else { 12.0 };
        let sample = Duration::from_secs_f32(gpu_ms / 1000.0);
        let scale = view.update_scale(&FrameInfo {
            frame_time: sample,
            denoised_frame_time: sample,
            valid: frame > 0,
        });

        let position = Vec3::new(0.0, 8.0, 10.0 - frame as f32 * 6.0);
        let mut camera = CameraSnapshot::perspective(position, FRAC_PI_4, 16.0 / 9.0, 0.1, 250.0);
        // Sweep a few degrees left and right while moving.
        let yaw = (frame as f32 - FRAMES as f32 / 2.0) * 0.05;
        camera.model = camera.model * Mat4::from_rotation_y(yaw);
        let stats = view.prepare(&mut allocator, &camera)?;

        log::info!(
            "Frame {frame}: scale {:.3}x{:.3}, {} renderables visible ({} culled), {} dir casters, {} lights kept ({} dropped), {} spot shadows",
            scale.x,
            scale.y,
            stats.ranges.visible_renderables.len(),
            stats.ranges.buckets.invisible.len(),
            stats.ranges.directional_casters.len(),
            stats.visible_lights - stats.dropped_lights,
            stats.dropped_lights,
            stats.shadow_casting_spots
        );

        if frame == FRAMES - 1 {
            view.pick(
                960,
                540,
                Box::new(|result: &PickingQueryResult| {
                    log::info!(
                        "Sandbox: picked renderable {} at {:?}",
                        result.renderable,
                        result.frag_coords
                    );
                }),
            );
            view.execute_picking_queries(&mut SandboxReadback, 1.0);
            view.poll_picking_results();
        }
    }

    log::info!("Sandbox: {} bytes of uniform buffers allocated", allocator.bytes);
    view.terminate(&mut allocator);
    Ok(())
}
