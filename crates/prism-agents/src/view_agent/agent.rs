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

//! Defines the ViewAgent, which prepares one view of a scene every frame.

use std::sync::Arc;

use super::picking::{PickingCallback, PickingQueue};
use super::uniforms::ViewUniforms;
use super::{PrepareError, PrepareStats, ViewConfig};
use crate::jobs::JobSystem;
use prism_control::{
    DisplayInfo, DynamicResolutionController, DynamicResolutionOptions, FrameInfo,
    FrameRateOptions, PidTuning,
};
use prism_core::lane::Lane;
use prism_core::limits::DIRECTIONAL_LIGHTS_COUNT;
use prism_core::math::{Frustum, Mat4, Vec2};
use prism_core::renderer::{
    BufferAllocator, BufferHandle, CameraInfo, CameraSnapshot, LightManager, PixelReadback,
    ShadowMapManager, ShadowTechnique, ShadowType, ShadowUpdate, Viewport,
};
use prism_data::SceneProvider;
use prism_lanes::{
    LightSelection, LightSelectionLane, RenderableCullingLane, ShadowCasterLane, VisibilityRanges,
};

/// Owns the per-view state of frame preparation and sequences the lanes over a scene.
pub struct ViewAgent {
    config: ViewConfig,
    jobs: JobSystem,
    // Lanes, stateless between frames.
    culling: RenderableCullingLane,
    light_selection: LightSelectionLane,
    shadow_casters: ShadowCasterLane,
    // Collaborators.
    light_manager: Arc<dyn LightManager>,
    shadow_maps: Box<dyn ShadowMapManager>,
    scene: Option<Box<dyn SceneProvider>>,
    uniforms: ViewUniforms,
    picking: PickingQueue,
    // The only state carried from frame to frame.
    dynamic_resolution: DynamicResolutionController,
    frame_rate: FrameRateOptions,
    display: DisplayInfo,
    viewport: Viewport,
    scale: Vec2,
    // Results of the last prepare.
    camera: CameraInfo,
    frustum: Frustum,
    ranges: VisibilityRanges,
    has_shadowing: bool,
    needs_shadow_map: bool,
    has_dynamic_lighting: bool,
    has_directional_light: bool,
}

impl ViewAgent {
    /// Creates a view and its light and shadow uniform buffers.
    pub fn new(
        config: ViewConfig,
        light_manager: Arc<dyn LightManager>,
        shadow_maps: Box<dyn ShadowMapManager>,
        allocator: &mut dyn BufferAllocator,
        tuning: PidTuning,
    ) -> Result<Self, PrepareError> {
        let jobs = JobSystem::new(config.worker_threads)?;
        let culling = RenderableCullingLane::new();
        let light_selection = LightSelectionLane::new(config.limits);
        let shadow_casters = ShadowCasterLane::new(config.limits);
        let lanes: [&dyn Lane; 3] = [&culling, &light_selection, &shadow_casters];
        for lane in lanes {
            log::debug!("ViewAgent: {} lane uses {}", lane.lane_kind(), lane.strategy_name());
        }
        log::info!("ViewAgent: created with {} lanes on {} workers", lanes.len(), jobs.worker_count());

        Ok(Self {
            config,
            jobs,
            culling,
            light_selection,
            shadow_casters,
            light_manager,
            shadow_maps,
            scene: None,
            uniforms: ViewUniforms::new(allocator, &config.limits),
            picking: PickingQueue::new(),
            dynamic_resolution: DynamicResolutionController::new(
                tuning,
                allocator.is_frame_time_supported(),
            ),
            frame_rate: FrameRateOptions::default(),
            display: DisplayInfo::default(),
            viewport: Viewport::default(),
            scale: Vec2::ONE,
            camera: CameraInfo::default(),
            frustum: Frustum::default(),
            ranges: VisibilityRanges::default(),
            has_shadowing: false,
            needs_shadow_map: false,
            has_dynamic_lighting: false,
            has_directional_light: false,
        })
    }

    // --- Scene and configuration ---

    /// Attaches the scene prepared by this view, returning the previous one.
    pub fn set_scene(&mut self, scene: Box<dyn SceneProvider>) -> Option<Box<dyn SceneProvider>> {
        self.scene.replace(scene)
    }

    /// Detaches the scene.
    pub fn take_scene(&mut self) -> Option<Box<dyn SceneProvider>> {
        self.scene.take()
    }

    /// The attached scene. After `prepare`, its light store holds the selected lights.
    pub fn scene(&self) -> Option<&dyn SceneProvider> {
        self.scene.as_deref()
    }

    /// The view configuration.
    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    /// Sets the viewport. Extents must be positive.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        debug_assert!(
            viewport.width > 0 && viewport.height > 0,
            "viewport extents must be positive, got {}x{}",
            viewport.width,
            viewport.height
        );
        self.viewport = viewport;
    }

    /// The viewport.
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Replaces the `select` bits of the visible layers with those of `values`.
    pub fn set_visible_layers(&mut self, select: u8, values: u8) {
        self.config.visible_layers = (self.config.visible_layers & !select) | (values & select);
    }

    /// Layers rendered by this view.
    pub fn visible_layers(&self) -> u8 {
        self.config.visible_layers
    }

    /// Enables or disables the camera frustum test.
    pub fn set_frustum_culling_enabled(&mut self, enabled: bool) {
        self.config.frustum_culling_enabled = enabled;
    }

    /// Enables or disables shadows.
    pub fn set_shadowing_enabled(&mut self, enabled: bool) {
        self.config.shadowing_enabled = enabled;
    }

    /// Sets the shadow filtering technique.
    pub fn set_shadow_type(&mut self, shadow_type: ShadowType) {
        self.config.shadow_type = shadow_type;
    }

    // --- Frame preparation ---

    /// Prepares the attached scene for rendering `camera`.
    ///
    /// Culling and light selection run as two jobs; everything after their join point
    /// runs on the calling thread.
    pub fn prepare(
        &mut self,
        allocator: &mut dyn BufferAllocator,
        camera: &CameraSnapshot,
    ) -> Result<PrepareStats, PrepareError> {
        let scene = self.scene.as_deref_mut().ok_or(PrepareError::NoScene)?;
        let config = self.config;
        let vsm = config.shadow_type == ShadowType::Vsm;

        // Shading happens around the camera to keep world positions small.
        let world_origin = if config.camera_at_origin {
            Mat4::from_translation(-camera.position())
        } else {
            Mat4::IDENTITY
        };
        let camera_info = CameraInfo::new(camera, &world_origin);
        let frustum = Frustum::from_view_projection(&(camera.culling_projection * camera_info.view));

        scene.prepare(&world_origin, vsm);

        let lcm: &dyn LightManager = &*self.light_manager;
        let mut stats = PrepareStats::default();
        let ranges = {
            let (renderables, lights) = scene.data_mut();

            let culling = &self.culling;
            let light_selection = &self.light_selection;
            let selection = if lights.len() > DIRECTIONAL_LIGHTS_COUNT {
                let ((), selection) = self.jobs.join(
                    || culling.cull(&frustum, renderables, config.frustum_culling_enabled),
                    || light_selection.execute(lcm, &camera_info, &frustum, lights),
                );
                selection
            } else {
                self.jobs
                    .run(|| culling.cull(&frustum, renderables, config.frustum_culling_enabled));
                LightSelection::default()
            };
            stats.visible_lights = selection.visible;
            stats.dropped_lights = selection.dropped;

            let technique = if config.shadowing_enabled {
                let casters = self.shadow_casters.classify(lcm, lights, self.shadow_maps.as_mut());
                stats.directional_shadow = casters.directional;
                stats.shadow_casting_spots = casters.spot_lights.len();

                let columns = renderables.columns_mut();
                let mut frame = ShadowUpdate {
                    camera: &camera_info,
                    world_aabb_center: columns.world_aabb_center,
                    world_aabb_extent: columns.world_aabb_extent,
                    visible_mask: columns.visible_mask,
                    light_position_radius: lights.position_radius(),
                    light_direction: lights.directions(),
                };
                self.shadow_maps.update(&mut frame)
            } else {
                ShadowTechnique::empty()
            };
            self.has_shadowing = !technique.is_empty();
            self.needs_shadow_map = technique.contains(ShadowTechnique::SHADOW_MAP);

            self.culling.compose(renderables, config.visible_layers, vsm);
            let ranges = self.shadow_casters.partition(renderables);

            self.has_dynamic_lighting = lights.len() > DIRECTIONAL_LIGHTS_COUNT;
            self.has_directional_light = lights.directional().is_some();
            ranges
        };
        stats.ranges = ranges;

        let (buffer, reallocated) = self.uniforms.reserve_renderables(allocator, ranges.merged.len());
        stats.renderable_buffer_reallocated = reallocated;
        scene.update_uniforms(ranges.merged, buffer);

        if self.has_dynamic_lighting {
            scene.prepare_dynamic_lights(&camera_info, self.uniforms.lights());
        }

        self.camera = camera_info;
        self.frustum = frustum;
        self.ranges = ranges;
        log::trace!("ViewAgent: {stats:?}");
        Ok(stats)
    }

    /// Camera of the last prepared frame.
    pub fn camera_info(&self) -> &CameraInfo {
        &self.camera
    }

    /// Culling frustum of the last prepared frame, in world-origin space.
    pub fn frustum(&self) -> &Frustum {
        &self.frustum
    }

    /// Renderable ranges of the last prepared frame.
    pub fn visibility_ranges(&self) -> &VisibilityRanges {
        &self.ranges
    }

    /// Whether any shadow technique is in use.
    pub fn has_shadowing(&self) -> bool {
        self.has_shadowing
    }

    /// Whether shadow maps must be rendered.
    pub fn needs_shadow_map(&self) -> bool {
        self.needs_shadow_map
    }

    /// Whether positional lights survived selection.
    pub fn has_dynamic_lighting(&self) -> bool {
        self.has_dynamic_lighting
    }

    /// Whether the scene has a directional light.
    pub fn has_directional_light(&self) -> bool {
        self.has_directional_light
    }

    /// Camera exposure of the last prepared frame.
    pub fn exposure(&self) -> f32 {
        self.camera.exposure()
    }

    /// The view's uniform buffers.
    pub fn uniforms(&self) -> &ViewUniforms {
        &self.uniforms
    }

    /// The light uniform buffer.
    pub fn light_buffer(&self) -> BufferHandle {
        self.uniforms.lights()
    }

    // --- Dynamic resolution ---

    /// Sets the dynamic resolution options; they are sanitized first.
    pub fn set_dynamic_resolution_options(&mut self, options: DynamicResolutionOptions) {
        self.dynamic_resolution.set_options(options);
    }

    /// The sanitized dynamic resolution options.
    pub fn dynamic_resolution_options(&self) -> &DynamicResolutionOptions {
        self.dynamic_resolution.options()
    }

    /// Sets the frame pacing target; it is sanitized first.
    pub fn set_frame_rate_options(&mut self, options: FrameRateOptions) {
        self.frame_rate = options.sanitized();
    }

    /// The sanitized frame pacing target.
    pub fn frame_rate_options(&self) -> &FrameRateOptions {
        &self.frame_rate
    }

    /// Sets the display characteristics. The refresh rate must be positive.
    pub fn set_display_info(&mut self, display: DisplayInfo) {
        debug_assert!(
            display.refresh_rate > 0.0,
            "refresh rate must be positive, got {}",
            display.refresh_rate
        );
        self.display = display;
    }

    /// Runs the resolution controller for the coming frame and returns the rounded scale.
    pub fn update_scale(&mut self, info: &FrameInfo) -> Vec2 {
        self.scale =
            self.dynamic_resolution
                .update(info, &self.frame_rate, &self.display, &self.viewport);
        self.scale
    }

    /// Rounded scale used to size render targets.
    pub fn scale(&self) -> Vec2 {
        self.scale
    }

    /// The resolution controller.
    pub fn dynamic_resolution(&self) -> &DynamicResolutionController {
        &self.dynamic_resolution
    }

    // --- Picking ---

    /// Queues a picking query at viewport pixel `(x, y)`. The callback runs exactly once.
    pub fn pick(&mut self, x: u32, y: u32, callback: PickingCallback) {
        self.picking.push(x, y, callback);
    }

    /// Issues the readbacks of the queued picking queries. `scale` converts viewport
    /// pixels to render-target pixels before the dynamic resolution scale is applied.
    pub fn execute_picking_queries(&mut self, readback: &mut dyn PixelReadback, scale: f32) {
        let scale = Vec2::new(self.scale.x * scale, self.scale.y * scale);
        self.picking.execute(readback, scale);
    }

    /// Delivers completed picking results. Returns how many callbacks ran.
    pub fn poll_picking_results(&mut self) -> usize {
        self.picking.poll()
    }

    /// Releases the view's buffers and answers outstanding picking queries with empty
    /// results.
    pub fn terminate(self, allocator: &mut dyn BufferAllocator) {
        let Self {
            uniforms,
            mut picking,
            ..
        } = self;
        picking.flush();
        uniforms.destroy(allocator);
        log::debug!("ViewAgent: terminated");
    }
}
