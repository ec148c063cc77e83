mod common;

use approx::assert_abs_diff_eq;
use common::*;
use prism_agents::{ViewAgent, ViewConfig};
use prism_control::{DynamicResolutionOptions, FrameInfo, FrameRateOptions, PidTuning};
use prism_core::math::{Vec2, Vec3};
use prism_core::renderer::{
    PickingQueryResult, PixelReadback, PixelReadout, ReadbackCompletion, ShadowTechnique, Viewport,
};
use prism_data::Scene;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
struct DeferredReadback {
    requests: Vec<(u32, u32, ReadbackCompletion)>,
}

impl PixelReadback for DeferredReadback {
    fn read_pixels(&mut self, x: u32, y: u32, completion: ReadbackCompletion) {
        self.requests.push((x, y, completion));
    }
}

fn new_agent(allocator: &mut MockAllocator) -> ViewAgent {
    let (shadows, _) = MockShadowMaps::new(ShadowTechnique::empty());
    let mut agent = ViewAgent::new(
        ViewConfig::default(),
        Arc::new(MockLightManager::default()),
        Box::new(shadows),
        allocator,
        PidTuning::Derived,
    )
    .unwrap();
    agent.set_scene(Box::new(Scene::new()));
    agent.set_viewport(Viewport::new(1920, 1080));
    agent
}

fn frame(ms: f32) -> FrameInfo {
    let d = Duration::from_secs_f32(ms / 1000.0);
    FrameInfo {
        frame_time: d,
        denoised_frame_time: d,
        valid: true,
    }
}

// ── Picking ──

#[test]
fn test_pick_resolves_once_after_readback() {
    let mut allocator = MockAllocator::new();
    let mut agent = new_agent(&mut allocator);
    let results: Arc<Mutex<Vec<PickingQueryResult>>> = Arc::default();

    let sink = results.clone();
    agent.pick(
        100,
        50,
        Box::new(move |r: &PickingQueryResult| sink.lock().unwrap().push(*r)),
    );
    agent.prepare(&mut allocator, &camera_at(Vec3::ZERO)).unwrap();

    let mut readback = DeferredReadback::default();
    agent.execute_picking_queries(&mut readback, 2.0);
    assert_eq!(readback.requests.len(), 1);
    assert_eq!((readback.requests[0].0, readback.requests[0].1), (200, 100));

    // Completion may arrive from any thread.
    let (_, _, completion) = readback.requests.pop().unwrap();
    std::thread::spawn(move || {
        completion(PixelReadout {
            renderable: 42,
            depth: 0.2,
        })
    })
    .join()
    .unwrap();

    assert_eq!(agent.poll_picking_results(), 1);
    assert_eq!(agent.poll_picking_results(), 0);

    let results = results.lock().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].renderable, 42);
    assert_abs_diff_eq!(results[0].frag_coords.x, 100.0);
    assert_abs_diff_eq!(results[0].frag_coords.y, 50.0);
    assert_abs_diff_eq!(results[0].frag_coords.z, 0.8, epsilon = 1e-6);
}

#[test]
fn test_terminate_flushes_queries_and_buffers() {
    let mut allocator = MockAllocator::new();
    let mut agent = new_agent(&mut allocator);
    agent.prepare(&mut allocator, &camera_at(Vec3::ZERO)).unwrap();
    assert_eq!(allocator.live.len(), 3);

    let calls = Arc::new(Mutex::new(Vec::new()));
    for i in 0..3 {
        let calls = calls.clone();
        agent.pick(i, i, Box::new(move |r: &PickingQueryResult| calls.lock().unwrap().push(r.renderable)));
    }
    let mut readback = DeferredReadback::default();
    agent.execute_picking_queries(&mut readback, 1.0);
    let calls_before = calls.lock().unwrap().len();
    assert_eq!(calls_before, 0);

    agent.terminate(&mut allocator);
    assert!(allocator.live.is_empty());
    assert_eq!(*calls.lock().unwrap(), vec![0, 0, 0]);

    // Late completions are ignored.
    for (_, _, completion) in readback.requests.drain(..) {
        completion(PixelReadout::default());
    }
    assert_eq!(calls.lock().unwrap().len(), 3);
}

// ── Dynamic resolution ──

#[test]
fn test_scale_stays_at_one_while_disabled() {
    let mut allocator = MockAllocator::new();
    let mut agent = new_agent(&mut allocator);
    assert_eq!(agent.update_scale(&frame(100.0)), Vec2::ONE);
    assert_eq!(agent.scale(), Vec2::ONE);
}

#[test]
fn test_unsupported_frame_time_keeps_resolution_off() {
    let mut allocator = MockAllocator::new();
    allocator.frame_time_supported = false;
    let mut agent = new_agent(&mut allocator);
    agent.set_dynamic_resolution_options(DynamicResolutionOptions {
        enabled: true,
        ..Default::default()
    });
    assert!(!agent.dynamic_resolution_options().enabled);
    assert_eq!(agent.update_scale(&frame(100.0)), Vec2::ONE);
}

#[test]
fn test_slow_frames_shrink_render_targets_on_pixel_grid() {
    let mut allocator = MockAllocator::new();
    let mut agent = new_agent(&mut allocator);
    agent.set_dynamic_resolution_options(DynamicResolutionOptions {
        enabled: true,
        ..Default::default()
    });

    let target = 1000.0 / 60.0;
    let mut last = Vec2::ONE;
    for _ in 0..60 {
        let rounded = agent.update_scale(&frame(2.0 * target));
        assert!(rounded.x <= last.x && rounded.y <= last.y);
        last = rounded;

        let width = rounded.x * 1920.0;
        let height = rounded.y * 1080.0;
        assert_abs_diff_eq!(width, (width / 8.0).round() * 8.0, epsilon = 1e-2);
        assert_abs_diff_eq!(height, (height / 8.0).round() * 8.0, epsilon = 1e-2);
    }
    // The controller keeps 0.5; render targets use 960x536.
    assert_abs_diff_eq!(agent.dynamic_resolution().scale().x, 0.5);
    assert_abs_diff_eq!(agent.dynamic_resolution().scale().y, 0.5);
    assert_abs_diff_eq!(agent.scale().x, 960.0 / 1920.0);
    assert_abs_diff_eq!(agent.scale().y, 536.0 / 1080.0);
    assert_eq!(agent.dynamic_resolution().history().count(), 32);

    // Picking coordinates follow the rounded resolution.
    agent.pick(400, 200, Box::new(|_: &PickingQueryResult| {}));
    let mut readback = DeferredReadback::default();
    agent.execute_picking_queries(&mut readback, 1.0);
    assert_eq!((readback.requests[0].0, readback.requests[0].1), (200, 99));
    agent.terminate(&mut allocator);
}

#[test]
fn test_zero_frame_interval_does_not_pin_minimum_scale() {
    let mut allocator = MockAllocator::new();
    let mut agent = new_agent(&mut allocator);
    agent.set_dynamic_resolution_options(DynamicResolutionOptions {
        enabled: true,
        ..Default::default()
    });
    agent.set_frame_rate_options(FrameRateOptions {
        interval: 0,
        head_room_ratio: 1.0,
        ..Default::default()
    });
    assert_eq!(agent.frame_rate_options().interval, 1);
    assert!(agent.frame_rate_options().head_room_ratio < 1.0);

    agent.set_frame_rate_options(FrameRateOptions {
        interval: 0,
        ..Default::default()
    });
    for _ in 0..30 {
        agent.update_scale(&frame(16.0));
    }
    let pid = agent.dynamic_resolution().pid();
    assert!(pid.error().is_finite() && pid.derivative().is_finite());
    assert!(pid.integral() > -100.0);
    assert_eq!(agent.scale(), Vec2::ONE);
    agent.terminate(&mut allocator);
}

