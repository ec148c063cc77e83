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

//! Frame-time driven render scale.
//!
//! [`DynamicResolutionController`] turns the denoised GPU frame time into a 2D render
//! scale. Shrinking favours the major axis first so thin viewports do not collapse
//! along their short side, and growing is always uniform. Callers size their render
//! targets from the rounded scale, which lands on an 8-pixel grid. The unrounded
//! scale stays in the controller so quantization does not compound frame to frame.

use std::time::Duration;

use log::trace;
use prism_core::math::{clamp, Vec2};
use prism_core::renderer::Viewport;
use serde::{Deserialize, Serialize};

use crate::config::{from_ron_str, ConfigError, PidTuning};
use crate::metrics::{FrameHistory, FrameHistoryEntry};
use crate::pid::PidController;

const INTEGRAL_LIMIT: f32 = 100.0;
const OUTPUT_DEAD_BAND_LOW: f32 = -0.01;
const OUTPUT_DEAD_BAND_HIGH: f32 = 0.05;
const MIN_SCALE_FLOOR: f32 = 1.0 / 1024.0;
const MAX_SCALE_CEILING: f32 = 2.0;
const PIXEL_GRID: f32 = 8.0;
const MAX_HEAD_ROOM_RATIO: f32 = 0.9;

/// User-facing dynamic resolution settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DynamicResolutionOptions {
    /// Lower bound of the scale, per axis.
    pub min_scale: Vec2,
    /// Upper bound of the scale, per axis.
    pub max_scale: Vec2,
    /// Upscaling sharpness, in `[0, 2]`.
    pub sharpness: f32,
    /// Whether the controller runs at all.
    pub enabled: bool,
    /// Forces uniform scaling of both axes when shrinking.
    pub homogeneous_scaling: bool,
}

impl Default for DynamicResolutionOptions {
    fn default() -> Self {
        Self {
            min_scale: Vec2::splat(0.5),
            max_scale: Vec2::ONE,
            sharpness: 0.9,
            enabled: false,
            homogeneous_scaling: false,
        }
    }
}

impl DynamicResolutionOptions {
    /// Parses options from RON, e.g. `(enabled: true, min_scale: (x: 0.5, y: 0.5))`.
    pub fn from_ron_str(document: &str) -> Result<Self, ConfigError> {
        from_ron_str(document)
    }

    /// Returns these options made consistent with the platform and with each other.
    pub fn sanitized(mut self, frame_time_supported: bool) -> Self {
        self.enabled &= frame_time_supported;
        if self.enabled {
            self.min_scale = self.min_scale.max(Vec2::splat(MIN_SCALE_FLOOR));
            self.max_scale = self.max_scale.max(self.min_scale);
            self.max_scale = self.max_scale.min(Vec2::splat(MAX_SCALE_CEILING));
        }
        self.sharpness = clamp(self.sharpness, 0.0, 2.0);
        self
    }
}

/// Frame pacing settings the controller aims for.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameRateOptions {
    /// Fraction of the frame budget kept as head room, in `[0, 1)`.
    pub head_room_ratio: f32,
    /// How fast the scale reacts; drives the proportional gain.
    pub scale_rate: f32,
    /// Desired frame interval, in display refreshes.
    pub interval: u8,
}

impl Default for FrameRateOptions {
    fn default() -> Self {
        Self {
            head_room_ratio: 0.0,
            scale_rate: 1.0 / 8.0,
            interval: 1,
        }
    }
}

impl FrameRateOptions {
    /// Parses frame-rate options from RON.
    pub fn from_ron_str(document: &str) -> Result<Self, ConfigError> {
        from_ron_str(document)
    }

    /// Returns these options with a frame budget that is never zero.
    ///
    /// `interval` is raised to 1 and `head_room_ratio` clamped to `[0, 0.9]`. A
    /// negative or non-finite `scale_rate` falls back to the default rate.
    pub fn sanitized(mut self) -> Self {
        self.interval = self.interval.max(1);
        self.head_room_ratio = if self.head_room_ratio.is_nan() {
            0.0
        } else {
            clamp(self.head_room_ratio, 0.0, MAX_HEAD_ROOM_RATIO)
        };
        if !self.scale_rate.is_finite() || self.scale_rate < 0.0 {
            self.scale_rate = Self::default().scale_rate;
        }
        self
    }
}

/// Display characteristics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayInfo {
    /// Refresh rate in Hz.
    pub refresh_rate: f32,
}

impl Default for DisplayInfo {
    fn default() -> Self {
        Self { refresh_rate: 60.0 }
    }
}

/// Timing of the last completed frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameInfo {
    /// Raw measured frame time.
    pub frame_time: Duration,
    /// Filtered frame time.
    pub denoised_frame_time: Duration,
    /// False while no trustworthy measurement exists yet.
    pub valid: bool,
}

/// PID-driven render-scale controller. Owned by a view for its whole lifetime.
#[derive(Debug, Clone)]
pub struct DynamicResolutionController {
    pid: PidController,
    tuning: PidTuning,
    options: DynamicResolutionOptions,
    frame_time_supported: bool,
    scale: Vec2,
    rounded: Vec2,
    history: FrameHistory,
}

impl DynamicResolutionController {
    /// Creates a disabled controller.
    pub fn new(tuning: PidTuning, frame_time_supported: bool) -> Self {
        let mut pid = PidController::new();
        pid.set_integral_limits(-INTEGRAL_LIMIT, INTEGRAL_LIMIT);
        pid.set_output_dead_band(OUTPUT_DEAD_BAND_LOW, OUTPUT_DEAD_BAND_HIGH);
        Self {
            pid,
            tuning,
            options: DynamicResolutionOptions::default(),
            frame_time_supported,
            scale: Vec2::ONE,
            rounded: Vec2::ONE,
            history: FrameHistory::new(),
        }
    }

    /// Installs new options after sanitizing them.
    pub fn set_options(&mut self, options: DynamicResolutionOptions) {
        self.options = options.sanitized(self.frame_time_supported);
    }

    /// The sanitized options in effect.
    pub fn options(&self) -> &DynamicResolutionOptions {
        &self.options
    }

    /// Unrounded scale retained as controller state.
    pub fn scale(&self) -> Vec2 {
        self.scale
    }

    /// Scale snapped to the pixel grid, as returned by the last update.
    pub fn rounded_scale(&self) -> Vec2 {
        self.rounded
    }

    /// The underlying PID controller.
    pub fn pid(&self) -> &PidController {
        &self.pid
    }

    /// Recent controller samples.
    pub fn history(&self) -> &FrameHistory {
        &self.history
    }

    /// Runs one control step and returns the rounded scale for `viewport`.
    pub fn update(
        &mut self,
        info: &FrameInfo,
        frame_rate: &FrameRateOptions,
        display: &DisplayInfo,
        viewport: &Viewport,
    ) -> Vec2 {
        debug_assert!(
            display.refresh_rate > 0.0,
            "refresh rate must be positive, got {}",
            display.refresh_rate
        );
        let options = self.options;
        let target = 1000.0 * f32::from(frame_rate.interval) / display.refresh_rate;
        let target_with_headroom = target * (1.0 - frame_rate.head_room_ratio);
        let measured = duration_ms(info.denoised_frame_time);

        if !options.enabled {
            self.scale = Vec2::ONE;
            self.rounded = Vec2::ONE;
        } else {
            if !info.valid {
                // No control law without a sample; the PID keeps its state.
                self.scale = Vec2::ONE.clamp(options.min_scale, options.max_scale);
                self.rounded = self.scale;
                return self.rounded;
            }

            let gains = self.tuning.gains(frame_rate.scale_rate);
            self.pid.set_parallel_gains(gains.kp, gains.ki, gains.kd);

            let out = self.pid.update(measured / target_with_headroom, 1.0, 1.0);
            let command = if out < 0.0 { 1.0 / (1.0 - out) } else { 1.0 + out };
            let area = self.scale.x * self.scale.y * command;

            let scale = distribute_area(area, viewport, options.homogeneous_scaling);
            let clamped = scale.clamp(options.min_scale, options.max_scale);
            self.pid.set_integral_inhibition_enabled(clamped != scale);
            self.scale = clamped;
            self.rounded = round_to_pixel_grid(self.scale, viewport);

            trace!(
                "Dynamic resolution: measured {:.2}ms / {:.2}ms, out {:.4}, scale {:?}",
                measured,
                target_with_headroom,
                out,
                self.scale
            );
        }

        self.history.push(FrameHistoryEntry {
            target,
            target_with_headroom,
            frame_time: duration_ms(info.frame_time),
            frame_time_denoised: measured,
            scale: self.scale.x * self.scale.y,
            pid_e: self.pid.error(),
            pid_i: self.pid.integral(),
            pid_d: self.pid.derivative(),
        });

        self.rounded
    }
}

fn duration_ms(d: Duration) -> f32 {
    d.as_secs_f32() * 1000.0
}

/// Splits an area scale into per-axis scales.
fn distribute_area(area: f32, viewport: &Viewport, homogeneous: bool) -> Vec2 {
    if area >= 1.0 || homogeneous {
        return Vec2::splat(area.sqrt());
    }

    let width = viewport.width.max(1) as f32;
    let height = viewport.height.max(1) as f32;
    let (major, minor) = if width >= height {
        (width, height)
    } else {
        (height, width)
    };

    // The major axis may shrink until it matches the minor extent.
    let major_scale = area.max(minor / major);
    // Never let the minor axis shrink past the original aspect ratio.
    let minor_scale = (area / major_scale).max(major_scale);
    let uniform = (area / (major_scale * minor_scale)).sqrt();
    let (major_scale, minor_scale) = (major_scale * uniform, minor_scale * uniform);

    if width >= height {
        Vec2::new(major_scale, minor_scale)
    } else {
        Vec2::new(minor_scale, major_scale)
    }
}

fn round_axis(scale: f32, extent: u32) -> f32 {
    if scale == 1.0 {
        return 1.0;
    }
    let extent = extent.max(1) as f32;
    (scale * extent / PIXEL_GRID).floor() * PIXEL_GRID / extent
}

fn round_to_pixel_grid(scale: Vec2, viewport: &Viewport) -> Vec2 {
    Vec2::new(
        round_axis(scale.x, viewport.width),
        round_axis(scale.y, viewport.height),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    const HD: Viewport = Viewport {
        left: 0,
        bottom: 0,
        width: 1920,
        height: 1080,
    };

    fn enabled_controller() -> DynamicResolutionController {
        let mut controller = DynamicResolutionController::new(PidTuning::Derived, true);
        controller.set_options(DynamicResolutionOptions {
            enabled: true,
            ..Default::default()
        });
        controller
    }

    fn frame(ms: f32) -> FrameInfo {
        let d = Duration::from_secs_f32(ms / 1000.0);
        FrameInfo {
            frame_time: d,
            denoised_frame_time: d,
            valid: true,
        }
    }

    fn target_ms() -> f32 {
        1000.0 / DisplayInfo::default().refresh_rate
    }

    // ── Modes ──

    #[test]
    fn test_disabled_pins_scale_to_one() {
        let mut controller = DynamicResolutionController::new(PidTuning::Derived, true);
        let before = controller.pid().clone();
        let rounded = controller.update(
            &frame(100.0),
            &FrameRateOptions::default(),
            &DisplayInfo::default(),
            &HD,
        );
        assert_eq!(rounded, Vec2::ONE);
        assert_eq!(controller.scale(), Vec2::ONE);
        assert_eq!(controller.pid(), &before);
    }

    #[test]
    fn test_unsupported_frame_time_disables() {
        let mut controller = DynamicResolutionController::new(PidTuning::Derived, false);
        controller.set_options(DynamicResolutionOptions {
            enabled: true,
            ..Default::default()
        });
        assert!(!controller.options().enabled);
    }

    #[test]
    fn test_invalid_sample_skips_control_law() {
        let mut controller = DynamicResolutionController::new(PidTuning::Derived, true);
        controller.set_options(DynamicResolutionOptions {
            enabled: true,
            min_scale: Vec2::splat(1.25),
            max_scale: Vec2::splat(1.5),
            ..Default::default()
        });
        let before = controller.pid().clone();
        let info = FrameInfo {
            valid: false,
            ..frame(100.0)
        };
        let rounded = controller.update(
            &info,
            &FrameRateOptions::default(),
            &DisplayInfo::default(),
            &HD,
        );
        assert_eq!(rounded, Vec2::splat(1.25));
        assert_eq!(controller.pid(), &before);
        assert_eq!(controller.history().count(), 0);
    }

    // ── Control law ──

    #[test]
    fn test_on_target_frames_hold_scale_at_one() {
        let mut controller = enabled_controller();
        for _ in 0..120 {
            controller.update(
                &frame(target_ms()),
                &FrameRateOptions::default(),
                &DisplayInfo::default(),
                &HD,
            );
        }
        assert_abs_diff_eq!(controller.scale().x, 1.0, epsilon = 1e-4);
        assert_abs_diff_eq!(controller.scale().y, 1.0, epsilon = 1e-4);
        assert_eq!(controller.rounded_scale(), Vec2::ONE);
    }

    #[test]
    fn test_recovers_full_resolution_once_load_drops() {
        let mut controller = enabled_controller();
        let frame_rate = FrameRateOptions::default();
        let display = DisplayInfo::default();
        // GPU time follows the rendered area.
        let area = |c: &DynamicResolutionController| c.scale().x * c.scale().y;

        for _ in 0..20 {
            let ms = 1.6 * target_ms() * area(&controller);
            controller.update(&frame(ms), &frame_rate, &display, &HD);
        }
        assert!(controller.scale().x < 0.7);
        let integral = controller.pid().integral();
        assert!(integral < 0.0 && integral > -10.0, "integral {integral}");

        for _ in 0..1000 {
            let ms = target_ms() * area(&controller);
            controller.update(&frame(ms), &frame_rate, &display, &HD);
        }
        assert_abs_diff_eq!(controller.scale().x, 1.0, epsilon = 1e-4);
        assert_abs_diff_eq!(controller.scale().y, 1.0, epsilon = 1e-4);
        assert_eq!(controller.rounded_scale(), Vec2::ONE);
    }

    #[test]
    fn test_slow_frames_shrink_monotonically_to_clamp() {
        let mut controller = enabled_controller();
        let mut last_area = 1.0;
        for _ in 0..200 {
            let rounded = controller.update(
                &frame(2.0 * target_ms()),
                &FrameRateOptions::default(),
                &DisplayInfo::default(),
                &HD,
            );
            let scale = controller.scale();
            let area = scale.x * scale.y;
            assert!(area <= last_area + 1e-6);
            last_area = area;

            assert!(scale.x >= 0.5 && scale.x <= 1.0);
            assert!(scale.y >= 0.5 && scale.y <= 1.0);

            let w = rounded.x * HD.width as f32;
            let h = rounded.y * HD.height as f32;
            assert_abs_diff_eq!((w / 8.0).round() * 8.0, w, epsilon = 1e-2);
            if rounded.y != 1.0 {
                assert_abs_diff_eq!((h / 8.0).round() * 8.0, h, epsilon = 1e-2);
            }
        }
        assert_relative_eq!(controller.scale().x, 0.5);
        assert_relative_eq!(controller.scale().y, 0.5);
    }

    #[test]
    fn test_major_axis_shrinks_first() {
        let mut controller = enabled_controller();
        controller.update(
            &frame(1.5 * target_ms()),
            &FrameRateOptions::default(),
            &DisplayInfo::default(),
            &HD,
        );
        let scale = controller.scale();
        assert!(scale.x < 1.0);
        assert_relative_eq!(scale.y, 1.0);
    }

    #[test]
    fn test_fast_frames_grow_uniformly_up_to_max() {
        let mut controller = DynamicResolutionController::new(PidTuning::Derived, true);
        controller.set_options(DynamicResolutionOptions {
            enabled: true,
            max_scale: Vec2::splat(1.5),
            ..Default::default()
        });
        for _ in 0..100 {
            controller.update(
                &frame(0.25 * target_ms()),
                &FrameRateOptions::default(),
                &DisplayInfo::default(),
                &HD,
            );
            let s = controller.scale();
            assert_relative_eq!(s.x, s.y, epsilon = 1e-5);
        }
        assert_relative_eq!(controller.scale().x, 1.5);
    }

    #[test]
    fn test_saturation_inhibits_integral() {
        let mut controller = enabled_controller();
        for _ in 0..200 {
            controller.update(
                &frame(3.0 * target_ms()),
                &FrameRateOptions::default(),
                &DisplayInfo::default(),
                &HD,
            );
        }
        let frozen = controller.pid().integral();
        assert!(frozen > -100.0);
        controller.update(
            &frame(3.0 * target_ms()),
            &FrameRateOptions::default(),
            &DisplayInfo::default(),
            &HD,
        );
        assert_relative_eq!(controller.pid().integral(), frozen);
    }

    // ── Helpers ──

    #[test]
    fn test_rounding_to_pixel_grid() {
        let rounded = round_to_pixel_grid(Vec2::new(0.73, 1.0), &HD);
        assert_relative_eq!(rounded.x * 1920.0, 1400.0, epsilon = 1e-3);
        assert_eq!(rounded.y, 1.0);
    }

    #[test]
    fn test_distribute_area_preserves_area() {
        for area in [0.9, 0.6, 0.4, 0.2] {
            let s = distribute_area(area, &HD, false);
            assert_relative_eq!(s.x * s.y, area, epsilon = 1e-5);
            assert!(s.x <= s.y + 1e-6);
        }
        let s = distribute_area(0.2, &HD, false);
        assert_relative_eq!(s.x, s.y, epsilon = 1e-5);

        let portrait = Viewport::new(1080, 1920);
        let s = distribute_area(0.9, &portrait, false);
        assert_relative_eq!(s.x, 1.0);
        assert_relative_eq!(s.y, 0.9);
    }

    #[test]
    fn test_options_sanitize() {
        let options = DynamicResolutionOptions {
            enabled: true,
            min_scale: Vec2::splat(0.0),
            max_scale: Vec2::splat(4.0),
            sharpness: 5.0,
            ..Default::default()
        }
        .sanitized(true);
        assert_relative_eq!(options.min_scale.x, 1.0 / 1024.0);
        assert_relative_eq!(options.max_scale.y, 2.0);
        assert_relative_eq!(options.sharpness, 2.0);
    }

    #[test]
    fn test_frame_rate_options_sanitize() {
        let options = FrameRateOptions {
            head_room_ratio: 1.0,
            scale_rate: -1.0,
            interval: 0,
        }
        .sanitized();
        assert_eq!(options.interval, 1);
        assert_relative_eq!(options.head_room_ratio, 0.9);
        assert_relative_eq!(options.scale_rate, 0.125);

        let options = FrameRateOptions {
            head_room_ratio: -0.5,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(options.head_room_ratio, 0.0);
        assert_eq!(FrameRateOptions::default().sanitized(), FrameRateOptions::default());
    }

    #[test]
    fn test_sanitized_zero_interval_keeps_budget_finite() {
        let mut controller = enabled_controller();
        let frame_rate = FrameRateOptions::from_ron_str("(interval: 0)").unwrap().sanitized();
        for _ in 0..10 {
            controller.update(&frame(target_ms()), &frame_rate, &DisplayInfo::default(), &HD);
        }
        let pid = controller.pid();
        assert!(pid.error().is_finite() && pid.integral().is_finite() && pid.derivative().is_finite());
        assert_eq!(controller.scale(), Vec2::ONE);
    }

    #[test]
    fn test_options_from_ron() {
        let options =
            DynamicResolutionOptions::from_ron_str("(enabled: true, min_scale: (x: 0.25, y: 0.5))")
                .unwrap();
        assert!(options.enabled);
        assert_relative_eq!(options.min_scale.x, 0.25);
        assert_eq!(options.max_scale, Vec2::ONE);

        let frame_rate = FrameRateOptions::from_ron_str("(interval: 2)").unwrap();
        assert_eq!(frame_rate.interval, 2);
        assert_relative_eq!(frame_rate.scale_rate, 0.125);
    }
}
