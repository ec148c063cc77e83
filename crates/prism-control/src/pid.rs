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

//! A small parallel-form PID controller with anti-windup.

use prism_core::math::clamp;

/// Parallel-form PID controller.
///
/// The output is `kp * e + ki * integral(e) + kd * de/dt`. The integral is kept
/// within configurable limits and can be frozen while the actuator saturates.
/// Outputs falling strictly inside the dead-band are reported as zero.
#[derive(Debug, Clone, PartialEq)]
pub struct PidController {
    kp: f32,
    ki: f32,
    kd: f32,
    integral_limit_low: f32,
    integral_limit_high: f32,
    output_dead_band_low: f32,
    output_dead_band_high: f32,
    integral_inhibition: bool,
    last_error: f32,
    integral: f32,
    derivative: f32,
}

impl Default for PidController {
    fn default() -> Self {
        Self {
            kp: 0.1,
            ki: 0.0,
            kd: 0.0,
            integral_limit_low: f32::NEG_INFINITY,
            integral_limit_high: f32::INFINITY,
            output_dead_band_low: 0.0,
            output_dead_band_high: 0.0,
            integral_inhibition: false,
            last_error: 0.0,
            integral: 0.0,
            derivative: 0.0,
        }
    }
}

impl PidController {
    /// Creates a controller with the default gains.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the proportional, integral and derivative gains.
    pub fn set_parallel_gains(&mut self, kp: f32, ki: f32, kd: f32) {
        self.kp = kp;
        self.ki = ki;
        self.kd = kd;
    }

    /// Bounds the accumulated integral to `[low, high]`.
    pub fn set_integral_limits(&mut self, low: f32, high: f32) {
        self.integral_limit_low = low;
        self.integral_limit_high = high;
    }

    /// Outputs strictly between `low` and `high` are reported as zero.
    pub fn set_output_dead_band(&mut self, low: f32, high: f32) {
        self.output_dead_band_low = low;
        self.output_dead_band_high = high;
    }

    /// While enabled, the integral term stops accumulating.
    pub fn set_integral_inhibition_enabled(&mut self, enabled: bool) {
        self.integral_inhibition = enabled;
    }

    /// Feeds one measurement and returns the controller output.
    pub fn update(&mut self, measure: f32, target: f32, dt: f32) -> f32 {
        let error = target - measure;

        let mut integral = if self.integral_inhibition {
            self.integral
        } else {
            self.integral + error * dt
        };
        integral = clamp(integral, self.integral_limit_low, self.integral_limit_high);

        let derivative = (error - self.last_error) / dt;

        let mut out = self.kp * error + self.ki * integral + self.kd * derivative;
        if out > self.output_dead_band_low && out < self.output_dead_band_high {
            out = 0.0;
        }

        self.last_error = error;
        self.integral = integral;
        self.derivative = derivative;
        out
    }

    /// Error of the last update.
    pub fn error(&self) -> f32 {
        self.last_error
    }

    /// Accumulated integral.
    pub fn integral(&self) -> f32 {
        self.integral
    }

    /// Derivative of the last update.
    pub fn derivative(&self) -> f32 {
        self.derivative
    }
}
