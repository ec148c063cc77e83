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

//! # Prism Control
//!
//! The closed-loop part of frame preparation: a PID controller driving the render
//! scale from measured frame times, its configuration, and a short history of
//! controller samples for debugging tools.

#![warn(missing_docs)]

pub mod config;
pub mod dynamic_resolution;
pub mod metrics;
pub mod pid;

pub use config::{from_ron_str, ConfigError, PidGains, PidTuning, PID_GAINS_ENV};
pub use dynamic_resolution::{
    DisplayInfo, DynamicResolutionController, DynamicResolutionOptions, FrameInfo, FrameRateOptions,
};
pub use metrics::{FrameHistory, FrameHistoryEntry, RingBuffer, FRAME_HISTORY_SIZE};
pub use pid::PidController;
