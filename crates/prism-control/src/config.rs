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

//! Controller tuning and RON configuration loading.

use log::{info, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable holding a RON [`PidGains`] override.
///
/// Only read in debug builds.
pub const PID_GAINS_ENV: &str = "PRISM_PID_GAINS";

/// Errors raised while loading controller configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document is not valid RON for the requested type.
    #[error("Invalid configuration document: {0}")]
    Parse(String),
    /// A value parsed but lies outside its accepted range.
    #[error("'{field}' is out of range: {value}")]
    OutOfRange {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: f32,
    },
}

/// Parses a RON document into any deserializable configuration type.
pub fn from_ron_str<T: DeserializeOwned>(document: &str) -> Result<T, ConfigError> {
    ron::from_str(document).map_err(|e| ConfigError::Parse(e.to_string()))
}

/// Parallel PID gains.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PidGains {
    /// Proportional gain.
    pub kp: f32,
    /// Integral gain.
    pub ki: f32,
    /// Derivative gain.
    pub kd: f32,
}

impl PidGains {
    /// Integral gain used when the gains are derived from the scale rate.
    pub const DEFAULT_KI: f32 = 0.002;

    /// Gains derived from the frame-rate scale rate.
    pub fn derived(scale_rate: f32) -> Self {
        Self {
            kp: 1.0 - (-scale_rate).exp(),
            ki: Self::DEFAULT_KI,
            kd: 0.0,
        }
    }

    /// Parses and validates gains from a RON document such as `(kp: 0.1, ki: 0.002, kd: 0.0)`.
    pub fn from_ron_str(document: &str) -> Result<Self, ConfigError> {
        let gains: Self = from_ron_str(document)?;
        gains.validate()?;
        Ok(gains)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [("kp", self.kp), ("ki", self.ki), ("kd", self.kd)] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::OutOfRange { field, value });
            }
        }
        Ok(())
    }
}

/// Where the controller gains come from.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum PidTuning {
    /// Gains follow the frame-rate scale rate.
    #[default]
    Derived,
    /// Fixed gains, typically a developer override.
    Fixed(PidGains),
}

impl PidTuning {
    /// Resolves the gains for the given scale rate.
    pub fn gains(&self, scale_rate: f32) -> PidGains {
        match self {
            PidTuning::Derived => PidGains::derived(scale_rate),
            PidTuning::Fixed(gains) => *gains,
        }
    }

    /// Reads [`PID_GAINS_ENV`] in debug builds, falling back to derived gains.
    pub fn from_env() -> Self {
        if cfg!(debug_assertions) {
            Self::from_override(std::env::var(PID_GAINS_ENV).ok().as_deref())
        } else {
            PidTuning::Derived
        }
    }

    fn from_override(document: Option<&str>) -> Self {
        let Some(document) = document else {
            return PidTuning::Derived;
        };
        match PidGains::from_ron_str(document) {
            Ok(gains) => {
                info!("Using PID gains override from {}: {:?}", PID_GAINS_ENV, gains);
                PidTuning::Fixed(gains)
            }
            Err(e) => {
                warn!("Ignoring {}: {}", PID_GAINS_ENV, e);
                PidTuning::Derived
            }
        }
    }
}
