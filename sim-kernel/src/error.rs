// Copyright 2025 John Brosnihan
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
//! Error types
//!
//! The simulation core has a small error surface: invalid configuration,
//! invalid body geometry, and failures reported by systems or by the
//! worker pool. Lookups never error; they return `Option`.

use crate::ecs::Stage;
use thiserror::Error;

/// Boxed error type returned by system bodies
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type returned by system bodies
pub type SystemResult = Result<(), BoxError>;

/// Invalid startup configuration
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// Physics must run at least one sub-step per tick
    #[error("sub-step iterations must be at least 1")]
    ZeroIterations,

    /// The frame clock needs a non-zero target rate
    #[error("frame rate must be greater than zero")]
    ZeroFrameRate,

    /// Gravity must be a finite number
    #[error("gravity must be finite, got {0}")]
    NonFiniteGravity(f32),

    /// Terminal velocity is a lower bound on `velocity.y`
    #[error("terminal velocity must be finite and not positive, got {0}")]
    InvalidTerminalVelocity(f32),
}

/// Invalid physics input
#[derive(Debug, Error, PartialEq)]
pub enum PhysicsError {
    /// Body sizes must be finite and non-negative on both axes
    #[error("body size must be finite and non-negative, got ({width}, {height})")]
    InvalidSize {
        /// Requested width
        width: f32,
        /// Requested height
        height: f32,
    },
}

/// Failure while running scheduled systems
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// A worker thread could not be spawned
    #[error("failed to spawn update worker")]
    Spawn(#[source] std::io::Error),

    /// The work queue was closed before every system was queued
    #[error("update work queue closed while loading systems")]
    QueueClosed,

    /// One or more systems returned an error; the first one is attached
    #[error("{failed} {stage:?} system(s) failed, first was `{name}`")]
    SystemFailed {
        /// Stage the failing systems belong to
        stage: Stage,
        /// Name of the first failing system
        name: String,
        /// Total number of failures in this run
        failed: usize,
        /// Error returned by the first failing system
        #[source]
        source: BoxError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_messages() {
        assert_eq!(
            ConfigError::ZeroIterations.to_string(),
            "sub-step iterations must be at least 1"
        );
        assert!(ConfigError::InvalidTerminalVelocity(5.0)
            .to_string()
            .contains("got 5"));
    }

    #[test]
    fn test_system_failed_message() {
        let err = SchedulerError::SystemFailed {
            stage: Stage::Startup,
            name: "load".to_string(),
            failed: 2,
            source: "boom".into(),
        };
        assert_eq!(err.to_string(), "2 Startup system(s) failed, first was `load`");
        assert!(std::error::Error::source(&err).is_some());
    }
}
