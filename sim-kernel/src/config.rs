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
//! Startup-time configuration
//!
//! Configuration is plain data built in code. Loading it from a file is left
//! to the embedding application; values are checked once with `validate`.

use crate::error::ConfigError;

/// Physics constants consumed when a [`PhysicsWorld`](crate::physics::PhysicsWorld) is built
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsConfig {
    /// Signed change applied to `velocity.y` every tick (negative pulls down)
    pub gravity: f32,
    /// Lowest allowed `velocity.y` for bodies affected by gravity
    pub terminal_velocity: f32,
    /// Sweep/resolve sub-steps per tick
    pub iterations: u32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        PhysicsConfig {
            gravity: -79.0,
            terminal_velocity: -7000.0,
            iterations: 2,
        }
    }
}

impl PhysicsConfig {
    /// Create a new physics configuration
    pub fn new(gravity: f32, terminal_velocity: f32, iterations: u32) -> Self {
        PhysicsConfig {
            gravity,
            terminal_velocity,
            iterations,
        }
    }

    /// Set the per-tick gravity
    pub fn with_gravity(mut self, gravity: f32) -> Self {
        self.gravity = gravity;
        self
    }

    /// Set the terminal velocity
    pub fn with_terminal_velocity(mut self, terminal_velocity: f32) -> Self {
        self.terminal_velocity = terminal_velocity;
        self
    }

    /// Set the number of sub-steps per tick
    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    /// Check the configuration for values the physics loop cannot use
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.iterations == 0 {
            return Err(ConfigError::ZeroIterations);
        }
        if !self.gravity.is_finite() {
            return Err(ConfigError::NonFiniteGravity(self.gravity));
        }
        if !self.terminal_velocity.is_finite() || self.terminal_velocity > 0.0 {
            return Err(ConfigError::InvalidTerminalVelocity(self.terminal_velocity));
        }
        Ok(())
    }
}

/// Top-level configuration for a [`Simulation`](crate::app::Simulation)
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Target frames per second of the frame clock
    pub frame_rate: u32,
    /// Update workers per tick; 0 means one worker per Update system
    pub workers: usize,
    /// Physics constants
    pub physics: PhysicsConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            frame_rate: 60,
            workers: 0,
            physics: PhysicsConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Set the target frame rate
    pub fn with_frame_rate(mut self, frame_rate: u32) -> Self {
        self.frame_rate = frame_rate;
        self
    }

    /// Set the number of update workers
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set the physics constants
    pub fn with_physics(mut self, physics: PhysicsConfig) -> Self {
        self.physics = physics;
        self
    }

    /// Check every nested value
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frame_rate == 0 {
            return Err(ConfigError::ZeroFrameRate);
        }
        self.physics.validate()
    }
}
