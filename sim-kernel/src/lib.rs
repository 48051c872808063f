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
//! # sim-kernel
//!
//! The simulation core of a small 2D game engine: an ECS component store
//! with presence queries, a staged parallel system scheduler, and a
//! swept-AABB platformer physics loop.
//!
//! ## Features
//!
//! - **Component store**: thread-safe entity/component/resource storage
//! - **Queries**: select entities by which component types they own or lack
//! - **Scheduler**: Startup systems joined once, Update systems fanned out
//!   over a worker pool every tick
//! - **Physics**: swept AABB collision with layers, masks, triggers and hit
//!   callbacks
//! - **Parallelization**: enabled by the default `parallel` feature
//!
//! ## Example
//!
//! ```rust
//! use glam::Vec2;
//! use sim_kernel::ecs::{Component, QueryFilter, Stage};
//! use sim_kernel::physics::{BodyDesc, PhysicsSystem, PhysicsWorld};
//! use sim_kernel::{EngineConfig, Simulation};
//!
//! struct Player;
//! impl Component for Player {}
//!
//! let mut sim = Simulation::new(EngineConfig::default()).unwrap();
//! let physics = PhysicsSystem::new(PhysicsWorld::default());
//! let bodies = physics.handle();
//! sim.register_system(physics, Stage::Update);
//!
//! let player = sim.world().create_entity();
//! sim.world().add_component(player, Player);
//! let body = bodies
//!     .lock()
//!     .create_body(BodyDesc::new(Vec2::new(0.0, 10.0), Vec2::ONE))
//!     .unwrap();
//!
//! sim.tick(1.0 / 60.0).unwrap();
//!
//! assert_eq!(sim.world().query_entities(&QueryFilter::new().with::<Player>()), vec![player]);
//! assert!(bodies.lock().body(body).unwrap().position().y < 10.0);
//! ```

#![warn(missing_docs)]

/// Simulation driver
pub mod app;

/// Generational slot storage
pub mod arena;

/// Engine and physics configuration
pub mod config;

/// Entity Component System implementation
pub mod ecs;

/// Error types
pub mod error;

/// 2D swept-AABB physics
pub mod physics;

/// Frame clock
pub mod time;

pub use app::Simulation;
pub use config::{EngineConfig, PhysicsConfig};
pub use ecs::{Entity, World};
pub use error::{BoxError, ConfigError, PhysicsError, SchedulerError, SystemResult};
pub use time::Time;
