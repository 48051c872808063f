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
//! 2D swept-AABB physics
//!
//! This module provides:
//! - Pure collision math over axis-aligned boxes ([`math`])
//! - Dynamic bodies, static bodies and triggers
//! - The per-tick sweep/stationary loop ([`PhysicsWorld::step`])
//! - [`PhysicsSystem`] to run the loop from the scheduler
//!
//! Collision filtering uses 8-bit layers and masks: body A responds to body
//! B only when `A.mask & B.layer != 0`.

mod body;
pub mod math;
mod system;
mod world;

pub use body::{Body, BodyDesc, BodyHandle, OnHit, OnHitStatic, StaticBody, StaticBodyId};
pub use math::{
    aabb_intersect_aabb, minkowski_difference, penetration_vector, point_in_aabb,
    ray_intersect_aabb, Aabb, Hit, HitKind,
};
pub use system::PhysicsSystem;
pub use world::PhysicsWorld;
