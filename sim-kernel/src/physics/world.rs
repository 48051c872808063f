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
//! Physics state and the per-tick simulation loop
//!
//! Each tick integrates every active body's velocity and then runs a fixed
//! number of sub-steps. A sub-step sweeps the body along its displacement
//! against static bodies (blocking) and other dynamic bodies (events only),
//! then pushes it out of any static body it still overlaps and reports
//! overlaps with dynamic bodies.
//!
//! Bodies are resolved one at a time in slot order, so body `i` sees bodies
//! `0..i` at their already-moved positions.

use crate::arena::SlotArena;
use crate::config::PhysicsConfig;
use crate::error::{ConfigError, PhysicsError};
use crate::physics::body::{Body, BodyDesc, BodyHandle, StaticBody, StaticBodyId};
use crate::physics::math::{
    aabb_intersect_aabb, minkowski_difference, penetration_vector, ray_intersect_aabb, Aabb, Hit,
};
use glam::Vec2;
use log::{debug, trace, warn};

/// Owner of all dynamic and static bodies
#[derive(Debug, Default)]
pub struct PhysicsWorld {
    config: PhysicsConfig,
    bodies: SlotArena<Body>,
    static_bodies: Vec<StaticBody>,
}

fn validate_size(size: Vec2) -> Result<(), PhysicsError> {
    if size.is_finite() && size.x >= 0.0 && size.y >= 0.0 {
        Ok(())
    } else {
        Err(PhysicsError::InvalidSize {
            width: size.x,
            height: size.y,
        })
    }
}

/// Box `target` grown by `half_size`, so a point sweep stands in for a box sweep
fn grown(target: &Aabb, half_size: Vec2) -> Aabb {
    Aabb::new(target.position, target.half_size + half_size)
}

/// Pick between the best hit so far and a new candidate
///
/// The earlier hit wins. On equal time the candidate wins if its normal lies
/// on the dominant axis of the displacement.
fn closer(current: Option<Hit>, candidate: Hit, displacement: Vec2) -> Hit {
    let Some(current) = current else {
        return candidate;
    };
    if candidate.time < current.time {
        return candidate;
    }
    if candidate.time == current.time {
        let horizontal = displacement.x.abs() > displacement.y.abs() && candidate.normal.x != 0.0;
        let vertical = displacement.y.abs() > displacement.x.abs() && candidate.normal.y != 0.0;
        if horizontal || vertical {
            return candidate;
        }
    }
    current
}

impl PhysicsWorld {
    /// Create an empty world with a validated configuration
    pub fn new(config: PhysicsConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(PhysicsWorld {
            config,
            bodies: SlotArena::new(),
            static_bodies: Vec::new(),
        })
    }

    /// Current configuration
    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Replace the configuration
    pub fn set_config(&mut self, config: PhysicsConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// Create a dynamic body in the lowest free slot
    pub fn create_body(&mut self, desc: BodyDesc) -> Result<BodyHandle, PhysicsError> {
        validate_size(desc.size)?;
        let handle = self.bodies.insert_with(|handle| desc.build(handle));
        debug!("created body {handle}");
        Ok(handle)
    }

    /// Create a static body
    pub fn create_static_body(
        &mut self,
        position: Vec2,
        size: Vec2,
        layer: u8,
    ) -> Result<StaticBodyId, PhysicsError> {
        validate_size(size)?;
        let id = StaticBodyId(self.static_bodies.len());
        self.static_bodies.push(StaticBody {
            aabb: Aabb::from_size(position, size),
            layer,
            id,
        });
        debug!("created static body {} at {position}", id.0);
        Ok(id)
    }

    /// Create a kinematic body at rest that only reports overlaps
    pub fn create_trigger<F>(
        &mut self,
        position: Vec2,
        size: Vec2,
        layer: u8,
        mask: u8,
        on_hit: F,
    ) -> Result<BodyHandle, PhysicsError>
    where
        F: Fn(&mut Body, &Body, &Hit) + Send + Sync + 'static,
    {
        self.create_body(
            BodyDesc::new(position, size)
                .with_layer(layer)
                .with_mask(mask)
                .kinematic()
                .with_on_hit(on_hit),
        )
    }

    /// Deactivate a body and free its slot for reuse
    ///
    /// Returns `false` if the handle is stale or unknown.
    pub fn destroy_body(&mut self, handle: BodyHandle) -> bool {
        if self.bodies.remove(handle).is_some() {
            debug!("destroyed body {handle}");
            true
        } else {
            warn!("destroy of unknown body {handle} ignored");
            false
        }
    }

    /// Body behind `handle`, if it is still active
    pub fn body(&self, handle: BodyHandle) -> Option<&Body> {
        self.bodies.get(handle)
    }

    /// Mutable body behind `handle`, if it is still active
    pub fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut Body> {
        self.bodies.get_mut(handle)
    }

    /// Static body by id
    pub fn static_body(&self, id: StaticBodyId) -> Option<&StaticBody> {
        self.static_bodies.get(id.0)
    }

    /// Active bodies in slot order
    pub fn bodies(&self) -> impl Iterator<Item = (BodyHandle, &Body)> + '_ {
        self.bodies.iter()
    }

    /// All static bodies
    pub fn static_bodies(&self) -> &[StaticBody] {
        &self.static_bodies
    }

    /// Whether `handle` refers to an active body
    pub fn is_active(&self, handle: BodyHandle) -> bool {
        self.bodies.contains(handle)
    }

    /// Number of body slots, active or free
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Number of active bodies
    pub fn active_body_count(&self) -> usize {
        self.bodies.active_count()
    }

    /// Number of static bodies
    pub fn static_body_count(&self) -> usize {
        self.static_bodies.len()
    }

    /// Advance the simulation by `delta` seconds
    pub fn step(&mut self, delta: f32) {
        let iterations = self.config.iterations;
        let scale = delta * (1.0 / iterations as f32);

        for index in 0..self.bodies.len() {
            let Some(body) = self.bodies.get_index_mut(index) else {
                continue;
            };
            if !body.kinematic {
                body.velocity.y += self.config.gravity;
                body.velocity.y = body.velocity.y.max(self.config.terminal_velocity);
            }
            body.velocity += body.acceleration;
            let displacement = body.velocity * scale;

            for _ in 0..iterations {
                self.sweep_response(index, displacement);
                self.stationary_response(index);
            }
        }
    }

    fn sweep_static(&self, body: &Body, displacement: Vec2) -> Option<Hit> {
        let mut best = None;
        for other in &self.static_bodies {
            if !body.collides_with(other.layer) {
                continue;
            }
            let target = grown(&other.aabb, body.aabb.half_size);
            if let Some(mut hit) = ray_intersect_aabb(body.aabb.position, displacement, &target) {
                hit.other = other.id.0;
                best = Some(closer(best, hit, displacement));
            }
        }
        best
    }

    fn sweep_bodies(&self, index: usize, body: &Body, displacement: Vec2) -> Option<Hit> {
        let mut best = None;
        for (handle, other) in self.bodies.iter() {
            if handle.index() == index || !body.collides_with(other.layer) {
                continue;
            }
            let target = grown(&other.aabb, body.aabb.half_size);
            if let Some(mut hit) = ray_intersect_aabb(body.aabb.position, displacement, &target) {
                hit.other = handle.index();
                best = Some(closer(best, hit, displacement));
            }
        }
        best
    }

    fn sweep_response(&mut self, index: usize, displacement: Vec2) {
        let Some(body) = self.bodies.get_index(index) else {
            return;
        };
        let static_hit = self.sweep_static(body, displacement);
        let dynamic_hit = self.sweep_bodies(index, body, displacement);
        let on_hit = body.on_hit.clone();

        if let (Some(hit), Some(on_hit)) = (dynamic_hit, on_hit) {
            if let Some((body, other)) = self.bodies.pair_mut(index, hit.other) {
                trace!("body {} swept into body {} at t={}", body.handle, other.handle, hit.time);
                on_hit(body, other, &hit);
            }
        }

        let Some(body) = self.bodies.get_index_mut(index) else {
            return;
        };
        let Some(hit) = static_hit else {
            body.aabb.position += displacement;
            return;
        };

        body.aabb.position = hit.position;
        if hit.normal.x != 0.0 {
            body.aabb.position.y += displacement.y;
            body.velocity.x = 0.0;
        } else if hit.normal.y != 0.0 {
            body.aabb.position.x += displacement.x;
            body.velocity.y = 0.0;
        }

        if let (Some(on_hit_static), Some(other)) =
            (body.on_hit_static.clone(), self.static_bodies.get(hit.other))
        {
            trace!("body {} hit static body {} at t={}", body.handle, hit.other, hit.time);
            on_hit_static(body, other, &hit);
        }
    }

    fn stationary_response(&mut self, index: usize) {
        let Some(body) = self.bodies.get_index_mut(index) else {
            return;
        };
        for other in &self.static_bodies {
            if !body.collides_with(other.layer) {
                continue;
            }
            let difference = minkowski_difference(&other.aabb, &body.aabb);
            if difference.contains_origin() {
                body.aabb.position += penetration_vector(&difference);
            }
        }

        let Some(on_hit) = body.on_hit.clone() else {
            return;
        };
        for other_index in 0..self.bodies.len() {
            let Some((body, other)) = self.bodies.pair_mut(index, other_index) else {
                continue;
            };
            if body.collides_with(other.layer) && aabb_intersect_aabb(&other.aabb, &body.aabb) {
                trace!("body {} overlaps body {}", body.handle, other.handle);
                on_hit(body, other, &Hit::overlap(other_index));
            }
        }
    }
}
