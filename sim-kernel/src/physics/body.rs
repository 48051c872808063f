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
//! Dynamic and static bodies

use crate::arena::Handle;
use crate::physics::math::{Aabb, Hit};
use glam::Vec2;
use std::fmt;
use std::sync::Arc;

/// Callback fired when a body meets another dynamic body
pub type OnHit = Arc<dyn Fn(&mut Body, &Body, &Hit) + Send + Sync>;

/// Callback fired when a body lands on a static body
pub type OnHitStatic = Arc<dyn Fn(&mut Body, &StaticBody, &Hit) + Send + Sync>;

/// Stable handle of a dynamic body
pub type BodyHandle = Handle<Body>;

/// Index of a static body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StaticBodyId(pub usize);

/// A moving box with velocity, collision filtering and hit callbacks
#[derive(Clone)]
pub struct Body {
    pub(crate) aabb: Aabb,
    pub(crate) velocity: Vec2,
    pub(crate) acceleration: Vec2,
    pub(crate) layer: u8,
    pub(crate) mask: u8,
    pub(crate) kinematic: bool,
    pub(crate) on_hit: Option<OnHit>,
    pub(crate) on_hit_static: Option<OnHitStatic>,
    pub(crate) handle: BodyHandle,
}

impl Body {
    /// Bounding box
    pub fn aabb(&self) -> &Aabb {
        &self.aabb
    }

    /// Center position
    pub fn position(&self) -> Vec2 {
        self.aabb.position
    }

    /// Move the body without sweeping
    pub fn set_position(&mut self, position: Vec2) {
        self.aabb.position = position;
    }

    /// Full size
    pub fn size(&self) -> Vec2 {
        self.aabb.size()
    }

    /// Half-extent
    pub fn half_size(&self) -> Vec2 {
        self.aabb.half_size
    }

    /// Velocity in units per second
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Set the velocity
    pub fn set_velocity(&mut self, velocity: Vec2) {
        self.velocity = velocity;
    }

    /// Per-tick velocity change
    pub fn acceleration(&self) -> Vec2 {
        self.acceleration
    }

    /// Set the per-tick velocity change
    pub fn set_acceleration(&mut self, acceleration: Vec2) {
        self.acceleration = acceleration;
    }

    /// Layer bits: what this body is
    pub fn layer(&self) -> u8 {
        self.layer
    }

    /// Mask bits: what this body collides with
    pub fn mask(&self) -> u8 {
        self.mask
    }

    /// Whether this body ignores gravity
    pub fn is_kinematic(&self) -> bool {
        self.kinematic
    }

    /// Handle this body was created under
    pub fn handle(&self) -> BodyHandle {
        self.handle
    }

    /// Whether this body's mask accepts `layer`
    pub fn collides_with(&self, layer: u8) -> bool {
        self.mask & layer != 0
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Body")
            .field("handle", &self.handle)
            .field("aabb", &self.aabb)
            .field("velocity", &self.velocity)
            .field("acceleration", &self.acceleration)
            .field("layer", &format_args!("{:#010b}", self.layer))
            .field("mask", &format_args!("{:#010b}", self.mask))
            .field("kinematic", &self.kinematic)
            .field("on_hit", &self.on_hit.is_some())
            .field("on_hit_static", &self.on_hit_static.is_some())
            .finish()
    }
}

/// An immovable box that dynamic bodies collide against
#[derive(Debug, Clone, PartialEq)]
pub struct StaticBody {
    pub(crate) aabb: Aabb,
    pub(crate) layer: u8,
    pub(crate) id: StaticBodyId,
}

impl StaticBody {
    /// Bounding box
    pub fn aabb(&self) -> &Aabb {
        &self.aabb
    }

    /// Center position
    pub fn position(&self) -> Vec2 {
        self.aabb.position
    }

    /// Full size
    pub fn size(&self) -> Vec2 {
        self.aabb.size()
    }

    /// Layer bits
    pub fn layer(&self) -> u8 {
        self.layer
    }

    /// Index of this static body
    pub fn id(&self) -> StaticBodyId {
        self.id
    }
}

/// Parameters for [`PhysicsWorld::create_body`](crate::physics::PhysicsWorld::create_body)
///
/// Defaults: zero velocity and acceleration, layer and mask `0xff`, not
/// kinematic, no callbacks.
///
/// ```
/// use glam::Vec2;
/// use sim_kernel::physics::{BodyDesc, PhysicsWorld};
///
/// let mut physics = PhysicsWorld::default();
/// let player = physics
///     .create_body(
///         BodyDesc::new(Vec2::new(0.0, 4.0), Vec2::new(1.0, 2.0))
///             .with_layer(0b01)
///             .with_mask(0b10),
///     )
///     .unwrap();
/// assert!(physics.is_active(player));
/// ```
#[derive(Clone)]
pub struct BodyDesc {
    pub(crate) position: Vec2,
    pub(crate) size: Vec2,
    pub(crate) velocity: Vec2,
    pub(crate) acceleration: Vec2,
    pub(crate) layer: u8,
    pub(crate) mask: u8,
    pub(crate) kinematic: bool,
    pub(crate) on_hit: Option<OnHit>,
    pub(crate) on_hit_static: Option<OnHitStatic>,
}

impl BodyDesc {
    /// Body centered at `position` with full `size`
    pub fn new(position: Vec2, size: Vec2) -> Self {
        BodyDesc {
            position,
            size,
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            layer: u8::MAX,
            mask: u8::MAX,
            kinematic: false,
            on_hit: None,
            on_hit_static: None,
        }
    }

    /// Set the initial velocity
    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    /// Set the per-tick velocity change
    pub fn with_acceleration(mut self, acceleration: Vec2) -> Self {
        self.acceleration = acceleration;
        self
    }

    /// Set the layer bits
    pub fn with_layer(mut self, layer: u8) -> Self {
        self.layer = layer;
        self
    }

    /// Set the mask bits
    pub fn with_mask(mut self, mask: u8) -> Self {
        self.mask = mask;
        self
    }

    /// Exempt the body from gravity
    pub fn kinematic(mut self) -> Self {
        self.kinematic = true;
        self
    }

    /// Callback for hits against other dynamic bodies
    pub fn with_on_hit<F>(mut self, on_hit: F) -> Self
    where
        F: Fn(&mut Body, &Body, &Hit) + Send + Sync + 'static,
    {
        self.on_hit = Some(Arc::new(on_hit));
        self
    }

    /// Callback for hits against static bodies
    pub fn with_on_hit_static<F>(mut self, on_hit_static: F) -> Self
    where
        F: Fn(&mut Body, &StaticBody, &Hit) + Send + Sync + 'static,
    {
        self.on_hit_static = Some(Arc::new(on_hit_static));
        self
    }

    pub(crate) fn build(self, handle: BodyHandle) -> Body {
        Body {
            aabb: Aabb::from_size(self.position, self.size),
            velocity: self.velocity,
            acceleration: self.acceleration,
            layer: self.layer,
            mask: self.mask,
            kinematic: self.kinematic,
            on_hit: self.on_hit,
            on_hit_static: self.on_hit_static,
            handle,
        }
    }
}

impl fmt::Debug for BodyDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BodyDesc")
            .field("position", &self.position)
            .field("size", &self.size)
            .field("velocity", &self.velocity)
            .field("layer", &self.layer)
            .field("mask", &self.mask)
            .field("kinematic", &self.kinematic)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::SlotArena;

    #[test]
    fn test_desc_defaults() {
        let mut arena: SlotArena<Body> = SlotArena::new();
        let handle = arena.insert_with(|h| BodyDesc::new(Vec2::new(1.0, 2.0), Vec2::new(2.0, 4.0)).build(h));
        let body = arena.get(handle).unwrap();

        assert_eq!(body.handle(), handle);
        assert_eq!(body.position(), Vec2::new(1.0, 2.0));
        assert_eq!(body.half_size(), Vec2::new(1.0, 2.0));
        assert_eq!(body.size(), Vec2::new(2.0, 4.0));
        assert_eq!(body.velocity(), Vec2::ZERO);
        assert_eq!(body.layer(), 0xff);
        assert_eq!(body.mask(), 0xff);
        assert!(!body.is_kinematic());
        assert!(body.on_hit.is_none());
    }

    #[test]
    fn test_mask_filter() {
        let mut arena: SlotArena<Body> = SlotArena::new();
        let handle = arena.insert_with(|h| {
            BodyDesc::new(Vec2::ZERO, Vec2::ONE)
                .with_layer(0b001)
                .with_mask(0b110)
                .build(h)
        });
        let body = arena.get(handle).unwrap();
        assert!(body.collides_with(0b010));
        assert!(!body.collides_with(0b001));
        assert!(!body.collides_with(0));
    }

    #[test]
    fn test_callbacks_are_stored() {
        let desc = BodyDesc::new(Vec2::ZERO, Vec2::ONE)
            .kinematic()
            .with_on_hit(|body, _, _| body.set_velocity(Vec2::ZERO))
            .with_on_hit_static(|_, _, _| {});
        assert!(desc.kinematic);
        assert!(desc.on_hit.is_some());
        assert!(desc.on_hit_static.is_some());
        assert!(format!("{desc:?}").contains("kinematic: true"));
    }
}
