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
//! Collision math
//!
//! Pure functions over axis-aligned bounding boxes. Box/box overlap is
//! reduced to a point/box test by taking the Minkowski difference of the two
//! boxes and checking whether it contains the origin. Swept tests cast the
//! moving box's center as a ray against the other box grown by the moving
//! box's half-size (the slab method).

use glam::Vec2;

/// Axis-aligned bounding box stored as center and half-extent
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Aabb {
    /// Center of the box
    pub position: Vec2,
    /// Half of the box size on each axis
    pub half_size: Vec2,
}

impl Aabb {
    /// Create a box from its center and half-extent
    pub fn new(position: Vec2, half_size: Vec2) -> Self {
        Aabb {
            position,
            half_size,
        }
    }

    /// Create a box from its center and full size
    pub fn from_size(position: Vec2, size: Vec2) -> Self {
        Aabb::new(position, size / 2.0)
    }

    /// Full size of the box
    pub fn size(&self) -> Vec2 {
        self.half_size * 2.0
    }

    /// Lower-left and upper-right corners
    pub fn min_max(&self) -> (Vec2, Vec2) {
        (
            self.position - self.half_size,
            self.position + self.half_size,
        )
    }

    /// Check whether the origin lies inside the box, bounds included
    pub fn contains_origin(&self) -> bool {
        point_in_aabb(Vec2::ZERO, self)
    }
}

/// Whether a [`Hit`] came from a sweep or from a stationary overlap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitKind {
    /// Time of impact along a swept displacement
    Swept,
    /// Bodies already overlap; time, position and normal are not populated
    Overlap,
}

/// Collision result
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// How the hit was found
    pub kind: HitKind,
    /// Fraction of the displacement travelled before contact
    ///
    /// Negative when the ray started inside the box.
    pub time: f32,
    /// Center position at contact
    pub position: Vec2,
    /// Axis-aligned unit normal of the surface hit
    pub normal: Vec2,
    /// Slot index of the body or static body hit
    pub other: usize,
}

impl Hit {
    /// Overlap-only hit against slot `other`
    pub fn overlap(other: usize) -> Self {
        Hit {
            kind: HitKind::Overlap,
            time: 0.0,
            position: Vec2::ZERO,
            normal: Vec2::ZERO,
            other,
        }
    }
}

/// Check whether `point` lies inside `aabb`, bounds included
pub fn point_in_aabb(point: Vec2, aabb: &Aabb) -> bool {
    let (min, max) = aabb.min_max();
    point.x >= min.x && point.x <= max.x && point.y >= min.y && point.y <= max.y
}

/// Check whether two boxes overlap or touch
pub fn aabb_intersect_aabb(a: &Aabb, b: &Aabb) -> bool {
    minkowski_difference(a, b).contains_origin()
}

/// Box whose center is `a - b` and whose half-size is the sum of both
pub fn minkowski_difference(a: &Aabb, b: &Aabb) -> Aabb {
    Aabb::new(a.position - b.position, a.half_size + b.half_size)
}

/// Smallest axis-aligned vector that moves `aabb`'s boundary onto the origin
///
/// Expects a Minkowski difference that already contains the origin. Bounds
/// are compared in the order min.x, max.x, min.y, max.y and the first
/// strictly smallest one wins.
pub fn penetration_vector(aabb: &Aabb) -> Vec2 {
    let (min, max) = aabb.min_max();
    let mut min_dist = min.x.abs();
    let mut result = Vec2::new(min.x, 0.0);

    if max.x.abs() < min_dist {
        min_dist = max.x.abs();
        result = Vec2::new(max.x, 0.0);
    }
    if min.y.abs() < min_dist {
        min_dist = min.y.abs();
        result = Vec2::new(0.0, min.y);
    }
    if max.y.abs() < min_dist {
        result = Vec2::new(0.0, max.y);
    }
    result
}

fn axis_sign(value: f32) -> f32 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Time of impact of a ray from `origin` along `displacement` with `aabb`
///
/// Uses the slab method. On an axis with no displacement the origin must be
/// strictly inside the slab. A zero-length ray never hits. The returned hit
/// has `other` set to 0; callers fill it in.
pub fn ray_intersect_aabb(origin: Vec2, displacement: Vec2, aabb: &Aabb) -> Option<Hit> {
    let (min, max) = aabb.min_max();
    let mut last_entry = f32::NEG_INFINITY;
    let mut first_exit = f32::INFINITY;

    for axis in 0..2 {
        if displacement[axis] != 0.0 {
            let t1 = (min[axis] - origin[axis]) / displacement[axis];
            let t2 = (max[axis] - origin[axis]) / displacement[axis];
            last_entry = last_entry.max(t1.min(t2));
            first_exit = first_exit.min(t1.max(t2));
        } else if origin[axis] <= min[axis] || origin[axis] >= max[axis] {
            return None;
        }
    }

    if last_entry == f32::NEG_INFINITY {
        return None;
    }
    if !(first_exit > last_entry && first_exit > 0.0 && last_entry < 1.0) {
        return None;
    }

    let position = origin + displacement * last_entry;
    let offset = position - aabb.position;
    let depth_x = aabb.half_size.x - offset.x.abs();
    let depth_y = aabb.half_size.y - offset.y.abs();
    let normal = if depth_x < depth_y {
        Vec2::new(axis_sign(offset.x), 0.0)
    } else {
        Vec2::new(0.0, axis_sign(offset.y))
    };

    Some(Hit {
        kind: HitKind::Swept,
        time: last_entry,
        position,
        normal,
        other: 0,
    })
}
