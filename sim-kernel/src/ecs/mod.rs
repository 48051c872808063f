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
//! Entity Component System (ECS) core implementation
//!
//! This module provides:
//! - The component/resource store ([`World`])
//! - With/without queries over component presence
//! - Staged parallel system execution ([`Scheduler`])
//! - Slot-based entity management linked to physics bodies ([`EntityTable`])

mod component;
mod entity;
mod query;
mod scheduler;
mod system;
mod world;

pub use component::{downcast_all, tag_of, Component, ComponentRef, Resource, TypeTag};
pub use entity::{Entity, EntityHandle, EntityRecord, EntityTable};
pub use query::QueryFilter;
pub use scheduler::Scheduler;
pub use system::{FnSystem, Stage, System, SystemContext};
pub use world::World;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_world_creation() {
        let world = World::new();
        assert_eq!(world.entity_count(), 0);
    }

    #[test]
    fn test_entity_creation() {
        struct Marker;
        impl Component for Marker {}

        let world = World::new();
        let entity = world.create_entity();
        world.add_component(entity, Marker);
        assert_eq!(world.entity_count(), 1);
        assert_eq!(world.query_entities(&QueryFilter::new().with::<Marker>()), vec![entity]);
    }
}
