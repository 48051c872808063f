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
//! Component presence queries
//!
//! A query selects entities that own every type in a `with` set and none of
//! the types in a `without` set. Component queries additionally require a
//! target type and return the target component of each match.
//!
//! There is no index: every query scans all entities and their component
//! sequences, O(entities x components x |with + without|). This is fine for
//! the entity counts of a small game and is the first thing to revisit if
//! populations grow.
//!
//! # Example
//!
//! ```
//! use sim_kernel::ecs::{Component, QueryFilter, World};
//!
//! struct Player;
//! impl Component for Player {}
//! struct Frozen;
//! impl Component for Frozen {}
//!
//! let world = World::new();
//! let a = world.create_entity();
//! world.add_component(a, Player);
//! let b = world.create_entity();
//! world.add_component(b, Player);
//! world.add_component(b, Frozen);
//!
//! let active = world.query_entities(&QueryFilter::new().with::<Player>().without::<Frozen>());
//! assert_eq!(active, vec![a]);
//! ```

use crate::ecs::component::{tag_of, Component, ComponentRef};
use crate::ecs::{Entity, World};
use std::any::TypeId;
use std::sync::Arc;

/// With/without predicate over component types
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryFilter {
    with: Vec<TypeId>,
    without: Vec<TypeId>,
}

impl QueryFilter {
    /// Create a filter that matches every entity
    pub fn new() -> Self {
        Self::default()
    }

    /// Require component `C`
    pub fn with<C: Component>(mut self) -> Self {
        self.with.push(tag_of::<C>());
        self
    }

    /// Exclude entities that own component `C`
    pub fn without<C: Component>(mut self) -> Self {
        self.without.push(tag_of::<C>());
        self
    }

    /// Required type tags
    pub fn with_tags(&self) -> &[TypeId] {
        &self.with
    }

    /// Excluded type tags
    pub fn without_tags(&self) -> &[TypeId] {
        &self.without
    }
}

fn owns(components: &[ComponentRef], tag: TypeId) -> bool {
    components.iter().any(|component| component.tag() == tag)
}

fn matches(components: &[ComponentRef], with: &[TypeId], without: &[TypeId]) -> bool {
    // `all` stops at the first miss, `any` at the first hit
    with.iter().all(|tag| owns(components, *tag))
        && !without.iter().any(|tag| owns(components, *tag))
}

impl World {
    /// Target components of every entity matching the predicate
    ///
    /// An entity matches if it owns `target`, every type in `with`, and
    /// none of the types in `without`. If an entity holds several `target`
    /// components, the first one is returned. An empty result means nothing
    /// matched.
    pub fn component_query(
        &self,
        target: TypeId,
        with: &[TypeId],
        without: &[TypeId],
    ) -> Vec<ComponentRef> {
        let storage = self.storage.read();
        storage
            .components
            .values()
            .filter_map(|components| {
                let found = components.iter().find(|c| c.tag() == target)?;
                matches(components, with, without).then(|| found.clone())
            })
            .collect()
    }

    /// Ids of every entity matching the predicate
    ///
    /// With an empty filter this returns every entity that holds at least
    /// one component.
    pub fn entity_query(&self, with: &[TypeId], without: &[TypeId]) -> Vec<Entity> {
        let storage = self.storage.read();
        storage
            .components
            .iter()
            .filter(|(_, components)| matches(components, with, without))
            .map(|(entity, _)| *entity)
            .collect()
    }

    /// Typed form of [`component_query`](Self::component_query)
    pub fn query<C: Component>(&self, filter: &QueryFilter) -> Vec<Arc<C>> {
        self.component_query(tag_of::<C>(), &filter.with, &filter.without)
            .iter()
            .filter_map(ComponentRef::downcast::<C>)
            .collect()
    }

    /// Typed form of [`entity_query`](Self::entity_query)
    pub fn query_entities(&self, filter: &QueryFilter) -> Vec<Entity> {
        self.entity_query(&filter.with, &filter.without)
    }
}
