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
//! System execution framework
//!
//! Systems contain the logic that operates on the world. They take `&self`
//! and may run on several threads at once, so any state they keep must be
//! synchronized. Everything a system needs from the current frame arrives
//! through its [`SystemContext`].

use crate::ecs::World;
use crate::error::SystemResult;
use crate::time::Time;

/// Scheduling phase a system is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Runs once when the simulation starts
    Startup,
    /// Runs once per tick
    Update,
}

/// Per-call view of the simulation handed to systems
#[derive(Clone, Copy)]
pub struct SystemContext<'a> {
    world: &'a World,
    time: &'a Time,
}

impl<'a> SystemContext<'a> {
    /// Create a context over `world` for the frame described by `time`
    pub fn new(world: &'a World, time: &'a Time) -> Self {
        SystemContext { world, time }
    }

    /// The component/resource store
    pub fn world(&self) -> &'a World {
        self.world
    }

    /// The frame clock
    pub fn time(&self) -> &'a Time {
        self.time
    }
}

/// Trait for systems that operate on the world
pub trait System: Send + Sync {
    /// Execute the system once
    fn run(&self, ctx: &SystemContext<'_>) -> SystemResult;

    /// Get the name of this system for debugging
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// A named closure used as a system
pub struct FnSystem<F> {
    name: String,
    f: F,
}

impl<F> FnSystem<F>
where
    F: Fn(&SystemContext<'_>) -> SystemResult + Send + Sync,
{
    /// Wrap `f` under `name`
    pub fn new(name: impl Into<String>, f: F) -> Self {
        FnSystem {
            name: name.into(),
            f,
        }
    }
}

impl<F> System for FnSystem<F>
where
    F: Fn(&SystemContext<'_>) -> SystemResult + Send + Sync,
{
    fn run(&self, ctx: &SystemContext<'_>) -> SystemResult {
        (self.f)(ctx)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSystem {
        runs: AtomicUsize,
    }

    impl System for CountingSystem {
        fn run(&self, _ctx: &SystemContext<'_>) -> SystemResult {
            self.runs.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn test_default_name() {
        let system = CountingSystem {
            runs: AtomicUsize::new(0),
        };
        assert!(system.name().ends_with("CountingSystem"));

        let world = World::new();
        let time = Time::default();
        system.run(&SystemContext::new(&world, &time)).unwrap();
        assert_eq!(system.runs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_fn_system() {
        let system = FnSystem::new("spawner", |ctx: &SystemContext<'_>| {
            ctx.world().create_entity();
            Ok(())
        });
        assert_eq!(system.name(), "spawner");

        let world = World::new();
        let time = Time::default();
        system.run(&SystemContext::new(&world, &time)).unwrap();
        assert_eq!(world.create_entity().raw(), 2);
    }

    #[test]
    fn test_context_exposes_time() {
        let world = World::new();
        let mut time = Time::default();
        time.advance(0.5);
        let ctx = SystemContext::new(&world, &time);
        assert_eq!(ctx.time().delta(), 0.5);
    }
}
