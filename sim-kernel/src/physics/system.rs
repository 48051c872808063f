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
//! Physics as a scheduled system

use crate::ecs::{System, SystemContext};
use crate::error::SystemResult;
use crate::physics::PhysicsWorld;
use parking_lot::Mutex;
use std::sync::Arc;

/// Update-stage system that steps a shared [`PhysicsWorld`] by the frame delta
///
/// The world sits behind a mutex so that rendering and entity management can
/// hold on to it through [`handle`](Self::handle) between ticks.
#[derive(Debug, Clone)]
pub struct PhysicsSystem {
    world: Arc<Mutex<PhysicsWorld>>,
}

impl PhysicsSystem {
    /// Wrap `world`
    pub fn new(world: PhysicsWorld) -> Self {
        PhysicsSystem {
            world: Arc::new(Mutex::new(world)),
        }
    }

    /// Shared handle to the physics world
    pub fn handle(&self) -> Arc<Mutex<PhysicsWorld>> {
        Arc::clone(&self.world)
    }
}

impl System for PhysicsSystem {
    fn run(&self, ctx: &SystemContext<'_>) -> SystemResult {
        self.world.lock().step(ctx.time().delta());
        Ok(())
    }

    fn name(&self) -> &str {
        "physics"
    }
}
