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
//! Platformer demo
//!
//! A player falls onto the ground and runs right through a coin trigger
//! toward a wall. Run with `RUST_LOG=debug` to see lifecycle logging.

use glam::Vec2;
use log::info;
use sim_kernel::ecs::{Component, EntityTable, QueryFilter, Resource, Stage};
use sim_kernel::physics::{BodyDesc, BodyHandle, PhysicsSystem, PhysicsWorld};
use sim_kernel::{EngineConfig, Simulation};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Instant;

const PLAYER: u8 = 0b001;
const WORLD: u8 = 0b010;
const PICKUP: u8 = 0b100;

#[derive(Debug)]
struct Named(&'static str);
impl Component for Named {}

struct RigidBody(BodyHandle);
impl Component for RigidBody {}

#[derive(Default)]
struct Score {
    coins: AtomicUsize,
}
impl Resource for Score {}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("sim-kernel - Platformer Demo");
    println!("============================\n");

    let config = EngineConfig::default().with_workers(2);
    let mut sim = Simulation::new(config.clone())?;
    let physics = PhysicsSystem::new(PhysicsWorld::new(config.physics)?);
    let bodies = physics.handle();
    let mut entities = EntityTable::new();

    sim.world().register_resource(Score::default());
    let score = sim.world().get_resource::<Score>().ok_or("score missing")?;

    let coin_entity = {
        let mut bodies = bodies.lock();
        bodies.create_static_body(Vec2::new(0.0, 0.0), Vec2::new(40.0, 2.0), WORLD)?;
        bodies.create_static_body(Vec2::new(12.0, 4.0), Vec2::new(2.0, 6.0), WORLD)?;

        let player = bodies.create_body(
            BodyDesc::new(Vec2::new(-8.0, 5.0), Vec2::new(1.0, 2.0))
                .with_layer(PLAYER)
                .with_mask(WORLD)
                .with_acceleration(Vec2::new(0.5, 0.0))
                .with_on_hit_static(|body, wall, hit| {
                    if hit.normal.x != 0.0 {
                        info!("body {} ran into static body {}", body.handle(), wall.id().0);
                    }
                }),
        )?;
        entities.create(Some(player), 0);
        let entity = sim.world().create_entity();
        sim.world().add_component(entity, Named("player"));
        sim.world().add_component(entity, RigidBody(player));

        let collected = score.clone();
        let coin = bodies.create_trigger(
            Vec2::new(2.0, 1.6),
            Vec2::new(0.5, 0.5),
            PICKUP,
            PLAYER,
            move |_, _, _| {
                collected.coins.fetch_add(1, Ordering::Relaxed);
            },
        )?;
        let entity = sim.world().create_entity();
        sim.world().add_component(entity, Named("coin"));
        sim.world().add_component(entity, RigidBody(coin));
        entities.create(Some(coin), 0)
    };

    sim.register_system(physics, Stage::Update);
    sim.register_fn("report", Stage::Update, |ctx| {
        if ctx.time().frame() % 30 == 0 {
            let named = ctx.world().query::<Named>(&QueryFilter::new().with::<RigidBody>());
            let names: Vec<&str> = named.iter().map(|name| name.0).collect();
            info!("frame {}: tracking {:?}", ctx.time().frame(), names);
        }
        Ok(())
    });

    let delta = 1.0 / config.frame_rate as f32;
    for _ in 0..180 {
        let frame_start = Instant::now();
        sim.tick(delta)?;

        if sim.time().frame() % 30 == 0 {
            let bodies = bodies.lock();
            for (handle, body) in bodies.bodies() {
                println!(
                    "  frame {:3} body {:>4}: position ({:6.2}, {:6.2}) velocity ({:7.2}, {:7.2})",
                    sim.time().frame(),
                    handle.to_string(),
                    body.position().x,
                    body.position().y,
                    body.velocity().x,
                    body.velocity().y
                );
            }
        }

        if let Some(wait) = sim.time().remaining_frame_budget(frame_start.elapsed()) {
            thread::sleep(wait);
        }
    }

    println!("\nCoin contacts: {}", score.coins.load(Ordering::Relaxed));

    // Collecting the coin removes its entity and frees the body slot.
    let mut bodies = bodies.lock();
    entities.destroy(coin_entity, &mut bodies);
    println!(
        "Active bodies after pickup: {} of {} slots",
        bodies.active_body_count(),
        bodies.body_count()
    );

    Ok(())
}
