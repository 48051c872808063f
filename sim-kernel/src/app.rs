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
//! Simulation driver
//!
//! [`Simulation`] owns the component store, the scheduler, the frame clock
//! and the engine configuration. The caller drives it one tick at a time and
//! decides how long to wait between ticks; see
//! [`Time::remaining_frame_budget`].

use crate::config::EngineConfig;
use crate::ecs::{Scheduler, Stage, System, SystemContext, World};
use crate::error::{ConfigError, SchedulerError, SystemResult};
use crate::time::Time;
use log::debug;
use std::collections::BTreeSet;

/// A world, its systems and its clock
pub struct Simulation {
    world: World,
    scheduler: Scheduler,
    time: Time,
    config: EngineConfig,
    started: bool,
    completed_startup: BTreeSet<usize>,
}

impl Simulation {
    /// Create a simulation with a validated configuration
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Simulation {
            world: World::new(),
            scheduler: Scheduler::new(),
            time: Time::new(config.frame_rate),
            config,
            started: false,
            completed_startup: BTreeSet::new(),
        })
    }

    /// Register a system for `stage`
    pub fn register_system<S: System + 'static>(&mut self, system: S, stage: Stage) {
        self.scheduler.register_system(system, stage);
    }

    /// Register a named closure for `stage`
    pub fn register_fn<F>(&mut self, name: impl Into<String>, stage: Stage, f: F)
    where
        F: Fn(&SystemContext<'_>) -> SystemResult + Send + Sync + 'static,
    {
        self.scheduler.register_fn(name, stage, f);
    }

    /// The component/resource store
    pub fn world(&self) -> &World {
        &self.world
    }

    /// The frame clock
    pub fn time(&self) -> &Time {
        &self.time
    }

    /// The registered systems
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// The engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Whether Startup systems have run
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Run every Startup system once and wait for all of them
    ///
    /// Calling this again after a successful start does nothing. After a
    /// failed start only the systems that failed run again.
    pub fn start(&mut self) -> Result<(), SchedulerError> {
        if self.started {
            return Ok(());
        }
        self.scheduler
            .start_pending(&self.world, &self.time, &mut self.completed_startup)?;
        self.started = true;
        debug!(
            "simulation started with {} startup and {} update systems",
            self.scheduler.system_count(Stage::Startup),
            self.scheduler.system_count(Stage::Update)
        );
        Ok(())
    }

    /// Advance the clock by `delta` seconds and run every Update system once
    ///
    /// Starts the simulation first if needed.
    pub fn tick(&mut self, delta: f32) -> Result<(), SchedulerError> {
        self.start()?;
        self.time.advance(delta);
        self.scheduler
            .execute_systems(&self.world, &self.time, self.config.workers)
    }

    /// Rewind the clock and mark the simulation as not started
    ///
    /// The store and the registered systems are kept.
    pub fn reset(&mut self) {
        self.time.reset();
        self.started = false;
        self.completed_startup.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_rejects_invalid_config() {
        let result = Simulation::new(EngineConfig::default().with_frame_rate(0));
        assert_eq!(result.err(), Some(ConfigError::ZeroFrameRate));
    }

    #[test]
    fn test_tick_starts_once() {
        let mut sim = Simulation::new(EngineConfig::default()).unwrap();
        let startups = Arc::new(AtomicUsize::new(0));
        let updates = Arc::new(AtomicUsize::new(0));

        let counter = startups.clone();
        sim.register_fn("setup", Stage::Startup, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        let counter = updates.clone();
        sim.register_fn("update", Stage::Update, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        assert!(!sim.is_started());
        for _ in 0..3 {
            sim.tick(1.0 / 60.0).unwrap();
        }
        assert!(sim.is_started());
        assert_eq!(startups.load(Ordering::SeqCst), 1);
        assert_eq!(updates.load(Ordering::SeqCst), 3);
        assert_eq!(sim.time().frame(), 3);
    }

    #[test]
    fn test_reset_reruns_startup() {
        let mut sim = Simulation::new(EngineConfig::default()).unwrap();
        let startups = Arc::new(AtomicUsize::new(0));
        let counter = startups.clone();
        sim.register_fn("setup", Stage::Startup, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        sim.tick(0.1).unwrap();
        sim.reset();
        assert_eq!(sim.time().frame(), 0);
        sim.tick(0.1).unwrap();
        assert_eq!(startups.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_failed_start_is_retried() {
        let mut sim = Simulation::new(EngineConfig::default()).unwrap();
        sim.register_fn("broken", Stage::Startup, |_| Err("missing asset".into()));
        assert!(sim.tick(0.1).is_err());
        assert!(!sim.is_started());
        assert_eq!(sim.time().frame(), 0);
    }

    #[test]
    fn test_retry_runs_only_failed_startup_systems() {
        let mut sim = Simulation::new(EngineConfig::default()).unwrap();
        let spawns = Arc::new(AtomicUsize::new(0));
        let loads = Arc::new(AtomicUsize::new(0));

        let counter = spawns.clone();
        sim.register_fn("spawn_level", Stage::Startup, move |ctx| {
            ctx.world().create_entity();
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        let counter = loads.clone();
        sim.register_fn("load_assets", Stage::Startup, move |_| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err("asset server busy".into())
            } else {
                Ok(())
            }
        });

        assert!(sim.tick(0.1).is_err());
        assert!(!sim.is_started());
        sim.tick(0.1).unwrap();
        assert!(sim.is_started());
        sim.tick(0.1).unwrap();

        assert_eq!(spawns.load(Ordering::SeqCst), 1);
        assert_eq!(loads.load(Ordering::SeqCst), 2);
        assert_eq!(sim.time().frame(), 2);

        sim.reset();
        sim.tick(0.1).unwrap();
        assert_eq!(spawns.load(Ordering::SeqCst), 2);
        assert_eq!(loads.load(Ordering::SeqCst), 3);
    }
}
