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
//! System scheduler with parallel execution support
//!
//! Systems are registered into one of two fixed stages:
//!
//! - **Startup** systems run once, each on its own Rayon task. The launcher
//!   joins every task and reports failures before the first tick.
//! - **Update** systems run once per [`Scheduler::execute_systems`] call on a
//!   fixed set of worker threads that pull from a shared queue pre-loaded
//!   with every Update system. The call returns only after the queue is
//!   drained and every worker has exited.
//!
//! There is no ordering between systems of the same stage and no implicit
//! mutual exclusion beyond the world's own lock. Systems that must observe
//! each other's writes within a tick have to synchronize themselves.
//!
//! Without the `parallel` feature both stages run sequentially on the
//! calling thread.

use crate::ecs::system::{FnSystem, Stage, System, SystemContext};
use crate::ecs::World;
use crate::error::{BoxError, SchedulerError, SystemResult};
use crate::time::Time;
use parking_lot::Mutex;
use std::collections::BTreeSet;

type Failures = Mutex<Vec<(String, BoxError)>>;

/// Staged system scheduler
///
/// # Examples
///
/// ```
/// use sim_kernel::ecs::{Scheduler, Stage, World};
/// use sim_kernel::Time;
///
/// let mut scheduler = Scheduler::new();
/// scheduler.register_fn("spawn", Stage::Update, |ctx| {
///     ctx.world().create_entity();
///     Ok(())
/// });
///
/// let world = World::new();
/// scheduler.execute_systems(&world, &Time::default(), 2).unwrap();
/// ```
#[derive(Default)]
pub struct Scheduler {
    startup: Vec<Box<dyn System>>,
    update: Vec<Box<dyn System>>,
}

impl Scheduler {
    /// Create a new scheduler
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a system to a stage
    pub fn register_system<S: System + 'static>(&mut self, system: S, stage: Stage) {
        log::debug!("registered {:?} system `{}`", stage, system.name());
        self.stage_mut(stage).push(Box::new(system));
    }

    /// Add a closure as a named system
    pub fn register_fn<F>(&mut self, name: impl Into<String>, stage: Stage, f: F)
    where
        F: Fn(&SystemContext<'_>) -> SystemResult + Send + Sync + 'static,
    {
        self.register_system(FnSystem::new(name, f), stage);
    }

    fn stage(&self, stage: Stage) -> &[Box<dyn System>] {
        match stage {
            Stage::Startup => &self.startup,
            Stage::Update => &self.update,
        }
    }

    fn stage_mut(&mut self, stage: Stage) -> &mut Vec<Box<dyn System>> {
        match stage {
            Stage::Startup => &mut self.startup,
            Stage::Update => &mut self.update,
        }
    }

    /// Names of the systems in a stage, in registration order
    pub fn system_names(&self, stage: Stage) -> Vec<&str> {
        self.stage(stage).iter().map(|system| system.name()).collect()
    }

    /// Number of systems registered to a stage
    pub fn system_count(&self, stage: Stage) -> usize {
        self.stage(stage).len()
    }

    /// Run every Startup system concurrently and wait for all of them
    ///
    /// Every system runs even if others fail. All failures are logged and
    /// the first one is returned.
    pub fn start(&self, world: &World, time: &Time) -> Result<(), SchedulerError> {
        self.start_pending(world, time, &mut BTreeSet::new())
    }

    /// Run the Startup systems whose index is not in `completed`
    ///
    /// Indices of the systems that succeed are added to `completed`, so a
    /// retry after a failure only reruns what failed.
    pub(crate) fn start_pending(
        &self,
        world: &World,
        time: &Time,
        completed: &mut BTreeSet<usize>,
    ) -> Result<(), SchedulerError> {
        let ctx = SystemContext::new(world, time);
        let failures = Failures::default();
        let succeeded = Mutex::new(Vec::new());
        let pending: Vec<(usize, &dyn System)> = self
            .startup
            .iter()
            .enumerate()
            .filter(|(index, _)| !completed.contains(index))
            .map(|(index, system)| (index, system.as_ref()))
            .collect();

        #[cfg(feature = "parallel")]
        rayon::scope(|scope| {
            for &(index, system) in &pending {
                let ctx = &ctx;
                let failures = &failures;
                let succeeded = &succeeded;
                scope.spawn(move |_| {
                    if run_system(system, ctx, failures) {
                        succeeded.lock().push(index);
                    }
                });
            }
        });

        #[cfg(not(feature = "parallel"))]
        for &(index, system) in &pending {
            if run_system(system, &ctx, &failures) {
                succeeded.lock().push(index);
            }
        }

        completed.extend(succeeded.into_inner());
        log::debug!(
            "startup stage joined ({} of {} systems ran)",
            pending.len(),
            self.startup.len()
        );
        report(Stage::Startup, failures.into_inner())
    }

    /// Run every Update system exactly once across `workers` threads
    ///
    /// `workers == 0` uses one worker per Update system. Blocks until every
    /// system has run and every worker has exited.
    pub fn execute_systems(
        &self,
        world: &World,
        time: &Time,
        workers: usize,
    ) -> Result<(), SchedulerError> {
        if self.update.is_empty() {
            return Ok(());
        }
        let workers = if workers == 0 { self.update.len() } else { workers };
        let ctx = SystemContext::new(world, time);
        let failures = Failures::default();

        log::trace!(
            "running {} update systems on {} workers",
            self.update.len(),
            workers
        );

        #[cfg(feature = "parallel")]
        self.run_workers(&ctx, workers, &failures)?;

        #[cfg(not(feature = "parallel"))]
        for system in &self.update {
            run_system(system.as_ref(), &ctx, &failures);
        }

        report(Stage::Update, failures.into_inner())
    }

    #[cfg(feature = "parallel")]
    fn run_workers(
        &self,
        ctx: &SystemContext<'_>,
        workers: usize,
        failures: &Failures,
    ) -> Result<(), SchedulerError> {
        use std::thread;

        let (sender, receiver) = crossbeam_channel::bounded(self.update.len());
        for system in &self.update {
            sender
                .send(system.as_ref())
                .map_err(|_| SchedulerError::QueueClosed)?;
        }
        drop(sender);

        thread::scope(|scope| -> Result<(), SchedulerError> {
            for worker in 0..workers {
                let receiver = receiver.clone();
                thread::Builder::new()
                    .name(format!("update-worker-{worker}"))
                    .spawn_scoped(scope, move || {
                        for system in receiver.iter() {
                            run_system(system, ctx, failures);
                        }
                    })
                    .map_err(SchedulerError::Spawn)?;
            }
            Ok(())
        })
    }

    /// Remove every system from both stages
    pub fn clear(&mut self) {
        self.startup.clear();
        self.update.clear();
    }
}

fn run_system(system: &dyn System, ctx: &SystemContext<'_>, failures: &Failures) -> bool {
    log::trace!("running system `{}`", system.name());
    match system.run(ctx) {
        Ok(()) => true,
        Err(source) => {
            log::error!("system `{}` failed: {}", system.name(), source);
            failures.lock().push((system.name().to_owned(), source));
            false
        }
    }
}

fn report(stage: Stage, failures: Vec<(String, BoxError)>) -> Result<(), SchedulerError> {
    let failed = failures.len();
    match failures.into_iter().next() {
        None => Ok(()),
        Some((name, source)) => Err(SchedulerError::SystemFailed {
            stage,
            name,
            failed,
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting(
        counter: &Arc<AtomicUsize>,
    ) -> impl Fn(&SystemContext<'_>) -> SystemResult + Send + Sync + 'static {
        let counter = Arc::clone(counter);
        move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn test_scheduler_creation() {
        let scheduler = Scheduler::new();
        assert_eq!(scheduler.system_count(Stage::Startup), 0);
        assert_eq!(scheduler.system_count(Stage::Update), 0);
    }

    #[test]
    fn test_registration_order() {
        let mut scheduler = Scheduler::new();
        scheduler.register_fn("b", Stage::Update, |_| Ok(()));
        scheduler.register_fn("a", Stage::Update, |_| Ok(()));
        scheduler.register_fn("init", Stage::Startup, |_| Ok(()));
        assert_eq!(scheduler.system_names(Stage::Update), vec!["b", "a"]);
        assert_eq!(scheduler.system_names(Stage::Startup), vec!["init"]);
    }

    #[test]
    fn test_empty_scheduler() {
        let scheduler = Scheduler::new();
        let world = World::new();
        let time = Time::default();
        scheduler.start(&world, &time).unwrap();
        scheduler.execute_systems(&world, &time, 0).unwrap();
        scheduler.execute_systems(&world, &time, 4).unwrap();
    }

    #[test]
    fn test_update_runs_each_system_once() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut scheduler = Scheduler::new();
        for i in 0..8 {
            scheduler.register_fn(format!("system{i}"), Stage::Update, counting(&counter));
        }

        let world = World::new();
        let time = Time::default();
        for workers in [0, 1, 3, 16] {
            counter.store(0, Ordering::SeqCst);
            scheduler.execute_systems(&world, &time, workers).unwrap();
            assert_eq!(counter.load(Ordering::SeqCst), 8, "workers = {workers}");
        }
    }

    #[test]
    fn test_stages_are_separate() {
        let startup = Arc::new(AtomicUsize::new(0));
        let update = Arc::new(AtomicUsize::new(0));
        let mut scheduler = Scheduler::new();
        scheduler.register_fn("init", Stage::Startup, counting(&startup));
        scheduler.register_fn("tick", Stage::Update, counting(&update));

        let world = World::new();
        let time = Time::default();
        scheduler.start(&world, &time).unwrap();
        assert_eq!(startup.load(Ordering::SeqCst), 1);
        assert_eq!(update.load(Ordering::SeqCst), 0);

        scheduler.execute_systems(&world, &time, 0).unwrap();
        scheduler.execute_systems(&world, &time, 0).unwrap();
        assert_eq!(startup.load(Ordering::SeqCst), 1);
        assert_eq!(update.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_update_failure_reported_after_all_ran() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut scheduler = Scheduler::new();
        scheduler.register_fn("ok1", Stage::Update, counting(&counter));
        scheduler.register_fn("broken", Stage::Update, |_| Err("no input device".into()));
        scheduler.register_fn("ok2", Stage::Update, counting(&counter));

        let world = World::new();
        let err = scheduler
            .execute_systems(&world, &Time::default(), 2)
            .unwrap_err();
        assert_eq!(counter.load(Ordering::SeqCst), 2);
        match err {
            SchedulerError::SystemFailed {
                stage, name, failed, ..
            } => {
                assert_eq!(stage, Stage::Update);
                assert_eq!(name, "broken");
                assert_eq!(failed, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_startup_failures_are_surfaced() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut scheduler = Scheduler::new();
        scheduler.register_fn("load_a", Stage::Startup, |_| Err("missing a".into()));
        scheduler.register_fn("load_b", Stage::Startup, |_| Err("missing b".into()));
        scheduler.register_fn("spawn", Stage::Startup, counting(&counter));

        let world = World::new();
        let err = scheduler.start(&world, &Time::default()).unwrap_err();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(matches!(
            err,
            SchedulerError::SystemFailed {
                stage: Stage::Startup,
                failed: 2,
                ..
            }
        ));
    }

    #[test]
    fn test_start_pending_skips_completed() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let attempts = Arc::new(AtomicUsize::new(0));
        let mut scheduler = Scheduler::new();
        scheduler.register_fn("first", Stage::Startup, counting(&first));
        let flaky = Arc::clone(&attempts);
        scheduler.register_fn("flaky", Stage::Startup, move |_| {
            if flaky.fetch_add(1, Ordering::SeqCst) == 0 {
                Err("not ready".into())
            } else {
                Ok(())
            }
        });
        scheduler.register_fn("second", Stage::Startup, counting(&second));

        let world = World::new();
        let time = Time::default();
        let mut completed = BTreeSet::new();
        assert!(scheduler.start_pending(&world, &time, &mut completed).is_err());
        assert_eq!(completed, BTreeSet::from([0, 2]));

        scheduler.start_pending(&world, &time, &mut completed).unwrap();
        assert_eq!(completed, BTreeSet::from([0, 1, 2]));
        assert_eq!(first.load(Ordering::SeqCst), 1);
        assert_eq!(second.load(Ordering::SeqCst), 1);
        assert_eq!(attempts.load(Ordering::SeqCst), 2);

        scheduler.start_pending(&world, &time, &mut completed).unwrap();
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_zero_workers_runs_all_concurrently() {
        use std::sync::Barrier;

        // Each system blocks until all four are running at once.
        let barrier = Arc::new(Barrier::new(4));
        let mut scheduler = Scheduler::new();
        for i in 0..4 {
            let barrier = Arc::clone(&barrier);
            scheduler.register_fn(format!("wait{i}"), Stage::Update, move |_| {
                barrier.wait();
                Ok(())
            });
        }

        let world = World::new();
        scheduler.execute_systems(&world, &Time::default(), 0).unwrap();
    }

    #[test]
    fn test_clear() {
        let mut scheduler = Scheduler::new();
        scheduler.register_fn("a", Stage::Update, |_| Ok(()));
        scheduler.register_fn("b", Stage::Startup, |_| Ok(()));
        scheduler.clear();
        assert_eq!(scheduler.system_count(Stage::Update), 0);
        assert_eq!(scheduler.system_count(Stage::Startup), 0);
    }
}
