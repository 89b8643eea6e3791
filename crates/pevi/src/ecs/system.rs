//! # System — Functions That Run Each Frame
//!
//! A system is a function that takes `&mut Context` and does something with
//! it: query entities, modify components, read the pointer or the config.
//!
//! ## Phases
//!
//! Every system belongs to a [`Phase`]. A frame runs the four frame phases
//! in a fixed order:
//!
//! ```text
//! Input ──▶ Transform ──▶ Culling ──▶ Render
//! ```
//!
//! [`Phase::FileWatch`] is out of band: it runs at its own cadence through
//! [`Schedule::run_phase`] and never blocks a frame.
//!
//! ## Ordering
//!
//! Within a phase, systems run in registration order unless a depends-on
//! edge says otherwise: a system always runs after the systems it depends
//! on. Edges may point at an earlier frame phase (already satisfied by phase
//! order), never at a later one. Every ordering problem (cycle, unknown
//! name, later phase) is reported when the edge is declared, not while a
//! frame is running.
//!
//! ## Structural lock
//!
//! While a system runs the world refuses structural changes. Systems queue
//! them on `ctx.commands`; the schedule applies the queue after each phase.

use thiserror::Error;

use crate::context::Context;

/// A named stage of the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Phase {
    Input,
    Transform,
    Culling,
    Render,
    /// Out-of-band phase for file watching and hot reload.
    FileWatch,
}

impl Phase {
    /// The frame phases in execution order.
    pub const FRAME: [Phase; 4] = [Phase::Input, Phase::Transform, Phase::Culling, Phase::Render];

    fn is_frame(self) -> bool {
        self != Phase::FileWatch
    }
}

/// A system that can be executed on a [`Context`].
///
/// Any `FnMut(&mut Context)` implements this trait, so you can use closures or
/// function pointers directly.
pub trait System {
    fn run(&mut self, ctx: &mut Context);
}

/// Blanket impl: any `FnMut(&mut Context)` is a `System`.
impl<F: FnMut(&mut Context)> System for F {
    fn run(&mut self, ctx: &mut Context) {
        (self)(ctx);
    }
}

/// Misconfigured schedule. Detected at registration time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("a system named `{0}` is already registered")]
    DuplicateName(String),
    #[error("no system named `{0}` is registered")]
    UnknownSystem(String),
    #[error("depends-on edges form a cycle through {}", .0.join(" -> "))]
    Cycle(Vec<String>),
    #[error("`{system}` runs in {system_phase:?} but depends on `{dependency}` in the later phase {dependency_phase:?}")]
    LaterPhase {
        system: String,
        system_phase: Phase,
        dependency: String,
        dependency_phase: Phase,
    },
    #[error("`{system}` and `{dependency}` straddle the out-of-band FileWatch phase")]
    OutOfBand { system: String, dependency: String },
}

struct NamedSystem {
    name: String,
    phase: Phase,
    /// Indices of same-phase systems that must run first.
    after: Vec<usize>,
    system: Box<dyn System>,
}

/// Per-system timing recorded during the most recent run.
#[cfg(feature = "diagnostics")]
#[derive(Debug, Clone)]
pub struct SystemTiming {
    pub name: String,
    pub phase: Phase,
    pub duration_us: f64,
}

/// Systems grouped by phase, ordered by their depends-on edges.
pub struct Schedule {
    systems: Vec<NamedSystem>,
    /// Execution order per phase, recomputed on every registration.
    order: [Vec<usize>; 5],
    /// Timings of the last frame, plus any out-of-band run since.
    #[cfg(feature = "diagnostics")]
    timings: Vec<SystemTiming>,
}

impl Schedule {
    pub fn new() -> Self {
        Self {
            systems: Vec::new(),
            order: Default::default(),
            #[cfg(feature = "diagnostics")]
            timings: Vec::new(),
        }
    }

    /// Register a system under a unique name.
    pub fn try_add_system<S: System + 'static>(
        &mut self,
        name: &str,
        phase: Phase,
        system: S,
    ) -> Result<(), ScheduleError> {
        if self.index_of(name).is_some() {
            return Err(ScheduleError::DuplicateName(name.to_string()));
        }
        let index = self.systems.len();
        self.systems.push(NamedSystem {
            name: name.to_string(),
            phase,
            after: Vec::new(),
            system: Box::new(system),
        });
        self.order[phase as usize].push(index);
        log::debug!("registered system `{name}` in {phase:?}");
        Ok(())
    }

    /// Register a system.
    ///
    /// # Panics
    ///
    /// Panics if the name is already taken.
    pub fn add_system<S: System + 'static>(&mut self, name: &str, phase: Phase, system: S) {
        if let Err(err) = self.try_add_system(name, phase, system) {
            panic!("invalid schedule: {err}");
        }
    }

    /// Declare that `system` must run after `dependency`.
    ///
    /// A rejected edge leaves the schedule unchanged.
    pub fn try_depends_on(&mut self, system: &str, dependency: &str) -> Result<(), ScheduleError> {
        let s = self
            .index_of(system)
            .ok_or_else(|| ScheduleError::UnknownSystem(system.to_string()))?;
        let d = self
            .index_of(dependency)
            .ok_or_else(|| ScheduleError::UnknownSystem(dependency.to_string()))?;
        if s == d {
            return Err(ScheduleError::Cycle(vec![system.to_string(), system.to_string()]));
        }

        let (s_phase, d_phase) = (self.systems[s].phase, self.systems[d].phase);
        if s_phase.is_frame() != d_phase.is_frame() {
            return Err(ScheduleError::OutOfBand {
                system: system.to_string(),
                dependency: dependency.to_string(),
            });
        }
        if d_phase > s_phase {
            return Err(ScheduleError::LaterPhase {
                system: system.to_string(),
                system_phase: s_phase,
                dependency: dependency.to_string(),
                dependency_phase: d_phase,
            });
        }
        if d_phase < s_phase {
            // Phase order already runs the dependency first.
            return Ok(());
        }

        if self.systems[s].after.contains(&d) {
            return Ok(());
        }
        self.systems[s].after.push(d);
        match self.sort_phase(s_phase) {
            Ok(order) => {
                self.order[s_phase as usize] = order;
                Ok(())
            }
            Err(cycle) => {
                self.systems[s].after.pop();
                Err(ScheduleError::Cycle(cycle))
            }
        }
    }

    /// Declare that `system` must run after `dependency`.
    ///
    /// # Panics
    ///
    /// Panics on any [`ScheduleError`]; a bad edge is fatal at startup.
    pub fn depends_on(&mut self, system: &str, dependency: &str) {
        if let Err(err) = self.try_depends_on(system, dependency) {
            panic!("invalid schedule: {err}");
        }
    }

    /// Topologically sort one phase. Ties go to the earliest registered
    /// system. On a cycle, returns the names of the systems caught in it.
    fn sort_phase(&self, phase: Phase) -> Result<Vec<usize>, Vec<String>> {
        let members: Vec<usize> = (0..self.systems.len())
            .filter(|&i| self.systems[i].phase == phase)
            .collect();
        let mut done = vec![false; self.systems.len()];
        let mut order = Vec::with_capacity(members.len());
        while order.len() < members.len() {
            let ready = members.iter().copied().find(|&i| {
                !done[i] && self.systems[i].after.iter().all(|&d| done[d])
            });
            match ready {
                Some(i) => {
                    done[i] = true;
                    order.push(i);
                }
                None => {
                    return Err(members
                        .iter()
                        .filter(|&&i| !done[i])
                        .map(|&i| self.systems[i].name.clone())
                        .collect());
                }
            }
        }
        Ok(order)
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.systems.iter().position(|s| s.name == name)
    }

    /// Run the four frame phases in order.
    pub fn run_frame(&mut self, ctx: &mut Context) {
        #[cfg(feature = "diagnostics")]
        self.timings.clear();
        for phase in Phase::FRAME {
            self.run_phase(phase, ctx);
        }
    }

    /// Run one phase, then apply the structural changes it queued.
    pub fn run_phase(&mut self, phase: Phase, ctx: &mut Context) {
        ctx.world.set_structure_locked(true);
        for &index in &self.order[phase as usize] {
            let entry = &mut self.systems[index];
            #[cfg(feature = "diagnostics")]
            {
                let start = std::time::Instant::now();
                entry.system.run(ctx);
                self.timings.push(SystemTiming {
                    name: entry.name.clone(),
                    phase,
                    duration_us: start.elapsed().as_secs_f64() * 1_000_000.0,
                });
            }
            #[cfg(not(feature = "diagnostics"))]
            entry.system.run(ctx);
        }
        ctx.world.set_structure_locked(false);
        let applied = ctx.commands.apply(&mut ctx.world);
        if applied > 0 {
            log::trace!("{phase:?}: applied {applied} queued commands");
        }
    }

    /// System names of one phase in execution order.
    pub fn phase_order(&self, phase: Phase) -> Vec<&str> {
        self.order[phase as usize]
            .iter()
            .map(|&i| self.systems[i].name.as_str())
            .collect()
    }

    /// Returns the number of systems in this schedule.
    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }

    /// Per-system timings from the most recent frame.
    #[cfg(feature = "diagnostics")]
    pub fn timings(&self) -> &[SystemTiming] {
        &self.timings
    }
}

impl Default for Schedule {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::components::Name;

    fn recorder(log: &Arc<Mutex<Vec<&'static str>>>, name: &'static str) -> impl FnMut(&mut Context) + 'static {
        let log = Arc::clone(log);
        move |_ctx: &mut Context| log.lock().unwrap().push(name)
    }

    #[test]
    fn phases_run_in_fixed_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut schedule = Schedule::new();
        schedule.add_system("render", Phase::Render, recorder(&log, "render"));
        schedule.add_system("cull", Phase::Culling, recorder(&log, "cull"));
        schedule.add_system("watch", Phase::FileWatch, recorder(&log, "watch"));
        schedule.add_system("transform", Phase::Transform, recorder(&log, "transform"));
        schedule.add_system("input", Phase::Input, recorder(&log, "input"));

        let mut ctx = Context::default();
        schedule.run_frame(&mut ctx);
        assert_eq!(*log.lock().unwrap(), vec!["input", "transform", "cull", "render"]);

        schedule.run_phase(Phase::FileWatch, &mut ctx);
        assert_eq!(log.lock().unwrap().last(), Some(&"watch"));
    }

    #[test]
    fn dependencies_reorder_within_phase() {
        let mut schedule = Schedule::new();
        schedule.add_system("a", Phase::Input, |_: &mut Context| {});
        schedule.add_system("b", Phase::Input, |_: &mut Context| {});
        schedule.add_system("c", Phase::Input, |_: &mut Context| {});
        schedule.depends_on("a", "c");
        assert_eq!(schedule.phase_order(Phase::Input), vec!["b", "c", "a"]);
    }

    #[test]
    fn cycle_is_rejected_at_registration() {
        let mut schedule = Schedule::new();
        schedule.add_system("a", Phase::Culling, |_: &mut Context| {});
        schedule.add_system("b", Phase::Culling, |_: &mut Context| {});
        schedule.depends_on("b", "a");
        let err = schedule.try_depends_on("a", "b").unwrap_err();
        assert_eq!(err, ScheduleError::Cycle(vec!["a".into(), "b".into()]));
        // The rejected edge was rolled back.
        assert_eq!(schedule.phase_order(Phase::Culling), vec!["a", "b"]);
    }

    #[test]
    fn self_dependency_is_a_cycle() {
        let mut schedule = Schedule::new();
        schedule.add_system("a", Phase::Input, |_: &mut Context| {});
        assert!(matches!(
            schedule.try_depends_on("a", "a"),
            Err(ScheduleError::Cycle(_))
        ));
    }

    #[test]
    fn dependency_on_later_phase_is_rejected() {
        let mut schedule = Schedule::new();
        schedule.add_system("pick", Phase::Input, |_: &mut Context| {});
        schedule.add_system("cull", Phase::Culling, |_: &mut Context| {});
        assert!(matches!(
            schedule.try_depends_on("pick", "cull"),
            Err(ScheduleError::LaterPhase { .. })
        ));
        // Pointing back at an earlier phase is already satisfied.
        assert_eq!(schedule.try_depends_on("cull", "pick"), Ok(()));
    }

    #[test]
    fn out_of_band_edges_are_rejected() {
        let mut schedule = Schedule::new();
        schedule.add_system("reload", Phase::FileWatch, |_: &mut Context| {});
        schedule.add_system("cull", Phase::Culling, |_: &mut Context| {});
        assert!(matches!(
            schedule.try_depends_on("reload", "cull"),
            Err(ScheduleError::OutOfBand { .. })
        ));
    }

    #[test]
    fn duplicate_and_unknown_names() {
        let mut schedule = Schedule::new();
        schedule.add_system("a", Phase::Input, |_: &mut Context| {});
        assert_eq!(
            schedule.try_add_system("a", Phase::Render, |_: &mut Context| {}),
            Err(ScheduleError::DuplicateName("a".into()))
        );
        assert_eq!(
            schedule.try_depends_on("a", "ghost"),
            Err(ScheduleError::UnknownSystem("ghost".into()))
        );
        assert_eq!(schedule.len(), 1);
    }

    #[test]
    #[should_panic(expected = "invalid schedule")]
    fn add_system_panics_on_duplicate() {
        let mut schedule = Schedule::new();
        schedule.add_system("a", Phase::Input, |_: &mut Context| {});
        schedule.add_system("a", Phase::Input, |_: &mut Context| {});
    }

    #[test]
    fn structural_changes_apply_at_phase_boundary() {
        let mut schedule = Schedule::new();
        schedule.add_system("spawn", Phase::Input, |ctx: &mut Context| {
            assert!(ctx.world.is_structure_locked());
            ctx.commands.spawn(|world, e| {
                world.set(e, Name::new("spawned"));
            });
        });
        let seen = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&seen);
        schedule.add_system("count", Phase::Input, move |ctx: &mut Context| {
            *counter.lock().unwrap() = ctx.world.entities_with::<Name>().len();
        });

        let mut ctx = Context::default();
        let before = ctx.world.entities_with::<Name>().len();
        schedule.run_phase(Phase::Input, &mut ctx);
        // Not visible to the same phase...
        assert_eq!(*seen.lock().unwrap(), before);
        // ...but applied once it ends.
        assert_eq!(ctx.world.entities_with::<Name>().len(), before + 1);
        assert!(!ctx.world.is_structure_locked());
    }

    #[cfg(feature = "diagnostics")]
    #[test]
    fn timings_follow_execution_order() {
        let mut schedule = Schedule::new();
        schedule.add_system("late", Phase::Render, |_: &mut Context| {});
        schedule.add_system("early", Phase::Input, |_: &mut Context| {});
        let mut ctx = Context::default();
        schedule.run_frame(&mut ctx);
        let names: Vec<_> = schedule.timings().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["early", "late"]);
    }
}
