//! # Hot Reload — Noticing Edited Files
//!
//! Ingested entities remember where they came from through a
//! [`FileReference`] carrying the file's modification time at ingestion.
//! Hot reload compares that stored time with the filesystem and tags every
//! entity of a changed file with [`NeedsReload`]. Re-ingesting and replacing
//! the subtree is up to whoever consumes the tag; this module stops at
//! tagging.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │  FileWatcher (owned by the Editor)                    │
//! │                                                      │
//! │  watcher ──► background thread (notify crate)        │
//! │              sends events over an mpsc channel       │
//! │  rx ◄──────── receives filesystem events             │
//! │  watched ── canonical path → path as ingested        │
//! │  pending ── debounce buffer (path → last event)      │
//! └──────────────────────────────────────────────────────┘
//!
//! FileWatch phase, out of band:
//!   1. Poll: drain rx into pending
//!   2. Debounce: act on paths quiet for `debounce_millis`
//!   3. Compare mtimes for those paths, tag NeedsReload
//!   + HotReloadSystem: compare every tracked path each
//!     `hot_reload_interval_secs`, watcher or not
//! ```
//!
//! Both routes go through the same comparison, so an event for a file whose
//! modification time didn't move tags nothing.
//!
//! ## Graceful Degradation
//!
//! If the watcher can't start (e.g. inotify limit reached) the editor keeps
//! running and the periodic check still catches changes. A file that has
//! disappeared since ingestion is skipped, not tagged.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::mpsc;
use std::time::{Duration, Instant, SystemTime};

use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::components::{FileReference, NeedsReload};
use crate::context::Context;
use crate::ecs::{Entity, System, World};

/// Compare every tracked file against the filesystem. Returns the number of
/// entities newly tagged [`NeedsReload`].
pub fn check_file_modifications(world: &mut World) -> usize {
    check(world, |_| true)
}

/// Like [`check_file_modifications`], restricted to the given paths as they
/// were ingested.
pub fn check_paths(world: &mut World, paths: &[PathBuf]) -> usize {
    check(world, |path| paths.iter().any(|p| p.as_path() == path))
}

fn check(world: &mut World, wanted: impl Fn(&Path) -> bool) -> usize {
    let mut tracked: Vec<(Entity, String, SystemTime)> = Vec::new();
    world.query::<&FileReference>(|entity, file| {
        if wanted(file.path()) {
            tracked.push((entity, file.path_str().to_string(), file.last_modified()));
        }
    });

    // One stat per distinct path.
    let mut current: HashMap<String, Option<SystemTime>> = HashMap::new();
    let mut tagged = 0;
    for (entity, path, stored) in tracked {
        let modified = *current.entry(path).or_insert_with_key(|path| {
            match std::fs::metadata(path).and_then(|meta| meta.modified()) {
                Ok(modified) => Some(modified),
                Err(err) => {
                    log::debug!("skipping reload check for '{path}': {err}");
                    None
                }
            }
        });
        let Some(modified) = modified.filter(|&m| m > stored) else {
            continue;
        };
        if let Some(file) = world.get_mut::<FileReference>(entity) {
            file.observe_modified(modified);
        }
        if world.set(entity, NeedsReload).is_none() {
            tagged += 1;
        }
        log::trace!("{entity} needs reload");
    }
    if tagged > 0 {
        log::info!("{tagged} entities need reload");
    }
    tagged
}

/// FileWatch-phase system: runs the full comparison at most once per
/// `hot_reload_interval_secs` of frame time.
#[derive(Debug, Default)]
pub struct HotReloadSystem {
    last_check: Option<Duration>,
}

impl HotReloadSystem {
    pub fn new() -> Self {
        Self::default()
    }
}

impl System for HotReloadSystem {
    fn run(&mut self, ctx: &mut Context) {
        let now = ctx.time.elapsed();
        if let Some(last) = self.last_check {
            if now.saturating_sub(last) < ctx.config.hot_reload_interval() {
                return;
            }
        }
        self.last_check = Some(now);
        check_file_modifications(&mut ctx.world);
    }
}

/// Filesystem watcher with a debounce buffer.
///
/// Editors often save atomically (write a temp file, rename over the
/// original), producing a burst of events. Each event resets the path's
/// timer; the path is reported once it has been quiet for the debounce
/// window.
pub struct FileWatcher {
    /// `None` if the watcher failed to start.
    watcher: Option<RecommendedWatcher>,
    /// Wrapped in `Mutex` so the watcher is `Sync`; only polled from the
    /// frame thread.
    rx: Mutex<mpsc::Receiver<notify::Result<notify::Event>>>,
    /// Canonical path → path as it was ingested.
    watched: HashMap<PathBuf, PathBuf>,
    pending: HashMap<PathBuf, Instant>,
    debounce: Duration,
    rx_disconnected: bool,
}

impl FileWatcher {
    /// Start a watcher. Failure is logged and leaves an inactive watcher.
    pub fn new(debounce: Duration) -> Self {
        let (tx, rx) = mpsc::channel();
        let watcher = notify::recommended_watcher(move |res| {
            let _ = tx.send(res);
        });
        let watcher = match watcher {
            Ok(w) => Some(w),
            Err(e) => {
                log::warn!("failed to create file watcher: {e}; relying on periodic checks");
                None
            }
        };

        Self {
            watcher,
            rx: Mutex::new(rx),
            watched: HashMap::new(),
            pending: HashMap::new(),
            debounce,
            rx_disconnected: false,
        }
    }

    /// Whether events are still being received.
    pub fn is_active(&self) -> bool {
        self.watcher.is_some() && !self.rx_disconnected
    }

    /// Watch a file. Returns `false` if the path can't be watched.
    pub fn watch(&mut self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        let canonical = match path.canonicalize() {
            Ok(p) => p,
            Err(e) => {
                log::warn!("cannot watch '{}': {e}", path.display());
                return false;
            }
        };
        if self.watched.contains_key(&canonical) {
            return true;
        }
        if let Some(watcher) = &mut self.watcher {
            if let Err(e) = watcher.watch(&canonical, RecursiveMode::NonRecursive) {
                log::warn!("failed to watch '{}': {e}", canonical.display());
                return false;
            }
        }
        log::debug!("watching '{}'", canonical.display());
        self.watched.insert(canonical, path.to_path_buf());
        true
    }

    pub fn watched_count(&self) -> usize {
        self.watched.len()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Drain filesystem events into the debounce buffer.
    pub fn poll(&mut self) {
        if self.rx_disconnected {
            return;
        }
        let mut events = Vec::new();
        {
            let rx = match self.rx.get_mut() {
                Ok(rx) => rx,
                Err(poisoned) => poisoned.into_inner(),
            };
            loop {
                match rx.try_recv() {
                    Ok(Ok(event)) => events.push(event),
                    Ok(Err(e)) => log::warn!("file watcher error: {e}"),
                    Err(mpsc::TryRecvError::Empty) => break,
                    Err(mpsc::TryRecvError::Disconnected) => {
                        log::warn!("file watcher disconnected; relying on periodic checks");
                        self.rx_disconnected = true;
                        break;
                    }
                }
            }
        }
        let now = Instant::now();
        for event in events {
            // Atomic saves show up as creates.
            if matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                for path in &event.paths {
                    self.note_event(path, now);
                }
            }
        }
    }

    fn note_event(&mut self, path: &Path, at: Instant) {
        let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        if self.watched.contains_key(&canonical) {
            self.pending.insert(canonical, at);
        }
    }

    /// Paths quiet for at least the debounce window, as they were ingested.
    pub fn drain_ready(&mut self) -> Vec<PathBuf> {
        self.drain_ready_at(Instant::now())
    }

    fn drain_ready_at(&mut self, now: Instant) -> Vec<PathBuf> {
        let mut ready = Vec::new();
        let watched = &self.watched;
        let debounce = self.debounce;
        self.pending.retain(|canonical, last| {
            if now.saturating_duration_since(*last) < debounce {
                return true;
            }
            if let Some(original) = watched.get(canonical) {
                ready.push(original.clone());
            }
            false
        });
        ready.sort();
        ready
    }
}
