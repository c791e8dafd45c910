use serde::Serialize;

use crate::compile::compiled::BeamPhase;
use crate::eval::resolver::StateResolver;
use crate::eval::state::{TimelineState, UiMode};
use crate::time::source::TimeSource;

/// Change notification derived from two consecutive states.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TimelineEvent {
    /// The active phase changed.
    PhaseChanged {
        /// Previous phase.
        from: String,
        /// New phase.
        to: String,
    },
    /// The active macro-phase changed.
    MacroPhaseChanged {
        /// Previous macro-phase.
        from: String,
        /// New macro-phase.
        to: String,
    },
    /// A beam entered its charge window.
    BeamCharging {
        /// Target task.
        task_index: usize,
    },
    /// A beam started firing.
    BeamFired {
        /// Target task.
        task_index: usize,
    },
    /// A caption appeared or its text changed.
    NarrativeShown {
        /// Caption text.
        text: String,
    },
    /// The caption went away.
    NarrativeHidden,
    /// The dynamic header changed; `None` when it went away.
    HeaderChanged {
        /// New header text.
        text: Option<String>,
    },
    /// A different overlay now drives the UI transform.
    UiModeChanged {
        /// Previous mode.
        from: UiMode,
        /// New mode.
        to: UiMode,
    },
}

/// Events implied by moving from `prev` to `next`, in a fixed order.
///
/// Pure; the engine only forwards what this returns.
pub fn diff_states(prev: &TimelineState, next: &TimelineState) -> Vec<TimelineEvent> {
    let mut out = Vec::new();

    if prev.phase != next.phase {
        out.push(TimelineEvent::PhaseChanged {
            from: prev.phase.clone(),
            to: next.phase.clone(),
        });
    }
    if prev.macro_phase != next.macro_phase {
        out.push(TimelineEvent::MacroPhaseChanged {
            from: prev.macro_phase.clone(),
            to: next.macro_phase.clone(),
        });
    }

    if let Some(beam) = &next.beam {
        let same_as_before = prev
            .beam
            .as_ref()
            .is_some_and(|p| p.task_index == beam.task_index && p.phase == beam.phase);
        if !same_as_before {
            let task_index = beam.task_index;
            out.push(match beam.phase {
                BeamPhase::Charging => TimelineEvent::BeamCharging { task_index },
                BeamPhase::Firing => TimelineEvent::BeamFired { task_index },
            });
        }
    }

    if prev.narrative_text != next.narrative_text {
        out.push(match &next.narrative_text {
            Some(text) => TimelineEvent::NarrativeShown { text: text.clone() },
            None => TimelineEvent::NarrativeHidden,
        });
    }
    if prev.dynamic_header != next.dynamic_header {
        out.push(TimelineEvent::HeaderChanged {
            text: next.dynamic_header.clone(),
        });
    }
    if prev.ui_mode != next.ui_mode {
        out.push(TimelineEvent::UiModeChanged {
            from: prev.ui_mode,
            to: next.ui_mode,
        });
    }

    out
}

type Listener = Box<dyn FnMut(&TimelineEvent)>;

/// Stateful wrapper polling a [`TimeSource`] once per tick.
///
/// Keeps the previous snapshot only to diff against; the state itself always comes from
/// [`StateResolver::state_at`].
pub struct TimelineEngine<S: TimeSource> {
    resolver: StateResolver,
    source: S,
    last: Option<TimelineState>,
    listeners: Vec<Listener>,
    running: bool,
}

impl<S: TimeSource> std::fmt::Debug for TimelineEngine<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimelineEngine")
            .field("running", &self.running)
            .field("listeners", &self.listeners.len())
            .field("last_elapsed_ms", &self.last.as_ref().map(|s| s.elapsed_ms))
            .finish_non_exhaustive()
    }
}

impl<S: TimeSource> TimelineEngine<S> {
    pub fn new(resolver: StateResolver, source: S) -> Self {
        Self {
            resolver,
            source,
            last: None,
            listeners: Vec::new(),
            running: false,
        }
    }

    /// Register a listener for every emitted event.
    pub fn on_event(&mut self, listener: impl FnMut(&TimelineEvent) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.source.initialize();
        self.running = true;
        tracing::debug!("timeline engine started");
    }

    /// Halt polling. Safe to call any number of times.
    pub fn stop(&mut self) {
        if self.running {
            self.running = false;
            tracing::debug!("timeline engine stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Pin the source to `ms`; the next tick resolves that instant.
    pub fn seek(&mut self, ms: f64) {
        self.source.set_forced_time(Some(ms));
    }

    /// Release a previous [`Self::seek`].
    pub fn clear_seek(&mut self) {
        self.source.set_forced_time(None);
    }

    /// Poll the source, resolve, and notify listeners of what changed.
    ///
    /// Returns `None` while stopped. The first tick after construction emits nothing.
    pub fn tick(&mut self) -> Option<&TimelineState> {
        if !self.running {
            return None;
        }
        let state = self.resolver.state_at(self.source.elapsed_ms());
        if let Some(prev) = &self.last {
            for event in diff_states(prev, &state) {
                tracing::debug!(?event, elapsed_ms = state.elapsed_ms, "timeline event");
                for listener in &mut self.listeners {
                    listener(&event);
                }
            }
        }
        self.last = Some(state);
        self.last.as_ref()
    }

    /// Snapshot from the last tick.
    pub fn state(&self) -> Option<&TimelineState> {
        self.last.as_ref()
    }

    pub fn resolver(&self) -> &StateResolver {
        &self.resolver
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Mutable access for sources with their own stepping API.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}

#[cfg(test)]
#[path = "../../tests/unit/eval/engine.rs"]
mod tests;
