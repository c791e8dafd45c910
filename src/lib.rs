//! Reeltime is a deterministic timeline animation engine.
//!
//! A declarative timeline document describes phases, captions, beam events, chart styling and a
//! brand reveal over a fixed duration. Reeltime turns elapsed time into a complete visual state
//! and feeds it to a swappable element backend, identically for live playback, fixed-step export
//! and arbitrary seeks.
//!
//! # Pipeline overview
//!
//! 1. **Load**: JSON -> [`TimelineSpec`] via [`SpecLoader`] (invalid documents fall back to the
//!    built-in default)
//! 2. **Compile**: [`TimelineSpec`] -> [`CompiledSpec`] (sorted lookup tables)
//! 3. **Resolve**: `elapsed_ms` -> [`TimelineState`] via [`StateResolver::state_at`] (pure)
//! 4. **Render**: a [`Program`] of [`Scene`]s is mounted once by [`RendererPipeline`]; each tick
//!    picks the active scene, resolves its local state and updates its elements
//! 5. **Export** (optional): [`ExportSession`] drives the pipeline frame by frame into a
//!    [`FrameSink`]
//!
//! Design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Pure resolution**: the same elapsed time always yields the same state, whatever drives
//!   the clock.
//! - **Mount once**: elements are never recreated on scene switches, only shown or hidden.
#![forbid(unsafe_code)]

mod animation;
mod compile;
mod eval;
mod export;
mod foundation;
mod render;
mod scene;
mod spec;
mod time;

pub use animation::ease::Ease;
pub use compile::compiled::{
    BeamEvent, BeamPhase, CHARGE_LEAD_MS, ChartRoleState, CompiledBeam, CompiledSpec, NamedRange,
};
pub use compile::fingerprint::{StateFingerprint, fingerprint_state};
pub use eval::engine::{TimelineEngine, TimelineEvent, diff_states};
pub use eval::resolver::{IMPACT_WINDOW_MS, StateResolver};
pub use eval::state::{ImplosionState, TimelineState, UiMode, UiTransform};
pub use export::session::{
    AbortHandle, ExportHeader, ExportOpts, ExportSession, ExportStats, FrameRecord,
    QualityPreset,
};
pub use export::sink::{FrameSink, InMemorySink, JsonLinesSink};
pub use foundation::core::{Point, Rect, TimeRange, Viewport};
pub use foundation::error::{ReelError, ReelResult};
pub use render::backend::{
    BackendKind, DisplayListBackend, ElementBackend, NullBackend, create_backend,
};
pub use render::display_list::{DisplayList, DrawCommand, Rgba};
pub use render::element::{Element, ElementContext, Layout, Lifecycle};
pub use render::pipeline::{RendererPipeline, SceneFrame};
pub use scene::model::{ElementConfig, ElementKind, Scene, standard_elements};
pub use scene::program::{
    Program, SceneRef, SequenceProgram, SequenceProgramBuilder, clamp_program_time,
    validate_program,
};
pub use spec::defaults::default_spec;
pub use spec::loader::SpecLoader;
pub use spec::model::{
    BeamEntry, BreathingWindow, ChartRoleEntry, Envelope, PhaseRange, RampWindow,
    TaskProgressSpan, TextWindow, TimelineSpec,
};
pub use time::source::{
    ClockOrigin, FixedStepTimeSource, SessionContext, TimeSource, WallClockTimeSource,
};
