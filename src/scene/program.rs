use std::sync::Arc;

use crate::foundation::core::TimeRange;
use crate::foundation::error::{ReelError, ReelResult};
use crate::scene::model::Scene;

const DURATION_EPSILON_MS: f64 = 1e-6;

type SceneFactory = Arc<dyn Fn() -> Scene + Send + Sync>;

/// Time-bounded slot in a program with a lazily built [`Scene`].
#[derive(Clone)]
pub struct SceneRef {
    /// Scene id.
    pub id: String,
    /// Program time at which the scene starts.
    pub start_ms: f64,
    /// Program time at which the scene ends (exclusive).
    pub end_ms: f64,
    factory: SceneFactory,
}

impl std::fmt::Debug for SceneRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneRef")
            .field("id", &self.id)
            .field("start_ms", &self.start_ms)
            .field("end_ms", &self.end_ms)
            .finish_non_exhaustive()
    }
}

impl SceneRef {
    pub fn new(
        id: impl Into<String>,
        start_ms: f64,
        end_ms: f64,
        factory: impl Fn() -> Scene + Send + Sync + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            start_ms,
            end_ms,
            factory: Arc::new(factory),
        }
    }

    pub fn range(&self) -> TimeRange {
        TimeRange {
            start_ms: self.start_ms,
            end_ms: self.end_ms,
        }
    }

    pub fn duration_ms(&self) -> f64 {
        self.end_ms - self.start_ms
    }

    /// Run the factory.
    pub fn build(&self) -> Scene {
        (self.factory)()
    }

    /// Map program time into scene-local time, clamped to `[0, duration]`.
    pub fn local_time(&self, program_time_ms: f64) -> f64 {
        let local = program_time_ms - self.start_ms;
        if local.is_nan() {
            return 0.0;
        }
        local.clamp(0.0, self.duration_ms().max(0.0))
    }
}

/// Clamp `t` into `[0, duration_ms]`; NaN maps to 0.
pub fn clamp_program_time(t: f64, duration_ms: f64) -> f64 {
    if t.is_nan() {
        return 0.0;
    }
    t.clamp(0.0, duration_ms.max(0.0))
}

/// A set of non-overlapping scenes selected by global time.
pub trait Program {
    /// Stable program id.
    fn program_id(&self) -> &str;

    /// Total program length.
    fn duration_ms(&self) -> f64;

    /// Every scene reference, sorted by start.
    fn scenes(&self) -> &[SceneRef];

    /// Scene active at `t`, after clamping `t` into `[0, duration]`.
    ///
    /// A scene ending exactly at the program end stays active at the end instant.
    fn scene_at(&self, t: f64) -> Option<&SceneRef> {
        let duration = self.duration_ms();
        let t = clamp_program_time(t, duration);
        let scenes = self.scenes();
        scenes
            .iter()
            .find(|s| s.range().contains(t))
            .or_else(|| {
                scenes
                    .last()
                    .filter(|s| t >= s.end_ms && s.end_ms >= duration - DURATION_EPSILON_MS)
            })
    }

    /// Free-form host metadata.
    fn metadata(&self) -> Option<&serde_json::Value> {
        None
    }
}

/// Validate a program's structure and build every scene once.
///
/// Fails with [`ReelError::Composition`] when references share an id, are unsorted or overlap,
/// fall outside the program, or disagree with the duration of the scene they build.
pub fn validate_program(program: &dyn Program) -> ReelResult<Vec<Scene>> {
    let id = program.program_id();
    let duration = program.duration_ms();
    if !duration.is_finite() || duration <= 0.0 {
        return Err(ReelError::composition(format!(
            "program '{id}' duration must be finite and > 0"
        )));
    }
    let refs = program.scenes();
    if refs.is_empty() {
        return Err(ReelError::composition(format!("program '{id}' has no scenes")));
    }

    let mut seen = std::collections::HashSet::with_capacity(refs.len());
    for r in refs {
        if !seen.insert(r.id.as_str()) {
            return Err(ReelError::composition(format!(
                "program '{id}' has more than one scene with id '{}'",
                r.id
            )));
        }
        if !r.start_ms.is_finite() || !r.end_ms.is_finite() || r.start_ms >= r.end_ms {
            return Err(ReelError::composition(format!(
                "scene '{}' has an invalid range [{}, {})",
                r.id, r.start_ms, r.end_ms
            )));
        }
        if r.start_ms < 0.0 || r.end_ms > duration + DURATION_EPSILON_MS {
            return Err(ReelError::composition(format!(
                "scene '{}' [{}, {}) lies outside program duration {duration}",
                r.id, r.start_ms, r.end_ms
            )));
        }
    }
    for pair in refs.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        if b.start_ms < a.start_ms {
            return Err(ReelError::composition(format!(
                "scenes must be sorted by start: '{}' starts before '{}'",
                b.id, a.id
            )));
        }
        if a.range().overlaps(b.range()) {
            return Err(ReelError::composition(format!(
                "scenes '{}' and '{}' overlap",
                a.id, b.id
            )));
        }
    }

    let mut scenes = Vec::with_capacity(refs.len());
    for r in refs {
        let scene = r.build();
        if scene.id != r.id {
            return Err(ReelError::composition(format!(
                "scene reference '{}' built a scene with id '{}'",
                r.id, scene.id
            )));
        }
        if (scene.duration_ms - r.duration_ms()).abs() > DURATION_EPSILON_MS {
            return Err(ReelError::composition(format!(
                "scene '{}' duration {} does not match its bounds {}",
                r.id,
                scene.duration_ms,
                r.duration_ms()
            )));
        }
        scenes.push(scene);
    }
    Ok(scenes)
}

/// Program made of scene references laid out by a builder.
#[derive(Clone, Debug)]
pub struct SequenceProgram {
    id: String,
    duration_ms: f64,
    scenes: Vec<SceneRef>,
    metadata: Option<serde_json::Value>,
}

impl SequenceProgram {
    pub fn builder(id: impl Into<String>) -> SequenceProgramBuilder {
        SequenceProgramBuilder {
            id: id.into(),
            cursor_ms: 0.0,
            duration_ms: None,
            scenes: Vec::new(),
            metadata: None,
        }
    }

    /// Program playing one scene for its whole duration.
    pub fn single(scene: Scene) -> Self {
        let id = scene.id.clone();
        let duration = scene.duration_ms;
        Self::builder(id.clone())
            .scene(id, duration, move || scene.clone())
            .build()
    }
}

impl Program for SequenceProgram {
    fn program_id(&self) -> &str {
        &self.id
    }

    fn duration_ms(&self) -> f64 {
        self.duration_ms
    }

    fn scenes(&self) -> &[SceneRef] {
        &self.scenes
    }

    fn metadata(&self) -> Option<&serde_json::Value> {
        self.metadata.as_ref()
    }
}

/// Builder for [`SequenceProgram`].
///
/// Does not validate; a pipeline validates when it compiles the program.
#[derive(Debug)]
pub struct SequenceProgramBuilder {
    id: String,
    cursor_ms: f64,
    duration_ms: Option<f64>,
    scenes: Vec<SceneRef>,
    metadata: Option<serde_json::Value>,
}

impl SequenceProgramBuilder {
    /// Append a scene right after the previous one.
    pub fn scene(
        mut self,
        id: impl Into<String>,
        duration_ms: f64,
        factory: impl Fn() -> Scene + Send + Sync + 'static,
    ) -> Self {
        let start = self.cursor_ms;
        self.cursor_ms = start + duration_ms;
        self.scenes
            .push(SceneRef::new(id, start, self.cursor_ms, factory));
        self
    }

    /// Place a scene at explicit bounds.
    pub fn scene_at(
        mut self,
        id: impl Into<String>,
        start_ms: f64,
        end_ms: f64,
        factory: impl Fn() -> Scene + Send + Sync + 'static,
    ) -> Self {
        self.cursor_ms = self.cursor_ms.max(end_ms);
        self.scenes.push(SceneRef::new(id, start_ms, end_ms, factory));
        self
    }

    /// Leave `ms` of empty program time.
    pub fn gap(mut self, ms: f64) -> Self {
        self.cursor_ms += ms;
        self
    }

    /// Override the total duration (defaults to the end of the last scene or gap).
    pub fn duration(mut self, ms: f64) -> Self {
        self.duration_ms = Some(ms);
        self
    }

    pub fn metadata(mut self, value: serde_json::Value) -> Self {
        self.metadata = Some(value);
        self
    }

    pub fn build(self) -> SequenceProgram {
        SequenceProgram {
            duration_ms: self.duration_ms.unwrap_or(self.cursor_ms),
            id: self.id,
            scenes: self.scenes,
            metadata: self.metadata,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/program.rs"]
mod tests;
