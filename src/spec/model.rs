use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::animation::ease::Ease;

/// A complete declarative timeline document.
///
/// This is the JSON-facing, human-authored representation. It is checked by
/// [`crate::SpecLoader`] and turned into query-friendly tables by [`crate::CompiledSpec::compile`].
/// All times are milliseconds from the start of the timeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineSpec {
    /// Total timeline length in milliseconds.
    pub duration: f64,
    /// Fine-grained named phases; gapless, covering `[0, duration)`.
    pub phases: BTreeMap<String, PhaseRange>,
    /// Coarse named phases with the same coverage invariant.
    pub macro_phases: BTreeMap<String, PhaseRange>,
    /// Caption windows; showing one puts the UI into cinema mode.
    pub narrative_windows: Vec<TextWindow>,
    /// Header text windows.
    pub dynamic_headers: Vec<TextWindow>,
    /// Ordered beam events, one per task impact.
    pub beam_schedule: Vec<BeamEntry>,
    /// Chart styling envelopes in author order.
    pub chart_roles: Vec<ChartRoleEntry>,
    /// Optional cyclic UI scale modulation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui_breathing: Option<BreathingWindow>,
    /// Optional brand reveal ramp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<RampWindow>,
    /// Optional UI collapse ramp preceding the brand reveal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub implosion: Option<RampWindow>,
    /// Phase boundaries driving the task progress percentage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_progress: Option<TaskProgressSpan>,
    /// Task labels, indexed by [`BeamEntry::task_index`].
    #[serde(default)]
    pub tasks: Vec<String>,
    /// Brand word mark.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_text: Option<String>,
    /// Line shown under the brand.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tagline: Option<String>,
    /// Secondary line shown under the tagline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
}

/// Half-open phase range `[from, to)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhaseRange {
    /// Inclusive start.
    pub from: f64,
    /// Exclusive end.
    pub to: f64,
}

/// Text shown over `[start, end)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextWindow {
    /// Inclusive start.
    pub start: f64,
    /// Exclusive end.
    pub end: f64,
    /// Text payload.
    pub text: String,
}

/// One beam impact. The beam charges for a fixed lead time before `start`, then fires until `end`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeamEntry {
    /// Firing start.
    pub start: f64,
    /// Firing end; the task counts as settled from here on.
    pub end: f64,
    /// Index into [`TimelineSpec::tasks`].
    pub task_index: usize,
}

/// Chart styling envelope over `[start, end)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChartRoleEntry {
    /// Role name (for example `"signal"`).
    pub role: String,
    /// Inclusive start.
    pub start: f64,
    /// Exclusive end.
    pub end: f64,
    /// Opacity at start/end.
    pub opacity: Envelope,
    /// Blur radius at start/end.
    pub blur: Envelope,
    /// Scale factor at start/end.
    pub scale: Envelope,
    /// Easing between start and end values.
    #[serde(default = "default_role_ease")]
    pub ease: Ease,
}

pub(crate) fn default_role_ease() -> Ease {
    Ease::Smoothstep
}

/// Start and end value of an interpolated channel.
///
/// Accepts `[start, end]` or `{ "start": s, "end": e }`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Envelope {
    /// Value at the envelope start.
    pub start: f64,
    /// Value at the envelope end.
    pub end: f64,
}

impl Envelope {
    /// Envelope from explicit endpoints.
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Envelope holding one value.
    pub fn constant(v: f64) -> Self {
        Self { start: v, end: v }
    }
}

impl<'de> Deserialize<'de> for Envelope {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Arr([f64; 2]),
            Obj { start: f64, end: f64 },
        }

        match Repr::deserialize(deserializer)? {
            Repr::Arr([start, end]) => Ok(Self { start, end }),
            Repr::Obj { start, end } => Ok(Self { start, end }),
        }
    }
}

/// Sine modulation of UI scale over `[start, end)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreathingWindow {
    /// Inclusive start.
    pub start: f64,
    /// Exclusive end.
    pub end: f64,
    /// Peak scale offset.
    pub amplitude: f64,
    /// Length of one full sine cycle.
    #[serde(default = "default_breathing_period_ms")]
    pub period_ms: f64,
}

pub(crate) fn default_breathing_period_ms() -> f64 {
    4000.0
}

/// Ramp window described by a start time and a duration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RampWindow {
    /// Ramp start.
    pub start: f64,
    /// Ramp length; must be > 0.
    pub duration: f64,
}

/// Names of the phases whose starts bound the task progress ramp.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskProgressSpan {
    /// Progress is 0% at this phase's start.
    pub start_phase: String,
    /// Progress is 100% at this phase's start.
    pub end_phase: String,
}

impl Default for TaskProgressSpan {
    fn default() -> Self {
        Self {
            start_phase: "EXECUTION".to_owned(),
            end_phase: "SETTLEMENT".to_owned(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/spec/model.rs"]
mod tests;
