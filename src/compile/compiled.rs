use serde::Serialize;

use crate::foundation::math::lerp;
use crate::spec::model::{
    BreathingWindow, ChartRoleEntry, PhaseRange, RampWindow, TaskProgressSpan, TextWindow,
    TimelineSpec,
};

/// How long a beam charges before it fires.
pub const CHARGE_LEAD_MS: f64 = 100.0;

const UNSPECIFIED_PHASE: &str = "UNSPECIFIED";

/// A named half-open range `[from, to)`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NamedRange {
    /// Phase name.
    pub name: String,
    /// Inclusive start.
    pub from: f64,
    /// Exclusive end.
    pub to: f64,
}

impl NamedRange {
    /// Return `true` when `t` is inside `[from, to)`.
    pub fn contains(&self, t: f64) -> bool {
        self.from <= t && t < self.to
    }

    /// Length of the range.
    pub fn duration(&self) -> f64 {
        (self.to - self.from).max(0.0)
    }
}

/// Beam entry with its derived charge start.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledBeam {
    /// Start of the charging window, `start - CHARGE_LEAD_MS`.
    pub charge_start: f64,
    /// Firing start.
    pub start: f64,
    /// Firing end.
    pub end: f64,
    /// Task this beam hits.
    pub task_index: usize,
}

/// Sub-window of a beam event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BeamPhase {
    /// Lead-in before impact.
    Charging,
    /// Impact in progress.
    Firing,
}

/// The beam active at some instant.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BeamEvent {
    /// Task being hit.
    pub task_index: usize,
    /// Progress through the current sub-window, `[0, 1)`.
    pub progress: f64,
    /// Which sub-window is active.
    pub phase: BeamPhase,
}

/// Interpolated chart styling.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartRoleState {
    /// Active (or held) role name.
    pub role: String,
    /// Opacity.
    pub opacity: f64,
    /// Blur radius.
    pub blur: f64,
    /// Scale factor.
    pub scale: f64,
}

/// Read-only lookup tables compiled from a [`TimelineSpec`].
///
/// Phases and windows are sorted by start, beams carry their charge start, chart roles stay in
/// author order. Built once per scene and never mutated.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledSpec {
    duration: f64,
    phases: Vec<NamedRange>,
    macro_phases: Vec<NamedRange>,
    narrative_windows: Vec<TextWindow>,
    dynamic_headers: Vec<TextWindow>,
    beams: Vec<CompiledBeam>,
    chart_roles: Vec<ChartRoleEntry>,
    breathing: Option<BreathingWindow>,
    brand: Option<RampWindow>,
    implosion: Option<RampWindow>,
    task_progress_span: Option<(f64, f64)>,
    tasks: Vec<String>,
    brand_text: Option<String>,
    tagline: Option<String>,
    subtitle: Option<String>,
}

impl CompiledSpec {
    /// Compile a document. Pure and total.
    ///
    /// An empty phase map (only possible for documents that skipped
    /// [`crate::SpecLoader::validate`]) compiles to a single phase spanning the duration so that
    /// phase lookups stay infallible.
    pub fn compile(spec: &TimelineSpec) -> Self {
        let phases = sorted_ranges(&spec.phases, spec.duration);
        let macro_phases = sorted_ranges(&spec.macro_phases, spec.duration);

        let mut narrative_windows = spec.narrative_windows.clone();
        narrative_windows.sort_by(|a, b| a.start.total_cmp(&b.start));
        let mut dynamic_headers = spec.dynamic_headers.clone();
        dynamic_headers.sort_by(|a, b| a.start.total_cmp(&b.start));

        let beams = spec
            .beam_schedule
            .iter()
            .map(|b| CompiledBeam {
                charge_start: b.start - CHARGE_LEAD_MS,
                start: b.start,
                end: b.end,
                task_index: b.task_index,
            })
            .collect();

        let span = spec.task_progress.clone().unwrap_or_default();
        let task_progress_span = resolve_task_span(&phases, &span);

        Self {
            duration: spec.duration,
            phases,
            macro_phases,
            narrative_windows,
            dynamic_headers,
            beams,
            chart_roles: spec.chart_roles.clone(),
            breathing: spec.ui_breathing,
            brand: spec.brand,
            implosion: spec.implosion,
            task_progress_span,
            tasks: spec.tasks.clone(),
            brand_text: spec.brand_text.clone(),
            tagline: spec.tagline.clone(),
            subtitle: spec.subtitle.clone(),
        }
    }

    /// Phase containing `t`; the final phase once `t` reaches the duration, the first before 0.
    pub fn find_phase_at(&self, t: f64) -> &NamedRange {
        find_range(&self.phases, t)
    }

    /// Macro-phase containing `t`, with the same clamping as [`Self::find_phase_at`].
    pub fn find_macro_phase_at(&self, t: f64) -> &NamedRange {
        find_range(&self.macro_phases, t)
    }

    /// First narrative window containing `t`.
    pub fn find_narrative_window(&self, t: f64) -> Option<&TextWindow> {
        self.narrative_windows
            .iter()
            .find(|w| w.start <= t && t < w.end)
    }

    /// First dynamic header containing `t`.
    pub fn find_dynamic_header(&self, t: f64) -> Option<&TextWindow> {
        self.dynamic_headers
            .iter()
            .find(|w| w.start <= t && t < w.end)
    }

    /// Beam charging or firing at `t`, in schedule order.
    pub fn find_beam_event(&self, t: f64) -> Option<BeamEvent> {
        for b in &self.beams {
            if b.charge_start <= t && t < b.start {
                return Some(BeamEvent {
                    task_index: b.task_index,
                    progress: (t - b.charge_start) / CHARGE_LEAD_MS,
                    phase: BeamPhase::Charging,
                });
            }
            if b.start <= t && t < b.end {
                return Some(BeamEvent {
                    task_index: b.task_index,
                    progress: (t - b.start) / (b.end - b.start),
                    phase: BeamPhase::Firing,
                });
            }
        }
        None
    }

    /// Chart styling at `t`.
    ///
    /// Inside a role the channels are eased (smoothstep unless the role says otherwise) between its
    /// start and end values.
    /// Between or after roles the most recently ended role's end values are held; before the
    /// first role its start values apply. `None` only when no roles are authored.
    pub fn find_chart_role_at(&self, t: f64) -> Option<ChartRoleState> {
        if let Some(role) = self.chart_roles.iter().find(|r| r.start <= t && t < r.end) {
            let local = (t - role.start) / (role.end - role.start);
            let e = role.ease.apply(local);
            return Some(ChartRoleState {
                role: role.role.clone(),
                opacity: lerp(role.opacity.start, role.opacity.end, e),
                blur: lerp(role.blur.start, role.blur.end, e),
                scale: lerp(role.scale.start, role.scale.end, e),
            });
        }

        if let Some(role) = self.chart_roles.iter().rev().find(|r| r.end <= t) {
            return Some(ChartRoleState {
                role: role.role.clone(),
                opacity: role.opacity.end,
                blur: role.blur.end,
                scale: role.scale.end,
            });
        }

        self.chart_roles.first().map(|role| ChartRoleState {
            role: role.role.clone(),
            opacity: role.opacity.start,
            blur: role.blur.start,
            scale: role.scale.start,
        })
    }

    /// Total duration.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Phases sorted by start.
    pub fn phases(&self) -> &[NamedRange] {
        &self.phases
    }

    /// Macro-phases sorted by start.
    pub fn macro_phases(&self) -> &[NamedRange] {
        &self.macro_phases
    }

    /// Look up a phase by name.
    pub fn phase_named(&self, name: &str) -> Option<&NamedRange> {
        self.phases.iter().find(|p| p.name == name)
    }

    /// Beams in schedule order.
    pub fn beams(&self) -> &[CompiledBeam] {
        &self.beams
    }

    /// Chart roles in author order.
    pub fn chart_roles(&self) -> &[ChartRoleEntry] {
        &self.chart_roles
    }

    /// Breathing window, if any.
    pub fn breathing(&self) -> Option<&BreathingWindow> {
        self.breathing.as_ref()
    }

    /// Brand reveal window, if any.
    pub fn brand(&self) -> Option<&RampWindow> {
        self.brand.as_ref()
    }

    /// Implosion window, if any.
    pub fn implosion(&self) -> Option<&RampWindow> {
        self.implosion.as_ref()
    }

    /// `(start, end)` of the task progress ramp when both named phases exist.
    pub fn task_progress_span(&self) -> Option<(f64, f64)> {
        self.task_progress_span
    }

    /// Task labels.
    pub fn tasks(&self) -> &[String] {
        &self.tasks
    }

    /// Brand word mark.
    pub fn brand_text(&self) -> Option<&str> {
        self.brand_text.as_deref()
    }

    /// Tagline.
    pub fn tagline(&self) -> Option<&str> {
        self.tagline.as_deref()
    }

    /// Subtitle.
    pub fn subtitle(&self) -> Option<&str> {
        self.subtitle.as_deref()
    }
}

fn sorted_ranges(
    map: &std::collections::BTreeMap<String, PhaseRange>,
    duration: f64,
) -> Vec<NamedRange> {
    let mut out: Vec<NamedRange> = map
        .iter()
        .map(|(name, r)| NamedRange {
            name: name.clone(),
            from: r.from,
            to: r.to,
        })
        .collect();
    out.sort_by(|a, b| a.from.total_cmp(&b.from));
    if out.is_empty() {
        out.push(NamedRange {
            name: UNSPECIFIED_PHASE.to_owned(),
            from: 0.0,
            to: duration.max(0.0),
        });
    }
    out
}

// `ranges` is sorted, gapless and non-empty: the latest range starting at or before `t`
// contains it, or is the final range once `t` passes the end.
fn find_range(ranges: &[NamedRange], t: f64) -> &NamedRange {
    let idx = ranges.partition_point(|r| r.from <= t);
    &ranges[idx.saturating_sub(1)]
}

fn resolve_task_span(phases: &[NamedRange], span: &TaskProgressSpan) -> Option<(f64, f64)> {
    let start = phases.iter().find(|p| p.name == span.start_phase)?.from;
    let end = phases.iter().find(|p| p.name == span.end_phase)?.from;
    (end > start).then_some((start, end))
}

#[cfg(test)]
#[path = "../../tests/unit/compile/compiled.rs"]
mod tests;
