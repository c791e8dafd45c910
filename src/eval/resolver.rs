use std::f64::consts::TAU;
use std::sync::Arc;

use crate::compile::compiled::CompiledSpec;
use crate::eval::state::{ImplosionState, TimelineState, UiMode, UiTransform};
use crate::foundation::math::{clamp01, smoothstep};
use crate::spec::model::TimelineSpec;

/// How long a task stays "recently impacted" after its beam ends.
pub const IMPACT_WINDOW_MS: f64 = 400.0;

/// Pure `elapsed -> TimelineState` resolution over one compiled spec.
///
/// Holds nothing but the shared, immutable [`CompiledSpec`]; two calls with the same elapsed
/// value return equal states regardless of how time is being driven.
#[derive(Clone, Debug)]
pub struct StateResolver {
    spec: Arc<CompiledSpec>,
}

impl StateResolver {
    /// Resolver over an already compiled spec.
    pub fn new(spec: Arc<CompiledSpec>) -> Self {
        Self { spec }
    }

    /// Compile `spec` and wrap it.
    pub fn from_spec(spec: &TimelineSpec) -> Self {
        Self::new(Arc::new(CompiledSpec::compile(spec)))
    }

    /// The compiled tables this resolver reads.
    pub fn compiled(&self) -> &CompiledSpec {
        &self.spec
    }

    /// Resolve the complete state at `elapsed_ms`.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn state_at(&self, elapsed_ms: f64) -> TimelineState {
        let spec = &*self.spec;
        let t = if elapsed_ms >= 0.0 { elapsed_ms } else { 0.0 };

        let phase = spec.find_phase_at(t);
        let phase_intensity = if phase.duration() > 0.0 {
            clamp01((t - phase.from) / phase.duration())
        } else {
            1.0
        };
        let macro_phase = spec.find_macro_phase_at(t);
        let chart = spec.find_chart_role_at(t);
        let narrative_text = spec.find_narrative_window(t).map(|w| w.text.clone());
        let dynamic_header = spec.find_dynamic_header(t).map(|w| w.text.clone());
        let beam = spec.find_beam_event(t);

        let settled_tasks = spec.beams().iter().filter(|b| b.end <= t).count();
        let recent_impact = spec
            .beams()
            .iter()
            .rev()
            .find(|b| b.end <= t && t < b.end + IMPACT_WINDOW_MS)
            .map(|b| b.task_index);

        let task_progress_pct = spec
            .task_progress_span()
            .map(|(start, end)| clamp01((t - start) / (end - start)) * 100.0)
            .unwrap_or(0.0);

        let breathing_active = spec
            .breathing()
            .is_some_and(|b| b.start <= t && t < b.end);
        let breathing = match spec.breathing() {
            Some(b) if breathing_active => b.amplitude * (TAU * (t - b.start) / b.period_ms).sin(),
            _ => 0.0,
        };

        let brand_progress = spec
            .brand()
            .map(|b| clamp01((t - b.start) / b.duration))
            .unwrap_or(0.0);

        let implosion_progress = spec
            .implosion()
            .map(|w| smoothstep((t - w.start) / w.duration))
            .unwrap_or(0.0);
        let implosion = ImplosionState {
            progress: implosion_progress,
            scale: 1.0 - implosion_progress,
            opacity: 1.0 - implosion_progress,
        };

        // Override chain, lowest priority first.
        let mut ui = UiTransform::IDENTITY;
        let mut ui_mode = UiMode::Normal;
        if breathing_active {
            ui.scale += breathing;
            ui_mode = UiMode::Breathing;
        }
        if implosion_progress > 0.0 {
            ui.opacity = implosion.opacity;
            ui.scale = implosion.scale;
            ui_mode = UiMode::Imploding;
        }
        if narrative_text.is_some() {
            ui = UiTransform::CINEMA;
            ui_mode = UiMode::Cinema;
        }

        TimelineState {
            elapsed_ms: t,
            phase: phase.name.clone(),
            phase_intensity,
            macro_phase: macro_phase.name.clone(),
            chart,
            ui,
            ui_mode,
            narrative_text,
            dynamic_header,
            beam,
            settled_tasks,
            recent_impact,
            task_progress_pct,
            breathing,
            brand_progress,
            implosion,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/eval/resolver.rs"]
mod tests;
