use serde::Serialize;

use crate::compile::compiled::{BeamEvent, ChartRoleState};

/// Composite transform applied to the UI layer.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct UiTransform {
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
    /// Uniform scale factor.
    pub scale: f64,
    /// Blur radius in pixels.
    pub blur: f64,
}

impl UiTransform {
    /// Untouched UI: opaque, unscaled, sharp.
    pub const IDENTITY: Self = Self {
        opacity: 1.0,
        scale: 1.0,
        blur: 0.0,
    };

    /// Reduced UI while a narrative caption is on screen.
    pub const CINEMA: Self = Self {
        opacity: 0.2,
        scale: 0.9,
        blur: 12.0,
    };
}

impl Default for UiTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Which overlay won the UI transform chain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UiMode {
    /// No overlay.
    #[default]
    Normal,
    /// Breathing modulation on scale.
    Breathing,
    /// Implosion collapse in progress or complete.
    Imploding,
    /// Narrative caption shown.
    Cinema,
}

/// Implosion ramp and the transform it implies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct ImplosionState {
    /// Eased progress in `[0, 1]`.
    pub progress: f64,
    /// `1 - progress`.
    pub scale: f64,
    /// `1 - progress`.
    pub opacity: f64,
}

/// Everything visible at one instant, derived from elapsed time alone.
///
/// Produced fresh by every [`crate::StateResolver::state_at`] call and never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineState {
    /// Elapsed time the state was resolved for (negative input clamped to 0).
    pub elapsed_ms: f64,
    /// Active phase name.
    pub phase: String,
    /// Progress through the active phase in `[0, 1]`.
    pub phase_intensity: f64,
    /// Active macro-phase name.
    pub macro_phase: String,
    /// Chart styling; `None` when the document has no chart roles.
    pub chart: Option<ChartRoleState>,
    /// Composite UI transform.
    pub ui: UiTransform,
    /// Overlay that produced [`Self::ui`].
    pub ui_mode: UiMode,
    /// Caption text, if a narrative window is active.
    pub narrative_text: Option<String>,
    /// Header text, if a header window is active.
    pub dynamic_header: Option<String>,
    /// Beam charging or firing, if any.
    pub beam: Option<BeamEvent>,
    /// Number of beams whose firing has ended.
    pub settled_tasks: usize,
    /// Task hit within the last impact window, if any.
    pub recent_impact: Option<usize>,
    /// Task progress percentage in `[0, 100]`.
    pub task_progress_pct: f64,
    /// Breathing scale offset (0 outside the window).
    pub breathing: f64,
    /// Brand reveal progress in `[0, 1]`.
    pub brand_progress: f64,
    /// Implosion ramp.
    pub implosion: ImplosionState,
}
