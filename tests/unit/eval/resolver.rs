use super::*;
use crate::compile::compiled::BeamPhase;
use crate::spec::defaults::default_spec;
use crate::spec::model::TextWindow;

fn resolver() -> StateResolver {
    StateResolver::from_spec(&default_spec())
}

#[test]
fn same_elapsed_yields_identical_state() {
    let r = resolver();
    let other = resolver();
    let mut t = -250.0;
    while t < 27_000.0 {
        let a = r.state_at(t);
        let b = r.state_at(t);
        let c = other.state_at(t);
        assert_eq!(a, b, "t={t}");
        assert_eq!(a, c, "t={t}");
        t += 97.5;
    }
}

#[test]
fn signal_caption_at_two_seconds() {
    let s = resolver().state_at(2_000.0);
    assert_eq!(s.phase, "SIGNAL");
    assert_eq!(s.macro_phase, "ACT_PROBLEM");
    assert_eq!(s.chart.as_ref().unwrap().role, "signal");
    assert_eq!(s.narrative_text.as_deref(), Some("Markets move. Risk hides."));
    assert!((s.phase_intensity - 0.5).abs() < 1e-12);
    assert_eq!(s.ui_mode, UiMode::Cinema);
    assert_eq!(s.ui, UiTransform::CINEMA);
}

#[test]
fn first_beam_fires_during_execution() {
    let s = resolver().state_at(13_400.0);
    let beam = s.beam.unwrap();
    assert_eq!(beam.task_index, 0);
    assert_eq!(beam.phase, BeamPhase::Firing);
    assert!(beam.progress > 0.0);
    assert_eq!(s.dynamic_header.as_deref(), Some("Executing hedges"));
    assert_eq!(s.settled_tasks, 0);
    assert!((s.task_progress_pct - 100.0 * 1_400.0 / 6_000.0).abs() < 1e-9);
}

#[test]
fn brand_reveal_runs_in_logo_phase() {
    let s = resolver().state_at(23_000.0);
    assert_eq!(s.phase, "CLARITY_LOGO");
    assert!(s.brand_progress > 0.0 && s.brand_progress < 1.0);
    assert!((s.brand_progress - 0.6).abs() < 1e-12);
    assert_eq!(s.settled_tasks, 4);
    assert_eq!(s.task_progress_pct, 100.0);
}

#[test]
fn settled_count_and_recent_impact() {
    let r = resolver();
    assert_eq!(r.state_at(13_799.0).settled_tasks, 0);
    assert_eq!(r.state_at(13_799.0).recent_impact, None);

    let s = r.state_at(13_800.0);
    assert_eq!(s.settled_tasks, 1);
    assert_eq!(s.recent_impact, Some(0));
    assert!(s.beam.is_none());

    assert_eq!(r.state_at(14_199.0).recent_impact, Some(0));
    assert_eq!(r.state_at(14_200.0).recent_impact, None);
    assert_eq!(r.state_at(17_900.0).settled_tasks, 4);
    assert_eq!(r.state_at(17_900.0).recent_impact, Some(3));
}

#[test]
fn breathing_only_inside_its_window() {
    let r = resolver();
    let peak = r.state_at(12_750.0);
    assert_eq!(peak.ui_mode, UiMode::Breathing);
    assert!((peak.breathing - 0.015).abs() < 1e-12);
    assert!((peak.ui.scale - 1.015).abs() < 1e-12);
    assert_eq!(peak.ui.opacity, 1.0);

    let outside = r.state_at(11_999.0);
    assert_eq!(outside.breathing, 0.0);
    assert_eq!(r.state_at(18_000.0).breathing, 0.0);
}

#[test]
fn implosion_overrides_breathing_and_holds() {
    let r = resolver();
    let mid = r.state_at(20_500.0);
    assert_eq!(mid.ui_mode, UiMode::Imploding);
    assert!((mid.implosion.progress - 0.5).abs() < 1e-12);
    assert!((mid.ui.opacity - 0.5).abs() < 1e-12);
    assert!((mid.ui.scale - 0.5).abs() < 1e-12);
    assert_eq!(mid.ui.blur, 0.0);

    let after = r.state_at(25_000.0);
    assert_eq!(after.implosion.progress, 1.0);
    assert_eq!(after.ui.opacity, 0.0);

    let before = r.state_at(19_000.0);
    assert_eq!(before.implosion.progress, 0.0);
    assert_eq!(before.ui, UiTransform::IDENTITY);
    assert_eq!(before.ui_mode, UiMode::Normal);
}

#[test]
fn narrative_wins_over_every_overlay() {
    let mut spec = default_spec();
    spec.narrative_windows.push(TextWindow {
        start: 20_200.0,
        end: 20_800.0,
        text: "Collapse.".to_owned(),
    });
    spec.narrative_windows.push(TextWindow {
        start: 12_700.0,
        end: 12_800.0,
        text: "Breathe.".to_owned(),
    });
    let r = StateResolver::from_spec(&spec);

    let s = r.state_at(20_500.0);
    assert_eq!(s.ui_mode, UiMode::Cinema);
    assert_eq!(s.ui, UiTransform::CINEMA);
    assert!(s.implosion.progress > 0.0);

    let s = r.state_at(12_750.0);
    assert_eq!(s.ui, UiTransform::CINEMA);
    assert!(s.breathing > 0.0);
}

#[test]
fn negative_and_overflowing_elapsed_are_safe() {
    let r = resolver();
    assert_eq!(r.state_at(-500.0), r.state_at(0.0));
    assert_eq!(r.state_at(f64::NAN), r.state_at(0.0));

    let end = r.state_at(30_000.0);
    assert_eq!(end.phase, "CLARITY_LOGO");
    assert_eq!(end.phase_intensity, 1.0);
    assert_eq!(end.brand_progress, 1.0);
}

#[test]
fn missing_optional_sections_resolve_to_zero() {
    let mut spec = default_spec();
    spec.ui_breathing = None;
    spec.brand = None;
    spec.implosion = None;
    spec.chart_roles.clear();
    let s = StateResolver::from_spec(&spec).state_at(23_000.0);
    assert_eq!(s.breathing, 0.0);
    assert_eq!(s.brand_progress, 0.0);
    assert_eq!(s.implosion.progress, 0.0);
    assert_eq!(s.ui, UiTransform::IDENTITY);
    assert!(s.chart.is_none());
}
