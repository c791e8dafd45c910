use super::*;

#[test]
fn envelope_accepts_array_and_object() {
    let a: Envelope = serde_json::from_str("[0.5, 1.0]").unwrap();
    let b: Envelope = serde_json::from_str(r#"{"start": 0.5, "end": 1.0}"#).unwrap();
    assert_eq!(a, b);
    assert_eq!(a, Envelope::new(0.5, 1.0));
    assert!(serde_json::from_str::<Envelope>("[1.0]").is_err());
}

#[test]
fn beam_entry_uses_camel_case() {
    let b: BeamEntry =
        serde_json::from_str(r#"{"start": 10, "end": 20, "taskIndex": 3}"#).unwrap();
    assert_eq!(b.task_index, 3);
    assert_eq!(b.start, 10.0);
}

#[test]
fn breathing_period_defaults() {
    let w: BreathingWindow =
        serde_json::from_str(r#"{"start": 0, "end": 100, "amplitude": 0.1}"#).unwrap();
    assert_eq!(w.period_ms, 4000.0);
}

#[test]
fn optional_sections_default_to_none() {
    let s = r#"{
        "duration": 100,
        "phases": {"A": {"from": 0, "to": 100}},
        "macroPhases": {"M": {"from": 0, "to": 100}},
        "narrativeWindows": [],
        "dynamicHeaders": [],
        "beamSchedule": [],
        "chartRoles": []
    }"#;
    let spec: TimelineSpec = serde_json::from_str(s).unwrap();
    assert!(spec.ui_breathing.is_none());
    assert!(spec.brand.is_none());
    assert!(spec.implosion.is_none());
    assert!(spec.task_progress.is_none());
    assert!(spec.tasks.is_empty());
}

#[test]
fn chart_role_ease_defaults_to_smoothstep() {
    let role: ChartRoleEntry = serde_json::from_str(
        r#"{ "role": "r", "start": 0, "end": 10,
             "opacity": [0, 1], "blur": [0, 0], "scale": [1, 1] }"#,
    )
    .unwrap();
    assert_eq!(role.ease, Ease::Smoothstep);

    let linear: ChartRoleEntry = serde_json::from_str(
        r#"{ "role": "r", "start": 0, "end": 10,
             "opacity": [0, 1], "blur": [0, 0], "scale": [1, 1], "ease": "linear" }"#,
    )
    .unwrap();
    assert_eq!(linear.ease, Ease::Linear);
}
