use super::*;
use serde_json::json;

fn minimal() -> serde_json::Value {
    json!({
        "duration": 1000,
        "phases": {
            "INTRO": {"from": 0, "to": 400},
            "OUTRO": {"from": 400, "to": 1000}
        },
        "macroPhases": {"ALL": {"from": 0, "to": 1000}},
        "narrativeWindows": [{"start": 100, "end": 300, "text": "hello"}],
        "dynamicHeaders": [],
        "beamSchedule": [{"start": 500, "end": 600, "taskIndex": 0}],
        "chartRoles": [{
            "role": "base", "start": 0, "end": 1000,
            "opacity": [0, 1], "blur": [4, 0], "scale": {"start": 0.9, "end": 1}
        }]
    })
}

#[test]
fn valid_document_loads_verbatim() {
    let spec = SpecLoader::try_load_from_value(minimal()).unwrap();
    assert_eq!(spec.duration, 1000.0);
    assert_eq!(spec.phases.len(), 2);
    assert_eq!(spec.chart_roles[0].scale.start, 0.9);

    let spec2 = SpecLoader::load(&minimal().to_string());
    assert_eq!(spec, spec2);
}

#[test]
fn malformed_json_falls_back_to_default() {
    let spec = SpecLoader::load("{ not json");
    assert_eq!(spec, default_spec());
    assert!(SpecLoader::try_load("{ not json").is_err());
}

#[test]
fn missing_required_key_is_reported() {
    let mut v = minimal();
    v.as_object_mut().unwrap().remove("beamSchedule");
    let err = SpecLoader::try_load_from_value(v.clone()).unwrap_err();
    assert!(err.to_string().contains("beamSchedule"), "{err}");
    assert_eq!(SpecLoader::load_from_value(v), default_spec());
}

#[test]
fn empty_phase_map_is_rejected() {
    let mut v = minimal();
    v["phases"] = json!({});
    let err = SpecLoader::try_load_from_value(v).unwrap_err();
    assert!(err.to_string().contains("non-empty"), "{err}");
}

#[test]
fn wrong_container_types_are_rejected() {
    let mut v = minimal();
    v["chartRoles"] = json!({"a": 1});
    assert!(SpecLoader::try_load_from_value(v).is_err());

    let mut v = minimal();
    v["duration"] = json!("long");
    assert!(SpecLoader::try_load_from_value(v).is_err());

    assert!(SpecLoader::try_load_from_value(json!([1, 2, 3])).is_err());
}

#[test]
fn non_positive_duration_is_rejected() {
    let mut v = minimal();
    v["duration"] = json!(0);
    assert!(SpecLoader::try_load_from_value(v).is_err());
}

#[test]
fn phase_gaps_and_overlaps_are_rejected() {
    let mut gap = minimal();
    gap["phases"]["OUTRO"] = json!({"from": 450, "to": 1000});
    let err = SpecLoader::try_load_from_value(gap).unwrap_err();
    assert!(err.to_string().contains("gapless"), "{err}");

    let mut short = minimal();
    short["macroPhases"]["ALL"] = json!({"from": 0, "to": 900});
    assert!(SpecLoader::try_load_from_value(short).is_err());
}

#[test]
fn beams_closer_than_charge_lead_are_rejected() {
    let mut v = minimal();
    v["beamSchedule"] = json!([
        {"start": 500, "end": 600, "taskIndex": 0},
        {"start": 650, "end": 700, "taskIndex": 1}
    ]);
    let err = SpecLoader::try_load_from_value(v).unwrap_err();
    assert!(err.to_string().contains("charges before"), "{err}");

    let mut ok = minimal();
    ok["beamSchedule"] = json!([
        {"start": 500, "end": 600, "taskIndex": 0},
        {"start": 700, "end": 800, "taskIndex": 1}
    ]);
    assert!(SpecLoader::try_load_from_value(ok).is_ok());
}

#[test]
fn optional_windows_are_checked() {
    let mut v = minimal();
    v["brand"] = json!({"start": 800, "duration": 0});
    assert!(SpecLoader::try_load_from_value(v).is_err());

    let mut v = minimal();
    v["uiBreathing"] = json!({"start": 0, "end": 100, "amplitude": 0.1, "periodMs": 0});
    assert!(SpecLoader::try_load_from_value(v).is_err());
}

#[test]
fn default_spec_passes_its_own_validation() {
    SpecLoader::validate(&default_spec()).unwrap();
}

#[test]
fn missing_file_falls_back() {
    let spec = SpecLoader::load_from_path("definitely/not/here.json");
    assert_eq!(spec, default_spec());
}
