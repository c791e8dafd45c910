use super::*;
use crate::spec::defaults::default_spec;

#[test]
fn from_spec_spans_the_timeline() {
    let scene = Scene::from_spec("main", &default_spec());
    assert_eq!(scene.id, "main");
    assert_eq!(scene.duration_ms, 26_000.0);
    assert_eq!(scene.elements.len(), ElementKind::ALL.len());
    assert!(scene.elements.windows(2).all(|w| w[0].z < w[1].z));
}

#[test]
fn standard_stack_carries_static_content() {
    let scene = Scene::from_spec("main", &default_spec());
    let tasks = scene
        .elements
        .iter()
        .find(|e| e.kind == ElementKind::TaskList)
        .unwrap();
    assert_eq!(tasks.params["tasks"][0], "Scan exposure");

    let logo = scene
        .elements
        .iter()
        .find(|e| e.kind == ElementKind::Logo)
        .unwrap();
    assert_eq!(logo.params["text"], "CLARITY");
}

#[test]
fn resolver_shares_the_compiled_spec() {
    let scene = Scene::from_spec("main", &default_spec());
    let r = scene.resolver();
    assert!(std::ptr::eq(r.compiled(), &*scene.spec));
    assert_eq!(r.state_at(2_000.0).phase, "SIGNAL");
}

#[test]
fn element_config_parses_with_defaults() {
    let cfg: ElementConfig = serde_json::from_str(r#"{ "kind": "task_list" }"#).unwrap();
    assert_eq!(cfg.kind, ElementKind::TaskList);
    assert_eq!(cfg.z, 0);
    assert!(cfg.params.is_null());
}

#[test]
fn labels_come_from_the_kind() {
    assert_eq!(ElementKind::TaskList.label(), "Task list");
    assert_eq!(ElementKind::Logo.to_string(), "Logo");
}

#[test]
fn extra_elements_append_after_the_standard_set() {
    let scene = Scene::from_spec("main", &default_spec())
        .with_element(ElementConfig::new(ElementKind::Caption, 500));
    assert_eq!(scene.elements.len(), ElementKind::ALL.len() + 1);
    assert_eq!(scene.elements.last().unwrap().z, 500);
}
