use super::*;
use serde_json::json;

#[test]
fn display_list_backend_builds_every_kind() {
    let mut backend = create_backend(BackendKind::DisplayList);
    assert_eq!(backend.name(), "display-list");
    for kind in ElementKind::ALL {
        let el = backend.create(&ElementConfig::new(kind, 0)).unwrap();
        assert_eq!(el.kind(), kind);
    }
}

#[test]
fn bad_params_are_element_errors() {
    let mut backend = DisplayListBackend;
    let cfg = ElementConfig::new(ElementKind::TaskList, 0).with_params(json!({ "tasks": 5 }));
    let err = backend.create(&cfg).err().unwrap();
    assert!(matches!(err, crate::ReelError::Element(_)));
    assert!(err.to_string().contains("Task list"), "{err}");
}

#[test]
fn null_backend_ignores_params() {
    let mut backend = create_backend(BackendKind::Null);
    let cfg = ElementConfig::new(ElementKind::Logo, 3).with_params(json!({ "size": "huge" }));
    assert_eq!(backend.create(&cfg).unwrap().kind(), ElementKind::Logo);
}
