use super::*;
use serde_json::json;

use crate::eval::resolver::StateResolver;
use crate::spec::defaults::default_spec;

fn ctx() -> ElementContext {
    ElementContext::default()
}

fn state_at(t: f64) -> TimelineState {
    StateResolver::from_spec(&default_spec()).state_at(t)
}

fn drawn(el: &dyn Element) -> DisplayList {
    let mut out = DisplayList::new();
    el.render(&mut out);
    out
}

#[test]
fn update_before_mount_fails() {
    let mut el = CaptionElement::new(0, CaptionParams::default());
    let err = el.update(16.0, &state_at(2_000.0), &ctx()).unwrap_err();
    assert!(matches!(err, ReelError::Element(_)));
}

#[test]
fn caption_shows_narrative_text() {
    let mut el = CaptionElement::new(50, CaptionParams::default());
    el.mount(&ctx()).unwrap();
    el.update(16.0, &state_at(2_000.0), &ctx()).unwrap();
    let list = drawn(&el);
    assert_eq!(list.texts().collect::<Vec<_>>(), ["Markets move. Risk hides."]);
    assert_eq!(list.commands()[0].z(), 50);

    el.update(16.0, &state_at(4_000.0), &ctx()).unwrap();
    assert!(drawn(&el).is_empty());
}

#[test]
fn chart_composes_role_with_cinema_transform() {
    let mut el = ChartElement::new(10, ChartParams::default());
    el.mount(&ctx()).unwrap();
    let state = state_at(2_000.0);
    el.update(16.0, &state, &ctx()).unwrap();
    let list = drawn(&el);
    let DrawCommand::Layer {
        opacity,
        blur,
        label,
        ..
    } = &list.commands()[0]
    else {
        panic!("expected a layer, got {:?}", list.commands());
    };
    let chart = state.chart.unwrap();
    assert_eq!(label, "signal");
    assert!((opacity - chart.opacity * UiTransform::CINEMA.opacity).abs() < 1e-12);
    assert!((blur - (chart.blur + UiTransform::CINEMA.blur)).abs() < 1e-12);
}

#[test]
fn beam_points_at_its_task_row() {
    let c = ctx();
    let mut el = BeamElement::new(30, BeamParams::default());
    el.mount(&c).unwrap();
    el.update(16.0, &state_at(13_400.0), &c).unwrap();
    let list = drawn(&el);
    let DrawCommand::Beam { to, charging, .. } = list.commands()[0] else {
        panic!("expected a beam");
    };
    assert!(!charging);
    assert_eq!(to.y, c.layout.task_row(0, 4).center().y);

    el.update(16.0, &state_at(11_000.0), &c).unwrap();
    assert!(drawn(&el).is_empty());
}

#[test]
fn task_list_marks_settled_rows_and_progress() {
    let params: TaskListParams = serde_json::from_value(json!({
        "tasks": ["a", "b", "c", "d"],
        "settledColor": [1, 1, 1, 255],
    }))
    .unwrap();
    let mut el = TaskListElement::new(20, params);
    el.mount(&ctx()).unwrap();
    el.update(16.0, &state_at(16_000.0), &ctx()).unwrap();
    let list = drawn(&el);
    let settled = list
        .commands()
        .iter()
        .filter(|c| matches!(c, DrawCommand::Fill { color: [1, 1, 1, 255], .. }))
        .count();
    assert_eq!(settled, 2);
    assert_eq!(list.texts().count(), 4);
}

#[test]
fn logo_fades_in_with_brand_progress() {
    let params: LogoParams = serde_json::from_value(json!({
        "text": "CLARITY",
        "tagline": "See the risk.",
    }))
    .unwrap();
    let mut el = LogoElement::new(60, params);
    el.mount(&ctx()).unwrap();

    el.update(16.0, &state_at(20_000.0), &ctx()).unwrap();
    assert!(drawn(&el).is_empty());

    el.update(16.0, &state_at(22_000.0), &ctx()).unwrap();
    assert_eq!(drawn(&el).texts().collect::<Vec<_>>(), ["CLARITY"]);

    el.update(16.0, &state_at(24_000.0), &ctx()).unwrap();
    assert_eq!(drawn(&el).len(), 2);
}

#[test]
fn disposed_elements_draw_nothing_and_dispose_is_idempotent() {
    let mut el = HeaderElement::new(40, HeaderParams::default());
    el.mount(&ctx()).unwrap();
    el.update(16.0, &state_at(9_000.0), &ctx()).unwrap();
    assert_eq!(drawn(&el).len(), 1);
    el.dispose().unwrap();
    el.dispose().unwrap();
    el.destroy().unwrap();
    el.destroy().unwrap();
    assert!(drawn(&el).is_empty());
    assert!(el.update(16.0, &state_at(9_000.0), &ctx()).is_err());
}

#[test]
fn null_params_mean_defaults() {
    let cfg = ElementConfig::new(ElementKind::Background, 0);
    let params: BackgroundParams = parse_params(&cfg).unwrap();
    assert_eq!(params.color, BackgroundParams::default().color);
}
