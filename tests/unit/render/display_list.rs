use super::*;

fn text(z: i32, s: &str) -> DrawCommand {
    DrawCommand::Text {
        z,
        anchor: Point::ZERO,
        text: s.to_owned(),
        size: 12.0,
        color: [255; 4],
        opacity: 1.0,
    }
}

#[test]
fn sort_by_z_is_stable() {
    let mut list = DisplayList::new();
    list.push(text(5, "late"));
    list.push(text(0, "first"));
    list.push(text(5, "later"));
    list.push(text(0, "second"));
    list.sort_by_z();
    let order: Vec<_> = list.texts().collect();
    assert_eq!(order, ["first", "second", "late", "later"]);
}

#[test]
fn serializes_tagged_commands() {
    let mut list = DisplayList::new();
    list.push(DrawCommand::Fill {
        z: 1,
        rect: Rect::new(0.0, 0.0, 2.0, 3.0),
        color: [1, 2, 3, 4],
        opacity: 0.5,
    });
    let v = serde_json::to_value(&list).unwrap();
    assert_eq!(v[0]["op"], "fill");
    assert_eq!(v[0]["z"], 1);
    assert_eq!(v[0]["rect"]["x1"], 2.0);
    assert_eq!(list.len(), 1);
    assert!(!list.is_empty());
}
