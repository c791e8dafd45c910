use super::*;
use crate::export::session::QualityPreset;
use crate::render::display_list::DisplayList;

fn header() -> ExportHeader {
    ExportHeader {
        program_id: "demo".to_owned(),
        width: 640,
        height: 360,
        fps: 10.0,
        duration_ms: 200.0,
        frame_count: 2,
        quality: QualityPreset::Draft,
    }
}

fn frame(index: u64) -> FrameRecord {
    FrameRecord {
        index,
        elapsed_ms: index as f64 * 100.0,
        scene_id: None,
        state: None,
        fingerprint: None,
        display_list: DisplayList::new(),
    }
}

#[test]
fn in_memory_sink_keeps_everything() {
    let mut sink = InMemorySink::new();
    sink.begin(&header()).unwrap();
    sink.push_frame(&frame(0)).unwrap();
    sink.push_frame(&frame(1)).unwrap();
    let stats = ExportStats {
        frames_total: 2,
        frames_static: 0,
        aborted: false,
    };
    sink.end(&stats).unwrap();
    assert_eq!(sink.header().unwrap().program_id, "demo");
    assert_eq!(sink.frames().len(), 2);
    assert_eq!(sink.stats(), Some(stats));
}

#[test]
fn out_of_order_frames_are_rejected() {
    let mut sink = InMemorySink::new();
    sink.begin(&header()).unwrap();
    sink.push_frame(&frame(3)).unwrap();
    let err = sink.push_frame(&frame(3)).unwrap_err();
    assert!(matches!(err, ReelError::Export(_)));

    let mut lines = JsonLinesSink::new(Vec::new());
    lines.begin(&header()).unwrap();
    lines.push_frame(&frame(1)).unwrap();
    assert!(lines.push_frame(&frame(0)).is_err());
}

#[test]
fn json_lines_writes_one_object_per_line() {
    let mut sink = JsonLinesSink::new(Vec::new());
    sink.begin(&header()).unwrap();
    sink.push_frame(&frame(0)).unwrap();
    sink.end(&ExportStats::default()).unwrap();
    let text = String::from_utf8(sink.into_inner()).unwrap();
    let lines: Vec<serde_json::Value> = text
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0]["type"], "header");
    assert_eq!(lines[0]["programId"], "demo");
    assert_eq!(lines[0]["quality"], "draft");
    assert_eq!(lines[1]["type"], "frame");
    assert_eq!(lines[1]["elapsedMs"], 0.0);
    assert_eq!(lines[2]["type"], "end");
    assert_eq!(lines[2]["framesTotal"], 0);
}
