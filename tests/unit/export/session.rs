use super::*;
use crate::export::sink::InMemorySink;
use crate::render::backend::{DisplayListBackend, NullBackend};
use crate::scene::model::Scene;
use crate::scene::program::SequenceProgram;
use crate::spec::defaults::default_spec;

fn program() -> Arc<dyn Program> {
    Arc::new(SequenceProgram::single(Scene::from_spec(
        "main",
        &default_spec(),
    )))
}

fn session(opts: ExportOpts) -> ExportSession {
    ExportSession::for_program(program(), &mut NullBackend, opts).unwrap()
}

#[test]
fn opts_are_validated() {
    let bad = [
        ExportOpts {
            fps: 0.0,
            ..ExportOpts::default()
        },
        ExportOpts {
            width: 0,
            ..ExportOpts::default()
        },
        ExportOpts {
            duration_ms: Some(-1.0),
            ..ExportOpts::default()
        },
    ];
    for opts in bad {
        assert!(matches!(opts.validate(), Err(ReelError::Export(_))), "{opts:?}");
    }
    assert!(ExportOpts::default().validate().is_ok());
}

#[test]
fn quality_scales_the_viewport() {
    let opts = ExportOpts {
        width: 1280,
        height: 720,
        quality: QualityPreset::Draft,
        ..ExportOpts::default()
    };
    assert_eq!(opts.viewport().unwrap(), Viewport::new(640, 360).unwrap());
    assert_eq!(QualityPreset::High.pixel_scale(), 2.0);
}

#[test]
fn run_pushes_exact_frame_times() {
    let mut s = session(ExportOpts {
        fps: 10.0,
        duration_ms: Some(1_000.0),
        ..ExportOpts::default()
    });
    let mut sink = InMemorySink::new();
    let stats = s.run(&mut sink).unwrap();
    assert_eq!(stats.frames_total, 10);
    assert!(!stats.aborted);
    assert_eq!(sink.header().unwrap().frame_count, 10);
    for (i, f) in sink.frames().iter().enumerate() {
        assert_eq!(f.index, i as u64);
        assert_eq!(f.elapsed_ms, i as f64 * 100.0);
        assert_eq!(f.scene_id.as_deref(), Some("main"));
    }
}

#[test]
fn two_runs_are_identical() {
    let opts = ExportOpts {
        fps: 24.0,
        ..ExportOpts::default()
    };
    let mut a = InMemorySink::new();
    let mut b = InMemorySink::new();
    session(opts.clone()).run(&mut a).unwrap();
    let mut again = session(opts);
    again.run(&mut b).unwrap();
    assert_eq!(a.frames().len(), 624);
    assert_eq!(a.frames(), b.frames());

    let mut c = InMemorySink::new();
    again.run(&mut c).unwrap();
    assert_eq!(a.frames(), c.frames());
}

#[test]
fn held_frames_count_as_static() {
    // Exporting past the program end clamps to the final instant.
    let mut s = session(ExportOpts {
        fps: 10.0,
        duration_ms: Some(30_000.0),
        ..ExportOpts::default()
    });
    let mut sink = InMemorySink::new();
    let stats = s.run(&mut sink).unwrap();
    assert_eq!(stats.frames_total, 300);
    assert_eq!(stats.frames_static, 39);
    assert_eq!(sink.frames()[299].state.as_ref().unwrap().elapsed_ms, 26_000.0);
}

#[test]
fn abort_stops_cooperatively() {
    let mut s = session(ExportOpts::default());
    let handle = s.abort_handle();
    handle.abort();
    let mut sink = InMemorySink::new();
    let stats = s.run(&mut sink).unwrap();
    assert!(stats.aborted);
    assert_eq!(stats.frames_total, 0);
    assert_eq!(sink.stats(), Some(stats));
}

#[test]
fn abort_from_another_thread_is_seen() {
    let s = session(ExportOpts::default());
    let handle = s.abort_handle();
    std::thread::spawn(move || handle.abort()).join().unwrap();
    assert!(s.abort_handle().is_aborted());
}

#[test]
fn seek_renders_one_frame_and_releases_the_override() {
    let mut s = ExportSession::for_program(
        program(),
        &mut DisplayListBackend,
        ExportOpts::default(),
    )
    .unwrap();
    let rec = s.seek(2_000.0).unwrap();
    assert_eq!(rec.index, 60);
    let state = rec.state.as_ref().unwrap();
    assert_eq!(state.phase, "SIGNAL");
    assert_eq!(rec.fingerprint, Some(fingerprint_state(state)));
    assert!(rec.display_list.texts().any(|t| t == "Markets move. Risk hides."));

    let mut sink = InMemorySink::new();
    s.run(&mut sink).unwrap();
    assert_eq!(sink.frames()[0].elapsed_ms, 0.0);
}

struct FailingSink {
    fail_at: u64,
    pushed: u64,
    ended: Option<ExportStats>,
}

impl FrameSink for FailingSink {
    fn begin(&mut self, _header: &ExportHeader) -> ReelResult<()> {
        Ok(())
    }

    fn push_frame(&mut self, frame: &FrameRecord) -> ReelResult<()> {
        if frame.index == self.fail_at {
            return Err(ReelError::export("disk full"));
        }
        self.pushed += 1;
        Ok(())
    }

    fn end(&mut self, stats: &ExportStats) -> ReelResult<()> {
        self.ended = Some(*stats);
        Err(ReelError::export("end after failure"))
    }
}

#[test]
fn failed_frame_still_ends_the_sink() {
    let mut s = session(ExportOpts {
        fps: 10.0,
        duration_ms: Some(1_000.0),
        ..ExportOpts::default()
    });
    let mut sink = FailingSink {
        fail_at: 3,
        pushed: 0,
        ended: None,
    };
    let err = s.run(&mut sink).unwrap_err();
    assert!(err.to_string().contains("disk full"), "{err}");
    assert_eq!(sink.pushed, 3);
    let stats = sink.ended.unwrap();
    assert_eq!(stats.frames_total, 3);
    assert!(!stats.aborted);
}
