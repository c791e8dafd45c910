use super::*;
use std::cell::RefCell;
use std::rc::Rc;

use crate::spec::defaults::default_spec;
use crate::time::source::FixedStepTimeSource;

fn engine(fps: f64) -> TimelineEngine<FixedStepTimeSource> {
    let spec = default_spec();
    let source = FixedStepTimeSource::new(fps, spec.duration).unwrap();
    TimelineEngine::new(StateResolver::from_spec(&spec), source)
}

fn recorded(e: &mut TimelineEngine<FixedStepTimeSource>) -> Rc<RefCell<Vec<TimelineEvent>>> {
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    e.on_event(move |ev| sink.borrow_mut().push(ev.clone()));
    log
}

#[test]
fn diff_of_equal_states_is_empty() {
    let r = StateResolver::from_spec(&default_spec());
    let s = r.state_at(5_000.0);
    assert!(diff_states(&s, &s).is_empty());
}

#[test]
fn diff_reports_phase_and_caption_changes() {
    let r = StateResolver::from_spec(&default_spec());
    let events = diff_states(&r.state_at(3_000.0), &r.state_at(4_100.0));
    assert!(events.contains(&TimelineEvent::PhaseChanged {
        from: "SIGNAL".to_owned(),
        to: "NOISE".to_owned(),
    }));
    assert!(events.contains(&TimelineEvent::NarrativeHidden));
    assert!(events.contains(&TimelineEvent::UiModeChanged {
        from: UiMode::Cinema,
        to: UiMode::Normal,
    }));
    assert!(!events.iter().any(|e| matches!(e, TimelineEvent::MacroPhaseChanged { .. })));
}

#[test]
fn diff_reports_beam_charge_then_fire() {
    let r = StateResolver::from_spec(&default_spec());
    let charging = diff_states(&r.state_at(12_850.0), &r.state_at(12_950.0));
    assert_eq!(charging, vec![TimelineEvent::BeamCharging { task_index: 0 }]);

    let firing = diff_states(&r.state_at(12_950.0), &r.state_at(13_100.0));
    assert_eq!(firing, vec![TimelineEvent::BeamFired { task_index: 0 }]);

    assert!(diff_states(&r.state_at(13_100.0), &r.state_at(13_200.0)).is_empty());
}

#[test]
fn first_tick_emits_nothing_and_stop_is_idempotent() {
    let mut e = engine(30.0);
    let log = recorded(&mut e);
    assert!(e.tick().is_none());

    e.start();
    e.seek(2_000.0);
    assert_eq!(e.tick().unwrap().phase, "SIGNAL");
    assert!(log.borrow().is_empty());

    e.stop();
    e.stop();
    assert!(!e.is_running());
    assert!(e.tick().is_none());
}

#[test]
fn seek_jumps_emit_the_differences() {
    let mut e = engine(30.0);
    let log = recorded(&mut e);
    e.start();
    e.seek(2_000.0);
    e.tick();
    e.seek(13_400.0);
    let state = e.tick().unwrap().clone();
    assert_eq!(state.beam.unwrap().task_index, 0);

    let events = log.borrow();
    assert!(events.contains(&TimelineEvent::BeamFired { task_index: 0 }));
    assert!(events.contains(&TimelineEvent::MacroPhaseChanged {
        from: "ACT_PROBLEM".to_owned(),
        to: "ACT_SOLUTION".to_owned(),
    }));
    assert!(events.contains(&TimelineEvent::HeaderChanged {
        text: Some("Executing hedges".to_owned()),
    }));
}

#[test]
fn events_never_change_resolved_state() {
    let mut e = engine(10.0);
    let _log = recorded(&mut e);
    let reference = StateResolver::from_spec(&default_spec());
    e.start();
    loop {
        let elapsed = e.source().elapsed_ms();
        let state = e.tick().unwrap().clone();
        assert_eq!(state, reference.state_at(elapsed));
        if !e.source_mut().next() {
            break;
        }
    }
}

#[test]
fn clear_seek_returns_to_source_time() {
    let mut e = engine(10.0);
    e.start();
    e.source_mut().next();
    e.seek(20_000.0);
    assert_eq!(e.tick().unwrap().elapsed_ms, 20_000.0);
    e.clear_seek();
    assert_eq!(e.tick().unwrap().elapsed_ms, 100.0);
}
