use super::*;
use crate::eval::resolver::StateResolver;
use crate::spec::defaults::default_spec;

#[test]
fn equal_states_share_a_fingerprint() {
    let r = StateResolver::from_spec(&default_spec());
    for t in [0.0, 2_000.0, 13_400.0, 20_500.0, 23_000.0] {
        assert_eq!(
            fingerprint_state(&r.state_at(t)),
            fingerprint_state(&r.state_at(t)),
            "t={t}"
        );
    }
}

#[test]
fn different_states_differ() {
    let r = StateResolver::from_spec(&default_spec());
    let a = fingerprint_state(&r.state_at(1_000.0));
    let b = fingerprint_state(&r.state_at(1_001.0));
    assert_ne!(a, b);
}

#[test]
fn visual_fingerprint_ignores_elapsed_only() {
    let r = StateResolver::from_spec(&default_spec());
    let mut a = r.state_at(25_500.0);
    let b = r.state_at(25_500.0);
    a.elapsed_ms = 99.0;
    assert_ne!(fingerprint_state(&a), fingerprint_state(&b));
    assert_eq!(fingerprint_visual(&a), fingerprint_visual(&b));
}

#[test]
fn signed_zero_hashes_equal() {
    let r = StateResolver::from_spec(&default_spec());
    let a = r.state_at(500.0);
    let mut b = a.clone();
    b.breathing = -0.0;
    assert_eq!(a, b);
    assert_eq!(fingerprint_state(&a), fingerprint_state(&b));
}
