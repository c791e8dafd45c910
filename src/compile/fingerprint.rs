use crate::compile::compiled::BeamPhase;
use crate::eval::state::{TimelineState, UiMode};
use xxhash_rust::xxh3::Xxh3;

const XXH3_SEED: u64 = 0x5f3c_91e2_a74b_d016;

/// 128-bit identity of a [`TimelineState`] (seeded XXH3-128).
///
/// Equal states always produce equal fingerprints; export uses it to count frames that did not
/// change and determinism checks compare it across runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub struct StateFingerprint {
    /// High half of the digest.
    pub hi: u64,
    /// Low half of the digest.
    pub lo: u64,
}

/// Hash every field of `state`. Floats are hashed by bit pattern.
pub fn fingerprint_state(state: &TimelineState) -> StateFingerprint {
    let mut h = StableHasher::new();

    h.f64(state.elapsed_ms);
    h.str(&state.phase);
    h.f64(state.phase_intensity);
    h.str(&state.macro_phase);
    match &state.chart {
        Some(c) => {
            h.u8(1);
            h.str(&c.role);
            h.f64(c.opacity);
            h.f64(c.blur);
            h.f64(c.scale);
        }
        None => h.u8(0),
    }
    h.f64(state.ui.opacity);
    h.f64(state.ui.scale);
    h.f64(state.ui.blur);
    h.u8(match state.ui_mode {
        UiMode::Normal => 0,
        UiMode::Breathing => 1,
        UiMode::Imploding => 2,
        UiMode::Cinema => 3,
    });
    h.opt_str(state.narrative_text.as_deref());
    h.opt_str(state.dynamic_header.as_deref());
    match &state.beam {
        Some(b) => {
            h.u8(1);
            h.u64(b.task_index as u64);
            h.f64(b.progress);
            h.u8(match b.phase {
                BeamPhase::Charging => 0,
                BeamPhase::Firing => 1,
            });
        }
        None => h.u8(0),
    }
    h.u64(state.settled_tasks as u64);
    match state.recent_impact {
        Some(i) => {
            h.u8(1);
            h.u64(i as u64);
        }
        None => h.u8(0),
    }
    h.f64(state.task_progress_pct);
    h.f64(state.breathing);
    h.f64(state.brand_progress);
    h.f64(state.implosion.progress);
    h.f64(state.implosion.scale);
    h.f64(state.implosion.opacity);

    h.finish()
}

/// Same as [`fingerprint_state`] but ignoring `elapsed_ms`, so visually identical frames at
/// different times collide.
pub(crate) fn fingerprint_visual(state: &TimelineState) -> StateFingerprint {
    let mut normalized = state.clone();
    normalized.elapsed_ms = 0.0;
    fingerprint_state(&normalized)
}

struct StableHasher {
    inner: Xxh3,
}

impl StableHasher {
    fn new() -> Self {
        Self {
            inner: Xxh3::with_seed(XXH3_SEED),
        }
    }

    fn bytes(&mut self, b: &[u8]) {
        self.inner.update(b);
    }

    fn u8(&mut self, v: u8) {
        self.bytes(&[v]);
    }

    fn u64(&mut self, v: u64) {
        self.bytes(&v.to_le_bytes());
    }

    fn f64(&mut self, v: f64) {
        // -0.0 and 0.0 compare equal, so they must hash equal.
        let v = if v == 0.0 { 0.0 } else { v };
        self.u64(v.to_bits());
    }

    fn str(&mut self, s: &str) {
        self.u64(s.len() as u64);
        self.bytes(s.as_bytes());
    }

    fn opt_str(&mut self, s: Option<&str>) {
        match s {
            Some(s) => {
                self.u8(1);
                self.str(s);
            }
            None => self.u8(0),
        }
    }

    fn finish(self) -> StateFingerprint {
        let v = self.inner.digest128();
        StateFingerprint {
            hi: (v >> 64) as u64,
            lo: v as u64,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compile/fingerprint.rs"]
mod tests;
