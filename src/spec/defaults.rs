use std::collections::BTreeMap;

use crate::animation::ease::Ease;
use crate::spec::model::{
    BeamEntry, BreathingWindow, ChartRoleEntry, Envelope, PhaseRange, RampWindow,
    TaskProgressSpan, TextWindow, TimelineSpec,
};

/// Built-in timeline used whenever a supplied document fails validation.
///
/// 26 seconds: six phases in three acts, three captions, four beam impacts, a breathing
/// window during execution, an implosion and a brand reveal.
pub fn default_spec() -> TimelineSpec {
    TimelineSpec {
        duration: 26_000.0,
        phases: ranges(&[
            ("SIGNAL", 0.0, 4_000.0),
            ("NOISE", 4_000.0, 8_000.0),
            ("ANALYSIS", 8_000.0, 12_000.0),
            ("EXECUTION", 12_000.0, 18_000.0),
            ("SETTLEMENT", 18_000.0, 21_000.0),
            ("CLARITY_LOGO", 21_000.0, 26_000.0),
        ]),
        macro_phases: ranges(&[
            ("ACT_PROBLEM", 0.0, 8_000.0),
            ("ACT_SOLUTION", 8_000.0, 21_000.0),
            ("ACT_BRAND", 21_000.0, 26_000.0),
        ]),
        narrative_windows: vec![
            window(1_000.0, 3_500.0, "Markets move. Risk hides."),
            window(5_000.0, 7_500.0, "Noise drowns the signal."),
            window(9_000.0, 11_000.0, "Clarity needs structure."),
        ],
        dynamic_headers: vec![
            window(8_000.0, 12_000.0, "Analyzing exposure"),
            window(12_000.0, 18_000.0, "Executing hedges"),
            window(18_000.0, 21_000.0, "Positions settled"),
        ],
        beam_schedule: vec![
            beam(13_000.0, 13_800.0, 0),
            beam(14_400.0, 15_200.0, 1),
            beam(15_800.0, 16_600.0, 2),
            beam(17_000.0, 17_800.0, 3),
        ],
        chart_roles: vec![
            role("signal", 0.0, 4_000.0, [0.0, 1.0], [8.0, 0.0], [0.96, 1.0]),
            role("noise", 4_000.0, 8_000.0, [1.0, 0.6], [0.0, 4.0], [1.0, 1.02]),
            role("structure", 8_000.0, 12_000.0, [0.6, 1.0], [4.0, 0.0], [1.02, 1.0]),
            role("execution", 12_000.0, 18_000.0, [1.0, 1.0], [0.0, 0.0], [1.0, 1.0]),
            role("resolve", 18_000.0, 21_000.0, [1.0, 0.0], [0.0, 10.0], [1.0, 0.9]),
        ],
        ui_breathing: Some(BreathingWindow {
            start: 12_000.0,
            end: 18_000.0,
            amplitude: 0.015,
            period_ms: 3_000.0,
        }),
        brand: Some(RampWindow {
            start: 21_500.0,
            duration: 2_500.0,
        }),
        implosion: Some(RampWindow {
            start: 20_000.0,
            duration: 1_000.0,
        }),
        task_progress: Some(TaskProgressSpan::default()),
        tasks: vec![
            "Scan exposure".to_owned(),
            "Rebalance hedges".to_owned(),
            "Route orders".to_owned(),
            "Confirm settlement".to_owned(),
        ],
        brand_text: Some("CLARITY".to_owned()),
        tagline: Some("See the risk. Act on it.".to_owned()),
        subtitle: Some("Autonomous treasury execution".to_owned()),
    }
}

fn ranges(items: &[(&str, f64, f64)]) -> BTreeMap<String, PhaseRange> {
    items
        .iter()
        .map(|&(name, from, to)| (name.to_owned(), PhaseRange { from, to }))
        .collect()
}

fn window(start: f64, end: f64, text: &str) -> TextWindow {
    TextWindow {
        start,
        end,
        text: text.to_owned(),
    }
}

fn beam(start: f64, end: f64, task_index: usize) -> BeamEntry {
    BeamEntry {
        start,
        end,
        task_index,
    }
}

fn role(
    name: &str,
    start: f64,
    end: f64,
    opacity: [f64; 2],
    blur: [f64; 2],
    scale: [f64; 2],
) -> ChartRoleEntry {
    ChartRoleEntry {
        role: name.to_owned(),
        start,
        end,
        opacity: Envelope::new(opacity[0], opacity[1]),
        blur: Envelope::new(blur[0], blur[1]),
        scale: Envelope::new(scale[0], scale[1]),
        ease: Ease::Smoothstep,
    }
}
