use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::compile::compiled::CHARGE_LEAD_MS;
use crate::foundation::error::{ReelError, ReelResult};
use crate::spec::defaults::default_spec;
use crate::spec::model::{PhaseRange, TimelineSpec};

const REQUIRED_MAPS: [&str; 2] = ["phases", "macroPhases"];
const REQUIRED_ARRAYS: [&str; 4] = [
    "narrativeWindows",
    "dynamicHeaders",
    "beamSchedule",
    "chartRoles",
];
const COVERAGE_EPSILON_MS: f64 = 1e-6;

/// Loads timeline documents.
///
/// The `load*` family never fails: any structural or semantic problem is logged and the
/// built-in [`default_spec`] is returned instead. The `try_load*` family reports the
/// [`ReelError::Validation`] to callers that want to surface it (tooling, tests).
pub struct SpecLoader;

impl SpecLoader {
    /// Parse and validate a JSON document, falling back to the default spec.
    pub fn load(source: &str) -> TimelineSpec {
        Self::recover(Self::try_load(source))
    }

    /// Validate an already-parsed JSON value, falling back to the default spec.
    ///
    /// Offline variant for tools that assemble the document in memory.
    pub fn load_from_value(value: serde_json::Value) -> TimelineSpec {
        Self::recover(Self::try_load_from_value(value))
    }

    /// Read, parse and validate a document from a reader, falling back to the default spec.
    pub fn load_from_reader<R: std::io::Read>(r: R) -> TimelineSpec {
        Self::recover(
            serde_json::from_reader::<_, serde_json::Value>(r)
                .map_err(|e| ReelError::validation(format!("parse timeline JSON: {e}")))
                .and_then(Self::try_load_from_value),
        )
    }

    /// Read a document from disk, falling back to the default spec.
    pub fn load_from_path(path: impl AsRef<Path>) -> TimelineSpec {
        let path = path.as_ref();
        match File::open(path) {
            Ok(f) => Self::load_from_reader(BufReader::new(f)),
            Err(e) => Self::recover(Err(ReelError::validation(format!(
                "open timeline JSON '{}': {e}",
                path.display()
            )))),
        }
    }

    /// Parse and validate a JSON document.
    pub fn try_load(source: &str) -> ReelResult<TimelineSpec> {
        let value: serde_json::Value = serde_json::from_str(source)
            .map_err(|e| ReelError::validation(format!("parse timeline JSON: {e}")))?;
        Self::try_load_from_value(value)
    }

    /// Validate an already-parsed JSON value.
    pub fn try_load_from_value(value: serde_json::Value) -> ReelResult<TimelineSpec> {
        check_shape(&value)?;
        let spec: TimelineSpec = serde_json::from_value(value)
            .map_err(|e| ReelError::validation(format!("decode timeline document: {e}")))?;
        Self::validate(&spec)?;
        Ok(spec)
    }

    /// Check the semantic invariants of a typed document.
    pub fn validate(spec: &TimelineSpec) -> ReelResult<()> {
        if !spec.duration.is_finite() || spec.duration <= 0.0 {
            return Err(ReelError::validation("duration must be finite and > 0"));
        }

        validate_coverage("phases", &spec.phases, spec.duration)?;
        validate_coverage("macroPhases", &spec.macro_phases, spec.duration)?;

        for (field, windows) in [
            ("narrativeWindows", &spec.narrative_windows),
            ("dynamicHeaders", &spec.dynamic_headers),
        ] {
            for (i, w) in windows.iter().enumerate() {
                check_window(field, i, w.start, w.end)?;
            }
        }

        let mut beams: Vec<_> = spec.beam_schedule.iter().collect();
        for (i, b) in beams.iter().enumerate() {
            check_window("beamSchedule", i, b.start, b.end)?;
        }
        beams.sort_by(|a, b| a.start.total_cmp(&b.start));
        for pair in beams.windows(2) {
            if pair[1].start - CHARGE_LEAD_MS < pair[0].end {
                return Err(ReelError::validation(format!(
                    "beamSchedule: beam for task {} charges before beam for task {} has ended",
                    pair[1].task_index, pair[0].task_index
                )));
            }
        }

        for (i, role) in spec.chart_roles.iter().enumerate() {
            check_window("chartRoles", i, role.start, role.end)?;
            for (name, env) in [
                ("opacity", role.opacity),
                ("blur", role.blur),
                ("scale", role.scale),
            ] {
                if !env.start.is_finite() || !env.end.is_finite() {
                    return Err(ReelError::validation(format!(
                        "chartRoles[{i}] ('{}') {name} values must be finite",
                        role.role
                    )));
                }
            }
        }

        if let Some(b) = &spec.ui_breathing {
            check_window("uiBreathing", 0, b.start, b.end)?;
            if !b.amplitude.is_finite() {
                return Err(ReelError::validation("uiBreathing amplitude must be finite"));
            }
            if !b.period_ms.is_finite() || b.period_ms <= 0.0 {
                return Err(ReelError::validation(
                    "uiBreathing periodMs must be finite and > 0",
                ));
            }
        }
        for (field, ramp) in [("brand", &spec.brand), ("implosion", &spec.implosion)] {
            if let Some(r) = ramp
                && (!r.start.is_finite() || !r.duration.is_finite() || r.duration <= 0.0)
            {
                return Err(ReelError::validation(format!(
                    "{field} start must be finite and duration finite and > 0"
                )));
            }
        }

        Ok(())
    }

    fn recover(res: ReelResult<TimelineSpec>) -> TimelineSpec {
        match res {
            Ok(spec) => spec,
            Err(e) => {
                tracing::warn!(error = %e, "timeline document rejected; using built-in default");
                default_spec()
            }
        }
    }
}

fn check_shape(value: &serde_json::Value) -> ReelResult<()> {
    let Some(obj) = value.as_object() else {
        return Err(ReelError::validation("timeline document must be a JSON object"));
    };

    match obj.get("duration") {
        Some(d) if d.is_number() => {}
        Some(_) => return Err(ReelError::validation("'duration' must be a number")),
        None => return Err(ReelError::validation("missing required key 'duration'")),
    }
    for key in REQUIRED_MAPS {
        match obj.get(key) {
            Some(serde_json::Value::Object(m)) if !m.is_empty() => {}
            Some(_) => {
                return Err(ReelError::validation(format!(
                    "'{key}' must be a non-empty object"
                )));
            }
            None => {
                return Err(ReelError::validation(format!(
                    "missing required key '{key}'"
                )));
            }
        }
    }
    for key in REQUIRED_ARRAYS {
        match obj.get(key) {
            Some(v) if v.is_array() => {}
            Some(_) => return Err(ReelError::validation(format!("'{key}' must be an array"))),
            None => {
                return Err(ReelError::validation(format!(
                    "missing required key '{key}'"
                )));
            }
        }
    }
    Ok(())
}

fn check_window(field: &str, idx: usize, start: f64, end: f64) -> ReelResult<()> {
    if !start.is_finite() || !end.is_finite() || start >= end {
        return Err(ReelError::validation(format!(
            "{field}[{idx}] must have finite start < end"
        )));
    }
    Ok(())
}

fn validate_coverage(
    field: &str,
    ranges: &std::collections::BTreeMap<String, PhaseRange>,
    duration: f64,
) -> ReelResult<()> {
    let mut sorted: Vec<(&String, &PhaseRange)> = ranges.iter().collect();
    for (name, r) in &sorted {
        if !r.from.is_finite() || !r.to.is_finite() || r.from >= r.to {
            return Err(ReelError::validation(format!(
                "{field}.{name} must have finite from < to"
            )));
        }
    }
    sorted.sort_by(|a, b| a.1.from.total_cmp(&b.1.from));

    let (Some(first), Some(last)) = (sorted.first(), sorted.last()) else {
        return Err(ReelError::validation(format!("{field} must be non-empty")));
    };
    if first.1.from.abs() > COVERAGE_EPSILON_MS {
        return Err(ReelError::validation(format!(
            "{field} must start at 0 (first is '{}' at {})",
            first.0, first.1.from
        )));
    }
    if (last.1.to - duration).abs() > COVERAGE_EPSILON_MS {
        return Err(ReelError::validation(format!(
            "{field} must end at duration {duration} (last is '{}' ending at {})",
            last.0, last.1.to
        )));
    }
    for pair in sorted.windows(2) {
        if (pair[1].1.from - pair[0].1.to).abs() > COVERAGE_EPSILON_MS {
            return Err(ReelError::validation(format!(
                "{field} must be gapless and non-overlapping ('{}' ends at {}, '{}' starts at {})",
                pair[0].0, pair[0].1.to, pair[1].0, pair[1].1.from
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/spec/loader.rs"]
mod tests;
