use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::compile::compiled::CompiledSpec;
use crate::eval::resolver::StateResolver;
use crate::spec::model::TimelineSpec;

/// Kind of visual element a configuration instantiates.
///
/// Carried on the configuration itself, so inspectors label elements without looking at the
/// runtime type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    /// Full-viewport backdrop.
    Background,
    /// Chart panel styled by the active chart role.
    Chart,
    /// Narrative caption.
    Caption,
    /// Dynamic header line.
    Header,
    /// Task column with settlement and progress.
    TaskList,
    /// Beam between the chart and a task row.
    Beam,
    /// Brand reveal.
    Logo,
}

impl ElementKind {
    /// Every kind, in default stacking order.
    pub const ALL: [ElementKind; 7] = [
        ElementKind::Background,
        ElementKind::Chart,
        ElementKind::TaskList,
        ElementKind::Beam,
        ElementKind::Header,
        ElementKind::Caption,
        ElementKind::Logo,
    ];

    /// Human-readable label for inspectors and logs.
    pub fn label(self) -> &'static str {
        match self {
            ElementKind::Background => "Background",
            ElementKind::Chart => "Chart",
            ElementKind::Caption => "Caption",
            ElementKind::Header => "Header",
            ElementKind::TaskList => "Task list",
            ElementKind::Beam => "Beam",
            ElementKind::Logo => "Logo",
        }
    }
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Data-only description of one element: what to build, where to stack it, and its parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ElementConfig {
    /// Element kind.
    pub kind: ElementKind,
    /// Stacking order; higher draws later.
    #[serde(default)]
    pub z: i32,
    /// Kind-specific parameters, parsed by the backend.
    #[serde(default)]
    pub params: serde_json::Value,
}

impl ElementConfig {
    /// Configuration with no parameters.
    pub fn new(kind: ElementKind, z: i32) -> Self {
        Self {
            kind,
            z,
            params: serde_json::Value::Null,
        }
    }

    /// Replace the parameters.
    pub fn with_params(mut self, params: serde_json::Value) -> Self {
        self.params = params;
        self
    }
}

/// Self-contained, time-bounded composition: a compiled timeline plus the elements drawing it.
///
/// Holds no runtime handles; a pipeline turns it into mounted elements.
#[derive(Clone, Debug)]
pub struct Scene {
    /// Scene id, matching its [`crate::SceneRef`].
    pub id: String,
    /// Scene length; must equal the owning reference's bounds.
    pub duration_ms: f64,
    /// Timeline this scene resolves against.
    pub spec: Arc<CompiledSpec>,
    /// Elements in author order.
    pub elements: Vec<ElementConfig>,
}

impl Scene {
    /// Scene with no elements.
    pub fn new(id: impl Into<String>, duration_ms: f64, spec: Arc<CompiledSpec>) -> Self {
        Self {
            id: id.into(),
            duration_ms,
            spec,
            elements: Vec::new(),
        }
    }

    /// Compile `spec` into a scene spanning its duration, with the standard element stack.
    pub fn from_spec(id: impl Into<String>, spec: &TimelineSpec) -> Self {
        let compiled = Arc::new(CompiledSpec::compile(spec));
        let elements = standard_elements(&compiled);
        Self {
            id: id.into(),
            duration_ms: compiled.duration(),
            spec: compiled,
            elements,
        }
    }

    /// Append an element.
    pub fn with_element(mut self, config: ElementConfig) -> Self {
        self.elements.push(config);
        self
    }

    /// Resolver sharing this scene's compiled timeline.
    pub fn resolver(&self) -> StateResolver {
        StateResolver::new(Arc::clone(&self.spec))
    }
}

/// One element per kind, with parameters taken from the compiled timeline's static content.
pub fn standard_elements(spec: &CompiledSpec) -> Vec<ElementConfig> {
    ElementKind::ALL
        .iter()
        .enumerate()
        .map(|(i, &kind)| {
            let config = ElementConfig::new(kind, i as i32 * 10);
            match kind {
                ElementKind::TaskList => config.with_params(json!({ "tasks": spec.tasks() })),
                ElementKind::Beam => {
                    config.with_params(json!({ "taskCount": spec.tasks().len().max(1) }))
                }
                ElementKind::Logo => config.with_params(json!({
                    "text": spec.brand_text(),
                    "tagline": spec.tagline(),
                    "subtitle": spec.subtitle(),
                })),
                _ => config,
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/scene/model.rs"]
mod tests;
