use crate::foundation::error::ReelResult;
use crate::render::element::Element;
use crate::render::elements::{
    BackgroundElement, BeamElement, CaptionElement, ChartElement, HeaderElement, LogoElement,
    NullElement, TaskListElement, parse_params,
};
use crate::scene::model::{ElementConfig, ElementKind};

/// Graphics backend: turns element configurations into live elements.
///
/// Most hosts do not call this directly; [`crate::RendererPipeline::compile`] creates every
/// element of a program through it.
pub trait ElementBackend {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Build (but do not mount) the element described by `config`.
    fn create(&mut self, config: &ElementConfig) -> ReelResult<Box<dyn Element>>;
}

/// Available backend kinds.
///
/// - `DisplayList` records semantic draw commands.
/// - `Null` runs lifecycles and draws nothing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BackendKind {
    /// [`DisplayListBackend`].
    #[default]
    DisplayList,
    /// [`NullBackend`].
    Null,
}

pub fn create_backend(kind: BackendKind) -> Box<dyn ElementBackend> {
    match kind {
        BackendKind::DisplayList => Box::new(DisplayListBackend),
        BackendKind::Null => Box::new(NullBackend),
    }
}

/// Backend whose elements record into a [`crate::DisplayList`].
#[derive(Clone, Copy, Debug, Default)]
pub struct DisplayListBackend;

impl ElementBackend for DisplayListBackend {
    fn name(&self) -> &'static str {
        "display-list"
    }

    fn create(&mut self, config: &ElementConfig) -> ReelResult<Box<dyn Element>> {
        let z = config.z;
        Ok(match config.kind {
            ElementKind::Background => Box::new(BackgroundElement::new(z, parse_params(config)?)),
            ElementKind::Chart => Box::new(ChartElement::new(z, parse_params(config)?)),
            ElementKind::Caption => Box::new(CaptionElement::new(z, parse_params(config)?)),
            ElementKind::Header => Box::new(HeaderElement::new(z, parse_params(config)?)),
            ElementKind::TaskList => Box::new(TaskListElement::new(z, parse_params(config)?)),
            ElementKind::Beam => Box::new(BeamElement::new(z, parse_params(config)?)),
            ElementKind::Logo => Box::new(LogoElement::new(z, parse_params(config)?)),
        })
    }
}

/// Backend for headless runs where only states and lifecycles matter.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullBackend;

impl ElementBackend for NullBackend {
    fn name(&self) -> &'static str {
        "null"
    }

    fn create(&mut self, config: &ElementConfig) -> ReelResult<Box<dyn Element>> {
        Ok(Box::new(NullElement::new(config.kind)))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/backend.rs"]
mod tests;
