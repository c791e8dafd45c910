use serde::Serialize;

use crate::foundation::core::{Point, Rect};

/// Straight-alpha RGBA8 color.
pub type Rgba = [u8; 4];

/// Backend-agnostic drawing instruction.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    /// Solid rectangle.
    Fill {
        /// Stacking order.
        z: i32,
        /// Target rectangle.
        rect: Rect,
        /// Fill color.
        color: Rgba,
        /// Extra opacity multiplier.
        opacity: f64,
    },
    /// Transformed group (opacity, scale about the rect center, blur).
    Layer {
        /// Stacking order.
        z: i32,
        /// Group bounds after scaling.
        rect: Rect,
        /// Group opacity.
        opacity: f64,
        /// Scale applied about the center.
        scale: f64,
        /// Blur radius in pixels.
        blur: f64,
        /// What the layer shows.
        label: String,
    },
    /// Text run anchored at its center.
    Text {
        /// Stacking order.
        z: i32,
        /// Center of the run.
        anchor: Point,
        /// Content.
        text: String,
        /// Font size in pixels.
        size: f64,
        /// Text color.
        color: Rgba,
        /// Text opacity.
        opacity: f64,
    },
    /// Beam from the chart to a task row.
    Beam {
        /// Stacking order.
        z: i32,
        /// Beam origin.
        from: Point,
        /// Beam target.
        to: Point,
        /// Progress through the current beam phase.
        progress: f64,
        /// `true` while charging, `false` while firing.
        charging: bool,
    },
}

impl DrawCommand {
    pub fn z(&self) -> i32 {
        match self {
            DrawCommand::Fill { z, .. }
            | DrawCommand::Layer { z, .. }
            | DrawCommand::Text { z, .. }
            | DrawCommand::Beam { z, .. } => *z,
        }
    }
}

/// Ordered draw commands for one frame.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DisplayList {
    commands: Vec<DrawCommand>,
}

impl DisplayList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, cmd: DrawCommand) {
        self.commands.push(cmd);
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Order by `z`; commands with equal `z` keep their push order.
    pub fn sort_by_z(&mut self) {
        self.commands.sort_by_key(DrawCommand::z);
    }

    /// Every text run, in order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/display_list.rs"]
mod tests;
