//! Built-in elements recording into a [`DisplayList`].

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::compile::compiled::{BeamEvent, BeamPhase};
use crate::eval::state::{TimelineState, UiTransform};
use crate::foundation::core::{Point, Rect};
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::math::clamp01;
use crate::render::display_list::{DisplayList, DrawCommand, Rgba};
use crate::render::element::{Element, ElementContext, Lifecycle};
use crate::scene::model::{ElementConfig, ElementKind};

const WHITE: Rgba = [255, 255, 255, 255];

/// Parse `config.params` into `P`; `null` means all defaults.
pub(crate) fn parse_params<P: DeserializeOwned + Default>(config: &ElementConfig) -> ReelResult<P> {
    if config.params.is_null() {
        return Ok(P::default());
    }
    serde_json::from_value(config.params.clone())
        .map_err(|e| ReelError::element(format!("invalid {} params: {e}", config.kind)))
}

fn scale_about_center(rect: Rect, scale: f64) -> Rect {
    let c = rect.center();
    let half_w = rect.width() * scale * 0.5;
    let half_h = rect.height() * scale * 0.5;
    Rect::new(c.x - half_w, c.y - half_h, c.x + half_w, c.y + half_h)
}

macro_rules! lifecycle_methods {
    ($kind:expr) => {
        fn kind(&self) -> ElementKind {
            $kind
        }

        fn mount(&mut self, _ctx: &ElementContext) -> ReelResult<()> {
            self.lifecycle.mount($kind)
        }

        fn dispose(&mut self) -> ReelResult<()> {
            if self.lifecycle.dispose() {
                tracing::trace!(kind = %$kind, "element disposed");
            }
            Ok(())
        }

        fn destroy(&mut self) -> ReelResult<()> {
            self.lifecycle.destroy();
            Ok(())
        }
    };
}

#[derive(Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct BackgroundParams {
    color: Rgba,
}

impl Default for BackgroundParams {
    fn default() -> Self {
        Self {
            color: [6, 8, 16, 255],
        }
    }
}

#[derive(Debug)]
pub(crate) struct BackgroundElement {
    z: i32,
    params: BackgroundParams,
    lifecycle: Lifecycle,
    rect: Rect,
}

impl BackgroundElement {
    pub(crate) fn new(z: i32, params: BackgroundParams) -> Self {
        Self {
            z,
            params,
            lifecycle: Lifecycle::default(),
            rect: Rect::ZERO,
        }
    }
}

impl Element for BackgroundElement {
    lifecycle_methods!(ElementKind::Background);

    fn update(
        &mut self,
        _dt_ms: f64,
        _state: &TimelineState,
        ctx: &ElementContext,
    ) -> ReelResult<()> {
        self.lifecycle.ensure_live(ElementKind::Background)?;
        self.rect = ctx.layout.full;
        Ok(())
    }

    fn render(&self, out: &mut DisplayList) {
        if !self.lifecycle.is_mounted() {
            return;
        }
        out.push(DrawCommand::Fill {
            z: self.z,
            rect: self.rect,
            color: self.params.color,
            opacity: 1.0,
        });
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct ChartParams {
    color: Rgba,
}

impl Default for ChartParams {
    fn default() -> Self {
        Self {
            color: [64, 160, 255, 255],
        }
    }
}

#[derive(Clone, Debug)]
struct ChartProps {
    role: String,
    rect: Rect,
    opacity: f64,
    scale: f64,
    blur: f64,
}

/// Chart panel; its styling is the active chart role composed with the UI transform.
#[derive(Debug)]
pub(crate) struct ChartElement {
    z: i32,
    params: ChartParams,
    lifecycle: Lifecycle,
    props: Option<ChartProps>,
}

impl ChartElement {
    pub(crate) fn new(z: i32, params: ChartParams) -> Self {
        Self {
            z,
            params,
            lifecycle: Lifecycle::default(),
            props: None,
        }
    }
}

impl Element for ChartElement {
    lifecycle_methods!(ElementKind::Chart);

    fn update(
        &mut self,
        _dt_ms: f64,
        state: &TimelineState,
        ctx: &ElementContext,
    ) -> ReelResult<()> {
        self.lifecycle.ensure_live(ElementKind::Chart)?;
        let ui = state.ui;
        self.props = state.chart.as_ref().map(|chart| {
            let scale = chart.scale * ui.scale;
            ChartProps {
                role: chart.role.clone(),
                rect: scale_about_center(ctx.layout.chart, scale),
                opacity: clamp01(chart.opacity * ui.opacity),
                scale,
                blur: chart.blur + ui.blur,
            }
        });
        Ok(())
    }

    fn render(&self, out: &mut DisplayList) {
        let Some(p) = self.props.as_ref().filter(|_| self.lifecycle.is_mounted()) else {
            return;
        };
        if p.opacity <= 0.0 {
            return;
        }
        out.push(DrawCommand::Layer {
            z: self.z,
            rect: p.rect,
            opacity: p.opacity,
            scale: p.scale,
            blur: p.blur,
            label: p.role.clone(),
        });
        out.push(DrawCommand::Fill {
            z: self.z,
            rect: p.rect,
            color: self.params.color,
            opacity: p.opacity,
        });
    }
}

macro_rules! text_params {
    ($name:ident, $size:expr) => {
        #[derive(Debug, Deserialize)]
        #[serde(default, rename_all = "camelCase")]
        pub(crate) struct $name {
            size: f64,
            color: Rgba,
        }

        impl Default for $name {
            fn default() -> Self {
                Self {
                    size: $size,
                    color: WHITE,
                }
            }
        }
    };
}

text_params!(CaptionParams, 48.0);
text_params!(HeaderParams, 28.0);

/// Narrative caption. Not affected by the UI transform; it is what the transform makes room for.
#[derive(Debug)]
pub(crate) struct CaptionElement {
    z: i32,
    params: CaptionParams,
    lifecycle: Lifecycle,
    text: Option<String>,
    anchor: Point,
}

impl CaptionElement {
    pub(crate) fn new(z: i32, params: CaptionParams) -> Self {
        Self {
            z,
            params,
            lifecycle: Lifecycle::default(),
            text: None,
            anchor: Point::ZERO,
        }
    }
}

impl Element for CaptionElement {
    lifecycle_methods!(ElementKind::Caption);

    fn update(
        &mut self,
        _dt_ms: f64,
        state: &TimelineState,
        ctx: &ElementContext,
    ) -> ReelResult<()> {
        self.lifecycle.ensure_live(ElementKind::Caption)?;
        self.text.clone_from(&state.narrative_text);
        self.anchor = ctx.layout.caption.center();
        Ok(())
    }

    fn render(&self, out: &mut DisplayList) {
        let Some(text) = self.text.as_ref().filter(|_| self.lifecycle.is_mounted()) else {
            return;
        };
        out.push(DrawCommand::Text {
            z: self.z,
            anchor: self.anchor,
            text: text.clone(),
            size: self.params.size,
            color: self.params.color,
            opacity: 1.0,
        });
    }
}

#[derive(Debug)]
pub(crate) struct HeaderElement {
    z: i32,
    params: HeaderParams,
    lifecycle: Lifecycle,
    text: Option<String>,
    anchor: Point,
    opacity: f64,
}

impl HeaderElement {
    pub(crate) fn new(z: i32, params: HeaderParams) -> Self {
        Self {
            z,
            params,
            lifecycle: Lifecycle::default(),
            text: None,
            anchor: Point::ZERO,
            opacity: 1.0,
        }
    }
}

impl Element for HeaderElement {
    lifecycle_methods!(ElementKind::Header);

    fn update(
        &mut self,
        _dt_ms: f64,
        state: &TimelineState,
        ctx: &ElementContext,
    ) -> ReelResult<()> {
        self.lifecycle.ensure_live(ElementKind::Header)?;
        self.text.clone_from(&state.dynamic_header);
        self.anchor = ctx.layout.header.center();
        self.opacity = clamp01(state.ui.opacity);
        Ok(())
    }

    fn render(&self, out: &mut DisplayList) {
        let Some(text) = self.text.as_ref().filter(|_| self.lifecycle.is_mounted()) else {
            return;
        };
        out.push(DrawCommand::Text {
            z: self.z,
            anchor: self.anchor,
            text: text.clone(),
            size: self.params.size,
            color: self.params.color,
            opacity: self.opacity,
        });
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct TaskListParams {
    tasks: Vec<String>,
    row_color: Rgba,
    settled_color: Rgba,
    impact_color: Rgba,
    bar_color: Rgba,
    text_size: f64,
}

impl Default for TaskListParams {
    fn default() -> Self {
        Self {
            tasks: Vec::new(),
            row_color: [24, 28, 40, 255],
            settled_color: [32, 120, 72, 255],
            impact_color: [120, 220, 160, 255],
            bar_color: [64, 160, 255, 255],
            text_size: 22.0,
        }
    }
}

/// Task column: one row per task, settled rows recolored, the last hit flashed, and a progress
/// bar under the column.
#[derive(Debug)]
pub(crate) struct TaskListElement {
    z: i32,
    params: TaskListParams,
    lifecycle: Lifecycle,
    rows: Vec<Rect>,
    bar: Rect,
    settled: usize,
    impact: Option<usize>,
    progress_pct: f64,
    ui: UiTransform,
}

impl TaskListElement {
    pub(crate) fn new(z: i32, params: TaskListParams) -> Self {
        Self {
            z,
            params,
            lifecycle: Lifecycle::default(),
            rows: Vec::new(),
            bar: Rect::ZERO,
            settled: 0,
            impact: None,
            progress_pct: 0.0,
            ui: UiTransform::IDENTITY,
        }
    }
}

impl Element for TaskListElement {
    fn kind(&self) -> ElementKind {
        ElementKind::TaskList
    }

    fn mount(&mut self, ctx: &ElementContext) -> ReelResult<()> {
        self.lifecycle.mount(ElementKind::TaskList)?;
        self.layout_rows(ctx);
        Ok(())
    }

    fn update(
        &mut self,
        _dt_ms: f64,
        state: &TimelineState,
        ctx: &ElementContext,
    ) -> ReelResult<()> {
        self.lifecycle.ensure_live(ElementKind::TaskList)?;
        self.layout_rows(ctx);
        self.settled = state.settled_tasks;
        self.impact = state.recent_impact;
        self.progress_pct = state.task_progress_pct;
        self.ui = state.ui;
        Ok(())
    }

    fn render(&self, out: &mut DisplayList) {
        if !self.lifecycle.is_mounted() {
            return;
        }
        let opacity = clamp01(self.ui.opacity);
        for (i, (rect, label)) in self.rows.iter().zip(&self.params.tasks).enumerate() {
            let color = if self.impact == Some(i) {
                self.params.impact_color
            } else if i < self.settled {
                self.params.settled_color
            } else {
                self.params.row_color
            };
            let rect = scale_about_center(*rect, self.ui.scale);
            out.push(DrawCommand::Fill {
                z: self.z,
                rect,
                color,
                opacity,
            });
            out.push(DrawCommand::Text {
                z: self.z,
                anchor: rect.center(),
                text: label.clone(),
                size: self.params.text_size,
                color: WHITE,
                opacity,
            });
        }
        let filled = self.bar.width() * clamp01(self.progress_pct / 100.0);
        out.push(DrawCommand::Fill {
            z: self.z,
            rect: Rect::new(self.bar.x0, self.bar.y0, self.bar.x0 + filled, self.bar.y1),
            color: self.params.bar_color,
            opacity,
        });
    }

    fn dispose(&mut self) -> ReelResult<()> {
        if self.lifecycle.dispose() {
            self.rows.clear();
        }
        Ok(())
    }

    fn destroy(&mut self) -> ReelResult<()> {
        self.dispose()?;
        self.lifecycle.destroy();
        Ok(())
    }
}

impl TaskListElement {
    fn layout_rows(&mut self, ctx: &ElementContext) {
        let count = self.params.tasks.len();
        self.rows = (0..count).map(|i| ctx.layout.task_row(i, count)).collect();
        let col = ctx.layout.tasks;
        self.bar = Rect::new(col.x0, col.y1 + 8.0, col.x1, col.y1 + 16.0);
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct BeamParams {
    task_count: usize,
}

impl Default for BeamParams {
    fn default() -> Self {
        Self { task_count: 4 }
    }
}

#[derive(Debug)]
pub(crate) struct BeamElement {
    z: i32,
    params: BeamParams,
    lifecycle: Lifecycle,
    beam: Option<BeamEvent>,
    from: Point,
    to: Point,
}

impl BeamElement {
    pub(crate) fn new(z: i32, params: BeamParams) -> Self {
        Self {
            z,
            params,
            lifecycle: Lifecycle::default(),
            beam: None,
            from: Point::ZERO,
            to: Point::ZERO,
        }
    }
}

impl Element for BeamElement {
    lifecycle_methods!(ElementKind::Beam);

    fn update(
        &mut self,
        _dt_ms: f64,
        state: &TimelineState,
        ctx: &ElementContext,
    ) -> ReelResult<()> {
        self.lifecycle.ensure_live(ElementKind::Beam)?;
        self.beam = state.beam;
        if let Some(beam) = &self.beam {
            let row = ctx.layout.task_row(beam.task_index, self.params.task_count);
            self.from = ctx.layout.beam_origin();
            self.to = Point::new(row.x0, row.center().y);
        }
        Ok(())
    }

    fn render(&self, out: &mut DisplayList) {
        let Some(beam) = self.beam.filter(|_| self.lifecycle.is_mounted()) else {
            return;
        };
        out.push(DrawCommand::Beam {
            z: self.z,
            from: self.from,
            to: self.to,
            progress: beam.progress,
            charging: beam.phase == BeamPhase::Charging,
        });
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct LogoParams {
    text: Option<String>,
    tagline: Option<String>,
    subtitle: Option<String>,
    size: f64,
}

impl Default for LogoParams {
    fn default() -> Self {
        Self {
            text: None,
            tagline: None,
            subtitle: None,
            size: 96.0,
        }
    }
}

/// Brand reveal: the mark fades in with brand progress, tagline and subtitle follow in the
/// second half.
#[derive(Debug)]
pub(crate) struct LogoElement {
    z: i32,
    params: LogoParams,
    lifecycle: Lifecycle,
    progress: f64,
    slot: Rect,
}

impl LogoElement {
    pub(crate) fn new(z: i32, params: LogoParams) -> Self {
        Self {
            z,
            params,
            lifecycle: Lifecycle::default(),
            progress: 0.0,
            slot: Rect::ZERO,
        }
    }
}

impl Element for LogoElement {
    lifecycle_methods!(ElementKind::Logo);

    fn update(
        &mut self,
        _dt_ms: f64,
        state: &TimelineState,
        ctx: &ElementContext,
    ) -> ReelResult<()> {
        self.lifecycle.ensure_live(ElementKind::Logo)?;
        self.progress = clamp01(state.brand_progress);
        self.slot = ctx.layout.logo;
        Ok(())
    }

    fn render(&self, out: &mut DisplayList) {
        if !self.lifecycle.is_mounted() || self.progress <= 0.0 {
            return;
        }
        let c = self.slot.center();
        let line = self.params.size * 0.75;
        let late = clamp01(self.progress * 2.0 - 1.0);
        let lines = [
            (self.params.text.as_ref(), 0.0, self.params.size, self.progress),
            (self.params.tagline.as_ref(), line, self.params.size * 0.35, late),
            (self.params.subtitle.as_ref(), line * 1.5, self.params.size * 0.25, late),
        ];
        for (text, dy, size, opacity) in lines {
            let Some(text) = text else { continue };
            if opacity <= 0.0 {
                continue;
            }
            out.push(DrawCommand::Text {
                z: self.z,
                anchor: Point::new(c.x, c.y + dy),
                text: text.clone(),
                size,
                color: WHITE,
                opacity,
            });
        }
    }
}

/// Element with a lifecycle and nothing to draw, for headless runs.
#[derive(Debug)]
pub(crate) struct NullElement {
    kind: ElementKind,
    lifecycle: Lifecycle,
}

impl NullElement {
    pub(crate) fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            lifecycle: Lifecycle::default(),
        }
    }
}

impl Element for NullElement {
    fn kind(&self) -> ElementKind {
        self.kind
    }

    fn mount(&mut self, _ctx: &ElementContext) -> ReelResult<()> {
        self.lifecycle.mount(self.kind)
    }

    fn update(
        &mut self,
        _dt_ms: f64,
        _state: &TimelineState,
        _ctx: &ElementContext,
    ) -> ReelResult<()> {
        self.lifecycle.ensure_live(self.kind)
    }

    fn render(&self, _out: &mut DisplayList) {}

    fn dispose(&mut self) -> ReelResult<()> {
        self.lifecycle.dispose();
        Ok(())
    }

    fn destroy(&mut self) -> ReelResult<()> {
        self.lifecycle.destroy();
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/elements.rs"]
mod tests;
