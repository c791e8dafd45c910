use crate::eval::state::TimelineState;
use crate::foundation::core::{Point, Rect, Viewport};
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::display_list::DisplayList;
use crate::scene::model::ElementKind;

/// Named screen regions derived from the viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Layout {
    /// Whole viewport.
    pub full: Rect,
    /// Dynamic header strip along the top.
    pub header: Rect,
    /// Chart panel on the left.
    pub chart: Rect,
    /// Task column on the right.
    pub tasks: Rect,
    /// Caption band across the middle.
    pub caption: Rect,
    /// Centered brand block.
    pub logo: Rect,
}

impl Layout {
    pub fn for_viewport(viewport: Viewport) -> Self {
        let w = f64::from(viewport.width);
        let h = f64::from(viewport.height);
        let frac = |x0: f64, y0: f64, x1: f64, y1: f64| Rect::new(x0 * w, y0 * h, x1 * w, y1 * h);
        Self {
            full: viewport.rect(),
            header: frac(0.05, 0.04, 0.95, 0.12),
            chart: frac(0.05, 0.16, 0.65, 0.84),
            tasks: frac(0.70, 0.16, 0.95, 0.84),
            caption: frac(0.10, 0.40, 0.90, 0.60),
            logo: frac(0.30, 0.35, 0.70, 0.65),
        }
    }

    /// Row `index` when `tasks` is split into `count` equal rows.
    pub fn task_row(&self, index: usize, count: usize) -> Rect {
        let count = count.max(1) as f64;
        let row_h = self.tasks.height() / count;
        let y0 = self.tasks.y0 + row_h * index as f64;
        Rect::new(self.tasks.x0, y0, self.tasks.x1, y0 + row_h)
    }

    /// Point on the chart's right edge where beams leave.
    pub fn beam_origin(&self) -> Point {
        Point::new(self.chart.x1, self.chart.center().y)
    }
}

/// Everything an element may use to position itself, passed explicitly to every call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ElementContext {
    /// Drawing surface size.
    pub viewport: Viewport,
    /// Regions derived from [`Self::viewport`].
    pub layout: Layout,
}

impl ElementContext {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            layout: Layout::for_viewport(viewport),
        }
    }
}

impl Default for ElementContext {
    fn default() -> Self {
        Self::new(Viewport::default())
    }
}

/// A unit of visual content.
///
/// Lifecycle: `mount` once, then any number of `update`/`render` calls, then `dispose` (which may
/// run more than once) and finally `destroy`. Elements hold no timing logic; whatever they show
/// comes from the last state passed to `update`.
pub trait Element {
    /// Kind this element was built from.
    fn kind(&self) -> ElementKind;

    /// Acquire resources and position against `ctx`.
    fn mount(&mut self, ctx: &ElementContext) -> ReelResult<()>;

    /// Absorb a new state. `dt_ms` is the time since the previous pipeline tick.
    fn update(&mut self, dt_ms: f64, state: &TimelineState, ctx: &ElementContext)
    -> ReelResult<()>;

    /// Append this element's draw commands.
    fn render(&self, out: &mut DisplayList);

    /// Release resources. Idempotent.
    fn dispose(&mut self) -> ReelResult<()>;

    /// Final teardown; disposes first if needed. Idempotent.
    fn destroy(&mut self) -> ReelResult<()>;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum Stage {
    #[default]
    Created,
    Mounted,
    Disposed,
    Destroyed,
}

/// Lifecycle bookkeeping shared by the built-in elements.
///
/// Enforces ordering and makes repeated `dispose`/`destroy` calls no-ops.
#[derive(Clone, Copy, Debug, Default)]
pub struct Lifecycle {
    stage: Stage,
    releases: u32,
}

impl Lifecycle {
    pub fn mount(&mut self, kind: ElementKind) -> ReelResult<()> {
        match self.stage {
            Stage::Created => {
                self.stage = Stage::Mounted;
                Ok(())
            }
            Stage::Mounted => Err(ReelError::element(format!("{kind} is already mounted"))),
            Stage::Disposed | Stage::Destroyed => Err(ReelError::element(format!(
                "{kind} cannot be mounted after dispose"
            ))),
        }
    }

    /// Fails unless mounted and not yet disposed.
    pub fn ensure_live(&self, kind: ElementKind) -> ReelResult<()> {
        if self.stage == Stage::Mounted {
            Ok(())
        } else {
            Err(ReelError::element(format!("{kind} is not mounted")))
        }
    }

    /// Returns `true` only on the call that actually releases.
    pub fn dispose(&mut self) -> bool {
        match self.stage {
            Stage::Created | Stage::Mounted => {
                self.stage = Stage::Disposed;
                self.releases += 1;
                true
            }
            Stage::Disposed | Stage::Destroyed => false,
        }
    }

    /// Returns `true` only on the first call.
    pub fn destroy(&mut self) -> bool {
        self.dispose();
        if self.stage == Stage::Destroyed {
            return false;
        }
        self.stage = Stage::Destroyed;
        true
    }

    pub fn is_mounted(&self) -> bool {
        self.stage == Stage::Mounted
    }

    pub fn is_destroyed(&self) -> bool {
        self.stage == Stage::Destroyed
    }

    /// How many times resources were released; never above 1.
    pub fn releases(&self) -> u32 {
        self.releases
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/element.rs"]
mod tests;
