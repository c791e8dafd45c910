use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

use crate::foundation::core::Viewport;
use crate::foundation::error::{ReelError, ReelResult};

/// Supplies "milliseconds since program start".
///
/// A forced time, when set, always wins over the source's own notion of time; this is how seek
/// and screenshot modes pin a frame.
pub trait TimeSource {
    /// Prepare the source. Idempotent.
    fn initialize(&mut self);
    /// Current elapsed time in milliseconds.
    fn elapsed_ms(&self) -> f64;
    /// Pin (`Some`) or release (`None`) the reported time.
    fn set_forced_time(&mut self, ms: Option<f64>);
    /// Currently pinned time, if any.
    fn forced_time(&self) -> Option<f64>;
    /// Return to the initial time and release any pinned time.
    fn reset(&mut self);
}

/// Shared wall-clock origin.
///
/// Every wall-clock source created from the same origin agrees on when the program started.
/// Cloning shares the origin; it is established once, on first use.
#[derive(Clone, Debug, Default)]
pub struct ClockOrigin(Rc<Cell<Option<Instant>>>);

impl ClockOrigin {
    /// Fresh, not yet established origin.
    pub fn new() -> Self {
        Self::default()
    }

    /// The origin, if established.
    pub fn get(&self) -> Option<Instant> {
        self.0.get()
    }

    /// Return the origin, establishing it at `now` if nobody has yet.
    pub fn get_or_establish(&self, now: Instant) -> Instant {
        match self.0.get() {
            Some(origin) => origin,
            None => {
                self.0.set(Some(now));
                now
            }
        }
    }

    /// Move the origin to `now` for every holder.
    pub fn restart(&self, now: Instant) {
        self.0.set(Some(now));
    }
}

/// Per host session state that would otherwise be global: the drawing viewport and the shared
/// wall-clock origin.
#[derive(Clone, Debug)]
pub struct SessionContext {
    viewport: Viewport,
    origin: ClockOrigin,
}

impl SessionContext {
    /// New session with a fresh clock origin.
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            origin: ClockOrigin::new(),
        }
    }

    /// Session viewport.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Shared clock origin.
    pub fn origin(&self) -> &ClockOrigin {
        &self.origin
    }

    /// Wall-clock source sharing this session's origin.
    pub fn wall_clock(&self) -> WallClockTimeSource {
        WallClockTimeSource::new(self.origin.clone())
    }
}

/// Real-time source for interactive playback.
pub struct WallClockTimeSource {
    origin: ClockOrigin,
    now: Box<dyn Fn() -> Instant>,
    forced: Option<f64>,
}

impl std::fmt::Debug for WallClockTimeSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WallClockTimeSource")
            .field("origin", &self.origin)
            .field("forced", &self.forced)
            .finish_non_exhaustive()
    }
}

impl WallClockTimeSource {
    /// Source reading [`Instant::now`].
    pub fn new(origin: ClockOrigin) -> Self {
        Self::with_clock(origin, Instant::now)
    }

    /// Source reading time from `now`; lets hosts and tests drive the clock.
    pub fn with_clock(origin: ClockOrigin, now: impl Fn() -> Instant + 'static) -> Self {
        Self {
            origin,
            now: Box::new(now),
            forced: None,
        }
    }

    /// The origin this source measures from.
    pub fn origin(&self) -> &ClockOrigin {
        &self.origin
    }
}

impl TimeSource for WallClockTimeSource {
    fn initialize(&mut self) {
        self.origin.get_or_establish((self.now)());
    }

    fn elapsed_ms(&self) -> f64 {
        if let Some(forced) = self.forced {
            return forced;
        }
        let now = (self.now)();
        let origin = self.origin.get_or_establish(now);
        now.saturating_duration_since(origin).as_secs_f64() * 1000.0
    }

    fn set_forced_time(&mut self, ms: Option<f64>) {
        self.forced = ms;
    }

    fn forced_time(&self) -> Option<f64> {
        self.forced
    }

    fn reset(&mut self) {
        self.forced = None;
        self.origin.restart((self.now)());
    }
}

/// Deterministic frame-locked source for export.
///
/// Time is `frame * 1000 / fps`, computed from the frame counter so it never accumulates
/// rounding drift.
#[derive(Clone, Debug)]
pub struct FixedStepTimeSource {
    fps: f64,
    duration_ms: f64,
    frame: u64,
    forced: Option<f64>,
}

impl FixedStepTimeSource {
    /// Create a source stepping at `fps` over `duration_ms`.
    pub fn new(fps: f64, duration_ms: f64) -> ReelResult<Self> {
        if !fps.is_finite() || fps <= 0.0 {
            return Err(ReelError::validation("fixed-step fps must be finite and > 0"));
        }
        if !duration_ms.is_finite() || duration_ms <= 0.0 {
            return Err(ReelError::validation(
                "fixed-step duration must be finite and > 0",
            ));
        }
        Ok(Self {
            fps,
            duration_ms,
            frame: 0,
            forced: None,
        })
    }

    /// Milliseconds per frame.
    pub fn step_ms(&self) -> f64 {
        1000.0 / self.fps
    }

    /// Index of the current frame.
    pub fn frame_index(&self) -> u64 {
        self.frame
    }

    /// Number of frames in `[0, duration)`.
    pub fn frame_count(&self) -> u64 {
        (self.duration_ms * self.fps / 1000.0).ceil() as u64
    }

    /// Total duration.
    pub fn duration_ms(&self) -> f64 {
        self.duration_ms
    }

    /// Advance one frame; `false` once the new time is past the duration.
    pub fn next(&mut self) -> bool {
        self.frame += 1;
        !self.is_finished()
    }

    /// `true` once the internal time has reached the duration.
    pub fn is_finished(&self) -> bool {
        self.internal_ms() >= self.duration_ms
    }

    fn internal_ms(&self) -> f64 {
        self.frame as f64 * 1000.0 / self.fps
    }
}

impl TimeSource for FixedStepTimeSource {
    fn initialize(&mut self) {}

    fn elapsed_ms(&self) -> f64 {
        self.forced.unwrap_or_else(|| self.internal_ms())
    }

    fn set_forced_time(&mut self, ms: Option<f64>) {
        self.forced = ms;
    }

    fn forced_time(&self) -> Option<f64> {
        self.forced
    }

    fn reset(&mut self) {
        self.frame = 0;
        self.forced = None;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/time/source.rs"]
mod tests;
