use crate::foundation::error::{ReelError, ReelResult};

pub use kurbo::{Point, Rect};

/// Half-open time range `[start_ms, end_ms)` in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TimeRange {
    /// Inclusive range start.
    pub start_ms: f64,
    /// Exclusive range end.
    pub end_ms: f64,
}

impl TimeRange {
    /// Create a validated range with finite bounds and `start_ms <= end_ms`.
    pub fn new(start_ms: f64, end_ms: f64) -> ReelResult<Self> {
        if !start_ms.is_finite() || !end_ms.is_finite() {
            return Err(ReelError::validation("TimeRange bounds must be finite"));
        }
        if start_ms > end_ms {
            return Err(ReelError::validation("TimeRange start must be <= end"));
        }
        Ok(Self { start_ms, end_ms })
    }

    /// Length of the range in milliseconds.
    pub fn duration_ms(self) -> f64 {
        (self.end_ms - self.start_ms).max(0.0)
    }

    /// Return `true` when the range has no extent.
    pub fn is_empty(self) -> bool {
        self.end_ms <= self.start_ms
    }

    /// Return `true` when `t` is inside `[start_ms, end_ms)`.
    pub fn contains(self, t: f64) -> bool {
        self.start_ms <= t && t < self.end_ms
    }

    /// Return `true` when the two half-open ranges share any instant.
    pub fn overlaps(self, other: TimeRange) -> bool {
        self.start_ms < other.end_ms && other.start_ms < self.end_ms
    }

    /// Linear progress of `t` through the range, clamped to `[0, 1]`.
    ///
    /// Empty ranges report `1.0` once `t` reaches the start.
    pub fn progress(self, t: f64) -> f64 {
        let dur = self.duration_ms();
        if dur <= 0.0 {
            return if t >= self.start_ms { 1.0 } else { 0.0 };
        }
        ((t - self.start_ms) / dur).clamp(0.0, 1.0)
    }
}

/// Drawing surface dimensions in logical pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

impl Viewport {
    /// Create a validated viewport with non-zero dimensions.
    pub fn new(width: u32, height: u32) -> ReelResult<Self> {
        if width == 0 || height == 0 {
            return Err(ReelError::validation("viewport width/height must be > 0"));
        }
        Ok(Self { width, height })
    }

    /// Viewport bounds anchored at the origin.
    pub fn rect(self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }

    /// Scale both dimensions, rounding and keeping at least one pixel.
    pub fn scaled(self, factor: f64) -> Self {
        fn scale_dim(v: u32, factor: f64) -> u32 {
            ((f64::from(v) * factor).round() as u32).max(1)
        }
        Self {
            width: scale_dim(self.width, factor),
            height: scale_dim(self.height, factor),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
