use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;

use crate::compile::fingerprint::{StateFingerprint, fingerprint_state, fingerprint_visual};
use crate::eval::state::TimelineState;
use crate::export::sink::FrameSink;
use crate::foundation::core::Viewport;
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::backend::ElementBackend;
use crate::render::display_list::DisplayList;
use crate::render::element::ElementContext;
use crate::render::pipeline::RendererPipeline;
use crate::scene::program::Program;
use crate::time::source::{FixedStepTimeSource, TimeSource};

/// Output resolution multiplier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityPreset {
    /// Half resolution.
    Draft,
    /// Requested resolution.
    #[default]
    Standard,
    /// Double resolution.
    High,
}

impl QualityPreset {
    pub fn pixel_scale(self) -> f64 {
        match self {
            QualityPreset::Draft => 0.5,
            QualityPreset::Standard => 1.0,
            QualityPreset::High => 2.0,
        }
    }
}

/// Export parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct ExportOpts {
    /// Output width before the quality scale.
    pub width: u32,
    /// Output height before the quality scale.
    pub height: u32,
    /// Frames per second.
    pub fps: f64,
    /// Length to export; `None` exports the whole program.
    pub duration_ms: Option<f64>,
    /// Resolution preset.
    pub quality: QualityPreset,
}

impl Default for ExportOpts {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            fps: 30.0,
            duration_ms: None,
            quality: QualityPreset::Standard,
        }
    }
}

impl ExportOpts {
    pub fn validate(&self) -> ReelResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ReelError::export("export width/height must be > 0"));
        }
        if !self.fps.is_finite() || self.fps <= 0.0 {
            return Err(ReelError::export("export fps must be finite and > 0"));
        }
        if let Some(d) = self.duration_ms
            && (!d.is_finite() || d <= 0.0)
        {
            return Err(ReelError::export("export duration must be finite and > 0"));
        }
        Ok(())
    }

    /// Output viewport with the quality scale applied.
    pub fn viewport(&self) -> ReelResult<Viewport> {
        Ok(Viewport::new(self.width, self.height)?.scaled(self.quality.pixel_scale()))
    }
}

/// Handed to sinks in [`FrameSink::begin`].
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportHeader {
    /// Exported program.
    pub program_id: String,
    /// Output width in pixels (quality applied).
    pub width: u32,
    /// Output height in pixels (quality applied).
    pub height: u32,
    /// Frames per second.
    pub fps: f64,
    /// Exported length.
    pub duration_ms: f64,
    /// Frames a complete run pushes.
    pub frame_count: u64,
    /// Resolution preset.
    pub quality: QualityPreset,
}

/// One exported frame.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameRecord {
    /// Frame index.
    pub index: u64,
    /// Program time of the frame.
    pub elapsed_ms: f64,
    /// Active scene; `None` in a gap between scenes.
    pub scene_id: Option<String>,
    /// Resolved state of the active scene.
    pub state: Option<TimelineState>,
    /// Fingerprint of [`Self::state`].
    pub fingerprint: Option<StateFingerprint>,
    /// What the visible scene drew.
    pub display_list: DisplayList,
}

/// Outcome of [`ExportSession::run`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportStats {
    /// Frames pushed to the sink.
    pub frames_total: u64,
    /// Frames visually identical to the frame before them.
    pub frames_static: u64,
    /// `true` when an [`AbortHandle`] stopped the run early.
    pub aborted: bool,
}

/// Cooperative cancellation flag for a running export. Cheap to clone and `Send`.
#[derive(Clone, Debug, Default)]
pub struct AbortHandle(Arc<AtomicBool>);

impl AbortHandle {
    pub fn abort(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_aborted(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Frame-locked export of a compiled pipeline.
///
/// Every frame is resolved at `index * 1000 / fps` exactly, so two runs with the same options
/// produce identical records.
#[derive(Debug)]
pub struct ExportSession {
    pipeline: RendererPipeline,
    opts: ExportOpts,
    source: FixedStepTimeSource,
    abort: AbortHandle,
}

impl ExportSession {
    pub fn new(pipeline: RendererPipeline, opts: ExportOpts) -> ReelResult<Self> {
        opts.validate()?;
        let duration = opts
            .duration_ms
            .unwrap_or_else(|| pipeline.program().duration_ms());
        let source = FixedStepTimeSource::new(opts.fps, duration)
            .map_err(|e| ReelError::export(format!("invalid export timing: {e}")))?;
        Ok(Self {
            pipeline,
            opts,
            source,
            abort: AbortHandle::default(),
        })
    }

    /// Compile `program` against the export viewport and wrap it.
    pub fn for_program(
        program: Arc<dyn Program>,
        backend: &mut dyn ElementBackend,
        opts: ExportOpts,
    ) -> ReelResult<Self> {
        opts.validate()?;
        let ctx = ElementContext::new(opts.viewport()?);
        let pipeline = RendererPipeline::compile(program, backend, ctx)?;
        Self::new(pipeline, opts)
    }

    pub fn abort_handle(&self) -> AbortHandle {
        self.abort.clone()
    }

    pub fn opts(&self) -> &ExportOpts {
        &self.opts
    }

    pub fn pipeline(&self) -> &RendererPipeline {
        &self.pipeline
    }

    pub fn frame_count(&self) -> u64 {
        self.source.frame_count()
    }

    pub fn header(&self) -> ExportHeader {
        let vp = self.pipeline.context().viewport;
        ExportHeader {
            program_id: self.pipeline.program().program_id().to_owned(),
            width: vp.width,
            height: vp.height,
            fps: self.opts.fps,
            duration_ms: self.source.duration_ms(),
            frame_count: self.source.frame_count(),
            quality: self.opts.quality,
        }
    }

    /// Push every frame from 0 to the end of the duration into `sink`.
    ///
    /// Stops early, without error, once the abort handle fires. `end` is called whenever
    /// `begin` succeeded, also when a frame fails; the frame error then wins over an `end` error.
    pub fn run(&mut self, sink: &mut dyn FrameSink) -> ReelResult<ExportStats> {
        self.source.reset();
        let header = self.header();
        sink.begin(&header)?;
        tracing::info!(
            program = %header.program_id,
            frames = header.frame_count,
            fps = header.fps,
            "export started"
        );

        let mut stats = ExportStats::default();
        let pushed = self.push_frames(sink, &mut stats);
        let ended = sink.end(&stats);
        if let Err(e) = &pushed {
            tracing::warn!(frames = stats.frames_total, error = %e, "export failed");
        }
        pushed?;
        ended?;
        tracing::info!(
            frames = stats.frames_total,
            static_frames = stats.frames_static,
            aborted = stats.aborted,
            "export finished"
        );
        Ok(stats)
    }

    fn push_frames(
        &mut self,
        sink: &mut dyn FrameSink,
        stats: &mut ExportStats,
    ) -> ReelResult<()> {
        let mut prev: Option<(Option<String>, StateFingerprint)> = None;
        let mut last_ms: Option<f64> = None;
        loop {
            if self.abort.is_aborted() {
                tracing::warn!(frames = stats.frames_total, "export aborted");
                stats.aborted = true;
                return Ok(());
            }
            let index = self.source.frame_index();
            let elapsed = self.source.elapsed_ms();
            let dt = last_ms.map_or(0.0, |l| elapsed - l);
            last_ms = Some(elapsed);

            let record = self.render_record(index, elapsed, dt)?;
            if let Some(state) = &record.state {
                let visual = (record.scene_id.clone(), fingerprint_visual(state));
                if prev.as_ref() == Some(&visual) {
                    stats.frames_static += 1;
                }
                prev = Some(visual);
            } else {
                prev = None;
            }
            sink.push_frame(&record)?;
            stats.frames_total += 1;

            if !self.source.next() {
                return Ok(());
            }
        }
    }

    /// Render a single record at `ms` through the forced-time override (inspector screenshot).
    pub fn seek(&mut self, ms: f64) -> ReelResult<FrameRecord> {
        self.source.set_forced_time(Some(ms));
        let elapsed = self.source.elapsed_ms();
        let index = (elapsed.max(0.0) * self.opts.fps / 1000.0).floor() as u64;
        let record = self.render_record(index, elapsed, 0.0);
        self.source.set_forced_time(None);
        record
    }

    fn render_record(
        &mut self,
        index: u64,
        elapsed_ms: f64,
        dt_ms: f64,
    ) -> ReelResult<FrameRecord> {
        let frame = self.pipeline.tick(elapsed_ms, dt_ms)?;
        let display_list = self.pipeline.display_list();
        Ok(match frame {
            Some(frame) => FrameRecord {
                index,
                elapsed_ms,
                fingerprint: Some(fingerprint_state(&frame.state)),
                scene_id: Some(frame.scene_id),
                state: Some(frame.state),
                display_list,
            },
            None => FrameRecord {
                index,
                elapsed_ms,
                scene_id: None,
                state: None,
                fingerprint: None,
                display_list,
            },
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/session.rs"]
mod tests;
