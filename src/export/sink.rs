use std::io::Write;

use serde::Serialize;

use crate::export::session::{ExportHeader, ExportStats, FrameRecord};
use crate::foundation::error::{ReelError, ReelResult};

/// Sink contract for consuming exported frames in timeline order.
///
/// Ordering contract: `push_frame` is called with strictly increasing frame indices.
pub trait FrameSink {
    /// Called once before any frames are pushed.
    fn begin(&mut self, header: &ExportHeader) -> ReelResult<()>;
    /// Push one frame.
    fn push_frame(&mut self, frame: &FrameRecord) -> ReelResult<()>;
    /// Called once after the last frame, also when the run was aborted.
    fn end(&mut self, stats: &ExportStats) -> ReelResult<()>;
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    header: Option<ExportHeader>,
    frames: Vec<FrameRecord>,
    stats: Option<ExportStats>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Header captured in `begin`, if any.
    pub fn header(&self) -> Option<&ExportHeader> {
        self.header.as_ref()
    }

    pub fn frames(&self) -> &[FrameRecord] {
        &self.frames
    }

    /// Stats captured in `end`, if any.
    pub fn stats(&self) -> Option<ExportStats> {
        self.stats
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, header: &ExportHeader) -> ReelResult<()> {
        self.header = Some(header.clone());
        self.frames.clear();
        self.stats = None;
        Ok(())
    }

    fn push_frame(&mut self, frame: &FrameRecord) -> ReelResult<()> {
        check_order(self.frames.last().map(|f| f.index), frame.index)?;
        self.frames.push(frame.clone());
        Ok(())
    }

    fn end(&mut self, stats: &ExportStats) -> ReelResult<()> {
        self.stats = Some(*stats);
        Ok(())
    }
}

/// Writes one JSON object per line: a header, every frame, then the stats.
#[derive(Debug)]
pub struct JsonLinesSink<W: Write> {
    out: W,
    last_index: Option<u64>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Line<'a> {
    Header(&'a ExportHeader),
    Frame(&'a FrameRecord),
    End(&'a ExportStats),
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            last_index: None,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_line(&mut self, line: &Line<'_>) -> ReelResult<()> {
        serde_json::to_writer(&mut self.out, line)
            .map_err(|e| ReelError::serde(format!("encode export line: {e}")))?;
        self.out
            .write_all(b"\n")
            .map_err(|e| ReelError::export(format!("write export line: {e}")))
    }
}

impl<W: Write> FrameSink for JsonLinesSink<W> {
    fn begin(&mut self, header: &ExportHeader) -> ReelResult<()> {
        self.last_index = None;
        self.write_line(&Line::Header(header))
    }

    fn push_frame(&mut self, frame: &FrameRecord) -> ReelResult<()> {
        check_order(self.last_index, frame.index)?;
        self.last_index = Some(frame.index);
        self.write_line(&Line::Frame(frame))
    }

    fn end(&mut self, stats: &ExportStats) -> ReelResult<()> {
        self.write_line(&Line::End(stats))?;
        self.out
            .flush()
            .map_err(|e| ReelError::export(format!("flush export output: {e}")))
    }
}

fn check_order(last: Option<u64>, next: u64) -> ReelResult<()> {
    match last {
        Some(last) if next <= last => Err(ReelError::export(format!(
            "frame {next} pushed after frame {last}"
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/sink.rs"]
mod tests;
