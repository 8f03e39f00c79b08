//! Progress reporting on the diagnostic channel.
//!
//! Observers never write to stdout; that channel is reserved for the result.

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::fmt;
use std::io::{self, Write};
use std::sync::{LazyLock, Mutex};

static BARS: LazyLock<MultiProgress> = LazyLock::new(MultiProgress::new);

/// Draw target shared by every bar on stderr.
pub fn bars() -> &'static MultiProgress {
    &BARS
}

/// Writer that lifts active bars off the terminal while a line is written,
/// so log output lands above them instead of through them.
#[derive(Debug)]
pub struct BarAwareWriter<W> {
    inner: W,
}

impl<W: Write> BarAwareWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for BarAwareWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        bars().suspend(|| self.inner.write(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    LoadModel,
    PrepareAudio,
    ChunkAudio,
    TranscribeChunks,
    FormatResult,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::LoadModel,
        Stage::PrepareAudio,
        Stage::ChunkAudio,
        Stage::TranscribeChunks,
        Stage::FormatResult,
    ];

    pub const COUNT: usize = Self::ALL.len();

    pub fn label(self) -> &'static str {
        match self {
            Stage::LoadModel => "Loading Whisper model",
            Stage::PrepareAudio => "Preparing audio",
            Stage::ChunkAudio => "Chunking audio",
            Stage::TranscribeChunks => "Transcribing chunks",
            Stage::FormatResult => "Formatting result",
        }
    }

    /// One-based position of this stage.
    pub fn position(self) -> usize {
        self as usize + 1
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Receives progress notifications from the pipeline.
pub trait ProgressObserver: Send + Sync {
    /// Called when a stage begins.
    fn stage_started(&self, _stage: Stage) {}

    /// `current` of `total` units of `stage` are done.
    fn report(&self, stage: Stage, current: usize, total: usize);
}

impl<T: ProgressObserver + ?Sized> ProgressObserver for &T {
    fn stage_started(&self, stage: Stage) {
        (**self).stage_started(stage)
    }

    fn report(&self, stage: Stage, current: usize, total: usize) {
        (**self).report(stage, current, total)
    }
}

/// Discards all progress (quiet mode).
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentProgress;

impl ProgressObserver for SilentProgress {
    fn report(&self, _stage: Stage, _current: usize, _total: usize) {}
}

/// Emits progress as tracing events.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogProgress;

impl ProgressObserver for LogProgress {
    fn stage_started(&self, stage: Stage) {
        tracing::info!("[{}/{}] {}", stage.position(), Stage::COUNT, stage);
    }

    fn report(&self, stage: Stage, current: usize, total: usize) {
        tracing::info!("{}: {}/{}", stage, current, total);
    }
}

/// Draws an indicatif bar per stage on stderr.
pub struct BarProgress {
    bar: Mutex<Option<ProgressBar>>,
}

impl BarProgress {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{prefix:.bold} {msg} [{bar:30.cyan/blue}] {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-")
    }

    fn finish_current(slot: &mut Option<ProgressBar>) {
        if let Some(bar) = slot.take() {
            bar.finish_and_clear();
            bars().remove(&bar);
        }
    }
}

impl Default for BarProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BarProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BarProgress").finish_non_exhaustive()
    }
}

impl ProgressObserver for BarProgress {
    fn stage_started(&self, stage: Stage) {
        let Ok(mut slot) = self.bar.lock() else {
            return;
        };
        Self::finish_current(&mut slot);

        let bar = bars().add(ProgressBar::new(1));
        bar.set_style(Self::style());
        bar.set_prefix(format!("[{}/{}]", stage.position(), Stage::COUNT));
        bar.set_message(stage.label());
        *slot = Some(bar);
    }

    fn report(&self, _stage: Stage, current: usize, total: usize) {
        let Ok(slot) = self.bar.lock() else {
            return;
        };
        if let Some(bar) = slot.as_ref() {
            bar.set_length(total as u64);
            bar.set_position(current as u64);
        }
    }
}

impl Drop for BarProgress {
    fn drop(&mut self) {
        if let Ok(mut slot) = self.bar.lock() {
            Self::finish_current(&mut slot);
        }
    }
}

/// Records every notification, for assertions in tests.
#[derive(Debug, Default)]
pub struct RecordingProgress {
    events: Mutex<Vec<ProgressEvent>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressEvent {
    Started(Stage),
    Report {
        stage: Stage,
        current: usize,
        total: usize,
    },
}

impl RecordingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn started_stages(&self) -> Vec<Stage> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ProgressEvent::Started(stage) => Some(stage),
                ProgressEvent::Report { .. } => None,
            })
            .collect()
    }

    fn push(&self, event: ProgressEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl ProgressObserver for RecordingProgress {
    fn stage_started(&self, stage: Stage) {
        self.push(ProgressEvent::Started(stage));
    }

    fn report(&self, stage: Stage, current: usize, total: usize) {
        self.push(ProgressEvent::Report {
            stage,
            current,
            total,
        });
    }
}
