use tracing::info;

use crate::classify::Classifier;
use crate::compose::{FrameComposer, FrameRGBA};
use crate::config::FlashOptions;
use crate::data::bundle::UnicodeBundle;
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::font::FontSet;
use crate::foundation::core::CodePoint;
use crate::foundation::error::UniflashResult;
use crate::pipeline::runs::{build_tasks, partition_runs};
use crate::pipeline::{PipelineOpts, PipelineStats, run_pipeline};

/// One flash-video run over a frozen bundle, font set and options.
///
/// Everything here is immutable shared state; the session can be driven once
/// per input sequence.
pub struct FlashSession<'a> {
    bundle: &'a UnicodeBundle,
    fonts: &'a FontSet,
    opts: &'a FlashOptions,
}

impl<'a> FlashSession<'a> {
    /// Validate options and build a session.
    pub fn new(
        bundle: &'a UnicodeBundle,
        fonts: &'a FontSet,
        opts: &'a FlashOptions,
    ) -> UniflashResult<Self> {
        opts.validate()?;
        Ok(Self {
            bundle,
            fonts,
            opts,
        })
    }

    /// Render the whole sequence into `sink`, one frame per code point, in
    /// input order.
    pub fn render_to_sink(
        &self,
        codes: &[CodePoint],
        pipeline_opts: &PipelineOpts,
        sink: &mut dyn FrameSink,
    ) -> UniflashResult<PipelineStats> {
        let classifier = Classifier::new(self.bundle);
        let runs = partition_runs(codes, &classifier);
        let tasks = build_tasks(codes, &runs);
        info!(codes = codes.len(), runs = runs.len(), "built block runs");

        let composer = FrameComposer::new(classifier, self.fonts, self.opts);
        let cfg = SinkConfig {
            width: self.opts.video.width,
            height: self.opts.video.height,
            fps: self.opts.video.fps,
        };
        run_pipeline(
            &tasks,
            cfg,
            pipeline_opts,
            |task| composer.compose(task.code, task.run_pos, task.run_len),
            sink,
        )
    }

    /// Render a single code point as a standalone frame (its own run of one).
    pub fn render_single(&self, code: CodePoint) -> UniflashResult<FrameRGBA> {
        let classifier = Classifier::new(self.bundle);
        let composer = FrameComposer::new(classifier, self.fonts, self.opts);
        composer.compose(code, 0, 1)
    }
}
