//! Encoding sinks.
//!
//! Sinks consume rendered frames in input order; the pipeline's encoder
//! thread is their single writer.

/// `ffmpeg`-based sink (MP4 output via system `ffmpeg`).
pub mod ffmpeg;
/// Generic frame sink trait and built-in sinks.
pub mod sink;

pub use ffmpeg::{FfmpegSink, FfmpegSinkOpts};
pub use sink::{FrameSink, InMemorySink, SinkConfig};
