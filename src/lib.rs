//! Uniflash turns an ordered sequence of Unicode code points into a video:
//! one annotated frame per code point, showing its glyph (or an explanatory
//! placeholder) plus derived metadata.
//!
//! The public API is session-oriented:
//!
//! - Load a [`UnicodeBundle`] and a [`FontSet`]
//! - Create a [`FlashSession`]
//! - Stream a code-point sequence into a [`FrameSink`]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

/// Total classification of the code-point space.
pub mod classify;
/// Frame composition.
pub mod compose;
/// Run options.
pub mod config;
/// Immutable reference data.
pub mod data;
/// Encoding sinks.
pub mod encode;
/// Session-oriented rendering API.
pub mod flash;
/// Font resources and fallback resolution.
pub mod font;
mod foundation;
/// Input sources and filters.
pub mod input;
/// Ordered parallel frame production.
pub mod pipeline;

pub use crate::foundation::core::{CodePoint, FrameIndex};
pub use crate::foundation::error::{UniflashError, UniflashResult};

pub use crate::classify::{Category, Classifier};
pub use crate::compose::{FrameComposer, FrameRGBA};
pub use crate::config::{Dimensions, FlashOptions, LastResortPolicy, ShowFlags, VideoProps};
pub use crate::data::bundle::UnicodeBundle;
pub use crate::encode::{FfmpegSink, FfmpegSinkOpts, FrameSink, InMemorySink, SinkConfig};
pub use crate::flash::FlashSession;
pub use crate::font::FontSet;
pub use crate::pipeline::{PipelineOpts, PipelineStats};
