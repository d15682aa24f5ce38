//! Playoff renders animated tournament-bracket elimination diagrams.
//!
//! The pipeline is session-oriented:
//!
//! - Describe a bracket and its mutation script as a [`Storyboard`]
//! - Pick a drawing backend ([`RasterSurface`], [`SvgSurface`], or the
//!   headless [`RecordingSurface`])
//! - Drive a [`Sequencer`] over the script, streaming captured PNG
//!   frames into a [`FrameSink`]
#![forbid(unsafe_code)]

pub mod bracket;
pub mod encode;
mod foundation;
pub mod render;
pub mod sequence;

pub use crate::bracket::layout::{BracketLayout, LayoutOpts, WrapRule};
pub use crate::bracket::model::{AnimationState, BracketSpec, CellId, MutationStep, merge_target};
pub use crate::encode::frames::{
    DirSink, FrameSink, MemorySink, RunStamp, ZipSink, encode_png, frame_file_name,
};
pub use crate::foundation::core::{Canvas, Fps, FrameIndex, Point, Rect, Rgba8, Vec2};
pub use crate::foundation::error::{PlayoffError, PlayoffResult};
pub use crate::render::painter::{BracketPainter, Theme};
pub use crate::render::raster::RasterSurface;
pub use crate::render::surface::{DrawOp, FramePixels, RecordingSurface, Surface};
pub use crate::render::svg::SvgSurface;
pub use crate::sequence::clock::{AudioClock, FrameClock, Pacer, SleepPacer};
pub use crate::sequence::script::{
    Action, Pause, PhotoTimer, Storyboard, demo_bracket, demo_script, demo_storyboard,
};
pub use crate::sequence::sequencer::{RunState, Sequencer};
