pub mod generated;
pub mod template;

pub use generated::{GeneratedRenderer, HttpImageSynthesizer, ImageSynthesizer};
pub use template::TemplateRenderer;

use crate::error::PipelineResult;
use std::path::PathBuf;

/// Identifies one slide within a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideId {
    /// The title slide, always first on the timeline
    Lead,
    /// A narration segment slide, by segment index
    Body(usize),
}

impl SlideId {
    /// Deterministic file name so re-runs overwrite instead of accumulating
    /// stale slides.
    pub fn file_name(&self) -> String {
        match self {
            SlideId::Lead => "slide_000.png".to_string(),
            SlideId::Body(index) => format!("slide_{:03}.png", index + 1),
        }
    }

    /// Human-readable name used in error context
    pub fn describe(&self) -> String {
        match self {
            SlideId::Lead => "lead slide".to_string(),
            SlideId::Body(index) => format!("slide for segment {index}"),
        }
    }
}

/// One slide to produce: which slot it fills and the text it shows
#[derive(Debug, Clone, Copy)]
pub struct SlideSpec<'a> {
    pub id: SlideId,
    pub text: &'a str,
}

/// An image file bound to exactly one slide; created once, never mutated
#[derive(Debug, Clone)]
pub struct VisualAsset {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

/// Capability that produces one image file per slide.
///
/// Writes exactly one file per call, at a path determined by the slide id.
pub trait SlideRenderer {
    fn render(&mut self, slide: &SlideSpec) -> PipelineResult<VisualAsset>;
}
