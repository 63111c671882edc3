use crate::error::{PipelineError, PipelineResult};
use crate::slides::VisualAsset;

/// A visual asset paired with its display duration.
///
/// Durations are always derived (by the allocator), never authored directly;
/// `fade_in` is only ever set by the transition pass.
#[derive(Debug, Clone)]
pub struct Clip {
    pub asset: VisualAsset,
    pub duration: f32,
    pub fade_in: f32,
}

impl Clip {
    pub fn new(asset: VisualAsset, duration: f32) -> Self {
        Self {
            asset,
            duration,
            fade_in: 0.0,
        }
    }
}

/// Assign each clip its display duration.
///
/// Baseline policy: a fixed duration per clip, independent of audio length.
/// Narration synthesis gives no per-segment timing metadata, so this is the
/// simplest correct allocation; exact audio sync is the caller's concern.
pub fn allocate(clip_count: usize, clip_duration: f32) -> PipelineResult<Vec<f32>> {
    if clip_count == 0 {
        return Err(PipelineError::configuration(
            "cannot build a timeline with zero clips",
        ));
    }
    if !clip_duration.is_finite() || clip_duration <= 0.0 {
        return Err(PipelineError::configuration(format!(
            "clip duration must be positive, got {clip_duration}"
        )));
    }

    Ok(vec![clip_duration; clip_count])
}
