use crate::error::{PipelineError, PipelineResult};
use crate::timing::Clip;

/// Wrap adjacent clips with a crossfade: every clip except the first fades
/// in over `overlap` seconds. The first clip has nothing to fade from and is
/// left untouched.
///
/// Pure transformation: clip count and ordering never change, only entry
/// behavior. `overlap` must be strictly less than the shortest clip's
/// duration, otherwise the fade would consume more than a clip's own runtime.
pub fn apply_transitions(mut clips: Vec<Clip>, overlap: f32) -> PipelineResult<Vec<Clip>> {
    if !overlap.is_finite() || overlap <= 0.0 {
        return Err(PipelineError::configuration(format!(
            "transition overlap must be positive, got {overlap}"
        )));
    }

    let shortest = clips
        .iter()
        .map(|c| c.duration)
        .fold(f32::INFINITY, f32::min);
    if overlap >= shortest {
        return Err(PipelineError::configuration(format!(
            "transition overlap {overlap}s must be shorter than the shortest clip ({shortest}s)"
        )));
    }

    for clip in clips.iter_mut().skip(1) {
        clip.fade_in = overlap;
    }

    Ok(clips)
}
