use crate::timing::Clip;

/// Timeline for clip playback: maps every output frame to the clip (and
/// crossfade state) visible at that instant.
#[derive(Debug)]
pub struct Timeline {
    fps: u32,
    total_frames: u32,
    slots: Vec<ClipSlot>,
}

#[derive(Debug, Clone)]
struct ClipSlot {
    start_frame: u32,
    end_frame: u32,
    fade_frames: u32,
}

/// What one output frame shows
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameSample {
    /// Index of the active clip
    pub clip: usize,
    /// Inside a fade window: the clip holding underneath and the incoming
    /// clip's opacity (ramps 0 → 1 across the window)
    pub fade: Option<(usize, f32)>,
}

impl Timeline {
    /// Build the frame table from timed clips
    pub fn from_clips(clips: &[Clip], fps: u32) -> Self {
        let mut slots = Vec::with_capacity(clips.len());
        let mut current_frame = 0;

        for clip in clips {
            let clip_frames = (clip.duration * fps as f32) as u32;
            let fade_frames = (clip.fade_in * fps as f32) as u32;
            slots.push(ClipSlot {
                start_frame: current_frame,
                end_frame: current_frame + clip_frames,
                fade_frames,
            });
            current_frame += clip_frames;
        }

        Self {
            fps,
            total_frames: current_frame,
            slots,
        }
    }

    /// Get the sample at a given frame number
    pub fn sample(&self, frame: u32) -> Option<FrameSample> {
        for (index, slot) in self.slots.iter().enumerate() {
            if frame < slot.start_frame || frame >= slot.end_frame {
                continue;
            }

            let into = frame - slot.start_frame;
            let fade = if index > 0 && slot.fade_frames > 0 && into < slot.fade_frames {
                Some((index - 1, into as f32 / slot.fade_frames as f32))
            } else {
                None
            };

            return Some(FrameSample { clip: index, fade });
        }
        None
    }

    /// Get total frame count
    pub fn total_frames(&self) -> u32 {
        self.total_frames
    }

    /// Get FPS
    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Total playable duration of the visual track in seconds
    pub fn duration_seconds(&self) -> f32 {
        self.total_frames as f32 / self.fps as f32
    }
}
