use crate::error::{PipelineError, PipelineResult};
use crate::renderer::{Compositor, FrameBuffer, Timeline};
use crate::timing::Clip;
use image::RgbaImage;
use std::path::Path;

/// Sequential frame renderer: composites the timeline's clips onto a shared
/// canvas, one frame at a time.
#[derive(Debug)]
pub struct RenderEngine {
    timeline: Timeline,
    frame_buffer: FrameBuffer,
    under_buffer: FrameBuffer,
    slides: Vec<RgbaImage>,
}

impl RenderEngine {
    /// Create a new render engine from timed clips. Decodes every slide image
    /// once up front; the canvas is sized to fit the largest slide.
    pub fn new(clips: &[Clip], fps: u32) -> PipelineResult<Self> {
        let mut slides = Vec::with_capacity(clips.len());
        for clip in clips {
            let img = image::open(&clip.asset.path)
                .map_err(|e| {
                    PipelineError::asset(
                        format!("slide {}", clip.asset.path.display()),
                        format!("failed to decode: {e}"),
                    )
                })?
                .to_rgba8();
            slides.push(img);
        }

        let (width, height) = Compositor::canvas_size(slides.iter().map(|s| s.dimensions()));
        let timeline = Timeline::from_clips(clips, fps);

        Ok(Self {
            timeline,
            frame_buffer: FrameBuffer::new(width, height),
            under_buffer: FrameBuffer::new(width, height),
            slides,
        })
    }

    /// Render a single frame into the internal buffer
    pub fn render_frame(&mut self, frame: u32) -> PipelineResult<()> {
        self.frame_buffer.clear([0, 0, 0, 255]);

        if let Some(sample) = self.timeline.sample(frame) {
            Compositor::draw_centered(&mut self.frame_buffer, &self.slides[sample.clip]);

            if let Some((under, alpha)) = sample.fade {
                self.under_buffer.clear([0, 0, 0, 255]);
                Compositor::draw_centered(&mut self.under_buffer, &self.slides[under]);
                self.frame_buffer.lerp_from(&self.under_buffer, alpha);
            }
        }

        Ok(())
    }

    /// Save the current frame
    pub fn save_frame(&self, path: &Path) -> PipelineResult<()> {
        self.frame_buffer.save_ppm(path)?;
        Ok(())
    }

    /// Render all frames to the output directory, returning the frame count
    pub fn render(&mut self, output_dir: &Path) -> PipelineResult<u32> {
        let total_frames = self.timeline.total_frames();
        let report_every = self.timeline.fps().max(1);

        for frame in 0..total_frames {
            if frame % report_every == 0 {
                println!("  Rendering frame {}/{}", frame, total_frames);
            }

            self.render_frame(frame)?;
            let path = output_dir.join(format!("frame_{frame}.ppm"));
            self.save_frame(&path)?;
        }

        Ok(total_frames)
    }

    /// Get timeline
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Shared canvas dimensions
    pub fn canvas_size(&self) -> (u32, u32) {
        self.frame_buffer.dimensions()
    }

    /// Inspect a pixel of the current frame
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.frame_buffer.get_pixel(x, y)
    }
}
