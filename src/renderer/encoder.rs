use crate::error::{PipelineError, PipelineResult};
use std::path::Path;
use std::process::Command;

/// Handles video encoding using external FFmpeg process
pub struct VideoEncoder;

impl VideoEncoder {
    /// Check if FFmpeg is available
    pub fn is_available() -> bool {
        Command::new("ffmpeg").arg("-version").output().is_ok()
    }

    /// Encode a sequence of frames to a video file, binding the narration
    /// audio as the single global audio stream.
    ///
    /// `duration_seconds` is the visual track's total duration and governs
    /// the output: audio beyond it is truncated, audio shorter leaves
    /// silence. The encode writes to a partial file next to `output_path`
    /// and renames on success, so a failed run leaves nothing at the final
    /// path.
    ///
    /// # Arguments
    /// * `frame_pattern` - Pattern for input frames (e.g., "work/frame_%d.ppm")
    /// * `output_path` - Path for the output video (e.g., "final_output.mp4")
    /// * `fps` - Frames per second
    /// * `width` / `height` - Canvas dimensions
    /// * `audio_path` - Narration track, if any
    pub fn encode(
        frame_pattern: &str,
        output_path: &Path,
        fps: u32,
        width: u32,
        height: u32,
        audio_path: Option<&Path>,
        duration_seconds: f32,
    ) -> PipelineResult<()> {
        if !Self::is_available() {
            return Err(PipelineError::encoding(
                "ffmpeg not found. Please install ffmpeg to enable video encoding.",
            ));
        }

        println!("🎥 Encoding video to {}...", output_path.display());

        let partial = output_path.with_extension("partial.mp4");

        let mut cmd = Command::new("ffmpeg");
        cmd.arg("-y") // Overwrite output
            .arg("-f")
            .arg("image2") // Input format
            .arg("-framerate")
            .arg(fps.to_string())
            .arg("-i")
            .arg(frame_pattern);

        if let Some(audio) = audio_path {
            cmd.arg("-i").arg(audio);
        }

        cmd.arg("-c:v")
            .arg("libx264") // Video codec
            .arg("-pix_fmt")
            .arg("yuv420p") // Pixel format for compatibility
            .arg("-s")
            .arg(format!("{}x{}", width, height));

        if audio_path.is_some() {
            cmd.arg("-c:a").arg("aac"); // Audio codec
        }

        // The visual track governs the playable duration
        cmd.arg("-t").arg(format!("{duration_seconds:.3}"));

        let status = cmd
            .arg(&partial)
            .status()
            .map_err(|e| PipelineError::encoding(format!("failed to execute ffmpeg: {e}")))?;

        if !status.success() {
            std::fs::remove_file(&partial).ok();
            return Err(PipelineError::encoding("ffmpeg encoding failed"));
        }

        std::fs::rename(&partial, output_path).map_err(|e| {
            std::fs::remove_file(&partial).ok();
            PipelineError::encoding(format!(
                "failed to move encoded video to {}: {e}",
                output_path.display()
            ))
        })?;

        Ok(())
    }
}
