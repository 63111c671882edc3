use crate::error::{PipelineError, PipelineResult};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Capability that turns narration text into an audio file
pub trait SpeechSynthesizer {
    fn synthesize(&self, text: &str, output: &Path) -> PipelineResult<()>;
}

/// Drives a local Piper TTS process over stdin
pub struct PiperSynthesizer {
    model: PathBuf,
}

impl PiperSynthesizer {
    pub fn new(model: impl Into<PathBuf>) -> Self {
        Self {
            model: model.into(),
        }
    }

    /// Check if piper is available
    pub fn is_available() -> bool {
        Command::new("piper").arg("--help").output().is_ok()
    }
}

impl SpeechSynthesizer for PiperSynthesizer {
    fn synthesize(&self, text: &str, output: &Path) -> PipelineResult<()> {
        let asset = || format!("narration audio {}", output.display());

        let mut child = Command::new("piper")
            .arg("--model")
            .arg(&self.model)
            .arg("--output_file")
            .arg(output)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| PipelineError::asset(asset(), format!("failed to spawn piper: {e}")))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| PipelineError::asset(asset(), "piper stdin unavailable"))?;
        stdin
            .write_all(text.as_bytes())
            .map_err(|e| PipelineError::asset(asset(), format!("failed to feed piper: {e}")))?;
        drop(stdin);

        let status = child
            .wait()
            .map_err(|e| PipelineError::asset(asset(), e.to_string()))?;

        if !status.success() {
            return Err(PipelineError::asset(
                asset(),
                "piper returned non-zero status",
            ));
        }

        Ok(())
    }
}

/// The single narration track; its duration is the timing reference for the
/// whole timeline.
#[derive(Debug, Clone)]
pub struct AudioTrack {
    pub path: PathBuf,
    pub duration: f32,
}

impl AudioTrack {
    /// Measure an audio file's duration. WAV goes through hound; every other
    /// format is probed with symphonia.
    pub fn probe(path: &Path) -> PipelineResult<AudioTrack> {
        let is_wav = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("wav"));

        let duration = if is_wav {
            wav_duration(path)?
        } else {
            probed_duration(path)?
        };

        Ok(AudioTrack {
            path: path.to_path_buf(),
            duration,
        })
    }
}

fn wav_duration(path: &Path) -> PipelineResult<f32> {
    let asset = format!("narration audio {}", path.display());
    let reader = hound::WavReader::open(path)
        .map_err(|e| PipelineError::asset(asset, e.to_string()))?;
    let spec = reader.spec();
    let frames = reader.len() as f32 / spec.channels as f32;
    Ok(frames / spec.sample_rate as f32)
}

/// Duration via symphonia: the format header when it carries a frame count,
/// a full decode pass otherwise.
fn probed_duration(path: &Path) -> PipelineResult<f32> {
    let asset = || format!("narration audio {}", path.display());

    let src = std::fs::File::open(path)
        .map_err(|e| PipelineError::asset(asset(), e.to_string()))?;
    let mss = MediaSourceStream::new(Box::new(src), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let meta_opts: MetadataOptions = Default::default();
    let fmt_opts: FormatOptions = Default::default();

    let probed = symphonia::default::get_probe()
        .format(&hint, mss, &fmt_opts, &meta_opts)
        .map_err(|e| PipelineError::asset(asset(), format!("unsupported audio format: {e}")))?;

    let mut format = probed.format;
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| PipelineError::asset(asset(), "no supported audio track found"))?;

    let sample_rate = track.codec_params.sample_rate.unwrap_or(44100);

    if let Some(n_frames) = track.codec_params.n_frames {
        return Ok(n_frames as f32 / sample_rate as f32);
    }

    let dec_opts: DecoderOptions = Default::default();
    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &dec_opts)
        .map_err(|e| PipelineError::asset(asset(), format!("unsupported codec: {e}")))?;
    let track_id = track.id;

    let mut total_frames: u64 = 0;
    while let Ok(packet) = format.next_packet() {
        if packet.track_id() != track_id {
            continue;
        }
        match decoder.decode(&packet) {
            Ok(decoded) => total_frames += decoded.frames() as u64,
            Err(_) => break,
        }
    }

    Ok(total_frames as f32 / sample_rate as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_wav(path: &Path, seconds: f32, sample_rate: u32) {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for _ in 0..(seconds * sample_rate as f32) as u32 {
            writer.write_sample(0i16).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_wav_duration() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("narration.wav");
        write_wav(&path, 2.5, 16000);

        let track = AudioTrack::probe(&path).unwrap();
        assert!((track.duration - 2.5).abs() < 0.01, "{}", track.duration);
        assert_eq!(track.path, path);
    }

    #[test]
    fn test_symphonia_probe_agrees_with_hound() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("narration.wav");
        write_wav(&path, 1.0, 22050);

        let via_symphonia = probed_duration(&path).unwrap();
        let via_hound = wav_duration(&path).unwrap();
        assert!((via_symphonia - via_hound).abs() < 0.01);
    }

    #[test]
    fn test_probe_missing_file() {
        let result = AudioTrack::probe(Path::new("/nonexistent/narration.wav"));
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("asset generation failed"));
    }
}
