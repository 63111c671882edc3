use slidecast::config::AppConfig;
use slidecast::document::{Summarizer, Summary, TextExtractor};
use slidecast::error::{PipelineError, PipelineResult};
use slidecast::pipeline::{script_plan, Capabilities, Pipeline};
use slidecast::renderer::RenderEngine;
use slidecast::slides::{SlideRenderer, SlideSpec, VisualAsset};
use slidecast::speech::SpeechSynthesizer;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Returns the same text for any document path
struct FixedExtractor(String);

impl TextExtractor for FixedExtractor {
    fn extract(&self, _path: &Path) -> PipelineResult<String> {
        Ok(self.0.clone())
    }
}

/// Passes the document text through as the narration script
struct IdentitySummarizer;

impl Summarizer for IdentitySummarizer {
    fn summarize(&self, text: &str) -> PipelineResult<Summary> {
        Ok(Summary {
            lead: text.split_whitespace().take(5).collect::<Vec<_>>().join(" "),
            script: text.trim().to_string(),
        })
    }
}

/// Writes a real (silent) WAV of a fixed length instead of invoking TTS
struct SilenceSynthesizer {
    seconds: f32,
}

impl SpeechSynthesizer for SilenceSynthesizer {
    fn synthesize(&self, _text: &str, output: &Path) -> PipelineResult<()> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(output, spec)
            .map_err(|e| PipelineError::asset("narration audio", e.to_string()))?;
        for _ in 0..(self.seconds * 8000.0) as u32 {
            writer
                .write_sample(0i16)
                .map_err(|e| PipelineError::asset("narration audio", e.to_string()))?;
        }
        writer
            .finalize()
            .map_err(|e| PipelineError::asset("narration audio", e.to_string()))?;
        Ok(())
    }
}

/// Writes a flat-colored PNG per slide instead of rendering or synthesizing
struct FlatSlides {
    work_dir: PathBuf,
    width: u32,
    height: u32,
}

impl SlideRenderer for FlatSlides {
    fn render(&mut self, slide: &SlideSpec) -> PipelineResult<VisualAsset> {
        let path = self.work_dir.join(slide.id.file_name());
        let img =
            image::RgbaImage::from_pixel(self.width, self.height, image::Rgba([90, 90, 200, 255]));
        img.save(&path)
            .map_err(|e| PipelineError::asset(slide.id.describe(), e.to_string()))?;
        Ok(VisualAsset {
            path,
            width: self.width,
            height: self.height,
        })
    }
}

fn test_config(root: &Path) -> AppConfig {
    let mut config = AppConfig::default();
    config.renderer.work_dir = root.join("work");
    config.renderer.output = root.join("out.mp4");
    config.pipeline.lead_slide = false;
    config
}

fn fake_caps(text: &str, work_dir: PathBuf) -> Capabilities {
    Capabilities {
        extractor: Box::new(FixedExtractor(text.to_string())),
        summarizer: Box::new(IdentitySummarizer),
        speech: Box::new(SilenceSynthesizer { seconds: 2.0 }),
        slides: Box::new(FlatSlides {
            work_dir,
            width: 320,
            height: 240,
        }),
    }
}

#[test]
fn test_three_segment_script_yields_three_fixed_duration_clips() {
    let root = TempDir::new().unwrap();
    let config = test_config(root.path());
    let work_dir = config.renderer.work_dir.clone();

    // 45 nine-char words: 449 characters, splits 199/199/49
    let script = "narration ".repeat(45).trim().to_string();
    let mut pipeline = Pipeline::new(config, fake_caps(&script, work_dir.clone())).unwrap();

    let plan = pipeline.plan(Path::new("input.txt")).unwrap();

    assert_eq!(plan.segments.len(), 3);
    assert!(plan.segments.iter().all(|s| s.text.len() <= 200));
    assert_eq!(plan.clips.len(), 3);
    assert!(plan.clips.iter().all(|c| c.duration == 5.0));
    assert_eq!(plan.clips[0].fade_in, 0.0);
    assert_eq!(plan.clips[1].fade_in, 1.0);
    assert_eq!(plan.clips[2].fade_in, 1.0);

    for name in ["slide_001.png", "slide_002.png", "slide_003.png"] {
        assert!(work_dir.join(name).exists(), "missing {name}");
    }
    assert!((plan.audio.duration - 2.0).abs() < 0.01);

    // The visual track governs the final duration: 3 clips x 5s
    let mut engine = RenderEngine::new(&plan.clips, 2).unwrap();
    assert_eq!(engine.timeline().duration_seconds(), 15.0);
    let frames = engine.render(&work_dir).unwrap();
    assert_eq!(frames, 30);
    assert!(work_dir.join("frame_29.ppm").exists());
}

#[test]
fn test_lead_slide_precedes_segment_clips() {
    let root = TempDir::new().unwrap();
    let mut config = test_config(root.path());
    config.pipeline.lead_slide = true;
    let work_dir = config.renderer.work_dir.clone();

    let mut pipeline =
        Pipeline::new(config, fake_caps("Alpha beta gamma.", work_dir.clone())).unwrap();
    let plan = pipeline.plan(Path::new("input.txt")).unwrap();

    assert_eq!(plan.segments.len(), 1);
    assert_eq!(plan.clips.len(), 2);
    assert!(plan.clips[0].asset.path.ends_with("slide_000.png"));
    assert!(plan.clips[1].asset.path.ends_with("slide_001.png"));
    assert_eq!(plan.clips[0].fade_in, 0.0);
}

#[test]
fn test_empty_script_fails_before_any_file_is_written() {
    let root = TempDir::new().unwrap();
    let config = test_config(root.path());
    let work_dir = config.renderer.work_dir.clone();

    let mut pipeline = Pipeline::new(config, fake_caps("", work_dir.clone())).unwrap();
    let err = pipeline.plan(Path::new("input.txt")).unwrap_err();

    assert!(err.to_string().contains("input error"), "{err}");
    assert!(!work_dir.exists(), "no file may be written on empty input");
}

#[test]
fn test_whitespace_only_document_is_an_input_error() {
    let root = TempDir::new().unwrap();
    let config = test_config(root.path());
    let work_dir = config.renderer.work_dir.clone();

    let mut pipeline = Pipeline::new(config, fake_caps("  \n\t ", work_dir)).unwrap();
    let err = pipeline.plan(Path::new("input.txt")).unwrap_err();
    assert!(err.to_string().contains("no extractable text"), "{err}");
}

#[test]
fn test_overlap_longer_than_clips_is_rejected_before_any_work() {
    let root = TempDir::new().unwrap();
    let mut config = test_config(root.path());
    config.pipeline.clip_duration_seconds = 5.0;
    config.pipeline.transition_overlap_seconds = 6.0;
    let work_dir = config.renderer.work_dir.clone();

    let result = Pipeline::new(config, fake_caps("Some narration text.", work_dir.clone()));
    let err = match result {
        Ok(_) => panic!("expected configuration error"),
        Err(e) => e,
    };
    assert!(err.to_string().contains("configuration error"), "{err}");
    assert!(!work_dir.exists());
}

#[test]
fn test_script_plan_counts_the_lead_slide() {
    let root = TempDir::new().unwrap();
    let mut config = test_config(root.path());
    config.pipeline.lead_slide = true;

    let plan = script_plan(
        &config,
        &FixedExtractor("Alpha beta gamma.".to_string()),
        &IdentitySummarizer,
        Path::new("input.txt"),
    )
    .unwrap();

    assert_eq!(plan.segments.len(), 1);
    assert_eq!(plan.clip_count, 2);
    assert_eq!(plan.video_duration_seconds, 10.0);
    assert_eq!(plan.lead, "Alpha beta gamma.");
}

#[test]
fn test_failing_slide_renderer_aborts_the_run() {
    struct FailingSlides;
    impl SlideRenderer for FailingSlides {
        fn render(&mut self, slide: &SlideSpec) -> PipelineResult<VisualAsset> {
            Err(PipelineError::asset(slide.id.describe(), "renderer offline"))
        }
    }

    let root = TempDir::new().unwrap();
    let config = test_config(root.path());
    let work_dir = config.renderer.work_dir.clone();

    let caps = Capabilities {
        extractor: Box::new(FixedExtractor("Some narration text.".to_string())),
        summarizer: Box::new(IdentitySummarizer),
        speech: Box::new(SilenceSynthesizer { seconds: 1.0 }),
        slides: Box::new(FailingSlides),
    };
    let mut pipeline = Pipeline::new(config, caps).unwrap();

    let err = pipeline.plan(Path::new("input.txt")).unwrap_err();
    assert!(err.to_string().contains("segment 0"), "{err}");
    assert!(!work_dir.join("slide_001.png").exists());
}
