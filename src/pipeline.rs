use crate::config::AppConfig;
use crate::document::{Summarizer, Summary, TextExtractor};
use crate::error::{PipelineError, PipelineResult};
use crate::renderer::{RenderEngine, VideoEncoder};
use crate::segment::{self, Segment};
use crate::slides::{SlideId, SlideRenderer, SlideSpec, VisualAsset};
use crate::speech::{AudioTrack, SpeechSynthesizer};
use crate::timing::{self, Clip};
use crate::transitions;
use std::path::Path;

/// The external capabilities one run depends on. Tests substitute
/// deterministic fakes; the CLI wires up the real ones.
pub struct Capabilities {
    pub extractor: Box<dyn TextExtractor>,
    pub summarizer: Box<dyn Summarizer>,
    pub speech: Box<dyn SpeechSynthesizer>,
    pub slides: Box<dyn SlideRenderer>,
}

/// Everything decided before a single frame is rendered
#[derive(Debug)]
pub struct RenderPlan {
    pub summary: Summary,
    pub segments: Vec<Segment>,
    pub clips: Vec<Clip>,
    pub audio: AudioTrack,
}

/// Dry-run output of the `script` subcommand
#[derive(Debug, serde::Serialize)]
pub struct ScriptPlan {
    pub lead: String,
    pub script: String,
    pub segments: Vec<Segment>,
    pub clip_count: usize,
    pub clip_duration_seconds: f32,
    pub video_duration_seconds: f32,
}

/// Extract, summarize and segment. Fails with an input error before any
/// file is written when the document or the narration script is empty.
fn narration(
    config: &AppConfig,
    extractor: &dyn TextExtractor,
    summarizer: &dyn Summarizer,
    document: &Path,
) -> PipelineResult<(Summary, Vec<Segment>)> {
    println!("📖 Extracting text from {}", document.display());
    let text = extractor.extract(document)?;
    if text.trim().is_empty() {
        return Err(PipelineError::input(format!(
            "document {} yields no extractable text",
            document.display()
        )));
    }

    let summary = summarizer.summarize(&text)?;
    if summary.script.trim().is_empty() {
        return Err(PipelineError::input(
            "narration script is empty after summarization",
        ));
    }

    let segments = segment::segment(&summary.script, config.pipeline.max_segment_chars);
    println!(
        "✂️  Narration script: {} chars, {} segments",
        summary.script.chars().count(),
        segments.len()
    );

    Ok((summary, segments))
}

/// Dry run: no audio, no slides, no frames. Needs only the text-producing
/// capabilities.
pub fn script_plan(
    config: &AppConfig,
    extractor: &dyn TextExtractor,
    summarizer: &dyn Summarizer,
    document: &Path,
) -> PipelineResult<ScriptPlan> {
    config.validate()?;
    let (summary, segments) = narration(config, extractor, summarizer, document)?;

    let lead_slides = if config.pipeline.lead_slide { 1 } else { 0 };
    let clip_count = segments.len() + lead_slides;
    let clip_duration = config.pipeline.clip_duration_seconds;

    Ok(ScriptPlan {
        lead: summary.lead,
        script: summary.script,
        segments,
        clip_count,
        clip_duration_seconds: clip_duration,
        video_duration_seconds: clip_count as f32 * clip_duration,
    })
}

/// The whole run, strictly sequential: every stage blocks to completion
/// before the next begins.
pub struct Pipeline {
    config: AppConfig,
    caps: Capabilities,
}

impl Pipeline {
    /// Validates configuration up front, before any external capability runs
    pub fn new(config: AppConfig, caps: Capabilities) -> PipelineResult<Self> {
        config.validate()?;
        Ok(Self { config, caps })
    }

    /// Run every stage up to (not including) frame rendering and encoding
    pub fn plan(&mut self, document: &Path) -> PipelineResult<RenderPlan> {
        let (summary, segments) = narration(
            &self.config,
            self.caps.extractor.as_ref(),
            self.caps.summarizer.as_ref(),
            document,
        )?;

        let work_dir = self.config.renderer.work_dir.clone();
        std::fs::create_dir_all(&work_dir)?;

        println!("🎤 Synthesizing narration...");
        let narration_path = work_dir.join(&self.config.speech.narration_file);
        self.caps
            .speech
            .synthesize(&summary.script, &narration_path)?;
        let audio = AudioTrack::probe(&narration_path)?;
        println!("  ✓ Narration audio: {:.2}s", audio.duration);

        println!("🖼️  Resolving slides...");
        let mut assets: Vec<VisualAsset> = Vec::new();
        if self.config.pipeline.lead_slide {
            assets.push(self.caps.slides.render(&SlideSpec {
                id: SlideId::Lead,
                text: &summary.lead,
            })?);
        }
        for seg in &segments {
            assets.push(self.caps.slides.render(&SlideSpec {
                id: SlideId::Body(seg.index),
                text: &seg.text,
            })?);
        }
        println!("  ✓ {} slides", assets.len());

        let durations = timing::allocate(
            assets.len(),
            self.config.pipeline.clip_duration_seconds,
        )?;
        let clips: Vec<Clip> = assets
            .into_iter()
            .zip(durations)
            .map(|(asset, duration)| Clip::new(asset, duration))
            .collect();
        let clips = transitions::apply_transitions(
            clips,
            self.config.pipeline.transition_overlap_seconds,
        )?;

        Ok(RenderPlan {
            summary,
            segments,
            clips,
            audio,
        })
    }

    /// Full run: plan, render all frames, encode the final video
    pub fn run(&mut self, document: &Path, output: &Path) -> PipelineResult<()> {
        let plan = self.plan(document)?;
        let fps = self.config.pipeline.fps;
        let work_dir = self.config.renderer.work_dir.clone();

        println!("🎬 Rendering frames...");
        let mut engine = RenderEngine::new(&plan.clips, fps)?;
        engine.render(&work_dir)?;

        let (width, height) = engine.canvas_size();
        let pattern = work_dir.join("frame_%d.ppm");
        VideoEncoder::encode(
            &pattern.to_string_lossy(),
            output,
            fps,
            width,
            height,
            Some(&plan.audio.path),
            engine.timeline().duration_seconds(),
        )?;

        println!("✨ Video created successfully: {}", output.display());
        Ok(())
    }
}
