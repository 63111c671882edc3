use crate::error::{PipelineError, PipelineResult};
use crate::slides::template::parse_color;
use clap::ValueEnum;
use serde::Deserialize;
use std::path::PathBuf;

/// How slide images are produced
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SlideStrategy {
    /// Text overlaid on a template canvas
    Template,
    /// Images synthesized from the segment text
    Generated,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub pipeline: PipelineConfig,
    pub summary: SummaryConfig,
    pub template: TemplateConfig,
    pub generated: GeneratedConfig,
    pub speech: SpeechConfig,
    pub renderer: RendererConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PipelineConfig {
    pub max_segment_chars: usize,
    pub clip_duration_seconds: f32,
    pub transition_overlap_seconds: f32,
    pub fps: u32,
    pub strategy: SlideStrategy,
    pub lead_slide: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SummaryConfig {
    pub lead_words: usize,
    pub script_chars: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TemplateConfig {
    pub canvas: String,
    pub canvas_color: String,
    /// Background image path; empty means the solid canvas
    pub background: String,
    /// Font file path; empty means auto-discover a system font
    pub font: String,
    pub canvas_font_size: f32,
    pub background_font_size: f32,
    pub wrap_columns: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeneratedConfig {
    pub endpoint: String,
    pub width: u32,
    pub height: u32,
    pub timeout_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SpeechConfig {
    pub piper_model: String,
    pub narration_file: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RendererConfig {
    pub work_dir: PathBuf,
    pub output: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            pipeline: PipelineConfig {
                max_segment_chars: 200,
                clip_duration_seconds: 5.0,
                transition_overlap_seconds: 1.0,
                fps: 24,
                strategy: SlideStrategy::Template,
                lead_slide: true,
            },
            summary: SummaryConfig {
                lead_words: 50,
                script_chars: 1000,
            },
            template: TemplateConfig {
                canvas: "800x600".to_string(),
                canvas_color: "#add8e6".to_string(),
                background: String::new(),
                font: String::new(),
                canvas_font_size: 24.0,
                background_font_size: 50.0,
                wrap_columns: 30,
            },
            generated: GeneratedConfig {
                endpoint: "http://127.0.0.1:7860/synthesize".to_string(),
                width: 768,
                height: 512,
                timeout_seconds: 120,
            },
            speech: SpeechConfig {
                piper_model: "en_US-amy-medium.onnx".to_string(),
                narration_file: "narration.wav".to_string(),
            },
            renderer: RendererConfig {
                work_dir: PathBuf::from("work"),
                output: PathBuf::from("final_output.mp4"),
            },
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .set_default("pipeline.max_segment_chars", 200)?
            .set_default("pipeline.clip_duration_seconds", 5.0)?
            .set_default("pipeline.transition_overlap_seconds", 1.0)?
            .set_default("pipeline.fps", 24)?
            .set_default("pipeline.strategy", "template")?
            .set_default("pipeline.lead_slide", true)?
            .set_default("summary.lead_words", 50)?
            .set_default("summary.script_chars", 1000)?
            .set_default("template.canvas", "800x600")?
            .set_default("template.canvas_color", "#add8e6")?
            .set_default("template.background", "")?
            .set_default("template.font", "")?
            .set_default("template.canvas_font_size", 24.0)?
            .set_default("template.background_font_size", 50.0)?
            .set_default("template.wrap_columns", 30)?
            .set_default("generated.endpoint", "http://127.0.0.1:7860/synthesize")?
            .set_default("generated.width", 768)?
            .set_default("generated.height", 512)?
            .set_default("generated.timeout_seconds", 120)?
            .set_default("speech.piper_model", "en_US-amy-medium.onnx")?
            .set_default("speech.narration_file", "narration.wav")?
            .set_default("renderer.work_dir", "work")?
            .set_default("renderer.output", "final_output.mp4")?
            // Load from file if exists
            .add_source(config::File::with_name("slidecast").required(false))
            // Allow env var overrides (e.g. SLIDECAST_PIPELINE__FPS=30)
            .add_source(config::Environment::with_prefix("SLIDECAST").separator("__"));

        builder.build()?.try_deserialize()
    }

    /// Canvas dimensions for the solid template canvas
    pub fn canvas_dimensions(&self) -> PipelineResult<(u32, u32)> {
        let parts: Vec<&str> = self.template.canvas.split('x').collect();
        let parse = |s: &str| s.trim().parse::<u32>().ok().filter(|v| *v > 0);

        match parts.as_slice() {
            [w, h] => match (parse(w), parse(h)) {
                (Some(w), Some(h)) => Ok((w, h)),
                _ => Err(PipelineError::configuration(format!(
                    "invalid template canvas '{}'",
                    self.template.canvas
                ))),
            },
            _ => Err(PipelineError::configuration(format!(
                "invalid template canvas '{}', expected WIDTHxHEIGHT",
                self.template.canvas
            ))),
        }
    }

    /// Fail fast on invalid parameters, before any external capability runs
    pub fn validate(&self) -> PipelineResult<()> {
        let p = &self.pipeline;

        if p.max_segment_chars == 0 {
            return Err(PipelineError::configuration(
                "max_segment_chars must be at least 1",
            ));
        }
        if p.fps == 0 {
            return Err(PipelineError::configuration("fps must be greater than 0"));
        }
        if !p.clip_duration_seconds.is_finite() || p.clip_duration_seconds <= 0.0 {
            return Err(PipelineError::configuration(format!(
                "clip_duration_seconds must be positive, got {}",
                p.clip_duration_seconds
            )));
        }
        if !p.transition_overlap_seconds.is_finite() || p.transition_overlap_seconds <= 0.0 {
            return Err(PipelineError::configuration(format!(
                "transition_overlap_seconds must be positive, got {}",
                p.transition_overlap_seconds
            )));
        }
        if p.transition_overlap_seconds >= p.clip_duration_seconds {
            return Err(PipelineError::configuration(format!(
                "transition_overlap_seconds ({}) must be shorter than clip_duration_seconds ({})",
                p.transition_overlap_seconds, p.clip_duration_seconds
            )));
        }

        if self.summary.script_chars == 0 {
            return Err(PipelineError::configuration(
                "summary.script_chars must be at least 1",
            ));
        }

        self.canvas_dimensions()?;
        parse_color(&self.template.canvas_color)?;
        if !(self.template.canvas_font_size > 0.0) || !(self.template.background_font_size > 0.0) {
            return Err(PipelineError::configuration(
                "template font sizes must be positive",
            ));
        }
        if self.template.wrap_columns == 0 {
            return Err(PipelineError::configuration(
                "template.wrap_columns must be at least 1",
            ));
        }

        if self.generated.width == 0 || self.generated.height == 0 {
            return Err(PipelineError::configuration(
                "generated slide dimensions must be positive",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.canvas_dimensions().unwrap(), (800, 600));
    }

    #[test]
    fn test_overlap_must_stay_below_clip_duration() {
        let mut config = AppConfig::default();
        config.pipeline.clip_duration_seconds = 5.0;
        config.pipeline.transition_overlap_seconds = 6.0;

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("configuration error"));
        assert!(err.to_string().contains("transition_overlap_seconds"));
    }

    #[test]
    fn test_nonpositive_parameters_are_rejected() {
        let mut config = AppConfig::default();
        config.pipeline.clip_duration_seconds = 0.0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.pipeline.fps = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.pipeline.max_segment_chars = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_canvas_spec() {
        let mut config = AppConfig::default();
        config.template.canvas = "widexhigh".to_string();
        assert!(config.validate().is_err());

        config.template.canvas = "800".to_string();
        assert!(config.validate().is_err());

        config.template.canvas = "0x600".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_canvas_color() {
        let mut config = AppConfig::default();
        config.template.canvas_color = "skyblue".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_strategy_deserializes_lowercase() {
        let strategy: SlideStrategy = serde_json::from_str("\"generated\"").unwrap();
        assert_eq!(strategy, SlideStrategy::Generated);
    }
}
