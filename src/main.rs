use anyhow::Result;
use clap::{Parser, Subcommand};
use slidecast::config::{AppConfig, SlideStrategy};
use slidecast::document::{extractor_for, ExtractiveSummarizer};
use slidecast::pipeline::{Capabilities, Pipeline};
use slidecast::slides::template::{find_system_font, parse_color, Canvas};
use slidecast::slides::{GeneratedRenderer, HttpImageSynthesizer, SlideRenderer, TemplateRenderer};
use slidecast::speech::PiperSynthesizer;
use slidecast::PipelineError;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "slidecast")]
#[command(about = "Narrated slideshow videos from documents", long_about = None)]
struct Cli {
    /// Path to the source document (PDF or plain text)
    #[arg(value_name = "DOCUMENT")]
    document: Option<String>,

    /// Where to write the final video
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    /// Slide strategy
    #[arg(long, value_enum, global = true)]
    strategy: Option<SlideStrategy>,

    /// Working directory for intermediate files
    #[arg(long, global = true)]
    work_dir: Option<PathBuf>,

    /// Output frame rate
    #[arg(long, global = true)]
    fps: Option<u32>,

    /// Display duration per slide, in seconds
    #[arg(long, global = true)]
    clip_duration: Option<f32>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Dry run: print the narration script and segment plan as JSON
    Script {
        /// Path to the source document
        #[arg(value_name = "DOCUMENT")]
        document: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load()?;
    if let Some(output) = cli.output {
        config.renderer.output = output;
    }
    if let Some(strategy) = cli.strategy {
        config.pipeline.strategy = strategy;
    }
    if let Some(work_dir) = cli.work_dir {
        config.renderer.work_dir = work_dir;
    }
    if let Some(fps) = cli.fps {
        config.pipeline.fps = fps;
    }
    if let Some(clip_duration) = cli.clip_duration {
        config.pipeline.clip_duration_seconds = clip_duration;
    }

    // Handle subcommands
    if let Some(Commands::Script { document }) = cli.command {
        let document = Path::new(&document);
        let extractor = extractor_for(document);
        let summarizer =
            ExtractiveSummarizer::new(config.summary.lead_words, config.summary.script_chars);
        let plan =
            slidecast::pipeline::script_plan(&config, extractor.as_ref(), &summarizer, document)?;
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    println!("🎞️  slidecast\n");

    let Some(document) = cli.document else {
        println!("ℹ️  No document given.");
        println!("   Render a video:   slidecast <DOCUMENT> [--output FILE]");
        println!("   Inspect the plan: slidecast script <DOCUMENT>");
        return Ok(());
    };
    let document = Path::new(&document);

    let output = config.renderer.output.clone();
    let caps = build_capabilities(&config, document)?;
    let mut pipeline = Pipeline::new(config, caps)?;
    pipeline.run(document, &output)?;

    Ok(())
}

/// Wire up the real external capabilities for a run
fn build_capabilities(config: &AppConfig, document: &Path) -> Result<Capabilities> {
    let slides: Box<dyn SlideRenderer> = match config.pipeline.strategy {
        SlideStrategy::Template => {
            let font = if config.template.font.is_empty() {
                find_system_font().ok_or_else(|| {
                    PipelineError::configuration(
                        "no usable system font found; set template.font in slidecast.toml",
                    )
                })?
            } else {
                PathBuf::from(&config.template.font)
            };

            let (canvas, font_size) = if config.template.background.is_empty() {
                let (width, height) = config.canvas_dimensions()?;
                let color = parse_color(&config.template.canvas_color)?;
                (
                    Canvas::Solid {
                        width,
                        height,
                        color,
                    },
                    config.template.canvas_font_size,
                )
            } else {
                (
                    Canvas::Background(PathBuf::from(&config.template.background)),
                    config.template.background_font_size,
                )
            };

            Box::new(TemplateRenderer::new(
                &config.renderer.work_dir,
                canvas,
                &font,
                font_size,
                config.template.wrap_columns,
            )?)
        }
        SlideStrategy::Generated => {
            let synthesizer = HttpImageSynthesizer::new(
                config.generated.endpoint.clone(),
                config.generated.timeout_seconds,
            );
            Box::new(GeneratedRenderer::new(
                &config.renderer.work_dir,
                Box::new(synthesizer),
                config.generated.width,
                config.generated.height,
            ))
        }
    };

    Ok(Capabilities {
        extractor: extractor_for(document),
        summarizer: Box::new(ExtractiveSummarizer::new(
            config.summary.lead_words,
            config.summary.script_chars,
        )),
        speech: Box::new(PiperSynthesizer::new(&config.speech.piper_model)),
        slides,
    })
}
