use crate::error::{PipelineError, PipelineResult};
use crate::slides::{SlideRenderer, SlideSpec, VisualAsset};
use sha2::{Digest, Sha256};
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

/// Capability that synthesizes an image from a text prompt.
///
/// The external model is a documented non-determinism boundary: two calls
/// with the same prompt may return different pixels. Everything around it
/// (paths, caching) stays deterministic.
pub trait ImageSynthesizer {
    fn synthesize(&self, prompt: &str, width: u32, height: u32) -> PipelineResult<Vec<u8>>;
}

/// Talks to an image-synthesis HTTP endpoint; expects PNG bytes back
pub struct HttpImageSynthesizer {
    endpoint: String,
    agent: ureq::Agent,
}

impl HttpImageSynthesizer {
    pub fn new(endpoint: impl Into<String>, timeout_seconds: u64) -> Self {
        Self {
            endpoint: endpoint.into(),
            agent: ureq::AgentBuilder::new()
                .timeout(Duration::from_secs(timeout_seconds))
                .build(),
        }
    }
}

impl ImageSynthesizer for HttpImageSynthesizer {
    fn synthesize(&self, prompt: &str, width: u32, height: u32) -> PipelineResult<Vec<u8>> {
        let response = self
            .agent
            .post(&self.endpoint)
            .send_json(serde_json::json!({
                "prompt": prompt,
                "width": width,
                "height": height,
            }))
            .map_err(|e| {
                PipelineError::asset("image synthesis", format!("{}: {e}", self.endpoint))
            })?;

        let mut bytes = Vec::new();
        response
            .into_reader()
            .read_to_end(&mut bytes)
            .map_err(|e| PipelineError::asset("image synthesis", e.to_string()))?;

        Ok(bytes)
    }
}

/// Renders slides by prompting an external image model with the segment text.
///
/// Synthesis is the most expensive step of a run, so each slide keeps a
/// content-hash sidecar; a re-run with an unchanged prompt reuses the file
/// on disk instead of calling out again.
pub struct GeneratedRenderer {
    work_dir: PathBuf,
    synthesizer: Box<dyn ImageSynthesizer>,
    width: u32,
    height: u32,
}

impl GeneratedRenderer {
    pub fn new(
        work_dir: impl Into<PathBuf>,
        synthesizer: Box<dyn ImageSynthesizer>,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            work_dir: work_dir.into(),
            synthesizer,
            width,
            height,
        }
    }

    fn fingerprint(&self, prompt: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(prompt.as_bytes());
        hasher.update(self.width.to_le_bytes());
        hasher.update(self.height.to_le_bytes());
        format!("{:x}", hasher.finalize())
    }
}

impl SlideRenderer for GeneratedRenderer {
    fn render(&mut self, slide: &SlideSpec) -> PipelineResult<VisualAsset> {
        let path = self.work_dir.join(slide.id.file_name());
        let sidecar = self.work_dir.join(format!("{}.sha256", slide.id.file_name()));
        let fingerprint = self.fingerprint(slide.text);

        // Cache check before touching the external model
        if path.exists() && sidecar.exists() {
            let last = std::fs::read_to_string(&sidecar).unwrap_or_default();
            if last.trim() == fingerprint {
                if let Ok(img) = image::open(&path) {
                    println!("  ✨ Cache hit for {}", slide.id.file_name());
                    return Ok(VisualAsset {
                        path,
                        width: img.width(),
                        height: img.height(),
                    });
                }
            }
        }

        let bytes = self
            .synthesizer
            .synthesize(slide.text, self.width, self.height)
            .map_err(|e| PipelineError::asset(slide.id.describe(), e.to_string()))?;

        let img = image::load_from_memory(&bytes).map_err(|e| {
            PipelineError::asset(
                slide.id.describe(),
                format!("synthesizer returned undecodable image data: {e}"),
            )
        })?;

        std::fs::write(&path, &bytes).map_err(|e| {
            PipelineError::asset(slide.id.describe(), format!("failed to write image: {e}"))
        })?;
        std::fs::write(&sidecar, &fingerprint)?;

        Ok(VisualAsset {
            path,
            width: img.width(),
            height: img.height(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slides::SlideId;
    use std::cell::Cell;
    use std::rc::Rc;
    use tempfile::TempDir;

    struct CountingSynthesizer {
        calls: Rc<Cell<usize>>,
    }

    impl ImageSynthesizer for CountingSynthesizer {
        fn synthesize(&self, _prompt: &str, width: u32, height: u32) -> PipelineResult<Vec<u8>> {
            self.calls.set(self.calls.get() + 1);
            let img = image::RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]));
            let mut bytes = Vec::new();
            img.write_to(
                &mut std::io::Cursor::new(&mut bytes),
                image::ImageFormat::Png,
            )
            .unwrap();
            Ok(bytes)
        }
    }

    struct FailingSynthesizer;

    impl ImageSynthesizer for FailingSynthesizer {
        fn synthesize(&self, _prompt: &str, _w: u32, _h: u32) -> PipelineResult<Vec<u8>> {
            Err(PipelineError::asset("image synthesis", "model offline"))
        }
    }

    #[test]
    fn test_writes_one_file_per_slide_with_deterministic_path() {
        let dir = TempDir::new().unwrap();
        let calls = Rc::new(Cell::new(0));
        let mut renderer = GeneratedRenderer::new(
            dir.path(),
            Box::new(CountingSynthesizer {
                calls: calls.clone(),
            }),
            64,
            48,
        );

        let asset = renderer
            .render(&SlideSpec {
                id: SlideId::Body(2),
                text: "a quiet harbor at dawn",
            })
            .unwrap();

        assert_eq!(asset.path, dir.path().join("slide_003.png"));
        assert_eq!((asset.width, asset.height), (64, 48));
        assert!(asset.path.exists());
    }

    #[test]
    fn test_unchanged_prompt_reuses_cached_slide() {
        let dir = TempDir::new().unwrap();
        let calls = Rc::new(Cell::new(0));
        let mut renderer = GeneratedRenderer::new(
            dir.path(),
            Box::new(CountingSynthesizer {
                calls: calls.clone(),
            }),
            32,
            32,
        );
        let spec = SlideSpec {
            id: SlideId::Lead,
            text: "same prompt",
        };

        renderer.render(&spec).unwrap();
        renderer.render(&spec).unwrap();
        assert_eq!(calls.get(), 1);

        renderer
            .render(&SlideSpec {
                id: SlideId::Lead,
                text: "different prompt",
            })
            .unwrap();
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_synthesis_failure_is_fatal_and_names_the_slide() {
        let dir = TempDir::new().unwrap();
        let mut renderer =
            GeneratedRenderer::new(dir.path(), Box::new(FailingSynthesizer), 32, 32);

        let result = renderer.render(&SlideSpec {
            id: SlideId::Body(4),
            text: "doomed",
        });
        let message = result.unwrap_err().to_string();
        assert!(message.contains("segment 4"), "{message}");
        assert!(!dir.path().join("slide_005.png").exists());
    }
}
