use crate::error::{PipelineError, PipelineResult};
use crate::slides::{SlideRenderer, SlideSpec, VisualAsset};
use fontdue::layout::{
    CoordinateSystem, HorizontalAlign, Layout, LayoutSettings, TextStyle, VerticalAlign, WrapStyle,
};
use fontdue::{Font, FontSettings};
use image::RgbaImage;
use std::path::{Path, PathBuf};

/// Where template slides draw their text
#[derive(Debug, Clone)]
pub enum Canvas {
    /// Fixed-size solid-color canvas
    Solid {
        width: u32,
        height: u32,
        color: [u8; 3],
    },
    /// A supplied background image, used at its native size
    Background(PathBuf),
}

/// Renders a slide by overlaying word-wrapped, centered text onto a canvas.
///
/// Wrapping is a fixed character-per-line width, not pixel-exact fitting.
/// Rendering is deterministic: identical input produces identical pixels.
#[derive(Debug)]
pub struct TemplateRenderer {
    work_dir: PathBuf,
    background: Option<RgbaImage>,
    solid: Option<(u32, u32, [u8; 3])>,
    font: Font,
    font_size: f32,
    wrap_columns: usize,
}

impl TemplateRenderer {
    pub fn new(
        work_dir: impl Into<PathBuf>,
        canvas: Canvas,
        font_path: &Path,
        font_size: f32,
        wrap_columns: usize,
    ) -> PipelineResult<Self> {
        let font_bytes = std::fs::read(font_path).map_err(|e| {
            PipelineError::asset(
                "template font",
                format!("failed to read {}: {e}", font_path.display()),
            )
        })?;
        let font = Font::from_bytes(font_bytes, FontSettings::default()).map_err(|e| {
            PipelineError::asset(
                "template font",
                format!("failed to parse {}: {e}", font_path.display()),
            )
        })?;

        let (background, solid) = match canvas {
            Canvas::Solid {
                width,
                height,
                color,
            } => (None, Some((width, height, color))),
            Canvas::Background(path) => {
                let img = image::open(&path)
                    .map_err(|e| {
                        PipelineError::asset(
                            "template background",
                            format!("failed to load {}: {e}", path.display()),
                        )
                    })?
                    .to_rgba8();
                (Some(img), None)
            }
        };

        Ok(Self {
            work_dir: work_dir.into(),
            background,
            solid,
            font,
            font_size,
            wrap_columns,
        })
    }

    fn canvas(&self) -> RgbaImage {
        match (&self.background, &self.solid) {
            (Some(img), _) => img.clone(),
            (None, Some((w, h, color))) => {
                RgbaImage::from_pixel(*w, *h, image::Rgba([color[0], color[1], color[2], 255]))
            }
            (None, None) => unreachable!("renderer always has a canvas source"),
        }
    }

    fn draw_text(&self, canvas: &mut RgbaImage, text: &str, color: [u8; 3]) {
        let (width, height) = canvas.dimensions();

        let mut layout = Layout::new(CoordinateSystem::PositiveYDown);
        layout.reset(&LayoutSettings {
            x: 0.0,
            y: 0.0,
            max_width: Some(width as f32),
            max_height: Some(height as f32),
            horizontal_align: HorizontalAlign::Center,
            vertical_align: VerticalAlign::Middle,
            line_height: 1.0,
            wrap_style: WrapStyle::Word,
            wrap_hard_breaks: true,
        });
        layout.append(&[&self.font], &TextStyle::new(text, self.font_size, 0));

        for glyph in layout.glyphs() {
            if glyph.width == 0 || glyph.height == 0 {
                continue;
            }
            let (_, bitmap) = self.font.rasterize_config(glyph.key);
            blend_glyph(
                canvas,
                glyph.x.round() as i32,
                glyph.y.round() as i32,
                glyph.width,
                glyph.height,
                &bitmap,
                color,
            );
        }
    }
}

impl SlideRenderer for TemplateRenderer {
    fn render(&mut self, slide: &SlideSpec) -> PipelineResult<VisualAsset> {
        let mut canvas = self.canvas();
        let color = text_color_for(&canvas);

        let wrapped = wrap_text(slide.text, self.wrap_columns).join("\n");
        self.draw_text(&mut canvas, &wrapped, color);

        let path = self.work_dir.join(slide.id.file_name());
        canvas.save(&path).map_err(|e| {
            PipelineError::asset(slide.id.describe(), format!("failed to write image: {e}"))
        })?;

        Ok(VisualAsset {
            path,
            width: canvas.width(),
            height: canvas.height(),
        })
    }
}

/// Wrap text at a fixed column count, splitting on whitespace only
pub fn wrap_text(text: &str, columns: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > columns {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Light background gets dark text, dark background gets light text
fn text_color_for(canvas: &RgbaImage) -> [u8; 3] {
    let mut sum: u64 = 0;
    for px in canvas.pixels() {
        let [r, g, b, _] = px.0;
        sum += (0.2126 * r as f32 + 0.7152 * g as f32 + 0.0722 * b as f32) as u64;
    }
    let mean = sum / (canvas.width() as u64 * canvas.height() as u64).max(1);

    if mean >= 128 {
        [20, 20, 20]
    } else {
        [235, 235, 235]
    }
}

/// Parse a `#rrggbb` color string
pub fn parse_color(s: &str) -> PipelineResult<[u8; 3]> {
    let hex = s.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(PipelineError::configuration(format!(
            "invalid canvas color '{s}', expected #rrggbb"
        )));
    }
    let r = u8::from_str_radix(&hex[0..2], 16).unwrap_or(0);
    let g = u8::from_str_radix(&hex[2..4], 16).unwrap_or(0);
    let b = u8::from_str_radix(&hex[4..6], 16).unwrap_or(0);
    Ok([r, g, b])
}

fn blend_glyph(
    canvas: &mut RgbaImage,
    gx: i32,
    gy: i32,
    width: usize,
    height: usize,
    bitmap: &[u8],
    color: [u8; 3],
) {
    let (canvas_w, canvas_h) = canvas.dimensions();

    for row in 0..height {
        for col in 0..width {
            let coverage = bitmap[row * width + col];
            if coverage == 0 {
                continue;
            }
            let x = gx + col as i32;
            let y = gy + row as i32;
            if x < 0 || y < 0 || x as u32 >= canvas_w || y as u32 >= canvas_h {
                continue;
            }

            let alpha = coverage as f32 / 255.0;
            let px = canvas.get_pixel_mut(x as u32, y as u32);
            for c in 0..3 {
                px.0[c] = (color[c] as f32 * alpha + px.0[c] as f32 * (1.0 - alpha)) as u8;
            }
            px.0[3] = 255;
        }
    }
}

/// Look for a usable system font when none is configured
pub fn find_system_font() -> Option<PathBuf> {
    [
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        "/System/Library/Fonts/Supplemental/Arial.ttf",
        "C:\\Windows\\Fonts\\arial.ttf",
    ]
    .iter()
    .map(PathBuf::from)
    .find(|p| p.exists())
}
