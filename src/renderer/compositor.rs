use crate::renderer::FrameBuffer;
use image::RgbaImage;

/// Slide compositor: places every slide on one shared canvas
pub struct Compositor;

impl Compositor {
    /// "Compose" layout: the canvas is sized to fit the largest slide, so the
    /// two slide strategies may produce differently sized images without the
    /// assembler caring. Dimensions are rounded up to even values for the
    /// encoder's pixel format.
    pub fn canvas_size<I>(dimensions: I) -> (u32, u32)
    where
        I: IntoIterator<Item = (u32, u32)>,
    {
        let (mut width, mut height) = (0, 0);
        for (w, h) in dimensions {
            width = width.max(w);
            height = height.max(h);
        }
        (width.max(2).div_ceil(2) * 2, height.max(2).div_ceil(2) * 2)
    }

    /// Draw a slide centered on the buffer, honoring the slide's own alpha
    pub fn draw_centered(buffer: &mut FrameBuffer, slide: &RgbaImage) {
        let (buf_width, buf_height) = buffer.dimensions();
        let offset_x = (buf_width as i32 - slide.width() as i32) / 2;
        let offset_y = (buf_height as i32 - slide.height() as i32) / 2;

        for (x, y, pixel) in slide.enumerate_pixels() {
            let px = offset_x + x as i32;
            let py = offset_y + y as i32;
            if px < 0 || py < 0 {
                continue;
            }

            let [r, g, b, a] = pixel.0;
            if a == 255 {
                buffer.set_pixel(px as u32, py as u32, [r, g, b, 255]);
            } else if a > 0 {
                buffer.blend_pixel(px as u32, py as u32, [r, g, b, a]);
            }
        }
    }
}
