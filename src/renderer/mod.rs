pub mod compositor;
pub mod encoder;
pub mod engine;
pub mod frame_buffer;
pub mod timeline;

pub use compositor::Compositor;
pub use encoder::VideoEncoder;
pub use engine::RenderEngine;
pub use frame_buffer::FrameBuffer;
pub use timeline::{FrameSample, Timeline};
