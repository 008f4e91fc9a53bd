//! Template composition: validated post → HTML document ready for capture.

pub mod markup;
pub mod post;
pub mod style;

pub use post::compose;

use crate::Viewport;

/// Fixed capture size of every post
pub const POST_VIEWPORT: Viewport = Viewport {
    width: 1080,
    height: 1080,
};

/// A serialized document plus what the renderer needs to capture it.
#[derive(Debug, Clone)]
pub struct ComposedDocument {
    /// Complete HTML document, already escaped
    pub html: String,
    /// Capture region `{0, 0, width, height}`
    pub viewport: Viewport,
    /// Remote images the renderer should wait for before capturing
    pub assets: Vec<String>,
}

/// JPEG bytes captured from a composed document
#[derive(Debug, Clone)]
pub struct Screenshot {
    pub width: u32,
    pub height: u32,
    pub jpeg_data: Vec<u8>,
}
