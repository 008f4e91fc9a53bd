//! Post Renderer
//!
//! Turns a JSON description of a social-media post (background image, logo,
//! three text fragments, direction, language and accent colour) into a
//! 1080×1080 JPEG, stores it in a public directory and serves it over HTTP.
//!
//! # Pipeline
//!
//! - [`request`]: validate the body and apply defaults
//! - [`rendering`]: compose the HTML document through a typed, escaping builder
//! - [`Renderer`]: capture the document as JPEG (headless Chrome via the `cdp` feature)
//! - [`async_api::RenderPool`]: bounded, deadline-aware async front for a renderer
//! - [`store`]: write, name and delete generated images
//! - [`server`]: the axum HTTP surface
//!
//! # Example
//!
//! ```no_run
//! use postrender::{rendering, request::PostSpec, RenderConfig, Renderer};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let post = PostSpec::from_body(br#"{
//!     "imageUrl": "https://example.com/a.jpg",
//!     "logoUrl": "https://example.com/logo.png",
//!     "text01": "BREAKING", "focusText": "NEWS", "text02": "TODAY"
//! }"#)?;
//! let document = rendering::compose(&post);
//!
//! let renderer = postrender::new_renderer(RenderConfig::default())?;
//! let shot = renderer.capture(&document)?;
//! std::fs::write("post.jpg", shot.jpeg_data)?;
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;

pub mod error;
pub use error::{Error, Result};

pub mod config;
pub mod request;
pub mod rendering;
pub mod store;
pub mod server;

#[cfg(feature = "cdp")]
pub mod cdp;

// Async render queue over any `Renderer`
pub mod async_api;

pub use async_api::RenderPool;
pub use rendering::{ComposedDocument, Screenshot};

/// Configuration for rendering sessions
///
/// Defaults are conservative: Chrome runs sandboxed, every render has a 30s
/// deadline, and the number of concurrent sessions follows the CPU count.
///
/// # Examples
///
/// ```
/// let cfg = postrender::RenderConfig::default();
/// assert!(cfg.sandbox);
/// assert!(cfg.workers >= 1);
/// ```
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Deadline for a render round trip, queueing included, in milliseconds
    pub timeout_ms: u64,
    /// How long to wait for remote images before capturing anyway
    pub asset_timeout_ms: u64,
    /// Maximum number of rendering sessions alive at once
    pub workers: usize,
    /// Renders allowed to wait for a free session before rejecting
    pub queue_depth: usize,
    /// Browser executable; autodetected when `None`
    pub chrome_path: Option<PathBuf>,
    /// Whether to keep the Chrome sandbox enabled
    pub sandbox: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30000,
            asset_timeout_ms: 10000,
            workers: num_cpus::get().max(1),
            queue_depth: 16,
            chrome_path: None,
            sandbox: true,
        }
    }
}

/// Viewport dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// Capability that turns a composed document into JPEG bytes.
///
/// Implementations must release whatever session they open before
/// returning, on success and on failure.
pub trait Renderer: Send + Sync + 'static {
    /// Load `document`, wait for its assets and capture
    /// `{0, 0, viewport.width, viewport.height}` as JPEG.
    fn capture(&self, document: &ComposedDocument) -> Result<Screenshot>;
}

/// Create the default renderer (headless Chrome)
#[cfg(feature = "cdp")]
pub fn new_renderer(config: RenderConfig) -> Result<impl Renderer> {
    cdp::CdpRenderer::new(config)
}
