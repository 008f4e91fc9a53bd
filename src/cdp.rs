//! Chrome DevTools Protocol renderer (uses the `headless_chrome` crate)

use crate::{ComposedDocument, Error, RenderConfig, Renderer, Result, Screenshot, Viewport};
use base64::Engine as Base64Engine;
use headless_chrome::browser::tab::Tab;
use headless_chrome::protocol::cdp::Page;
use headless_chrome::{Browser, LaunchOptions};
use log::{debug, warn};
use std::time::Duration;

/// JPEG quality requested from Chrome
const JPEG_QUALITY: u32 = 100;

/// Renderer that launches an isolated headless Chrome per capture.
///
/// Each capture gets its own browser process, sized to the document's
/// viewport. The process is torn down when the capture returns, whatever the
/// outcome, so sessions never leak across requests.
pub struct CdpRenderer {
    config: RenderConfig,
}

impl CdpRenderer {
    pub fn new(config: RenderConfig) -> Result<Self> {
        if let Some(path) = &config.chrome_path {
            if !path.exists() {
                return Err(Error::InitializationError(format!(
                    "Chrome executable not found at {}",
                    path.display()
                )));
            }
        }
        Ok(Self { config })
    }

    fn launch(&self, viewport: Viewport) -> Result<Browser> {
        let launch_options = LaunchOptions::default_builder()
            .headless(true)
            .sandbox(self.config.sandbox)
            .window_size(Some((viewport.width, viewport.height)))
            .path(self.config.chrome_path.clone())
            .idle_browser_timeout(Duration::from_millis(self.config.timeout_ms))
            .build()
            .map_err(|e| Error::RenderFailure(format!("Failed to build launch options: {}", e)))?;

        Browser::new(launch_options).map_err(|e| Error::RenderFailure(format!("Failed to launch browser: {}", e)))
    }

    fn capture_in(&self, browser: &Browser, document: &ComposedDocument) -> Result<Screenshot> {
        let tab = browser
            .new_tab()
            .map_err(|e| Error::RenderFailure(format!("Failed to create tab: {}", e)))?;
        tab.set_default_timeout(Duration::from_millis(self.config.timeout_ms));

        let b64 = base64::engine::general_purpose::STANDARD.encode(document.html.as_bytes());
        let url = format!("data:text/html;charset=utf-8;base64,{}", b64);

        tab.navigate_to(&url)
            .map_err(|e| Error::RenderFailure(format!("Navigation failed: {}", e)))?;
        tab.wait_until_navigated()
            .map_err(|e| Error::RenderFailure(format!("Wait for navigation failed: {}", e)))?;

        self.wait_for_assets(&tab, &document.assets);

        let Viewport { width, height } = document.viewport;
        let clip = Page::Viewport {
            x: 0.0,
            y: 0.0,
            width: width as f64,
            height: height as f64,
            scale: 1.0,
        };
        let jpeg_data = tab
            .capture_screenshot(
                Page::CaptureScreenshotFormatOption::Jpeg,
                Some(JPEG_QUALITY),
                Some(clip),
                true,
            )
            .map_err(|e| Error::RenderFailure(format!("Screenshot failed: {}", e)))?;

        if let Err(e) = tab.close(false) {
            debug!("Tab close failed (browser is torn down anyway): {}", e);
        }

        Ok(Screenshot {
            width,
            height,
            jpeg_data,
        })
    }

    /// Block until every asset has loaded or failed, or the asset timeout
    /// passes, then let two frames paint. Failures only degrade the image.
    fn wait_for_assets(&self, tab: &Tab, assets: &[String]) {
        let urls = match serde_json::to_string(assets) {
            Ok(s) => s,
            Err(e) => {
                warn!("Failed to encode asset list: {}", e);
                return;
            }
        };

        let script = ASSET_WAIT_TEMPLATE
            .replace("{{ASSETS}}", &urls)
            .replace("{{TIMEOUT_MS}}", &self.config.asset_timeout_ms.to_string());

        match tab.evaluate(&script, true) {
            Ok(obj) => {
                let outcome = obj
                    .value
                    .and_then(|v| v.as_str().map(str::to_string))
                    .unwrap_or_default();
                if outcome == "null" {
                    warn!("Assets still loading after {}ms; capturing anyway", self.config.asset_timeout_ms);
                } else if outcome.contains("false") {
                    warn!("Some assets failed to load ({}); capturing anyway", outcome);
                } else {
                    debug!("Assets loaded: {}", outcome);
                }
            }
            Err(e) => warn!("Asset wait failed: {}", e),
        }
    }
}

// Resolves to a JSON string: per-asset load flags, or `null` on timeout.
const ASSET_WAIT_TEMPLATE: &str = r#"(async function(){
    const urls = {{ASSETS}};
    const load = function(src){
        return new Promise(function(resolve){
            const img = new Image();
            img.onload = function(){ resolve(true); };
            img.onerror = function(){ resolve(false); };
            img.src = src;
        });
    };
    const timer = new Promise(function(resolve){ setTimeout(function(){ resolve(null); }, {{TIMEOUT_MS}}); });
    const result = await Promise.race([Promise.all(urls.map(load)), timer]);
    if (document.fonts) { await document.fonts.ready; }
    await new Promise(function(r){ requestAnimationFrame(function(){ requestAnimationFrame(r); }); });
    return JSON.stringify(result);
})()"#;

impl Renderer for CdpRenderer {
    fn capture(&self, document: &ComposedDocument) -> Result<Screenshot> {
        let browser = self.launch(document.viewport)?;
        let result = self.capture_in(&browser, document);
        // Dropping the browser kills the Chrome process.
        drop(browser);
        result
    }
}
