//! Command line and environment configuration

use crate::{Error, RenderConfig, Result};
use clap::Parser;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use url::Url;

#[derive(Parser, Debug, Clone)]
#[command(name = "postrender", version, about = "Render social posts to JPEG and serve them over HTTP")]
pub struct Args {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,

    /// IP address to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Directory generated images are written to and served from
    #[arg(long, env = "PUBLIC_DIR", default_value = "public")]
    pub public_dir: PathBuf,

    /// Base URL for returned image links (defaults to the request's Host)
    #[arg(long, env = "PUBLIC_BASE_URL")]
    pub public_base_url: Option<String>,

    /// Concurrent rendering sessions (defaults to the CPU count)
    #[arg(long, env = "RENDER_WORKERS")]
    pub render_workers: Option<usize>,

    /// Renders allowed to wait for a free session
    #[arg(long, env = "RENDER_QUEUE", default_value_t = 16)]
    pub render_queue: usize,

    /// Per-request render deadline in milliseconds
    #[arg(long, env = "RENDER_TIMEOUT_MS", default_value_t = 30000)]
    pub render_timeout_ms: u64,

    /// Chrome/Chromium executable
    #[arg(long, env = "CHROME_PATH")]
    pub chrome_path: Option<PathBuf>,

    /// Disable the Chrome sandbox (needed in some containers)
    #[arg(long, env = "CHROME_NO_SANDBOX")]
    pub no_sandbox: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: log::LevelFilter,
}

/// Settings for the HTTP surface
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub public_dir: PathBuf,
    pub public_base_url: Option<Url>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 3000)),
            public_dir: PathBuf::from("public"),
            public_base_url: None,
        }
    }
}

impl Args {
    pub fn server_config(&self) -> Result<ServerConfig> {
        let ip = self
            .host
            .parse::<IpAddr>()
            .map_err(|e| Error::ConfigError(format!("Invalid bind address {:?}: {}", self.host, e)))?;
        let bind = SocketAddr::new(ip, self.port);

        let public_base_url = self.public_base_url.as_deref().map(parse_base_url).transpose()?;

        Ok(ServerConfig {
            bind,
            public_dir: self.public_dir.clone(),
            public_base_url,
        })
    }

    pub fn render_config(&self) -> Result<RenderConfig> {
        if self.render_workers == Some(0) {
            return Err(Error::ConfigError("render workers must be at least 1".into()));
        }
        if self.render_timeout_ms == 0 {
            return Err(Error::ConfigError("render timeout must be positive".into()));
        }

        let defaults = RenderConfig::default();
        Ok(RenderConfig {
            timeout_ms: self.render_timeout_ms,
            // Leave time to capture after giving up on slow assets.
            asset_timeout_ms: defaults.asset_timeout_ms.min(self.render_timeout_ms / 2),
            workers: self.render_workers.unwrap_or(defaults.workers),
            queue_depth: self.render_queue,
            chrome_path: self.chrome_path.clone(),
            sandbox: !self.no_sandbox,
        })
    }
}

/// Parse a base URL for public links; the path always ends with `/`.
pub fn parse_base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw).map_err(|e| Error::ConfigError(format!("Invalid public base URL {:?}: {}", raw, e)))?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(Error::ConfigError(format!("Public base URL must be http(s): {:?}", raw)));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
