//! Configuration management for the flipbook server
//!
//! Every setting comes from the environment (after `.env` is loaded) and
//! falls back to a default when missing or unparseable.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::viewer::flip::{DisplayMode, FlipConfig, FlipContainer, FlipRenderer, PageFlipRenderer, TurnRenderer};
use crate::viewer::mupdf_source::DEFAULT_USER_AGENT;
use crate::viewer::rasterizer::DEFAULT_SCALE;
use crate::viewer::ViewerOptions;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub assets: AssetsConfig,
    pub relay: RelayConfig,
    pub viewer: ViewerConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    /// Externally visible URL, logged at startup
    pub public_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AssetsConfig {
    /// SPA build output containing `index.html`
    pub static_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub scale: f32,
    pub render_concurrency: usize,
    pub renderer: RendererKind,
    pub display: DisplayMode,
    pub duration_ms: u32,
    /// When set, failed direct fetches are retried through this relay
    pub relay_base_url: Option<String>,
}

/// Which flip renderer the viewer uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RendererKind {
    #[default]
    Turn,
    PageFlip,
}

impl FromStr for RendererKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "turn" => Ok(RendererKind::Turn),
            "page-flip" | "pageflip" => Ok(RendererKind::PageFlip),
            other => Err(format!("unknown renderer: {}", other)),
        }
    }
}

impl RendererKind {
    pub fn build(self) -> Box<dyn FlipRenderer> {
        match self {
            RendererKind::Turn => Box::new(TurnRenderer::new()),
            RendererKind::PageFlip => Box::new(PageFlipRenderer::new()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
                environment: "development".to_string(),
                public_url: None,
            },
            assets: AssetsConfig {
                static_dir: PathBuf::from("dist"),
            },
            relay: RelayConfig {
                timeout_secs: 30,
                user_agent: DEFAULT_USER_AGENT.to_string(),
            },
            viewer: ViewerConfig {
                scale: DEFAULT_SCALE,
                render_concurrency: 1,
                renderer: RendererKind::Turn,
                display: DisplayMode::Double,
                duration_ms: 600,
                relay_base_url: None,
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Config {
            server: ServerConfig {
                host: var("HOST").unwrap_or(defaults.server.host),
                port: parse_or(&var, "PORT", defaults.server.port),
                environment: var("NODE_ENV")
                    .or_else(|| var("APP_ENV"))
                    .unwrap_or(defaults.server.environment),
                public_url: var("PUBLIC_URL").or_else(|| var("RAILWAY_STATIC_URL")),
            },
            assets: AssetsConfig {
                static_dir: var("STATIC_DIR")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.assets.static_dir),
            },
            relay: RelayConfig {
                timeout_secs: parse_or(&var, "FETCH_TIMEOUT_SECS", defaults.relay.timeout_secs),
                user_agent: var("RELAY_USER_AGENT").unwrap_or(defaults.relay.user_agent),
            },
            viewer: ViewerConfig {
                scale: parse_or(&var, "RENDER_SCALE", defaults.viewer.scale),
                render_concurrency: parse_or(
                    &var,
                    "RENDER_CONCURRENCY",
                    defaults.viewer.render_concurrency,
                ),
                renderer: parse_or(&var, "FLIP_RENDERER", defaults.viewer.renderer),
                display: parse_or(&var, "FLIP_DISPLAY", defaults.viewer.display),
                duration_ms: parse_or(&var, "FLIP_DURATION_MS", defaults.viewer.duration_ms),
                relay_base_url: var("RELAY_BASE_URL"),
            },
        }
    }

    /// Pipeline options derived from the viewer section
    pub fn viewer_options(&self) -> ViewerOptions {
        let scale = if self.viewer.scale > 0.0 {
            self.viewer.scale
        } else {
            DEFAULT_SCALE
        };
        ViewerOptions {
            scale,
            render_concurrency: self.viewer.render_concurrency.max(1),
            container: FlipContainer::default(),
            flip: FlipConfig {
                display: self.viewer.display,
                duration_ms: self.viewer.duration_ms,
                ..FlipConfig::default()
            },
        }
    }
}

fn parse_or<T, F>(var: &F, key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|e| {
            tracing::warn!("Invalid {}={:?} ({}), using default", key, raw, e);
            default
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]);
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.environment, "development");
        assert_eq!(config.assets.static_dir, PathBuf::from("dist"));
        assert_eq!(config.relay.timeout_secs, 30);
        assert_eq!(config.viewer.renderer, RendererKind::Turn);
        assert_eq!(config.viewer.scale, 1.5);
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("PORT", "8080"),
            ("NODE_ENV", "production"),
            ("RAILWAY_STATIC_URL", "flipbook.up.railway.app"),
            ("FLIP_RENDERER", "page-flip"),
            ("FLIP_DISPLAY", "single"),
            ("RENDER_CONCURRENCY", "4"),
        ]);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.environment, "production");
        assert_eq!(config.server.public_url.as_deref(), Some("flipbook.up.railway.app"));
        assert_eq!(config.viewer.renderer, RendererKind::PageFlip);
        assert_eq!(config.viewer.display, DisplayMode::Single);
        assert_eq!(config.viewer_options().render_concurrency, 4);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = config(&[("PORT", "eighty"), ("FLIP_RENDERER", "curl"), ("RENDER_SCALE", "-2")]);
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.viewer.renderer, RendererKind::Turn);
        assert_eq!(config.viewer_options().scale, DEFAULT_SCALE);
    }

    #[test]
    fn test_renderer_kind_builds_matching_renderer() {
        assert_eq!(RendererKind::Turn.build().name(), "turn");
        assert_eq!(RendererKind::PageFlip.build().name(), "page-flip");
    }
}
