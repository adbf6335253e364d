use std::{env, fs, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

pub const DEFAULT_API_BASE: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_IMAGE_BASE: &str = "https://image.tmdb.org/t/p/w342";
pub const DEFAULT_LANGUAGE: &str = "en-US";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api_key: String,
    pub base_url: String,
    pub image_base_url: String,
    pub language: String,
    pub cache_dir: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_API_BASE.to_string(),
            image_base_url: DEFAULT_IMAGE_BASE.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            cache_dir: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    api_key: Option<String>,
    base_url: Option<String>,
    image_base_url: Option<String>,
    language: Option<String>,
    cache_dir: Option<String>,
}

pub fn load_config() -> AppConfig {
    let cfg_path = resolve_relative_path("config.json");
    let mut cfg = AppConfig::default();

    match fs::read_to_string(&cfg_path) {
        Ok(raw) => match serde_json::from_str::<RawConfig>(&raw) {
            Ok(parsed) => {
                if let Some(key) = parsed.api_key {
                    cfg.api_key = key;
                }
                if let Some(url) = parsed.base_url {
                    cfg.base_url = url.trim_end_matches('/').to_string();
                }
                if let Some(url) = parsed.image_base_url {
                    cfg.image_base_url = url.trim_end_matches('/').to_string();
                }
                if let Some(lang) = parsed.language {
                    if !lang.trim().is_empty() {
                        cfg.language = lang;
                    }
                }
                if parsed.cache_dir.is_some() {
                    cfg.cache_dir = parsed.cache_dir;
                }
                info!("Loaded config from {}", cfg_path.display());
            }
            Err(err) => {
                warn!("Failed to parse config.json ({}). Using defaults.", err);
            }
        },
        Err(_) => {
            info!("No config.json found; using defaults");
        }
    }

    // TMDB_API_KEY in the environment wins over the file.
    if let Ok(key) = env::var("TMDB_API_KEY") {
        if !key.trim().is_empty() {
            cfg.api_key = key;
        }
    }

    if cfg.api_key.is_empty() {
        warn!("No TMDB api_key configured; catalog requests will fail until one is set.");
    }

    cfg
}

/// Resolve a relative path against the executable's directory, falling back
/// to the current working directory.
pub fn resolve_relative_path(name: &str) -> PathBuf {
    let base = env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join(name)
}
