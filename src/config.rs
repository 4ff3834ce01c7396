use crate::model::search::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::PathBuf;

pub const DEFAULT_API_BASE_URL: &str = "https://api.pokemontcg.io/v2";

/// Supabase project endpoint and public key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub url: String,
    pub anon_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Card catalog base URL
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Cards requested per page
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// `log` level filter (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Optional catalog API key, raises the anonymous rate limit
    #[serde(skip)]
    pub api_key: Option<String>,
    /// Only read from the environment, never written to disk
    #[serde(skip)]
    pub backend: Option<BackendConfig>,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            page_size: default_page_size(),
            log_level: default_log_level(),
            api_key: None,
            backend: None,
        }
    }
}

impl Config {
    pub fn config_dir() -> Option<PathBuf> {
        let home = env::var("HOME").ok()?;
        Some(PathBuf::from(home).join(".pokedex-tui"))
    }

    fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("config.json"))
    }

    /// Load `config.json` (if any) and overlay the environment
    ///
    /// `.env` must already have been read by the caller.
    pub fn load() -> Config {
        let mut config = Self::load_file().unwrap_or_default();
        config.apply_env(|key| env::var(key).ok());
        config
    }

    fn load_file() -> Option<Config> {
        let config_path = Self::config_path()?;
        if !config_path.exists() {
            return None;
        }

        let contents = fs::read_to_string(&config_path).ok()?;
        serde_json::from_str(&contents).ok()
    }

    /// Overlay settings from an environment lookup
    pub fn apply_env<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = non_empty("POKEMON_TCG_API_URL") {
            self.api_base_url = url;
        }
        if let Some(key) = non_empty("POKEMON_TCG_API_KEY") {
            self.api_key = Some(key);
        }
        if let Some(level) = non_empty("POKEDEX_LOG") {
            self.log_level = level;
        }

        self.backend = match (non_empty("SUPABASE_URL"), non_empty("SUPABASE_ANON_KEY")) {
            (Some(url), Some(anon_key)) => Some(BackendConfig {
                url: url.trim_end_matches('/').to_string(),
                anon_key,
            }),
            _ => None,
        };

        self.api_base_url = self.api_base_url.trim_end_matches('/').to_string();
        self.page_size = self.page_size.clamp(1, MAX_PAGE_SIZE);
    }

    pub fn log_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }
}
