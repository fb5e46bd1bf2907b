//! Configuration loading from environment.

use std::env;
use std::path::PathBuf;

use rates_adapters::DEFAULT_BASE_URL;
use rates_types::CurrencyCode;

pub const DEFAULT_GRAPH_DIR: &str = "./files/graph";
pub const DEFAULT_REFERENCE: &str = "EUR";

/// Application configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_url: String,
    pub graph_dir: PathBuf,
    pub font_path: Option<PathBuf>,
    pub upload_url: Option<String>,
    pub public_dir: Option<PathBuf>,
    pub public_url: Option<String>,
    pub default_reference: CurrencyCode,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through `lookup`; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_url = var("RATES_API_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
            anyhow::bail!("RATES_API_URL must be an http(s) URL, got {}", api_url);
        }

        let default_reference = CurrencyCode::new(
            var("DEFAULT_REFERENCE").unwrap_or_else(|| DEFAULT_REFERENCE.to_string()),
        );

        Ok(Self {
            api_url,
            graph_dir: var("GRAPH_DIR")
                .unwrap_or_else(|| DEFAULT_GRAPH_DIR.to_string())
                .into(),
            font_path: var("GRAPH_FONT_PATH").map(PathBuf::from),
            upload_url: var("GRAPH_UPLOAD_URL"),
            public_dir: var("GRAPH_PUBLIC_DIR").map(PathBuf::from),
            public_url: var("GRAPH_PUBLIC_URL"),
            default_reference,
        })
    }
}
