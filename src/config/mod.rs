use anyhow::{bail, Context};
use fs_err as fs;
use serde::{Deserialize, Serialize};

use crate::cli::Args;

/// Immutable service configuration, assembled once at startup from the
/// optional TOML file, CLI flags and the `OPENAI_API_KEY` env var. Nothing
/// reads ambient environment after this point.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub chat_model: String,
    pub image_model: String,
    pub allowed_origins: Vec<String>,
    pub upload_dir: String,
    pub db_path: String,
    pub timeout_secs: u64,
    #[serde(skip)]
    pub api_key: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8000,
            chat_model: "gpt-4o".into(),
            image_model: "dall-e-3".into(),
            allowed_origins: vec![
                "http://localhost:5173".into(),
                "http://localhost:5174".into(),
                "http://localhost:5175".into(),
                "https://promp-e.vercel.app".into(),
            ],
            upload_dir: "uploads".into(),
            db_path: "prompe.db".into(),
            timeout_secs: 120,
            api_key: String::new(),
        }
    }
}

impl Config {
    pub fn load(args: &Args) -> anyhow::Result<Self> {
        let mut cfg = match &args.config {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("failed to read config file {path}"))?;
                toml::from_str(&text)
                    .with_context(|| format!("failed to parse config file {path}"))?
            }
            None => Config::default(),
        };

        if let Some(host) = &args.host {
            cfg.host = host.clone();
        }
        if let Some(port) = args.port {
            cfg.port = port;
        }
        if let Some(db) = &args.db {
            cfg.db_path = db.clone();
        }
        if let Some(dir) = &args.uploads_dir {
            cfg.upload_dir = dir.clone();
        }

        cfg.api_key = std::env::var("OPENAI_API_KEY").unwrap_or_default();
        if cfg.api_key.is_empty() {
            bail!("OPENAI_API_KEY env var is not set");
        }
        Ok(cfg)
    }
}
