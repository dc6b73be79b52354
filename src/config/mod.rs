use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// When true the Ollama detector is used; otherwise the placeholder
    /// detector answers every request with no corrections.
    pub use_ollama: bool,
    pub ollama_url: String,
    pub ollama_model: String,
    pub config_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            use_ollama: false,
            ollama_url: "http://localhost:11434".to_string(),
            ollama_model: "gemma3".to_string(),
            config_path: PathBuf::from(&home).join(".config/grammar-fixer-api/config.toml"),
        }
    }
}

impl Config {
    /// Loads the config file if present, then applies environment overrides.
    /// A missing or unparsable file falls back to defaults rather than
    /// failing startup.
    pub fn load() -> Self {
        let mut config = Config::default();

        if let Some(parent) = config.config_path.parent() {
            let _ = fs::create_dir_all(parent);
        }

        let path = config.config_path.clone();
        config = Self::load_from(&path);

        if let Ok(port) = std::env::var("PORT") {
            match port.parse() {
                Ok(port) => config.port = port,
                Err(_) => warn!("ignoring unparsable PORT value: {port}"),
            }
        }
        if let Ok(url) = std::env::var("OLLAMA_URL") {
            config.ollama_url = url;
            config.use_ollama = true;
        }
        if let Ok(model) = std::env::var("OLLAMA_MODEL") {
            config.ollama_model = model;
        }

        config
    }

    pub fn load_from(path: &PathBuf) -> Self {
        let mut config = Config {
            config_path: path.clone(),
            ..Config::default()
        };

        if let Ok(contents) = fs::read_to_string(path) {
            if let Ok(parsed) = contents.parse::<toml_edit::DocumentMut>() {
                if let Some(host) = parsed.get("host").and_then(|v| v.as_str()) {
                    config.host = host.to_string();
                }
                if let Some(port) = parsed.get("port").and_then(|v| v.as_integer()) {
                    config.port = port as u16;
                }
                if let Some(flag) = parsed.get("use_ollama").and_then(|v| v.as_bool()) {
                    config.use_ollama = flag;
                }
                if let Some(url) = parsed.get("ollama_url").and_then(|v| v.as_str()) {
                    config.ollama_url = url.to_string();
                }
                if let Some(model) = parsed.get("ollama_model").and_then(|v| v.as_str()) {
                    config.ollama_model = model.to_string();
                }
            } else {
                warn!("config file at {} is not valid TOML, using defaults", path.display());
            }
        }

        config
    }

    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let mut doc = toml_edit::DocumentMut::new();
        doc["host"] = toml_edit::value(self.host.clone());
        doc["port"] = toml_edit::value(self.port as i64);
        doc["use_ollama"] = toml_edit::value(self.use_ollama);
        doc["ollama_url"] = toml_edit::value(self.ollama_url.clone());
        doc["ollama_model"] = toml_edit::value(self.ollama_model.clone());

        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&self.config_path, doc.to_string())?;
        Ok(())
    }
}
