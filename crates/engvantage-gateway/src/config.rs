//! Gateway configuration and factory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use engvantage_core::audio::SpeechPlayer;
use engvantage_core::traits::{ContentGateway, DEFAULT_WORD_COUNT};

use crate::gemini::GeminiGateway;
use crate::relay::RelayGateway;

/// Configuration for the content gateway.
///
/// Note: Custom Debug impl masks the API key to prevent accidental exposure
/// in logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum GatewayConfig {
    /// Direct Gemini call with a locally-held key.
    Gemini {
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
        #[serde(default)]
        text_model: Option<String>,
        #[serde(default)]
        tts_model: Option<String>,
        #[serde(default)]
        voice: Option<String>,
    },
    /// Indirect call through a relay that holds the key server-side.
    Relay {
        endpoint: String,
        #[serde(default)]
        text_model: Option<String>,
        #[serde(default)]
        tts_model: Option<String>,
        #[serde(default)]
        voice: Option<String>,
    },
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GatewayConfig::Gemini {
                api_key: _,
                base_url,
                text_model,
                tts_model,
                voice,
            } => f
                .debug_struct("Gemini")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .field("text_model", text_model)
                .field("tts_model", tts_model)
                .field("voice", voice)
                .finish(),
            GatewayConfig::Relay {
                endpoint,
                text_model,
                tts_model,
                voice,
            } => f
                .debug_struct("Relay")
                .field("endpoint", endpoint)
                .field("text_model", text_model)
                .field("tts_model", tts_model)
                .field("voice", voice)
                .finish(),
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        GatewayConfig::Gemini {
            api_key: String::new(),
            base_url: None,
            text_model: None,
            tts_model: None,
            voice: None,
        }
    }
}

/// Top-level engvantage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,
    /// Words per list load.
    #[serde(default = "default_word_count")]
    pub word_count: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            gateway: GatewayConfig::default(),
            word_count: default_word_count(),
        }
    }
}

fn default_word_count() -> usize {
    DEFAULT_WORD_COUNT
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

fn resolve_gateway_config(config: &GatewayConfig) -> GatewayConfig {
    match config {
        GatewayConfig::Gemini {
            api_key,
            base_url,
            text_model,
            tts_model,
            voice,
        } => GatewayConfig::Gemini {
            api_key: resolve_env_vars(api_key),
            base_url: base_url.as_ref().map(|u| resolve_env_vars(u)),
            text_model: text_model.clone(),
            tts_model: tts_model.clone(),
            voice: voice.clone(),
        },
        GatewayConfig::Relay {
            endpoint,
            text_model,
            tts_model,
            voice,
        } => GatewayConfig::Relay {
            endpoint: resolve_env_vars(endpoint),
            text_model: text_model.clone(),
            tts_model: tts_model.clone(),
            voice: voice.clone(),
        },
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `engvantage.toml` in the current directory
/// 2. `~/.config/engvantage/config.toml`
///
/// Environment variable override: `ENGVANTAGE_GEMINI_KEY`.
pub fn load_config() -> Result<AppConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<AppConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("engvantage.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = config_dir() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<AppConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => AppConfig::default(),
    };

    if let Ok(key) = std::env::var("ENGVANTAGE_GEMINI_KEY") {
        if let GatewayConfig::Gemini { api_key, .. } = &mut config.gateway {
            *api_key = key;
        }
    }

    config.gateway = resolve_gateway_config(&config.gateway);
    Ok(config)
}

fn config_dir() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("engvantage"))
}

/// Create a gateway instance from its configuration.
pub fn create_gateway(
    config: &GatewayConfig,
    player: Arc<dyn SpeechPlayer>,
) -> Result<Arc<dyn ContentGateway>> {
    match config {
        GatewayConfig::Gemini {
            api_key,
            base_url,
            text_model,
            tts_model,
            voice,
        } => {
            if api_key.is_empty() {
                anyhow::bail!(
                    "no Gemini API key configured; set ENGVANTAGE_GEMINI_KEY or \
                     add one to engvantage.toml"
                );
            }
            Ok(Arc::new(
                GeminiGateway::new(api_key, base_url.clone(), player).with_models(
                    text_model.clone(),
                    tts_model.clone(),
                    voice.clone(),
                ),
            ))
        }
        GatewayConfig::Relay {
            endpoint,
            text_model,
            tts_model,
            voice,
        } => Ok(Arc::new(RelayGateway::new(endpoint, player).with_models(
            text_model.clone(),
            tts_model.clone(),
            voice.clone(),
        ))),
    }
}
