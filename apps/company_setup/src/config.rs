use std::{collections::HashMap, fs, path::Path};

use anyhow::{bail, Context};
use client_core::guard::DEFAULT_SIGN_IN_PATH;
use url::Url;

pub const DEFAULT_CONFIG_FILE: &str = "company_setup.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_base_url: String,
    pub bearer_token: Option<String>,
    pub sign_in_path: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:3000/api".into(),
            bearer_token: None,
            sign_in_path: DEFAULT_SIGN_IN_PATH.into(),
        }
    }
}

/// Defaults, then the TOML file (if present), then environment variables.
pub fn load_settings(config_path: &Path) -> anyhow::Result<Settings> {
    let file = match fs::read_to_string(config_path) {
        Ok(raw) => Some(raw),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
        Err(err) => {
            return Err(err).with_context(|| {
                format!("failed to read config file '{}'", config_path.display())
            })
        }
    };
    let settings = layer_settings(file.as_deref(), |key| std::env::var(key).ok())
        .with_context(|| format!("invalid config file '{}'", config_path.display()))?;
    Ok(settings)
}

fn layer_settings(
    file: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    if let Some(raw) = file {
        let file_cfg: HashMap<String, String> =
            toml::from_str(raw).context("expected flat string keys")?;
        if let Some(v) = file_cfg.get("api_base_url") {
            settings.api_base_url = v.clone();
        }
        if let Some(v) = file_cfg.get("bearer_token") {
            settings.bearer_token = Some(v.clone());
        }
        if let Some(v) = file_cfg.get("sign_in_path") {
            settings.sign_in_path = v.clone();
        }
    }

    if let Some(v) = env("API_BASE_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = env("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = env("APP__BEARER_TOKEN") {
        settings.bearer_token = Some(v);
    }
    if let Some(v) = env("APP__SIGN_IN_PATH") {
        settings.sign_in_path = v;
    }

    settings.api_base_url = normalize_api_base_url(&settings.api_base_url)?;
    settings.bearer_token = settings
        .bearer_token
        .filter(|token| !token.trim().is_empty());
    Ok(settings)
}

pub fn normalize_api_base_url(raw: &str) -> anyhow::Result<String> {
    let raw = raw.trim();
    let parsed = Url::parse(raw).with_context(|| format!("invalid api base url '{raw}'"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        bail!("api base url must use http or https, got '{}'", parsed.scheme());
    }
    Ok(raw.trim_end_matches('/').to_string())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
