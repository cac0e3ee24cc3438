//! Layered connection settings for the CLI
//!
//! Values are resolved in order: TOML config file, then `SL_*` environment
//! variables (a `.env` file is loaded first), then command-line flags. Later
//! layers override earlier ones field by field.

use anyhow::{Context, Result};
use is_terminal::IsTerminal;
use serde::{Deserialize, Serialize};
use service_layer::ContextOptions;
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_BASE_URL: &str = "SL_BASE_URL";
pub const ENV_COMPANY_DB: &str = "SL_COMPANY_DB";
pub const ENV_USER_NAME: &str = "SL_USER_NAME";
pub const ENV_PASSWORD: &str = "SL_PASSWORD";
pub const ENV_LANGUAGE: &str = "SL_LANGUAGE";
pub const ENV_ACCEPT_INVALID_CERTS: &str = "SL_ACCEPT_INVALID_CERTS";

/// One layer of connection settings; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    pub base_url: Option<String>,
    pub company_db: Option<String>,
    pub user_name: Option<String>,
    pub password: Option<String>,
    pub language: Option<i32>,
    pub accept_invalid_certs: Option<bool>,
    pub timeout_secs: Option<u64>,
}

impl ConnectionConfig {
    /// `<config_dir>/service-layer/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("service-layer").join("config.toml"))
    }

    /// Load the config file. An explicit path must exist; the default path
    /// is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => match Self::default_path() {
                Some(path) => (path, false),
                None => return Ok(Self::default()),
            },
        };

        if !path.exists() {
            if explicit {
                anyhow::bail!("Config file does not exist: {}", path.display());
            }
            log::debug!("No config file at {}", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the `SL_*` variables through `lookup`
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let language = lookup(ENV_LANGUAGE)
            .map(|v| v.trim().parse::<i32>())
            .transpose()
            .with_context(|| format!("{} must be an integer", ENV_LANGUAGE))?;

        let accept_invalid_certs = lookup(ENV_ACCEPT_INVALID_CERTS)
            .map(|v| parse_flag(&v))
            .transpose()?;

        Ok(Self {
            base_url: lookup(ENV_BASE_URL),
            company_db: lookup(ENV_COMPANY_DB),
            user_name: lookup(ENV_USER_NAME),
            password: lookup(ENV_PASSWORD),
            language,
            accept_invalid_certs,
            timeout_secs: None,
        })
    }

    /// Overlay `other` on top of `self`
    pub fn merge(self, other: ConnectionConfig) -> Self {
        Self {
            base_url: other.base_url.or(self.base_url),
            company_db: other.company_db.or(self.company_db),
            user_name: other.user_name.or(self.user_name),
            password: other.password.or(self.password),
            language: other.language.or(self.language),
            accept_invalid_certs: other.accept_invalid_certs.or(self.accept_invalid_certs),
            timeout_secs: other.timeout_secs.or(self.timeout_secs),
        }
    }

    /// Ask for the password on the terminal when none was configured
    pub fn prompt_missing_password(mut self) -> Result<Self> {
        if self.password.is_none() && std::io::stdin().is_terminal() {
            let user = self.user_name.as_deref().unwrap_or("Service Layer");
            let password = rpassword::prompt_password(format!("Password for {}: ", user))
                .context("Failed to read password")?;
            self.password = Some(password);
        }
        Ok(self)
    }

    pub fn into_options(self) -> Result<ContextOptions> {
        let Some(base_url) = self.base_url else {
            anyhow::bail!(
                "No Service Layer URL configured. Set {} or pass --base-url.",
                ENV_BASE_URL
            );
        };

        Ok(ContextOptions {
            base_url,
            company_db: self.company_db,
            user_name: self.user_name,
            password: self.password,
            language: self.language,
            accept_invalid_certs: self.accept_invalid_certs.unwrap_or(false),
            timeout_secs: self.timeout_secs,
        })
    }
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => anyhow::bail!("{} must be a boolean, got '{}'", ENV_ACCEPT_INVALID_CERTS, other),
    }
}
