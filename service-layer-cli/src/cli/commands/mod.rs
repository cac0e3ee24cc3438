//! Command implementations and shared connection flags

pub mod login;
pub mod query;

use anyhow::Result;
use clap::Args;
use service_layer::ServiceLayerContext;
use std::path::PathBuf;

use crate::config::ConnectionConfig;

/// Connection flags shared by every command; they override the config file
/// and environment
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// Config file (default: <config_dir>/service-layer/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Service Layer root, e.g. https://host:50000/b1s/v2/
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    #[arg(long, global = true)]
    pub company_db: Option<String>,

    #[arg(long = "user", global = true)]
    pub user_name: Option<String>,

    /// Login language code
    #[arg(long, global = true)]
    pub language: Option<i32>,

    /// Accept self-signed TLS certificates
    #[arg(long, global = true)]
    pub accept_invalid_certs: bool,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,
}

impl ConnectionArgs {
    fn as_layer(&self) -> ConnectionConfig {
        ConnectionConfig {
            base_url: self.base_url.clone(),
            company_db: self.company_db.clone(),
            user_name: self.user_name.clone(),
            password: None,
            language: self.language,
            accept_invalid_certs: self.accept_invalid_certs.then_some(true),
            timeout_secs: self.timeout,
        }
    }

    /// Resolve all configuration layers without prompting
    pub fn resolve(&self) -> Result<ConnectionConfig> {
        let file = ConnectionConfig::load(self.config.as_deref())?;
        let env = ConnectionConfig::from_env()?;
        Ok(file.merge(env).merge(self.as_layer()))
    }

    /// Build a context, prompting for a password if none is configured
    pub fn connect(&self) -> Result<ServiceLayerContext> {
        let options = self.resolve()?.prompt_missing_password()?.into_options()?;
        Ok(ServiceLayerContext::new(options)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_layer() {
        let args = ConnectionArgs {
            base_url: Some("https://sap.local/b1s/v2".to_string()),
            accept_invalid_certs: true,
            ..Default::default()
        };
        let layer = args.as_layer();
        assert_eq!(layer.accept_invalid_certs, Some(true));
        assert_eq!(layer.password, None);

        let unset = ConnectionArgs::default().as_layer();
        assert_eq!(unset.accept_invalid_certs, None);
    }
}
