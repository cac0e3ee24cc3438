//! Connection options for a Service Layer context
//!
//! Options are immutable once a context is created. The base URL is validated
//! and normalized up front; credentials are only checked when a login is
//! actually attempted.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::api::constants::DEFAULT_LANGUAGE;
use crate::error::{Error, Result};

/// Credentials and connection settings for one Service Layer company
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextOptions {
    /// Service Layer root, e.g. `https://host:50000/b1s/v2/`
    pub base_url: String,
    /// Company database to log into
    pub company_db: Option<String>,
    pub user_name: Option<String>,
    pub password: Option<String>,
    /// Numeric language code sent with the login request
    pub language: Option<i32>,
    /// Accept self-signed or otherwise invalid TLS certificates
    #[serde(default)]
    pub accept_invalid_certs: bool,
    /// Per-request timeout in seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// Validated credentials, ready to be sent to the `Login` endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct Credentials {
    pub company_db: String,
    pub user_name: String,
    pub password: String,
    pub language: i32,
}

impl ContextOptions {
    /// Create a new builder for ContextOptions
    pub fn builder(base_url: impl Into<String>) -> ContextOptionsBuilder {
        ContextOptionsBuilder::new(base_url)
    }

    /// Base URL guaranteed to end with `/`
    pub fn normalized_base_url(&self) -> Result<String> {
        let trimmed = self.base_url.trim();
        if trimmed.is_empty() {
            return Err(Error::configuration("base_url is required"));
        }

        let normalized = if trimmed.ends_with('/') {
            trimmed.to_string()
        } else {
            format!("{}/", trimmed)
        };

        reqwest::Url::parse(&normalized)
            .map_err(|e| Error::configuration(format!("invalid base_url '{}': {}", trimmed, e)))?;

        Ok(normalized)
    }

    /// Return a copy with the base URL normalized, failing on an unusable URL
    pub fn normalized(&self) -> Result<Self> {
        Ok(Self {
            base_url: self.normalized_base_url()?,
            ..self.clone()
        })
    }

    /// Language code, falling back to the default when unset
    pub fn language_or_default(&self) -> i32 {
        self.language.unwrap_or(DEFAULT_LANGUAGE)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Collect the login credentials, failing fast on any missing value
    pub fn credentials(&self) -> Result<Credentials> {
        Ok(Credentials {
            company_db: required(&self.company_db, "company_db")?,
            user_name: required(&self.user_name, "user_name")?,
            password: required(&self.password, "password")?,
            language: self.language_or_default(),
        })
    }
}

fn required(value: &Option<String>, name: &str) -> Result<String> {
    match value {
        Some(v) if !v.is_empty() => Ok(v.clone()),
        _ => Err(Error::configuration(format!("{} is required to log in", name))),
    }
}

/// Builder for ContextOptions
#[derive(Debug, Clone)]
pub struct ContextOptionsBuilder {
    options: ContextOptions,
}

impl ContextOptionsBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            options: ContextOptions {
                base_url: base_url.into(),
                ..ContextOptions::default()
            },
        }
    }

    pub fn company_db(mut self, company_db: impl Into<String>) -> Self {
        self.options.company_db = Some(company_db.into());
        self
    }

    pub fn user_name(mut self, user_name: impl Into<String>) -> Self {
        self.options.user_name = Some(user_name.into());
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.options.password = Some(password.into());
        self
    }

    pub fn language(mut self, language: i32) -> Self {
        self.options.language = Some(language);
        self
    }

    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.options.accept_invalid_certs = accept;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout_secs = Some(timeout.as_secs());
        self
    }

    pub fn build(self) -> ContextOptions {
        self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_options() -> ContextOptions {
        ContextOptions::builder("https://sap.local:50000/b1s/v2")
            .company_db("SBODEMO")
            .user_name("manager")
            .password("secret")
            .build()
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let options = full_options();
        assert_eq!(
            options.normalized_base_url().unwrap(),
            "https://sap.local:50000/b1s/v2/"
        );
    }

    #[test]
    fn test_base_url_already_normalized() {
        let options = ContextOptions::builder("https://sap.local/b1s/v1/").build();
        assert_eq!(options.normalized_base_url().unwrap(), "https://sap.local/b1s/v1/");
    }

    #[test]
    fn test_empty_base_url_is_configuration_error() {
        let options = ContextOptions::builder("  ").build();
        assert!(matches!(
            options.normalized_base_url(),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn test_unparseable_base_url() {
        let options = ContextOptions::builder("not a url").build();
        assert!(matches!(options.normalized(), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_language_defaults() {
        let credentials = full_options().credentials().unwrap();
        assert_eq!(credentials.language, DEFAULT_LANGUAGE);

        let options = ContextOptions {
            language: Some(3),
            ..full_options()
        };
        assert_eq!(options.credentials().unwrap().language, 3);
    }

    #[test]
    fn test_missing_credentials() {
        let options = ContextOptions {
            password: None,
            ..full_options()
        };
        let err = options.credentials().unwrap_err();
        assert!(matches!(err, Error::Configuration(ref m) if m.contains("password")));

        let options = ContextOptions {
            company_db: Some(String::new()),
            ..full_options()
        };
        assert!(matches!(options.credentials(), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_deserialize_from_toml_shape() {
        let options: ContextOptions = serde_json::from_value(serde_json::json!({
            "base_url": "https://sap.local/b1s/v2",
            "company_db": "SBODEMO",
            "user_name": "manager",
            "password": "secret",
            "language": 25,
        }))
        .unwrap();
        assert!(!options.accept_invalid_certs);
        assert_eq!(options.timeout(), None);
        assert_eq!(options.language, Some(25));
    }
}
