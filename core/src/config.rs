//! Client configuration.
//!
//! The base URL is parsed and checked once, up front, so the request builders
//! can append path segments without a failure path of their own.

use std::env::{self, VarError};

use thiserror::Error;
use url::Url;

/// Environment variable holding the backend base URL.
pub const ENV_API_URL: &str = "LEMA_API_URL";

/// Base URL used when `LEMA_API_URL` is unset.
pub const DEFAULT_API_URL: &str = "http://localhost:3000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid base URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("base URL {0:?} cannot carry path segments")]
    NotABase(String),

    #[error("environment variable {0} is not valid unicode")]
    NotUnicode(&'static str),
}

/// Immutable configuration for `ApiClient` and `ApiGateway`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    base_url: Url,
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        let url = Url::parse(base_url).map_err(|source| ConfigError::InvalidUrl {
            url: base_url.to_string(),
            source,
        })?;
        if url.cannot_be_a_base() {
            return Err(ConfigError::NotABase(base_url.to_string()));
        }
        Ok(Self { base_url: url })
    }

    /// Load from `LEMA_API_URL`, falling back to `DEFAULT_API_URL` when it is
    /// unset. A value that is set but not unicode is an error.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_var(env::var(ENV_API_URL))
    }

    fn from_var(value: Result<String, VarError>) -> Result<Self, ConfigError> {
        match value {
            Ok(url) => Self::new(&url),
            Err(VarError::NotPresent) => Self::new(DEFAULT_API_URL),
            Err(VarError::NotUnicode(_)) => Err(ConfigError::NotUnicode(ENV_API_URL)),
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}
