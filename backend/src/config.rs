//! Process settings loaded via OrthoConfig.
//!
//! Values come from `STOREFRONT_*` environment variables, an optional config
//! file and the command line, with the usual OrthoConfig precedence. Session
//! cookie settings are read separately by
//! [`session_settings_from_env`](crate::inbound::http::session_config::session_settings_from_env).

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;
use zeroize::Zeroizing;

use crate::outbound::gateway::DEFAULT_REQUEST_TIMEOUT;
use crate::outbound::payment::DEFAULT_STRIPE_API_BASE;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
/// Default number of cached backend reads.
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

/// Errors raised while turning raw settings into typed values.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// A required setting has no value.
    #[error("{name} must be set")]
    Missing {
        /// Setting name.
        name: &'static str,
    },
    /// A URL setting does not parse.
    #[error("{name} is not a valid URL: {source}")]
    InvalidUrl {
        /// Setting name.
        name: &'static str,
        /// Parser failure.
        #[source]
        source: url::ParseError,
    },
    /// A URL setting uses a scheme other than http or https.
    #[error("{name} must use http or https, got {scheme}")]
    UnsupportedScheme {
        /// Setting name.
        name: &'static str,
        /// Scheme found.
        scheme: String,
    },
    /// The bind address does not parse.
    #[error("bind address {value:?} is invalid: {source}")]
    InvalidBindAddr {
        /// Raw value.
        value: String,
        /// Parser failure.
        #[source]
        source: std::net::AddrParseError,
    },
    /// A numeric setting must be positive.
    #[error("{name} must be greater than zero")]
    NotPositive {
        /// Setting name.
        name: &'static str,
    },
}

/// Storefront process configuration.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "STOREFRONT")]
pub struct StorefrontSettings {
    /// Base URL of the backend API, e.g. `https://api.example.com/api`.
    pub backend_base_url: Option<String>,
    /// Secret key for the payment provider; payments are disabled when unset.
    pub payment_secret_key: Option<String>,
    /// Payment provider API base URL.
    pub payment_api_base_url: Option<String>,
    /// Listen address.
    #[ortho_config(default = DEFAULT_BIND_ADDR.to_owned())]
    pub bind_addr: String,
    /// Hard timeout for backend and payment calls, in seconds.
    pub request_timeout_secs: Option<u64>,
    /// Maximum number of cached backend reads.
    pub cache_capacity: Option<usize>,
}

fn http_url(name: &'static str, raw: &str) -> Result<Url, SettingsError> {
    let url = Url::parse(raw.trim()).map_err(|source| SettingsError::InvalidUrl { name, source })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(SettingsError::UnsupportedScheme {
            name,
            scheme: other.to_owned(),
        }),
    }
}

impl StorefrontSettings {
    /// Backend base URL.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Missing`] when unset and other
    /// [`SettingsError`] variants when the value is not an http(s) URL.
    pub fn backend_url(&self) -> Result<Url, SettingsError> {
        let name = "backend_base_url";
        let raw = self
            .backend_base_url
            .as_deref()
            .filter(|raw| !raw.trim().is_empty())
            .ok_or(SettingsError::Missing { name })?;
        http_url(name, raw)
    }

    /// Payment provider base URL.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] when the value is not an http(s) URL.
    pub fn payment_api_url(&self) -> Result<Url, SettingsError> {
        http_url(
            "payment_api_base_url",
            self.payment_api_base_url
                .as_deref()
                .unwrap_or(DEFAULT_STRIPE_API_BASE),
        )
    }

    /// Payment secret, if payments are configured. Blank values count as unset.
    pub fn payment_secret(&self) -> Option<Zeroizing<String>> {
        self.payment_secret_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(|key| Zeroizing::new(key.to_owned()))
    }

    /// Listen address.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidBindAddr`] when the value does not parse.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        self.bind_addr
            .trim()
            .parse()
            .map_err(|source| SettingsError::InvalidBindAddr {
                value: self.bind_addr.clone(),
                source,
            })
    }

    /// Outbound call timeout.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::NotPositive`] for a zero timeout.
    pub fn request_timeout(&self) -> Result<Duration, SettingsError> {
        match self.request_timeout_secs {
            None => Ok(DEFAULT_REQUEST_TIMEOUT),
            Some(0) => Err(SettingsError::NotPositive {
                name: "request_timeout_secs",
            }),
            Some(secs) => Ok(Duration::from_secs(secs)),
        }
    }

    /// Read cache capacity.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::NotPositive`] for a zero capacity.
    pub fn cache_capacity(&self) -> Result<usize, SettingsError> {
        match self.cache_capacity {
            None => Ok(DEFAULT_CACHE_CAPACITY),
            Some(0) => Err(SettingsError::NotPositive {
                name: "cache_capacity",
            }),
            Some(capacity) => Ok(capacity),
        }
    }
}
