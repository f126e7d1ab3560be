//! Session cookie configuration parsing and validation.
//!
//! Cookie toggles come from the environment rather than
//! [`StorefrontSettings`](crate::config::StorefrontSettings) because the key
//! material is mounted as a secret file next to them. Debug builds warn and
//! fall back to safe defaults; release builds refuse to start on missing or
//! invalid values.

use std::path::PathBuf;

use actix_web::cookie::time::Duration as CookieDuration;
use actix_web::cookie::{Key, SameSite};
use mockable::Env;
use tracing::warn;
use zeroize::Zeroize;

pub mod fingerprint;
mod parsing;
#[cfg(test)]
mod test_utils;

use parsing::{BoolEnvConfig, debug_warn_or_error, parse_bool_env, parse_same_site_value, parse_ttl};

const SESSION_KEY_DEFAULT_PATH: &str = "/var/run/secrets/session_key";
/// Shortest key file accepted by release builds.
pub const SESSION_KEY_MIN_LEN: usize = 64;
/// Shortest key material `Key::derive_from` accepts; applies to debug builds.
const KEY_DERIVE_MIN_LEN: usize = 32;
/// Session lifetime applied when `SESSION_TTL_MINUTES` is unset.
pub const DEFAULT_SESSION_TTL_MINUTES: i64 = 120;
/// Longest accepted session lifetime (30 days).
pub const MAX_SESSION_TTL_MINUTES: i64 = 43_200;

/// Whether session cookies carry the `Secure` flag.
pub const COOKIE_SECURE_ENV: &str = "SESSION_COOKIE_SECURE";
/// `SameSite` policy for session cookies.
pub const SAMESITE_ENV: &str = "SESSION_SAMESITE";
/// Permit a generated key when the key file is unreadable.
pub const ALLOW_EPHEMERAL_ENV: &str = "SESSION_ALLOW_EPHEMERAL";
/// Path to the session key material.
pub const KEY_FILE_ENV: &str = "SESSION_KEY_FILE";
/// Session lifetime in minutes, refreshed on every request.
pub const TTL_MINUTES_ENV: &str = "SESSION_TTL_MINUTES";

/// Build mode for session configuration validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Debug builds tolerate defaults and emit warnings for missing toggles.
    Debug,
    /// Release builds require explicit, valid session toggles.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Validated session cookie settings.
#[derive(Clone)]
pub struct SessionSettings {
    /// Signing and encryption key for cookie sessions.
    pub key: Key,
    /// Whether session cookies are marked `Secure`.
    pub cookie_secure: bool,
    /// Configured `SameSite` policy for session cookies.
    pub same_site: SameSite,
    /// Idle lifetime of a session cookie.
    pub ttl: CookieDuration,
}

impl SessionSettings {
    /// Fingerprint of the active key, safe to log.
    pub fn key_fingerprint(&self) -> String {
        fingerprint::key_fingerprint(&self.key)
    }
}

/// Errors raised while validating session configuration.
#[derive(thiserror::Error, Debug)]
pub enum SessionConfigError {
    /// A required environment variable is missing.
    #[error("missing required environment variable: {name}")]
    MissingEnv { name: &'static str },
    /// A variable is present but contains an invalid value.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    /// Reading the session key file failed.
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The session key file exists but is too short for release builds.
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
    /// `SameSite=None` requires a secure cookie setting in release builds.
    #[error("SESSION_SAMESITE=None requires SESSION_COOKIE_SECURE=1")]
    InsecureSameSiteNone,
    /// Release builds must not allow ephemeral session keys.
    #[error("SESSION_ALLOW_EPHEMERAL must be 0 in release builds")]
    EphemeralNotAllowed,
}

/// Build session settings from environment variables and build mode.
///
/// # Examples
///
/// ```rust
/// use storefront::inbound::http::session_config::{
///     session_settings_from_env, BuildMode,
/// };
/// use mockable::MockEnv;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let key_path = std::env::temp_dir().join("storefront_session_key_example");
/// std::fs::write(&key_path, vec![b'k'; 64])?;
///
/// let key_path = key_path.to_string_lossy().into_owned();
/// let mut env = MockEnv::new();
/// env.expect_string()
///     .returning(move |name| match name {
///         "SESSION_KEY_FILE" => Some(key_path.clone()),
///         "SESSION_COOKIE_SECURE" => Some("1".to_owned()),
///         "SESSION_SAMESITE" => Some("Lax".to_owned()),
///         "SESSION_ALLOW_EPHEMERAL" => Some("0".to_owned()),
///         "SESSION_TTL_MINUTES" => Some("30".to_owned()),
///         _ => None,
///     });
///
/// let settings = session_settings_from_env(&env, BuildMode::Release)?;
/// assert!(settings.cookie_secure);
/// assert_eq!(settings.ttl.whole_minutes(), 30);
/// # Ok(())
/// # }
/// ```
pub fn session_settings_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
) -> Result<SessionSettings, SessionConfigError> {
    let cookie_secure = parse_bool_env(
        env,
        mode,
        BoolEnvConfig::new(COOKIE_SECURE_ENV, true),
        |flag, _| Ok(flag),
    )?;
    let same_site = same_site_from_env(env, mode, cookie_secure)?;
    let allow_ephemeral = parse_bool_env(
        env,
        mode,
        BoolEnvConfig::new(ALLOW_EPHEMERAL_ENV, false),
        |flag, build| {
            if flag && !build.is_debug() {
                Err(SessionConfigError::EphemeralNotAllowed)
            } else {
                Ok(flag)
            }
        },
    )?;
    let ttl = ttl_from_env(env, mode)?;
    let key = session_key_from_env(env, mode, allow_ephemeral)?;

    Ok(SessionSettings {
        key,
        cookie_secure,
        same_site,
        ttl,
    })
}

fn same_site_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
    cookie_secure: bool,
) -> Result<SameSite, SessionConfigError> {
    let default_same_site = if mode.is_debug() {
        SameSite::Lax
    } else {
        SameSite::Strict
    };
    match env.string(SAMESITE_ENV) {
        Some(value) => parse_same_site_value(value, mode, cookie_secure, default_same_site),
        None => debug_warn_or_error(
            mode,
            default_same_site,
            SessionConfigError::MissingEnv { name: SAMESITE_ENV },
            || warn!("SESSION_SAMESITE not set; using default"),
        ),
    }
}

fn ttl_from_env<E: Env>(env: &E, mode: BuildMode) -> Result<CookieDuration, SessionConfigError> {
    let minutes = match env.string(TTL_MINUTES_ENV) {
        Some(value) => parse_ttl(value, mode)?,
        None => DEFAULT_SESSION_TTL_MINUTES,
    };
    Ok(CookieDuration::minutes(minutes))
}

fn session_key_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
    allow_ephemeral: bool,
) -> Result<Key, SessionConfigError> {
    let path = PathBuf::from(
        env.string(KEY_FILE_ENV)
            .unwrap_or_else(|| SESSION_KEY_DEFAULT_PATH.to_owned()),
    );

    match std::fs::read(&path) {
        Ok(mut bytes) => {
            let length = bytes.len();
            let min_len = if mode.is_debug() {
                KEY_DERIVE_MIN_LEN
            } else {
                SESSION_KEY_MIN_LEN
            };
            if length < min_len {
                bytes.zeroize();
                return Err(SessionConfigError::KeyTooShort {
                    path,
                    length,
                    min_len,
                });
            }
            let key = Key::derive_from(&bytes);
            bytes.zeroize();
            Ok(key)
        }
        Err(error) if mode.is_debug() || allow_ephemeral => {
            warn!(
                path = %path.display(),
                error = %error,
                "using temporary session key (dev only)"
            );
            Ok(Key::generate())
        }
        Err(error) => Err(SessionConfigError::KeyRead {
            path,
            source: error,
        }),
    }
}
