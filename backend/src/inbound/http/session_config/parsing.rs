//! Environment parsing helpers for session configuration.

use actix_web::cookie::SameSite;
use mockable::Env;
use tracing::warn;

use super::{
    BuildMode, DEFAULT_SESSION_TTL_MINUTES, MAX_SESSION_TTL_MINUTES, SAMESITE_ENV,
    SessionConfigError, TTL_MINUTES_ENV,
};

const BOOL_EXPECTED: &str = "1|0|true|false|yes|no|y|n";
const SAMESITE_EXPECTED: &str = "Strict|Lax|None";
const TTL_EXPECTED: &str = "whole minutes between 1 and 43200";

/// Name and debug fallback of a boolean toggle.
pub(super) struct BoolEnvConfig {
    name: &'static str,
    default_value: bool,
}

impl BoolEnvConfig {
    pub(super) const fn new(name: &'static str, default_value: bool) -> Self {
        Self {
            name,
            default_value,
        }
    }
}

/// Read a boolean toggle, then let `value_validator` veto the parsed flag.
pub(super) fn parse_bool_env<E: Env, F>(
    env: &E,
    mode: BuildMode,
    config: BoolEnvConfig,
    value_validator: F,
) -> Result<bool, SessionConfigError>
where
    F: FnOnce(bool, BuildMode) -> Result<bool, SessionConfigError>,
{
    let default_label = if config.default_value {
        "enabled"
    } else {
        "disabled"
    };
    let Some(value) = env.string(config.name) else {
        return debug_warn_or_error(
            mode,
            config.default_value,
            SessionConfigError::MissingEnv { name: config.name },
            || warn!("{} not set; defaulting to {}", config.name, default_label),
        );
    };
    match parse_bool(&value) {
        Some(flag) => value_validator(flag, mode),
        None => debug_warn_or_error(
            mode,
            config.default_value,
            SessionConfigError::InvalidEnv {
                name: config.name,
                value: value.clone(),
                expected: BOOL_EXPECTED,
            },
            || {
                warn!(
                    value = %value,
                    "invalid {}; defaulting to {}",
                    config.name,
                    default_label
                );
            },
        ),
    }
}

/// Debug builds log and take `fallback`; release builds fail with `error`.
pub(super) fn debug_warn_or_error<T, F>(
    mode: BuildMode,
    fallback: T,
    error: SessionConfigError,
    warn_fn: F,
) -> Result<T, SessionConfigError>
where
    F: FnOnce(),
{
    if mode.is_debug() {
        warn_fn();
        Ok(fallback)
    } else {
        Err(error)
    }
}

pub(super) fn parse_same_site_value(
    value: String,
    mode: BuildMode,
    cookie_secure: bool,
    default_same_site: SameSite,
) -> Result<SameSite, SessionConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "lax" => Ok(SameSite::Lax),
        "strict" => Ok(SameSite::Strict),
        "none" => {
            validate_same_site_none(mode, cookie_secure)?;
            Ok(SameSite::None)
        }
        _ => debug_warn_or_error(
            mode,
            default_same_site,
            SessionConfigError::InvalidEnv {
                name: SAMESITE_ENV,
                value: value.clone(),
                expected: SAMESITE_EXPECTED,
            },
            || warn!(value = %value, "invalid SESSION_SAMESITE, using default"),
        ),
    }
}

fn validate_same_site_none(mode: BuildMode, cookie_secure: bool) -> Result<(), SessionConfigError> {
    if cookie_secure {
        return Ok(());
    }

    debug_warn_or_error(mode, (), SessionConfigError::InsecureSameSiteNone, || {
        warn!("SESSION_SAMESITE=None with SESSION_COOKIE_SECURE=0; browsers may reject the cookie");
    })
}

/// Parse a session lifetime in minutes.
pub(super) fn parse_ttl(value: String, mode: BuildMode) -> Result<i64, SessionConfigError> {
    match value.trim().parse::<i64>() {
        Ok(minutes) if (1..=MAX_SESSION_TTL_MINUTES).contains(&minutes) => Ok(minutes),
        _ => debug_warn_or_error(
            mode,
            DEFAULT_SESSION_TTL_MINUTES,
            SessionConfigError::InvalidEnv {
                name: TTL_MINUTES_ENV,
                value: value.clone(),
                expected: TTL_EXPECTED,
            },
            || warn!(value = %value, "invalid SESSION_TTL_MINUTES, using default"),
        ),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}
