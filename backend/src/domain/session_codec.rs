//! Pure encode/decode pair for persisted sessions.
//!
//! The codec only turns a [`Session`] into a string and back. Encryption and
//! the storage medium belong to the [`SessionStorage`] adapter, so either can
//! change without touching callers.
//!
//! [`SessionStorage`]: crate::domain::ports::SessionStorage

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{AccessToken, Principal, Role, Session, UserId, Username};

/// Errors raised while encoding or decoding a persisted session.
#[derive(Debug, thiserror::Error)]
pub enum SessionCodecError {
    /// The payload is not valid session JSON.
    #[error("session payload is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
    /// The payload parsed but breaks the session invariants.
    #[error("session payload is inconsistent: {0}")]
    Inconsistent(&'static str),
}

/// Wire form of a persisted session.
#[derive(Debug, Serialize, Deserialize)]
struct SessionRecord {
    #[serde(rename = "isLoggedIn")]
    is_logged_in: bool,
    #[serde(default)]
    role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    username: Option<String>,
    #[serde(
        rename = "accessToken",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    access_token: Option<String>,
    #[serde(rename = "expiresAt", default, skip_serializing_if = "Option::is_none")]
    expires_at: Option<DateTime<Utc>>,
}

/// Encode a session for persistence.
///
/// # Examples
/// ```
/// use storefront::domain::{session_codec, Session};
///
/// let encoded = session_codec::encode(&Session::anonymous()).unwrap();
/// assert_eq!(encoded, r#"{"isLoggedIn":false,"role":"user"}"#);
/// ```
pub fn encode(session: &Session) -> Result<String, SessionCodecError> {
    let record = match session.principal() {
        Some(principal) => SessionRecord {
            is_logged_in: true,
            role: principal.role,
            user_id: Some(principal.user_id.to_string()),
            username: Some(principal.username.as_ref().to_owned()),
            access_token: session.access_token().map(|token| token.expose().to_owned()),
            expires_at: session.expires_at(),
        },
        None => SessionRecord {
            is_logged_in: false,
            role: Role::User,
            user_id: None,
            username: None,
            access_token: None,
            expires_at: None,
        },
    };
    Ok(serde_json::to_string(&record)?)
}

/// Decode a persisted session, enforcing the token invariant.
pub fn decode(raw: &str) -> Result<Session, SessionCodecError> {
    let record: SessionRecord = serde_json::from_str(raw)?;
    if !record.is_logged_in {
        if record.access_token.is_some() {
            return Err(SessionCodecError::Inconsistent(
                "logged-out session carries an access token",
            ));
        }
        return Ok(Session::anonymous());
    }

    let access_token = record
        .access_token
        .ok_or(SessionCodecError::Inconsistent(
            "logged-in session lacks an access token",
        ))
        .and_then(|raw| {
            AccessToken::new(raw)
                .map_err(|_| SessionCodecError::Inconsistent("access token is blank"))
        })?;
    let user_id = record
        .user_id
        .and_then(|raw| UserId::new(raw).ok())
        .ok_or(SessionCodecError::Inconsistent("logged-in session lacks a user id"))?;
    let username = record
        .username
        .and_then(|raw| Username::new(raw).ok())
        .ok_or(SessionCodecError::Inconsistent("logged-in session lacks a username"))?;

    Ok(Session::authenticated(
        Principal {
            user_id,
            username,
            role: record.role,
        },
        access_token,
        record.expires_at,
    ))
}
