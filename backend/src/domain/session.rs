//! Session model for the current principal.
//!
//! A [`Session`] is either anonymous or authenticated. The bearer credential
//! lives only inside the authenticated variant, so "an access token exists iff
//! the session is logged in" holds by construction. Page-facing code receives
//! a [`SessionView`] instead, which carries identity but never the token.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use zeroize::Zeroizing;

use crate::domain::Error;

/// Role granted to an authenticated principal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular customer.
    #[default]
    User,
    /// Back-office operator.
    Admin,
}

/// Validation errors raised by session identity newtypes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionValidationError {
    /// The user id was blank.
    #[error("user id must not be empty")]
    EmptyUserId,
    /// The username was blank.
    #[error("username must not be empty")]
    EmptyUsername,
    /// The access token was blank.
    #[error("access token must not be empty")]
    EmptyAccessToken,
}

/// Backend-assigned user identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Validate and wrap a raw identifier.
    pub fn new(raw: impl Into<String>) -> Result<Self, SessionValidationError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(SessionValidationError::EmptyUserId);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for UserId {
    type Error = SessionValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

/// Display username of a principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Validate and wrap a raw username.
    pub fn new(raw: impl Into<String>) -> Result<Self, SessionValidationError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(SessionValidationError::EmptyUsername);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for Username {
    type Error = SessionValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

/// Bearer credential issued by the backend.
///
/// The value is zeroised on drop and redacted from `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(Zeroizing<String>);

impl AccessToken {
    /// Wrap a raw token, rejecting blank values.
    pub fn new(raw: impl Into<String>) -> Result<Self, SessionValidationError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(SessionValidationError::EmptyAccessToken);
        }
        Ok(Self(Zeroizing::new(raw)))
    }

    /// Expose the raw token for the `Authorization` header.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(**redacted**)")
    }
}

/// Identity of an authenticated principal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Backend user id.
    pub user_id: UserId,
    /// Display username.
    pub username: Username,
    /// Granted role.
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum SessionState {
    Anonymous,
    Authenticated {
        principal: Principal,
        access_token: AccessToken,
        expires_at: Option<DateTime<Utc>>,
    },
}

/// Server-held record of the current principal's login state.
///
/// # Examples
/// ```
/// use storefront::domain::{AccessToken, Principal, Role, Session, UserId, Username};
///
/// let anonymous = Session::anonymous();
/// assert!(!anonymous.is_logged_in());
/// assert!(anonymous.access_token().is_none());
///
/// let principal = Principal {
///     user_id: UserId::new("u-1").unwrap(),
///     username: Username::new("miso").unwrap(),
///     role: Role::User,
/// };
/// let session = Session::authenticated(principal, AccessToken::new("tok").unwrap(), None);
/// assert!(session.is_logged_in());
/// assert_eq!(session.access_token().map(|t| t.expose()), Some("tok"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session(SessionState);

impl Default for Session {
    fn default() -> Self {
        Self::anonymous()
    }
}

impl Session {
    /// A logged-out session.
    pub const fn anonymous() -> Self {
        Self(SessionState::Anonymous)
    }

    /// A logged-in session carrying the principal's bearer credential.
    pub fn authenticated(
        principal: Principal,
        access_token: AccessToken,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self(SessionState::Authenticated {
            principal,
            access_token,
            expires_at,
        })
    }

    /// Whether a principal is logged in.
    pub fn is_logged_in(&self) -> bool {
        matches!(self.0, SessionState::Authenticated { .. })
    }

    /// The authenticated principal, if any.
    pub fn principal(&self) -> Option<&Principal> {
        match &self.0 {
            SessionState::Authenticated { principal, .. } => Some(principal),
            SessionState::Anonymous => None,
        }
    }

    /// The bearer credential, present iff logged in.
    pub fn access_token(&self) -> Option<&AccessToken> {
        match &self.0 {
            SessionState::Authenticated { access_token, .. } => Some(access_token),
            SessionState::Anonymous => None,
        }
    }

    /// Credential expiry recorded at login, if the backend supplied one.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        match &self.0 {
            SessionState::Authenticated { expires_at, .. } => *expires_at,
            SessionState::Anonymous => None,
        }
    }

    /// Role of the principal; anonymous sessions report [`Role::User`].
    pub fn role(&self) -> Role {
        self.principal().map_or(Role::User, |principal| principal.role)
    }

    /// Whether the credential has expired at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|expiry| expiry <= now)
    }

    /// Require a logged-in principal or fail with `401 Unauthorized`.
    pub fn require_login(&self) -> Result<&Principal, Error> {
        self.principal()
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    /// Require an admin principal; anonymous callers get `401`, others `403`.
    pub fn require_admin(&self) -> Result<&Principal, Error> {
        let principal = self.require_login()?;
        if principal.role == Role::Admin {
            Ok(principal)
        } else {
            Err(Error::forbidden("admin role required"))
        }
    }

    /// Read-only projection safe to expose to page scripts.
    pub fn view(&self) -> SessionView {
        match self.principal() {
            Some(principal) => SessionView {
                is_logged_in: true,
                role: principal.role,
                user_id: Some(principal.user_id.to_string()),
                username: Some(principal.username.as_ref().to_owned()),
            },
            None => SessionView {
                is_logged_in: false,
                role: Role::User,
                user_id: None,
                username: None,
            },
        }
    }
}

/// Client-visible subset of a [`Session`]. Never carries the credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SessionView {
    /// Whether a principal is logged in.
    #[serde(rename = "isLoggedIn")]
    pub is_logged_in: bool,
    /// Role of the principal.
    pub role: Role,
    /// Backend user id.
    pub user_id: Option<String>,
    /// Display username.
    pub username: Option<String>,
}
