//! Authentication inputs and the login response contract.
//!
//! Handlers build [`LoginCredentials`] or [`Registration`] from raw strings
//! before anything reaches the backend, and [`LoginGrant`] turns the
//! backend's login body into a [`Session`].

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use zeroize::Zeroizing;

use crate::domain::{AccessToken, Principal, Role, Session, UserId, Username};

/// Errors raised when authentication payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthValidationError {
    /// Username was missing or blank once trimmed.
    #[error("username must not be empty")]
    EmptyUsername,
    /// Password was blank.
    #[error("password must not be empty")]
    EmptyPassword,
    /// Password is shorter than the registration minimum.
    #[error("password must be at least {min} characters")]
    PasswordTooShort {
        /// Minimum accepted length.
        min: usize,
    },
    /// Email address is not plausibly valid.
    #[error("email address is invalid")]
    InvalidEmail,
}

impl AuthValidationError {
    /// Name of the offending input field.
    pub const fn field(&self) -> &'static str {
        match self {
            Self::EmptyUsername => "username",
            Self::EmptyPassword | Self::PasswordTooShort { .. } => "password",
            Self::InvalidEmail => "email",
        }
    }
}

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Validated login credentials.
///
/// ## Invariants
/// - `username` is trimmed and non-empty.
/// - `password` is non-empty and keeps caller-provided whitespace.
///
/// # Examples
/// ```
/// use storefront::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" miso ", "hunter22").unwrap();
/// assert_eq!(creds.username(), "miso");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw username/password inputs.
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, AuthValidationError> {
        let normalized = username.trim();
        if normalized.is_empty() {
            return Err(AuthValidationError::EmptyUsername);
        }
        if password.is_empty() {
            return Err(AuthValidationError::EmptyPassword);
        }
        Ok(Self {
            username: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Trimmed username.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Password as provided.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    /// JSON body sent to the backend login endpoint.
    pub fn to_body(&self) -> Value {
        serde_json::json!({
            "username": self.username(),
            "password": self.password(),
        })
    }
}

/// Validated registration form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    credentials: LoginCredentials,
    email: String,
}

impl Registration {
    /// Validate a registration form.
    pub fn try_from_parts(
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<Self, AuthValidationError> {
        let credentials = LoginCredentials::try_from_parts(username, password)?;
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthValidationError::PasswordTooShort {
                min: MIN_PASSWORD_LEN,
            });
        }
        let email = email.trim();
        let plausible = email
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
        if !plausible || email.chars().any(char::is_whitespace) {
            return Err(AuthValidationError::InvalidEmail);
        }
        Ok(Self {
            credentials,
            email: email.to_owned(),
        })
    }

    /// Trimmed email address.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// JSON body sent to the backend registration endpoint.
    pub fn to_body(&self) -> Value {
        serde_json::json!({
            "username": self.credentials.username(),
            "email": self.email(),
            "password": self.credentials.password(),
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LooseId {
    Text(String),
    Number(i64),
}

impl LooseId {
    fn into_string(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Number(number) => number.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GrantUser {
    #[serde(alias = "_id")]
    id: LooseId,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    role: Option<String>,
}

impl GrantUser {
    fn display_name(&mut self) -> String {
        self.username
            .take()
            .or_else(|| self.name.take())
            .or_else(|| self.email.take())
            .unwrap_or_default()
    }
}

/// Successful backend login body.
///
/// Accepts `accessToken`, `access_token` or `token` for the credential and an
/// optional RFC 3339 `expiresAt`. When several spellings are present the
/// first in that order wins.
#[derive(Debug, Deserialize)]
pub struct LoginGrant {
    #[serde(rename = "accessToken", default)]
    access_token_camel: Option<String>,
    #[serde(rename = "access_token", default)]
    access_token_snake: Option<String>,
    #[serde(default)]
    token: Option<String>,
    user: GrantUser,
    #[serde(rename = "expiresAt", default)]
    expires_at_camel: Option<DateTime<Utc>>,
    #[serde(rename = "expires_at", default)]
    expires_at_snake: Option<DateTime<Utc>>,
}

impl LoginGrant {
    /// Build the authenticated session described by the grant.
    pub fn into_session(mut self) -> Result<Session, crate::domain::SessionValidationError> {
        let username = self.user.display_name();
        let role = match self.user.role.as_deref() {
            Some(role) if role.eq_ignore_ascii_case("admin") => Role::Admin,
            _ => Role::User,
        };
        let principal = Principal {
            user_id: UserId::new(self.user.id.into_string())?,
            username: Username::new(username)?,
            role,
        };
        let access_token = self
            .access_token_camel
            .or(self.access_token_snake)
            .or(self.token)
            .unwrap_or_default();
        Ok(Session::authenticated(
            principal,
            AccessToken::new(access_token)?,
            self.expires_at_camel.or(self.expires_at_snake),
        ))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("", "pw", AuthValidationError::EmptyUsername)]
    #[case("   ", "pw", AuthValidationError::EmptyUsername)]
    #[case("user", "", AuthValidationError::EmptyPassword)]
    fn invalid_credentials(
        #[case] username: &str,
        #[case] password: &str,
        #[case] expected: AuthValidationError,
    ) {
        let err = LoginCredentials::try_from_parts(username, password)
            .expect_err("invalid inputs must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn login_body_uses_trimmed_username() {
        let creds = LoginCredentials::try_from_parts("  shio ", " pw ").expect("valid");
        assert_eq!(creds.to_body(), json!({ "username": "shio", "password": " pw " }));
    }

    #[rstest]
    #[case("miso", "miso@example", "longenough", AuthValidationError::InvalidEmail)]
    #[case("miso", "@example.com", "longenough", AuthValidationError::InvalidEmail)]
    #[case("miso", "mi so@example.com", "longenough", AuthValidationError::InvalidEmail)]
    #[case("miso", "miso@example.com", "short", AuthValidationError::PasswordTooShort { min: 8 })]
    fn invalid_registration(
        #[case] username: &str,
        #[case] email: &str,
        #[case] password: &str,
        #[case] expected: AuthValidationError,
    ) {
        let err = Registration::try_from_parts(username, email, password)
            .expect_err("invalid registration");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn grant_accepts_snake_case_token_and_numeric_id() {
        let grant: LoginGrant = serde_json::from_value(json!({
            "access_token": "jwt",
            "user": { "id": 17, "username": "tantan", "role": "ADMIN" },
        }))
        .expect("grant");
        let session = grant.into_session().expect("session");
        assert_eq!(session.role(), Role::Admin);
        assert_eq!(session.view().user_id.as_deref(), Some("17"));
        assert_eq!(session.access_token().map(AccessToken::expose), Some("jwt"));
    }

    #[rstest]
    fn grant_with_several_token_spellings_prefers_camel_case() {
        let grant: LoginGrant = serde_json::from_value(json!({
            "token": "legacy",
            "access_token": "snake",
            "accessToken": "camel",
            "expires_at": "2026-05-01T00:00:00Z",
            "user": { "id": 3, "username": "hakata" },
        }))
        .expect("grant");
        let session = grant.into_session().expect("session");
        assert_eq!(session.access_token().map(AccessToken::expose), Some("camel"));
        assert!(session.expires_at().is_some());
    }

    #[rstest]
    fn grant_without_token_is_rejected() {
        let grant: LoginGrant = serde_json::from_value(json!({
            "user": { "id": 3, "username": "hakata" },
        }))
        .expect("grant");
        assert!(grant.into_session().is_err());
    }

    #[rstest]
    fn grant_falls_back_to_email_for_username() {
        let grant: LoginGrant = serde_json::from_value(json!({
            "accessToken": "jwt",
            "user": { "_id": "u1", "email": "kake@udon.test" },
            "expiresAt": "2026-04-01T00:00:00Z",
        }))
        .expect("grant");
        let session = grant.into_session().expect("session");
        assert_eq!(session.view().username.as_deref(), Some("kake@udon.test"));
        assert_eq!(session.role(), Role::User);
        assert!(session.expires_at().is_some());
    }

    #[rstest]
    fn grant_with_blank_token_is_rejected() {
        let grant: LoginGrant = serde_json::from_value(json!({
            "token": " ",
            "user": { "_id": "u1", "email": "a@b.co" },
        }))
        .expect("grant");
        assert!(grant.into_session().is_err());
    }
}
