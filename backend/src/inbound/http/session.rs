//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! [`ActixSessionStorage`] stores the encoded session under one key of the
//! encrypted actix cookie; [`SessionContext`] wraps it in a
//! [`SessionStore`] so handlers only see domain sessions.

use std::sync::Arc;

use actix_session::Session as CookieSession;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;
use mockable::{Clock, DefaultClock};

use crate::domain::ports::{SessionStorage, SessionStorageError};
use crate::domain::{Error, Session, SessionStore, SessionView};
use crate::inbound::http::state::HttpState;

pub(crate) const SESSION_KEY: &str = "storefront_session";

/// [`SessionStorage`] over the actix cookie session.
pub struct ActixSessionStorage(CookieSession);

impl ActixSessionStorage {
    /// Wrap the request's cookie session.
    pub fn new(session: CookieSession) -> Self {
        Self(session)
    }
}

impl SessionStorage for ActixSessionStorage {
    fn load(&self) -> Result<Option<String>, SessionStorageError> {
        self.0
            .get::<String>(SESSION_KEY)
            .map_err(|error| SessionStorageError::read(error.to_string()))
    }

    fn save(&self, encoded: String) -> Result<(), SessionStorageError> {
        // A new principal gets a fresh cookie.
        self.0.renew();
        self.0
            .insert(SESSION_KEY, encoded)
            .map_err(|error| SessionStorageError::write(error.to_string()))
    }

    fn erase(&self) {
        self.0.purge();
    }
}

/// Request-scoped session access for handlers.
pub struct SessionContext {
    store: SessionStore<ActixSessionStorage>,
}

impl SessionContext {
    /// Construct a context from the underlying actix session.
    pub fn new(session: CookieSession, clock: Arc<dyn Clock>) -> Self {
        Self {
            store: SessionStore::new(ActixSessionStorage::new(session), clock),
        }
    }

    /// Current session; anonymous when absent, undecodable or expired.
    pub fn session(&self) -> Session {
        self.store.read()
    }

    /// Credential-free projection of the current session.
    pub fn view(&self) -> SessionView {
        self.store.view()
    }

    /// Persist `session` in the cookie.
    pub fn persist(&self, session: &Session) -> Result<(), Error> {
        self.store.write(session)
    }

    /// Drop the session cookie.
    pub fn clear(&self) {
        self.store.clear();
    }

    /// Current session, or `401 Unauthorized` when nobody is logged in.
    pub fn require_login(&self) -> Result<Session, Error> {
        let session = self.session();
        session.require_login()?;
        Ok(session)
    }

    /// Current session, or `401`/`403` unless it belongs to an admin.
    pub fn require_admin(&self) -> Result<Session, Error> {
        let session = self.session();
        session.require_admin()?;
        Ok(session)
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let clock: Arc<dyn Clock> = match req.app_data::<web::Data<HttpState>>() {
            Some(state) => state.clock.clone(),
            None => Arc::new(DefaultClock),
        };
        let fut = CookieSession::from_request(req, payload);
        Box::pin(async move { fut.await.map(|session| SessionContext::new(session, clock)) })
    }
}
