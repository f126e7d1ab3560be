//! Session Store: the only owner of the persisted [`Session`].
//!
//! Reads never fail. An absent, undecodable or expired payload reads as an
//! anonymous session; expired payloads are also erased so the next response
//! drops the cookie.

use std::sync::Arc;

use mockable::Clock;
use tracing::warn;

use crate::domain::ports::SessionStorage;
use crate::domain::session_codec;
use crate::domain::{Error, Session, SessionView};

/// Request-scoped session store over a [`SessionStorage`] adapter.
pub struct SessionStore<S> {
    storage: S,
    clock: Arc<dyn Clock>,
}

impl<S: SessionStorage> SessionStore<S> {
    /// Store over `storage`, using `clock` for expiry checks.
    pub fn new(storage: S, clock: Arc<dyn Clock>) -> Self {
        Self { storage, clock }
    }

    /// Current session, or anonymous.
    pub fn read(&self) -> Session {
        let raw = match self.storage.load() {
            Ok(Some(raw)) => raw,
            Ok(None) => return Session::anonymous(),
            Err(error) => {
                warn!(%error, "session storage unreadable; treating as anonymous");
                return Session::anonymous();
            }
        };

        let session = match session_codec::decode(&raw) {
            Ok(session) => session,
            Err(error) => {
                warn!(%error, "discarding undecodable session");
                self.storage.erase();
                return Session::anonymous();
            }
        };

        if session.is_expired(self.clock.utc()) {
            self.storage.erase();
            return Session::anonymous();
        }
        session
    }

    /// Persist `session`. Writing an anonymous session clears storage.
    pub fn write(&self, session: &Session) -> Result<(), Error> {
        if !session.is_logged_in() {
            self.clear();
            return Ok(());
        }
        let encoded = session_codec::encode(session)
            .map_err(|error| Error::internal(format!("session encode failed: {error}")))?;
        self.storage
            .save(encoded)
            .map_err(|error| Error::internal(error.to_string()))
    }

    /// Erase the persisted session.
    pub fn clear(&self) {
        self.storage.erase();
    }

    /// Credential-free projection of the current session.
    pub fn view(&self) -> SessionView {
        self.read().view()
    }
}
