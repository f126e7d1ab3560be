//! Storage port for the encoded session.
//!
//! The storage medium (encrypted cookie, server-side table) sits behind this
//! trait so the Session Store never knows where bytes live. Adapters are
//! request-scoped and need not be `Send`.

use super::define_port_error;

define_port_error! {
    /// Errors raised by session storage adapters.
    pub enum SessionStorageError {
        /// Reading the stored payload failed.
        Read { message: String } => "session storage read failed: {message}",
        /// Persisting the payload failed.
        Write { message: String } => "session storage write failed: {message}",
    }
}

/// Request-scoped session storage.
#[cfg_attr(test, mockall::automock)]
pub trait SessionStorage {
    /// Load the encoded session, if one is stored.
    fn load(&self) -> Result<Option<String>, SessionStorageError>;

    /// Persist an encoded session, replacing any previous one.
    fn save(&self, encoded: String) -> Result<(), SessionStorageError>;

    /// Remove the stored session.
    fn erase(&self);
}
