//! Unified error model for domain construction and request-time failures.
//! Realm unavailability gets its own small type at the realm trait boundary
//! so that aggregation code can treat a failing realm as an explicit value
//! rather than a caught panic.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// The backing store for a realm cannot currently answer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RealmUnavailable {
    pub message: String,
}

impl RealmUnavailable {
    pub fn new<S: Into<String>>(message: S) -> Self { RealmUnavailable { message: message.into() } }
}

impl Display for RealmUnavailable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "realm unavailable: {}", self.message)
    }
}

impl std::error::Error for RealmUnavailable {}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthError {
    /// Construction-time invariant violation; reported at the offending call.
    Config { code: String, message: String },
    /// Realm unavailability surfaced from the single-target resolution path.
    Realm { code: String, message: String },
    /// Programming-usage error, e.g. role mapping without a current identity.
    IllegalState { code: String, message: String },
}

impl AuthError {
    pub fn code_str(&self) -> &str {
        match self {
            AuthError::Config { code, .. }
            | AuthError::Realm { code, .. }
            | AuthError::IllegalState { code, .. } => code.as_str(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AuthError::Config { message, .. }
            | AuthError::Realm { message, .. }
            | AuthError::IllegalState { message, .. } => message.as_str(),
        }
    }

    pub fn config<C: Into<String>, M: Into<String>>(code: C, msg: M) -> Self {
        AuthError::Config { code: code.into(), message: msg.into() }
    }
    pub fn realm<C: Into<String>, M: Into<String>>(code: C, msg: M) -> Self {
        AuthError::Realm { code: code.into(), message: msg.into() }
    }
    pub fn illegal_state<C: Into<String>, M: Into<String>>(code: C, msg: M) -> Self {
        AuthError::IllegalState { code: code.into(), message: msg.into() }
    }
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code_str(), self.message())
    }
}

impl std::error::Error for AuthError {}

pub type AuthResult<T> = Result<T, AuthError>;

impl From<RealmUnavailable> for AuthError {
    fn from(err: RealmUnavailable) -> Self {
        // resolution does not isolate realm failures; carry the message verbatim
        AuthError::Realm { code: "realm_unavailable".into(), message: err.message }
    }
}
