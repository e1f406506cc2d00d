//! Realm-facing contracts. A realm is a backing identity/credential store
//! addressed by name within a domain; the domain never inspects a concrete
//! implementation beyond these traits.

mod simple;

pub use simple::{SimpleMapRealm, SimpleRealmUser, PASSWORD_CREDENTIAL};

use std::collections::HashSet;

use crate::domain::CredentialSupport;
use crate::error::RealmUnavailable;

/// A pluggable identity store.
pub trait SecurityRealm: Send + Sync {
    /// Obtain a handle to the identity registered under `name` in this realm.
    /// The handle may refer to a principal that does not exist.
    fn create_identity(&self, name: &str) -> Result<Box<dyn RealmIdentity>, RealmUnavailable>;

    /// Report this realm's support for a credential type.
    fn credential_support(&self, credential_type: &str) -> Result<CredentialSupport, RealmUnavailable>;
}

/// Opaque reference to a principal's record inside a specific realm, used for
/// subsequent authentication steps.
pub trait RealmIdentity: Send {
    fn name(&self) -> &str;

    fn exists(&self) -> Result<bool, RealmUnavailable> {
        Ok(true)
    }
}

impl std::fmt::Debug for dyn RealmIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealmIdentity").field("name", &self.name()).finish()
    }
}

/// Post-authentication facet of an identity: the source of raw (zeroth-order,
/// unmapped) authorization roles.
pub trait AuthenticatedRealmIdentity: Send + Sync {
    fn roles(&self) -> HashSet<String>;
}
