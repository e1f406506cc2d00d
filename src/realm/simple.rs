//! In-memory map-backed realm with Argon2 password credentials. Useful for
//! embedders that keep a small static user table, and as the reference realm
//! in tests.

use std::collections::{HashMap, HashSet};

use anyhow::{anyhow, Result};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use parking_lot::RwLock;
use password_hash::{PasswordHash, SaltString};

use super::{AuthenticatedRealmIdentity, RealmIdentity, SecurityRealm};
use crate::domain::{CredentialSupport, SupportLevel};
use crate::error::RealmUnavailable;

/// Credential type name understood by this realm.
pub const PASSWORD_CREDENTIAL: &str = "password";

#[derive(Debug, Clone)]
struct UserEntry {
    password_phc: Option<String>,
    roles: HashSet<String>,
}

#[derive(Default)]
pub struct SimpleMapRealm {
    users: RwLock<HashMap<String, UserEntry>>,
}

fn hash_password(password: &str) -> Result<String> {
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes).map_err(|e| anyhow!(e.to_string()))?;
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| anyhow!(e.to_string()))?;
    let argon2 = Argon2::default();
    let phc = argon2.hash_password(password.as_bytes(), &salt).map_err(|e| anyhow!(e.to_string()))?.to_string();
    Ok(phc)
}

fn verify_password(hash: &str, password: &str) -> bool {
    if let Ok(parsed) = PasswordHash::new(hash) {
        let argon2 = Argon2::default();
        argon2.verify_password(password.as_bytes(), &parsed).is_ok()
    } else { false }
}

impl SimpleMapRealm {
    pub fn new() -> Self { Self::default() }

    /// Register a user with an Argon2-hashed password and a set of raw roles.
    /// Re-registering a name replaces the previous entry.
    pub fn add_user(&self, name: &str, password: &str, roles: &[&str]) -> Result<()> {
        let phc = hash_password(password)?;
        let entry = UserEntry {
            password_phc: Some(phc),
            roles: roles.iter().map(|r| r.to_string()).collect(),
        };
        self.users.write().insert(name.to_string(), entry);
        Ok(())
    }

    /// Register a user with roles but no stored credential.
    pub fn add_user_without_password(&self, name: &str, roles: &[&str]) {
        let entry = UserEntry {
            password_phc: None,
            roles: roles.iter().map(|r| r.to_string()).collect(),
        };
        self.users.write().insert(name.to_string(), entry);
    }

    pub fn remove_user(&self, name: &str) -> bool {
        self.users.write().remove(name).is_some()
    }

    /// Concrete handle for callers that need the realm-specific surface
    /// (password verification, the authenticated facet). Snapshots the entry
    /// at call time.
    pub fn user(&self, name: &str) -> SimpleRealmUser {
        let entry = self.users.read().get(name).cloned();
        SimpleRealmUser { name: name.to_string(), entry }
    }
}

pub struct SimpleRealmUser {
    name: String,
    entry: Option<UserEntry>,
}

impl SimpleRealmUser {
    /// Verify a plaintext password against the stored Argon2 hash. Users
    /// without a stored credential never verify.
    pub fn verify_password(&self, password: &str) -> bool {
        match self.entry.as_ref().and_then(|e| e.password_phc.as_deref()) {
            Some(phc) => verify_password(phc, password),
            None => false,
        }
    }
}

impl RealmIdentity for SimpleRealmUser {
    fn name(&self) -> &str { &self.name }

    fn exists(&self) -> Result<bool, RealmUnavailable> {
        Ok(self.entry.is_some())
    }
}

impl AuthenticatedRealmIdentity for SimpleRealmUser {
    fn roles(&self) -> HashSet<String> {
        self.entry.as_ref().map(|e| e.roles.clone()).unwrap_or_default()
    }
}

impl SecurityRealm for SimpleMapRealm {
    fn create_identity(&self, name: &str) -> Result<Box<dyn RealmIdentity>, RealmUnavailable> {
        let user = self.user(name);
        tracing::debug!(target: "realmgate::realm", "simple.create_identity name={} exists={}", name, user.entry.is_some());
        Ok(Box::new(user))
    }

    fn credential_support(&self, credential_type: &str) -> Result<CredentialSupport, RealmUnavailable> {
        // Hashes are never handed out; verification depends on the identity,
        // so the realm-level answer stays at "possibly".
        if credential_type == PASSWORD_CREDENTIAL {
            Ok(CredentialSupport::new(SupportLevel::Unsupported, SupportLevel::PossiblySupported))
        } else {
            Ok(CredentialSupport::UNSUPPORTED)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_round_trip() {
        let realm = SimpleMapRealm::new();
        realm.add_user("alice", "s3cr3t!", &["user"]).unwrap();
        let user = realm.user("alice");
        assert!(user.verify_password("s3cr3t!"), "correct password should verify");
        assert!(!user.verify_password("wrong"), "wrong password must not verify");
    }

    #[test]
    fn unknown_user_handle_does_not_exist() {
        let realm = SimpleMapRealm::new();
        let user = realm.user("ghost");
        assert_eq!(user.exists().unwrap(), false);
        assert!(!user.verify_password("anything"));
        assert!(user.roles().is_empty());
    }

    #[test]
    fn credential_support_for_password_type() {
        let realm = SimpleMapRealm::new();
        let support = realm.credential_support(PASSWORD_CREDENTIAL).unwrap();
        assert_eq!(support.obtainable, SupportLevel::Unsupported);
        assert_eq!(support.verifiable, SupportLevel::PossiblySupported);
        assert_eq!(realm.credential_support("x509").unwrap(), CredentialSupport::UNSUPPORTED);
    }
}
