use std::cell::RefCell;
use std::collections::HashSet;
use std::sync::Arc;

use crate::error::AuthResult;
use crate::realm::AuthenticatedRealmIdentity;

use super::security_domain::SecurityDomain;

/// Authenticated principal bound to an execution context, the subject of
/// role mapping. Cheap to clone.
#[derive(Clone)]
pub struct SecurityIdentity {
    authenticated: Arc<dyn AuthenticatedRealmIdentity>,
}

impl SecurityIdentity {
    pub fn new(authenticated: Arc<dyn AuthenticatedRealmIdentity>) -> Self {
        SecurityIdentity { authenticated }
    }

    pub fn authenticated_realm_identity(&self) -> &Arc<dyn AuthenticatedRealmIdentity> {
        &self.authenticated
    }
}

/// Per-execution-context register holding the current identity.
///
/// This type is deliberately not `Sync`: each execution context owns its own
/// `SecurityContext`, so a value set in one context can never be observed
/// from another, and `get_and_set` is atomic with respect to the owning
/// context's own sequential operations.
#[derive(Default)]
pub struct SecurityContext {
    current: RefCell<Option<SecurityIdentity>>,
}

impl SecurityContext {
    pub fn new() -> Self {
        SecurityContext::default()
    }

    pub fn current(&self) -> Option<SecurityIdentity> {
        self.current.borrow().clone()
    }

    /// Unconditional overwrite.
    pub fn set(&self, identity: SecurityIdentity) {
        *self.current.borrow_mut() = Some(identity);
    }

    /// Overwrite and return whatever was present immediately before,
    /// including "none".
    pub fn get_and_set(&self, identity: SecurityIdentity) -> Option<SecurityIdentity> {
        self.current.borrow_mut().replace(identity)
    }

    pub fn clear(&self) {
        *self.current.borrow_mut() = None;
    }
}

/// A single authentication workflow bound to one domain. The mechanism
/// protocol itself lives in the surrounding transport layer; this carries
/// the domain handle and the context-local identity slot.
pub struct ServerAuthenticationContext {
    domain: SecurityDomain,
    context: SecurityContext,
}

impl ServerAuthenticationContext {
    pub(crate) fn new(domain: SecurityDomain) -> Self {
        ServerAuthenticationContext { domain, context: SecurityContext::new() }
    }

    pub fn domain(&self) -> &SecurityDomain {
        &self.domain
    }

    pub fn security_context(&self) -> &SecurityContext {
        &self.context
    }

    /// Bind the identity produced by an authentication protocol to this
    /// workflow's context.
    pub fn set_authenticated(&self, identity: SecurityIdentity) {
        self.context.set(identity);
    }

    /// Roles of the bound identity after realm-level and domain-level
    /// mapping.
    pub fn effective_roles(&self) -> AuthResult<HashSet<String>> {
        self.domain.effective_roles(&self.context)
    }
}
