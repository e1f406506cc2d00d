use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use once_cell::sync::Lazy;
use tracing::{debug, info};

use crate::error::{AuthError, AuthResult};
use crate::realm::{RealmIdentity, SecurityRealm};

use super::context::{SecurityContext, ServerAuthenticationContext};
use super::mapper::{identity_role_mapper, DefaultRealmMapper, RealmMapper, RoleMapper};
use super::rewriter::NameRewriter;
use super::support::{CredentialSupport, SupportLevel};

type RewriterChain = Arc<[Arc<dyn NameRewriter>]>;

// Shared empty chain so domains without rewriters carry no allocation.
static NO_REWRITERS: Lazy<RewriterChain> = Lazy::new(|| Arc::from(Vec::<Arc<dyn NameRewriter>>::new()));

/// A realm registration: the store itself plus the realm-level role mapper
/// associated with it.
#[derive(Clone)]
pub struct RealmEntry {
    realm: Arc<dyn SecurityRealm>,
    role_mapper: Arc<dyn RoleMapper>,
}

impl RealmEntry {
    pub fn realm(&self) -> &Arc<dyn SecurityRealm> {
        &self.realm
    }

    pub fn role_mapper(&self) -> &Arc<dyn RoleMapper> {
        &self.role_mapper
    }
}

struct DomainInner {
    realms: HashMap<String, RealmEntry>,
    default_realm_name: String,
    pre_realm_rewriters: RewriterChain,
    post_realm_rewriters: RewriterChain,
    realm_mapper: Arc<dyn RealmMapper>,
    role_mapper: Arc<dyn RoleMapper>,
    anonymous_allowed: bool,
}

/// A security domain: the policy layer between a wire-protocol
/// authentication handler and the realms holding credentials. Immutable once
/// built; clones share the same configuration and may be used from any
/// number of execution contexts without synchronization.
#[derive(Clone)]
pub struct SecurityDomain {
    inner: Arc<DomainInner>,
}

impl std::fmt::Debug for SecurityDomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityDomain")
            .field("default_realm_name", &self.inner.default_realm_name)
            .field("realms", &self.inner.realms.keys().collect::<Vec<_>>())
            .field("anonymous_allowed", &self.inner.anonymous_allowed)
            .finish()
    }
}

impl SecurityDomain {
    pub fn builder() -> Builder {
        Builder::new()
    }

    /// A fresh, independent authentication workflow bound to this domain.
    pub fn create_authentication_context(&self) -> ServerAuthenticationContext {
        ServerAuthenticationContext::new(self.clone())
    }

    /// Whether anonymous login authentication is allowed. Applies to login
    /// protocols only, not transport layer security.
    pub fn is_anonymous_allowed(&self) -> bool {
        self.inner.anonymous_allowed
    }

    pub fn default_realm_name(&self) -> &str {
        &self.inner.default_realm_name
    }

    /// Map a raw authentication name to an identity handle in the realm
    /// responsible for it.
    ///
    /// Pre-realm rewriters run first and their output drives realm
    /// selection; post-realm rewriters then run over that same output to
    /// produce the name handed to the realm. A mapper with no opinion, or
    /// one naming an unknown realm, selects the default realm.
    pub fn resolve(&self, name: &str) -> AuthResult<Box<dyn RealmIdentity>> {
        let inner = &self.inner;

        let mut rewritten = name.to_string();
        for rewriter in inner.pre_realm_rewriters.iter() {
            rewritten = rewriter.rewrite_name(&rewritten);
        }

        let mapped = inner.realm_mapper.realm_mapping(&rewritten);
        let realm_name = mapped.as_deref().unwrap_or(&inner.default_realm_name);
        let (selected, entry) = self.realm_entry(realm_name);

        let mut final_name = rewritten;
        for rewriter in inner.post_realm_rewriters.iter() {
            final_name = rewriter.rewrite_name(&final_name);
        }

        debug!(target: "realmgate::domain", "resolve name={} realm={} final_name={}", name, selected, final_name);
        Ok(entry.realm.create_identity(&final_name)?)
    }

    /// Domain-wide support for a credential type: the conservative join of
    /// every realm that could be queried. Realms that report unavailability
    /// are excluded rather than failing the query; if none could answer the
    /// result is `UNSUPPORTED`.
    pub fn aggregate_support(&self, credential_type: &str) -> CredentialSupport {
        let mut band: Option<(SupportLevel, SupportLevel, SupportLevel, SupportLevel)> = None;

        for (name, entry) in self.inner.realms.iter() {
            match entry.realm.credential_support(credential_type) {
                Ok(support) => {
                    let (o, v) = (support.obtainable, support.verifiable);
                    band = Some(match band {
                        None => (o, o, v, v),
                        Some((o_min, o_max, v_min, v_max)) => {
                            (o_min.min(o), o_max.max(o), v_min.min(v), v_max.max(v))
                        }
                    });
                }
                Err(err) => {
                    debug!(target: "realmgate::domain", "aggregate_support skipping realm={} err={}", name, err);
                }
            }
        }

        match band {
            None => CredentialSupport::UNSUPPORTED,
            Some((o_min, o_max, v_min, v_max)) => CredentialSupport::new(
                SupportLevel::reduce(o_min, o_max),
                SupportLevel::reduce(v_min, v_max),
            ),
        }
    }

    /// Support reported by a single named realm (default fallback applies),
    /// with unavailability converted to `UNSUPPORTED`.
    pub fn support_for(&self, realm_name: &str, credential_type: &str) -> CredentialSupport {
        let (_, entry) = self.realm_entry(realm_name);
        entry
            .realm
            .credential_support(credential_type)
            .unwrap_or(CredentialSupport::UNSUPPORTED)
    }

    /// Roles of the identity bound to `ctx` after both mapping stages:
    /// realm-level first, then domain-level.
    pub fn effective_roles(&self, ctx: &SecurityContext) -> AuthResult<HashSet<String>> {
        let identity = ctx.current().ok_or_else(|| {
            AuthError::illegal_state("no_current_identity", "no security identity bound to the current context")
        })?;

        let raw = identity.authenticated_realm_identity().roles();

        // The realm-level mapper is looked up under the default realm name,
        // not the realm that authenticated the identity. Long-standing
        // behavior; callers depend on it (pinned by tests).
        let (_, entry) = self.realm_entry(&self.inner.default_realm_name);
        let intermediate = entry.role_mapper.map_roles(raw);

        Ok(self.inner.role_mapper.map_roles(intermediate))
    }

    /// Realm lookup with default fallback. Unknown or stale names select the
    /// default realm, which the build-time invariant guarantees is present.
    fn realm_entry(&self, realm_name: &str) -> (&str, &RealmEntry) {
        let inner = &self.inner;
        let found = inner
            .realms
            .get_key_value(realm_name)
            .or_else(|| inner.realms.get_key_value(&inner.default_realm_name));
        let (name, entry) = found.expect("default realm present by construction");
        (name.as_str(), entry)
    }
}

/// Staged configuration for a [`SecurityDomain`].
///
/// `build` consumes the builder, so configuring an already-built domain is a
/// compile-time impossibility rather than a runtime check.
pub struct Builder {
    pre_realm_rewriters: Vec<Arc<dyn NameRewriter>>,
    post_realm_rewriters: Vec<Arc<dyn NameRewriter>>,
    realms: HashMap<String, RealmEntry>,
    default_realm_name: Option<String>,
    realm_mapper: Arc<dyn RealmMapper>,
    role_mapper: Option<Arc<dyn RoleMapper>>,
}

impl Builder {
    fn new() -> Self {
        Builder {
            pre_realm_rewriters: Vec::new(),
            post_realm_rewriters: Vec::new(),
            realms: HashMap::new(),
            default_realm_name: None,
            realm_mapper: Arc::new(DefaultRealmMapper),
            role_mapper: None,
        }
    }

    /// Append a rewriter applied before realm selection.
    pub fn add_pre_realm_rewriter(mut self, rewriter: impl NameRewriter + 'static) -> Self {
        self.pre_realm_rewriters.push(Arc::new(rewriter));
        self
    }

    /// Append a rewriter applied after realm selection.
    pub fn add_post_realm_rewriter(mut self, rewriter: impl NameRewriter + 'static) -> Self {
        self.post_realm_rewriters.push(Arc::new(rewriter));
        self
    }

    pub fn realm_mapper(mut self, mapper: impl RealmMapper + 'static) -> Self {
        self.realm_mapper = Arc::new(mapper);
        self
    }

    /// Domain-level role mapper, the last mapping applied before roles are
    /// returned. Identity mapping when unset.
    pub fn role_mapper(mut self, mapper: impl RoleMapper + 'static) -> Self {
        self.role_mapper = Some(Arc::new(mapper));
        self
    }

    /// Register a realm under `name` with the identity role mapper.
    pub fn add_realm(self, name: &str, realm: Arc<dyn SecurityRealm>) -> Self {
        self.add_realm_entry(name, realm, identity_role_mapper())
    }

    /// Register a realm under `name` with its own realm-level role mapper.
    pub fn add_realm_with_role_mapper(
        self,
        name: &str,
        realm: Arc<dyn SecurityRealm>,
        role_mapper: impl RoleMapper + 'static,
    ) -> Self {
        self.add_realm_entry(name, realm, Arc::new(role_mapper))
    }

    fn add_realm_entry(mut self, name: &str, realm: Arc<dyn SecurityRealm>, role_mapper: Arc<dyn RoleMapper>) -> Self {
        // later registration under the same name replaces the earlier one
        self.realms.insert(name.to_string(), RealmEntry { realm, role_mapper });
        self
    }

    /// Fallback realm whenever mapping yields no realm or an unknown one.
    /// Must name a registered realm by build time.
    pub fn default_realm_name(mut self, name: &str) -> Self {
        self.default_realm_name = Some(name.to_string());
        self
    }

    pub fn build(self) -> AuthResult<SecurityDomain> {
        let default_realm_name = self.default_realm_name.ok_or_else(|| {
            AuthError::config("default_realm_unset", "no default realm name configured")
        })?;
        if !self.realms.contains_key(&default_realm_name) {
            return Err(AuthError::config(
                "default_realm_missing",
                format!("default realm '{}' is not among the configured realms", default_realm_name),
            ));
        }

        let freeze = |chain: Vec<Arc<dyn NameRewriter>>| -> RewriterChain {
            if chain.is_empty() { NO_REWRITERS.clone() } else { Arc::from(chain) }
        };

        info!(target: "realmgate::domain", "security domain built: realms={} default={}", self.realms.len(), default_realm_name);
        Ok(SecurityDomain {
            inner: Arc::new(DomainInner {
                realms: self.realms,
                default_realm_name,
                pre_realm_rewriters: freeze(self.pre_realm_rewriters),
                post_realm_rewriters: freeze(self.post_realm_rewriters),
                realm_mapper: self.realm_mapper,
                role_mapper: self.role_mapper.unwrap_or_else(identity_role_mapper),
                // not configurable; login protocols never get anonymous here
                anonymous_allowed: false,
            }),
        })
    }
}
