//! Identity resolution pipeline tests: rewrite ordering, realm selection,
//! default fallback and failure propagation.

use std::sync::Arc;

use parking_lot::Mutex;
use regex::Regex;

use realmgate::domain::{CredentialSupport, PatternRewriter, SecurityDomain};
use realmgate::error::{AuthError, RealmUnavailable};
use realmgate::realm::{RealmIdentity, SecurityRealm};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Records every name it was asked to create an identity for.
#[derive(Default)]
struct RecordingRealm {
    created: Mutex<Vec<String>>,
}

impl RecordingRealm {
    fn created(&self) -> Vec<String> {
        self.created.lock().clone()
    }
}

struct RecordedIdentity(String);

impl RealmIdentity for RecordedIdentity {
    fn name(&self) -> &str { &self.0 }
}

impl SecurityRealm for RecordingRealm {
    fn create_identity(&self, name: &str) -> Result<Box<dyn RealmIdentity>, RealmUnavailable> {
        self.created.lock().push(name.to_string());
        Ok(Box::new(RecordedIdentity(name.to_string())))
    }

    fn credential_support(&self, _credential_type: &str) -> Result<CredentialSupport, RealmUnavailable> {
        Ok(CredentialSupport::UNSUPPORTED)
    }
}

/// Always reports its backing store as unreachable.
struct UnavailableRealm;

impl SecurityRealm for UnavailableRealm {
    fn create_identity(&self, _name: &str) -> Result<Box<dyn RealmIdentity>, RealmUnavailable> {
        Err(RealmUnavailable::new("ldap backend down"))
    }

    fn credential_support(&self, _credential_type: &str) -> Result<CredentialSupport, RealmUnavailable> {
        Err(RealmUnavailable::new("ldap backend down"))
    }
}

#[test]
fn mapper_with_no_opinion_selects_default_realm() {
    init_tracing();
    let ldap = Arc::new(RecordingRealm::default());
    let local = Arc::new(RecordingRealm::default());

    let domain = SecurityDomain::builder()
        .add_realm("ldap", ldap.clone())
        .add_realm("local", local.clone())
        .default_realm_name("local")
        .build()
        .unwrap();

    let identity = domain.resolve("bob").unwrap();
    assert_eq!(identity.name(), "bob");
    assert_eq!(local.created(), vec!["bob".to_string()], "default realm should create the identity");
    assert!(ldap.created().is_empty(), "non-default realm must not be consulted");
}

#[test]
fn mapper_naming_unknown_realm_falls_back_to_default() {
    let local = Arc::new(RecordingRealm::default());

    let domain = SecurityDomain::builder()
        .add_realm("local", local.clone())
        .default_realm_name("local")
        .realm_mapper(|_name: &str| Some("ghost".to_string()))
        .build()
        .unwrap();

    domain.resolve("bob").unwrap();
    assert_eq!(local.created(), vec!["bob".to_string()], "stale mapping should land on the default realm");
}

#[test]
fn rewriters_compose_and_selection_uses_pre_realm_name_only() {
    init_tracing();
    let alpha = Arc::new(RecordingRealm::default());
    let local = Arc::new(RecordingRealm::default());

    let domain = SecurityDomain::builder()
        .add_realm("alpha", alpha.clone())
        .add_realm("local", local.clone())
        .default_realm_name("local")
        .add_pre_realm_rewriter(|n: &str| n.to_lowercase())
        .add_pre_realm_rewriter(PatternRewriter::new(Regex::new("@.*$").unwrap(), ""))
        .add_post_realm_rewriter(|n: &str| format!("u:{}", n))
        // selects by the *pre-rewritten* name; the post-realm prefix would
        // break this mapping if selection saw it
        .realm_mapper(|name: &str| name.starts_with('a').then(|| "alpha".to_string()))
        .build()
        .unwrap();

    domain.resolve("Alice@Example.COM").unwrap();
    assert_eq!(alpha.created(), vec!["u:alice".to_string()], "final name must be post(pre(name))");
    assert!(local.created().is_empty());

    domain.resolve("Bob@Example.COM").unwrap();
    assert_eq!(local.created(), vec!["u:bob".to_string()]);
}

#[test]
fn pre_realm_rewriters_apply_in_registration_order() {
    let local = Arc::new(RecordingRealm::default());

    // suffix then prefix is distinguishable from prefix then suffix
    let domain = SecurityDomain::builder()
        .add_realm("local", local.clone())
        .default_realm_name("local")
        .add_pre_realm_rewriter(|n: &str| format!("{}-1", n))
        .add_pre_realm_rewriter(|n: &str| format!("{}-2", n))
        .build()
        .unwrap();

    domain.resolve("x").unwrap();
    assert_eq!(local.created(), vec!["x-1-2".to_string()]);
}

#[test]
fn resolve_propagates_realm_unavailability() {
    let domain = SecurityDomain::builder()
        .add_realm("ldap", Arc::new(UnavailableRealm))
        .default_realm_name("ldap")
        .build()
        .unwrap();

    let err = domain.resolve("bob").unwrap_err();
    match err {
        AuthError::Realm { message, .. } => {
            assert_eq!(message, "ldap backend down", "realm failure must pass through unchanged");
        }
        other => panic!("expected Realm error, got {:?}", other),
    }
}

#[test]
fn later_realm_registration_replaces_earlier_one() {
    let first = Arc::new(RecordingRealm::default());
    let second = Arc::new(RecordingRealm::default());

    let domain = SecurityDomain::builder()
        .add_realm("local", first.clone())
        .add_realm("local", second.clone())
        .default_realm_name("local")
        .build()
        .unwrap();

    domain.resolve("bob").unwrap();
    assert!(first.created().is_empty(), "replaced realm must not receive requests");
    assert_eq!(second.created(), vec!["bob".to_string()]);
}

#[test]
fn authentication_context_is_bound_to_the_domain() {
    let local = Arc::new(RecordingRealm::default());
    let domain = SecurityDomain::builder()
        .add_realm("local", local.clone())
        .default_realm_name("local")
        .build()
        .unwrap();

    let ctx = domain.create_authentication_context();
    assert_eq!(ctx.domain().default_realm_name(), "local");
    assert!(!ctx.domain().is_anonymous_allowed());

    // each call yields an independent workflow with an empty identity slot
    let other = domain.create_authentication_context();
    assert!(other.security_context().current().is_none());
}
