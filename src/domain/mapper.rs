use std::collections::HashSet;
use std::sync::Arc;

use once_cell::sync::Lazy;

/// Chooses which realm should handle a (rewritten) authentication name.
/// Returning `None` means "no opinion"; the domain falls through to its
/// default realm.
pub trait RealmMapper: Send + Sync {
    fn realm_mapping(&self, name: &str) -> Option<String>;
}

impl<F> RealmMapper for F
where
    F: Fn(&str) -> Option<String> + Send + Sync,
{
    fn realm_mapping(&self, name: &str) -> Option<String> {
        self(name)
    }
}

/// Has no opinion for any name.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRealmMapper;

impl RealmMapper for DefaultRealmMapper {
    fn realm_mapping(&self, _name: &str) -> Option<String> {
        None
    }
}

/// Maps a set of role names to another set of role names. No contract that
/// sizes match; a mapper may drop, add or rename roles.
pub trait RoleMapper: Send + Sync {
    fn map_roles(&self, roles: HashSet<String>) -> HashSet<String>;
}

impl<F> RoleMapper for F
where
    F: Fn(HashSet<String>) -> HashSet<String> + Send + Sync,
{
    fn map_roles(&self, roles: HashSet<String>) -> HashSet<String> {
        self(roles)
    }
}

/// Returns its input unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityRoleMapper;

impl RoleMapper for IdentityRoleMapper {
    fn map_roles(&self, roles: HashSet<String>) -> HashSet<String> {
        roles
    }
}

static IDENTITY_ROLE_MAPPER: Lazy<Arc<dyn RoleMapper>> = Lazy::new(|| Arc::new(IdentityRoleMapper));

/// Shared identity mapper, used wherever a role mapper was not configured.
pub fn identity_role_mapper() -> Arc<dyn RoleMapper> {
    IDENTITY_ROLE_MAPPER.clone()
}
