//! Security-domain policy layer: name rewriting, realm selection, credential
//! support aggregation and role mapping.
//! Keep the public surface thin and split implementation across sub-modules.

mod context;
mod mapper;
mod rewriter;
mod security_domain;
mod support;

pub use context::{SecurityContext, SecurityIdentity, ServerAuthenticationContext};
pub use mapper::{identity_role_mapper, DefaultRealmMapper, IdentityRoleMapper, RealmMapper, RoleMapper};
pub use rewriter::{NameRewriter, PatternRewriter};
pub use security_domain::{Builder, RealmEntry, SecurityDomain};
pub use support::{CredentialSupport, SupportLevel};
