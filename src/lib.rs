//! Authentication-domain resolver: selects the realm responsible for a raw
//! principal name, aggregates credential-capability information across the
//! realms of a domain, and applies two-stage role mapping to the identity
//! bound to the current execution context.
//! Keep the public surface thin and split implementation across sub-modules.

pub mod domain;
pub mod error;
pub mod realm;
