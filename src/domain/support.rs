use serde::{Deserialize, Serialize};

/// Certainty rating for whether a credential type can be obtained or
/// verified. Totally ordered: `Unsupported < PossiblySupported < Supported`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupportLevel {
    Unsupported,
    PossiblySupported,
    Supported,
}

impl SupportLevel {
    pub fn is_definitely_supported(self) -> bool {
        self == SupportLevel::Supported
    }

    pub fn may_be_supported(self) -> bool {
        self != SupportLevel::Unsupported
    }

    /// Collapse an observed (min, max) band into a single level: unanimity
    /// keeps the value, anything mixed or uncertain degrades to
    /// `PossiblySupported`.
    pub(crate) fn reduce(min: SupportLevel, max: SupportLevel) -> SupportLevel {
        if min == max {
            min
        } else if max == SupportLevel::Unsupported {
            SupportLevel::Unsupported
        } else if min == SupportLevel::Supported {
            SupportLevel::Supported
        } else {
            SupportLevel::PossiblySupported
        }
    }
}

/// Obtainable/verifiable support pair for one credential type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialSupport {
    pub obtainable: SupportLevel,
    pub verifiable: SupportLevel,
}

impl CredentialSupport {
    pub const UNSUPPORTED: CredentialSupport = CredentialSupport {
        obtainable: SupportLevel::Unsupported,
        verifiable: SupportLevel::Unsupported,
    };

    pub fn new(obtainable: SupportLevel, verifiable: SupportLevel) -> Self {
        CredentialSupport { obtainable, verifiable }
    }

    pub fn is_definitely_verifiable(self) -> bool {
        self.verifiable.is_definitely_supported()
    }

    pub fn may_be_verifiable(self) -> bool {
        self.verifiable.may_be_supported()
    }
}
