//! Registry tenancy: who fixes the channel terms.

use iouvault_types::{ChannelTerms, Result, VaultError};
use serde::{Deserialize, Serialize};

/// How channel terms are assigned within one registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tenancy {
    /// One set of terms for every resource.
    Single(ChannelTerms),
    /// Terms supplied per resource at registration.
    Multi,
}

impl Tenancy {
    /// Stable upper-case name, used in errors and logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Single(_) => "SINGLE_TENANT",
            Self::Multi => "MULTI_TENANT",
        }
    }

    /// The scope-wide terms of a single-tenant registry.
    ///
    /// # Errors
    /// Returns [`VaultError::WrongTenancy`] for a multi-tenant registry.
    pub fn fixed_terms(&self) -> Result<ChannelTerms> {
        match self {
            Self::Single(terms) => Ok(*terms),
            Self::Multi => Err(VaultError::WrongTenancy {
                expected: "SINGLE_TENANT",
                actual: self.name(),
            }),
        }
    }

    /// Guard for calls that supply their own terms.
    ///
    /// # Errors
    /// Returns [`VaultError::WrongTenancy`] for a single-tenant registry.
    pub fn require_multi(&self) -> Result<()> {
        match self {
            Self::Multi => Ok(()),
            Self::Single(_) => Err(VaultError::WrongTenancy {
                expected: "MULTI_TENANT",
                actual: self.name(),
            }),
        }
    }
}
