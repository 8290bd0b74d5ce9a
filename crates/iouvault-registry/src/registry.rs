//! Channel registry: the source of truth for channel records.
//!
//! Records are never deleted. Mutations go through [`ChannelRegistry::commit`],
//! which refuses any update that would change a channel's terms or lower its
//! nonce, so a buggy transition cannot corrupt the record.

use std::collections::HashMap;

use iouvault_types::{Address, AddressExt, Channel, ChannelTerms, Result, VaultError};

use crate::Tenancy;

/// Channel records keyed by custodied resource.
pub struct ChannelRegistry {
    tenancy: Tenancy,
    channels: HashMap<Address, Channel>,
}

impl ChannelRegistry {
    /// Registry in which every resource shares `terms`.
    ///
    /// # Errors
    /// Returns [`VaultError::InvalidTerms`] if `terms` fail validation.
    pub fn single_tenant(terms: ChannelTerms) -> Result<Self> {
        terms.validate()?;
        Ok(Self {
            tenancy: Tenancy::Single(terms),
            channels: HashMap::new(),
        })
    }

    /// Registry in which every resource carries its own terms.
    #[must_use]
    pub fn multi_tenant() -> Self {
        Self {
            tenancy: Tenancy::Multi,
            channels: HashMap::new(),
        }
    }

    #[must_use]
    pub fn tenancy(&self) -> &Tenancy {
        &self.tenancy
    }

    /// Register `resource` with its own terms (multi-tenant).
    ///
    /// # Errors
    /// - `WrongTenancy` on a single-tenant registry
    /// - `NotRecipient` unless `caller == terms.recipient`
    /// - `InvalidTerms` for zero/duplicate roles or a bad timeout
    /// - `ChannelAlreadyRegistered` if `resource` is taken
    pub fn register(
        &mut self,
        caller: Address,
        resource: Address,
        terms: ChannelTerms,
    ) -> Result<&Channel> {
        self.tenancy.require_multi()?;
        self.insert(caller, resource, terms)
    }

    /// Register `resource` under the registry's fixed terms (single-tenant).
    ///
    /// # Errors
    /// - `WrongTenancy` on a multi-tenant registry
    /// - `NotRecipient` unless `caller` is the fixed recipient
    /// - `ChannelAlreadyRegistered` if `resource` is taken
    pub fn register_inherited(&mut self, caller: Address, resource: Address) -> Result<&Channel> {
        let terms = self.tenancy.fixed_terms()?;
        self.insert(caller, resource, terms)
    }

    fn insert(
        &mut self,
        caller: Address,
        resource: Address,
        terms: ChannelTerms,
    ) -> Result<&Channel> {
        if caller != terms.recipient {
            tracing::warn!(
                caller = %caller.short(),
                resource = %resource.short(),
                "Registration rejected: caller is not the recipient"
            );
            return Err(VaultError::NotRecipient { caller });
        }
        if resource.is_zero() {
            return Err(VaultError::InvalidTerms {
                reason: "resource is the zero address".to_string(),
            });
        }
        terms.validate()?;
        if self.channels.contains_key(&resource) {
            return Err(VaultError::ChannelAlreadyRegistered(resource));
        }

        tracing::info!(
            resource = %resource.short(),
            user = %terms.user.short(),
            recipient = %terms.recipient.short(),
            signer = %terms.signer.short(),
            timeout = terms.timeout,
            tenancy = self.tenancy.name(),
            "Channel registered"
        );
        let channel: &Channel = self
            .channels
            .entry(resource)
            .or_insert_with(|| Channel::new(terms));
        Ok(channel)
    }

    /// Full record for `resource`, or the zero-valued record if unregistered.
    #[must_use]
    pub fn get(&self, resource: Address) -> Channel {
        self.channels.get(&resource).cloned().unwrap_or_default()
    }

    /// Borrow the record for `resource` if registered.
    #[must_use]
    pub fn channel(&self, resource: Address) -> Option<&Channel> {
        self.channels.get(&resource)
    }

    /// Load a registered channel for a transition.
    ///
    /// # Errors
    /// Returns [`VaultError::ChannelNotFound`] if `resource` is unregistered.
    pub fn load(&self, resource: Address) -> Result<Channel> {
        self.channels
            .get(&resource)
            .cloned()
            .ok_or(VaultError::ChannelNotFound(resource))
    }

    /// Replace the stored record with `updated`.
    ///
    /// # Errors
    /// - `ChannelNotFound` if `resource` is unregistered
    /// - `Internal` if `updated` changes the terms or lowers `closed_nonce`
    pub fn commit(&mut self, resource: Address, updated: Channel) -> Result<()> {
        let current = self
            .channels
            .get_mut(&resource)
            .ok_or(VaultError::ChannelNotFound(resource))?;

        if current.terms() != updated.terms() {
            return Err(VaultError::Internal(format!(
                "channel {resource:?}: terms are immutable"
            )));
        }
        if updated.closed_nonce < current.closed_nonce {
            return Err(VaultError::Internal(format!(
                "channel {resource:?}: closed_nonce would decrease from {} to {}",
                current.closed_nonce, updated.closed_nonce
            )));
        }

        *current = updated;
        Ok(())
    }

    /// Whether `resource` is registered.
    #[must_use]
    pub fn contains(&self, resource: Address) -> bool {
        self.channels.contains_key(&resource)
    }

    /// Registered resources, sorted.
    #[must_use]
    pub fn resources(&self) -> Vec<Address> {
        let mut resources: Vec<Address> = self.channels.keys().copied().collect();
        resources.sort_unstable();
        resources
    }

    /// Number of registered channels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}
