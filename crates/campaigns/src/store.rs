//! Ledger store: ordered campaign records + per-campaign contributor data.
//!
//! Pure data structure with invariants and no policy. The engine validates before it
//! mutates.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use crowdfund_core::{Address, Amount, CampaignId, DomainError, DomainResult};

use crate::campaign::{Campaign, CampaignDraft};

/// Append-only campaign storage.
///
/// ## Invariants
///
/// - Campaign ids are dense, start at 0 and equal the campaign's position in `list_all()`.
/// - Campaigns are never removed; only `amount_realised` ever changes after `append`.
/// - Contributor history is append-only per campaign and keeps duplicates (one entry per
///   contribution); membership collapses them.
///
/// Errors other than `NotFound` are unrecoverable storage faults.
pub trait LedgerStore: Send + Sync {
    /// Store `draft` at the next sequential id and return that id.
    fn append(&self, draft: CampaignDraft) -> DomainResult<CampaignId>;

    /// Snapshot of one campaign, `NotFound` if `id >= len`.
    fn get(&self, id: CampaignId) -> DomainResult<Campaign>;

    /// Number of campaigns ever created.
    fn len(&self) -> DomainResult<u64>;

    fn is_empty(&self) -> DomainResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Overwrite `amount_realised` in place.
    fn update_amount(&self, id: CampaignId, amount: Amount) -> DomainResult<()>;

    /// Append `contributor` to the campaign's history and mark membership.
    fn record_contribution(&self, id: CampaignId, contributor: Address) -> DomainResult<()>;

    /// All campaigns, insertion order.
    fn list_all(&self) -> DomainResult<Vec<Campaign>>;

    /// Full contributor history, insertion order, duplicates kept.
    ///
    /// No existence check: an unknown id has an empty history.
    fn list_contributors(&self, id: CampaignId) -> DomainResult<Vec<Address>>;

    fn has_contributed(&self, id: CampaignId, contributor: &Address) -> DomainResult<bool>;
}

impl<S> LedgerStore for Arc<S>
where
    S: LedgerStore + ?Sized,
{
    fn append(&self, draft: CampaignDraft) -> DomainResult<CampaignId> {
        (**self).append(draft)
    }

    fn get(&self, id: CampaignId) -> DomainResult<Campaign> {
        (**self).get(id)
    }

    fn len(&self) -> DomainResult<u64> {
        (**self).len()
    }

    fn update_amount(&self, id: CampaignId, amount: Amount) -> DomainResult<()> {
        (**self).update_amount(id, amount)
    }

    fn record_contribution(&self, id: CampaignId, contributor: Address) -> DomainResult<()> {
        (**self).record_contribution(id, contributor)
    }

    fn list_all(&self) -> DomainResult<Vec<Campaign>> {
        (**self).list_all()
    }

    fn list_contributors(&self, id: CampaignId) -> DomainResult<Vec<Address>> {
        (**self).list_contributors(id)
    }

    fn has_contributed(&self, id: CampaignId, contributor: &Address) -> DomainResult<bool> {
        (**self).has_contributed(id, contributor)
    }
}

#[derive(Debug, Default)]
struct LedgerState {
    campaigns: Vec<Campaign>,
    contributors: HashMap<CampaignId, Vec<Address>>,
    members: HashMap<CampaignId, HashSet<Address>>,
}

impl LedgerState {
    fn slot(&self, id: CampaignId) -> DomainResult<usize> {
        id.index()
            .filter(|&i| i < self.campaigns.len())
            .ok_or(DomainError::NotFound)
    }
}

/// In-memory ledger store.
///
/// Each call takes the lock for its own duration only, so no lock is held while the
/// engine talks to the transfer service.
#[derive(Debug, Default)]
pub struct InMemoryLedgerStore {
    inner: RwLock<LedgerState>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> DomainResult<std::sync::RwLockReadGuard<'_, LedgerState>> {
        self.inner
            .read()
            .map_err(|_| DomainError::storage("ledger lock poisoned"))
    }

    fn write(&self) -> DomainResult<std::sync::RwLockWriteGuard<'_, LedgerState>> {
        self.inner
            .write()
            .map_err(|_| DomainError::storage("ledger lock poisoned"))
    }
}

impl LedgerStore for InMemoryLedgerStore {
    fn append(&self, draft: CampaignDraft) -> DomainResult<CampaignId> {
        let mut state = self.write()?;
        let id = CampaignId::new(state.campaigns.len() as u64);
        state.campaigns.push(draft.into_campaign(id));
        Ok(id)
    }

    fn get(&self, id: CampaignId) -> DomainResult<Campaign> {
        let state = self.read()?;
        let slot = state.slot(id)?;
        Ok(state.campaigns[slot].clone())
    }

    fn len(&self) -> DomainResult<u64> {
        Ok(self.read()?.campaigns.len() as u64)
    }

    fn update_amount(&self, id: CampaignId, amount: Amount) -> DomainResult<()> {
        let mut state = self.write()?;
        let slot = state.slot(id)?;
        state.campaigns[slot].amount_realised = amount;
        Ok(())
    }

    fn record_contribution(&self, id: CampaignId, contributor: Address) -> DomainResult<()> {
        let mut state = self.write()?;
        state.slot(id)?;
        state.contributors.entry(id).or_default().push(contributor);
        state.members.entry(id).or_default().insert(contributor);
        Ok(())
    }

    fn list_all(&self) -> DomainResult<Vec<Campaign>> {
        Ok(self.read()?.campaigns.clone())
    }

    fn list_contributors(&self, id: CampaignId) -> DomainResult<Vec<Address>> {
        Ok(self
            .read()?
            .contributors
            .get(&id)
            .cloned()
            .unwrap_or_default())
    }

    fn has_contributed(&self, id: CampaignId, contributor: &Address) -> DomainResult<bool> {
        Ok(self
            .read()?
            .members
            .get(&id)
            .is_some_and(|set| set.contains(contributor)))
    }
}
