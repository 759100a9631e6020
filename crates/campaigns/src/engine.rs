//! Campaign engine: business rules + value movement orchestration.
//!
//! ## Operation flow
//!
//! ```text
//! caller
//!   ↓
//! 1. Enter reentrancy guard (value-moving operations only)
//!   ↓
//! 2. Validate preconditions against a store snapshot (no mutation yet)
//!   ↓
//! 3. Move value through the TransferService + mutate the LedgerStore
//!   ↓
//! 4. Publish the notification envelope (best-effort, after commit)
//! ```
//!
//! Every operation either commits completely or fails with no observable effect. Donations
//! are collected before they are booked; if booking fails, the balance is put back and the
//! donor refunded. Withdrawal zeroes the balance before paying out and restores it if the
//! payout fails. When a compensating step fails too, both errors are logged and returned.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crowdfund_core::{Address, Amount, CampaignId, Clock, DomainError, DomainResult, Timestamp};
use crowdfund_events::{Event, EventBus, EventEnvelope};

use crate::campaign::{Campaign, CampaignDraft};
use crate::config::{EngineConfig, StatusPolicy, WithdrawalPolicy};
use crate::event::{CampaignCreated, CampaignEvent, Donation, Withdrawal, business_time};
use crate::guard::{GuardToken, ReentrancyGuard};
use crate::store::LedgerStore;
use crate::transfer::TransferService;

/// Notification unit published by the engine.
pub type CampaignEnvelope = EventEnvelope<CampaignEvent>;

/// The crowdfunding ledger's public entry points.
///
/// Store, transfers and clock are trait objects so a transfer implementation can hold an
/// `Arc` back to the engine (the reentrancy scenario). The bus is generic because its
/// error type is associated.
pub struct CampaignEngine<B> {
    store: Arc<dyn LedgerStore>,
    transfers: Arc<dyn TransferService>,
    clock: Arc<dyn Clock>,
    bus: B,
    config: EngineConfig,
    guard: ReentrancyGuard,
    sequence: AtomicU64,
}

impl<B> core::fmt::Debug for CampaignEngine<B> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CampaignEngine")
            .field("config", &self.config)
            .field("guard", &self.guard)
            .field("sequence", &self.sequence)
            .finish_non_exhaustive()
    }
}

impl<B> CampaignEngine<B>
where
    B: EventBus<CampaignEnvelope>,
{
    pub fn new(
        store: Arc<dyn LedgerStore>,
        transfers: Arc<dyn TransferService>,
        clock: Arc<dyn Clock>,
        bus: B,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            transfers,
            clock,
            bus,
            config,
            guard: ReentrancyGuard::new(),
            sequence: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Register a new campaign owned by `caller` and return its id.
    ///
    /// `target` and `deadline` are not validated; a past deadline yields a campaign that can
    /// never receive donations through `donate_to_campaign`.
    pub fn create_campaign(
        &self,
        caller: &Address,
        title: impl Into<String>,
        description: impl Into<String>,
        target: Amount,
        deadline: Timestamp,
    ) -> DomainResult<CampaignId> {
        if caller.is_zero() {
            return Err(DomainError::InvalidCaller);
        }

        let id = self.store.append(CampaignDraft {
            owner: *caller,
            title: title.into(),
            description: description.into(),
            target_amount: target,
            deadline,
        })?;

        let now = self.clock.now();
        info!(campaign_id = %id, owner = %caller, target = %target, deadline, "campaign created");
        self.emit(CampaignEvent::CampaignCreated(CampaignCreated {
            campaign_id: id,
            owner: *caller,
            target_amount: target,
            deadline,
            occurred_at: business_time(now),
        }));

        Ok(id)
    }

    /// Contribute `amount` from `contributor` to campaign `id`.
    ///
    /// Preconditions, in order: the campaign exists (`NotFound`), it is active
    /// (`CampaignInactive`), the amount is positive (`ZeroContribution`).
    pub fn donate_to_campaign(
        &self,
        id: CampaignId,
        amount: Amount,
        contributor: &Address,
    ) -> DomainResult<()> {
        let _entered = self.enter("donate_to_campaign")?;

        let campaign = self.store.get(id)?;
        let now = self.clock.now();
        if !campaign.is_active_at(now) {
            return Err(DomainError::inactive(campaign.deadline, now));
        }
        if amount.is_zero() {
            return Err(DomainError::ZeroContribution);
        }

        self.credit(&campaign, amount, contributor, now)
    }

    /// Bare transfer: value sent without naming an operation.
    ///
    /// Credits the configured sentinel campaign (0 by default) and skips the activity and
    /// zero-amount checks that `donate_to_campaign` applies. The sentinel campaign must
    /// exist in the store.
    pub fn receive(&self, from: &Address, amount: Amount) -> DomainResult<()> {
        let _entered = self.enter("receive")?;

        let campaign = self.store.get(self.config.bare_transfer_campaign)?;
        let now = self.clock.now();
        debug!(campaign_id = %campaign.campaign_id, donor = %from, amount = %amount, "bare transfer");

        self.credit(&campaign, amount, from, now)
    }

    /// Pay the whole balance of campaign `id` out to its owner and return the amount paid.
    ///
    /// Under the default policy any caller may trigger this; the funds still only go to the
    /// owner.
    pub fn withdraw_donations_for_a_campaign(
        &self,
        caller: &Address,
        id: CampaignId,
    ) -> DomainResult<Amount> {
        let _entered = self.enter("withdraw_donations_for_a_campaign")?;

        let campaign = self.store.get(id)?;
        let owner_only = self.config.withdrawal_policy == WithdrawalPolicy::OwnerOnly;
        if owner_only && *caller != campaign.owner {
            return Err(DomainError::Unauthorized);
        }

        let amount = campaign.amount_realised;
        if amount.is_zero() {
            return Err(DomainError::NothingToWithdraw);
        }

        // Zero before paying out; a callback during `send` sees an empty balance.
        self.store.update_amount(id, Amount::ZERO)?;

        if let Err(e) = self.transfers.send(&campaign.owner, amount) {
            if let Err(restore) = self.store.update_amount(id, amount) {
                error!(
                    campaign_id = %id,
                    owner = %campaign.owner,
                    amount = %amount,
                    "payout failed ({e}) and balance restore failed ({restore}); amount held in custody"
                );
                return Err(DomainError::transfer_failed(format!(
                    "{e}; balance restore failed: {restore}"
                )));
            }
            warn!(campaign_id = %id, owner = %campaign.owner, amount = %amount, "payout failed, balance restored: {e}");
            return Err(DomainError::transfer_failed(e.to_string()));
        }

        let now = self.clock.now();
        info!(campaign_id = %id, owner = %campaign.owner, caller = %caller, amount = %amount, "donations withdrawn");
        self.emit(CampaignEvent::Withdrawal(Withdrawal {
            owner: campaign.owner,
            campaign_id: id,
            amount,
            occurred_at: business_time(now),
        }));

        Ok(amount)
    }

    /// Every campaign, in creation order.
    pub fn get_all_campaigns(&self) -> DomainResult<Vec<Campaign>> {
        let now = self.clock.now();
        let campaigns = self.store.list_all()?;
        debug!(count = campaigns.len(), "listing campaigns");
        Ok(campaigns.into_iter().map(|c| self.present(c, now)).collect())
    }

    pub fn get_a_particular_campaign(&self, id: CampaignId) -> DomainResult<Campaign> {
        let campaign = self.store.get(id)?;
        Ok(self.present(campaign, self.clock.now()))
    }

    /// Contributor history of campaign `id`; `NotFound` for an unknown id.
    pub fn get_donors(&self, id: CampaignId) -> DomainResult<Vec<Address>> {
        self.store.get(id)?;
        self.store.list_contributors(id)
    }

    /// Contributor history of campaign `id` without an existence check: an unknown id
    /// yields an empty list.
    pub fn get_all_donors(&self, id: CampaignId) -> DomainResult<Vec<Address>> {
        self.store.list_contributors(id)
    }

    pub fn has_contributed(&self, id: CampaignId, contributor: &Address) -> DomainResult<bool> {
        self.store.has_contributed(id, contributor)
    }

    pub fn campaign_count(&self) -> DomainResult<u64> {
        self.store.len()
    }

    /// Current engine time.
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Diagnostic: engine time plus one second. No effect on state.
    pub fn timestamp_plus_one(&self) -> Timestamp {
        self.clock.now().saturating_add(1)
    }

    fn enter(&self, operation: &'static str) -> DomainResult<GuardToken<'_>> {
        self.guard.enter().inspect_err(|_| {
            warn!(operation, "reentrant call rejected");
        })
    }

    /// Collect `amount` into custody, then book it against `campaign`.
    fn credit(
        &self,
        campaign: &Campaign,
        amount: Amount,
        contributor: &Address,
        now: Timestamp,
    ) -> DomainResult<()> {
        let id = campaign.campaign_id;
        let total = campaign
            .amount_realised
            .checked_add(amount)
            .ok_or(DomainError::Overflow)?;

        self.transfers.collect(contributor, amount).map_err(|e| {
            warn!(campaign_id = %id, donor = %contributor, amount = %amount, "collect failed: {e}");
            DomainError::transfer_failed(e.to_string())
        })?;

        if let Err(e) = self.book(campaign, total, contributor) {
            self.refund(id, contributor, amount);
            return Err(e);
        }

        info!(campaign_id = %id, donor = %contributor, amount = %amount, total = %total, "donation accepted");
        self.emit(CampaignEvent::Donation(Donation {
            amount,
            donor: *contributor,
            campaign_id: id,
            occurred_at: business_time(now),
        }));

        Ok(())
    }

    /// Store the new balance and the contributor entry together; the balance is put back if
    /// the entry cannot be written.
    fn book(&self, campaign: &Campaign, total: Amount, contributor: &Address) -> DomainResult<()> {
        let id = campaign.campaign_id;
        self.store.update_amount(id, total)?;

        if let Err(e) = self.store.record_contribution(id, *contributor) {
            if let Err(restore) = self.store.update_amount(id, campaign.amount_realised) {
                error!(campaign_id = %id, "balance restore failed after {e}: {restore}");
            }
            return Err(e);
        }
        Ok(())
    }

    /// Return a collected amount to its donor after the booking failed.
    fn refund(&self, id: CampaignId, contributor: &Address, amount: Amount) {
        match self.transfers.send(contributor, amount) {
            Ok(()) => warn!(campaign_id = %id, donor = %contributor, amount = %amount, "booking failed, donation refunded"),
            Err(e) => error!(
                campaign_id = %id,
                donor = %contributor,
                amount = %amount,
                "booking failed and refund failed ({e}); amount held in custody"
            ),
        }
    }

    fn present(&self, mut campaign: Campaign, now: Timestamp) -> Campaign {
        if self.config.status_policy == StatusPolicy::Derived {
            campaign.status = campaign.derived_status(now);
        }
        campaign
    }

    fn emit(&self, event: CampaignEvent) {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let campaign_id = event.campaign_id();
        let envelope = EventEnvelope::new(Uuid::now_v7(), campaign_id, sequence, event);

        if let Err(e) = self.bus.publish(envelope) {
            warn!(campaign_id = %campaign_id, sequence, "notification publish failed: {e}");
        }
    }
}
