use std::sync::{Arc, Mutex, OnceLock, Weak};

use crowdfund_app::{AppConfig, ClockMode, Engine, Ledger};
use crowdfund_campaigns::{
    CampaignEngine, CampaignEvent, EngineConfig, InMemoryLedgerStore, InMemoryTreasury,
    TransferError, TransferService,
};
use crowdfund_core::{Address, Amount, CampaignId, DomainError, DomainResult, ManualClock, Timestamp};
use crowdfund_events::{Event, EventBus, InMemoryEventBus};
use proptest::prelude::*;

const NOW: Timestamp = 1_700_000_000;

fn owner() -> Address {
    Address::from_u128(1)
}

fn donor_a() -> Address {
    Address::from_u128(2)
}

fn donor_b() -> Address {
    Address::from_u128(3)
}

fn ledger() -> Ledger {
    Ledger::build(&AppConfig {
        clock: ClockMode::Manual { start: NOW },
        ..AppConfig::default()
    })
}

#[test]
fn two_donors_then_owner_withdraws_everything_once() {
    let ledger = ledger();
    let listener = ledger.bus.subscribe();
    let engine = &ledger.engine;
    ledger.treasury.fund(donor_a(), Amount::new(40)).unwrap();
    ledger.treasury.fund(donor_b(), Amount::new(70)).unwrap();

    let id = engine
        .create_campaign(&owner(), "Village well", "Clean water", Amount::new(100), NOW + 1_000)
        .unwrap();
    assert_eq!(id, CampaignId(0));

    engine.donate_to_campaign(id, Amount::new(40), &donor_a()).unwrap();
    engine.donate_to_campaign(id, Amount::new(70), &donor_b()).unwrap();

    assert_eq!(
        engine.get_a_particular_campaign(id).unwrap().amount_realised,
        Amount::new(110)
    );
    assert_eq!(engine.get_all_donors(id).unwrap(), vec![donor_a(), donor_b()]);

    assert_eq!(
        engine.withdraw_donations_for_a_campaign(&owner(), id),
        Ok(Amount::new(110))
    );
    assert_eq!(ledger.treasury.balance_of(&owner()), Amount::new(110));
    assert!(engine.get_a_particular_campaign(id).unwrap().amount_realised.is_zero());
    assert_eq!(
        engine.withdraw_donations_for_a_campaign(&owner(), id),
        Err(DomainError::NothingToWithdraw)
    );

    let notifications = listener.drain();
    let types: Vec<_> = notifications.iter().map(|n| n.payload().event_type()).collect();
    assert_eq!(
        types,
        vec![
            "crowdfund.campaign.created",
            "crowdfund.campaign.donation",
            "crowdfund.campaign.donation",
            "crowdfund.campaign.withdrawal",
        ]
    );

    let withdrawals: Vec<_> = notifications
        .iter()
        .filter_map(|n| match n.payload() {
            CampaignEvent::Withdrawal(w) => Some((w.owner, w.campaign_id, w.amount)),
            _ => None,
        })
        .collect();
    assert_eq!(withdrawals, vec![(owner(), id, Amount::new(110))]);
}

#[test]
fn already_expired_campaign_refuses_every_donation() {
    let ledger = ledger();
    let engine = &ledger.engine;
    ledger.treasury.fund(donor_a(), Amount::new(1_000)).unwrap();

    let id = engine
        .create_campaign(&owner(), "Too late", "", Amount::new(10), NOW - 1)
        .unwrap();

    for amount in [0u128, 1, 40, 999] {
        let result = engine.donate_to_campaign(id, Amount::new(amount), &donor_a());
        assert_eq!(result, Err(DomainError::inactive(NOW - 1, NOW)));
    }
    assert_eq!(ledger.treasury.balance_of(&donor_a()), Amount::new(1_000));
    assert!(engine.get_donors(id).unwrap().is_empty());
}

#[test]
fn campaigns_listing_matches_returned_ids() {
    let ledger = ledger();
    let engine = &ledger.engine;

    let ids: Vec<_> = (0..5)
        .map(|i| {
            engine
                .create_campaign(&owner(), format!("c{i}"), "", Amount::new(i), NOW + i as u64)
                .unwrap()
        })
        .collect();

    let listed: Vec<_> = engine
        .get_all_campaigns()
        .unwrap()
        .into_iter()
        .map(|c| (c.campaign_id, c.title))
        .collect();
    let expected: Vec<_> = ids
        .iter()
        .enumerate()
        .map(|(i, id)| (*id, format!("c{i}")))
        .collect();
    assert_eq!(listed, expected);
    assert_eq!(engine.campaign_count().unwrap(), 5);
}

type Reentry = Box<dyn Fn(&Engine) -> DomainResult<()> + Send + Sync>;

/// Treasury that calls back into the engine while a payout is in flight.
struct CallbackTreasury {
    inner: InMemoryTreasury,
    engine: OnceLock<Weak<Engine>>,
    reentry: Reentry,
    /// Each reentrant attempt's result, with the balance visible at that moment.
    observed: Mutex<Vec<(DomainResult<()>, Amount)>>,
}

impl TransferService for CallbackTreasury {
    fn collect(&self, from: &Address, amount: Amount) -> Result<(), TransferError> {
        self.inner.collect(from, amount)
    }

    fn send(&self, to: &Address, amount: Amount) -> Result<(), TransferError> {
        if let Some(engine) = self.engine.get().and_then(Weak::upgrade) {
            let balance = engine
                .get_a_particular_campaign(CampaignId(0))
                .map(|c| c.amount_realised)
                .unwrap_or_default();
            let attempt = (self.reentry)(&*engine);
            self.observed.lock().unwrap().push((attempt, balance));
        }
        self.inner.send(to, amount)
    }
}

fn wired(reentry: Reentry) -> (Arc<Engine>, Arc<CallbackTreasury>) {
    let treasury = Arc::new(CallbackTreasury {
        inner: InMemoryTreasury::new(),
        engine: OnceLock::new(),
        reentry,
        observed: Mutex::new(Vec::new()),
    });
    let engine = Arc::new(CampaignEngine::new(
        Arc::new(InMemoryLedgerStore::new()),
        treasury.clone(),
        Arc::new(ManualClock::new(NOW)),
        Arc::new(InMemoryEventBus::new()),
        EngineConfig::default(),
    ));
    assert!(treasury.engine.set(Arc::downgrade(&engine)).is_ok());

    engine
        .create_campaign(&owner(), "Well", "", Amount::new(100), NOW + 1_000)
        .unwrap();
    treasury.inner.fund(donor_a(), Amount::new(60)).unwrap();
    engine
        .donate_to_campaign(CampaignId(0), Amount::new(50), &donor_a())
        .unwrap();

    (engine, treasury)
}

#[test]
fn reentrant_withdrawal_during_payout_is_rejected() {
    let (engine, treasury) = wired(Box::new(|engine: &Engine| {
        engine
            .withdraw_donations_for_a_campaign(&owner(), CampaignId(0))
            .map(|_| ())
    }));

    let paid = engine.withdraw_donations_for_a_campaign(&owner(), CampaignId(0));

    assert_eq!(paid, Ok(Amount::new(50)));
    assert_eq!(
        *treasury.observed.lock().unwrap(),
        vec![(Err(DomainError::ReentrantCall), Amount::ZERO)]
    );
    assert_eq!(treasury.inner.balance_of(&owner()), Amount::new(50));
    assert!(
        engine
            .get_a_particular_campaign(CampaignId(0))
            .unwrap()
            .amount_realised
            .is_zero()
    );

    // Guard released: later operations go through.
    engine
        .donate_to_campaign(CampaignId(0), Amount::new(10), &donor_a())
        .unwrap();
}

#[test]
fn reentrant_donation_during_payout_is_rejected() {
    let (engine, treasury) = wired(Box::new(|engine: &Engine| {
        engine.donate_to_campaign(CampaignId(0), Amount::new(10), &donor_a())
    }));

    assert_eq!(
        engine.withdraw_donations_for_a_campaign(&owner(), CampaignId(0)),
        Ok(Amount::new(50))
    );
    assert_eq!(
        *treasury.observed.lock().unwrap(),
        vec![(Err(DomainError::ReentrantCall), Amount::ZERO)]
    );
    assert_eq!(engine.get_all_donors(CampaignId(0)).unwrap(), vec![donor_a()]);
    assert_eq!(treasury.inner.balance_of(&donor_a()), Amount::new(10));
}

#[test]
fn reads_during_payout_are_allowed() {
    let (engine, treasury) = wired(Box::new(|engine: &Engine| {
        engine.get_all_campaigns().map(|_| ())
    }));

    engine
        .withdraw_donations_for_a_campaign(&owner(), CampaignId(0))
        .unwrap();

    assert_eq!(
        *treasury.observed.lock().unwrap(),
        vec![(Ok(()), Amount::ZERO)]
    );
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        ..ProptestConfig::default()
    })]

    /// Property: zero donations to a live campaign always fail and never move the balance.
    #[test]
    fn zero_donation_never_changes_balance(prior in 0u128..1_000_000, deadline_in in 1u64..1_000_000) {
        let ledger = ledger();
        let engine = &ledger.engine;
        let id = engine
            .create_campaign(&owner(), "t", "", Amount::new(1), NOW + deadline_in)
            .unwrap();
        if prior > 0 {
            ledger.treasury.fund(donor_a(), Amount::new(prior)).unwrap();
            engine.donate_to_campaign(id, Amount::new(prior), &donor_a()).unwrap();
        }

        prop_assert_eq!(
            engine.donate_to_campaign(id, Amount::ZERO, &donor_b()),
            Err(DomainError::ZeroContribution)
        );
        prop_assert_eq!(
            engine.get_a_particular_campaign(id).unwrap().amount_realised,
            Amount::new(prior)
        );
        prop_assert!(!engine.has_contributed(id, &donor_b()).unwrap());
    }

    /// Property: any id at or past the campaign count is `NotFound` for donations.
    #[test]
    fn donations_past_the_end_are_not_found(created in 0u64..8, offset in 0u64..1_000) {
        let ledger = ledger();
        let engine = &ledger.engine;
        ledger.treasury.fund(donor_a(), Amount::new(1)).unwrap();
        for _ in 0..created {
            engine
                .create_campaign(&owner(), "t", "", Amount::new(1), NOW + 10)
                .unwrap();
        }

        let result = engine.donate_to_campaign(CampaignId(created + offset), Amount::new(1), &donor_a());
        prop_assert_eq!(result, Err(DomainError::NotFound));
        prop_assert_eq!(ledger.treasury.balance_of(&donor_a()), Amount::new(1));
    }
}
