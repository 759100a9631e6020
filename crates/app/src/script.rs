//! Scripted ledger sessions.
//!
//! A script is a JSON array of steps, each naming one entry point:
//!
//! ```json
//! [
//!   { "fund":     { "account": "<uuid>", "amount": 40 } },
//!   { "create":   { "caller": "<uuid>", "title": "Well", "target": 100, "deadline_in": 1000 } },
//!   { "donate":   { "campaign": 0, "from": "<uuid>", "amount": 40 } },
//!   { "withdraw": { "caller": "<uuid>", "campaign": 0 } }
//! ]
//! ```
//!
//! Steps run in order; a failing step is recorded and the session carries on.

use std::path::Path;

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};

use crowdfund_core::{Address, Amount, CampaignId, Timestamp};

use crate::ledger::Ledger;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Issue value to an account in the treasury.
    Fund { account: Address, amount: Amount },
    /// `create_campaign`, with the deadline relative to the ledger clock.
    Create {
        caller: Address,
        title: String,
        #[serde(default)]
        description: String,
        target: Amount,
        deadline_in: i64,
    },
    /// `donate_to_campaign`.
    Donate {
        campaign: CampaignId,
        from: Address,
        amount: Amount,
    },
    /// Bare transfer (`receive`).
    Transfer { from: Address, amount: Amount },
    /// `withdraw_donations_for_a_campaign`.
    Withdraw { caller: Address, campaign: CampaignId },
    /// Move a manual clock forward.
    Advance { secs: u64 },
}

/// What a successful step did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
    Funded,
    Created(CampaignId),
    Donated,
    Withdrawn(Amount),
    Advanced(Timestamp),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepOutcome {
    pub index: usize,
    pub step: Step,
    pub result: Result<Effect, String>,
}

pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Vec<Step>> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading script {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing script {}", path.display()))
}

pub fn run(ledger: &Ledger, steps: &[Step]) -> Vec<StepOutcome> {
    steps
        .iter()
        .enumerate()
        .map(|(index, step)| StepOutcome {
            index,
            step: step.clone(),
            result: apply(ledger, step).map_err(|e| format!("{e:#}")),
        })
        .collect()
}

fn apply(ledger: &Ledger, step: &Step) -> anyhow::Result<Effect> {
    let engine = &ledger.engine;
    match step {
        Step::Fund { account, amount } => {
            ledger.treasury.fund(*account, *amount)?;
            Ok(Effect::Funded)
        }
        Step::Create {
            caller,
            title,
            description,
            target,
            deadline_in,
        } => {
            let deadline = engine.now().saturating_add_signed(*deadline_in);
            let id = engine.create_campaign(caller, title.as_str(), description.as_str(), *target, deadline)?;
            Ok(Effect::Created(id))
        }
        Step::Donate {
            campaign,
            from,
            amount,
        } => {
            engine.donate_to_campaign(*campaign, *amount, from)?;
            Ok(Effect::Donated)
        }
        Step::Transfer { from, amount } => {
            engine.receive(from, *amount)?;
            Ok(Effect::Donated)
        }
        Step::Withdraw { caller, campaign } => {
            Ok(Effect::Withdrawn(engine.withdraw_donations_for_a_campaign(caller, *campaign)?))
        }
        Step::Advance { secs } => {
            let Some(clock) = &ledger.manual_clock else {
                bail!("advance needs a manual clock");
            };
            clock.advance(*secs);
            Ok(Effect::Advanced(engine.now()))
        }
    }
}

/// Built-in session: one campaign funded by two donors and paid out, then a donation to an
/// already expired campaign.
pub fn demo() -> Vec<Step> {
    let owner = Address::from_u128(1);
    let alice = Address::from_u128(2);
    let bob = Address::from_u128(3);

    vec![
        Step::Fund { account: alice, amount: Amount::new(40) },
        Step::Fund { account: bob, amount: Amount::new(70) },
        Step::Create {
            caller: owner,
            title: "Village well".to_string(),
            description: "Clean water for the school".to_string(),
            target: Amount::new(100),
            deadline_in: 1_000,
        },
        Step::Donate { campaign: CampaignId(0), from: alice, amount: Amount::new(40) },
        Step::Donate { campaign: CampaignId(0), from: bob, amount: Amount::new(70) },
        Step::Withdraw { caller: owner, campaign: CampaignId(0) },
        Step::Withdraw { caller: owner, campaign: CampaignId(0) },
        Step::Create {
            caller: owner,
            title: "Too late".to_string(),
            description: String::new(),
            target: Amount::new(10),
            deadline_in: -1,
        },
        Step::Donate { campaign: CampaignId(1), from: alice, amount: Amount::new(1) },
    ]
}
