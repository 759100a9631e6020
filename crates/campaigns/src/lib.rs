//! Crowdfunding campaigns: ledger store + campaign engine.
//!
//! The engine enforces the business rules (existence, activity window, non-empty balance,
//! reentrancy) and orchestrates value movement through an injected `TransferService`.
//! Storage, transfers, time and notification delivery are all injected, so the rules are
//! testable without real value movement.

pub mod campaign;
pub mod config;
pub mod engine;
pub mod event;
pub mod guard;
pub mod store;
pub mod transfer;

pub use campaign::{Campaign, CampaignDraft, CampaignStatus};
pub use config::{EngineConfig, ParsePolicyError, StatusPolicy, WithdrawalPolicy};
pub use engine::{CampaignEngine, CampaignEnvelope};
pub use event::{CampaignCreated, CampaignEvent, Donation, Withdrawal};
pub use guard::{GuardToken, ReentrancyGuard};
pub use store::{InMemoryLedgerStore, LedgerStore};
pub use transfer::{InMemoryTreasury, TransferError, TransferService};
