//! Composition root for the crowdfunding ledger.
//!
//! Wires the in-memory store, treasury, clock and bus into a `CampaignEngine` and runs
//! scripted sessions against it.

pub mod config;
pub mod ledger;
pub mod script;

pub use config::{AppConfig, ClockMode};
pub use ledger::{Bus, Engine, Ledger};
pub use script::{Effect, Step, StepOutcome};
