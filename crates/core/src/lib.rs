//! `crowdfund-core`: ids, amounts, clock and errors shared by the ledger crates.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod clock;
pub mod entity;
pub mod error;
pub mod id;
pub mod value_object;

pub use clock::{Clock, ManualClock, SystemClock, Timestamp};
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{Address, CampaignId};
pub use value_object::Amount;
