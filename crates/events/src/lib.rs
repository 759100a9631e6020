//! Notification mechanics: event trait, envelopes, and pub/sub.
//!
//! Domain crates define their own event enums; this crate only knows how to wrap and
//! distribute them.

pub mod bus;
pub mod envelope;
pub mod event;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use envelope::EventEnvelope;
pub use event::Event;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
