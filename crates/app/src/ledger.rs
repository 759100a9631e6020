use std::sync::Arc;

use crowdfund_campaigns::{CampaignEngine, CampaignEnvelope, InMemoryLedgerStore, InMemoryTreasury};
use crowdfund_core::{Clock, ManualClock, SystemClock};
use crowdfund_events::InMemoryEventBus;

use crate::config::{AppConfig, ClockMode};

pub type Bus = Arc<InMemoryEventBus<CampaignEnvelope>>;
pub type Engine = CampaignEngine<Bus>;

/// A fully wired, in-memory ledger.
///
/// Handles to the treasury, bus and (if manual) clock are kept next to the engine so
/// callers can fund accounts, listen for notifications and move time.
#[derive(Debug, Clone)]
pub struct Ledger {
    pub engine: Arc<Engine>,
    pub treasury: Arc<InMemoryTreasury>,
    pub bus: Bus,
    pub manual_clock: Option<Arc<ManualClock>>,
}

impl Ledger {
    pub fn build(config: &AppConfig) -> Self {
        let treasury = Arc::new(InMemoryTreasury::new());
        let bus: Bus = Arc::new(InMemoryEventBus::new());

        let manual_clock = match config.clock {
            ClockMode::System => None,
            ClockMode::Manual { start } => Some(Arc::new(ManualClock::new(start))),
        };
        let clock: Arc<dyn Clock> = match &manual_clock {
            Some(manual) => Arc::clone(manual) as Arc<dyn Clock>,
            None => Arc::new(SystemClock),
        };

        let engine = CampaignEngine::new(
            Arc::new(InMemoryLedgerStore::new()),
            treasury.clone(),
            clock,
            bus.clone(),
            config.engine.clone(),
        );

        tracing::info!(config = ?config, "ledger ready");

        Self {
            engine: Arc::new(engine),
            treasury,
            bus,
            manual_clock,
        }
    }
}
