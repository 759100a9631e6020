use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crowdfund_core::CampaignId;

/// Envelope for an event, carrying routing + ordering metadata.
///
/// This is the unit published to listeners.
///
/// Notes:
/// - `campaign_id` identifies the campaign the event is about.
/// - `sequence_number` is monotonically increasing per emitting engine (not per campaign),
///   so listeners can reconstruct the serialized history of state transitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope<E> {
    event_id: Uuid,
    campaign_id: CampaignId,

    /// Position in the emitter's notification stream, starting at 1.
    sequence_number: u64,

    payload: E,
}

impl<E> EventEnvelope<E> {
    pub fn new(event_id: Uuid, campaign_id: CampaignId, sequence_number: u64, payload: E) -> Self {
        Self {
            event_id,
            campaign_id,
            sequence_number,
            payload,
        }
    }

    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn campaign_id(&self) -> CampaignId {
        self.campaign_id
    }

    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    pub fn payload(&self) -> &E {
        &self.payload
    }

    pub fn into_payload(self) -> E {
        self.payload
    }
}
