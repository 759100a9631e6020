use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crowdfund_core::{Address, Amount, CampaignId, Timestamp};
use crowdfund_events::Event;

/// Event: CampaignCreated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignCreated {
    pub campaign_id: CampaignId,
    pub owner: Address,
    pub target_amount: Amount,
    pub deadline: Timestamp,
    pub occurred_at: DateTime<Utc>,
}

/// Event: Donation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Donation {
    pub amount: Amount,
    pub donor: Address,
    pub campaign_id: CampaignId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: Withdrawal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Withdrawal {
    pub owner: Address,
    pub campaign_id: CampaignId,
    pub amount: Amount,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CampaignEvent {
    CampaignCreated(CampaignCreated),
    Donation(Donation),
    Withdrawal(Withdrawal),
}

impl Event for CampaignEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CampaignEvent::CampaignCreated(_) => "crowdfund.campaign.created",
            CampaignEvent::Donation(_) => "crowdfund.campaign.donation",
            CampaignEvent::Withdrawal(_) => "crowdfund.campaign.withdrawal",
        }
    }

    fn campaign_id(&self) -> CampaignId {
        match self {
            CampaignEvent::CampaignCreated(e) => e.campaign_id,
            CampaignEvent::Donation(e) => e.campaign_id,
            CampaignEvent::Withdrawal(e) => e.campaign_id,
        }
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            CampaignEvent::CampaignCreated(e) => e.occurred_at,
            CampaignEvent::Donation(e) => e.occurred_at,
            CampaignEvent::Withdrawal(e) => e.occurred_at,
        }
    }
}

/// Engine clock reading as business time. Out-of-range readings fall back to the epoch.
pub(crate) fn business_time(now: Timestamp) -> DateTime<Utc> {
    i64::try_from(now)
        .ok()
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .unwrap_or_default()
}
