use chrono::{DateTime, Utc};

use crowdfund_core::CampaignId;

/// A fact about one campaign, published after the change it describes is committed.
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Dotted name, e.g. "crowdfund.campaign.donation". Listeners match on it.
    fn event_type(&self) -> &'static str;

    /// Campaign the event is about; copied onto the envelope for routing.
    fn campaign_id(&self) -> CampaignId;

    fn version(&self) -> u32 {
        1
    }

    /// Engine clock at the time of the change.
    fn occurred_at(&self) -> DateTime<Utc>;
}
