use serde::{Deserialize, Serialize};

use crowdfund_core::{Address, Amount, CampaignId, Entity, Timestamp};

/// Campaign status.
///
/// The stored value is set to `Active` at creation and never rewritten. Whether reads report
/// it as-is or derive it from the deadline and balance is an `EngineConfig` decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    Active,
    Expired,
    GoalReached,
}

/// One fundraising effort.
///
/// Everything except `amount_realised` is fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Campaign {
    pub campaign_id: CampaignId,
    pub owner: Address,
    pub title: String,
    pub description: String,
    /// Funding goal. Informational only; never enforced.
    pub target_amount: Amount,
    /// The campaign is active while `now < deadline`.
    pub deadline: Timestamp,
    /// Contributions received minus amounts already withdrawn.
    pub amount_realised: Amount,
    pub status: CampaignStatus,
}

impl Campaign {
    pub fn is_active_at(&self, now: Timestamp) -> bool {
        now < self.deadline
    }

    /// Status computed from the balance and the deadline instead of the stored field.
    ///
    /// Goal reached wins over expiry.
    pub fn derived_status(&self, now: Timestamp) -> CampaignStatus {
        if self.amount_realised >= self.target_amount {
            CampaignStatus::GoalReached
        } else if !self.is_active_at(now) {
            CampaignStatus::Expired
        } else {
            CampaignStatus::Active
        }
    }
}

impl Entity for Campaign {
    type Id = CampaignId;

    fn id(&self) -> CampaignId {
        self.campaign_id
    }
}

/// A campaign before the store has assigned its id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignDraft {
    pub owner: Address,
    pub title: String,
    pub description: String,
    pub target_amount: Amount,
    pub deadline: Timestamp,
}

impl CampaignDraft {
    /// Materialize the draft at `campaign_id` with an empty balance.
    pub fn into_campaign(self, campaign_id: CampaignId) -> Campaign {
        Campaign {
            campaign_id,
            owner: self.owner,
            title: self.title,
            description: self.description,
            target_amount: self.target_amount,
            deadline: self.deadline,
            amount_realised: Amount::ZERO,
            status: CampaignStatus::Active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn campaign(target: u128, realised: u128, deadline: Timestamp) -> Campaign {
        let mut c = CampaignDraft {
            owner: Address::from_u128(1),
            title: "t".into(),
            description: "d".into(),
            target_amount: Amount::new(target),
            deadline,
        }
        .into_campaign(CampaignId(0));
        c.amount_realised = Amount::new(realised);
        c
    }

    #[test]
    fn active_strictly_before_deadline() {
        let c = campaign(100, 0, 1_000);
        assert!(c.is_active_at(999));
        assert!(!c.is_active_at(1_000));
        assert!(!c.is_active_at(1_001));
    }

    #[test]
    fn new_campaign_starts_active_and_empty() {
        let c = campaign(100, 0, 0);
        assert_eq!(c.status, CampaignStatus::Active);
        assert!(c.amount_realised.is_zero());
        assert_eq!(c.id(), CampaignId(0));
    }

    #[test]
    fn balance_changes_keep_record_identity() {
        let before = campaign(100, 0, 1_000);
        let after = campaign(100, 60, 1_000);
        assert_ne!(before, after);
        assert!(before.is_same_record(&after));
    }

    #[test]
    fn derived_status_prefers_goal_over_expiry() {
        assert_eq!(campaign(100, 10, 1_000).derived_status(10), CampaignStatus::Active);
        assert_eq!(campaign(100, 10, 1_000).derived_status(1_000), CampaignStatus::Expired);
        assert_eq!(campaign(100, 100, 1_000).derived_status(10), CampaignStatus::GoalReached);
        assert_eq!(campaign(100, 150, 1_000).derived_status(5_000), CampaignStatus::GoalReached);
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&CampaignStatus::GoalReached).unwrap();
        assert_eq!(json, "\"goal_reached\"");
    }
}
