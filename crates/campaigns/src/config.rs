//! Engine configuration.

use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crowdfund_core::CampaignId;

/// How read queries report `Campaign::status`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusPolicy {
    /// Report the stored value, which stays `Active` forever.
    #[default]
    Frozen,
    /// Report `Campaign::derived_status` at query time.
    Derived,
}

/// Who may trigger a withdrawal. Payouts always go to the campaign owner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WithdrawalPolicy {
    /// Any caller.
    #[default]
    Anyone,
    /// Only the campaign owner; others get `Unauthorized`.
    OwnerOnly,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unrecognized {kind}: {value:?}")]
pub struct ParsePolicyError {
    kind: &'static str,
    value: String,
}

impl FromStr for StatusPolicy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "frozen" => Ok(Self::Frozen),
            "derived" => Ok(Self::Derived),
            other => Err(ParsePolicyError {
                kind: "status policy",
                value: other.to_string(),
            }),
        }
    }
}

impl FromStr for WithdrawalPolicy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "anyone" => Ok(Self::Anyone),
            "owner_only" => Ok(Self::OwnerOnly),
            other => Err(ParsePolicyError {
                kind: "withdrawal policy",
                value: other.to_string(),
            }),
        }
    }
}

/// Campaign engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Campaign credited by bare transfers (`CampaignEngine::receive`).
    pub bare_transfer_campaign: CampaignId,
    pub status_policy: StatusPolicy,
    pub withdrawal_policy: WithdrawalPolicy,
}

impl EngineConfig {
    pub const BARE_TRANSFER_CAMPAIGN_VAR: &'static str = "CROWDFUND_BARE_TRANSFER_CAMPAIGN";
    pub const STATUS_POLICY_VAR: &'static str = "CROWDFUND_STATUS_POLICY";
    pub const WITHDRAWAL_POLICY_VAR: &'static str = "CROWDFUND_WITHDRAWAL_POLICY";

    /// Defaults overridden by `CROWDFUND_*` environment variables.
    pub fn from_env() -> Self {
        Self::default().overridden_by(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`. Unset keys keep the current value; unparsable values
    /// are logged and ignored.
    pub fn overridden_by(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(raw) = lookup(Self::BARE_TRANSFER_CAMPAIGN_VAR) {
            match raw.parse::<CampaignId>() {
                Ok(id) => self.bare_transfer_campaign = id,
                Err(e) => tracing::warn!(
                    "{} is not a campaign id ({e}); keeping {}",
                    Self::BARE_TRANSFER_CAMPAIGN_VAR,
                    self.bare_transfer_campaign
                ),
            }
        }
        if let Some(raw) = lookup(Self::STATUS_POLICY_VAR) {
            match raw.parse() {
                Ok(policy) => self.status_policy = policy,
                Err(e) => tracing::warn!("{e}; keeping {:?}", self.status_policy),
            }
        }
        if let Some(raw) = lookup(Self::WITHDRAWAL_POLICY_VAR) {
            match raw.parse() {
                Ok(policy) => self.withdrawal_policy = policy,
                Err(e) => tracing::warn!("{e}; keeping {:?}", self.withdrawal_policy),
            }
        }
        self
    }

    pub fn with_bare_transfer_campaign(mut self, id: CampaignId) -> Self {
        self.bare_transfer_campaign = id;
        self
    }

    pub fn with_status_policy(mut self, policy: StatusPolicy) -> Self {
        self.status_policy = policy;
        self
    }

    pub fn with_withdrawal_policy(mut self, policy: WithdrawalPolicy) -> Self {
        self.withdrawal_policy = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_preserve_observed_behavior() {
        let config = EngineConfig::default();
        assert_eq!(config.bare_transfer_campaign, CampaignId(0));
        assert_eq!(config.status_policy, StatusPolicy::Frozen);
        assert_eq!(config.withdrawal_policy, WithdrawalPolicy::Anyone);
    }

    #[test]
    fn overrides_apply_when_valid() {
        let config = EngineConfig::default().overridden_by(lookup(&[
            (EngineConfig::BARE_TRANSFER_CAMPAIGN_VAR, "4"),
            (EngineConfig::STATUS_POLICY_VAR, "Derived"),
            (EngineConfig::WITHDRAWAL_POLICY_VAR, "owner-only"),
        ]));

        assert_eq!(config.bare_transfer_campaign, CampaignId(4));
        assert_eq!(config.status_policy, StatusPolicy::Derived);
        assert_eq!(config.withdrawal_policy, WithdrawalPolicy::OwnerOnly);
    }

    #[test]
    fn invalid_overrides_keep_current_values() {
        let base = EngineConfig::default().with_status_policy(StatusPolicy::Derived);
        let config = base.clone().overridden_by(lookup(&[
            (EngineConfig::BARE_TRANSFER_CAMPAIGN_VAR, "-1"),
            (EngineConfig::STATUS_POLICY_VAR, "sometimes"),
            (EngineConfig::WITHDRAWAL_POLICY_VAR, "admins"),
        ]));

        assert_eq!(config, base);
    }

    #[test]
    fn deserializes_partial_documents() {
        let config: EngineConfig =
            serde_json::from_str(r#"{ "withdrawal_policy": "owner_only" }"#).unwrap();
        assert_eq!(config.withdrawal_policy, WithdrawalPolicy::OwnerOnly);
        assert_eq!(config.status_policy, StatusPolicy::Frozen);
    }
}
