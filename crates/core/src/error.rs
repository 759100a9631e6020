//! Domain error model.

use thiserror::Error;

use crate::clock::Timestamp;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Every variant is a terminal failure for the operation that produced it: nothing is
/// retried and no partial state is committed. Callers resubmit if they want another try.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The caller identity is the zero/null address.
    #[error("invalid caller: the zero address cannot own a campaign")]
    InvalidCaller,

    /// The campaign id does not reference an existing campaign.
    #[error("campaign not found")]
    NotFound,

    /// The campaign deadline has passed.
    #[error("campaign inactive: deadline {deadline} reached at {now}")]
    CampaignInactive { deadline: Timestamp, now: Timestamp },

    /// A donation of zero was attempted.
    #[error("contribution must be greater than zero")]
    ZeroContribution,

    /// The campaign balance is zero.
    #[error("nothing to withdraw")]
    NothingToWithdraw,

    /// Moving value into or out of custody failed.
    #[error("transfer failed: {0}")]
    TransferFailed(String),

    /// A guarded operation was entered while another one was still in progress.
    #[error("reentrant call rejected")]
    ReentrantCall,

    /// An identifier could not be parsed.
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// The caller is not allowed to perform the operation.
    #[error("unauthorized")]
    Unauthorized,

    /// An amount computation would overflow.
    #[error("amount overflow")]
    Overflow,

    /// Unrecoverable storage fault (e.g. poisoned lock).
    #[error("storage failure: {0}")]
    Storage(String),
}

impl DomainError {
    pub fn inactive(deadline: Timestamp, now: Timestamp) -> Self {
        Self::CampaignInactive { deadline, now }
    }

    pub fn transfer_failed(msg: impl Into<String>) -> Self {
        Self::TransferFailed(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }
}
