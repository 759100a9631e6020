//! Value movement capability.
//!
//! The engine never moves value itself. Donations are pulled into system custody with
//! `collect`, payouts leave custody with `send`. Both may fail, and a failure aborts the
//! operation that asked for it.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use thiserror::Error;

use crowdfund_core::{Address, Amount};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error("insufficient funds in {account}: needed {needed}, available {available}")]
    InsufficientFunds {
        account: String,
        needed: Amount,
        available: Amount,
    },

    #[error("recipient {0} rejected the transfer")]
    Rejected(Address),

    #[error("transfer service unavailable: {0}")]
    Unavailable(String),
}

/// Moves value between principals and the ledger's custody.
///
/// Implementations may call back into the engine (that is what the reentrancy guard is
/// for), so the engine never holds a store lock across these calls.
pub trait TransferService: Send + Sync {
    /// Pull `amount` from `from` into custody.
    fn collect(&self, from: &Address, amount: Amount) -> Result<(), TransferError>;

    /// Release `amount` from custody to `to`.
    fn send(&self, to: &Address, amount: Amount) -> Result<(), TransferError>;
}

impl<T> TransferService for Arc<T>
where
    T: TransferService + ?Sized,
{
    fn collect(&self, from: &Address, amount: Amount) -> Result<(), TransferError> {
        (**self).collect(from, amount)
    }

    fn send(&self, to: &Address, amount: Amount) -> Result<(), TransferError> {
        (**self).send(to, amount)
    }
}

#[derive(Debug, Default)]
struct TreasuryState {
    balances: HashMap<Address, Amount>,
    custody: Amount,
    rejecting: HashSet<Address>,
}

/// In-memory accounts + custody pool.
///
/// Value is conserved: every successful transfer debits exactly what it credits. `fund`
/// is the only way value enters the system.
#[derive(Debug, Default)]
pub struct InMemoryTreasury {
    state: Mutex<TreasuryState>,
}

impl InMemoryTreasury {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, TreasuryState>, TransferError> {
        self.state
            .lock()
            .map_err(|_| TransferError::Unavailable("treasury lock poisoned".to_string()))
    }

    /// Credit `account` with freshly issued value.
    pub fn fund(&self, account: Address, amount: Amount) -> Result<(), TransferError> {
        let mut state = self.lock()?;
        let balance = state.balances.entry(account).or_default();
        *balance = balance
            .checked_add(amount)
            .ok_or_else(|| TransferError::Unavailable("balance overflow".to_string()))?;
        Ok(())
    }

    pub fn balance_of(&self, account: &Address) -> Amount {
        self.lock()
            .ok()
            .and_then(|s| s.balances.get(account).copied())
            .unwrap_or_default()
    }

    /// Value currently held on behalf of campaigns.
    pub fn custody(&self) -> Amount {
        self.lock().map(|s| s.custody).unwrap_or_default()
    }

    /// Make `account` refuse incoming transfers (like a recipient that reverts).
    pub fn reject_incoming(&self, account: Address) {
        if let Ok(mut state) = self.lock() {
            state.rejecting.insert(account);
        }
    }

    pub fn accept_incoming(&self, account: &Address) {
        if let Ok(mut state) = self.lock() {
            state.rejecting.remove(account);
        }
    }
}

impl TransferService for InMemoryTreasury {
    fn collect(&self, from: &Address, amount: Amount) -> Result<(), TransferError> {
        let mut state = self.lock()?;
        let available = state.balances.get(from).copied().unwrap_or_default();
        let remaining = available
            .checked_sub(amount)
            .ok_or_else(|| TransferError::InsufficientFunds {
                account: from.to_string(),
                needed: amount,
                available,
            })?;
        let custody = state
            .custody
            .checked_add(amount)
            .ok_or_else(|| TransferError::Unavailable("custody overflow".to_string()))?;

        state.balances.insert(*from, remaining);
        state.custody = custody;
        Ok(())
    }

    fn send(&self, to: &Address, amount: Amount) -> Result<(), TransferError> {
        let mut state = self.lock()?;
        if state.rejecting.contains(to) {
            return Err(TransferError::Rejected(*to));
        }
        let custody = state
            .custody
            .checked_sub(amount)
            .ok_or_else(|| TransferError::InsufficientFunds {
                account: "custody".to_string(),
                needed: amount,
                available: state.custody,
            })?;
        let received = state
            .balances
            .get(to)
            .copied()
            .unwrap_or_default()
            .checked_add(amount)
            .ok_or_else(|| TransferError::Unavailable("balance overflow".to_string()))?;

        state.custody = custody;
        state.balances.insert(*to, received);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collect_moves_value_into_custody() {
        let treasury = InMemoryTreasury::new();
        let donor = Address::from_u128(1);
        treasury.fund(donor, Amount::new(100)).unwrap();

        treasury.collect(&donor, Amount::new(40)).unwrap();

        assert_eq!(treasury.balance_of(&donor), Amount::new(60));
        assert_eq!(treasury.custody(), Amount::new(40));
    }

    #[test]
    fn collect_without_funds_changes_nothing() {
        let treasury = InMemoryTreasury::new();
        let donor = Address::from_u128(1);
        treasury.fund(donor, Amount::new(10)).unwrap();

        let err = treasury.collect(&donor, Amount::new(11)).unwrap_err();

        assert!(matches!(err, TransferError::InsufficientFunds { .. }));
        assert_eq!(treasury.balance_of(&donor), Amount::new(10));
        assert_eq!(treasury.custody(), Amount::ZERO);
    }

    #[test]
    fn send_releases_custody_unless_recipient_rejects() {
        let treasury = InMemoryTreasury::new();
        let donor = Address::from_u128(1);
        let owner = Address::from_u128(2);
        treasury.fund(donor, Amount::new(50)).unwrap();
        treasury.collect(&donor, Amount::new(50)).unwrap();

        treasury.reject_incoming(owner);
        assert_eq!(
            treasury.send(&owner, Amount::new(50)),
            Err(TransferError::Rejected(owner))
        );
        assert_eq!(treasury.custody(), Amount::new(50));

        treasury.accept_incoming(&owner);
        treasury.send(&owner, Amount::new(50)).unwrap();
        assert_eq!(treasury.custody(), Amount::ZERO);
        assert_eq!(treasury.balance_of(&owner), Amount::new(50));
    }

    #[test]
    fn send_cannot_exceed_custody() {
        let treasury = InMemoryTreasury::new();
        let err = treasury.send(&Address::from_u128(2), Amount::new(1)).unwrap_err();
        assert!(matches!(err, TransferError::InsufficientFunds { .. }));
    }
}
