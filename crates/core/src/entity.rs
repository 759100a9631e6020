//! Ledger records that keep their identity while their balances change.

/// A record addressed by a store-assigned id.
pub trait Entity {
    /// Dense, copyable key; also used in log fields, hence `Display`.
    type Id: Copy + Ord + core::hash::Hash + core::fmt::Debug + core::fmt::Display;

    fn id(&self) -> Self::Id;

    /// Same record, possibly at a different point in its history.
    fn is_same_record(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}
