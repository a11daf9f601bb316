use super::customer::{Customer, CustomerId};

/// Keyed persistence for customer records.
///
/// Implementations own the canonical copy: `get` hands out a clone and `put` replaces the whole
/// record, so a write is never partially visible.
pub trait CustomerStore: Send + Sync {
    fn get(&self, id: &CustomerId) -> Result<Option<Customer>, StoreError>;
    fn put(&self, customer: Customer) -> Result<(), StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("customer store unavailable: {0}")]
    Unavailable(String),
}
