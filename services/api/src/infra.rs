use metrics_exporter_prometheus::PrometheusHandle;
use onboarding::kyc::{Customer, CustomerId, CustomerStore, StoreError};
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local customer store. Records live only as long as the process.
#[derive(Default, Clone)]
pub(crate) struct InMemoryCustomerStore {
    records: Arc<Mutex<HashMap<CustomerId, Customer>>>,
}

impl CustomerStore for InMemoryCustomerStore {
    fn get(&self, id: &CustomerId) -> Result<Option<Customer>, StoreError> {
        let guard = self
            .records
            .lock()
            .map_err(|_| StoreError::Unavailable("customer map poisoned".to_string()))?;
        Ok(guard.get(id).cloned())
    }

    fn put(&self, customer: Customer) -> Result<(), StoreError> {
        let mut guard = self
            .records
            .lock()
            .map_err(|_| StoreError::Unavailable("customer map poisoned".to_string()))?;
        guard.insert(customer.customer_id, customer);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use onboarding::kyc::{CustomerStatus, Specification};

    #[test]
    fn put_replaces_the_whole_record() {
        let store = InMemoryCustomerStore::default();
        let mut customer = Customer::draft(&Specification::business_v1(), Utc::now());
        store.put(customer.clone()).expect("stored");

        customer.finalize(Utc::now());
        store.put(customer.clone()).expect("replaced");

        let stored = store
            .get(&customer.customer_id)
            .expect("reachable")
            .expect("present");
        assert_eq!(stored.status, CustomerStatus::Latest);
        assert!(store.get(&CustomerId::generate()).expect("reachable").is_none());
    }
}
