use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::kyc::customer::{Customer, CustomerId};
use crate::kyc::service::OnboardingService;
use crate::kyc::store::{CustomerStore, StoreError};

pub(super) const KIND: &str = "business";
pub(super) const ENTITY: &str = "anchorage hold";

pub(super) fn build_service() -> (OnboardingService<MemoryStore>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::default());
    let service = OnboardingService::new(store.clone());
    (service, store)
}

#[derive(Default, Clone)]
pub(super) struct MemoryStore {
    records: Arc<Mutex<HashMap<CustomerId, Customer>>>,
}

impl MemoryStore {
    pub(super) fn len(&self) -> usize {
        self.records.lock().expect("store mutex poisoned").len()
    }
}

impl CustomerStore for MemoryStore {
    fn get(&self, id: &CustomerId) -> Result<Option<Customer>, StoreError> {
        let guard = self.records.lock().expect("store mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn put(&self, customer: Customer) -> Result<(), StoreError> {
        let mut guard = self.records.lock().expect("store mutex poisoned");
        guard.insert(customer.customer_id, customer);
        Ok(())
    }
}

pub(super) struct UnavailableStore;

impl CustomerStore for UnavailableStore {
    fn get(&self, _id: &CustomerId) -> Result<Option<Customer>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn put(&self, _customer: Customer) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
