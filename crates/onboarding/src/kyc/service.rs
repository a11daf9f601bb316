use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use tracing::{info, warn};

use super::codec::{AnswerPayload, CodecError};
use super::customer::{Customer, CustomerId, LifecycleError};
use super::specification::{ResolveError, Specification, SpecificationCatalog};
use super::store::{CustomerStore, StoreError};
use super::views::CustomerRecord;

/// Service composing the specification catalog, answer codecs, lifecycle rules and store.
///
/// Read-modify-write cycles run under a service-wide lock, so two updates to the same
/// customer cannot interleave and lose answers.
pub struct OnboardingService<S> {
    catalog: Arc<SpecificationCatalog>,
    store: Arc<S>,
    write_lock: Mutex<()>,
}

impl<S> OnboardingService<S>
where
    S: CustomerStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self::with_catalog(store, SpecificationCatalog::standard())
    }

    pub fn with_catalog(store: Arc<S>, catalog: SpecificationCatalog) -> Self {
        Self {
            catalog: Arc::new(catalog),
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// Resolve the specification for a classification without creating anything.
    pub fn specification(
        &self,
        kind: &str,
        entity: &str,
    ) -> Result<Arc<Specification>, OnboardingError> {
        Ok(self.catalog.resolve(kind, entity)?)
    }

    /// Create a draft customer bound to the specification for `kind` and `entity`.
    pub fn create(&self, kind: &str, entity: &str) -> Result<CustomerRecord, OnboardingError> {
        let specification = self.catalog.resolve(kind, entity).map_err(|err| {
            warn!(kind, entity, error = %err, "classification rejected");
            err
        })?;

        let customer = Customer::draft(&specification, Utc::now());
        self.store.put(customer.clone())?;

        info!(
            customer_id = %customer.customer_id,
            kyc_version = customer.kyc_version,
            "customer created"
        );

        Ok(CustomerRecord {
            customer,
            specification,
        })
    }

    /// Decode `payload` against the customer's specification and merge it into the stored
    /// answers.
    pub fn update_answers<P>(
        &self,
        customer_id: &CustomerId,
        kyc_version: u32,
        payload: P,
    ) -> Result<CustomerRecord, OnboardingError>
    where
        P: AnswerPayload,
    {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let mut record = self.fetch(customer_id)?;
        if let Err(err) = record.customer.ensure_accepts_answers(kyc_version) {
            warn!(customer_id = %customer_id, error = %err, "answers rejected");
            return Err(err.into());
        }

        let incoming = payload.decode(&record.specification)?;
        let submitted = incoming.len();
        record
            .customer
            .apply_answers(kyc_version, incoming, Utc::now())?;
        self.store.put(record.customer.clone())?;

        info!(
            customer_id = %customer_id,
            submitted,
            stored = record.customer.answers.len(),
            "answers merged"
        );
        Ok(record)
    }

    /// Finalize the customer's record. Finalizing twice is a no-op.
    pub fn submit(&self, customer_id: &CustomerId) -> Result<CustomerRecord, OnboardingError> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let mut record = self.fetch(customer_id)?;
        if record.customer.finalize(Utc::now()) {
            self.store.put(record.customer.clone())?;
            info!(customer_id = %customer_id, "customer submitted");
        }
        Ok(record)
    }

    /// Fetch a customer and its bound specification.
    pub fn get(&self, customer_id: &CustomerId) -> Result<CustomerRecord, OnboardingError> {
        self.fetch(customer_id)
    }

    fn fetch(&self, customer_id: &CustomerId) -> Result<CustomerRecord, OnboardingError> {
        let customer = self
            .store
            .get(customer_id)?
            .ok_or(OnboardingError::NotFound(*customer_id))?;
        let specification = self
            .catalog
            .by_version(customer.kyc_version)
            .ok_or(OnboardingError::UnknownVersion(customer.kyc_version))?;
        Ok(CustomerRecord {
            customer,
            specification,
        })
    }
}

/// Error raised by the onboarding service.
#[derive(Debug, thiserror::Error)]
pub enum OnboardingError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
    #[error("the customer '{0}' does not exist")]
    NotFound(CustomerId),
    #[error("no specification is published for kyc version {0}")]
    UnknownVersion(u32),
    #[error(transparent)]
    Store(#[from] StoreError),
}
