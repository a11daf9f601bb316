//! Specification-driven KYC answer model.
//!
//! A customer is bound to one versioned [`Specification`] when created. Answers arrive in
//! either wire encoding, are decoded against that specification, and are merged into the
//! stored set until the record is submitted.

pub mod answer;
pub mod codec;
pub mod customer;
pub mod router;
pub mod service;
pub mod specification;
pub mod store;
pub mod views;

#[cfg(test)]
mod tests;

pub use answer::{merge, Answer, AnswerSet, AnswerValue};
pub use codec::{AnswerPayload, CodecError, CompactAnswers, StructuredAnswer, StructuredAnswers};
pub use customer::{Customer, CustomerId, CustomerStatus, LifecycleError};
pub use router::{onboarding_router, ApiError, CreateCustomerRequest, UpdateCustomerRequest};
pub use service::{OnboardingError, OnboardingService};
pub use specification::{
    AnswerType, ClassificationField, ResolveError, Specification, SpecificationCatalog,
    TemplateEntry,
};
pub use store::{CustomerStore, StoreError};
pub use views::{CreatedCustomerView, CustomerRecord, CustomerView};
