//! KYC onboarding core.
//!
//! Customers are bound to a versioned question [`kyc::Specification`] at creation, collect
//! answers through either wire encoding, and are finalized once complete. The HTTP surface
//! lives in [`kyc::router`]; process bootstrap belongs to the `onboarding-api` service.

pub mod config;
pub mod error;
pub mod kyc;
pub mod telemetry;
