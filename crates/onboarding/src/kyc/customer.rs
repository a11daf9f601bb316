use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::answer::{merge, AnswerSet};
use super::specification::Specification;

/// Identifier generated for every new customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(pub Uuid);

impl CustomerId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for CustomerId {
    type Err = uuid::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(value.trim()).map(Self)
    }
}

/// Lifecycle state of a customer's KYC record. `Latest` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CustomerStatus {
    Draft,
    Latest,
}

impl CustomerStatus {
    pub const fn label(self) -> &'static str {
        match self {
            CustomerStatus::Draft => "DRAFT",
            CustomerStatus::Latest => "LATEST",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    #[error("kyc version '{declared}' is invalid, customer is bound to version '{expected}'")]
    VersionMismatch { expected: u32, declared: u32 },
    #[error("customer {customer_id} is already {} and no longer accepts answers", .status.label())]
    InvalidState {
        customer_id: CustomerId,
        status: CustomerStatus,
    },
}

/// A customer's KYC record. `kyc_version` and `created_at` never change after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub customer_id: CustomerId,
    pub kyc_version: u32,
    pub status: CustomerStatus,
    pub answers: AnswerSet,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    /// New draft bound to `specification`, with a freshly generated id and no answers.
    pub fn draft(specification: &Specification, now: DateTime<Utc>) -> Self {
        Self {
            customer_id: CustomerId::generate(),
            kyc_version: specification.version,
            status: CustomerStatus::Draft,
            answers: AnswerSet::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn ensure_version(&self, declared: u32) -> Result<(), LifecycleError> {
        if declared == self.kyc_version {
            Ok(())
        } else {
            Err(LifecycleError::VersionMismatch {
                expected: self.kyc_version,
                declared,
            })
        }
    }

    /// Checks that an update declaring `declared_version` may touch this record. The version
    /// guard is checked before the state guard.
    pub fn ensure_accepts_answers(&self, declared_version: u32) -> Result<(), LifecycleError> {
        self.ensure_version(declared_version)?;
        if self.status == CustomerStatus::Latest {
            return Err(LifecycleError::InvalidState {
                customer_id: self.customer_id,
                status: self.status,
            });
        }
        Ok(())
    }

    /// Merges `incoming` into the stored answers.
    pub fn apply_answers(
        &mut self,
        declared_version: u32,
        incoming: AnswerSet,
        now: DateTime<Utc>,
    ) -> Result<(), LifecycleError> {
        self.ensure_accepts_answers(declared_version)?;
        self.answers = merge(&self.answers, incoming);
        self.updated_at = now;
        Ok(())
    }

    /// Moves the record to `Latest`. Returns whether anything changed; a second call is a no-op.
    pub fn finalize(&mut self, now: DateTime<Utc>) -> bool {
        if self.status == CustomerStatus::Latest {
            return false;
        }
        self.status = CustomerStatus::Latest;
        self.updated_at = now;
        true
    }

    /// Mandatory questions with no stored answer, or only a blank one.
    pub fn missing_mandatory(&self, specification: &Specification) -> Vec<String> {
        specification.missing_mandatory(|question_id| {
            self.answers
                .get(question_id)
                .is_some_and(|value| !value.is_blank())
        })
    }
}
