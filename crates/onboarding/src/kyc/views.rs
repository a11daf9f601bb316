use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::answer::AnswerSet;
use super::customer::{Customer, CustomerId, CustomerStatus};
use super::specification::{Specification, TemplateEntry};

/// A stored customer together with the specification it is bound to.
#[derive(Debug, Clone)]
pub struct CustomerRecord {
    pub customer: Customer,
    pub specification: Arc<Specification>,
}

impl CustomerRecord {
    pub fn view(&self) -> CustomerView {
        CustomerView {
            customer_id: self.customer.customer_id,
            kyc_version: self.customer.kyc_version,
            kyc: self.customer.answers.clone(),
            status: self.customer.status,
            missing_mandatory: self.customer.missing_mandatory(&self.specification),
            created_at: self.customer.created_at,
            updated_at: self.customer.updated_at,
        }
    }

    pub fn created_view(&self) -> CreatedCustomerView {
        CreatedCustomerView {
            customer_id: self.customer.customer_id,
            kyc_version: self.customer.kyc_version,
            kyc_template: self.specification.template.clone(),
            status: self.customer.status,
            created_at: self.customer.created_at,
            updated_at: self.customer.updated_at,
        }
    }
}

/// Response body for a newly created customer, carrying the questions to answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedCustomerView {
    pub customer_id: CustomerId,
    pub kyc_version: u32,
    pub kyc_template: Vec<TemplateEntry>,
    pub status: CustomerStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Current state of a customer's KYC record as exposed to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerView {
    pub customer_id: CustomerId,
    pub kyc_version: u32,
    pub kyc: AnswerSet,
    pub status: CustomerStatus,
    pub missing_mandatory: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
