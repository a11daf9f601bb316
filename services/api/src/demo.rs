use crate::infra::InMemoryCustomerStore;
use clap::Args;
use onboarding::error::AppError;
use onboarding::kyc::{CompactAnswers, OnboardingService, StructuredAnswer, StructuredAnswers};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct SpecArgs {
    /// Customer kind, e.g. "business"
    #[arg(long, default_value = "business")]
    pub(crate) kind: String,
    /// Entity the customer onboards with, e.g. "anchorage hold"
    #[arg(long, default_value = "anchorage hold")]
    pub(crate) entity: String,
}

pub(crate) fn show_specification(args: SpecArgs) -> Result<(), AppError> {
    let service = OnboardingService::new(Arc::new(InMemoryCustomerStore::default()));
    let specification = service.specification(&args.kind, &args.entity)?;
    print_json(&format!("KYC template for {} / {}", args.kind, args.entity), &*specification)
}

pub(crate) fn run_demo() -> Result<(), AppError> {
    let service = OnboardingService::new(Arc::new(InMemoryCustomerStore::default()));

    let created = service.create("business", "anchorage hold")?;
    print_json("POST /v1/customers", &created.created_view())?;
    let customer_id = created.customer.customer_id;

    let structured = StructuredAnswers(vec![StructuredAnswer {
        question_id: "external_id_question_1".to_string(),
        answer: json!("Acme"),
    }]);
    let updated = service.update_answers(&customer_id, created.customer.kyc_version, structured)?;
    print_json(&format!("PUT /v1/customers/{customer_id}"), &updated.view())?;

    let compact = CompactAnswers(vec![
        "external_id_question_2:true".to_string(),
        "external_id_question_3:custody, trading".to_string(),
    ]);
    let updated = service.update_answers(&customer_id, created.customer.kyc_version, compact)?;
    print_json(&format!("PUT /v2/customers/{customer_id}"), &updated.view())?;

    let submitted = service.submit(&customer_id)?;
    print_json(
        &format!("POST /v1/customers/{customer_id}/submit"),
        &submitted.view(),
    )
}

fn print_json<T: Serialize + ?Sized>(heading: &str, body: &T) -> Result<(), AppError> {
    println!("== {heading}");
    println!("{}", serde_json::to_string_pretty(body)?);
    Ok(())
}
