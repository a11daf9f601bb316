use super::common::*;
use crate::kyc::answer::AnswerValue;
use crate::kyc::codec::{CodecError, CompactAnswers, StructuredAnswer, StructuredAnswers};
use crate::kyc::customer::{CustomerId, CustomerStatus, LifecycleError};
use crate::kyc::service::{OnboardingError, OnboardingService};
use crate::kyc::specification::ResolveError;
use crate::kyc::store::{CustomerStore, StoreError};
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;

fn structured(question_id: &str, answer: serde_json::Value) -> StructuredAnswers {
    StructuredAnswers(vec![StructuredAnswer {
        question_id: question_id.to_string(),
        answer,
    }])
}

fn compact(items: &[&str]) -> CompactAnswers {
    CompactAnswers(items.iter().map(|item| item.to_string()).collect())
}

#[test]
fn create_persists_a_draft_bound_to_version_one() {
    let (service, store) = build_service();

    let record = service.create("Business", "Anchorage Hold").expect("supported");

    assert_eq!(record.customer.status, CustomerStatus::Draft);
    assert_eq!(record.customer.kyc_version, 1);
    assert_eq!(record.specification.template.len(), 3);
    let stored = store
        .get(&record.customer.customer_id)
        .expect("store reachable")
        .expect("customer persisted");
    assert_eq!(stored, record.customer);
}

#[test]
fn unsupported_classification_creates_nothing() {
    let (service, store) = build_service();

    match service.create("individual", ENTITY) {
        Err(OnboardingError::Resolve(ResolveError::ClassificationNotSupported { .. })) => {}
        other => panic!("expected classification error, got {other:?}"),
    }
    assert_eq!(store.len(), 0);
}

#[test]
fn every_created_customer_has_a_distinct_identifier() {
    let (service, store) = build_service();

    let ids: HashSet<CustomerId> = (0..25)
        .map(|_| {
            service
                .create(KIND, ENTITY)
                .expect("supported")
                .customer
                .customer_id
        })
        .collect();

    assert_eq!(ids.len(), 25);
    assert_eq!(store.len(), 25);
}

#[test]
fn updates_from_both_encodings_accumulate() {
    let (service, _) = build_service();
    let id = service.create(KIND, ENTITY).expect("created").customer.customer_id;

    service
        .update_answers(&id, 1, structured("external_id_question_1", json!("Acme")))
        .expect("structured update");
    let record = service
        .update_answers(&id, 1, compact(&["external_id_question_2:true"]))
        .expect("compact update");

    let answers = &record.customer.answers;
    assert_eq!(answers.len(), 2);
    assert_eq!(
        answers.get("external_id_question_1"),
        Some(&AnswerValue::Text("Acme".to_string()))
    );
    assert_eq!(
        answers.get("external_id_question_2"),
        Some(&AnswerValue::Boolean(true))
    );
    assert_eq!(
        record.customer.missing_mandatory(&record.specification),
        vec!["external_id_question_3".to_string()]
    );
    assert!(record.customer.updated_at >= record.customer.created_at);
}

#[test]
fn resubmitting_a_question_overrides_only_that_answer() {
    let (service, _) = build_service();
    let id = service.create(KIND, ENTITY).expect("created").customer.customer_id;

    service
        .update_answers(
            &id,
            1,
            compact(&["external_id_question_1:Acme", "external_id_question_2:false"]),
        )
        .expect("first update");
    let record = service
        .update_answers(&id, 1, compact(&["external_id_question_1:Acme Holdings"]))
        .expect("second update");

    assert_eq!(
        record.customer.answers.get("external_id_question_1"),
        Some(&AnswerValue::Text("Acme Holdings".to_string()))
    );
    assert_eq!(
        record.customer.answers.get("external_id_question_2"),
        Some(&AnswerValue::Boolean(false))
    );
}

#[test]
fn version_mismatch_fails_regardless_of_answers() {
    let (service, store) = build_service();
    let id = service.create(KIND, ENTITY).expect("created").customer.customer_id;

    for payload in [
        compact(&["external_id_question_1:Acme"]),
        compact(&["not even a pair"]),
        compact(&[]),
    ] {
        match service.update_answers(&id, 2, payload) {
            Err(OnboardingError::Lifecycle(LifecycleError::VersionMismatch {
                expected: 1,
                declared: 2,
            })) => {}
            other => panic!("expected version mismatch, got {other:?}"),
        }
    }

    let stored = store.get(&id).expect("reachable").expect("present");
    assert!(stored.answers.is_empty());
}

#[test]
fn codec_failures_leave_the_record_untouched() {
    let (service, store) = build_service();
    let id = service.create(KIND, ENTITY).expect("created").customer.customer_id;
    let before = store.get(&id).expect("reachable").expect("present");

    match service.update_answers(
        &id,
        1,
        compact(&["external_id_question_1:Acme", "external_id_question_2"]),
    ) {
        Err(OnboardingError::Codec(CodecError::MalformedEntry { entry })) => {
            assert_eq!(entry, "external_id_question_2");
        }
        other => panic!("expected malformed entry, got {other:?}"),
    }

    let after = store.get(&id).expect("reachable").expect("present");
    assert_eq!(before, after);
}

#[test]
fn submit_is_idempotent_and_closes_the_record() {
    let (service, _) = build_service();
    let id = service.create(KIND, ENTITY).expect("created").customer.customer_id;
    service
        .update_answers(&id, 1, structured("external_id_question_1", json!("Acme")))
        .expect("update");

    let first = service.submit(&id).expect("first submit");
    let second = service.submit(&id).expect("second submit");

    assert_eq!(first.customer.status, CustomerStatus::Latest);
    assert_eq!(second.customer.status, CustomerStatus::Latest);
    assert_eq!(first.customer.updated_at, second.customer.updated_at);
    assert_eq!(second.customer.answers, first.customer.answers);

    match service.update_answers(&id, 1, structured("external_id_question_2", json!(true))) {
        Err(OnboardingError::Lifecycle(LifecycleError::InvalidState { .. })) => {}
        other => panic!("expected invalid state, got {other:?}"),
    }
}

#[test]
fn unknown_customers_are_not_found() {
    let (service, _) = build_service();
    let missing = CustomerId::generate();

    assert!(matches!(
        service.get(&missing),
        Err(OnboardingError::NotFound(id)) if id == missing
    ));
    assert!(matches!(
        service.submit(&missing),
        Err(OnboardingError::NotFound(_))
    ));
    assert!(matches!(
        service.update_answers(&missing, 1, compact(&[])),
        Err(OnboardingError::NotFound(_))
    ));
}

#[test]
fn store_failures_propagate() {
    let service = OnboardingService::new(Arc::new(UnavailableStore));

    assert!(matches!(
        service.create(KIND, ENTITY),
        Err(OnboardingError::Store(StoreError::Unavailable(_)))
    ));
    assert!(matches!(
        service.get(&CustomerId::generate()),
        Err(OnboardingError::Store(_))
    ));
}

#[test]
fn concurrent_updates_do_not_lose_answers() {
    let (service, _) = build_service();
    let service = Arc::new(service);
    let id = service.create(KIND, ENTITY).expect("created").customer.customer_id;

    let handles: Vec<_> = [
        "external_id_question_1:Acme",
        "external_id_question_2:true",
        "external_id_question_3:custody,trading",
    ]
    .into_iter()
    .map(|entry| {
        let service = Arc::clone(&service);
        std::thread::spawn(move || {
            service
                .update_answers(&id, 1, compact(&[entry]))
                .expect("update succeeds");
        })
    })
    .collect();

    for handle in handles {
        handle.join().expect("worker finished");
    }

    let record = service.get(&id).expect("present");
    assert_eq!(record.customer.answers.len(), 3);
    assert!(record
        .customer
        .missing_mandatory(&record.specification)
        .is_empty());
}
