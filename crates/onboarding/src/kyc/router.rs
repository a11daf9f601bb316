use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

use super::codec::{AnswerPayload, CompactAnswers, StructuredAnswers};
use super::customer::{CustomerId, LifecycleError};
use super::service::{OnboardingError, OnboardingService};
use super::store::CustomerStore;

pub const WELCOME_MESSAGE: &str = "Welcome to Onboarding API";

/// Body of `POST /v1/customers`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCustomerRequest {
    pub kind: String,
    pub entity: String,
}

/// Body of the answer submission routes; `kyc` is the version-specific encoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateCustomerRequest<P> {
    pub kyc_version: u32,
    pub kyc: P,
}

/// Router builder exposing the customer onboarding endpoints.
pub fn onboarding_router<S>(service: Arc<OnboardingService<S>>) -> Router
where
    S: CustomerStore + 'static,
{
    Router::new()
        .route("/", get(welcome_handler))
        .route("/v1/customers", post(create_handler::<S>))
        .route(
            "/v1/customers/:customer_id",
            get(get_handler::<S>).put(update_handler::<S, StructuredAnswers>),
        )
        .route(
            "/v2/customers/:customer_id",
            put(update_handler::<S, CompactAnswers>),
        )
        .route(
            "/v1/customers/:customer_id/submit",
            post(submit_handler::<S>),
        )
        .with_state(service)
}

pub(crate) async fn welcome_handler() -> Json<serde_json::Value> {
    Json(json!({ "message": WELCOME_MESSAGE }))
}

pub(crate) async fn create_handler<S>(
    State(service): State<Arc<OnboardingService<S>>>,
    payload: Result<Json<CreateCustomerRequest>, JsonRejection>,
) -> Result<Response, ApiError>
where
    S: CustomerStore + 'static,
{
    let Json(request) = payload.map_err(ApiError::malformed_body)?;
    let record = service.create(&request.kind, &request.entity)?;
    json_response(StatusCode::CREATED, &record.created_view())
}

pub(crate) async fn update_handler<S, P>(
    State(service): State<Arc<OnboardingService<S>>>,
    Path(raw_id): Path<String>,
    payload: Result<Json<UpdateCustomerRequest<P>>, JsonRejection>,
) -> Result<Response, ApiError>
where
    S: CustomerStore + 'static,
    P: AnswerPayload + for<'de> Deserialize<'de> + Send + 'static,
{
    let customer_id = parse_customer_id(&raw_id)?;
    let Json(request) = payload.map_err(ApiError::malformed_body)?;
    let record = service.update_answers(&customer_id, request.kyc_version, request.kyc)?;
    json_response(StatusCode::OK, &record.view())
}

pub(crate) async fn get_handler<S>(
    State(service): State<Arc<OnboardingService<S>>>,
    Path(raw_id): Path<String>,
) -> Result<Response, ApiError>
where
    S: CustomerStore + 'static,
{
    let customer_id = parse_customer_id(&raw_id)?;
    let record = service.get(&customer_id)?;
    json_response(StatusCode::OK, &record.view())
}

pub(crate) async fn submit_handler<S>(
    State(service): State<Arc<OnboardingService<S>>>,
    Path(raw_id): Path<String>,
) -> Result<Response, ApiError>
where
    S: CustomerStore + 'static,
{
    let customer_id = parse_customer_id(&raw_id)?;
    let record = service.submit(&customer_id)?;
    json_response(StatusCode::OK, &record.view())
}

fn parse_customer_id(raw: &str) -> Result<CustomerId, ApiError> {
    if raw.trim().is_empty() {
        return Err(ApiError::missing_parameter("id"));
    }
    raw.parse().map_err(|_| ApiError::invalid_identifier(raw))
}

/// Serializes `body` up front so an encoding failure becomes a 500 with an error body.
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Result<Response, ApiError> {
    let bytes = serde_json::to_vec(body).map_err(ApiError::encoding)?;
    Ok((status, [(header::CONTENT_TYPE, "application/json")], bytes).into_response())
}

/// Error returned to HTTP clients as `{message, details}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    status: StatusCode,
    message: &'static str,
    details: String,
}

impl ApiError {
    fn new(status: StatusCode, message: &'static str, details: impl Into<String>) -> Self {
        Self {
            status,
            message,
            details: details.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        self.message
    }

    pub fn details(&self) -> &str {
        &self.details
    }

    pub fn malformed_body(rejection: JsonRejection) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "Body is malformed",
            rejection.body_text(),
        )
    }

    pub fn invalid_identifier(raw: &str) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "Invalid id",
            format!("the id '{raw}' is an invalid universal identifier"),
        )
    }

    pub fn missing_parameter(name: &str) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "Missing route param",
            format!("'{name}' is missing"),
        )
    }

    pub fn encoding(err: serde_json::Error) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Could not encode the response",
            err.to_string(),
        )
    }
}

impl From<OnboardingError> for ApiError {
    fn from(err: OnboardingError) -> Self {
        let (status, message) = match &err {
            OnboardingError::Resolve(_) => (StatusCode::BAD_REQUEST, "Field values do not match"),
            OnboardingError::Codec(_) => (StatusCode::BAD_REQUEST, "Answers are malformed"),
            OnboardingError::Lifecycle(LifecycleError::VersionMismatch { .. }) => {
                (StatusCode::BAD_REQUEST, "The KYC version is invalid")
            }
            OnboardingError::Lifecycle(LifecycleError::InvalidState { .. }) => {
                (StatusCode::CONFLICT, "The KYC record was already submitted")
            }
            OnboardingError::NotFound(_) => (StatusCode::NOT_FOUND, "The customer does not exist"),
            OnboardingError::UnknownVersion(_) | OnboardingError::Store(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Unexpected server error")
            }
        };
        Self::new(status, message, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, details = %self.details, "{}", self.message);
        }

        let body = Json(json!({
            "message": self.message,
            "details": self.details,
        }));
        (self.status, body).into_response()
    }
}
