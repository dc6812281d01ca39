use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use taxpay_core::{
    PaymentError, PaymentSubmission, TaxCalculator, TaxType, VerificationError,
};
use tracing::{error, warn};

use crate::dto::{
    CalculateTaxRequest, CalculateTaxResponse, HealthResponse, ProcessPaymentRequest,
    ProcessPaymentResponse, VerifyTaxIdRequest, VerifyTaxIdResponse,
};
use crate::state::AppState;
use crate::utils::parse_amount;

pub const ALLOWED_HEADERS: &str = "authorization, x-client-info, apikey, content-type";

const INVALID_BODY: &str = "Invalid request body";
const VERIFY_FAILED: &str = "Failed to verify Tax ID. Please try again.";
const PAYMENT_FAILED: &str = "Payment processing failed";
const INCOME_REQUIRED: &str = "Income is required";
const INVALID_INCOME: &str = "Please enter a valid income amount";

type Reply<T> = (StatusCode, Json<T>);

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        backend: state.backend.clone(),
    })
}

/// Bare `OPTIONS`; the CORS layers add the headers.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

pub async fn verify_tax_id(
    State(state): State<AppState>,
    payload: Result<Json<VerifyTaxIdRequest>, JsonRejection>,
) -> Reply<VerifyTaxIdResponse> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!(%rejection, "malformed verify-tax-id body");
            return (
                StatusCode::BAD_REQUEST,
                Json(VerifyTaxIdResponse::failed(INVALID_BODY)),
            );
        }
    };

    let raw = request.tax_id.unwrap_or_default();
    match state.verifier.verify(&raw).await {
        Ok(verification) => (
            StatusCode::OK,
            Json(VerifyTaxIdResponse::verified(verification)),
        ),
        Err(VerificationError::Invalid(reason)) => (
            StatusCode::BAD_REQUEST,
            Json(VerifyTaxIdResponse::failed(reason.to_string())),
        ),
        Err(VerificationError::Registry(source)) => {
            error!(error = %source, "tax id registry failure");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(VerifyTaxIdResponse::failed(VERIFY_FAILED)),
            )
        }
    }
}

pub async fn process_tax_payment(
    State(state): State<AppState>,
    payload: Result<Json<ProcessPaymentRequest>, JsonRejection>,
) -> Reply<ProcessPaymentResponse> {
    let submission = match payload {
        Ok(Json(request)) => PaymentSubmission::from(request),
        Err(rejection) => {
            warn!(%rejection, "malformed process-tax-payment body");
            return (
                StatusCode::BAD_REQUEST,
                Json(ProcessPaymentResponse::failed(INVALID_BODY)),
            );
        }
    };

    match state.processor.process(&submission).await {
        Ok(record) => (
            StatusCode::OK,
            Json(ProcessPaymentResponse::processed(record)),
        ),
        Err(PaymentError::Settlement(source)) => {
            error!(error = %source, "settlement failure");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ProcessPaymentResponse::failed(PAYMENT_FAILED)),
            )
        }
        Err(rejection) => (
            StatusCode::BAD_REQUEST,
            Json(ProcessPaymentResponse::failed(rejection.to_string())),
        ),
    }
}

pub async fn calculate_tax(
    State(state): State<AppState>,
    payload: Result<Json<CalculateTaxRequest>, JsonRejection>,
) -> Reply<CalculateTaxResponse> {
    let bad_request =
        |message: String| (StatusCode::BAD_REQUEST, Json(CalculateTaxResponse::failed(message)));

    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!(%rejection, "malformed calculate-tax body");
            return bad_request(INVALID_BODY.to_string());
        }
    };

    let tax_type = match request
        .tax_type
        .as_deref()
        .unwrap_or_default()
        .parse::<TaxType>()
    {
        Ok(tax_type) => tax_type,
        Err(unknown) => return bad_request(unknown.to_string()),
    };

    let income = match request.income.map(|field| parse_amount(&field.as_text())) {
        None | Some(Ok(None)) => return bad_request(INCOME_REQUIRED.to_string()),
        Some(Ok(Some(income))) => income,
        Some(Err(_)) => return bad_request(INVALID_INCOME.to_string()),
    };

    match TaxCalculator::new(&state.schedules).calculate(income, tax_type) {
        Ok(computation) => (
            StatusCode::OK,
            Json(CalculateTaxResponse::calculated(computation)),
        ),
        Err(reason) => bad_request(reason.to_string()),
    }
}
