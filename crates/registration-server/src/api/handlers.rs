//! HTTP request handlers.

use super::types::{
    CpfCheckResponse, HealthResponse, RegistrationInfo, RegistrationsResponse, SubmitResponse,
};
use super::AppState;
use crate::error::ApiError;
use crate::form::RegistrationForm;
use axum::{
    extract::{
        rejection::{FormRejection, JsonRejection},
        Path, State,
    },
    http::StatusCode,
    Form, Json,
};
use chrono::Local;
use registration_store::{cpf, NewRegistration};
use tracing::{info, warn};

/// Health check endpoint.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        registrations: state.registrations.count().await,
    })
}

/// Submit a registration as JSON.
pub async fn submit_json(
    State(state): State<AppState>,
    body: Result<Json<RegistrationForm>, JsonRejection>,
) -> Result<(StatusCode, Json<SubmitResponse>), ApiError> {
    let Json(form) = body.map_err(rejected_body)?;
    submit(state, form).await
}

/// Submit a registration as an urlencoded HTML form.
pub async fn submit_form(
    State(state): State<AppState>,
    body: Result<Form<RegistrationForm>, FormRejection>,
) -> Result<(StatusCode, Json<SubmitResponse>), ApiError> {
    let Form(form) = body.map_err(rejected_body)?;
    submit(state, form).await
}

fn rejected_body(rejection: impl Into<ApiError>) -> ApiError {
    let err = rejection.into();
    info!(code = err.code(), "Registration rejected: {}", err);
    err
}

async fn submit(
    state: AppState,
    form: RegistrationForm,
) -> Result<(StatusCode, Json<SubmitResponse>), ApiError> {
    let today = Local::now().date_naive();
    if !state.window.is_open(today) {
        warn!(opens_on = %state.window.opens_on, "Submission before registrations open");
        return Err(ApiError::RegistrationNotOpen(
            state.window.opens_on.format("%Y-%m-%d").to_string(),
        ));
    }

    let new = NewRegistration::try_from(form).map_err(|e| {
        info!(code = e.code(), "Registration rejected: {}", e);
        e
    })?;

    let record = state.registrations.submit(new).await?;
    info!(id = record.id, "Registration accepted");

    Ok((
        StatusCode::CREATED,
        Json(SubmitResponse {
            registration: record.into(),
            message: "Registration completed successfully".to_string(),
        }),
    ))
}

/// Look up a registration by CPF.
pub async fn get_registration(
    State(state): State<AppState>,
    Path(input): Path<String>,
) -> Result<Json<RegistrationInfo>, ApiError> {
    let record = state
        .registrations
        .get(&input)
        .await?
        .ok_or_else(|| ApiError::NotFound(cpf::normalize(&input)))?;

    Ok(Json(record.into()))
}

/// List all registrations.
pub async fn list_registrations(State(state): State<AppState>) -> Json<RegistrationsResponse> {
    let registrations: Vec<RegistrationInfo> = state
        .registrations
        .list()
        .await
        .into_iter()
        .map(Into::into)
        .collect();

    let total = registrations.len();
    Json(RegistrationsResponse {
        registrations,
        total,
    })
}

/// Check a CPF without registering it.
pub async fn check_cpf(Path(input): Path<String>) -> Json<CpfCheckResponse> {
    let normalized = cpf::normalize(&input);
    let response = match cpf::validate(&input) {
        Ok(_) => CpfCheckResponse {
            cpf: normalized,
            valid: true,
            reason: None,
        },
        Err(e) => CpfCheckResponse {
            cpf: normalized,
            valid: false,
            reason: Some(e.to_string()),
        },
    };

    Json(response)
}
