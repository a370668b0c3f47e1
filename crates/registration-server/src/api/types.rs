//! API response types.

use registration_store::{MaritalStatus, RegistrationRecord, Sex};
use serde::Serialize;

/// A stored registration as returned by the API.
#[derive(Debug, Serialize)]
pub struct RegistrationInfo {
    pub id: u64,
    pub cpf: String,
    pub cpf_formatted: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marital_status: Option<MaritalStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sex: Option<Sex>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub neighborhood: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city_state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u8>,
    pub team_leader: bool,
    pub created_at: String,
}

impl From<RegistrationRecord> for RegistrationInfo {
    fn from(record: RegistrationRecord) -> Self {
        Self {
            id: record.id,
            cpf_formatted: record.cpf.formatted(),
            cpf: record.cpf.to_string(),
            name: record.name,
            marital_status: record.marital_status,
            sex: record.sex,
            birth_date: record.birth_date.map(|d| d.format("%Y-%m-%d").to_string()),
            address: record.address,
            neighborhood: record.neighborhood,
            city_state: record.city_state,
            phone: record.phone,
            age: record.age,
            team_leader: record.team_leader,
            created_at: record.created_at.to_rfc3339(),
        }
    }
}

/// Response after a successful submission.
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub registration: RegistrationInfo,
    pub message: String,
}

/// List of registrations.
#[derive(Debug, Serialize)]
pub struct RegistrationsResponse {
    pub registrations: Vec<RegistrationInfo>,
    pub total: usize,
}

/// Result of checking a CPF without registering it.
#[derive(Debug, Serialize)]
pub struct CpfCheckResponse {
    /// Input with punctuation stripped
    pub cpf: String,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub registrations: usize,
}
