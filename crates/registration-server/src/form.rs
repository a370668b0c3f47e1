//! Typed registration form and its validation.
//!
//! Browsers submit every field as text, and empty inputs arrive as empty
//! strings, so optional fields are treated as absent when blank.

use crate::error::ApiError;
use chrono::NaiveDate;
use registration_store::{Cpf, MaritalStatus, NewRegistration, Sex};
use serde::Deserialize;

pub const NAME_MAX_LEN: usize = 200;
pub const ADDRESS_MAX_LEN: usize = 300;
pub const NEIGHBORHOOD_MAX_LEN: usize = 150;
pub const CITY_STATE_MAX_LEN: usize = 150;
pub const AGE_MAX: u8 = 150;

/// Registration form as submitted.
///
/// Unknown fields are rejected. A missing `cpf` or `name` deserializes as
/// blank and is rejected by the same checks as a blank value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistrationForm {
    #[serde(default)]
    pub cpf: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub marital_status: Option<String>,
    #[serde(default)]
    pub sex: Option<String>,
    /// YYYY-MM-DD
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub neighborhood: Option<String>,
    #[serde(default)]
    pub city_state: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub age: Option<String>,
    /// `sim` or `nao`
    #[serde(default)]
    pub team_leader: Option<String>,
}

impl TryFrom<RegistrationForm> for NewRegistration {
    type Error = ApiError;

    fn try_from(form: RegistrationForm) -> Result<Self, Self::Error> {
        let cpf = parse_cpf(&form.cpf)?;
        let name = parse_name(&form.name)?;

        Ok(NewRegistration {
            cpf,
            name,
            marital_status: present(form.marital_status)
                .map(|s| s.parse::<MaritalStatus>())
                .transpose()
                .map_err(|e| ApiError::invalid_field("marital_status", e))?,
            sex: present(form.sex)
                .map(|s| s.parse::<Sex>())
                .transpose()
                .map_err(|e| ApiError::invalid_field("sex", e))?,
            birth_date: present(form.birth_date)
                .map(|s| parse_birth_date(&s))
                .transpose()?,
            address: bounded("address", form.address, ADDRESS_MAX_LEN)?,
            neighborhood: bounded("neighborhood", form.neighborhood, NEIGHBORHOOD_MAX_LEN)?,
            city_state: bounded("city_state", form.city_state, CITY_STATE_MAX_LEN)?,
            phone: present(form.phone).map(parse_phone).transpose()?,
            age: present(form.age).map(|s| parse_age(&s)).transpose()?,
            team_leader: present(form.team_leader)
                .map(|s| parse_team_leader(&s))
                .transpose()?
                .unwrap_or(false),
        })
    }
}

/// Trimmed value, or `None` when missing or blank.
fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Only digits, dots, dashes and spaces may appear before normalization.
fn parse_cpf(raw: &str) -> Result<Cpf, ApiError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ApiError::InvalidFormat("CPF is required".into()));
    }
    if !raw
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | ' '))
    {
        return Err(ApiError::InvalidFormat(
            "only digits, '.', '-' and spaces are allowed".into(),
        ));
    }

    Ok(Cpf::parse(raw)?)
}

fn parse_name(raw: &str) -> Result<String, ApiError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(ApiError::invalid_field("name", "name is required"));
    }
    if name.chars().count() > NAME_MAX_LEN {
        return Err(ApiError::invalid_field(
            "name",
            format!("at most {} characters", NAME_MAX_LEN),
        ));
    }
    Ok(name.to_string())
}

fn bounded(
    field: &'static str,
    value: Option<String>,
    max: usize,
) -> Result<Option<String>, ApiError> {
    match present(value) {
        Some(v) if v.chars().count() > max => Err(ApiError::invalid_field(
            field,
            format!("at most {} characters", max),
        )),
        other => Ok(other),
    }
}

fn parse_birth_date(raw: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| ApiError::invalid_field("birth_date", "expected YYYY-MM-DD"))
}

fn parse_phone(raw: String) -> Result<String, ApiError> {
    let allowed = |c: char| c.is_ascii_digit() || c.is_whitespace() || "()-+".contains(c);
    if raw.chars().all(allowed) {
        Ok(raw)
    } else {
        Err(ApiError::invalid_field(
            "phone",
            "only digits, parentheses, spaces, '-' and '+' are allowed",
        ))
    }
}

fn parse_age(raw: &str) -> Result<u8, ApiError> {
    match raw.parse::<u8>() {
        Ok(age) if age <= AGE_MAX => Ok(age),
        _ => Err(ApiError::invalid_field(
            "age",
            format!("must be a whole number between 0 and {}", AGE_MAX),
        )),
    }
}

fn parse_team_leader(raw: &str) -> Result<bool, ApiError> {
    match raw {
        "sim" => Ok(true),
        "nao" => Ok(false),
        _ => Err(ApiError::invalid_field("team_leader", "expected 'sim' or 'nao'")),
    }
}
