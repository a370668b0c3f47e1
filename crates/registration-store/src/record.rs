//! Registration record types.

use crate::cpf::Cpf;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Marital status as offered by the registration form.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MaritalStatus {
    #[serde(rename = "solteiro")]
    Single,
    #[serde(rename = "casado")]
    Married,
    #[serde(rename = "divorciado")]
    Divorced,
    #[serde(rename = "viuvo")]
    Widowed,
}

impl MaritalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaritalStatus::Single => "solteiro",
            MaritalStatus::Married => "casado",
            MaritalStatus::Divorced => "divorciado",
            MaritalStatus::Widowed => "viuvo",
        }
    }
}

impl FromStr for MaritalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "solteiro" => Ok(MaritalStatus::Single),
            "casado" => Ok(MaritalStatus::Married),
            "divorciado" => Ok(MaritalStatus::Divorced),
            "viuvo" => Ok(MaritalStatus::Widowed),
            other => Err(format!(
                "unknown marital status '{}' (expected solteiro, casado, divorciado or viuvo)",
                other
            )),
        }
    }
}

impl fmt::Display for MaritalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sex as offered by the registration form.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Sex {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
    #[serde(rename = "O")]
    Other,
}

impl FromStr for Sex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "M" => Ok(Sex::Male),
            "F" => Ok(Sex::Female),
            "O" => Ok(Sex::Other),
            other => Err(format!("unknown sex '{}' (expected M, F or O)", other)),
        }
    }
}

/// A validated registration that has not been stored yet.
///
/// Built at the input boundary once every field has been checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRegistration {
    pub cpf: Cpf,
    pub name: String,
    pub marital_status: Option<MaritalStatus>,
    pub sex: Option<Sex>,
    pub birth_date: Option<NaiveDate>,
    pub address: Option<String>,
    pub neighborhood: Option<String>,
    pub city_state: Option<String>,
    pub phone: Option<String>,
    pub age: Option<u8>,
    pub team_leader: bool,
}

impl NewRegistration {
    /// Minimal registration with only the required fields.
    pub fn new(cpf: Cpf, name: impl Into<String>) -> Self {
        Self {
            cpf,
            name: name.into(),
            marital_status: None,
            sex: None,
            birth_date: None,
            address: None,
            neighborhood: None,
            city_state: None,
            phone: None,
            age: None,
            team_leader: false,
        }
    }
}

/// A stored registration. Never mutated after insert.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegistrationRecord {
    pub id: u64,
    pub cpf: Cpf,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marital_status: Option<MaritalStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sex: Option<Sex>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,
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
    #[serde(default)]
    pub team_leader: bool,
    pub created_at: DateTime<Utc>,
}

impl RegistrationRecord {
    /// Turn an accepted submission into a record with the given id.
    pub fn from_new(id: u64, new: NewRegistration) -> Self {
        Self {
            id,
            cpf: new.cpf,
            name: new.name,
            marital_status: new.marital_status,
            sex: new.sex,
            birth_date: new.birth_date,
            address: new.address,
            neighborhood: new.neighborhood,
            city_state: new.city_state,
            phone: new.phone,
            age: new.age,
            team_leader: new.team_leader,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cpf() -> Cpf {
        Cpf::parse("12345678909").unwrap()
    }

    #[test]
    fn test_marital_status_parse() {
        assert_eq!("casado".parse::<MaritalStatus>(), Ok(MaritalStatus::Married));
        assert_eq!("viuvo".parse::<MaritalStatus>(), Ok(MaritalStatus::Widowed));
        assert!("married".parse::<MaritalStatus>().is_err());
    }

    #[test]
    fn test_sex_parse() {
        assert_eq!("F".parse::<Sex>(), Ok(Sex::Female));
        assert!("f".parse::<Sex>().is_err());
    }

    #[test]
    fn test_record_from_new() {
        let mut new = NewRegistration::new(cpf(), "Maria da Silva");
        new.team_leader = true;
        new.age = Some(34);

        let record = RegistrationRecord::from_new(7, new);
        assert_eq!(record.id, 7);
        assert_eq!(record.cpf.as_str(), "12345678909");
        assert_eq!(record.name, "Maria da Silva");
        assert!(record.team_leader);
        assert_eq!(record.age, Some(34));
    }

    #[test]
    fn test_record_serialization() {
        let mut new = NewRegistration::new(cpf(), "João");
        new.marital_status = Some(MaritalStatus::Single);
        new.sex = Some(Sex::Male);
        new.birth_date = NaiveDate::from_ymd_opt(1990, 5, 17);
        let record = RegistrationRecord::from_new(1, new);

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"cpf\":\"12345678909\""));
        assert!(json.contains("\"marital_status\":\"solteiro\""));
        assert!(json.contains("\"sex\":\"M\""));
        assert!(json.contains("\"birth_date\":\"1990-05-17\""));
        assert!(!json.contains("\"phone\""));

        let restored: RegistrationRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, record);
    }

    #[test]
    fn test_record_deserialization_rejects_bad_cpf() {
        let json = r#"{
            "id": 1,
            "cpf": "11111111111",
            "name": "Someone",
            "created_at": "2025-11-01T00:00:00Z"
        }"#;

        assert!(serde_json::from_str::<RegistrationRecord>(json).is_err());
    }
}
