//! Registration storage errors.

use crate::cpf::CpfError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistrationError {
    #[error(transparent)]
    InvalidCpf(#[from] CpfError),

    #[error("CPF already registered: {0}")]
    DuplicateCpf(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<std::io::Error> for RegistrationError {
    fn from(e: std::io::Error) -> Self {
        RegistrationError::StorageUnavailable(e.to_string())
    }
}
