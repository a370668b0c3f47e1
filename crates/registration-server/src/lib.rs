//! Registration service ("inscrições").
//!
//! Accepts registration submissions over HTTP, validates the CPF and the
//! remaining form fields, and stores one registration per CPF.

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod form;

pub use config::Config;
pub use error::ApiError;
pub use form::RegistrationForm;
