//! Registration records with CPF validation.
//!
//! Submissions are checked against the CPF verification digits and stored
//! with one record per CPF, either in memory or in a JSON file on disk.

pub mod cpf;
mod error;
mod record;
mod registrations;
mod registry;
mod store;

pub use cpf::{Cpf, CpfError};
pub use error::RegistrationError;
pub use record::*;
pub use registrations::RegistrationStore;
pub use registry::Registry;
pub use store::{FileStore, Initialization, MemoryStore, Store};
