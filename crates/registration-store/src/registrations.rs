//! Registration record store with CPF uniqueness.

use crate::cpf::{self, Cpf};
use crate::error::RegistrationError;
use crate::record::{NewRegistration, RegistrationRecord};
use crate::registry::Registry;
use crate::store::{Initialization, Store};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, instrument, warn};

/// Accepted registrations, backed by a [`Store`].
///
/// Cloning is cheap and every clone shares the same records. The duplicate
/// check, insert and persist of [`submit`](Self::submit) all happen under
/// one write lock, so concurrent submissions of the same CPF admit exactly
/// one record.
#[derive(Clone)]
pub struct RegistrationStore {
    registry: Arc<RwLock<Registry>>,
    store: Arc<Store>,
}

impl RegistrationStore {
    /// Load existing records from `store`.
    ///
    /// Fails with `StorageUnavailable` if the store was never initialized.
    pub async fn open(store: Store) -> Result<Self, RegistrationError> {
        let registry = store.load().await?;
        info!(
            backend = %store.describe(),
            records = registry.count(),
            "Registration store opened"
        );

        Ok(Self {
            registry: Arc::new(RwLock::new(registry)),
            store: Arc::new(store),
        })
    }

    /// Empty store with no persistence.
    pub fn in_memory() -> Self {
        Self {
            registry: Arc::new(RwLock::new(Registry::new())),
            store: Arc::new(Store::memory()),
        }
    }

    /// Prepare the backing storage. No-op if it already exists.
    pub async fn initialize(store: &Store) -> Result<Initialization, RegistrationError> {
        store.initialize().await
    }

    /// Store a new registration.
    ///
    /// Fails with `DuplicateCpf` if the CPF is already registered. If the
    /// backing storage cannot be written the insert is rolled back and
    /// `StorageUnavailable` is returned.
    #[instrument(skip(self, new), fields(cpf = %new.cpf))]
    pub async fn submit(
        &self,
        new: NewRegistration,
    ) -> Result<RegistrationRecord, RegistrationError> {
        let cpf = new.cpf.clone();
        let mut registry = self.registry.write().await;

        let record = match registry.insert(new) {
            Some(record) => record,
            None => {
                warn!("Rejected duplicate CPF");
                return Err(RegistrationError::DuplicateCpf(cpf.to_string()));
            }
        };

        if let Err(e) = self.store.save(&registry).await {
            error!(error = %e, "Failed to persist registration, rolling back");
            registry.rollback(cpf.as_str());
            return Err(match e {
                e @ RegistrationError::StorageUnavailable(_) => e,
                other => RegistrationError::StorageUnavailable(other.to_string()),
            });
        }

        info!(id = record.id, "Registration stored");
        Ok(record)
    }

    /// Look up a registration by CPF (any punctuation accepted).
    pub async fn get(&self, cpf: &str) -> Result<Option<RegistrationRecord>, RegistrationError> {
        let cpf = Cpf::parse(cpf)?;
        let registry = self.registry.read().await;
        Ok(registry.get(cpf.as_str()).cloned())
    }

    /// Whether a normalized CPF is already registered.
    ///
    /// Malformed input is simply not registered.
    pub async fn contains(&self, cpf: &str) -> bool {
        let normalized = cpf::normalize(cpf);
        self.registry.read().await.contains(&normalized)
    }

    /// All registrations ordered by id.
    pub async fn list(&self) -> Vec<RegistrationRecord> {
        let registry = self.registry.read().await;
        registry.list().into_iter().cloned().collect()
    }

    /// Number of stored registrations.
    pub async fn count(&self) -> usize {
        self.registry.read().await.count()
    }
}
