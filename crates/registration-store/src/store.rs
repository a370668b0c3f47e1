//! Persistent storage backends for the registry.

use crate::error::RegistrationError;
use crate::registry::Registry;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

/// Outcome of preparing backing storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Initialization {
    /// Empty storage was created
    Created,
    /// Storage already existed and was left untouched
    AlreadyInitialized,
}

/// JSON document on disk.
pub struct FileStore {
    storage_path: PathBuf,
}

impl FileStore {
    pub fn new(storage_path: PathBuf) -> Self {
        Self { storage_path }
    }

    pub fn path(&self) -> &Path {
        &self.storage_path
    }

    /// Check if a registry file exists.
    pub fn exists(&self) -> bool {
        self.storage_path.exists()
    }

    /// Create an empty registry file unless one is already present.
    ///
    /// An existing file must parse; a corrupt file is reported rather than
    /// overwritten.
    pub async fn initialize(&self) -> Result<Initialization, RegistrationError> {
        if self.exists() {
            let registry = self.load().await?;
            info!(
                path = ?self.storage_path,
                records = registry.count(),
                "Registry already initialized"
            );
            return Ok(Initialization::AlreadyInitialized);
        }

        self.save(&Registry::new()).await?;
        info!(path = ?self.storage_path, "Created empty registry");
        Ok(Initialization::Created)
    }

    /// Save the registry to disk.
    ///
    /// Writes a temp file next to the target and renames it into place so a
    /// crash never leaves a half-written registry.
    pub async fn save(&self, registry: &Registry) -> Result<(), RegistrationError> {
        let data = serde_json::to_vec_pretty(registry)?;

        if let Some(parent) = self.storage_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await.map_err(|e| {
                    storage_error(&self.storage_path, "create parent directory", e)
                })?;
            }
        }

        let temp_path = self.storage_path.with_extension("tmp");
        fs::write(&temp_path, &data)
            .await
            .map_err(|e| storage_error(&temp_path, "write", e))?;
        fs::rename(&temp_path, &self.storage_path)
            .await
            .map_err(|e| storage_error(&self.storage_path, "rename into", e))?;

        debug!(
            "Saved registry ({} bytes) to {:?}",
            data.len(),
            self.storage_path
        );
        Ok(())
    }

    /// Load the registry from disk.
    ///
    /// Fails if the file does not exist: storage must be initialized first.
    pub async fn load(&self) -> Result<Registry, RegistrationError> {
        if !self.exists() {
            return Err(RegistrationError::StorageUnavailable(format!(
                "registry file {:?} not found; run `init-db` first",
                self.storage_path
            )));
        }

        let data = fs::read(&self.storage_path)
            .await
            .map_err(|e| storage_error(&self.storage_path, "read", e))?;

        let registry: Registry = serde_json::from_slice(&data).map_err(|e| {
            RegistrationError::StorageUnavailable(format!(
                "registry file {:?} is corrupt: {}",
                self.storage_path, e
            ))
        })?;
        registry.check_consistency().map_err(|reason| {
            RegistrationError::StorageUnavailable(format!(
                "registry file {:?} is inconsistent: {}",
                self.storage_path, reason
            ))
        })?;

        info!(
            "Loaded registry with {} records from {:?}",
            registry.count(),
            self.storage_path
        );
        Ok(registry)
    }
}

fn storage_error(path: &Path, action: &str, e: std::io::Error) -> RegistrationError {
    RegistrationError::StorageUnavailable(format!("failed to {} {:?}: {}", action, path, e))
}

/// In-memory store for tests or when persistence is disabled.
pub struct MemoryStore;

impl MemoryStore {
    /// "Save" does nothing for memory store.
    pub async fn save(&self, _registry: &Registry) -> Result<(), RegistrationError> {
        debug!("Memory store: save is a no-op");
        Ok(())
    }

    /// "Load" returns an empty registry.
    pub async fn load(&self) -> Result<Registry, RegistrationError> {
        debug!("Memory store: returning empty registry");
        Ok(Registry::new())
    }
}

/// Storage backend, with or without persistence.
pub enum Store {
    /// JSON file storage
    File(FileStore),
    /// In-memory only (no persistence)
    Memory(MemoryStore),
}

impl Store {
    /// File-backed store at `path`.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Store::File(FileStore::new(path.into()))
    }

    /// Memory-only store.
    pub fn memory() -> Self {
        warn!("Using in-memory storage (registrations will be lost on restart)");
        Store::Memory(MemoryStore)
    }

    /// Prepare empty backing storage. Safe to call repeatedly.
    pub async fn initialize(&self) -> Result<Initialization, RegistrationError> {
        match self {
            Store::File(s) => s.initialize().await,
            Store::Memory(_) => Ok(Initialization::Created),
        }
    }

    /// Save the registry.
    pub async fn save(&self, registry: &Registry) -> Result<(), RegistrationError> {
        match self {
            Store::File(s) => s.save(registry).await,
            Store::Memory(s) => s.save(registry).await,
        }
    }

    /// Load the registry.
    pub async fn load(&self) -> Result<Registry, RegistrationError> {
        match self {
            Store::File(s) => s.load().await,
            Store::Memory(s) => s.load().await,
        }
    }

    /// Human-readable description of where data lives.
    pub fn describe(&self) -> String {
        match self {
            Store::File(s) => format!("file {:?}", s.path()),
            Store::Memory(_) => "memory".to_string(),
        }
    }
}
