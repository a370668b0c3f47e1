//! In-memory registration registry.

use crate::record::{NewRegistration, RegistrationRecord};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Registration records indexed by normalized CPF.
///
/// This is also the persisted document shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registry {
    /// Id handed to the next inserted record
    next_id: u64,

    /// Records indexed by normalized CPF
    records: HashMap<String, RegistrationRecord>,
}

fn first_id() -> u64 {
    1
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            next_id: first_id(),
            records: HashMap::new(),
        }
    }

    /// Get a record by normalized CPF.
    pub fn get(&self, cpf: &str) -> Option<&RegistrationRecord> {
        self.records.get(cpf)
    }

    pub fn contains(&self, cpf: &str) -> bool {
        self.records.contains_key(cpf)
    }

    /// Insert a new registration unless its CPF is already present.
    ///
    /// Returns `None` on a duplicate CPF, leaving the registry untouched.
    pub fn insert(&mut self, new: NewRegistration) -> Option<RegistrationRecord> {
        let key = new.cpf.as_str().to_string();
        if self.records.contains_key(&key) {
            return None;
        }

        let record = RegistrationRecord::from_new(self.next_id, new);
        self.next_id += 1;
        self.records.insert(key, record.clone());
        Some(record)
    }

    /// Undo the most recent insert of `cpf`.
    ///
    /// Only used to roll back when persisting an insert fails.
    pub(crate) fn rollback(&mut self, cpf: &str) {
        if let Some(record) = self.records.remove(cpf) {
            if record.id + 1 == self.next_id {
                self.next_id = record.id;
            }
        }
    }

    /// All records ordered by id.
    pub fn list(&self) -> Vec<&RegistrationRecord> {
        let mut records: Vec<_> = self.records.values().collect();
        records.sort_by_key(|r| r.id);
        records
    }

    /// Number of stored records.
    pub fn count(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Check a deserialized registry: every key is its record's CPF, ids are
    /// unique, and `next_id` is past every stored id.
    pub(crate) fn check_consistency(&self) -> Result<(), String> {
        let mut ids = HashSet::with_capacity(self.records.len());
        for (key, record) in &self.records {
            if key != record.cpf.as_str() {
                return Err(format!(
                    "record {} is stored under key {:?} but has CPF {}",
                    record.id, key, record.cpf
                ));
            }
            if !ids.insert(record.id) {
                return Err(format!("duplicate record id {}", record.id));
            }
            if record.id >= self.next_id {
                return Err(format!(
                    "record id {} is not below next_id {}",
                    record.id, self.next_id
                ));
            }
        }
        Ok(())
    }
}
