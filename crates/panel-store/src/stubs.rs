// Archivo: stubs.rs
// Propósito: implementación en memoria del almacén para pruebas y wiring
// rápido. No es durable.
use crate::errors::{Result, StoreError};
use crate::repository::SnapshotStore;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Almacén en memoria: un `HashMap` clave -> valor serializado protegido por
/// un `Mutex`.
#[derive(Debug)]
pub struct InMemorySnapshotStore {
    entries: Mutex<HashMap<String, String>>,
}

impl InMemorySnapshotStore {
    /// Crea un almacén vacío.
    pub fn new() -> Self {
        Self { entries: Mutex::new(HashMap::new()) }
    }

    /// Claves presentes, ordenadas (útil para inspección en pruebas).
    pub fn keys(&self) -> Result<Vec<String>> {
        let entries = self.lock()?;
        let mut keys: Vec<String> = entries.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }

    /// Helper para mapear `Mutex::lock()` en un `Result` con
    /// `StoreError::Storage`.
    fn lock(&self) -> std::result::Result<MutexGuard<'_, HashMap<String, String>>, StoreError> {
        self.entries
            .lock()
            .map_err(|e| StoreError::Storage(format!("mutex poisoned: {:?}", e)))
    }
}

impl Default for InMemorySnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotStore for InMemorySnapshotStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}
