use log::debug;
use panel_store::{SnapshotStore, StoreError};
use pedidos_domain::{Catalog, Claim, DomainError, Order, PanelRepository, Session, User};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

/// Claves bajo las que se guardan las colecciones.
pub const USERS_KEY: &str = "users";
pub const ORDERS_KEY: &str = "solicitudes";
pub const CLAIMS_KEY: &str = "reclamos";
pub const SESSION_KEY: &str = "currentUser";
pub const CATALOG_KEY: &str = "productos";

/// Repo que implementa `PanelRepository` sobre cualquier `SnapshotStore`,
/// guardando cada colección como un documento JSON completo.
pub struct SnapshotPanelRepository<S>
  where S: SnapshotStore
{
  store: Arc<S>,
}

impl<S> SnapshotPanelRepository<S> where S: SnapshotStore
{
  pub fn new(store: Arc<S>) -> Self {
    Self { store }
  }

  pub fn store(&self) -> &Arc<S> {
    &self.store
  }

  fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, DomainError> {
    match self.store.get(key).map_err(store_error)? {
      Some(raw) => {
        debug!("leyendo '{}' ({} bytes)", key, raw.len());
        Ok(Some(serde_json::from_str(&raw)?))
      }
      None => Ok(None),
    }
  }

  fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), DomainError> {
    let raw = serde_json::to_string(value)?;
    self.store.set(key, &raw).map_err(store_error)
  }
}

fn store_error(e: StoreError) -> DomainError {
  DomainError::Storage(e.to_string())
}

impl<S> PanelRepository for SnapshotPanelRepository<S> where S: SnapshotStore
{
  fn load_users(&self) -> Result<Vec<User>, DomainError> {
    Ok(self.read(USERS_KEY)?.unwrap_or_default())
  }

  fn save_users(&self, users: &[User]) -> Result<(), DomainError> {
    self.write(USERS_KEY, users)
  }

  fn load_orders(&self) -> Result<Vec<Order>, DomainError> {
    Ok(self.read(ORDERS_KEY)?.unwrap_or_default())
  }

  fn save_orders(&self, orders: &[Order]) -> Result<(), DomainError> {
    self.write(ORDERS_KEY, orders)
  }

  fn load_claims(&self) -> Result<Vec<Claim>, DomainError> {
    Ok(self.read(CLAIMS_KEY)?.unwrap_or_default())
  }

  fn save_claims(&self, claims: &[Claim]) -> Result<(), DomainError> {
    self.write(CLAIMS_KEY, claims)
  }

  fn load_catalog(&self) -> Result<Option<Catalog>, DomainError> {
    self.read(CATALOG_KEY)
  }

  fn save_catalog(&self, catalog: &Catalog) -> Result<(), DomainError> {
    self.write(CATALOG_KEY, catalog)
  }

  fn load_session(&self) -> Result<Option<Session>, DomainError> {
    self.read(SESSION_KEY)
  }

  fn save_session(&self, session: Option<&Session>) -> Result<(), DomainError> {
    match session {
      Some(s) => self.write(SESSION_KEY, s),
      None => self.store.remove(SESSION_KEY).map_err(store_error),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use panel_store::InMemorySnapshotStore;

  #[test]
  fn empty_store_reads_as_empty_collections() -> Result<(), DomainError> {
    let repo = SnapshotPanelRepository::new(Arc::new(InMemorySnapshotStore::new()));
    assert!(repo.load_users()?.is_empty());
    assert!(repo.load_orders()?.is_empty());
    assert!(repo.load_claims()?.is_empty());
    assert!(repo.load_catalog()?.is_none());
    assert!(repo.load_session()?.is_none());
    Ok(())
  }

  #[test]
  fn corrupt_value_is_a_serialization_error() -> Result<(), StoreError> {
    let store = Arc::new(InMemorySnapshotStore::new());
    store.set(ORDERS_KEY, "{not json")?;
    let repo = SnapshotPanelRepository::new(store);
    match repo.load_orders() {
      Err(DomainError::SerializationError(_)) => {}
      other => panic!("expected SerializationError, got {:?}", other),
    }
    Ok(())
  }
}
