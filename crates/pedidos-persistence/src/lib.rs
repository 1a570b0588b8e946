//! Persistencia del panel sobre el almacén clave-valor de `panel-store`.
//! Este crate expone `SnapshotPanelRepository`, que implementa
//! `PanelRepository` guardando cada colección como JSON bajo su clave, y
//! `open`, que elige el backend.

mod snapshot_repository;

use log::info;
use panel_store::{FileSnapshotStore, InMemorySnapshotStore, SnapshotStore};
use pedidos_domain::DomainError;
use std::path::Path;
use std::sync::Arc;

pub use snapshot_repository::{SnapshotPanelRepository, CATALOG_KEY, CLAIMS_KEY, ORDERS_KEY, SESSION_KEY, USERS_KEY};

/// Repositorio con el backend elegido en tiempo de ejecución.
pub type DynPanelRepository = SnapshotPanelRepository<Box<dyn SnapshotStore>>;

/// Abre el repositorio: sobre archivos en `dir` si se indica, en memoria si
/// no.
pub fn open(dir: Option<&Path>) -> Result<DynPanelRepository, DomainError> {
  let store: Box<dyn SnapshotStore> = match dir {
    Some(d) => {
      let fs = FileSnapshotStore::open(d).map_err(|e| DomainError::Storage(e.to_string()))?;
      info!("almacén de archivos en {}", fs.dir().display());
      Box::new(fs)
    }
    None => {
      info!("sin directorio de almacén; usando almacén en memoria");
      Box::new(InMemorySnapshotStore::new())
    }
  };
  Ok(SnapshotPanelRepository::new(Arc::new(store)))
}
