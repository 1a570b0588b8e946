//! Crate `panel-store`: almacén clave-valor de snapshots completos
//!
//! Define el contrato `SnapshotStore` (get/set/remove de valores enteros por
//! clave), una implementación en memoria para pruebas
//! (`InMemorySnapshotStore`) y una implementación durable sobre archivos
//! (`FileSnapshotStore`).
//!
//! El almacén no interpreta los valores: guarda texto (JSON en la práctica)
//! y cada escritura reemplaza el valor completo de la clave.
//!
//! Ejemplo rápido:
//! ```rust
//! use panel_store::{InMemorySnapshotStore, SnapshotStore};
//! let store = InMemorySnapshotStore::new();
//! store.set("users", "[]").unwrap();
//! assert_eq!(store.get("users").unwrap().as_deref(), Some("[]"));
//! ```
pub mod errors;
pub mod fs;
pub mod repository;
pub mod stubs;

pub use errors::*;
pub use fs::FileSnapshotStore;
pub use repository::*;
pub use stubs::*;
