// Archivo: repository.rs
// Propósito: definir el trait `SnapshotStore`, el contrato mínimo que deben
// cumplir los backends (memoria, archivos) que guardan colecciones completas
// bajo una clave.
use crate::errors::Result;

/// Almacén clave-valor de snapshots completos.
///
/// Cada clave guarda el valor serializado de una colección entera (o de un
/// único registro, como la sesión). Las escrituras reemplazan el valor
/// completo: no hay escrituras parciales ni versionado de esquema.
pub trait SnapshotStore: Send + Sync {
    /// Devuelve el valor guardado bajo `key`, o `None` si nunca se escribió
    /// (o fue eliminado).
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Reemplaza el valor de `key`.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Elimina la clave. Eliminar una clave inexistente no es un error.
    fn remove(&self, key: &str) -> Result<()>;
}

impl<S> SnapshotStore for Box<S> where S: SnapshotStore + ?Sized
{
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

impl<S> SnapshotStore for std::sync::Arc<S> where S: SnapshotStore + ?Sized
{
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}
