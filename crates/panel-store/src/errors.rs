// Archivo: errors.rs
// Propósito: definir los errores del almacén clave-valor y el alias Result<T>
// usado por las APIs del crate.
use thiserror::Error;
/// Errores del almacén de snapshots.
///
/// - `Io`: fallo de lectura/escritura en disco.
/// - `Storage`: cualquier otro fallo del backend (mutex envenenado, etc.).
#[derive(Error, Debug)]
pub enum StoreError {
  /// Error de entrada/salida del backend de archivos.
  #[error("Error de E/S: {0}")]
  Io(#[from] std::io::Error),
  /// Error genérico de almacenamiento.
  #[error("Error de almacenamiento: {0}")]
  Storage(String),
}
/// Alias de resultado usado por las APIs del crate.
pub type Result<T> = std::result::Result<T, StoreError>;
