// errors.rs
use thiserror::Error;

/// Taxonomía de errores del panel. Todos son recuperables: cada comando
/// devuelve `Result<_, DomainError>` y la capa de presentación decide el
/// mensaje a mostrar.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
  /// Un id o nombre de usuario no resuelve.
  #[error("No encontrado: {0}")]
  NotFound(String),
  /// Nombre de usuario (o id de producto) duplicado.
  #[error("Conflicto: {0}")]
  Conflict(String),
  /// Cambio de estado no permitido desde el estado actual.
  #[error("Transición inválida de {entity}: {from} -> {to}")]
  InvalidTransition { entity: String, from: String, to: String },
  #[error("Error de validación: {0}")]
  ValidationError(String),
  /// Credenciales incorrectas, sesión ausente o rol insuficiente.
  #[error("Autenticación fallida: {0}")]
  AuthFailure(String),
  #[error("Error de almacenamiento: {0}")]
  Storage(String),
  #[error("Error de serialización: {0}")]
  SerializationError(String),
}

impl DomainError {
  pub(crate) fn transition(entity: &str, from: impl ToString, to: impl ToString) -> Self {
    Self::InvalidTransition { entity: entity.to_string(), from: from.to_string(), to: to.to_string() }
  }
}

impl From<serde_json::Error> for DomainError {
  fn from(e: serde_json::Error) -> Self {
    Self::SerializationError(e.to_string())
  }
}
