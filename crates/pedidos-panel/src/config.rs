use std::path::PathBuf;
use thiserror::Error;

pub const STORE_DIR_VAR: &str = "PANEL_STORE_DIR";
pub const ADMIN_USER_VAR: &str = "PANEL_ADMIN_USER";
pub const ADMIN_PASSWORD_VAR: &str = "PANEL_ADMIN_PASSWORD";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
  #[error("Valor inválido para {var}: {reason}")]
  Invalid { var: &'static str, reason: String },
}

/// Configuración del panel leída del entorno.
///
/// - `PANEL_STORE_DIR`: directorio del almacén de archivos; sin valor se usa
///   memoria.
/// - `PANEL_ADMIN_USER` / `PANEL_ADMIN_PASSWORD`: cuenta administradora que
///   se siembra cuando el directorio de usuarios está vacío (por defecto
///   `admin`/`admin`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelConfig {
  pub store_dir: Option<PathBuf>,
  pub admin_username: String,
  pub admin_password: String,
}

impl Default for PanelConfig {
  fn default() -> Self {
    Self { store_dir: None, admin_username: "admin".to_string(), admin_password: "admin".to_string() }
  }
}

impl PanelConfig {
  /// Carga `.env` si existe y lee las variables del proceso.
  pub fn from_env() -> Result<Self, ConfigError> {
    dotenvy::dotenv().ok();
    Self::from_lookup(|var| std::env::var(var).ok())
  }

  /// Igual que `from_env` pero con una función de búsqueda inyectada.
  pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where F: Fn(&str) -> Option<String>
  {
    let defaults = Self::default();
    let store_dir = lookup(STORE_DIR_VAR).filter(|d| !d.trim().is_empty()).map(PathBuf::from);
    let admin_username = match lookup(ADMIN_USER_VAR) {
      Some(u) if u.trim().is_empty() => {
        return Err(ConfigError::Invalid { var: ADMIN_USER_VAR, reason: "vacío".to_string() });
      }
      Some(u) => u.trim().to_string(),
      None => defaults.admin_username,
    };
    let admin_password = match lookup(ADMIN_PASSWORD_VAR) {
      Some(p) if p.is_empty() => {
        return Err(ConfigError::Invalid { var: ADMIN_PASSWORD_VAR, reason: "vacío".to_string() });
      }
      Some(p) => p,
      None => defaults.admin_password,
    };
    Ok(Self { store_dir, admin_username, admin_password })
  }
}
