// user.rs
use crate::DomainError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Admin,
  Client,
}

impl Role {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Admin => "admin",
      Self::Client => "client",
    }
  }
}

impl fmt::Display for Role {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Digest SHA-256 salado de una contraseña. Nunca se guarda el texto plano.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordHash {
  salt: String,
  digest: String,
}

impl PasswordHash {
  /// Genera una sal aleatoria y calcula el digest.
  pub fn new(secret: &str) -> Self {
    Self::with_salt(&Uuid::new_v4().simple().to_string(), secret)
  }

  pub fn with_salt(salt: &str, secret: &str) -> Self {
    Self { salt: salt.to_string(), digest: Self::digest(salt, secret) }
  }

  /// Compara en tiempo constante respecto del contenido del digest.
  pub fn verify(&self, secret: &str) -> bool {
    let candidate = Self::digest(&self.salt, secret);
    let (a, b) = (candidate.as_bytes(), self.digest.as_bytes());
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
  }

  fn digest(salt: &str, secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(secret.as_bytes());
    format!("{:x}", hasher.finalize())
  }
}

impl fmt::Debug for PasswordHash {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("PasswordHash(..)")
  }
}

/// Contraseña tal como está guardada. Los directorios antiguos guardan el
/// texto plano; se acepta al leer y se escribe siempre como digest.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
enum StoredPassword {
  Hashed(PasswordHash),
  Plain(String),
}

impl StoredPassword {
  fn verify(&self, secret: &str) -> bool {
    match self {
      Self::Hashed(h) => h.verify(secret),
      Self::Plain(p) => p.len() == secret.len()
                        && p.bytes().zip(secret.bytes()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0,
    }
  }
}

impl Serialize for StoredPassword {
  fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where S: Serializer
  {
    match self {
      Self::Hashed(h) => h.serialize(serializer),
      Self::Plain(p) => PasswordHash::new(p).serialize(serializer),
    }
  }
}

impl fmt::Debug for StoredPassword {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Hashed(h) => fmt::Debug::fmt(h, f),
      Self::Plain(_) => f.write_str("StoredPassword::Plain(..)"),
    }
  }
}

/// Datos de alta que envía quien se registra. No incluye rol: todo registro
/// crea un cliente.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewUser {
  pub username: String,
  pub password: String,
  pub name: Option<String>,
  pub email: Option<String>,
  pub phone: Option<String>,
}

impl NewUser {
  pub fn new(username: &str, password: &str) -> Self {
    Self { username: username.to_string(), password: password.to_string(), ..Self::default() }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
  username: String,
  password: StoredPassword,
  role: Role,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  name: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  email: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  phone: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  created_at: Option<DateTime<Utc>>,
}

impl User {
  fn new(candidate: NewUser, role: Role, now: DateTime<Utc>) -> Result<Self, DomainError> {
    if candidate.username.trim().is_empty() {
      return Err(DomainError::ValidationError("El nombre de usuario no puede estar vacío".to_string()));
    }
    if candidate.password.is_empty() {
      return Err(DomainError::ValidationError("La contraseña no puede estar vacía".to_string()));
    }
    Ok(Self { username: candidate.username,
              password: StoredPassword::Hashed(PasswordHash::new(&candidate.password)),
              role,
              name: candidate.name,
              email: candidate.email,
              phone: candidate.phone,
              created_at: Some(now) })
  }

  /// Alta por registro: siempre rol cliente.
  pub fn client(candidate: NewUser, now: DateTime<Utc>) -> Result<Self, DomainError> {
    Self::new(candidate, Role::Client, now)
  }

  /// Cuenta administradora sembrada al inicializar un directorio vacío.
  pub fn seed_admin(username: &str, password: &str, now: DateTime<Utc>) -> Result<Self, DomainError> {
    let candidate = NewUser { name: Some("Administrador".to_string()), ..NewUser::new(username, password) };
    Self::new(candidate, Role::Admin, now)
  }

  pub fn verify_password(&self, secret: &str) -> bool {
    self.password.verify(secret)
  }

  /// La contraseña guardada todavía está en texto plano.
  pub fn has_legacy_password(&self) -> bool {
    matches!(self.password, StoredPassword::Plain(_))
  }

  /// Misma cuenta con la contraseña convertida a digest salado.
  pub fn with_hashed_password(&self) -> Self {
    match &self.password {
      StoredPassword::Plain(p) => Self { password: StoredPassword::Hashed(PasswordHash::new(p)), ..self.clone() },
      StoredPassword::Hashed(_) => self.clone(),
    }
  }

  pub fn with_role(&self, role: Role) -> Self {
    Self { role, ..self.clone() }
  }

  pub fn username(&self) -> &str {
    &self.username
  }

  pub fn role(&self) -> Role {
    self.role
  }

  pub fn is_admin(&self) -> bool {
    self.role == Role::Admin
  }

  pub fn name(&self) -> Option<&str> {
    self.name.as_deref()
  }

  pub fn email(&self) -> Option<&str> {
    self.email.as_deref()
  }

  pub fn phone(&self) -> Option<&str> {
    self.phone.as_deref()
  }

  pub fn created_at(&self) -> Option<DateTime<Utc>> {
    self.created_at
  }
}

impl fmt::Display for User {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Usuario({}, rol: {})", self.username, self.role)
  }
}

/// Sesión activa, guardada bajo la clave `currentUser`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
  pub username: String,
  pub role: Role,
  pub logged_in_at: DateTime<Utc>,
}

impl Session {
  pub fn for_user(user: &User, now: DateTime<Utc>) -> Self {
    Self { username: user.username.clone(), role: user.role, logged_in_at: now }
  }
}
