// ids.rs
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Fuente de identificadores para solicitudes y reclamos. Se inyecta en los
/// ledgers al construirlos para que las pruebas puedan usar ids
/// deterministas.
pub trait IdGenerator: Send + Sync {
  fn next_id(&self) -> String;
}

/// Generador de producción: UUID v4.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
  fn next_id(&self) -> String {
    Uuid::new_v4().to_string()
  }
}

/// Contador monótono con prefijo (`"S-1"`, `"S-2"`, ...).
#[derive(Debug)]
pub struct SequentialIdGenerator {
  prefix: String,
  next: AtomicU64,
}

impl SequentialIdGenerator {
  pub fn new(prefix: impl Into<String>) -> Self {
    Self { prefix: prefix.into(), next: AtomicU64::new(1) }
  }

  /// Continúa la secuencia a partir de `start`.
  pub fn starting_at(prefix: impl Into<String>, start: u64) -> Self {
    Self { prefix: prefix.into(), next: AtomicU64::new(start) }
  }
}

impl IdGenerator for SequentialIdGenerator {
  fn next_id(&self) -> String {
    let n = self.next.fetch_add(1, Ordering::SeqCst);
    format!("{}{}", self.prefix, n)
  }
}

macro_rules! string_id {
  ($(#[$meta:meta])* $name:ident) => {
    $(#[$meta])*
    #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct $name(String);

    impl $name {
      pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
      }

      pub fn as_str(&self) -> &str {
        &self.0
      }
    }

    impl fmt::Display for $name {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
      }
    }

    impl From<&str> for $name {
      fn from(s: &str) -> Self {
        Self(s.to_string())
      }
    }

    impl From<String> for $name {
      fn from(s: String) -> Self {
        Self(s)
      }
    }
  };
}

string_id!(
  /// Identificador de una solicitud (pedido).
  OrderId
);
string_id!(
  /// Identificador de un reclamo.
  ClaimId
);

/// Identificador de producto del catálogo (entero positivo).
pub type ProductId = u32;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn sequential_ids_are_unique_and_ordered() {
    let generator = SequentialIdGenerator::new("S-");
    assert_eq!(generator.next_id(), "S-1");
    assert_eq!(generator.next_id(), "S-2");
    let resumed = SequentialIdGenerator::starting_at("R-", 10);
    assert_eq!(resumed.next_id(), "R-10");
  }

  #[test]
  fn uuid_ids_do_not_collide_under_rapid_creation() {
    let generator = UuidIdGenerator;
    let ids: std::collections::HashSet<String> = (0..1000).map(|_| generator.next_id()).collect();
    assert_eq!(ids.len(), 1000);
  }

  #[test]
  fn order_id_serializes_as_plain_string() -> Result<(), serde_json::Error> {
    let id = OrderId::from("1700000000000");
    assert_eq!(serde_json::to_string(&id)?, "\"1700000000000\"");
    Ok(())
  }
}
