// claim.rs
use crate::{ClaimId, DomainError, OrderId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimStatus {
  /// Datos antiguos guardaron este estado como `pending`.
  #[serde(alias = "pending")]
  Open,
  Closed,
}

impl ClaimStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Open => "open",
      Self::Closed => "closed",
    }
  }
}

impl fmt::Display for ClaimStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
  Accepted,
  Rejected,
}

impl fmt::Display for Resolution {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
                  Self::Accepted => "accepted",
                  Self::Rejected => "rejected",
                })
  }
}

/// Campos descriptivos del formulario de reclamo. De los adjuntos sólo se
/// conservan los nombres de archivo.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClaimDetails {
  pub client_name: String,
  pub client_phone: String,
  pub client_email: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub order_date: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub tipo: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub prioridad: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub producto_afectado: Option<String>,
  pub description: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub solucion_esperada: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub contacto_preferido: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub horario_contacto: Option<String>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub archivos: Vec<String>,
}

impl ClaimDetails {
  pub fn with_description(description: &str) -> Self {
    Self { description: description.to_string(), ..Self::default() }
  }
}

/// Datos que envía el cliente al crear un reclamo.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewClaim {
  /// Referencia débil opcional a una solicitud.
  pub order_id: Option<OrderId>,
  pub details: ClaimDetails,
}

impl NewClaim {
  pub fn free_form(description: &str) -> Self {
    Self { order_id: None, details: ClaimDetails::with_description(description) }
  }

  pub fn for_order(order_id: OrderId, description: &str) -> Self {
    Self { order_id: Some(order_id), details: ClaimDetails::with_description(description) }
  }
}

/// Reclamo registrado.
///
/// `order_id` es una clave foránea débil: la solicitud puede haber sido
/// eliminada después y el reclamo sigue siendo válido. Una vez cerrado,
/// `resolution` y `response` quedan fijos.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claim {
  id: ClaimId,
  created_by: String,
  /// Los registros más antiguos guardan la referencia como `orderNumber`,
  /// vacía cuando no aplica.
  #[serde(default,
          alias = "orderNumber",
          deserialize_with = "blank_order_as_none",
          skip_serializing_if = "Option::is_none")]
  order_id: Option<OrderId>,
  #[serde(flatten)]
  details: ClaimDetails,
  status: ClaimStatus,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  resolution: Option<Resolution>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  response: Option<String>,
  created_at: DateTime<Utc>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  resolved_at: Option<DateTime<Utc>>,
}

fn blank_order_as_none<'de, D>(deserializer: D) -> Result<Option<OrderId>, D::Error>
  where D: Deserializer<'de>
{
  let raw: Option<String> = Option::deserialize(deserializer)?;
  Ok(raw.filter(|s| !s.trim().is_empty()).map(OrderId::from))
}

impl Claim {
  pub fn new(id: ClaimId, created_by: &str, request: NewClaim, now: DateTime<Utc>) -> Result<Self, DomainError> {
    if request.details.description.trim().is_empty() {
      return Err(DomainError::ValidationError("La descripción del reclamo no puede estar vacía".to_string()));
    }
    Ok(Self { id,
              created_by: created_by.to_string(),
              order_id: request.order_id,
              details: request.details,
              status: ClaimStatus::Open,
              resolution: None,
              response: None,
              created_at: now,
              resolved_at: None })
  }

  /// open -> closed. Un reclamo cerrado no se vuelve a resolver.
  pub fn close(&mut self, resolution: Resolution, response: &str, now: DateTime<Utc>) -> Result<(), DomainError> {
    if self.status == ClaimStatus::Closed {
      return Err(DomainError::transition("reclamo", self.status, ClaimStatus::Closed));
    }
    if response.trim().is_empty() {
      return Err(DomainError::ValidationError("La respuesta al reclamo no puede estar vacía".to_string()));
    }
    self.status = ClaimStatus::Closed;
    self.resolution = Some(resolution);
    self.response = Some(response.to_string());
    self.resolved_at = Some(now);
    Ok(())
  }

  pub fn id(&self) -> &ClaimId {
    &self.id
  }

  pub fn created_by(&self) -> &str {
    &self.created_by
  }

  pub fn order_id(&self) -> Option<&OrderId> {
    self.order_id.as_ref()
  }

  pub fn details(&self) -> &ClaimDetails {
    &self.details
  }

  pub fn status(&self) -> ClaimStatus {
    self.status
  }

  pub fn is_open(&self) -> bool {
    self.status == ClaimStatus::Open
  }

  pub fn resolution(&self) -> Option<Resolution> {
    self.resolution
  }

  pub fn response(&self) -> Option<&str> {
    self.response.as_deref()
  }

  pub fn created_at(&self) -> DateTime<Utc> {
    self.created_at
  }

  pub fn resolved_at(&self) -> Option<DateTime<Utc>> {
    self.resolved_at
  }
}

impl fmt::Display for Claim {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f,
           "Reclamo(id: {}, cliente: {}, pedido: {}, estado: {})",
           self.id,
           self.created_by,
           self.order_id.as_ref().map(|o| o.as_str()).unwrap_or("-"),
           self.status)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn close_is_one_shot() -> Result<(), DomainError> {
    let mut claim = Claim::new(ClaimId::from("R-1"), "ana", NewClaim::free_form("llegó roto"), Utc::now())?;
    assert!(claim.is_open());
    claim.close(Resolution::Rejected, "fuera de garantía", Utc::now())?;
    let err = claim.close(Resolution::Accepted, "cambio de opinión", Utc::now()).unwrap_err();
    assert!(matches!(err, DomainError::InvalidTransition { .. }));
    assert_eq!(claim.resolution(), Some(Resolution::Rejected));
    assert_eq!(claim.response(), Some("fuera de garantía"));
    Ok(())
  }

  #[test]
  fn blank_description_or_response_is_invalid() -> Result<(), DomainError> {
    assert!(Claim::new(ClaimId::from("R-1"), "ana", NewClaim::free_form("   "), Utc::now()).is_err());
    let mut claim = Claim::new(ClaimId::from("R-2"), "ana", NewClaim::free_form("falta una caja"), Utc::now())?;
    assert!(matches!(claim.close(Resolution::Accepted, "", Utc::now()), Err(DomainError::ValidationError(_))));
    assert!(claim.is_open());
    Ok(())
  }

  #[test]
  fn legacy_claim_keeps_its_order_number() -> Result<(), DomainError> {
    let json = r#"{"id":"1712","createdBy":"ana","orderNumber":"1700","description":"demora",
                   "tipo":"demora","status":"pending","createdAt":"2024-04-10T12:00:00Z"}"#;
    let claim: Claim = serde_json::from_str(json)?;
    assert_eq!(claim.status(), ClaimStatus::Open);
    assert_eq!(claim.details().tipo.as_deref(), Some("demora"));
    assert_eq!(claim.order_id().map(|o| o.as_str()), Some("1700"));
    assert_eq!(serde_json::to_value(&claim)?["orderId"], "1700");
    Ok(())
  }

  #[test]
  fn blank_order_number_means_no_order() -> Result<(), DomainError> {
    let json = r#"{"id":"1713","createdBy":"ana","orderNumber":"","description":"consulta",
                   "status":"pending","createdAt":"2024-04-10T12:00:00Z"}"#;
    let claim: Claim = serde_json::from_str(json)?;
    assert!(claim.order_id().is_none());
    Ok(())
  }
}
