// order.rs
use crate::{Catalog, DomainError, OrderId, ProductId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Estados de una solicitud.
///
/// ```text
/// pending ──approve──> approved ──distribute──> distribution
///    └────reject────> rejected
/// ```
/// La única vuelta atrás es el rollback a `rejected` provocado por un
/// reclamo aceptado (`Order::force_reject`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
  Pending,
  Approved,
  Rejected,
  Distribution,
}

impl OrderStatus {
  pub const ALL: [OrderStatus; 4] = [Self::Pending, Self::Approved, Self::Rejected, Self::Distribution];

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Pending => "pending",
      Self::Approved => "approved",
      Self::Rejected => "rejected",
      Self::Distribution => "distribution",
    }
  }

  /// Transiciones normales de la máquina de estados (sin el rollback).
  pub fn allows(&self, next: OrderStatus) -> bool {
    matches!((self, next),
             (Self::Pending, Self::Approved) | (Self::Pending, Self::Rejected) | (Self::Approved, Self::Distribution))
  }

  pub fn is_terminal(&self) -> bool {
    matches!(self, Self::Rejected | Self::Distribution)
  }
}

impl fmt::Display for OrderStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Línea de una solicitud: producto y cantidad pedida.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
  pub product_id: ProductId,
  pub quantity: u32,
}

impl OrderLine {
  pub fn new(product_id: ProductId, quantity: u32) -> Self {
    Self { product_id, quantity }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingAddress {
  pub address: String,
  pub city: String,
  pub zip: String,
}

/// Datos que envía el cliente al crear una solicitud.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
  pub client_name: String,
  pub client_phone: String,
  pub client_email: String,
  #[serde(rename = "productos")]
  pub lines: Vec<OrderLine>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub billing_address: Option<BillingAddress>,
}

impl NewOrder {
  pub fn with_lines<I>(lines: I) -> Self
    where I: IntoIterator<Item = OrderLine>
  {
    Self { lines: lines.into_iter().collect(), ..Self::default() }
  }
}

/// Solicitud (pedido) registrada. El total no se guarda: se calcula con los
/// precios vigentes del catálogo en cada lectura.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
  id: OrderId,
  created_by: String,
  client_name: String,
  client_phone: String,
  client_email: String,
  #[serde(rename = "productos")]
  lines: Vec<OrderLine>,
  status: OrderStatus,
  created_at: DateTime<Utc>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  updated_at: Option<DateTime<Utc>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  billing_address: Option<BillingAddress>,
}

impl Order {
  /// Valida la forma de la solicitud contra el catálogo y la crea en estado
  /// `pending`. El stock insuficiente no impide la creación.
  pub fn new(id: OrderId,
             created_by: &str,
             request: NewOrder,
             catalog: &Catalog,
             now: DateTime<Utc>)
             -> Result<Self, DomainError> {
    if request.lines.is_empty() {
      return Err(DomainError::ValidationError("La solicitud debe incluir al menos un producto".to_string()));
    }
    for line in &request.lines {
      if line.quantity == 0 {
        return Err(DomainError::ValidationError(format!("Cantidad inválida para el producto {}", line.product_id)));
      }
      if catalog.find(line.product_id).is_none() {
        return Err(DomainError::ValidationError(format!("Producto inexistente: {}", line.product_id)));
      }
    }
    Ok(Self { id,
              created_by: created_by.to_string(),
              client_name: request.client_name,
              client_phone: request.client_phone,
              client_email: request.client_email,
              lines: request.lines,
              status: OrderStatus::Pending,
              created_at: now,
              updated_at: None,
              billing_address: request.billing_address })
  }

  /// Aplica una transición normal de la máquina de estados.
  pub fn transition(&mut self, next: OrderStatus, now: DateTime<Utc>) -> Result<(), DomainError> {
    if !self.status.allows(next) {
      return Err(DomainError::transition("solicitud", self.status, next));
    }
    self.status = next;
    self.updated_at = Some(now);
    Ok(())
  }

  /// Rollback a `rejected` desde cualquier estado (reclamo aceptado).
  pub fn force_reject(&mut self, now: DateTime<Utc>) {
    self.status = OrderStatus::Rejected;
    self.updated_at = Some(now);
  }

  pub fn id(&self) -> &OrderId {
    &self.id
  }

  pub fn created_by(&self) -> &str {
    &self.created_by
  }

  pub fn client_name(&self) -> &str {
    &self.client_name
  }

  pub fn client_phone(&self) -> &str {
    &self.client_phone
  }

  pub fn client_email(&self) -> &str {
    &self.client_email
  }

  pub fn lines(&self) -> &[OrderLine] {
    &self.lines
  }

  pub fn status(&self) -> OrderStatus {
    self.status
  }

  pub fn created_at(&self) -> DateTime<Utc> {
    self.created_at
  }

  pub fn updated_at(&self) -> Option<DateTime<Utc>> {
    self.updated_at
  }

  pub fn billing_address(&self) -> Option<&BillingAddress> {
    self.billing_address.as_ref()
  }
}

impl fmt::Display for Order {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f,
           "Solicitud(id: {}, cliente: {}, líneas: {}, estado: {})",
           self.id,
           self.created_by,
           self.lines.len(),
           self.status)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn pending_order() -> Result<Order, DomainError> {
    let catalog = Catalog::seed();
    Order::new(OrderId::from("S-1"), "ana", NewOrder::with_lines([OrderLine::new(1, 10)]), &catalog, Utc::now())
  }

  #[test]
  fn empty_request_is_rejected() {
    let catalog = Catalog::seed();
    let res = Order::new(OrderId::from("S-1"), "ana", NewOrder::default(), &catalog, Utc::now());
    assert!(matches!(res, Err(DomainError::ValidationError(_))));
  }

  #[test]
  fn zero_quantity_and_unknown_product_are_rejected() {
    let catalog = Catalog::seed();
    let zero = Order::new(OrderId::from("S-1"), "ana", NewOrder::with_lines([OrderLine::new(1, 0)]), &catalog, Utc::now());
    assert!(matches!(zero, Err(DomainError::ValidationError(_))));
    let unknown = Order::new(OrderId::from("S-2"), "ana", NewOrder::with_lines([OrderLine::new(99, 1)]), &catalog, Utc::now());
    assert!(matches!(unknown, Err(DomainError::ValidationError(_))));
  }

  #[test]
  fn pending_only_accepts_approve_or_reject() -> Result<(), DomainError> {
    let order = pending_order()?;
    assert!(order.status().allows(OrderStatus::Approved));
    assert!(order.status().allows(OrderStatus::Rejected));
    let mut skip = order.clone();
    let err = skip.transition(OrderStatus::Distribution, Utc::now()).unwrap_err();
    assert!(matches!(err, DomainError::InvalidTransition { .. }));
    assert_eq!(skip.status(), OrderStatus::Pending);
    assert!(skip.updated_at().is_none());
    Ok(())
  }

  #[test]
  fn terminal_states_accept_only_rollback() -> Result<(), DomainError> {
    let mut order = pending_order()?;
    order.transition(OrderStatus::Approved, Utc::now())?;
    order.transition(OrderStatus::Distribution, Utc::now())?;
    for next in OrderStatus::ALL {
      assert!(order.clone().transition(next, Utc::now()).is_err());
    }
    order.force_reject(Utc::now());
    assert_eq!(order.status(), OrderStatus::Rejected);
    assert!(order.status().is_terminal());
    Ok(())
  }

  #[test]
  fn stored_format_uses_camel_case_and_productos() -> Result<(), DomainError> {
    let order = pending_order()?;
    let json = serde_json::to_value(&order)?;
    assert_eq!(json["createdBy"], "ana");
    assert_eq!(json["status"], "pending");
    assert_eq!(json["productos"][0]["productId"], 1);
    assert_eq!(json["productos"][0]["quantity"], 10);
    assert!(json.get("updatedAt").is_none());
    Ok(())
  }
}
