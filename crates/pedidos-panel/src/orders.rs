// Archivo: orders.rs
// Propósito: libro de solicitudes. Alta validada contra el catálogo,
// transiciones de estado y cálculo de totales/stock siempre con los datos
// vigentes del catálogo.
use crate::catalog::CatalogService;
use chrono::Utc;
use log::{debug, info};
use pedidos_domain::{DomainError, IdGenerator, NewOrder, Order, OrderId, OrderStatus, PanelRepository, StockShortage,
                     User};
use serde::Serialize;
use std::sync::Arc;

/// Vista de una solicitud para tableros: total y alerta de stock calculados
/// en el momento de la consulta.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderSummary {
    pub order: Order,
    pub total: u64,
    pub stock_issue: bool,
}

pub struct OrderLedger<R>
    where R: PanelRepository
{
    repo: Arc<R>,
    catalog: CatalogService<R>,
    ids: Arc<dyn IdGenerator>,
}

impl<R> OrderLedger<R> where R: PanelRepository
{
    /// `ids` genera los identificadores de las nuevas solicitudes.
    pub fn new(repo: Arc<R>, ids: Arc<dyn IdGenerator>) -> Self {
        let catalog = CatalogService::new(repo.clone());
        Self { repo, catalog, ids }
    }

    /// Registra una solicitud `pending` a nombre de `caller`.
    ///
    /// Falla con `ValidationError` si no hay productos, alguna cantidad es 0
    /// o algún producto no existe; en ese caso no se guarda nada. El stock
    /// insuficiente no impide el alta: se decide al aprobar.
    pub fn create(&self, caller: &User, request: NewOrder) -> Result<Order, DomainError> {
        let users = self.repo.load_users()?;
        if !users.iter().any(|u| u.username() == caller.username()) {
            return Err(DomainError::NotFound(format!("usuario '{}'", caller.username())));
        }
        let catalog = self.catalog.load()?;
        let order = Order::new(OrderId::new(self.ids.next_id()), caller.username(), request, &catalog, Utc::now())?;

        let mut orders = self.repo.load_orders()?;
        orders.push(order.clone());
        self.repo.save_orders(&orders)?;
        info!("solicitud {} creada por '{}'", order.id(), order.created_by());
        Ok(order)
    }

    /// pending -> approved
    pub fn approve(&self, id: &OrderId) -> Result<Order, DomainError> {
        self.transition(id, OrderStatus::Approved)
    }

    /// pending -> rejected
    pub fn reject(&self, id: &OrderId) -> Result<Order, DomainError> {
        self.transition(id, OrderStatus::Rejected)
    }

    /// approved -> distribution
    pub fn advance_to_distribution(&self, id: &OrderId) -> Result<Order, DomainError> {
        self.transition(id, OrderStatus::Distribution)
    }

    fn transition(&self, id: &OrderId, next: OrderStatus) -> Result<Order, DomainError> {
        let mut orders = self.repo.load_orders()?;
        let order = orders.iter_mut()
                          .find(|o| o.id() == id)
                          .ok_or_else(|| DomainError::NotFound(format!("solicitud {}", id)))?;
        let from = order.status();
        order.transition(next, Utc::now())?;
        let updated = order.clone();
        self.repo.save_orders(&orders)?;
        info!("solicitud {}: {} -> {}", id, from, next);
        Ok(updated)
    }

    /// Suma de precio vigente × cantidad. No se cachea: un cambio de precio
    /// se refleja en la siguiente lectura.
    pub fn compute_total(&self, order: &Order) -> Result<u64, DomainError> {
        Ok(self.catalog.load()?.total(order.lines()))
    }

    /// Alguna línea supera el stock actual. Sólo informativo.
    pub fn has_stock_issue(&self, order: &Order) -> Result<bool, DomainError> {
        Ok(!self.stock_report(order)?.is_empty())
    }

    pub fn stock_report(&self, order: &Order) -> Result<Vec<StockShortage>, DomainError> {
        Ok(self.catalog.load()?.check_stock(order.lines()))
    }

    pub fn find(&self, id: &OrderId) -> Result<Order, DomainError> {
        self.repo
            .load_orders()?
            .into_iter()
            .find(|o| o.id() == id)
            .ok_or_else(|| DomainError::NotFound(format!("solicitud {}", id)))
    }

    pub fn list(&self) -> Result<Vec<Order>, DomainError> {
        self.repo.load_orders()
    }

    pub fn list_by_status(&self, status: OrderStatus) -> Result<Vec<Order>, DomainError> {
        Ok(self.repo.load_orders()?.into_iter().filter(|o| o.status() == status).collect())
    }

    pub fn list_by_user(&self, username: &str) -> Result<Vec<Order>, DomainError> {
        Ok(self.repo.load_orders()?.into_iter().filter(|o| o.created_by() == username).collect())
    }

    /// Solicitudes en `status` con total y alerta de stock, leyendo el
    /// catálogo una sola vez.
    pub fn summaries_by_status(&self, status: OrderStatus) -> Result<Vec<OrderSummary>, DomainError> {
        let catalog = self.catalog.load()?;
        let summaries: Vec<OrderSummary> =
            self.list_by_status(status)?
                .into_iter()
                .map(|order| {
                    let total = catalog.total(order.lines());
                    let stock_issue = !catalog.check_stock(order.lines()).is_empty();
                    OrderSummary { order, total, stock_issue }
                })
                .collect();
        debug!("{} solicitudes en estado {}", summaries.len(), status);
        Ok(summaries)
    }
}
