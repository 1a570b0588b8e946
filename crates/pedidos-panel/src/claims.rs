// Archivo: claims.rs
// Propósito: libro de reclamos. Alta vinculada opcionalmente a una
// solicitud y resolución, que puede revertir la solicitud a `rejected`.
use chrono::Utc;
use log::{info, warn};
use pedidos_domain::{Claim, ClaimId, ClaimStatus, DomainError, IdGenerator, NewClaim, OrderId, PanelRepository,
                     Resolution, Role, User};
use std::sync::Arc;

/// Resultado de resolver un reclamo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimOutcome {
    pub claim: Claim,
    /// Solicitud revertida a `rejected`, si la hubo.
    pub order_rolled_back: Option<OrderId>,
}

pub struct ClaimLedger<R>
    where R: PanelRepository
{
    repo: Arc<R>,
    ids: Arc<dyn IdGenerator>,
}

impl<R> ClaimLedger<R> where R: PanelRepository
{
    pub fn new(repo: Arc<R>, ids: Arc<dyn IdGenerator>) -> Self {
        Self { repo, ids }
    }

    /// Registra un reclamo abierto. Sólo clientes existentes pueden
    /// reclamar; si se indica solicitud debe existir y ser del cliente.
    pub fn create(&self, caller: &User, request: NewClaim) -> Result<Claim, DomainError> {
        let is_client = self.repo
                            .load_users()?
                            .iter()
                            .any(|u| u.username() == caller.username() && u.role() == Role::Client);
        if !is_client {
            return Err(DomainError::AuthFailure(format!("'{}' no es un cliente registrado", caller.username())));
        }
        if let Some(order_id) = &request.order_id {
            let orders = self.repo.load_orders()?;
            let order = orders.iter()
                              .find(|o| o.id() == order_id)
                              .ok_or_else(|| DomainError::NotFound(format!("solicitud {}", order_id)))?;
            if order.created_by() != caller.username() {
                return Err(DomainError::ValidationError(format!("la solicitud {} no pertenece a '{}'",
                                                                order_id,
                                                                caller.username())));
            }
        }
        let claim = Claim::new(ClaimId::new(self.ids.next_id()), caller.username(), request, Utc::now())?;

        let mut claims = self.repo.load_claims()?;
        claims.push(claim.clone());
        self.repo.save_claims(&claims)?;
        info!("reclamo {} creado por '{}'", claim.id(), claim.created_by());
        Ok(claim)
    }

    /// open -> closed con resolución y respuesta.
    ///
    /// Si se acepta y la solicitud referenciada todavía existe, la solicitud
    /// pasa a `rejected` sea cual sea su estado. Si ya no existe, el reclamo
    /// se cierra igual.
    ///
    /// La solicitud se guarda antes que el reclamo. Si falla la escritura
    /// del reclamo, queda la solicitud rechazada con el reclamo abierto, y
    /// volver a resolverlo completa la operación (rechazar de nuevo no
    /// cambia nada). El orden inverso dejaría un reclamo aceptado y cerrado
    /// que ya no se puede reintentar.
    pub fn resolve(&self, id: &ClaimId, resolution: Resolution, response: &str) -> Result<ClaimOutcome, DomainError> {
        let now = Utc::now();
        let mut claims = self.repo.load_claims()?;
        let claim = claims.iter_mut()
                          .find(|c| c.id() == id)
                          .ok_or_else(|| DomainError::NotFound(format!("reclamo {}", id)))?;
        claim.close(resolution, response, now)?;
        let closed = claim.clone();

        let mut order_rolled_back = None;
        if let (Resolution::Accepted, Some(order_id)) = (resolution, closed.order_id()) {
            let mut orders = self.repo.load_orders()?;
            match orders.iter_mut().find(|o| o.id() == order_id) {
                Some(order) => {
                    let from = order.status();
                    order.force_reject(now);
                    self.repo.save_orders(&orders)?;
                    info!("reclamo {} aceptado: solicitud {} {} -> rejected", id, order_id, from);
                    order_rolled_back = Some(order_id.clone());
                }
                None => warn!("reclamo {} aceptado: la solicitud {} ya no existe", id, order_id),
            }
        }

        self.repo.save_claims(&claims)?;
        info!("reclamo {} cerrado ({})", id, resolution);
        Ok(ClaimOutcome { claim: closed, order_rolled_back })
    }

    pub fn find(&self, id: &ClaimId) -> Result<Claim, DomainError> {
        self.repo
            .load_claims()?
            .into_iter()
            .find(|c| c.id() == id)
            .ok_or_else(|| DomainError::NotFound(format!("reclamo {}", id)))
    }

    pub fn list(&self) -> Result<Vec<Claim>, DomainError> {
        self.repo.load_claims()
    }

    pub fn list_by_user(&self, username: &str) -> Result<Vec<Claim>, DomainError> {
        Ok(self.repo.load_claims()?.into_iter().filter(|c| c.created_by() == username).collect())
    }

    pub fn list_by_status(&self, status: ClaimStatus) -> Result<Vec<Claim>, DomainError> {
        Ok(self.repo.load_claims()?.into_iter().filter(|c| c.status() == status).collect())
    }

    pub fn list_by_order(&self, order_id: &OrderId) -> Result<Vec<Claim>, DomainError> {
        Ok(self.repo
               .load_claims()?
               .into_iter()
               .filter(|c| c.order_id() == Some(order_id))
               .collect())
    }
}
