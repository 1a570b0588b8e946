use pedidos_domain::{Claim, DomainError, Order, OrderStatus, PanelRepository};
use serde::Serialize;
use std::sync::Arc;

/// Conteos del tablero. Se recalculan en cada consulta; nunca se guardan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PanelStats {
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
    pub distribution: usize,
    pub open_claims: usize,
}

impl PanelStats {
    pub fn from_records(orders: &[Order], claims: &[Claim]) -> Self {
        let mut stats = orders.iter().fold(Self::default(), |mut acc, o| {
                                         match o.status() {
                                             OrderStatus::Pending => acc.pending += 1,
                                             OrderStatus::Approved => acc.approved += 1,
                                             OrderStatus::Rejected => acc.rejected += 1,
                                             OrderStatus::Distribution => acc.distribution += 1,
                                         }
                                         acc
                                     });
        stats.open_claims = claims.iter().filter(|c| c.is_open()).count();
        stats
    }

    /// Agrupación del tablero que cuenta las despachadas como aprobadas.
    pub fn approved_with_distribution(&self) -> usize {
        self.approved + self.distribution
    }

    pub fn total_orders(&self) -> usize {
        self.pending + self.approved + self.rejected + self.distribution
    }
}

pub struct StatsAggregator<R>
    where R: PanelRepository
{
    repo: Arc<R>,
}

impl<R> StatsAggregator<R> where R: PanelRepository
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub fn compute(&self) -> Result<PanelStats, DomainError> {
        Ok(PanelStats::from_records(&self.repo.load_orders()?, &self.repo.load_claims()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pedidos_domain::{Catalog, ClaimId, NewClaim, NewOrder, OrderId, OrderLine, Resolution};

    fn order(id: &str, path: &[OrderStatus]) -> Result<Order, DomainError> {
        let mut o = Order::new(OrderId::from(id),
                               "ana",
                               NewOrder::with_lines([OrderLine::new(1, 1)]),
                               &Catalog::seed(),
                               Utc::now())?;
        for s in path {
            o.transition(*s, Utc::now())?;
        }
        Ok(o)
    }

    #[test]
    fn counts_every_status_separately() -> Result<(), DomainError> {
        let orders = vec![order("1", &[])?,
                          order("2", &[])?,
                          order("3", &[OrderStatus::Approved])?,
                          order("4", &[OrderStatus::Rejected])?,
                          order("5", &[OrderStatus::Approved, OrderStatus::Distribution])?];
        let open = Claim::new(ClaimId::from("R-1"), "ana", NewClaim::free_form("a"), Utc::now())?;
        let mut closed = Claim::new(ClaimId::from("R-2"), "ana", NewClaim::free_form("b"), Utc::now())?;
        closed.close(Resolution::Rejected, "no", Utc::now())?;

        let stats = PanelStats::from_records(&orders, &[open, closed]);
        assert_eq!(stats,
                   PanelStats { pending: 2, approved: 1, rejected: 1, distribution: 1, open_claims: 1 });
        assert_eq!(stats.approved_with_distribution(), 2);
        assert_eq!(stats.total_orders(), 5);
        Ok(())
    }

    #[test]
    fn empty_ledgers_give_zeroes() {
        assert_eq!(PanelStats::from_records(&[], &[]), PanelStats::default());
    }
}
