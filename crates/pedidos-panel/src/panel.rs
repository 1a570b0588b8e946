// Archivo: panel.rs
// Propósito: fachada del panel. Reúne los servicios, mantiene la sesión
// (`currentUser`) y controla qué rol puede invocar cada comando. La capa de
// presentación sólo habla con esta API.
use crate::catalog::CatalogService;
use crate::claims::{ClaimLedger, ClaimOutcome};
use crate::config::PanelConfig;
use crate::directory::{RemovalReport, UserDirectory};
use crate::orders::{OrderLedger, OrderSummary};
use crate::stats::{PanelStats, StatsAggregator};
use chrono::Utc;
use log::info;
use pedidos_domain::{Claim, ClaimId, ClaimStatus, DomainError, IdGenerator, NewClaim, NewOrder, NewUser, Order,
                     OrderId, OrderLine, OrderStatus, PanelRepository, Product, ProductId, Resolution, Role, Session,
                     StockShortage, User, UuidIdGenerator};
use std::sync::Arc;

pub struct Panel<R>
    where R: PanelRepository
{
    repo: Arc<R>,
    catalog: CatalogService<R>,
    directory: UserDirectory<R>,
    orders: OrderLedger<R>,
    claims: ClaimLedger<R>,
    stats: StatsAggregator<R>,
}

impl<R> Panel<R> where R: PanelRepository
{
    /// Construye el panel con generadores de ids inyectados (sin sembrar).
    pub fn new(repo: Arc<R>, order_ids: Arc<dyn IdGenerator>, claim_ids: Arc<dyn IdGenerator>) -> Self {
        Self { catalog: CatalogService::new(repo.clone()),
               directory: UserDirectory::new(repo.clone()),
               orders: OrderLedger::new(repo.clone(), order_ids),
               claims: ClaimLedger::new(repo.clone(), claim_ids),
               stats: StatsAggregator::new(repo.clone()),
               repo }
    }

    /// Panel de producción: ids UUID, administrador y catálogo sembrados
    /// según `config`.
    pub fn open(repo: Arc<R>, config: &PanelConfig) -> Result<Self, DomainError> {
        let panel = Self::new(repo, Arc::new(UuidIdGenerator), Arc::new(UuidIdGenerator));
        panel.initialize(&config.admin_username, &config.admin_password)?;
        Ok(panel)
    }

    /// Siembra el administrador (si no hay usuarios) y el catálogo (si no
    /// hay catálogo guardado).
    pub fn initialize(&self, admin_username: &str, admin_password: &str) -> Result<(), DomainError> {
        self.directory.ensure_seed_admin(admin_username, admin_password)?;
        self.catalog.load()?;
        Ok(())
    }

    // --- sesión ---

    pub fn login(&self, username: &str, password: &str) -> Result<User, DomainError> {
        let user = self.directory.authenticate(username, password)?;
        self.repo.save_session(Some(&Session::for_user(&user, Utc::now())))?;
        Ok(user)
    }

    pub fn logout(&self) -> Result<(), DomainError> {
        self.repo.save_session(None)?;
        info!("sesión cerrada");
        Ok(())
    }

    /// Usuario de la sesión, leído del directorio. Una sesión cuyo usuario
    /// ya no existe se descarta.
    pub fn current_user(&self) -> Result<Option<User>, DomainError> {
        let Some(session) = self.repo.load_session()? else {
            return Ok(None);
        };
        match self.directory.find(&session.username)? {
            Some(user) => Ok(Some(user)),
            None => {
                self.repo.save_session(None)?;
                Ok(None)
            }
        }
    }

    fn require(&self, role: Role) -> Result<User, DomainError> {
        match self.current_user()? {
            Some(u) if u.role() == role => Ok(u),
            Some(u) => Err(DomainError::AuthFailure(format!("'{}' no tiene rol {}", u.username(), role))),
            None => Err(DomainError::AuthFailure("no hay sesión activa".to_string())),
        }
    }

    // --- comandos abiertos ---

    pub fn register(&self, candidate: NewUser) -> Result<User, DomainError> {
        self.directory.register(candidate)
    }

    pub fn products(&self) -> Result<Vec<Product>, DomainError> {
        self.catalog.list()
    }

    pub fn check_stock(&self, lines: &[OrderLine]) -> Result<Vec<StockShortage>, DomainError> {
        self.catalog.check_stock(lines)
    }

    // --- comandos de cliente ---

    pub fn create_order(&self, request: NewOrder) -> Result<Order, DomainError> {
        let caller = self.require(Role::Client)?;
        self.orders.create(&caller, request)
    }

    pub fn my_orders(&self) -> Result<Vec<OrderSummary>, DomainError> {
        let caller = self.require(Role::Client)?;
        let catalog = self.catalog.load()?;
        Ok(self.orders
               .list_by_user(caller.username())?
               .into_iter()
               .map(|order| OrderSummary { total: catalog.total(order.lines()),
                                           stock_issue: !catalog.check_stock(order.lines()).is_empty(),
                                           order })
               .collect())
    }

    pub fn create_claim(&self, request: NewClaim) -> Result<Claim, DomainError> {
        let caller = self.require(Role::Client)?;
        self.claims.create(&caller, request)
    }

    pub fn my_claims(&self) -> Result<Vec<Claim>, DomainError> {
        let caller = self.require(Role::Client)?;
        self.claims.list_by_user(caller.username())
    }

    // --- comandos de administración ---

    pub fn approve_order(&self, id: &OrderId) -> Result<Order, DomainError> {
        self.require(Role::Admin)?;
        self.orders.approve(id)
    }

    pub fn reject_order(&self, id: &OrderId) -> Result<Order, DomainError> {
        self.require(Role::Admin)?;
        self.orders.reject(id)
    }

    pub fn send_to_distribution(&self, id: &OrderId) -> Result<Order, DomainError> {
        self.require(Role::Admin)?;
        self.orders.advance_to_distribution(id)
    }

    pub fn orders_by_status(&self, status: OrderStatus) -> Result<Vec<OrderSummary>, DomainError> {
        self.require(Role::Admin)?;
        self.orders.summaries_by_status(status)
    }

    pub fn resolve_claim(&self, id: &ClaimId, resolution: Resolution, response: &str) -> Result<ClaimOutcome, DomainError> {
        self.require(Role::Admin)?;
        self.claims.resolve(id, resolution, response)
    }

    pub fn claims_by_status(&self, status: ClaimStatus) -> Result<Vec<Claim>, DomainError> {
        self.require(Role::Admin)?;
        self.claims.list_by_status(status)
    }

    pub fn users(&self, role: Role) -> Result<Vec<User>, DomainError> {
        self.require(Role::Admin)?;
        self.directory.list_by_role(role)
    }

    pub fn set_role(&self, username: &str, role: Role) -> Result<bool, DomainError> {
        self.require(Role::Admin)?;
        self.directory.set_role(username, role)
    }

    /// Baja en cascada. Si se borra el usuario de la sesión, la sesión se
    /// cierra.
    pub fn remove_user(&self, username: &str) -> Result<RemovalReport, DomainError> {
        let admin = self.require(Role::Admin)?;
        let report = self.directory.remove(username)?;
        if admin.username() == username {
            self.repo.save_session(None)?;
        }
        Ok(report)
    }

    pub fn add_product(&self, product: Product) -> Result<(), DomainError> {
        self.require(Role::Admin)?;
        self.catalog.add(product)
    }

    pub fn set_price(&self, id: ProductId, price: u64) -> Result<(), DomainError> {
        self.require(Role::Admin)?;
        self.catalog.set_price(id, price)
    }

    pub fn set_stock(&self, id: ProductId, stock: u32) -> Result<(), DomainError> {
        self.require(Role::Admin)?;
        self.catalog.set_stock(id, stock)
    }

    pub fn remove_product(&self, id: ProductId) -> Result<Product, DomainError> {
        self.require(Role::Admin)?;
        self.catalog.remove(id)
    }

    pub fn stats(&self) -> Result<PanelStats, DomainError> {
        self.require(Role::Admin)?;
        self.stats.compute()
    }

    // --- acceso a los servicios (lectura y comandos sin control de sesión) ---

    pub fn catalog(&self) -> &CatalogService<R> {
        &self.catalog
    }

    pub fn directory(&self) -> &UserDirectory<R> {
        &self.directory
    }

    pub fn orders(&self) -> &OrderLedger<R> {
        &self.orders
    }

    pub fn claims(&self) -> &ClaimLedger<R> {
        &self.claims
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pedidos_domain::{InMemoryPanelRepository, SequentialIdGenerator};

    fn panel() -> Result<Panel<InMemoryPanelRepository>, DomainError> {
        let panel = Panel::new(Arc::new(InMemoryPanelRepository::new()),
                               Arc::new(SequentialIdGenerator::new("S-")),
                               Arc::new(SequentialIdGenerator::new("R-")));
        panel.initialize("admin", "admin")?;
        Ok(panel)
    }

    #[test]
    fn commands_require_the_right_role() -> Result<(), DomainError> {
        let panel = panel()?;
        let request = NewOrder::with_lines([OrderLine::new(1, 1)]);
        assert!(matches!(panel.create_order(request.clone()), Err(DomainError::AuthFailure(_))));
        assert!(matches!(panel.stats(), Err(DomainError::AuthFailure(_))));

        panel.login("admin", "admin")?;
        assert!(matches!(panel.create_order(request.clone()), Err(DomainError::AuthFailure(_))));
        assert_eq!(panel.stats()?, PanelStats::default());

        panel.register(NewUser::new("ana", "a"))?;
        panel.login("ana", "a")?;
        let order = panel.create_order(request)?;
        assert!(matches!(panel.approve_order(order.id()), Err(DomainError::AuthFailure(_))));
        Ok(())
    }

    #[test]
    fn failed_login_keeps_previous_session() -> Result<(), DomainError> {
        let panel = panel()?;
        panel.login("admin", "admin")?;
        assert!(panel.login("admin", "mal").is_err());
        assert_eq!(panel.current_user()?.map(|u| u.username().to_string()), Some("admin".to_string()));
        panel.logout()?;
        assert!(panel.current_user()?.is_none());
        Ok(())
    }

    #[test]
    fn session_of_deleted_user_is_dropped() -> Result<(), DomainError> {
        let panel = panel()?;
        panel.register(NewUser::new("ana", "a"))?;
        panel.login("ana", "a")?;
        panel.directory().remove("ana")?;
        assert!(panel.current_user()?.is_none());
        assert!(panel.repo.load_session()?.is_none());
        Ok(())
    }

    #[test]
    fn role_changes_apply_to_the_open_session() -> Result<(), DomainError> {
        let panel = panel()?;
        panel.register(NewUser::new("ana", "a"))?;
        panel.login("ana", "a")?;
        panel.directory().set_role("ana", Role::Admin)?;
        assert!(panel.stats().is_ok());
        Ok(())
    }

    #[test]
    fn admin_removing_itself_closes_the_session() -> Result<(), DomainError> {
        let panel = panel()?;
        panel.register(NewUser::new("ana", "a"))?;
        panel.directory().set_role("ana", Role::Admin)?;
        panel.login("admin", "admin")?;
        panel.remove_user("admin")?;
        assert!(panel.current_user()?.is_none());
        Ok(())
    }
}
