use crate::{Catalog, Claim, DomainError, Order, Session, User};
use std::sync::{Arc, Mutex};

/// Contrato de persistencia del panel.
///
/// Cada colección se lee y se escribe entera (snapshot): no hay escrituras
/// parciales. Las implementaciones concretas deciden dónde viven los datos
/// (memoria, almacén clave-valor sobre archivos, etc.).
pub trait PanelRepository: Send + Sync {
    /// Usuarios registrados; vacío si la colección no existe todavía.
    fn load_users(&self) -> Result<Vec<User>, DomainError>;
    fn save_users(&self, users: &[User]) -> Result<(), DomainError>;

    /// Solicitudes en orden de creación.
    fn load_orders(&self) -> Result<Vec<Order>, DomainError>;
    fn save_orders(&self, orders: &[Order]) -> Result<(), DomainError>;

    /// Reclamos en orden de creación.
    fn load_claims(&self) -> Result<Vec<Claim>, DomainError>;
    fn save_claims(&self, claims: &[Claim]) -> Result<(), DomainError>;

    /// `None` si nunca se guardó un catálogo (el llamador siembra el
    /// catálogo inicial).
    fn load_catalog(&self) -> Result<Option<Catalog>, DomainError>;
    fn save_catalog(&self, catalog: &Catalog) -> Result<(), DomainError>;

    fn load_session(&self) -> Result<Option<Session>, DomainError>;
    /// `None` borra la sesión.
    fn save_session(&self, session: Option<&Session>) -> Result<(), DomainError>;
}

/// Implementación en memoria para tests y desarrollo.
pub struct InMemoryPanelRepository {
    users: Arc<Mutex<Vec<User>>>,
    orders: Arc<Mutex<Vec<Order>>>,
    claims: Arc<Mutex<Vec<Claim>>>,
    catalog: Arc<Mutex<Option<Catalog>>>,
    session: Arc<Mutex<Option<Session>>>,
}

impl InMemoryPanelRepository {
    pub fn new() -> Self {
        Self { users: Arc::new(Mutex::new(Vec::new())),
               orders: Arc::new(Mutex::new(Vec::new())),
               claims: Arc::new(Mutex::new(Vec::new())),
               catalog: Arc::new(Mutex::new(None)),
               session: Arc::new(Mutex::new(None)) }
    }

    /// Repositorio que arranca con un catálogo ya guardado.
    pub fn with_catalog(catalog: Catalog) -> Self {
        Self { catalog: Arc::new(Mutex::new(Some(catalog))), ..Self::new() }
    }

    // Helper to map poisoned mutex errors into DomainError
    fn lock_map<'a, T>(&'a self, m: &'a Mutex<T>, name: &str) -> Result<std::sync::MutexGuard<'a, T>, DomainError> {
        m.lock()
         .map_err(|e| DomainError::Storage(format!("Mutex '{}' poisoned: {}", name, e)))
    }
}

impl Default for InMemoryPanelRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl PanelRepository for InMemoryPanelRepository {
    fn load_users(&self) -> Result<Vec<User>, DomainError> {
        Ok(self.lock_map(&self.users, "users")?.clone())
    }

    fn save_users(&self, users: &[User]) -> Result<(), DomainError> {
        *self.lock_map(&self.users, "users")? = users.to_vec();
        Ok(())
    }

    fn load_orders(&self) -> Result<Vec<Order>, DomainError> {
        Ok(self.lock_map(&self.orders, "solicitudes")?.clone())
    }

    fn save_orders(&self, orders: &[Order]) -> Result<(), DomainError> {
        *self.lock_map(&self.orders, "solicitudes")? = orders.to_vec();
        Ok(())
    }

    fn load_claims(&self) -> Result<Vec<Claim>, DomainError> {
        Ok(self.lock_map(&self.claims, "reclamos")?.clone())
    }

    fn save_claims(&self, claims: &[Claim]) -> Result<(), DomainError> {
        *self.lock_map(&self.claims, "reclamos")? = claims.to_vec();
        Ok(())
    }

    fn load_catalog(&self) -> Result<Option<Catalog>, DomainError> {
        Ok(self.lock_map(&self.catalog, "productos")?.clone())
    }

    fn save_catalog(&self, catalog: &Catalog) -> Result<(), DomainError> {
        *self.lock_map(&self.catalog, "productos")? = Some(catalog.clone());
        Ok(())
    }

    fn load_session(&self) -> Result<Option<Session>, DomainError> {
        Ok(self.lock_map(&self.session, "currentUser")?.clone())
    }

    fn save_session(&self, session: Option<&Session>) -> Result<(), DomainError> {
        *self.lock_map(&self.session, "currentUser")? = session.cloned();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NewOrder, NewUser, OrderId, OrderLine};
    use chrono::Utc;

    #[test]
    fn collections_round_trip_as_whole_snapshots() -> Result<(), DomainError> {
        let repo = InMemoryPanelRepository::new();
        assert!(repo.load_users()?.is_empty());
        assert!(repo.load_catalog()?.is_none());

        let ana = User::client(NewUser::new("ana", "x"), Utc::now())?;
        repo.save_users(&[ana.clone()])?;
        assert_eq!(repo.load_users()?, vec![ana]);

        let catalog = Catalog::seed();
        let order = Order::new(OrderId::from("S-1"),
                               "ana",
                               NewOrder::with_lines([OrderLine::new(3, 2)]),
                               &catalog,
                               Utc::now())?;
        repo.save_orders(&[order.clone()])?;
        repo.save_orders(&[])?;
        assert!(repo.load_orders()?.is_empty());
        Ok(())
    }

    #[test]
    fn session_can_be_cleared() -> Result<(), DomainError> {
        let repo = InMemoryPanelRepository::new();
        let admin = User::seed_admin("admin", "admin", Utc::now())?;
        repo.save_session(Some(&Session::for_user(&admin, Utc::now())))?;
        assert_eq!(repo.load_session()?.map(|s| s.username), Some("admin".to_string()));
        repo.save_session(None)?;
        assert!(repo.load_session()?.is_none());
        Ok(())
    }

    #[test]
    fn mutex_poisoning_returns_error() {
        use std::thread;

        let repo = InMemoryPanelRepository::new();

        // Poison the orders mutex by panicking while holding the lock in another
        // thread
        let orders = repo.orders.clone();
        let handle = thread::spawn(move || {
            let _g = orders.lock().unwrap();
            panic!("force poison");
        });
        let _ = handle.join();

        match repo.load_orders() {
            Err(DomainError::Storage(_)) => (),
            other => panic!("expected Storage, got {:?}", other),
        }
    }
}
