use chrono::Utc;
use log::{info, warn};
use pedidos_domain::{DomainError, NewUser, PanelRepository, Role, User};
use std::sync::Arc;

/// Resultado del borrado en cascada de un usuario.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemovalReport {
    pub orders_removed: usize,
    pub claims_removed: usize,
}

/// Directorio de usuarios: credenciales, altas, roles y bajas en cascada.
pub struct UserDirectory<R>
    where R: PanelRepository
{
    repo: Arc<R>,
}

impl<R> UserDirectory<R> where R: PanelRepository
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Siembra la cuenta administradora si el directorio está vacío.
    /// Devuelve `true` si sembró.
    pub fn ensure_seed_admin(&self, username: &str, password: &str) -> Result<bool, DomainError> {
        if !self.repo.load_users()?.is_empty() {
            return Ok(false);
        }
        let admin = User::seed_admin(username, password, Utc::now())?;
        self.repo.save_users(&[admin])?;
        info!("directorio vacío: administrador '{}' sembrado", username);
        Ok(true)
    }

    /// Coincidencia exacta (sensible a mayúsculas) del usuario y verificación
    /// del digest de la contraseña. Una contraseña heredada en texto plano
    /// se reemplaza por su digest tras el primer login correcto.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<User, DomainError> {
        let mut users = self.repo.load_users()?;
        let Some(idx) = users.iter().position(|u| u.username() == username && u.verify_password(password)) else {
            warn!("login fallido para '{}'", username);
            return Err(DomainError::AuthFailure("credenciales inválidas".to_string()));
        };
        if users[idx].has_legacy_password() {
            users[idx] = users[idx].with_hashed_password();
            self.repo.save_users(&users)?;
            info!("contraseña de '{}' convertida a digest", username);
        }
        let user = users.swap_remove(idx);
        info!("login de '{}' ({})", username, user.role());
        Ok(user)
    }

    /// Alta de un cliente. El rol nunca lo elige quien se registra.
    pub fn register(&self, candidate: NewUser) -> Result<User, DomainError> {
        let mut users = self.repo.load_users()?;
        if users.iter().any(|u| u.username() == candidate.username) {
            return Err(DomainError::Conflict(format!("el usuario '{}' ya existe", candidate.username)));
        }
        let user = User::client(candidate, Utc::now())?;
        users.push(user.clone());
        self.repo.save_users(&users)?;
        info!("usuario '{}' registrado", user.username());
        Ok(user)
    }

    /// Cambia el rol. `Ok(false)` si el usuario no existe.
    pub fn set_role(&self, username: &str, role: Role) -> Result<bool, DomainError> {
        let mut users = self.repo.load_users()?;
        let Some(idx) = users.iter().position(|u| u.username() == username) else {
            return Ok(false);
        };
        if users[idx].is_admin() && role != Role::Admin && Self::admin_count(&users) == 1 {
            return Err(DomainError::ValidationError("no se puede quitar el rol al último administrador".to_string()));
        }
        users[idx] = users[idx].with_role(role);
        self.repo.save_users(&users)?;
        info!("usuario '{}' ahora es {}", username, role);
        Ok(true)
    }

    /// Borra el usuario y, en cascada, todas sus solicitudes y reclamos.
    /// Irreversible.
    pub fn remove(&self, username: &str) -> Result<RemovalReport, DomainError> {
        let mut users = self.repo.load_users()?;
        let Some(idx) = users.iter().position(|u| u.username() == username) else {
            return Err(DomainError::NotFound(format!("usuario '{}'", username)));
        };
        if users[idx].is_admin() && Self::admin_count(&users) == 1 {
            return Err(DomainError::ValidationError("no se puede eliminar al último administrador".to_string()));
        }

        // Dependientes primero: nunca quedan registros apuntando a un usuario
        // inexistente.
        let mut orders = self.repo.load_orders()?;
        let before = orders.len();
        orders.retain(|o| o.created_by() != username);
        let orders_removed = before - orders.len();

        let mut claims = self.repo.load_claims()?;
        let before = claims.len();
        claims.retain(|c| c.created_by() != username);
        let claims_removed = before - claims.len();

        self.repo.save_orders(&orders)?;
        self.repo.save_claims(&claims)?;
        users.remove(idx);
        self.repo.save_users(&users)?;

        info!("usuario '{}' eliminado ({} solicitudes, {} reclamos)", username, orders_removed, claims_removed);
        Ok(RemovalReport { orders_removed, claims_removed })
    }

    pub fn find(&self, username: &str) -> Result<Option<User>, DomainError> {
        Ok(self.repo.load_users()?.into_iter().find(|u| u.username() == username))
    }

    pub fn list(&self) -> Result<Vec<User>, DomainError> {
        self.repo.load_users()
    }

    pub fn list_by_role(&self, role: Role) -> Result<Vec<User>, DomainError> {
        Ok(self.repo.load_users()?.into_iter().filter(|u| u.role() == role).collect())
    }

    fn admin_count(users: &[User]) -> usize {
        users.iter().filter(|u| u.is_admin()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pedidos_domain::InMemoryPanelRepository;

    fn directory() -> Result<UserDirectory<InMemoryPanelRepository>, DomainError> {
        let dir = UserDirectory::new(Arc::new(InMemoryPanelRepository::new()));
        dir.ensure_seed_admin("admin", "admin")?;
        Ok(dir)
    }

    #[test]
    fn seed_happens_only_once() -> Result<(), DomainError> {
        let dir = directory()?;
        assert!(!dir.ensure_seed_admin("otro", "otro")?);
        assert_eq!(dir.list()?.len(), 1);
        assert!(dir.authenticate("admin", "admin")?.is_admin());
        Ok(())
    }

    #[test]
    fn authentication_is_exact() -> Result<(), DomainError> {
        let dir = directory()?;
        dir.register(NewUser::new("Ana", "clave"))?;
        assert!(dir.authenticate("Ana", "clave").is_ok());
        assert!(matches!(dir.authenticate("ana", "clave"), Err(DomainError::AuthFailure(_))));
        assert!(matches!(dir.authenticate("Ana", "Clave"), Err(DomainError::AuthFailure(_))));
        assert!(matches!(dir.authenticate("An", "clave"), Err(DomainError::AuthFailure(_))));
        Ok(())
    }

    #[test]
    fn duplicate_registration_is_a_conflict_without_mutation() -> Result<(), DomainError> {
        let dir = directory()?;
        dir.register(NewUser::new("ana", "clave"))?;
        let before = dir.list()?;
        assert!(matches!(dir.register(NewUser::new("ana", "otra")), Err(DomainError::Conflict(_))));
        assert!(matches!(dir.register(NewUser::new("admin", "")), Err(DomainError::Conflict(_))));
        assert_eq!(dir.list()?, before);
        Ok(())
    }

    #[test]
    fn registration_always_creates_clients() -> Result<(), DomainError> {
        let dir = directory()?;
        let user = dir.register(NewUser::new("ana", "clave"))?;
        assert_eq!(user.role(), Role::Client);
        assert!(user.created_at().is_some());
        assert_eq!(dir.list_by_role(Role::Client)?.len(), 1);
        Ok(())
    }

    #[test]
    fn set_role_reports_missing_users() -> Result<(), DomainError> {
        let dir = directory()?;
        dir.register(NewUser::new("ana", "clave"))?;
        assert!(!dir.set_role("nadie", Role::Admin)?);
        assert!(dir.set_role("ana", Role::Admin)?);
        assert_eq!(dir.find("ana")?.map(|u| u.role()), Some(Role::Admin));
        Ok(())
    }

    #[test]
    fn last_admin_is_protected() -> Result<(), DomainError> {
        let dir = directory()?;
        assert!(matches!(dir.set_role("admin", Role::Client), Err(DomainError::ValidationError(_))));
        assert!(matches!(dir.remove("admin"), Err(DomainError::ValidationError(_))));
        dir.register(NewUser::new("ana", "clave"))?;
        dir.set_role("ana", Role::Admin)?;
        dir.remove("admin")?;
        assert!(dir.find("admin")?.is_none());
        Ok(())
    }

    #[test]
    fn removing_unknown_user_is_not_found() -> Result<(), DomainError> {
        let dir = directory()?;
        assert!(matches!(dir.remove("nadie"), Err(DomainError::NotFound(_))));
        Ok(())
    }

    #[test]
    fn legacy_plaintext_login_upgrades_the_stored_password() -> Result<(), DomainError> {
        let repo = Arc::new(InMemoryPanelRepository::new());
        let legacy: Vec<User> =
            serde_json::from_str(r#"[{"username":"admin","password":"admin","role":"admin","name":"Administrador"}]"#)?;
        repo.save_users(&legacy)?;
        let dir = UserDirectory::new(repo.clone());

        assert!(!dir.ensure_seed_admin("otro", "otro")?);
        assert!(matches!(dir.authenticate("admin", "mal"), Err(DomainError::AuthFailure(_))));
        assert!(repo.load_users()?[0].has_legacy_password());

        assert!(dir.authenticate("admin", "admin")?.is_admin());
        let stored = repo.load_users()?;
        assert!(!stored[0].has_legacy_password());
        assert!(stored[0].verify_password("admin"));
        Ok(())
    }
}
