use chrono::Utc;
use panel_store::{FileSnapshotStore, SnapshotStore};
use pedidos_domain::{Catalog, Claim, ClaimId, NewClaim, NewOrder, NewUser, Order, OrderId, OrderLine, PanelRepository,
                     Resolution, Session, User};
use pedidos_persistence::{open, SnapshotPanelRepository, CATALOG_KEY, SESSION_KEY, USERS_KEY};
use std::sync::Arc;

/// Test-local helper: key presence checked through `SnapshotStore::get`.
trait ContainsKey {
  fn contains(&self, key: &str) -> panel_store::Result<bool>;
}

impl<S: SnapshotStore + ?Sized> ContainsKey for S {
  fn contains(&self, key: &str) -> panel_store::Result<bool> {
    Ok(self.get(key)?.is_some())
  }
}

#[test]
fn collections_survive_reopening() {
  let dir = tempfile::tempdir().unwrap();
  let ana = User::client(NewUser::new("ana", "clave"), Utc::now()).unwrap();
  let mut catalog = Catalog::seed();
  catalog.set_price(2, 1750).unwrap();
  let order = Order::new(OrderId::from("S-1"),
                         "ana",
                         NewOrder::with_lines([OrderLine::new(2, 4)]),
                         &catalog,
                         Utc::now()).unwrap();
  let mut claim = Claim::new(ClaimId::from("R-1"), "ana", NewClaim::for_order(OrderId::from("S-1"), "faltan dos"), Utc::now()).unwrap();
  claim.close(Resolution::Accepted, "se reintegra", Utc::now()).unwrap();

  {
    let repo = open(Some(dir.path())).unwrap();
    repo.save_users(&[ana.clone()]).unwrap();
    repo.save_catalog(&catalog).unwrap();
    repo.save_orders(&[order.clone()]).unwrap();
    repo.save_claims(&[claim.clone()]).unwrap();
    repo.save_session(Some(&Session::for_user(&ana, Utc::now()))).unwrap();
  }

  let repo = open(Some(dir.path())).unwrap();
  let users = repo.load_users().unwrap();
  assert_eq!(users.len(), 1);
  assert!(users[0].verify_password("clave"));
  assert_eq!(repo.load_catalog().unwrap().and_then(|c| c.find(2).map(|p| p.price)), Some(1750));
  assert_eq!(repo.load_orders().unwrap(), vec![order]);
  assert_eq!(repo.load_claims().unwrap(), vec![claim]);
  assert_eq!(repo.load_session().unwrap().map(|s| s.username), Some("ana".to_string()));
}

#[test]
fn logout_removes_the_session_key() {
  let dir = tempfile::tempdir().unwrap();
  let store = Arc::new(FileSnapshotStore::open(dir.path()).unwrap());
  let repo = SnapshotPanelRepository::new(store.clone());
  let admin = User::seed_admin("admin", "admin", Utc::now()).unwrap();
  repo.save_users(&[admin.clone()]).unwrap();
  repo.save_session(Some(&Session::for_user(&admin, Utc::now()))).unwrap();
  assert!(store.contains(SESSION_KEY).unwrap());

  repo.save_session(None).unwrap();
  assert!(!store.contains(SESSION_KEY).unwrap());
  assert!(store.contains(USERS_KEY).unwrap());
  assert!(!store.contains(CATALOG_KEY).unwrap());
}

#[test]
fn in_memory_backend_when_no_directory() {
  let repo = open(None).unwrap();
  assert!(repo.load_users().unwrap().is_empty());
  repo.save_orders(&[]).unwrap();
  assert!(repo.load_orders().unwrap().is_empty());
}
