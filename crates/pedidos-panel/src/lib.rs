//! pedidos-panel: servicios del panel de pedidos y reclamos
//!
//! Capa de aplicación sobre `pedidos_domain::PanelRepository`:
//! catálogo, directorio de usuarios, libro de solicitudes, libro de
//! reclamos, estadísticas y la fachada `Panel` con sesión y control de rol.
//!
//! ```rust
//! use pedidos_domain::{InMemoryPanelRepository, NewOrder, NewUser, OrderLine};
//! use pedidos_panel::{Panel, PanelConfig};
//! use std::sync::Arc;
//!
//! let panel = Panel::open(Arc::new(InMemoryPanelRepository::new()), &PanelConfig::default()).unwrap();
//! panel.register(NewUser::new("ana", "clave")).unwrap();
//! panel.login("ana", "clave").unwrap();
//! let order = panel.create_order(NewOrder::with_lines([OrderLine::new(1, 10)])).unwrap();
//! assert_eq!(panel.orders().compute_total(&order).unwrap(), 50_000);
//! ```

pub mod catalog;
pub mod claims;
pub mod config;
pub mod directory;
pub mod orders;
pub mod panel;
pub mod stats;

pub use catalog::CatalogService;
pub use claims::{ClaimLedger, ClaimOutcome};
pub use config::{ConfigError, PanelConfig};
pub use directory::{RemovalReport, UserDirectory};
pub use orders::{OrderLedger, OrderSummary};
pub use panel::Panel;
pub use stats::{PanelStats, StatsAggregator};
