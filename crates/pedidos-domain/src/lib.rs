mod claim;
mod errors;
mod ids;
mod order;
mod panel_repository;
mod product;
mod user;

pub use claim::{Claim, ClaimDetails, ClaimStatus, NewClaim, Resolution};
pub use errors::DomainError;
pub use ids::{ClaimId, IdGenerator, OrderId, ProductId, SequentialIdGenerator, UuidIdGenerator};
pub use order::{BillingAddress, NewOrder, Order, OrderLine, OrderStatus};
pub use panel_repository::{InMemoryPanelRepository, PanelRepository};
pub use product::{Catalog, Product, StockShortage};
pub use user::{NewUser, PasswordHash, Role, Session, User};
