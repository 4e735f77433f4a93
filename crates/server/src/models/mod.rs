//! Domain models for the marketplace.
//!
//! These are validated domain objects, separate from database row types.
//! API responses serialize them directly with camelCase field names.

pub mod order;
pub mod product;
pub mod session;
pub mod user;

pub use order::{ItemProductRef, Order, OrderItem};
pub use product::Product;
pub use session::{CurrentUser, session_keys};
pub use user::User;
