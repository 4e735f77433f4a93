//! Business services for the marketplace.
//!
//! Services own validation and the guards in front of the repositories:
//! - [`auth`] - registration and login
//! - [`orders`] - order placement (the transactional stock-decrement flow)
//!   and status transitions
//! - [`products`] - owner-scoped listing management

pub mod auth;
pub mod orders;
pub mod products;

pub use auth::{AuthError, AuthService};
pub use orders::{OrderError, OrderService};
pub use products::{ProductError, ProductService};
