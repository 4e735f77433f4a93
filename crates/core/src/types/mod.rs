//! Core types for Heartwood.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod order_number;
pub mod price;
pub mod role;
pub mod status;
pub mod user_ref;

pub use email::{Email, EmailError};
pub use id::*;
pub use order_number::OrderNumber;
pub use price::{Price, PriceError};
pub use role::Role;
pub use status::OrderStatus;
pub use user_ref::{UserRef, UserSummary};
