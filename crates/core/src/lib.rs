//! Heartwood Core - Shared domain types.
//!
//! This crate provides the common types used across all Heartwood components:
//! - `server` - The marketplace API (catalog, orders, auth)
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, prices, roles,
//!   order statuses, order numbers, and user references

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
