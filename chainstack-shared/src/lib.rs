//! # Chainstack Shared Library
//!
//! This crate contains the token and access-control core used by the
//! Chainstack API server and its operator tooling.
//!
//! ## Module Organization
//!
//! - `auth`: Credential verification, token lifecycle, authorization gate
//! - `accounts`: User registration and administration
//! - `quota`: Per-user quotas and quota-gated resource creation
//! - `resources`: Owner-scoped resource operations
//! - `sweeper`: Background purge of expired access tokens
//! - `store`: Persistence traits with PostgreSQL and in-memory implementations
//! - `models`: Users, access tokens and resources
//! - `db`: Connection pool and migrations
//! - `clock`: Injectable time source
//! - `error`: Common error types

pub mod accounts;
pub mod auth;
pub mod clock;
pub mod db;
pub mod error;
pub mod models;
pub mod quota;
pub mod resources;
pub mod store;
pub mod sweeper;

pub use error::{Error, Result};

/// Current version of the Chainstack shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
