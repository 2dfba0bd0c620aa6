//! # Chainstack API Server Library
//!
//! HTTP surface over the token and access-control core in
//! `chainstack-shared`.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `extract`: Bearer token authorization extractor
//! - `routes`: API route handlers
//! - `telemetry`: Tracing subscriber setup shared by the binaries

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod telemetry;
