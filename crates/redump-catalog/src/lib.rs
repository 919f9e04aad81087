//! Redump-Catalog: remote disc catalog integration for DiscForge
//!
//! This crate is the boundary between DiscForge and the online disc
//! catalog. It defines the protocol the rest of the workspace talks to
//! ([`CatalogService`]) and ships a `reqwest`-backed implementation
//! ([`RedumpClient`]) plus in-memory fakes for tests.
//!
//! ## Protocol
//!
//! - `authenticate(user, pass)` opens a session
//! - `search_by_sha1(sha1)` lists catalog IDs whose track matches
//! - `fetch_by_id(id)` returns the record used to back-fill a submission

pub mod client;
pub mod error;
pub mod fakes;
pub mod service;

pub use client::{RedumpClient, RedumpConfig};
pub use error::CatalogError;
pub use service::{CatalogId, CatalogRecord, CatalogService, CatalogSession};

/// Result type for catalog operations
pub type Result<T> = std::result::Result<T, CatalogError>;
