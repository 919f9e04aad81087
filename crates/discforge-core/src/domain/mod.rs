//! Domain models for DiscForge.
//!
//! Canonical definitions for the static tables every other module keys on:
//! - `KnownSystem`: the console/computer platform a disc belongs to
//! - `MediaType`: the physical media being dumped
//! - `DiscForgeError`: the crate-wide error taxonomy

pub mod error;
pub mod media;
pub mod system;

pub use error::{DiscForgeError, Result};
pub use media::{MediaCategory, MediaType};
pub use system::KnownSystem;
