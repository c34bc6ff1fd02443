//! # inbox-core
//!
//! Core types, traits, and abstractions for the inbox matching service.
//!
//! This crate provides the data model, the error type and the repository
//! traits the database, job and API crates are built on.

pub mod currency;
pub mod defaults;
pub mod error;
pub mod logging;
pub mod models;
pub mod traits;
pub mod uuid_utils;

// Re-export commonly used types at crate root
pub use currency::{is_known_currency, UNIQUE_CURRENCIES};
pub use error::{Error, Result};
pub use models::*;
pub use traits::*;
pub use uuid_utils::new_v7;
