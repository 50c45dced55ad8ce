//! # uidhub-core
//!
//! Core crate for UidHub. Contains the store trait, configuration schemas,
//! typed record keys, and the unified error system.
//!
//! This crate has **no** internal dependencies on other UidHub crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
