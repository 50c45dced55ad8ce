//! Trait definitions implemented by the backend crates.

pub mod store;

pub use store::Store;
