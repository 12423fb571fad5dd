//! Storage module
//!
//! Typed access to the slots of the local key-value store.

pub mod inventory_store;

pub use inventory_store::InventoryStore;
