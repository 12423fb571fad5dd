//! FreshKeep library
//!
//! Core of a food inventory tracker: the item model and its local store,
//! expiry and spending statistics, settings, and the AI meal suggestion and
//! photo scan boundaries. Presentation layers build on [`app::AppState`].

pub mod app;
pub mod clients;
pub mod config;
pub mod database;
pub mod error;
pub mod inventory;
pub mod logging;
pub mod services;
pub mod stats;
pub mod storage;

pub use app::AppState;
pub use error::{AppError, Result};
