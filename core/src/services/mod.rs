//! Services module
//!
//! Business logic services that coordinate between callers and the store.

pub mod inventory;
pub mod recipes;
pub mod scan;
pub mod settings;

pub use inventory::{InventoryService, ItemFilter};
pub use recipes::{ImageLookup, Meal, MealRequest, MealSuggester, RecipeService};
pub use scan::{FoodRecognizer, ImagePayload, ScanSession, ScannedItem};
pub use settings::{
    AiPreferences, AppSettings, Currency, ResetConfirmation, SettingsService, SpiceLevel, Theme,
};
