//! Inventory data model
//!
//! - `item`: records, lifecycle status and edit requests
//! - `ids`: timestamp-based id generation
//! - `wire`: lenient decoding of stored records

pub mod ids;
pub mod item;
mod wire;

pub use ids::IdGenerator;
pub use item::{InventoryItem, ItemId, ItemStatus, NewItemRequest, UpdateItemRequest};
pub use wire::parse_price;
