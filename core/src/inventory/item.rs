//! Inventory records
//!
//! An item is in exactly one lifecycle state, carried by [`ItemStatus`].
//! The stored JSON shape is described in `wire.rs`.

use super::wire::StoredItem;
use crate::stats::expiration::days_until_date;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle state of an inventory item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ItemStatus {
    /// On the shopping list, no expiration tracked
    ToBuy,
    /// Acquired, details still incomplete, no expiration alerts
    InProgress,
    /// Fully tracked
    #[default]
    Active,
}

impl ItemStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ItemStatus::ToBuy => "toBuy",
            ItemStatus::InProgress => "inProgress",
            ItemStatus::Active => "active",
        }
    }

    /// Resolve the two legacy flags into a single state. `toBuy` wins when
    /// both are set.
    pub fn from_flags(to_buy: bool, in_progress: bool) -> Self {
        if to_buy {
            ItemStatus::ToBuy
        } else if in_progress {
            ItemStatus::InProgress
        } else {
            ItemStatus::Active
        }
    }

    /// Whether the item is physically in the pantry
    pub fn is_acquired(self) -> bool {
        self != ItemStatus::ToBuy
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "toBuy" | "to_buy" => Ok(ItemStatus::ToBuy),
            "inProgress" | "in_progress" => Ok(ItemStatus::InProgress),
            "active" => Ok(ItemStatus::Active),
            other => Err(format!("unknown item status: {}", other)),
        }
    }
}

/// Item identifier. Generated ids are millisecond timestamps; ids written
/// by older builds may be arbitrary strings or bare JSON numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric value of a timestamp id
    pub fn timestamp(&self) -> Option<i64> {
        self.0.parse().ok()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ItemId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl<'de> Deserialize<'de> for ItemId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Integer(i64),
            Float(f64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(text) => ItemId(text),
            RawId::Integer(n) => ItemId(n.to_string()),
            RawId::Float(n) => ItemId(format!("{}", n)),
        })
    }
}

/// A food item in the inventory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredItem")]
pub struct InventoryItem {
    pub id: ItemId,
    pub name: String,
    pub category: String,
    /// Free-text amount, e.g. "500" or "1.5"
    pub quantity: String,
    /// Free-text unit label, e.g. "g" or "pcs"
    pub quantity_type: String,
    pub price: Option<f64>,
    pub bought_date: Option<NaiveDate>,
    pub expiration_date: Option<NaiveDate>,
    /// Local or remote image URI
    pub image: Option<String>,
    pub notes: String,
    pub status: ItemStatus,
}

impl InventoryItem {
    /// Minimal item with the given id and name
    pub fn new(id: ItemId, name: impl Into<String>, status: ItemStatus) -> Self {
        Self {
            id,
            name: name.into(),
            category: String::new(),
            quantity: String::new(),
            quantity_type: String::new(),
            price: None,
            bought_date: None,
            expiration_date: None,
            image: None,
            notes: String::new(),
            status,
        }
    }

    pub fn is_to_buy(&self) -> bool {
        self.status == ItemStatus::ToBuy
    }

    pub fn is_in_progress(&self) -> bool {
        self.status == ItemStatus::InProgress
    }

    pub fn is_active(&self) -> bool {
        self.status == ItemStatus::Active
    }

    /// Price for aggregation; missing prices count as zero
    pub fn price_or_zero(&self) -> f64 {
        self.price.unwrap_or(0.0)
    }

    /// Days until the expiration date, `None` when no date is recorded
    pub fn days_until_expiration(&self, today: NaiveDate) -> Option<i64> {
        self.expiration_date.map(|date| days_until_date(date, today))
    }

    /// Ingredient description used in meal prompts: `"name (qty unit)"`
    pub fn ingredient_label(&self) -> String {
        let amount = format!("{} {}", self.quantity.trim(), self.quantity_type.trim());
        let amount = amount.trim();

        if amount.is_empty() {
            self.name.clone()
        } else {
            format!("{} ({})", self.name, amount)
        }
    }

    /// Fields that must be filled before an in-progress item becomes active
    pub fn missing_completion_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();

        if self.price.is_none() {
            missing.push("price");
        }
        if self.expiration_date.is_none() {
            missing.push("expiration date");
        }
        if self.quantity.trim().is_empty() {
            missing.push("quantity");
        }
        if self.quantity_type.trim().is_empty() {
            missing.push("quantity type");
        }

        missing
    }
}

/// Manual add-item request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewItemRequest {
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub quantity: String,
    #[serde(default)]
    pub quantity_type: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub bought_date: Option<NaiveDate>,
    #[serde(default)]
    pub expiration_date: Option<NaiveDate>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub notes: String,
    /// Put the item on the shopping list instead of the pantry
    #[serde(default)]
    pub to_buy: bool,
}

/// Edit request. `None` leaves a field unchanged; for the optional fields
/// `Some(None)` clears the value.
#[derive(Debug, Clone, Default)]
pub struct UpdateItemRequest {
    pub id: ItemId,
    pub name: Option<String>,
    pub category: Option<String>,
    pub quantity: Option<String>,
    pub quantity_type: Option<String>,
    pub price: Option<Option<f64>>,
    pub bought_date: Option<Option<NaiveDate>>,
    pub expiration_date: Option<Option<NaiveDate>>,
    pub image: Option<Option<String>>,
    pub notes: Option<String>,
}

impl UpdateItemRequest {
    pub fn new(id: ItemId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    /// Apply the edits to `item`. Status is never changed here.
    pub fn apply_to(&self, item: &mut InventoryItem) {
        if let Some(name) = &self.name {
            item.name = name.trim().to_string();
        }
        if let Some(category) = &self.category {
            item.category = category.trim().to_string();
        }
        if let Some(quantity) = &self.quantity {
            item.quantity = quantity.trim().to_string();
        }
        if let Some(quantity_type) = &self.quantity_type {
            item.quantity_type = quantity_type.trim().to_string();
        }
        if let Some(price) = self.price {
            item.price = price;
        }
        if let Some(bought_date) = self.bought_date {
            item.bought_date = bought_date;
        }
        if let Some(expiration_date) = self.expiration_date {
            item.expiration_date = expiration_date;
        }
        if let Some(image) = &self.image {
            item.image = image.clone().filter(|uri| !uri.trim().is_empty());
        }
        if let Some(notes) = &self.notes {
            item.notes = notes.trim().to_string();
        }
    }
}
