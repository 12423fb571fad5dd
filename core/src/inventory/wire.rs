//! Stored item shape
//!
//! Records are read leniently and normalized into [`InventoryItem`]:
//! prices may be numbers or strings with either decimal separator, dates
//! may be empty strings, quantities may be bare numbers, and records
//! written before `status` existed carry `toBuy` / `inProgress` flags.
//! Writes always use the canonical shape.

use super::item::{InventoryItem, ItemId, ItemStatus};
use crate::stats::expiration::parse_date;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredItem {
    id: ItemId,
    #[serde(default, deserialize_with = "lenient_string")]
    name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    category: String,
    #[serde(default, deserialize_with = "lenient_string")]
    quantity: String,
    #[serde(default, deserialize_with = "lenient_string")]
    quantity_type: String,
    #[serde(default, deserialize_with = "lenient_price")]
    price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_date")]
    bought_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient_date")]
    expiration_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient_optional_string")]
    image: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    notes: String,
    #[serde(default, deserialize_with = "lenient_status")]
    status: Option<ItemStatus>,
    #[serde(default, deserialize_with = "lenient_bool")]
    to_buy: bool,
    #[serde(default, deserialize_with = "lenient_bool")]
    in_progress: bool,
}

impl From<StoredItem> for InventoryItem {
    fn from(stored: StoredItem) -> Self {
        let status = stored
            .status
            .unwrap_or_else(|| ItemStatus::from_flags(stored.to_buy, stored.in_progress));

        InventoryItem {
            id: stored.id,
            name: stored.name,
            category: stored.category,
            quantity: stored.quantity,
            quantity_type: stored.quantity_type,
            price: stored.price,
            bought_date: stored.bought_date,
            expiration_date: stored.expiration_date,
            image: stored.image,
            notes: stored.notes,
            status,
        }
    }
}

/// Parse a user-entered price. Accepts `,` as the decimal separator.
/// Empty, unparseable and non-finite input yields `None`.
pub fn parse_price(raw: &str) -> Option<f64> {
    let cleaned = raw.trim().replacen(',', ".", 1);
    if cleaned.is_empty() {
        return None;
    }

    cleaned.parse::<f64>().ok().filter(|price| price.is_finite())
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => text,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    })
}

fn lenient_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = lenient_string(deserializer)?;
    Ok(Some(text).filter(|t| !t.trim().is_empty()))
}

fn lenient_price<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64().filter(|price| price.is_finite()),
        Value::String(text) => parse_price(&text),
        _ => None,
    })
}

fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => {
            let parsed = parse_date(&text);
            if parsed.is_none() && !text.trim().is_empty() {
                tracing::warn!("Dropping unparseable stored date {:?}", text);
            }
            parsed
        }
        _ => None,
    })
}

/// Unknown status values fall back to the legacy flags
fn lenient_status<'de, D>(deserializer: D) -> Result<Option<ItemStatus>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => match text.parse::<ItemStatus>() {
            Ok(status) => Some(status),
            Err(e) => {
                tracing::warn!("Ignoring stored status: {}", e);
                None
            }
        },
        _ => None,
    })
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(b) => b,
        Value::String(text) => text.eq_ignore_ascii_case("true"),
        Value::Number(n) => n.as_i64().is_some_and(|n| n != 0),
        _ => false,
    })
}
