//! Photo scan flow
//!
//! A recognizer turns a photo into candidate items; the session keeps the
//! latest result so the user can drop false positives before accepting the
//! rest into the inventory.

use crate::error::{AppError, Result};
use crate::inventory::InventoryItem;
use crate::services::inventory::InventoryService;
use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};

/// Instruction sent alongside the photo
pub const SCAN_PROMPT: &str = "Analyze the image and identify every food item in it. \
Return ONLY a JSON array of objects with the keys name, quantity_estimate, \
quantity_estimate_type (for example kg, g or pcs), item_category (for example fruit or vegetable) \
and confidence_score (a number between 0 and 1).";

/// Base64-encoded photo
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub base64_data: String,
    pub mime_type: String,
}

impl ImagePayload {
    pub fn jpeg(base64_data: impl Into<String>) -> Self {
        Self {
            base64_data: base64_data.into(),
            mime_type: "image/jpeg".to_string(),
        }
    }
}

/// One food item recognized in a photo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScannedItem {
    pub name: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub quantity_estimate: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub quantity_estimate_type: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub item_category: String,
    #[serde(default)]
    pub confidence_score: Option<f64>,
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => s,
        serde_json::Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

/// Identifies food items in a photo
#[async_trait]
pub trait FoodRecognizer: Send + Sync {
    async fn identify(&self, image: &ImagePayload) -> Result<Vec<ScannedItem>>;
}

#[derive(Debug, Clone, Default)]
pub struct ScanSession {
    items: Vec<ScannedItem>,
}

impl ScanSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the recognizer and replace the session contents with its result.
    /// The previous result is discarded even when the call fails.
    pub async fn scan(
        &mut self,
        recognizer: &dyn FoodRecognizer,
        image: &ImagePayload,
    ) -> Result<&[ScannedItem]> {
        self.items.clear();

        let items = recognizer.identify(image).await?;
        tracing::info!("Scan identified {} items", items.len());

        self.items = items;
        Ok(&self.items)
    }

    pub fn items(&self) -> &[ScannedItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Drop a false positive
    pub fn remove(&mut self, index: usize) -> Result<ScannedItem> {
        if index >= self.items.len() {
            return Err(AppError::Validation(format!(
                "No scanned item at position {}",
                index
            )));
        }
        Ok(self.items.remove(index))
    }

    /// Add the remaining items to the inventory and clear the session
    pub async fn accept(&mut self, inventory: &InventoryService) -> Result<Vec<InventoryItem>> {
        if self.items.is_empty() {
            return Err(AppError::Validation(
                "There are no items to add yet".to_string(),
            ));
        }

        let added = inventory.add_scanned_items(&self.items).await?;
        self.items.clear();

        Ok(added)
    }
}
