//! Meal suggestions
//!
//! Builds a prompt from the acquired part of the inventory and the user's
//! dietary preferences, asks the meal suggester for recipes and fills in
//! missing pictures through the image lookup.

use crate::config::DEFAULT_SUGGESTION_COUNT;
use crate::error::{AppError, Result};
use crate::inventory::InventoryItem;
use crate::services::settings::AiPreferences;
use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;

/// A suggested recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meal {
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    /// Quantified ingredients, e.g. "300g Chicken Breast"
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub calories: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub proteins: Option<f64>,
    #[serde(default, deserialize_with = "lenient_minutes")]
    pub prep_time_minutes: Option<u32>,
}

fn number_from(value: serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => leading_number(&s),
        _ => None,
    }
}

/// Number at the start of text like "450 kcal", "1,200 kcal" or "12,5 g".
/// A comma followed by exactly three digits groups thousands; any other
/// single comma is a decimal separator.
fn leading_number(text: &str) -> Option<f64> {
    let token: String = text
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();
    let token = token.trim_end_matches(&[',', '.'][..]);

    let groups: Vec<&str> = token.split(',').collect();
    let thousands = groups.len() > 1
        && groups[1..].iter().enumerate().all(|(i, group)| {
            let digits = group.split('.').next().unwrap_or_default();
            let is_last = i == groups.len() - 2;
            digits.len() == 3
                && digits.chars().all(|c| c.is_ascii_digit())
                && (is_last || !group.contains('.'))
        });

    let normalized = if thousands {
        token.replace(',', "")
    } else if groups.len() == 2 && !token.contains('.') {
        token.replace(',', ".")
    } else if groups.len() == 1 {
        token.to_string()
    } else {
        return None;
    };

    normalized.parse().ok()
}

fn lenient_number<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(number_from(value).filter(|n| n.is_finite() && *n >= 0.0))
}

fn lenient_minutes<'de, D>(deserializer: D) -> std::result::Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(number_from(value)
        .filter(|n| n.is_finite() && *n >= 0.0 && *n <= f64::from(u32::MAX))
        .map(|n| n.round() as u32))
}

/// Input to a meal suggester
#[derive(Debug, Clone, PartialEq)]
pub struct MealRequest {
    /// Ingredient labels, `"name (qty unit)"`
    pub ingredients: Vec<String>,
    pub preferences: AiPreferences,
    pub count: usize,
}

impl MealRequest {
    /// Request over every item that is not on the shopping list
    pub fn from_inventory(items: &[InventoryItem], preferences: &AiPreferences, count: usize) -> Self {
        Self {
            ingredients: items
                .iter()
                .filter(|item| !item.is_to_buy())
                .map(InventoryItem::ingredient_label)
                .collect(),
            preferences: preferences.clone(),
            count,
        }
    }

    /// Prompt text sent to the generative model
    pub fn prompt(&self) -> String {
        let preferences = &self.preferences;

        let mut dietary = Vec::new();
        if preferences.is_vegetarian {
            dietary.push("All meals must be vegetarian (no meat or fish).".to_string());
        }
        if preferences.avoid_dairy {
            dietary.push("Avoid dairy products.".to_string());
        }
        dietary.push(format!("Preferred spice level: {}.", preferences.spice_level.as_str()));
        let allergens = preferences.allergen_list();
        if !allergens.is_empty() {
            dietary.push(format!(
                "Never use these allergens: {}.",
                allergens.join(", ")
            ));
        }

        format!(
            "Based on the following available ingredients, suggest {count} quick and easy meal recipes.\n\
             \n\
             Available ingredients:\n\
             {ingredients}\n\
             (Example format: \"Chicken Breast (500 grams), Eggs (6 pieces), Milk (1 liter)\")\n\
             \n\
             Dietary preferences:\n\
             {dietary}\n\
             \n\
             For each meal, look at the quantities in the available ingredients list and give the exact \
             quantity of each ingredient the recipe needs in the 'ingredients' array. The quantity used \
             must be less than or equal to the available amount.\n\
             \n\
             Return ONLY a raw JSON array of Meal objects, without explanatory text or markdown fences:\n\
             interface Meal {{\n\
             \x20 name: string;\n\
             \x20 image?: string;\n\
             \x20 ingredients: string[]; // quantified, e.g. \"300g Chicken Breast\"\n\
             \x20 steps: string[];\n\
             \x20 calories: number;\n\
             \x20 proteins: number;\n\
             \x20 prepTimeMinutes: number;\n\
             }}",
            count = self.count,
            ingredients = self.ingredients.join(", "),
            dietary = dietary.join("\n"),
        )
    }
}

/// Produces meal suggestions for a request
#[async_trait]
pub trait MealSuggester: Send + Sync {
    async fn suggest_meals(&self, request: &MealRequest) -> Result<Vec<Meal>>;
}

/// Finds a representative photo for a search phrase
#[async_trait]
pub trait ImageLookup: Send + Sync {
    async fn find_image(&self, query: &str) -> Result<Option<String>>;
}

#[derive(Clone)]
pub struct RecipeService {
    suggester: Arc<dyn MealSuggester>,
    images: Option<Arc<dyn ImageLookup>>,
    count: usize,
}

impl RecipeService {
    pub fn new(suggester: Arc<dyn MealSuggester>, images: Option<Arc<dyn ImageLookup>>) -> Self {
        Self {
            suggester,
            images,
            count: DEFAULT_SUGGESTION_COUNT,
        }
    }

    /// Number of meals requested per call; at least one
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count.max(1);
        self
    }

    /// Suggest meals from the current inventory. Fails without contacting
    /// the suggester when no acquired items are available.
    pub async fn suggest(
        &self,
        items: &[InventoryItem],
        preferences: &AiPreferences,
    ) -> Result<Vec<Meal>> {
        let request = MealRequest::from_inventory(items, preferences, self.count);
        if request.ingredients.is_empty() {
            return Err(AppError::Validation(
                "Please add some available products (not marked 'To Buy') to your inventory first"
                    .to_string(),
            ));
        }

        tracing::info!(
            "Requesting {} meal suggestions from {} ingredients",
            request.count,
            request.ingredients.len()
        );

        let mut meals = self.suggester.suggest_meals(&request).await?;

        if let Some(images) = &self.images {
            for meal in meals.iter_mut().filter(|meal| meal.image.is_none()) {
                match images.find_image(&meal.name).await {
                    Ok(image) => meal.image = image,
                    Err(e) => tracing::warn!("Image lookup failed for {}: {}", meal.name, e),
                }
            }
        }

        Ok(meals)
    }
}
