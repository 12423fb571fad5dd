//! Settings service
//!
//! Manages application settings persisted as one JSON record in the
//! settings slot of the local store. Records are decoded field by field:
//! a missing or unreadable field takes its default without affecting the
//! others. A record that is not a JSON object is moved aside before the
//! defaults replace it.

use crate::config::{
    MAX_ALLERGENS_LENGTH, RESET_CODE_MAX, RESET_CODE_MIN, SETTINGS_KEY, SETTINGS_QUARANTINE_KEY,
};
use crate::database::Repository;
use crate::error::{AppError, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Display currency for prices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Currency {
    #[default]
    USD,
    EUR,
    GBP,
    AZN,
}

impl Currency {
    pub const ALL: [Currency; 4] = [Currency::USD, Currency::EUR, Currency::GBP, Currency::AZN];

    pub fn code(self) -> &'static str {
        match self {
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::AZN => "AZN",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Currency::USD => "$",
            Currency::EUR => "€",
            Currency::GBP => "£",
            Currency::AZN => "₼",
        }
    }

    /// Amount with symbol and two decimals; non-finite amounts render as zero
    pub fn format(self, amount: f64) -> String {
        let amount = if amount.is_finite() { amount } else { 0.0 };
        if amount < 0.0 {
            format!("-{}{:.2}", self.symbol(), amount.abs())
        } else {
            format!("{}{:.2}", self.symbol(), amount)
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let code = s.trim().to_uppercase();
        Currency::ALL
            .into_iter()
            .find(|currency| currency.code() == code)
            .ok_or_else(|| format!("Unsupported currency: {}", s))
    }
}

/// UI theme (stored for the presentation layer only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    System,
    Light,
    Dark,
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "system" => Ok(Theme::System),
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => Err(format!("Unsupported theme: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpiceLevel {
    Mild,
    #[default]
    Medium,
    Hot,
}

impl SpiceLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            SpiceLevel::Mild => "mild",
            SpiceLevel::Medium => "medium",
            SpiceLevel::Hot => "hot",
        }
    }
}

impl FromStr for SpiceLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mild" => Ok(SpiceLevel::Mild),
            "medium" => Ok(SpiceLevel::Medium),
            "hot" => Ok(SpiceLevel::Hot),
            _ => Err(format!("Unsupported spice level: {}", s)),
        }
    }
}

/// Dietary preferences passed to meal suggestions
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "Value")]
pub struct AiPreferences {
    pub is_vegetarian: bool,
    pub avoid_dairy: bool,
    pub spice_level: SpiceLevel,
    /// Free-text, comma separated
    pub allergens: String,
}

impl AiPreferences {
    /// Allergen entries, trimmed, empty entries dropped
    pub fn allergen_list(&self) -> Vec<&str> {
        self.allergens
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .collect()
    }
}

impl From<Value> for AiPreferences {
    fn from(value: Value) -> Self {
        let Value::Object(record) = value else {
            return Self::default();
        };

        Self {
            is_vegetarian: bool_field(&record, "isVegetarian").unwrap_or(false),
            avoid_dairy: bool_field(&record, "avoidDairy").unwrap_or(false),
            spice_level: enum_field(&record, "spiceLevel"),
            allergens: match record.get("allergens") {
                Some(Value::String(text)) => text.clone(),
                Some(Value::Array(entries)) => entries
                    .iter()
                    .filter_map(Value::as_str)
                    .collect::<Vec<_>>()
                    .join(", "),
                _ => String::new(),
            },
        }
    }
}

/// Application settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "Value")]
pub struct AppSettings {
    pub currency: Currency,
    pub notifications_enabled: bool,
    pub theme: Theme,
    pub ai_preferences: AiPreferences,
}

impl From<Value> for AppSettings {
    fn from(value: Value) -> Self {
        let Value::Object(record) = value else {
            return Self::default();
        };

        Self {
            currency: enum_field(&record, "currency"),
            notifications_enabled: bool_field(&record, "notificationsEnabled").unwrap_or(true),
            theme: enum_field(&record, "theme"),
            ai_preferences: record
                .get("aiPreferences")
                .cloned()
                .map(AiPreferences::from)
                .unwrap_or_default(),
        }
    }
}

fn bool_field(record: &Map<String, Value>, key: &str) -> Option<bool> {
    match record.get(key)? {
        Value::Bool(b) => Some(*b),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// Parse an enum stored as a string; anything unreadable takes the default
fn enum_field<T>(record: &Map<String, Value>, key: &str) -> T
where
    T: FromStr<Err = String> + Default,
{
    match record.get(key) {
        Some(Value::String(text)) => text.parse().unwrap_or_else(|e| {
            tracing::warn!("Ignoring stored {}: {}", key, e);
            T::default()
        }),
        None | Some(Value::Null) => T::default(),
        Some(other) => {
            tracing::warn!("Ignoring stored {}: {}", key, other);
            T::default()
        }
    }
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            currency: Currency::default(),
            notifications_enabled: true,
            theme: Theme::default(),
            ai_preferences: AiPreferences::default(),
        }
    }
}

/// A one-off code the user must type back before all data is wiped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetConfirmation {
    code: u32,
}

impl ResetConfirmation {
    pub fn new() -> Self {
        Self {
            code: rand::thread_rng().gen_range(RESET_CODE_MIN..RESET_CODE_MAX),
        }
    }

    pub fn code(&self) -> u32 {
        self.code
    }

    pub fn matches(&self, input: &str) -> bool {
        input.trim() == self.code.to_string()
    }
}

impl Default for ResetConfirmation {
    fn default() -> Self {
        Self::new()
    }
}

/// Service for managing application settings
#[derive(Clone)]
pub struct SettingsService {
    repo: Repository,
}

impl SettingsService {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Load settings from the store or create defaults if none exist.
    /// A record that is not a JSON object is quarantined and replaced by
    /// defaults.
    pub async fn load(&self) -> Result<AppSettings> {
        let Some(raw) = self.repo.get_value(SETTINGS_KEY).await? else {
            tracing::info!("Settings not found, creating default settings");
            let default = AppSettings::default();
            self.save(&default).await?;
            return Ok(default);
        };

        match serde_json::from_str::<Value>(&raw) {
            Ok(value @ Value::Object(_)) => Ok(AppSettings::from(value)),
            _ => {
                tracing::warn!("Stored settings are not a JSON object, using defaults");
                self.repo.quarantine(SETTINGS_QUARANTINE_KEY, &raw).await?;
                let default = AppSettings::default();
                self.save(&default).await?;
                Ok(default)
            }
        }
    }

    /// Save settings to the store
    pub async fn save(&self, settings: &AppSettings) -> Result<()> {
        validate_preferences(&settings.ai_preferences)?;

        let content = serde_json::to_string(settings)?;
        self.repo.set_value(SETTINGS_KEY, &content).await?;
        tracing::info!("Settings saved");

        Ok(())
    }

    /// Get dietary preferences
    pub async fn get_ai_preferences(&self) -> Result<AiPreferences> {
        let settings = self.load().await?;
        Ok(settings.ai_preferences)
    }

    /// Update dietary preferences
    pub async fn update_ai_preferences(&self, preferences: AiPreferences) -> Result<()> {
        let mut settings = self.load().await?;
        settings.ai_preferences = preferences;
        self.save(&settings).await
    }

    /// Get display currency
    pub async fn get_currency(&self) -> Result<Currency> {
        let settings = self.load().await?;
        Ok(settings.currency)
    }

    /// Update display currency
    pub async fn update_currency(&self, currency: Currency) -> Result<()> {
        let mut settings = self.load().await?;
        settings.currency = currency;
        self.save(&settings).await
    }

    /// Enable or disable notifications
    pub async fn set_notifications_enabled(&self, enabled: bool) -> Result<()> {
        let mut settings = self.load().await?;
        settings.notifications_enabled = enabled;
        self.save(&settings).await
    }

    /// Wipe every stored slot (inventory, settings, quarantine) when the
    /// typed input matches the confirmation code.
    pub async fn clear_all_data(&self, confirmation: &ResetConfirmation, input: &str) -> Result<()> {
        if !confirmation.matches(input) {
            return Err(AppError::Validation(
                "Code mismatch. Data deletion cancelled.".to_string(),
            ));
        }

        let removed = self.repo.clear_all().await?;
        tracing::info!("All application data deleted ({} slots)", removed);

        Ok(())
    }
}

fn validate_preferences(preferences: &AiPreferences) -> Result<()> {
    if preferences.allergens.len() > MAX_ALLERGENS_LENGTH {
        return Err(AppError::Validation(format!(
            "Allergen list must be at most {} characters",
            MAX_ALLERGENS_LENGTH
        )));
    }
    Ok(())
}
