//! Application configuration
//!
//! Policy constants, validation boundaries and default endpoints live at the
//! top of this module. Provider credentials are not constants: they are
//! loaded at startup into [`ProviderConfig`] from the environment.

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ===== Store Keys =====

/// Store slot holding the JSON-encoded inventory array
pub const INVENTORY_KEY: &str = "products_list";

/// Key prefix for unparseable inventory values moved aside before a reset.
/// Each copy gets its own `{prefix}.{millis}` slot.
pub const INVENTORY_QUARANTINE_KEY: &str = "products_list.corrupt";

/// Store slot holding the JSON-encoded settings record
pub const SETTINGS_KEY: &str = "setting_data";

/// Key prefix for settings records that are not a JSON object
pub const SETTINGS_QUARANTINE_KEY: &str = "setting_data.corrupt";

// ===== Expiration Policy =====

/// Days-until-expiry at or below which an item is "soon" (dashboard and urgency)
pub const SOON_THRESHOLD_DAYS: i64 = 5;

/// Days-until-expiry at or below which the list filter shows an item as expiring.
/// Unlike the dashboard, this filter has no lower bound, so expired items match.
pub const LIST_EXPIRES_SOON_DAYS: i64 = 4;

/// Upper bound (inclusive) of the first expiration window
pub const WINDOW_WEEK_DAYS: i64 = 7;

/// Upper bound (inclusive) of the second expiration window
pub const WINDOW_TWO_WEEKS_DAYS: i64 = 14;

/// Upper bound (inclusive) of the third expiration window
pub const WINDOW_MONTH_DAYS: i64 = 30;

// ===== Validation Limits =====

/// Maximum length of an item name after trimming
pub const MAX_ITEM_NAME_LENGTH: usize = 200;

/// Maximum length of item notes
pub const MAX_NOTES_LENGTH: usize = 2_000;

/// Maximum length of the free-text allergen list
pub const MAX_ALLERGENS_LENGTH: usize = 500;

/// Lower bound (inclusive) of the data-reset confirmation code
pub const RESET_CODE_MIN: u32 = 10_000;

/// Upper bound (exclusive) of the data-reset confirmation code
pub const RESET_CODE_MAX: u32 = 100_000;

// ===== AI Suggestions =====

/// Number of meals requested per suggestion cycle
pub const DEFAULT_SUGGESTION_COUNT: usize = 5;

/// Default generative model
pub const DEFAULT_AI_MODEL: &str = "gemini-2.5-flash";

/// Default generative API base URL
pub const DEFAULT_AI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default image-search API base URL
pub const DEFAULT_IMAGE_SEARCH_BASE_URL: &str = "https://api.pexels.com/v1";

/// User agent sent to both providers
pub const USER_AGENT: &str = concat!("FreshKeep/", env!("CARGO_PKG_VERSION"));

// ===== Provider Configuration =====

/// Generative AI provider settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AiProviderConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    /// Meals requested per suggestion cycle
    pub suggestion_count: usize,
}

impl Default for AiProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_AI_MODEL.to_string(),
            base_url: DEFAULT_AI_BASE_URL.to_string(),
            suggestion_count: DEFAULT_SUGGESTION_COUNT,
        }
    }
}

/// Image-search provider settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ImageSearchConfig {
    pub api_key: String,
    pub base_url: String,
}

impl Default for ImageSearchConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_IMAGE_SEARCH_BASE_URL.to_string(),
        }
    }
}

/// Credentials and endpoints for the external collaborators.
///
/// Read from `FRESHKEEP_AI__API_KEY`, `FRESHKEEP_AI__MODEL`,
/// `FRESHKEEP_IMAGE_SEARCH__API_KEY` and friends.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub ai: AiProviderConfig,
    pub image_search: Option<ImageSearchConfig>,
}

impl ProviderConfig {
    pub const PREFIX: &'static str = "FRESHKEEP";
    pub const SEPARATOR: &'static str = "__";

    /// Load from the process environment, after reading a `.env` file if present.
    pub fn from_env() -> anyhow::Result<Self> {
        let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
        let _ = dotenvy::from_filename(manifest_dir.join(".env")).or_else(|_| dotenvy::dotenv());

        let settings = config::Config::builder()
            .add_source(
                config::Environment::with_prefix(Self::PREFIX)
                    .prefix_separator("_")
                    .separator(Self::SEPARATOR)
                    .try_parsing(true),
            )
            .build()
            .context("failed to read environment variables for provider config")?;

        let cfg = settings
            .try_deserialize::<Self>()
            .context("failed to deserialize environment into provider config")?;

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.ai.api_key.trim().is_empty() {
            bail!("ai.api_key must be set");
        }
        if self.ai.model.trim().is_empty() {
            bail!("ai.model must not be empty");
        }
        validate_base_url("ai.base_url", &self.ai.base_url)?;
        if self.ai.suggestion_count == 0 {
            bail!("ai.suggestion_count must be at least 1");
        }

        if let Some(image_search) = &self.image_search {
            if image_search.api_key.trim().is_empty() {
                bail!("image_search.api_key must be set when image search is configured");
            }
            validate_base_url("image_search.base_url", &image_search.base_url)?;
        }

        Ok(())
    }
}

fn validate_base_url(field: &str, url: &str) -> anyhow::Result<()> {
    if !(url.starts_with("https://") || url.starts_with("http://")) {
        bail!("{} must be an http(s) URL, got {:?}", field, url);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> ProviderConfig {
        ProviderConfig {
            ai: AiProviderConfig {
                api_key: "test-key".to_string(),
                ..AiProviderConfig::default()
            },
            image_search: None,
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_missing_ai_key_rejected() {
        let cfg = ProviderConfig::default();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("ai.api_key"));
    }

    #[test]
    fn test_image_search_requires_key() {
        let mut cfg = valid_config();
        cfg.image_search = Some(ImageSearchConfig::default());
        assert!(cfg.validate().is_err());

        cfg.image_search = Some(ImageSearchConfig {
            api_key: "pexels".to_string(),
            ..ImageSearchConfig::default()
        });
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_zero_suggestion_count_rejected() {
        let mut cfg = valid_config();
        cfg.ai.suggestion_count = 0;
        assert!(cfg.validate().is_err());
    }

    // The only test touching FRESHKEEP_* variables, so nothing races on them
    #[test]
    fn test_from_env_maps_nested_sections() {
        std::env::set_var("FRESHKEEP_AI__API_KEY", "env-ai-key");
        std::env::set_var("FRESHKEEP_AI__MODEL", "gemini-test");
        std::env::set_var("FRESHKEEP_AI__SUGGESTION_COUNT", "3");
        std::env::remove_var("FRESHKEEP_IMAGE_SEARCH__API_KEY");

        let cfg = ProviderConfig::from_env().unwrap();
        assert_eq!(cfg.ai.api_key, "env-ai-key");
        assert_eq!(cfg.ai.model, "gemini-test");
        assert_eq!(cfg.ai.base_url, DEFAULT_AI_BASE_URL);
        assert_eq!(cfg.ai.suggestion_count, 3);
        assert!(cfg.image_search.is_none());

        std::env::set_var("FRESHKEEP_IMAGE_SEARCH__API_KEY", "env-pexels-key");

        let cfg = ProviderConfig::from_env().unwrap();
        let image_search = cfg.image_search.unwrap();
        assert_eq!(image_search.api_key, "env-pexels-key");
        assert_eq!(image_search.base_url, DEFAULT_IMAGE_SEARCH_BASE_URL);

        std::env::remove_var("FRESHKEEP_AI__API_KEY");
        std::env::remove_var("FRESHKEEP_AI__SUGGESTION_COUNT");

        let err = ProviderConfig::from_env().unwrap_err();
        assert!(format!("{:#}", err).contains("ai.api_key"));

        std::env::remove_var("FRESHKEEP_AI__MODEL");
        std::env::remove_var("FRESHKEEP_IMAGE_SEARCH__API_KEY");
    }

    #[test]
    fn test_base_url_must_be_http() {
        let mut cfg = valid_config();
        cfg.ai.base_url = "ftp://example.com".to_string();
        assert!(cfg.validate().is_err());
    }
}
