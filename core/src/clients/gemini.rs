//! Generative AI client
//!
//! Talks to the `generateContent` endpoint in JSON response mode. Used both
//! for meal suggestions and for recognizing food in photos.

use crate::config::{AiProviderConfig, USER_AGENT};
use crate::error::{AppError, Result};
use crate::services::recipes::{Meal, MealRequest, MealSuggester};
use crate::services::scan::{FoodRecognizer, ImagePayload, ScannedItem, SCAN_PROMPT};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize, Debug)]
struct Part {
    text: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    config: AiProviderConfig,
}

impl GeminiClient {
    pub fn new(config: AiProviderConfig) -> Result<Self> {
        let http = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { http, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    /// Send the parts as one user turn and return the reply text
    async fn generate(&self, parts: Vec<Value>) -> Result<String> {
        let body = json!({
            "contents": [{ "role": "user", "parts": parts }],
            "generationConfig": { "responseMimeType": "application/json" },
        });

        tracing::debug!("Calling generateContent with model {}", self.config.model);

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            tracing::warn!("AI provider returned status {}", status);
            return Err(AppError::Ai(format!(
                "AI provider returned {}: {}",
                status,
                detail.trim()
            )));
        }

        let payload: GenerateContentResponse = response.json().await?;
        reply_text(payload)
    }
}

/// Concatenated text parts of the first candidate
fn reply_text(response: GenerateContentResponse) -> Result<String> {
    if let Some(reason) = response
        .prompt_feedback
        .and_then(|feedback| feedback.block_reason)
    {
        return Err(AppError::Ai(format!("Request blocked: {}", reason)));
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| AppError::Ai("No candidates in response".to_string()))?;

    let text: String = candidate
        .content
        .map(|content| content.parts)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|part| part.text)
        .collect();

    if text.trim().is_empty() {
        return Err(AppError::Ai(format!(
            "Empty response (finish reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        )));
    }

    Ok(text)
}

/// Decode a JSON array from reply text, tolerating markdown fences
fn parse_json_array<T: DeserializeOwned>(text: &str) -> Result<Vec<T>> {
    let trimmed = text.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .map(|rest| rest.trim_end().trim_end_matches("```"))
        .unwrap_or(trimmed)
        .trim();

    serde_json::from_str(unfenced)
        .map_err(|e| AppError::Ai(format!("Could not parse model reply: {}", e)))
}

#[async_trait]
impl MealSuggester for GeminiClient {
    async fn suggest_meals(&self, request: &MealRequest) -> Result<Vec<Meal>> {
        let text = self.generate(vec![json!({ "text": request.prompt() })]).await?;
        let meals: Vec<Meal> = parse_json_array(&text)?;

        tracing::info!("Received {} meal suggestions", meals.len());
        Ok(meals)
    }
}

#[async_trait]
impl FoodRecognizer for GeminiClient {
    async fn identify(&self, image: &ImagePayload) -> Result<Vec<ScannedItem>> {
        let parts = vec![
            json!({ "text": SCAN_PROMPT }),
            json!({
                "inlineData": {
                    "mimeType": image.mime_type,
                    "data": image.base64_data,
                }
            }),
        ];

        let text = self.generate(parts).await?;
        parse_json_array(&text)
    }
}
