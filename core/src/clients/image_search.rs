//! Stock photo lookup for meal pictures

use crate::config::{ImageSearchConfig, USER_AGENT};
use crate::error::{AppError, Result};
use crate::services::recipes::ImageLookup;
use async_trait::async_trait;
use serde::Deserialize;

#[derive(Deserialize, Debug)]
struct SearchResponse {
    #[serde(default)]
    photos: Vec<Photo>,
}

#[derive(Deserialize, Debug)]
struct Photo {
    src: PhotoSources,
}

#[derive(Deserialize, Debug)]
struct PhotoSources {
    medium: Option<String>,
    original: Option<String>,
}

#[derive(Clone)]
pub struct PexelsClient {
    http: reqwest::Client,
    config: ImageSearchConfig,
}

impl PexelsClient {
    pub fn new(config: ImageSearchConfig) -> Result<Self> {
        let http = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { http, config })
    }

    fn search_url(&self) -> String {
        format!("{}/search", self.config.base_url.trim_end_matches('/'))
    }
}

/// Medium-size URL of the first photo, falling back to the original
fn first_photo_url(response: SearchResponse) -> Option<String> {
    response
        .photos
        .into_iter()
        .next()
        .and_then(|photo| photo.src.medium.or(photo.src.original))
}

#[async_trait]
impl ImageLookup for PexelsClient {
    async fn find_image(&self, query: &str) -> Result<Option<String>> {
        let response = self
            .http
            .get(self.search_url())
            .header("Authorization", &self.config.api_key)
            .query(&[("query", query), ("per_page", "1")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::ImageSearch(format!(
                "Image search returned {} for {:?}",
                status, query
            )));
        }

        let payload: SearchResponse = response.json().await?;
        let url = first_photo_url(payload);
        if url.is_none() {
            tracing::debug!("No image found for {:?}", query);
        }

        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> SearchResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_first_photo_medium_url() {
        let url = first_photo_url(parse(
            r#"{"total_results": 2, "photos": [
                {"id": 1, "src": {"original": "https://img.test/1.jpg", "medium": "https://img.test/1-m.jpg"}},
                {"id": 2, "src": {"medium": "https://img.test/2-m.jpg"}}
            ]}"#,
        ));

        assert_eq!(url.as_deref(), Some("https://img.test/1-m.jpg"));
    }

    #[test]
    fn test_falls_back_to_original() {
        let url = first_photo_url(parse(
            r#"{"photos": [{"src": {"original": "https://img.test/1.jpg"}}]}"#,
        ));

        assert_eq!(url.as_deref(), Some("https://img.test/1.jpg"));
    }

    #[test]
    fn test_no_photos() {
        assert_eq!(first_photo_url(parse(r#"{"photos": []}"#)), None);
        assert_eq!(first_photo_url(parse(r#"{}"#)), None);
    }

    #[test]
    fn test_search_url_trims_slash() {
        let client = PexelsClient::new(ImageSearchConfig {
            api_key: "k".to_string(),
            base_url: "https://api.pexels.test/v1/".to_string(),
        })
        .unwrap();

        assert_eq!(client.search_url(), "https://api.pexels.test/v1/search");
    }
}
