//! HTTP clients for the external collaborators

pub mod gemini;
pub mod image_search;

pub use gemini::GeminiClient;
pub use image_search::PexelsClient;
