//! Wire types for the prediction API.

use serde::{Deserialize, Serialize};

/// Passthrough template: the assembled prompt already carries its own framing.
pub const RAW_PROMPT_TEMPLATE: &str = "{prompt}";

#[derive(Serialize, Debug, Clone)]
pub struct PredictionInput {
    pub prompt: String,
    pub prompt_template: String,
    pub temperature: f32,
    pub top_p: f32,
}

#[derive(Serialize, Debug, Clone)]
pub struct PredictionRequest {
    pub input: PredictionInput,
    pub stream: bool,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Prediction {
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
    pub urls: PredictionUrls,
}

#[derive(Deserialize, Debug, Clone)]
pub struct PredictionUrls {
    pub stream: String,
    #[serde(default)]
    pub get: Option<String>,
    #[serde(default)]
    pub cancel: Option<String>,
}
