//! HTTP layer: prediction creation and SSE consumption.

mod client;
mod models;

pub use client::{ClientConfig, ReplicateClient, DEFAULT_MODEL};
pub use models::{Prediction, PredictionInput, PredictionRequest, PredictionUrls};
