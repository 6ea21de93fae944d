use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures_util::StreamExt;
use log::{debug, info, warn};
use reqwest::header::{ACCEPT, AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE};
use reqwest::{Client, Response};

use crate::api::models::{Prediction, PredictionInput, PredictionRequest, RAW_PROMPT_TEMPLATE};
use crate::client_trait::{GenerationClient, GenerationStream};
use crate::error::{GenerationError, Result};
use crate::params::GenerationParams;

pub const DEFAULT_MODEL: &str = "snowflake/snowflake-arctic-instruct";
const DEFAULT_API_BASE: &str = "https://api.replicate.com";

/// Endpoint configuration. The bearer token is supplied out-of-band by the
/// caller (environment or secret store); the client never reads it itself.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_base: String,
    pub model: String,
    pub api_token: String,
}

impl ClientConfig {
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_token: api_token.into(),
        }
    }
}

/// Production [`GenerationClient`] speaking the prediction API.
#[derive(Debug, Clone)]
pub struct ReplicateClient {
    http: Client,
    config: ClientConfig,
}

impl ReplicateClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = Client::builder().build()?;
        Ok(Self { http, config })
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.config.api_token)
    }

    async fn create_prediction(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<Prediction> {
        let url = format!(
            "{}/v1/models/{}/predictions",
            self.config.api_base, self.config.model
        );
        let request = PredictionRequest {
            input: PredictionInput {
                prompt: prompt.to_string(),
                prompt_template: RAW_PROMPT_TEMPLATE.to_string(),
                temperature: params.temperature,
                top_p: params.top_p,
            },
            stream: true,
        };

        debug!("creating prediction for model {}", self.config.model);
        let response = self
            .http
            .post(&url)
            .header(AUTHORIZATION, self.bearer())
            .header(CONTENT_TYPE, "application/json")
            .json(&request)
            .send()
            .await?;

        let response = check_status(response).await?;
        let prediction = response.json::<Prediction>().await?;
        info!("prediction {} created", prediction.id);
        Ok(prediction)
    }

    async fn open_stream(&self, url: &str) -> Result<Response> {
        let response = self
            .http
            .get(url)
            .header(AUTHORIZATION, self.bearer())
            .header(ACCEPT, "text/event-stream")
            .header(CACHE_CONTROL, "no-store")
            .send()
            .await?;
        check_status(response).await
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(GenerationError::Api {
        status: status.as_u16(),
        message,
    })
}

enum SseItem {
    Chunk(String),
    Done,
    Skip,
}

/// Adapt the SSE response into a [`GenerationStream`].
///
/// `output` events carry reply fragments, `done` terminates the sequence,
/// `error` events and decode failures surface as `Truncated` items. Dropping
/// the stream drops the HTTP response and closes the connection.
fn chunk_stream(response: Response) -> GenerationStream {
    let stream = response
        .bytes_stream()
        .eventsource()
        .map(|event| match event {
            Err(e) => Err(GenerationError::Truncated(e.to_string())),
            Ok(event) => match event.event.as_str() {
                "output" => Ok(SseItem::Chunk(event.data)),
                "done" => Ok(SseItem::Done),
                "error" => Err(GenerationError::Truncated(event.data)),
                other => {
                    warn!("ignoring unknown SSE event '{other}'");
                    Ok(SseItem::Skip)
                }
            },
        })
        .take_while(|item| {
            let done = matches!(item, Ok(SseItem::Done));
            futures_util::future::ready(!done)
        })
        .filter_map(|item| async move {
            match item {
                Ok(SseItem::Chunk(data)) => Some(Ok(data)),
                Ok(SseItem::Skip | SseItem::Done) => None,
                Err(e) => Some(Err(e)),
            }
        });

    Box::pin(stream)
}

#[async_trait]
impl GenerationClient for ReplicateClient {
    async fn stream_generation(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<GenerationStream> {
        params.validate()?;
        let prediction = self.create_prediction(prompt, params).await?;
        let response = self.open_stream(&prediction.urls.stream).await?;
        Ok(chunk_stream(response))
    }
}
