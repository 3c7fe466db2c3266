use serde::{Deserialize, Serialize};
use serde_json::json;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::data::MedicineOrigin;
use crate::error::LookupError;

/// Remote service resolving a medicine name to its attributed origin.
pub trait OriginLookup: Send + Sync + 'static {
    fn lookup(&self, name: &str) -> impl Future<Output = Result<MedicineOrigin, LookupError>> + Send;
}

/// Run a lookup on the tokio runtime; the handle can be awaited from the GTK main loop.
pub fn spawn_lookup<L: OriginLookup>(
    service: Arc<L>,
    term: String,
) -> tokio::task::JoinHandle<Result<MedicineOrigin, LookupError>> {
    tokio::spawn(async move { service.lookup(&term).await })
}

pub struct GeminiClient {
    client: reqwest::Client,
    api_key: Option<String>,
    endpoint: String,
}

impl GeminiClient {
    pub fn new(config: &AppConfig) -> Result<Self, LookupError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            endpoint: format!(
                "{}/models/{}:generateContent",
                config.api_base_url.trim_end_matches('/'),
                config.model
            ),
        })
    }
}

impl OriginLookup for GeminiClient {
    async fn lookup(&self, name: &str) -> Result<MedicineOrigin, LookupError> {
        let api_key = self.api_key.as_deref().ok_or(LookupError::MissingApiKey)?;

        tracing::info!(medicine = name, "requesting origin");

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", api_key)
            .json(&build_request(name))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(LookupError::Status {
                status,
                body: body.chars().take(500).collect(),
            });
        }

        let text = response.text().await?;
        let origin = parse_generate_response(&text)?;
        tracing::info!(medicine = %origin.name, country = %origin.country_code, "origin resolved");
        Ok(origin)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

fn build_request(name: &str) -> GenerateRequest {
    GenerateRequest {
        contents: vec![Content {
            parts: vec![Part {
                text: Some(format!(
                    "Provide detailed historical and geographical origin information for the medicine: {}.",
                    name
                )),
            }],
        }],
        generation_config: json!({
            "responseMimeType": "application/json",
            "responseSchema": response_schema(),
        }),
    }
}

fn response_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "name": { "type": "STRING" },
            "country": { "type": "STRING" },
            "countryCode": {
                "type": "STRING",
                "description": "ISO 3166-1 alpha-3 code (e.g., GBR, USA, DEU)"
            },
            "city": { "type": "STRING" },
            "discoveryYear": { "type": "STRING" },
            "discoverer": { "type": "STRING" },
            "briefHistory": { "type": "STRING" },
            "coordinates": {
                "type": "OBJECT",
                "properties": {
                    "lat": { "type": "NUMBER" },
                    "lng": { "type": "NUMBER" }
                },
                "required": ["lat", "lng"]
            },
            "classification": { "type": "STRING" },
            "funFact": { "type": "STRING" }
        },
        "required": [
            "name", "country", "countryCode", "discoveryYear", "discoverer",
            "briefHistory", "coordinates", "classification", "funFact"
        ]
    })
}

/// Extract the origin record from a raw `generateContent` response body.
pub fn parse_generate_response(body: &str) -> Result<MedicineOrigin, LookupError> {
    let response: GenerateResponse = serde_json::from_str(body)?;

    let text = response
        .candidates
        .into_iter()
        .filter_map(|candidate| candidate.content)
        .flat_map(|content| content.parts)
        .find_map(|part| part.text)
        .filter(|text| !text.trim().is_empty())
        .ok_or(LookupError::EmptyResponse)?;

    parse_origin(&text)
}

/// Parse the model's JSON text into a record, rejecting unusable coordinates.
pub fn parse_origin(text: &str) -> Result<MedicineOrigin, LookupError> {
    let origin: MedicineOrigin = serde_json::from_str(text.trim())?;

    if !origin.coordinates.is_plausible() {
        return Err(LookupError::InvalidCoordinates {
            lat: origin.coordinates.lat,
            lng: origin.coordinates.lng,
        });
    }

    Ok(origin)
}
