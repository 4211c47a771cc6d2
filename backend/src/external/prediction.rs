//! Fingerling prediction client
//!
//! Thin proxy for the hosted prediction model. The request is validated and
//! normalised here; the upstream JSON is relayed unchanged.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::PredictionConfig;
use crate::error::{AppError, AppResult};

/// Client for the prediction service
#[derive(Clone)]
pub struct PredictionClient {
    endpoint: String,
    api_key: Option<String>,
    http_client: Client,
}

/// Prediction request as received from the dashboard
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictRequest {
    #[serde(default)]
    pub species: String,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub province: Option<String>,
    pub city: Option<String>,
}

/// Body forwarded upstream
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForwardedPrediction {
    pub species: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub province: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

impl PredictRequest {
    /// Validate the species and build the upstream body
    pub fn into_forwarded(self) -> AppResult<ForwardedPrediction> {
        let species = shared::normalize_prediction_species(&self.species)?;
        let keep = |v: Option<String>| v.filter(|s| !s.trim().is_empty());

        Ok(ForwardedPrediction {
            species,
            date_from: keep(self.date_from),
            date_to: keep(self.date_to),
            province: keep(self.province),
            city: keep(self.city),
        })
    }
}

impl PredictionClient {
    pub fn new(config: &PredictionConfig) -> AppResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::ExternalService(format!("HTTP client setup failed: {}", e)))?;

        Ok(Self {
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
            http_client,
        })
    }

    /// Forward a prediction request and return the upstream JSON
    pub async fn predict(&self, request: PredictRequest) -> AppResult<serde_json::Value> {
        let body = request.into_forwarded()?;

        let mut builder = self.http_client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.header("x-api-key", key);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::warn!(error = %e, "Prediction request failed");
            AppError::ExternalService(format!("Prediction service unreachable: {}", e))
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AppError::ExternalService(format!("Failed to read response: {}", e)))?;
        let payload = serde_json::from_str::<serde_json::Value>(&text)
            .unwrap_or(serde_json::Value::String(text));

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Prediction service returned an error");
            return Err(AppError::Upstream {
                status: status.as_u16(),
                body: payload,
            });
        }

        Ok(payload)
    }
}
