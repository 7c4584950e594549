// ABOUTME: HTTP-backed Model Wrapper calling an external classifier sidecar
use crate::wrapper::{ModelWrapper, RawClassification};
use reqwest::{Client, StatusCode};
use sentinel_types::{ModelError, ModelName};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct ClassifyResponse {
    label: String,
    score: f64,
    #[serde(default)]
    all_scores: std::collections::HashMap<String, f64>,
}

/// Calls a single classifier served as its own HTTP endpoint (the
/// transformer runtime lives outside this process, behind a narrow
/// `POST {text} -> {label, score, all_scores}` contract).
pub struct HttpModelWrapper {
    name: ModelName,
    client: Client,
    endpoint: String,
}

impl HttpModelWrapper {
    pub fn new(name: ModelName, base_url: &str, connect_timeout: Duration) -> Self {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .expect("reqwest client builder should never fail with valid settings");
        Self {
            name,
            client,
            endpoint: format!("{}/classify/{}", base_url.trim_end_matches('/'), name.as_str()),
        }
    }
}

#[async_trait::async_trait]
impl ModelWrapper for HttpModelWrapper {
    fn name(&self) -> ModelName {
        self.name
    }

    async fn infer(&self, text: &str) -> Result<RawClassification, ModelError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await
            .map_err(|e| {
                warn!(model = %self.name, error = %e, "classifier request failed");
                if e.is_timeout() {
                    ModelError::Timeout
                } else {
                    ModelError::Remote
                }
            })?;

        let status = response.status();
        if status == StatusCode::SERVICE_UNAVAILABLE || status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ModelError::Resource);
        }
        if status.is_server_error() {
            return Err(ModelError::Fatal);
        }
        if !status.is_success() {
            return Err(ModelError::Remote);
        }

        let parsed: ClassifyResponse = response.json().await.map_err(|e| {
            warn!(model = %self.name, error = %e, "classifier response did not parse");
            ModelError::Fatal
        })?;

        debug!(model = %self.name, label = %parsed.label, score = parsed.score, "classifier responded");
        Ok(RawClassification {
            label: parsed.label,
            score: parsed.score,
            all_scores: parsed.all_scores,
        })
    }

    async fn warmup(&self) {
        let _ = self
            .client
            .post(&self.endpoint)
            .json(&serde_json::json!({ "text": "warmup" }))
            .send()
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_is_derived_from_base_url_and_model_name() {
        let wrapper = HttpModelWrapper::new(ModelName::Bart, "http://localhost:9000/", Duration::from_secs(1));
        assert_eq!(wrapper.endpoint, "http://localhost:9000/classify/bart");
    }
}
