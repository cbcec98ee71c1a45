use crate::capability::MemoryGateway;
use mnema_core::config::MemoryConfig;
use mnema_core::error::MemoryError;
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

const API_KEY_ENV: &str = "MNEMA_MEMORY_API_KEY";

/// HTTP client for the semantic memory service.
///
/// Records live under `/v1/memories/{memory_id}/namespaces/{ns}`,
/// one namespace per actor. The record key doubles as the idempotency
/// token, so PUTs are safe to repeat.
#[derive(Debug)]
pub struct HttpMemoryClient {
    endpoint: String,
    memory_id: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct RecordsResponse {
    records: Vec<RecordPayload>,
}

#[derive(Debug, Deserialize)]
struct RecordPayload {
    text: String,
}

impl HttpMemoryClient {
    pub fn new(config: &MemoryConfig) -> Result<Self, MemoryError> {
        if !config.is_configured() {
            return Err(MemoryError::NotConfigured);
        }
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(MemoryError::transport)?;
        Ok(Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            memory_id: config.memory_id.clone(),
            client,
        })
    }

    fn api_key() -> Result<String, MemoryError> {
        std::env::var(API_KEY_ENV).map_err(|_| MemoryError::MissingApiKey)
    }

    fn namespace(actor: &str) -> String {
        format!("items-{actor}")
    }

    fn namespace_url(&self, actor: &str) -> String {
        format!(
            "{}/v1/memories/{}/namespaces/{}",
            self.endpoint,
            self.memory_id,
            Self::namespace(actor)
        )
    }

    fn check_status(status: reqwest::StatusCode) -> Result<(), MemoryError> {
        if status.is_success() {
            Ok(())
        } else {
            Err(MemoryError::Status {
                status: status.as_u16(),
            })
        }
    }
}

impl MemoryGateway for HttpMemoryClient {
    fn upsert(&self, actor: &str, key: &str, text: &str) -> Result<(), MemoryError> {
        let url = format!("{}/records/{key}", self.namespace_url(actor));
        let response = self
            .client
            .put(&url)
            .bearer_auth(Self::api_key()?)
            .json(&serde_json::json!({ "text": text }))
            .send()
            .map_err(MemoryError::transport)?;
        Self::check_status(response.status())?;
        debug!(actor, key, "memory record upserted");
        Ok(())
    }

    fn delete(&self, actor: &str, key: &str) -> Result<(), MemoryError> {
        let url = format!("{}/records/{key}", self.namespace_url(actor));
        let response = self
            .client
            .delete(&url)
            .bearer_auth(Self::api_key()?)
            .send()
            .map_err(MemoryError::transport)?;
        // Deleting an absent record is a no-op per the gateway contract.
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(());
        }
        Self::check_status(response.status())
    }

    fn list(&self, actor: &str, limit: usize) -> Result<Vec<String>, MemoryError> {
        let url = format!("{}/records?limit={limit}", self.namespace_url(actor));
        let response = self
            .client
            .get(&url)
            .bearer_auth(Self::api_key()?)
            .send()
            .map_err(MemoryError::transport)?;
        Self::check_status(response.status())?;
        let body: RecordsResponse = response.json().map_err(MemoryError::transport)?;
        Ok(body.records.into_iter().map(|r| r.text).collect())
    }

    fn search(&self, actor: &str, query: &str, limit: usize) -> Result<Vec<String>, MemoryError> {
        let url = format!("{}/search", self.namespace_url(actor));
        let response = self
            .client
            .post(&url)
            .bearer_auth(Self::api_key()?)
            .json(&serde_json::json!({ "query": query, "limit": limit }))
            .send()
            .map_err(MemoryError::transport)?;
        Self::check_status(response.status())?;
        let body: RecordsResponse = response.json().map_err(MemoryError::transport)?;
        Ok(body.records.into_iter().map(|r| r.text).collect())
    }
}
