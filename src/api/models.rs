//! Models and the Ollama integration.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{resource, Resource};
use crate::client::ClientError;

/// Ollama server used when the caller does not name one.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// A model registered with the platform.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Model {
    pub id: String,

    #[serde(default, deserialize_with = "crate::model::nullable")]
    pub name: String,

    #[serde(default, deserialize_with = "crate::model::nullable")]
    pub description: String,

    #[serde(rename = "type", default, deserialize_with = "crate::model::nullable")]
    pub kind: String,

    /// Either a status word or a boolean, depending on who created the record
    #[serde(default)]
    pub status: Value,

    #[serde(default, deserialize_with = "crate::model::nullable")]
    pub provider: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,

    #[serde(default, deserialize_with = "crate::model::nullable")]
    pub created_at: String,

    #[serde(default, deserialize_with = "crate::model::nullable")]
    pub updated_at: String,
}

impl Model {
    /// Usable for new conversations: `"active"`, `"available"` or `true`.
    pub fn is_active(&self) -> bool {
        match &self.status {
            Value::String(s) => s == "active" || s == "available",
            Value::Bool(b) => *b,
            _ => false,
        }
    }
}

/// Keep the models that can be picked for a conversation.
pub fn active(models: Vec<Model>) -> Vec<Model> {
    models
        .into_iter()
        .filter(|m| !m.id.is_empty() && !m.name.is_empty() && m.is_active())
        .collect()
}

/// Outcome of a model test call. A failed test still arrives as a
/// successful envelope, with `success: false` inside.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ModelTestResult {
    pub success: bool,

    #[serde(default)]
    pub response: Option<String>,

    #[serde(default)]
    pub model_name: Option<String>,

    #[serde(default)]
    pub provider: Option<String>,

    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct OllamaHealth {
    pub healthy: bool,

    #[serde(default, deserialize_with = "crate::model::nullable")]
    pub server_url: String,
}

#[derive(Debug, Clone, Serialize)]
struct ServerUrl<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    server_url: Option<&'a str>,
}

resource!(
    /// `/models`
    Models,
    Model,
    "models"
);

impl Models<'_> {
    /// Send a test message through a registered model.
    pub async fn test(&self, id: &str, message: &str) -> Result<ModelTestResult, ClientError> {
        self.client()
            .post(&format!("{}/test", Self::item_path(id)), &json!({ "message": message }))
            .await
    }

    /// Whether the Ollama server answers. `None` lets the backend pick the
    /// user's configured server.
    pub async fn ollama_health(&self, server_url: Option<&str>) -> Result<OllamaHealth, ClientError> {
        self.client()
            .get_with_query("models/ollama/health", &ServerUrl { server_url })
            .await
    }

    /// Names of the models the Ollama server has pulled.
    pub async fn ollama_models(&self, server_url: Option<&str>) -> Result<Vec<String>, ClientError> {
        self.client()
            .get_with_query("models/ollama/models", &ServerUrl { server_url })
            .await
    }

    pub async fn pull_ollama_model(
        &self,
        model_name: &str,
        server_url: Option<&str>,
    ) -> Result<Value, ClientError> {
        self.client()
            .post(
                "models/ollama/pull",
                &json!({
                    "model_name": model_name,
                    "server_url": server_url.unwrap_or(DEFAULT_OLLAMA_URL),
                }),
            )
            .await
    }

    pub async fn test_ollama_model(
        &self,
        model_name: &str,
        prompt: &str,
        server_url: Option<&str>,
    ) -> Result<ModelTestResult, ClientError> {
        self.client()
            .post(
                "models/ollama/test",
                &json!({
                    "model_name": model_name,
                    "prompt": prompt,
                    "server_url": server_url.unwrap_or(DEFAULT_OLLAMA_URL),
                }),
            )
            .await
    }
}
