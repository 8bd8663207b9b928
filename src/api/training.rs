//! Training jobs.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{resource, Resource};
use crate::client::ClientError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrainingJob {
    pub id: String,

    #[serde(default, deserialize_with = "crate::model::nullable")]
    pub name: String,

    #[serde(default, deserialize_with = "crate::model::nullable")]
    pub description: String,

    #[serde(rename = "type", default, deserialize_with = "crate::model::nullable")]
    pub kind: String,

    #[serde(default, deserialize_with = "crate::model::nullable")]
    pub agent_id: String,

    #[serde(default, deserialize_with = "crate::model::nullable")]
    pub status: String,

    /// Percent complete, 0 to 100
    #[serde(default, deserialize_with = "crate::model::nullable")]
    pub progress: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub training_data: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logs: Option<Value>,

    #[serde(default, deserialize_with = "crate::model::nullable")]
    pub created_at: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
}

resource!(
    /// `/training`
    TrainingJobs,
    TrainingJob,
    "training"
);

impl TrainingJobs<'_> {
    /// Start a job. Returns the fields the backend changed.
    pub async fn start(&self, id: &str) -> Result<Value, ClientError> {
        self.client()
            .post_empty(&format!("{}/start", Self::item_path(id)))
            .await
    }

    pub async fn stop(&self, id: &str) -> Result<Value, ClientError> {
        self.client()
            .post_empty(&format!("{}/stop", Self::item_path(id)))
            .await
    }

    pub async fn logs(&self, id: &str) -> Result<Value, ClientError> {
        self.client()
            .get(&format!("{}/logs", Self::item_path(id)))
            .await
    }

    pub async fn metrics(&self, id: &str) -> Result<Value, ClientError> {
        self.client()
            .get(&format!("{}/metrics", Self::item_path(id)))
            .await
    }
}
