//! Workflows and their executions.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{resource, Resource};
use crate::client::ClientError;
use crate::model::Page;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Workflow {
    pub id: String,

    #[serde(default, deserialize_with = "crate::model::nullable")]
    pub name: String,

    #[serde(default, deserialize_with = "crate::model::nullable")]
    pub description: String,

    #[serde(rename = "type", default, deserialize_with = "crate::model::nullable")]
    pub kind: String,

    #[serde(default, deserialize_with = "crate::model::nullable")]
    pub status: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,

    #[serde(default, deserialize_with = "crate::model::nullable")]
    pub created_at: String,

    #[serde(default, deserialize_with = "crate::model::nullable")]
    pub updated_at: String,
}

/// Handle returned when an execution starts.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ExecutionStarted {
    pub execution_id: String,
}

resource!(
    /// `/workflows`
    Workflows,
    Workflow,
    "workflows"
);

impl Workflows<'_> {
    /// Start a run with the given input.
    pub async fn execute(&self, id: &str, input: Value) -> Result<ExecutionStarted, ClientError> {
        self.client()
            .post(&format!("{}/execute", Self::item_path(id)), &json!({ "input": input }))
            .await
    }

    pub async fn publish(&self, id: &str, body: &Value) -> Result<Value, ClientError> {
        self.client()
            .post(&format!("{}/publish", Self::item_path(id)), body)
            .await
    }

    /// Node types available to the workflow editor.
    pub async fn node_types(&self) -> Result<Value, ClientError> {
        self.client().get("workflows/node-types").await
    }

    /// Check a workflow definition without saving it.
    pub async fn validate(&self, definition: &Value) -> Result<Value, ClientError> {
        self.client().post("workflows/validate", definition).await
    }

    /// Runs of one workflow.
    pub async fn executions(&self, id: &str) -> Result<Page<Value>, ClientError> {
        self.client()
            .get(&format!("{}/executions", Self::item_path(id)))
            .await
    }

    pub async fn execution(&self, execution_id: &str) -> Result<Value, ClientError> {
        self.client()
            .get(&format!("workflows/executions/{}", execution_id))
            .await
    }
}
