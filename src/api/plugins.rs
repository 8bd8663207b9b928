//! Plugins: install, toggle, test and bulk operations.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{resource, Resource};
use crate::client::ClientError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Plugin {
    pub id: String,

    #[serde(default, deserialize_with = "crate::model::nullable")]
    pub name: String,

    #[serde(default, deserialize_with = "crate::model::nullable")]
    pub description: String,

    #[serde(default, deserialize_with = "crate::model::nullable")]
    pub version: String,

    #[serde(default, deserialize_with = "crate::model::nullable")]
    pub author: String,

    #[serde(default, deserialize_with = "crate::model::nullable")]
    pub status: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,

    #[serde(default, deserialize_with = "crate::model::nullable")]
    pub created_at: String,

    #[serde(default, deserialize_with = "crate::model::nullable")]
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize)]
struct PluginIds<'a> {
    plugin_ids: &'a [String],
}

/// New status reported by a toggle.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ToggleResult {
    pub status: String,
}

resource!(
    /// `/plugins`
    Plugins,
    Plugin,
    "plugins"
);

impl Plugins<'_> {
    pub async fn install(&self, id: &str) -> Result<Value, ClientError> {
        self.client()
            .post_empty(&format!("{}/install", Self::item_path(id)))
            .await
    }

    pub async fn uninstall(&self, id: &str) -> Result<Value, ClientError> {
        self.client()
            .post_empty(&format!("{}/uninstall", Self::item_path(id)))
            .await
    }

    /// Flip a plugin between enabled and disabled.
    pub async fn toggle(&self, id: &str) -> Result<ToggleResult, ClientError> {
        self.client()
            .put_empty(&format!("{}/toggle", Self::item_path(id)))
            .await
    }

    pub async fn test(&self, id: &str) -> Result<Value, ClientError> {
        self.client()
            .post_empty(&format!("{}/test", Self::item_path(id)))
            .await
    }

    /// Upload a plugin package.
    pub async fn upload(&self, file_name: &str, contents: Vec<u8>) -> Result<Plugin, ClientError> {
        self.client()
            .post_file("plugins/upload", file_name, contents)
            .await
    }

    pub async fn batch_delete(&self, ids: &[String]) -> Result<Value, ClientError> {
        self.batch("batch-delete", ids).await
    }

    pub async fn batch_enable(&self, ids: &[String]) -> Result<Value, ClientError> {
        self.batch("batch-enable", ids).await
    }

    pub async fn batch_disable(&self, ids: &[String]) -> Result<Value, ClientError> {
        self.batch("batch-disable", ids).await
    }

    async fn batch(&self, action: &str, ids: &[String]) -> Result<Value, ClientError> {
        self.client()
            .post(&Self::item_path(action), &PluginIds { plugin_ids: ids })
            .await
    }
}
