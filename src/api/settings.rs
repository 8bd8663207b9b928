//! User settings.

use serde_json::Value;

use crate::client::{ApiClient, ClientError};

#[derive(Debug, Clone, Copy)]
pub struct Settings<'a> {
    client: &'a ApiClient,
}

impl<'a> Settings<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn get(&self) -> Result<Value, ClientError> {
        self.client.get("settings").await
    }

    /// Update the given settings keys.
    pub async fn update(&self, settings: &Value) -> Result<Value, ClientError> {
        self.client.put("settings", settings).await
    }
}
