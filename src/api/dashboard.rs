//! Dashboard figures. The shapes are owned by the backend and passed
//! through as JSON.

use serde_json::Value;

use crate::client::{ApiClient, ClientError};

#[derive(Debug, Clone, Copy)]
pub struct Dashboard<'a> {
    client: &'a ApiClient,
}

impl<'a> Dashboard<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn stats(&self) -> Result<Value, ClientError> {
        self.client.get("dashboard/stats").await
    }

    pub async fn analytics(&self) -> Result<Value, ClientError> {
        self.client.get("dashboard/analytics").await
    }

    /// Recent activity feed.
    pub async fn recent(&self) -> Result<Vec<Value>, ClientError> {
        self.client.get("dashboard/recent").await
    }
}
