//! Knowledge bases and their documents.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{resource, Resource};
use crate::client::ClientError;

/// A knowledge base.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KnowledgeBase {
    pub id: String,

    #[serde(default, deserialize_with = "crate::model::nullable")]
    pub name: String,

    #[serde(default, deserialize_with = "crate::model::nullable")]
    pub description: String,

    #[serde(rename = "type", default, deserialize_with = "crate::model::nullable")]
    pub kind: String,

    /// Enabled flag
    #[serde(default, deserialize_with = "crate::model::nullable")]
    pub status: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,

    #[serde(default, deserialize_with = "crate::model::nullable")]
    pub document_count: u64,

    #[serde(default, deserialize_with = "crate::model::nullable")]
    pub created_at: String,

    #[serde(default, deserialize_with = "crate::model::nullable")]
    pub updated_at: String,
}

resource!(
    /// `/knowledge`
    KnowledgeBases,
    KnowledgeBase,
    "knowledge"
);

impl KnowledgeBases<'_> {
    /// Documents stored in a knowledge base.
    pub async fn documents(&self, kb_id: &str) -> Result<Value, ClientError> {
        self.client()
            .get(&format!("{}/documents", Self::item_path(kb_id)))
            .await
    }

    /// Upload a document into a knowledge base.
    pub async fn upload_document(
        &self,
        kb_id: &str,
        file_name: &str,
        contents: Vec<u8>,
    ) -> Result<Value, ClientError> {
        self.client()
            .post_file(&format!("{}/documents", Self::item_path(kb_id)), file_name, contents)
            .await
    }

    pub async fn delete_document(&self, kb_id: &str, doc_id: &str) -> Result<(), ClientError> {
        self.client()
            .delete(&format!("{}/documents/{}", Self::item_path(kb_id), doc_id))
            .await
    }

    /// Ask the backend to rebuild the search index of a knowledge base.
    pub async fn rebuild_index(&self, kb_id: &str) -> Result<Value, ClientError> {
        self.client()
            .post_empty(&format!("{}/rebuild-index", Self::item_path(kb_id)))
            .await
    }

    /// Export a knowledge base in the backend's archive format.
    pub async fn export(&self, kb_id: &str) -> Result<Value, ClientError> {
        self.client()
            .get(&format!("{}/export", Self::item_path(kb_id)))
            .await
    }

    pub async fn batch_delete(&self, ids: &[String]) -> Result<Value, ClientError> {
        self.client()
            .post("knowledge/batch-delete", &json!({ "knowledge_base_ids": ids }))
            .await
    }
}
