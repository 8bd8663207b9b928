//! Agents: configured assistants bound to a model.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::resource;

/// An agent definition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Agent {
    pub id: String,

    #[serde(default, deserialize_with = "crate::model::nullable")]
    pub name: String,

    #[serde(default, deserialize_with = "crate::model::nullable")]
    pub description: String,

    /// `chat`, `assistant`, `specialist` or `creative`
    #[serde(rename = "type", default, deserialize_with = "crate::model::nullable")]
    pub kind: String,

    /// `active` or `inactive`
    #[serde(default, deserialize_with = "crate::model::nullable")]
    pub status: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,

    #[serde(default, deserialize_with = "crate::model::nullable")]
    pub knowledge_base_ids: Vec<String>,

    #[serde(default, deserialize_with = "crate::model::nullable")]
    pub plugin_ids: Vec<String>,

    #[serde(default, deserialize_with = "crate::model::nullable")]
    pub created_at: String,

    #[serde(default, deserialize_with = "crate::model::nullable")]
    pub updated_at: String,
}

impl Agent {
    pub fn is_active(&self) -> bool {
        self.status == "active"
    }

    /// Records the list screen can show: named, with a known status.
    pub fn is_listable(&self) -> bool {
        !self.id.is_empty() && !self.name.is_empty() && matches!(self.status.as_str(), "active" | "inactive")
    }
}

/// Payload for creating or updating an agent.
#[derive(Debug, Clone, Serialize, Default, PartialEq)]
pub struct AgentParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub knowledge_base_ids: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub plugin_ids: Option<Vec<String>>,
}

resource!(
    /// `/agents`
    Agents,
    Agent,
    "agents"
);

/// Drop records the list screen cannot show.
pub fn listable(agents: Vec<Agent>) -> Vec<Agent> {
    agents.into_iter().filter(Agent::is_listable).collect()
}
