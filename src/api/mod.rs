//! Typed wrappers around the backend's REST resources.
//!
//! Every collection follows the same CRUD shape, captured by [`Resource`].
//! Each submodule adds the record type and the resource's extra endpoints.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::client::{ApiClient, ClientError};
use crate::model::Page;

pub mod agents;
pub mod conversations;
pub mod dashboard;
pub mod knowledge;
pub mod models;
pub mod plugins;
pub mod settings;
pub mod training;
pub mod workflows;

pub use agents::{Agent, Agents};
pub use conversations::Conversations;
pub use dashboard::Dashboard;
pub use knowledge::{KnowledgeBase, KnowledgeBases};
pub use models::{Model, Models};
pub use plugins::{Plugin, Plugins};
pub use settings::Settings;
pub use training::{TrainingJob, TrainingJobs};
pub use workflows::{Workflow, Workflows};

/// A REST collection with list/get/create/update/delete.
///
/// Implementors name the collection path and the record type; the CRUD
/// methods are provided.
///
/// # Example
/// ```rust,ignore
/// struct Things<'a>(&'a ApiClient);
///
/// impl Resource for Things<'_> {
///     type Record = Thing;
///     const PATH: &'static str = "things";
///
///     fn client(&self) -> &ApiClient {
///         self.0
///     }
/// }
///
/// let page = Things(&client).list().await?;
/// ```
#[async_trait]
pub trait Resource: Sync {
    /// Record type returned by the collection.
    type Record: DeserializeOwned + Send;

    /// Collection path relative to the API root.
    const PATH: &'static str;

    /// The client requests go through.
    fn client(&self) -> &ApiClient;

    /// Path of one record.
    fn item_path(id: &str) -> String {
        format!("{}/{}", Self::PATH, id)
    }

    async fn list(&self) -> Result<Page<Self::Record>, ClientError> {
        self.client().get(Self::PATH).await
    }

    async fn get(&self, id: &str) -> Result<Self::Record, ClientError> {
        self.client().get(&Self::item_path(id)).await
    }

    async fn create<B>(&self, body: &B) -> Result<Self::Record, ClientError>
    where
        B: Serialize + Sync + ?Sized,
    {
        self.client().post(Self::PATH, body).await
    }

    /// Update a record. Most endpoints answer without data, hence the `Option`.
    async fn update<B>(&self, id: &str, body: &B) -> Result<Option<Self::Record>, ClientError>
    where
        B: Serialize + Sync + ?Sized,
    {
        self.client().put(&Self::item_path(id), body).await
    }

    async fn delete(&self, id: &str) -> Result<(), ClientError> {
        self.client().delete(&Self::item_path(id)).await
    }
}

/// Define a borrowed resource handle and its [`Resource`] impl.
macro_rules! resource {
    ($(#[$meta:meta])* $name:ident, $record:ty, $path:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy)]
        pub struct $name<'a> {
            client: &'a $crate::client::ApiClient,
        }

        impl<'a> $name<'a> {
            pub fn new(client: &'a $crate::client::ApiClient) -> Self {
                Self { client }
            }
        }

        impl $crate::api::Resource for $name<'_> {
            type Record = $record;
            const PATH: &'static str = $path;

            fn client(&self) -> &$crate::client::ApiClient {
                self.client
            }
        }
    };
}

pub(crate) use resource;

impl ApiClient {
    pub fn agents(&self) -> Agents<'_> {
        Agents::new(self)
    }

    pub fn conversations(&self) -> Conversations<'_> {
        Conversations::new(self)
    }

    pub fn knowledge(&self) -> KnowledgeBases<'_> {
        KnowledgeBases::new(self)
    }

    pub fn workflows(&self) -> Workflows<'_> {
        Workflows::new(self)
    }

    pub fn plugins(&self) -> Plugins<'_> {
        Plugins::new(self)
    }

    pub fn models(&self) -> Models<'_> {
        Models::new(self)
    }

    pub fn training(&self) -> TrainingJobs<'_> {
        TrainingJobs::new(self)
    }

    pub fn dashboard(&self) -> Dashboard<'_> {
        Dashboard::new(self)
    }

    pub fn settings(&self) -> Settings<'_> {
        Settings::new(self)
    }
}
