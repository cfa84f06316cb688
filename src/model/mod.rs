//! Request and response shapes for every endpoint.
//!
//! Document ids and free-form fields stay as [`serde_json::Value`], which keeps
//! integers and floats apart: `47` decodes to an integer that `as_i64()` returns
//! as-is and `as_f64()` widens to `47.0`.

pub mod data;
pub mod embedding;
pub mod rerank;
pub mod search;

use serde::{Deserialize, Deserializer, Serialize};

pub use data::*;
pub use embedding::*;
pub use rerank::*;
pub use search::*;

/// Free-form document fields, in the order the server sent them.
pub type Fields = serde_json::Map<String, serde_json::Value>;

/// Reads an explicit `null` as the type's default. The service writes empty
/// maps and lists as `null`.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Common envelope returned by every endpoint. `result` is absent for calls
/// that return nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(default, deserialize_with = "null_as_default")]
    pub api: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub code: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
}

impl<T> Default for ApiResponse<T> {
    fn default() -> Self {
        Self {
            api: String::new(),
            message: String::new(),
            code: String::new(),
            request_id: String::new(),
            result: None,
        }
    }
}

/// Identifies a collection. Serialized alongside the payload of every
/// collection-scoped request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CollectionLocator {
    pub collection_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
}

impl CollectionLocator {
    pub fn new(collection_name: impl Into<String>) -> Self {
        Self {
            collection_name: collection_name.into(),
            ..Default::default()
        }
    }

    pub fn with_project(mut self, project_name: impl Into<String>) -> Self {
        self.project_name = Some(project_name.into());
        self
    }

    pub fn with_resource_id(mut self, resource_id: impl Into<String>) -> Self {
        self.resource_id = Some(resource_id.into());
        self
    }
}

/// A collection locator narrowed to one index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexLocator {
    #[serde(flatten)]
    pub collection: CollectionLocator,
    pub index_name: String,
}

impl IndexLocator {
    pub fn new(collection_name: impl Into<String>, index_name: impl Into<String>) -> Self {
        Self {
            collection: CollectionLocator::new(collection_name),
            index_name: index_name.into(),
        }
    }

    pub fn with_project(mut self, project_name: impl Into<String>) -> Self {
        self.collection.project_name = Some(project_name.into());
        self
    }

    pub fn with_resource_id(mut self, resource_id: impl Into<String>) -> Self {
        self.collection.resource_id = Some(resource_id.into());
        self
    }
}

/// Locator and payload written as a single flat JSON object.
#[derive(Debug, Serialize)]
pub(crate) struct Envelope<'a, L, P> {
    #[serde(flatten)]
    pub locator: &'a L,
    #[serde(flatten)]
    pub payload: &'a P,
}

impl<'a, L, P> Envelope<'a, L, P> {
    pub fn new(locator: &'a L, payload: &'a P) -> Self {
        Self { locator, payload }
    }
}
