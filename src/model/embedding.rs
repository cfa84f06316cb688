use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{null_as_default, ApiResponse};

/// Which model to run for dense or sparse embeddings.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EmbeddingModelOpt {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dim: Option<u32>,
}

impl EmbeddingModelOpt {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }
}

/// One element of a multimodal sequence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FullModalData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<Value>,
}

impl FullModalData {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct EmbeddingData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub full_modal_seq: Vec<FullModalData>,
}

impl EmbeddingData {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct EmbeddingRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dense_model: Option<EmbeddingModelOpt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sparse_model: Option<EmbeddingModelOpt>,
    pub data: Vec<EmbeddingData>,
}

/// Vectors produced for one input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Embedding {
    #[serde(rename = "dense", default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub dense_vector: Vec<f32>,
    #[serde(rename = "sparse", default, deserialize_with = "null_as_default", skip_serializing_if = "HashMap::is_empty")]
    pub sparse_vector: HashMap<String, f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingResult {
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<Embedding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_usage: Option<Value>,
}

pub type EmbeddingResponse = ApiResponse<EmbeddingResult>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_omits_unset_models() {
        let req = EmbeddingRequest {
            dense_model: Some(EmbeddingModelOpt::new("bge-large-zh").with_version("default")),
            data: vec![EmbeddingData::text("hello")],
            ..Default::default()
        };
        let value = serde_json::to_value(req).unwrap();
        assert_eq!(
            value,
            json!({
                "dense_model": {"name": "bge-large-zh", "version": "default"},
                "data": [{"text": "hello"}]
            })
        );
    }

    #[test]
    fn result_reads_dense_and_sparse() {
        let result: EmbeddingResult = serde_json::from_value(json!({
            "data": [{"dense": [0.5, -0.5], "sparse": {"hello": 0.75}}],
            "token_usage": {"prompt_tokens": 3}
        }))
        .unwrap();
        assert_eq!(result.data[0].dense_vector, vec![0.5, -0.5]);
        assert_eq!(result.data[0].sparse_vector["hello"], 0.75);
        assert!(result.token_usage.is_some());
    }
}
