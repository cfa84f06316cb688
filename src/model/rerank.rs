use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{null_as_default, ApiResponse, FullModalData};

/// Scores each candidate in `data` against `query`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RerankRequest {
    pub model_name: String,
    pub model_version: String,
    pub data: Vec<Vec<FullModalData>>,
    pub query: Vec<FullModalData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instruction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_origin_data: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RerankItem {
    /// Position of the candidate in the request's `data`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub score: f64,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub origin_data: Vec<FullModalData>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RerankResult {
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<RerankItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_usage: Option<Value>,
}

pub type RerankResponse = ApiResponse<RerankResult>;
