use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{null_as_default, ApiResponse, DataItem, Fields};

/// Fetches documents, and optionally their vectors, through an index.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FetchDataInIndexRequest {
    pub ids: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partition: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub output_fields: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexDataItem {
    #[serde(flatten)]
    pub item: DataItem,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dense_dim: Option<u32>,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub dense_vector: Vec<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FetchDataInIndexResult {
    #[serde(rename = "fetch", default, deserialize_with = "null_as_default")]
    pub items: Vec<IndexDataItem>,
    #[serde(rename = "ids_not_exist", default, deserialize_with = "null_as_default")]
    pub not_found_ids: Vec<Value>,
}

pub type FetchDataInIndexResponse = ApiResponse<FetchDataInIndexResult>;

/// Filter and partition shared by searches and aggregations.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RecallBase {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Fields>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partition: Option<String>,
}

/// Paging, projection and tuning knobs shared by every search mode.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchBase {
    #[serde(flatten)]
    pub recall: RecallBase,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub output_fields: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advance: Option<SearchAdvance>,
}

impl SearchBase {
    pub fn with_limit(limit: u32) -> Self {
        Self {
            limit: Some(limit),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchAdvance {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dense_weight: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ids_in: Vec<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ids_not_in: Vec<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub post_process_ops: Vec<Fields>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_process_input_limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale_k: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_pre_ann_limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_pre_ann_ratio: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchItemResult {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: Value,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fields: Fields,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ann_score: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<SearchItemResult>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub filter_matched_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_return_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub real_text_query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_usage: Option<Value>,
}

pub type SearchResponse = ApiResponse<SearchResult>;

#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchByVectorRequest {
    #[serde(flatten)]
    pub search: SearchBase,
    pub dense_vector: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sparse_vector: Option<HashMap<String, f64>>,
}

/// Searches with text, image or video; the service embeds the query.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchByMultiModalRequest {
    #[serde(flatten)]
    pub search: SearchBase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub need_instruction: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchByIdRequest {
    #[serde(flatten)]
    pub search: SearchBase,
    pub id: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarOrder {
    Asc,
    Desc,
}

/// Orders documents by a scalar field.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchByScalarRequest {
    #[serde(flatten)]
    pub search: SearchBase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<ScalarOrder>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchByKeywordsRequest {
    #[serde(flatten)]
    pub search: SearchBase,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub case_sensitive: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchByRandomRequest {
    #[serde(flatten)]
    pub search: SearchBase,
}

/// Aggregates over the documents that pass the recall filter.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AggRequest {
    #[serde(flatten)]
    pub recall: RecallBase,
    pub op: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cond: Option<Fields>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<ScalarOrder>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggResult {
    #[serde(default, deserialize_with = "null_as_default")]
    pub agg: Fields,
    #[serde(default, deserialize_with = "null_as_default")]
    pub op: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub field: String,
}

pub type AggResponse = ApiResponse<AggResult>;
