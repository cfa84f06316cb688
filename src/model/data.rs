use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{null_as_default, ApiResponse, Fields};

/// A stored document: primary key plus fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataItem {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: Value,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fields: Fields,
}

/// Fields shared by upsert and update.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WriteDataBase {
    pub data: Vec<Fields>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<i32>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub ignore_unknown_fields: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpsertDataRequest {
    #[serde(flatten)]
    pub base: WriteDataBase,
    #[serde(rename = "async", skip_serializing_if = "std::ops::Not::not")]
    pub async_write: bool,
}

impl UpsertDataRequest {
    pub fn new(data: Vec<Fields>) -> Self {
        Self {
            base: WriteDataBase {
                data,
                ..Default::default()
            },
            async_write: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateDataRequest {
    #[serde(flatten)]
    pub base: WriteDataBase,
}

impl UpdateDataRequest {
    pub fn new(data: Vec<Fields>) -> Self {
        Self {
            base: WriteDataBase {
                data,
                ..Default::default()
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpsertDataResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_usage: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateDataResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_usage: Option<Value>,
}

pub type UpsertDataResponse = ApiResponse<UpsertDataResult>;
pub type UpdateDataResponse = ApiResponse<UpdateDataResult>;

/// Deletes documents by primary key, or everything when `del_all` is set.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DeleteDataRequest {
    pub ids: Vec<Value>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub del_all: bool,
}

/// Delete carries no typed result; whatever the server sends is kept raw.
pub type DeleteDataResponse = ApiResponse<Value>;

#[derive(Debug, Clone, Default, Serialize)]
pub struct FetchDataInCollectionRequest {
    pub ids: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FetchDataInCollectionResult {
    #[serde(rename = "fetch", default, deserialize_with = "null_as_default")]
    pub items: Vec<DataItem>,
    #[serde(rename = "ids_not_exist", default, deserialize_with = "null_as_default")]
    pub not_found_ids: Vec<Value>,
}

pub type FetchDataInCollectionResponse = ApiResponse<FetchDataInCollectionResult>;
