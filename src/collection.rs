use std::sync::Arc;

use crate::error::Result;
use crate::model::{
    CollectionLocator, DeleteDataRequest, DeleteDataResponse, Envelope,
    FetchDataInCollectionRequest, FetchDataInCollectionResponse, UpdateDataRequest,
    UpdateDataResponse, UpsertDataRequest, UpsertDataResponse,
};
use crate::options::RequestOptions;
use crate::transport::Transport;

const UPSERT_PATH: &str = "/api/vikingdb/data/upsert";
const UPDATE_PATH: &str = "/api/vikingdb/data/update";
const DELETE_PATH: &str = "/api/vikingdb/data/delete";
const FETCH_PATH: &str = "/api/vikingdb/data/fetch_in_collection";

/// Data operations on one collection.
#[derive(Debug, Clone)]
pub struct CollectionClient {
    transport: Arc<Transport>,
    locator: CollectionLocator,
}

impl CollectionClient {
    pub(crate) fn new(transport: Arc<Transport>, locator: CollectionLocator) -> Self {
        Self { transport, locator }
    }

    pub fn locator(&self) -> &CollectionLocator {
        &self.locator
    }

    pub fn collection_name(&self) -> &str {
        &self.locator.collection_name
    }

    pub fn project_name(&self) -> Option<&str> {
        self.locator.project_name.as_deref()
    }

    pub fn resource_id(&self) -> Option<&str> {
        self.locator.resource_id.as_deref()
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Inserts documents, replacing any with the same primary key.
    pub async fn upsert(
        &self,
        request: &UpsertDataRequest,
        options: &RequestOptions,
    ) -> Result<UpsertDataResponse> {
        self.send(UPSERT_PATH, request, options).await
    }

    /// Updates the given fields of existing documents.
    pub async fn update(
        &self,
        request: &UpdateDataRequest,
        options: &RequestOptions,
    ) -> Result<UpdateDataResponse> {
        self.send(UPDATE_PATH, request, options).await
    }

    pub async fn delete(
        &self,
        request: &DeleteDataRequest,
        options: &RequestOptions,
    ) -> Result<DeleteDataResponse> {
        self.send(DELETE_PATH, request, options).await
    }

    pub async fn fetch(
        &self,
        request: &FetchDataInCollectionRequest,
        options: &RequestOptions,
    ) -> Result<FetchDataInCollectionResponse> {
        self.send(FETCH_PATH, request, options).await
    }

    async fn send<P, R>(&self, path: &str, payload: &P, options: &RequestOptions) -> Result<R>
    where
        P: serde::Serialize,
        R: serde::de::DeserializeOwned + Default,
    {
        self.transport
            .post(path, &Envelope::new(&self.locator, payload), options)
            .await
    }
}
