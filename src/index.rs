use std::sync::Arc;

use crate::error::Result;
use crate::model::{
    AggRequest, AggResponse, Envelope, FetchDataInIndexRequest, FetchDataInIndexResponse,
    IndexLocator, SearchByIdRequest, SearchByKeywordsRequest, SearchByMultiModalRequest,
    SearchByRandomRequest, SearchByScalarRequest, SearchByVectorRequest, SearchResponse,
};
use crate::options::RequestOptions;
use crate::transport::Transport;

const FETCH_PATH: &str = "/api/vikingdb/data/fetch_in_index";
const SEARCH_VECTOR_PATH: &str = "/api/vikingdb/data/search/vector";
const SEARCH_MULTI_MODAL_PATH: &str = "/api/vikingdb/data/search/multi_modal";
const SEARCH_ID_PATH: &str = "/api/vikingdb/data/search/id";
const SEARCH_SCALAR_PATH: &str = "/api/vikingdb/data/search/scalar";
const SEARCH_KEYWORDS_PATH: &str = "/api/vikingdb/data/search/keywords";
const SEARCH_RANDOM_PATH: &str = "/api/vikingdb/data/search/random";
const AGG_PATH: &str = "/api/vikingdb/data/agg";

/// Fetch, search and aggregation against one index of a collection.
#[derive(Debug, Clone)]
pub struct IndexClient {
    transport: Arc<Transport>,
    locator: IndexLocator,
}

impl IndexClient {
    pub(crate) fn new(transport: Arc<Transport>, locator: IndexLocator) -> Self {
        Self { transport, locator }
    }

    pub fn locator(&self) -> &IndexLocator {
        &self.locator
    }

    pub fn collection_name(&self) -> &str {
        &self.locator.collection.collection_name
    }

    pub fn index_name(&self) -> &str {
        &self.locator.index_name
    }

    pub fn project_name(&self) -> Option<&str> {
        self.locator.collection.project_name.as_deref()
    }

    pub fn resource_id(&self) -> Option<&str> {
        self.locator.collection.resource_id.as_deref()
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Fetches documents by id, with the vectors the index stores for them.
    pub async fn fetch(
        &self,
        request: &FetchDataInIndexRequest,
        options: &RequestOptions,
    ) -> Result<FetchDataInIndexResponse> {
        self.send(FETCH_PATH, request, options).await
    }

    /// Nearest neighbours of a dense (and optionally sparse) vector.
    pub async fn search_by_vector(
        &self,
        request: &SearchByVectorRequest,
        options: &RequestOptions,
    ) -> Result<SearchResponse> {
        self.send(SEARCH_VECTOR_PATH, request, options).await
    }

    /// Embeds text, image or video server-side, then searches with it.
    pub async fn search_by_multi_modal(
        &self,
        request: &SearchByMultiModalRequest,
        options: &RequestOptions,
    ) -> Result<SearchResponse> {
        self.send(SEARCH_MULTI_MODAL_PATH, request, options).await
    }

    /// Neighbours of a document already in the index.
    pub async fn search_by_id(
        &self,
        request: &SearchByIdRequest,
        options: &RequestOptions,
    ) -> Result<SearchResponse> {
        self.send(SEARCH_ID_PATH, request, options).await
    }

    /// Documents ordered by a scalar field.
    pub async fn search_by_scalar(
        &self,
        request: &SearchByScalarRequest,
        options: &RequestOptions,
    ) -> Result<SearchResponse> {
        self.send(SEARCH_SCALAR_PATH, request, options).await
    }

    pub async fn search_by_keywords(
        &self,
        request: &SearchByKeywordsRequest,
        options: &RequestOptions,
    ) -> Result<SearchResponse> {
        self.send(SEARCH_KEYWORDS_PATH, request, options).await
    }

    pub async fn search_by_random(
        &self,
        request: &SearchByRandomRequest,
        options: &RequestOptions,
    ) -> Result<SearchResponse> {
        self.send(SEARCH_RANDOM_PATH, request, options).await
    }

    /// Counts or groups matching documents.
    pub async fn aggregate(
        &self,
        request: &AggRequest,
        options: &RequestOptions,
    ) -> Result<AggResponse> {
        self.send(AGG_PATH, request, options).await
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
