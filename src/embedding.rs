use std::sync::Arc;

use crate::error::Result;
use crate::model::{EmbeddingRequest, EmbeddingResponse};
use crate::options::RequestOptions;
use crate::transport::Transport;

const EMBEDDING_PATH: &str = "/api/vikingdb/embedding";

/// Server-side embedding models.
#[derive(Debug, Clone)]
pub struct EmbeddingClient {
    transport: Arc<Transport>,
}

impl EmbeddingClient {
    pub(crate) fn new(transport: Arc<Transport>) -> Self {
        Self { transport }
    }

    /// Returns one dense and/or sparse vector per input, in input order.
    pub async fn embedding(
        &self,
        request: &EmbeddingRequest,
        options: &RequestOptions,
    ) -> Result<EmbeddingResponse> {
        self.transport.post(EMBEDDING_PATH, request, options).await
    }
}
