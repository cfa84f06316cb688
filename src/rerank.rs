use std::sync::Arc;

use crate::error::Result;
use crate::model::{RerankRequest, RerankResponse};
use crate::options::RequestOptions;
use crate::transport::Transport;

const RERANK_PATH: &str = "/api/vikingdb/rerank";

#[derive(Debug, Clone)]
pub struct RerankClient {
    transport: Arc<Transport>,
}

impl RerankClient {
    pub(crate) fn new(transport: Arc<Transport>) -> Self {
        Self { transport }
    }

    /// Scores each candidate against the query. Items refer back to
    /// candidates by position.
    pub async fn rerank(
        &self,
        request: &RerankRequest,
        options: &RequestOptions,
    ) -> Result<RerankResponse> {
        self.transport.post(RERANK_PATH, request, options).await
    }
}
