use std::sync::Arc;

use crate::auth::Auth;
use crate::collection::CollectionClient;
use crate::config::Config;
use crate::embedding::EmbeddingClient;
use crate::error::Result;
use crate::index::IndexClient;
use crate::model::{CollectionLocator, IndexLocator};
use crate::rerank::RerankClient;
use crate::transport::Transport;

/// Entry point. Cheap to clone; clones and the scoped clients they hand out
/// share one transport and its connection pool.
///
/// ```no_run
/// use vikingdb::{Auth, Client, Config, RequestOptions};
/// use vikingdb::model::{IndexLocator, SearchBase, SearchByKeywordsRequest};
///
/// # async fn run() -> vikingdb::Result<()> {
/// let client = Client::new(Auth::api_key("token"), Config::default())?;
/// let index = client.index(IndexLocator::new("books", "books_idx"));
/// let request = SearchByKeywordsRequest {
///     search: SearchBase::with_limit(5),
///     keywords: vec!["rust".to_string()],
///     ..Default::default()
/// };
/// let response = index
///     .search_by_keywords(&request, &RequestOptions::new())
///     .await?;
/// println!("{} hits", response.result.map(|r| r.data.len()).unwrap_or(0));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    transport: Arc<Transport>,
}

impl Client {
    /// Fails with `InvalidParameter` on an empty endpoint, an empty secret
    /// key or an empty api key.
    pub fn new(auth: Auth, config: Config) -> Result<Self> {
        let transport = Transport::new(config, &auth)?;
        tracing::info!(
            endpoint = %transport.base_url(),
            region = transport.region(),
            "vikingdb client created"
        );
        Ok(Self {
            transport: Arc::new(transport),
        })
    }

    pub fn collection(&self, locator: CollectionLocator) -> CollectionClient {
        CollectionClient::new(self.transport.clone(), locator)
    }

    pub fn index(&self, locator: IndexLocator) -> IndexClient {
        IndexClient::new(self.transport.clone(), locator)
    }

    pub fn embedding(&self) -> EmbeddingClient {
        EmbeddingClient::new(self.transport.clone())
    }

    pub fn rerank(&self) -> RerankClient {
        RerankClient::new(self.transport.clone())
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn scoped_clients_share_the_transport() {
        let client = Client::new(Auth::api_key("t"), Config::new("http://localhost:9")).unwrap();
        let a = client.collection(CollectionLocator::new("c"));
        let b = client.clone().index(IndexLocator::new("c", "i"));
        assert!(std::ptr::eq(a.transport(), b.transport()));
        assert!(std::ptr::eq(a.transport(), client.transport()));
    }

    #[test]
    fn construction_errors_surface_synchronously() {
        let err = Client::new(Auth::iam("ak", ""), Config::default()).unwrap_err();
        assert_eq!(err.code(), &ErrorCode::InvalidParameter);

        let err = Client::new(Auth::api_key("t"), Config::new("")).unwrap_err();
        assert_eq!(err.message(), "endpoint cannot be empty");
    }
}
