use std::collections::BTreeMap;

use crate::cancel::CancelToken;

/// Per-call overrides layered on top of the client configuration.
///
/// ```
/// use vikingdb::RequestOptions;
///
/// let opts = RequestOptions::new()
///     .request_id("trace-42")
///     .header("X-Debug", "1")
///     .max_retries(1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub(crate) max_retries: Option<i32>,
    pub(crate) headers: BTreeMap<String, String>,
    pub(crate) query: BTreeMap<String, String>,
    pub(crate) request_id: Option<String>,
    pub(crate) cancel: Option<CancelToken>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Retry budget for this call. Ignored unless positive.
    pub fn max_retries(mut self, max_retries: i32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// Extra header. The request-id header is reserved for
    /// [`request_id`](Self::request_id) and is dropped if set here.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    pub fn query_params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.query
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Propagated as `X-Tt-Logid` so client and server logs line up.
    pub fn request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub(crate) fn effective_max_retries(&self, default: i32) -> i32 {
        match self.max_retries {
            Some(n) if n > 0 => n,
            _ => default.max(0),
        }
    }
}
