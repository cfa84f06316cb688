//! The request pipeline shared by every scoped client.
//!
//! One call serializes its envelope once, then for each attempt builds a
//! fresh request, authenticates it, sends it and decodes the reply. Failed
//! attempts are re-run under [`RetryPolicy`].

pub mod decode;
pub mod retry;

use std::collections::BTreeMap;
use std::time::Duration;

use http::StatusCode;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE, USER_AGENT};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::auth::{Auth, Authenticator};
use crate::cancel::CancelToken;
use crate::config::{Config, DEFAULT_REGION, DEFAULT_TIMEOUT};
use crate::error::{Error, ErrorCode, Result};
use crate::options::RequestOptions;

pub use decode::{decode, decode_into_default};
pub use retry::{retry, Backoff, RetryPolicy};

/// Header carrying the caller's request id.
pub const REQUEST_ID_HEADER: &str = "X-Tt-Logid";

const APPLICATION_JSON: &str = "application/json";

#[derive(Debug)]
pub struct Transport {
    http: reqwest::Client,
    base_url: Url,
    region: String,
    timeout: Duration,
    max_retries: i32,
    user_agent: HeaderValue,
    auth: Authenticator,
    backoff: Backoff,
}

impl Transport {
    /// Validates the configuration and credentials. Nothing is sent.
    pub fn new(config: Config, auth: &Auth) -> Result<Self> {
        let base_url = parse_endpoint(&config.endpoint)?;
        let region = if config.region.trim().is_empty() {
            DEFAULT_REGION.to_string()
        } else {
            config.region.trim().to_string()
        };
        let timeout = if config.timeout.is_zero() {
            DEFAULT_TIMEOUT
        } else {
            config.timeout
        };
        let max_retries = config.max_retries.max(0);
        let auth = Authenticator::new(auth, &region)?;

        let user_agent = config
            .user_agent
            .clone()
            .filter(|ua| !ua.is_empty())
            .unwrap_or_else(Config::default_user_agent);
        let user_agent = HeaderValue::from_str(&user_agent).map_err(|e| {
            Error::with_cause(
                ErrorCode::InvalidParameter,
                format!("invalid user agent: {user_agent}"),
                e,
                StatusCode::BAD_REQUEST,
            )
        })?;

        let http = match config.http_client {
            Some(client) => client,
            None => reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .map_err(|e| {
                    Error::with_cause(
                        ErrorCode::Unknown,
                        "failed to build http client",
                        e,
                        StatusCode::INTERNAL_SERVER_ERROR,
                    )
                })?,
        };

        tracing::debug!(
            endpoint = %base_url,
            region = %region,
            timeout_ms = timeout.as_millis() as u64,
            max_retries,
            "transport configured"
        );

        Ok(Self {
            http,
            base_url,
            region,
            timeout,
            max_retries,
            user_agent,
            auth,
            backoff: Backoff::default(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn max_retries(&self) -> i32 {
        self.max_retries
    }

    /// `POST`s `request` as JSON to `path` and decodes the reply.
    pub async fn post<Req, Resp>(
        &self,
        path: &str,
        request: &Req,
        options: &RequestOptions,
    ) -> Result<Resp>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned + Default,
    {
        self.execute(Method::POST, path, Some(request), options)
            .await
    }

    /// Runs one call: build once, then sign, send and decode under retry.
    /// An empty success body decodes to `Resp::default()`.
    pub async fn execute<Req, Resp>(
        &self,
        method: Method,
        path: &str,
        request: Option<&Req>,
        options: &RequestOptions,
    ) -> Result<Resp>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned + Default,
    {
        let body = match request {
            Some(request) => Some(serde_json::to_vec(request)?),
            None => None,
        };
        let body = body.filter(|b| !b.is_empty());
        let url = self.resolve_url(path, &options.query)?;
        let headers = self.build_headers(body.is_some(), options)?;
        let cancel = options.cancel.as_ref();

        RetryPolicy::new(options.effective_max_retries(self.max_retries))
            .with_backoff(self.backoff)
            .run(
                cancel,
                || self.attempt(&method, &url, &headers, body.as_deref(), cancel),
                Error::is_retryable,
            )
            .await
    }

    async fn attempt<Resp>(
        &self,
        method: &Method,
        url: &Url,
        headers: &HeaderMap,
        body: Option<&[u8]>,
        cancel: Option<&CancelToken>,
    ) -> Result<Resp>
    where
        Resp: DeserializeOwned + Default,
    {
        let mut request = reqwest::Request::new(method.clone(), url.clone());
        *request.headers_mut() = headers.clone();
        if let Some(body) = body {
            *request.body_mut() = Some(body.to_vec().into());
        }
        *request.timeout_mut() = Some(self.timeout);
        self.auth.apply(&mut request)?;

        tracing::debug!(method = %method, url = %url, "sending request");

        match cancel {
            Some(token) => {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => Err(Error::cancelled("request cancelled by caller")),
                    result = self.exchange(request) => result,
                }
            }
            None => self.exchange(request).await,
        }
    }

    async fn exchange<Resp>(&self, request: reqwest::Request) -> Result<Resp>
    where
        Resp: DeserializeOwned + Default,
    {
        let response = self.http.execute(request).await.map_err(send_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                send_error(e)
            } else {
                Error::with_cause(
                    ErrorCode::Unknown,
                    "failed to read response body",
                    e,
                    StatusCode::INTERNAL_SERVER_ERROR,
                )
            }
        })?;

        tracing::debug!(status = status.as_u16(), bytes = body.len(), "received response");
        decode_into_default(status, &body)
    }

    /// Appends `path` to the endpoint's own path, then the query parameters.
    fn resolve_url(&self, path: &str, query: &BTreeMap<String, String>) -> Result<Url> {
        let mut url = self.base_url.clone();
        let joined = format!(
            "{}/{}",
            url.path().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        url.set_path(&joined);
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }
        Ok(url)
    }

    fn build_headers(&self, has_body: bool, options: &RequestOptions) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        if has_body {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
        }
        headers.insert(ACCEPT, HeaderValue::from_static(APPLICATION_JSON));
        headers.insert(USER_AGENT, self.user_agent.clone());

        for (name, value) in &options.headers {
            if name.eq_ignore_ascii_case(REQUEST_ID_HEADER) {
                tracing::warn!(
                    header = %name,
                    "ignoring caller header reserved for the request id; use RequestOptions::request_id"
                );
                continue;
            }
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                Error::with_cause(
                    ErrorCode::InvalidParameter,
                    format!("invalid header name: {name}"),
                    e,
                    StatusCode::BAD_REQUEST,
                )
            })?;
            let header_value = HeaderValue::from_str(value).map_err(|e| {
                Error::with_cause(
                    ErrorCode::InvalidParameter,
                    format!("invalid value for header {name}"),
                    e,
                    StatusCode::BAD_REQUEST,
                )
            })?;
            headers.insert(header_name, header_value);
        }

        if let Some(request_id) = options.request_id.as_deref().filter(|id| !id.is_empty()) {
            let value = HeaderValue::from_str(request_id).map_err(|e| {
                Error::with_cause(
                    ErrorCode::InvalidParameter,
                    format!("invalid request id: {request_id}"),
                    e,
                    StatusCode::BAD_REQUEST,
                )
            })?;
            headers.insert(HeaderName::from_static("x-tt-logid"), value);
        }
        Ok(headers)
    }
}

fn parse_endpoint(endpoint: &str) -> Result<Url> {
    let endpoint = endpoint.trim();
    if endpoint.is_empty() {
        return Err(Error::invalid_parameter("endpoint cannot be empty"));
    }
    let endpoint = if endpoint.contains("://") {
        endpoint.to_string()
    } else {
        format!("https://{endpoint}")
    };
    let url = Url::parse(&endpoint).map_err(|e| {
        Error::with_cause(
            ErrorCode::InvalidParameter,
            format!("invalid endpoint: {endpoint}"),
            e,
            StatusCode::BAD_REQUEST,
        )
    })?;
    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(Error::invalid_parameter(format!(
            "invalid endpoint: {endpoint}"
        )));
    }
    Ok(url)
}

fn send_error(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::with_cause(
            ErrorCode::Timeout,
            "http request timed out",
            e,
            StatusCode::GATEWAY_TIMEOUT,
        )
    } else {
        Error::with_cause(
            ErrorCode::HttpRequestFailed,
            "failed to execute http request",
            e,
            StatusCode::SERVICE_UNAVAILABLE,
        )
    }
}
