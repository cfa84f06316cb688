use std::fmt;
use std::sync::Arc;

use http::StatusCode;
use thiserror::Error;

/// Status used for calls abandoned by the caller (nginx's "client closed request").
pub const STATUS_CLIENT_CLOSED_REQUEST: u16 = 499;

/// Lower-level failure kept behind an `Arc` so [`Error`] stays `Clone`.
pub type Cause = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// Error codes returned by the service, plus the client-side ones.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    HttpRequestFailed,
    Unknown,
    InvalidParameter,
    ServiceUnavailable,
    Timeout,
    RequestLimitExceeded,
    Unauthorized,
    Forbidden,
    NotFound,
    CollectionNotExists,
    CollectionAlreadyExists,
    CollectionCreateFailed,
    CollectionUpdateFailed,
    CollectionDeleteFailed,
    DataInsertFailed,
    DataUpdateFailed,
    DataDeleteFailed,
    DataNotFound,
    SearchFailed,
    IndexNotExists,
    EmbeddingFailed,
    ModelNotFound,
    /// The caller cancelled the call. Never produced by the service.
    Cancelled,
    /// A code this client does not know, kept verbatim.
    Other(String),
}

impl ErrorCode {
    pub fn as_str(&self) -> &str {
        match self {
            ErrorCode::HttpRequestFailed => "HTTPRequestFailed",
            ErrorCode::Unknown => "Unknown",
            ErrorCode::InvalidParameter => "InvalidParameter",
            ErrorCode::ServiceUnavailable => "ServiceUnavailable",
            ErrorCode::Timeout => "Timeout",
            ErrorCode::RequestLimitExceeded => "RequestLimitExceeded",
            ErrorCode::Unauthorized => "Unauthorized",
            ErrorCode::Forbidden => "Forbidden",
            ErrorCode::NotFound => "NotFound",
            ErrorCode::CollectionNotExists => "CollectionNotExists",
            ErrorCode::CollectionAlreadyExists => "CollectionAlreadyExists",
            ErrorCode::CollectionCreateFailed => "CollectionCreateFailed",
            ErrorCode::CollectionUpdateFailed => "CollectionUpdateFailed",
            ErrorCode::CollectionDeleteFailed => "CollectionDeleteFailed",
            ErrorCode::DataInsertFailed => "DataInsertFailed",
            ErrorCode::DataUpdateFailed => "DataUpdateFailed",
            ErrorCode::DataDeleteFailed => "DataDeleteFailed",
            ErrorCode::DataNotFound => "DataNotFound",
            ErrorCode::SearchFailed => "SearchFailed",
            ErrorCode::IndexNotExists => "IndexNotExists",
            ErrorCode::EmbeddingFailed => "EmbeddingFailed",
            ErrorCode::ModelNotFound => "ModelNotFound",
            ErrorCode::Cancelled => "Cancelled",
            ErrorCode::Other(code) => code,
        }
    }
}

impl From<&str> for ErrorCode {
    fn from(code: &str) -> Self {
        match code {
            "HTTPRequestFailed" => ErrorCode::HttpRequestFailed,
            "Unknown" => ErrorCode::Unknown,
            "InvalidParameter" => ErrorCode::InvalidParameter,
            "ServiceUnavailable" => ErrorCode::ServiceUnavailable,
            "Timeout" => ErrorCode::Timeout,
            "RequestLimitExceeded" => ErrorCode::RequestLimitExceeded,
            "Unauthorized" => ErrorCode::Unauthorized,
            "Forbidden" => ErrorCode::Forbidden,
            "NotFound" => ErrorCode::NotFound,
            "CollectionNotExists" => ErrorCode::CollectionNotExists,
            "CollectionAlreadyExists" => ErrorCode::CollectionAlreadyExists,
            "CollectionCreateFailed" => ErrorCode::CollectionCreateFailed,
            "CollectionUpdateFailed" => ErrorCode::CollectionUpdateFailed,
            "CollectionDeleteFailed" => ErrorCode::CollectionDeleteFailed,
            "DataInsertFailed" => ErrorCode::DataInsertFailed,
            "DataUpdateFailed" => ErrorCode::DataUpdateFailed,
            "DataDeleteFailed" => ErrorCode::DataDeleteFailed,
            "DataNotFound" => ErrorCode::DataNotFound,
            "SearchFailed" => ErrorCode::SearchFailed,
            "IndexNotExists" => ErrorCode::IndexNotExists,
            "EmbeddingFailed" => ErrorCode::EmbeddingFailed,
            "ModelNotFound" => ErrorCode::ModelNotFound,
            "Cancelled" => ErrorCode::Cancelled,
            other => ErrorCode::Other(other.to_string()),
        }
    }
}

impl From<String> for ErrorCode {
    fn from(code: String) -> Self {
        ErrorCode::from(code.as_str())
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single error type returned by every public operation.
#[derive(Error, Debug, Clone)]
#[error(
    "vikingdb error: code={code}, message={message}, status_code={}{}",
    .status.as_u16(),
    request_id_suffix(.request_id)
)]
pub struct Error {
    code: ErrorCode,
    message: String,
    status: StatusCode,
    request_id: Option<String>,
    #[source]
    source: Option<Cause>,
}

fn request_id_suffix(request_id: &Option<String>) -> String {
    match request_id {
        Some(id) => format!(", request_id={id}"),
        None => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>, status: StatusCode) -> Self {
        Self {
            code,
            message: message.into(),
            status,
            request_id: None,
            source: None,
        }
    }

    pub fn with_request_id(
        code: ErrorCode,
        message: impl Into<String>,
        request_id: impl Into<String>,
        status: StatusCode,
    ) -> Self {
        let request_id = request_id.into();
        Self {
            request_id: (!request_id.is_empty()).then_some(request_id),
            ..Self::new(code, message, status)
        }
    }

    pub fn with_cause<E>(
        code: ErrorCode,
        message: impl Into<String>,
        cause: E,
        status: StatusCode,
    ) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            source: Some(Arc::new(cause)),
            ..Self::new(code, message, status)
        }
    }

    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidParameter, message, StatusCode::BAD_REQUEST)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message, StatusCode::UNAUTHORIZED)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message, StatusCode::FORBIDDEN)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message, StatusCode::NOT_FOUND)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ServiceUnavailable,
            message,
            StatusCode::SERVICE_UNAVAILABLE,
        )
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Timeout, message, StatusCode::GATEWAY_TIMEOUT)
    }

    pub fn request_limit_exceeded(message: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::RequestLimitExceeded,
            message,
            StatusCode::TOO_MANY_REQUESTS,
        )
    }

    pub fn cancelled(message: impl Into<String>) -> Self {
        let status = StatusCode::from_u16(STATUS_CLIENT_CLOSED_REQUEST)
            .unwrap_or(StatusCode::REQUEST_TIMEOUT);
        Self::new(ErrorCode::Cancelled, message, status)
    }

    pub fn code(&self) -> &ErrorCode {
        &self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    pub fn cause(&self) -> Option<&Cause> {
        self.source.as_ref()
    }

    pub fn is_cancelled(&self) -> bool {
        self.code == ErrorCode::Cancelled
    }

    /// Transient failures: throttling, 5xx gateway statuses, or a transient code
    /// regardless of status.
    pub fn is_retryable(&self) -> bool {
        if self.is_cancelled() {
            return false;
        }
        matches!(self.status.as_u16(), 429 | 500 | 502 | 503 | 504)
            || matches!(
                self.code,
                ErrorCode::ServiceUnavailable
                    | ErrorCode::Timeout
                    | ErrorCode::RequestLimitExceeded
            )
    }
}

/// A local serialization failure. Never retried.
impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::with_cause(
            ErrorCode::InvalidParameter,
            "failed to marshal request",
            e,
            StatusCode::BAD_REQUEST,
        )
    }
}
