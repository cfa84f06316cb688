//! Credentials and request authentication.
//!
//! IAM credentials sign each request with the gateway's HMAC-SHA256 scheme:
//! a canonical form of the request is hashed, and the hash is signed with a
//! key derived from the secret key, the date, the region and the service.

use std::fmt;

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use reqwest::header::{HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE, HOST};
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

/// Service name bound into every IAM signature.
pub const SERVICE: &str = "vikingdb";

const ALGORITHM: &str = "HMAC-SHA256";
const SIGNED_HEADERS: &str = "content-type;host;x-content-sha256;x-date";
const X_DATE: HeaderName = HeaderName::from_static("x-date");
const X_CONTENT_SHA256: HeaderName = HeaderName::from_static("x-content-sha256");

type HmacSha256 = Hmac<Sha256>;

/// How outgoing requests prove their identity.
#[derive(Clone, PartialEq, Eq)]
pub enum Auth {
    None,
    Iam {
        access_key: String,
        secret_key: String,
    },
    /// Sent as `Authorization: Bearer <token>`.
    ApiKey(String),
}

impl Auth {
    pub fn none() -> Self {
        Auth::None
    }

    pub fn iam(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Auth::Iam {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
        }
    }

    pub fn api_key(token: impl Into<String>) -> Self {
        Auth::ApiKey(token.into())
    }
}

impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Auth::None => f.write_str("Auth::None"),
            Auth::Iam { access_key, .. } => f
                .debug_struct("Auth::Iam")
                .field("access_key", access_key)
                .field("secret_key", &"<redacted>")
                .finish(),
            Auth::ApiKey(_) => f.write_str("Auth::ApiKey(<redacted>)"),
        }
    }
}

/// The authentication step of the request pipeline, chosen once per client.
pub(crate) enum Authenticator {
    None,
    Iam(Signer),
    Bearer(HeaderValue),
}

impl Authenticator {
    pub(crate) fn new(auth: &Auth, region: &str) -> Result<Self> {
        match auth {
            Auth::None => Ok(Authenticator::None),
            Auth::Iam {
                access_key,
                secret_key,
            } => Ok(Authenticator::Iam(Signer::new(
                access_key, secret_key, region, SERVICE,
            )?)),
            Auth::ApiKey(token) => {
                if token.is_empty() {
                    return Err(Error::invalid_parameter("api key cannot be empty"));
                }
                let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
                    .map_err(|_| Error::invalid_parameter("api key is not a valid header value"))?;
                value.set_sensitive(true);
                Ok(Authenticator::Bearer(value))
            }
        }
    }

    pub(crate) fn apply(&self, request: &mut reqwest::Request) -> Result<()> {
        match self {
            Authenticator::None => Ok(()),
            Authenticator::Iam(signer) => signer.sign(request, Utc::now()),
            Authenticator::Bearer(value) => {
                request.headers_mut().insert(AUTHORIZATION, value.clone());
                Ok(())
            }
        }
    }
}

impl fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Authenticator::None => f.write_str("None"),
            Authenticator::Iam(signer) => f.debug_tuple("Iam").field(signer).finish(),
            Authenticator::Bearer(_) => f.write_str("Bearer(<redacted>)"),
        }
    }
}

/// Signs requests with an access key / secret key pair.
#[derive(Clone)]
pub struct Signer {
    access_key: String,
    secret_key: String,
    region: String,
    service: String,
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer")
            .field("access_key", &self.access_key)
            .field("region", &self.region)
            .field("service", &self.service)
            .finish_non_exhaustive()
    }
}

impl Signer {
    pub fn new(
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
        region: impl Into<String>,
        service: impl Into<String>,
    ) -> Result<Self> {
        let access_key = access_key.into();
        let secret_key = secret_key.into();
        if access_key.is_empty() || secret_key.is_empty() {
            return Err(Error::invalid_parameter(
                "access key and secret key cannot be empty",
            ));
        }
        Ok(Self {
            access_key,
            secret_key,
            region: region.into(),
            service: service.into(),
        })
    }

    /// Adds `Host`, `X-Date`, `X-Content-Sha256` and `Authorization` headers.
    /// The same request signed at the same instant always yields the same
    /// headers.
    pub fn sign(&self, request: &mut reqwest::Request, at: DateTime<Utc>) -> Result<()> {
        let x_date = at.format("%Y%m%dT%H%M%SZ").to_string();
        let short_date = at.format("%Y%m%d").to_string();

        let host = host_of(request.url())?;
        let body = request.body().and_then(|b| b.as_bytes()).unwrap_or_default();
        let payload_hash = hex::encode(Sha256::digest(body));
        let content_type = request
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        let canonical = canonical_request(
            request.method().as_str(),
            request.url().path(),
            &canonical_query(request.url()),
            &content_type,
            &host,
            &payload_hash,
            &x_date,
        );

        let scope = format!(
            "{}/{}/{}/request",
            short_date, self.region, self.service
        );
        let string_to_sign = format!(
            "{}\n{}\n{}\n{}",
            ALGORITHM,
            x_date,
            scope,
            hex::encode(Sha256::digest(canonical.as_bytes()))
        );

        let signing_key = self.signing_key(&short_date);
        let signature = hex::encode(hmac_sha256(&signing_key, string_to_sign.as_bytes()));
        let authorization = format!(
            "{} Credential={}/{}, SignedHeaders={}, Signature={}",
            ALGORITHM, self.access_key, scope, SIGNED_HEADERS, signature
        );

        let headers = request.headers_mut();
        headers.insert(HOST, header_value(&host)?);
        headers.insert(X_DATE, header_value(&x_date)?);
        headers.insert(X_CONTENT_SHA256, header_value(&payload_hash)?);
        let mut authorization = header_value(&authorization)?;
        authorization.set_sensitive(true);
        headers.insert(AUTHORIZATION, authorization);
        Ok(())
    }

    fn signing_key(&self, short_date: &str) -> Vec<u8> {
        let k_date = hmac_sha256(self.secret_key.as_bytes(), short_date.as_bytes());
        let k_region = hmac_sha256(&k_date, self.region.as_bytes());
        let k_service = hmac_sha256(&k_region, self.service.as_bytes());
        hmac_sha256(&k_service, b"request")
    }
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts any key length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|_| Error::invalid_parameter(format!("invalid header value: {}", value)))
}

fn host_of(url: &url::Url) -> Result<String> {
    let host = url
        .host_str()
        .ok_or_else(|| Error::invalid_parameter("request url has no host"))?;
    Ok(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

/// Query pairs sorted by key then value, each side RFC 3986 encoded.
fn canonical_query(url: &url::Url) -> String {
    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    pairs.sort();
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

fn canonical_request(
    method: &str,
    path: &str,
    query: &str,
    content_type: &str,
    host: &str,
    payload_hash: &str,
    x_date: &str,
) -> String {
    let path = if path.is_empty() { "/" } else { path };
    let headers = format!(
        "content-type:{}\nhost:{}\nx-content-sha256:{}\nx-date:{}\n",
        content_type, host, payload_hash, x_date
    );
    [method, path, query, &headers, SIGNED_HEADERS, payload_hash].join("\n")
}
