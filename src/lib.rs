//! Async client for the VikingDB vector database HTTP API.
//!
//! A [`Client`] is built once from [`Auth`] and [`Config`] and hands out
//! scoped clients: [`CollectionClient`] for writes and fetches,
//! [`IndexClient`] for searches, plus [`EmbeddingClient`] and
//! [`RerankClient`]. Every call takes [`RequestOptions`] for per-call
//! headers, query parameters, request id, retry budget and cancellation.

pub mod auth;
pub mod cancel;
pub mod client;
pub mod collection;
pub mod config;
pub mod embedding;
pub mod error;
pub mod index;
pub mod model;
pub mod options;
pub mod rerank;
pub mod transport;

pub use auth::{Auth, Signer};
pub use cancel::CancelToken;
pub use client::Client;
pub use collection::CollectionClient;
pub use config::Config;
pub use embedding::EmbeddingClient;
pub use error::{Error, ErrorCode, Result};
pub use index::IndexClient;
pub use options::RequestOptions;
pub use rerank::RerankClient;
pub use transport::{Transport, REQUEST_ID_HEADER};
