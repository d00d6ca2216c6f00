//! # docsearch API
//!
//! HTTP surface over [`docsearch_search::SearchOrchestrator`]:
//!
//! - `GET /v1/{resource}` - search, parameters as the query string
//! - `GET /v1/{resource}/{ids}` - fetch by comma separated public ids
//!
//! Both answer JSON, or JSONP when a `callback` parameter is given.

pub mod rest;

pub use rest::{configure, ApiError, RestApi};
