//! # docsearch
//!
//! Query compilation and result normalization for a document search API.
//!
//! Flat HTTP query parameters are validated against a per-document-type
//! schema, compiled into a faceted search backend request, and the backend's
//! answer is normalized into one stable JSON contract.
//!
//! ## Quick Start
//!
//! ### As a Server
//!
//! ```bash
//! docsearch --http-port 8080 --search-url http://localhost:9200 --store-url http://localhost:5984
//! curl 'http://localhost:8080/v1/items?q=maps&facets=created.decade,language&page_size=5'
//! ```
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use docsearch::prelude::*;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let timeout = Duration::from_secs(30);
//! let backend = ElasticsearchBackend::new("http://localhost:9200", "dpla", timeout).unwrap();
//! let store = CouchDocumentStore::new("http://localhost:5984", "dpla", timeout).unwrap();
//! let search = SearchOrchestrator::new(
//!     Arc::new(SchemaRegistry::standard()),
//!     Arc::new(backend),
//!     Arc::new(store),
//! );
//!
//! let params = QueryParams::from_pairs([("q", "maps"), ("facets", "created.year")]);
//! let response = search.search("item", &params).unwrap();
//! println!("{} matches", response.count);
//! ```
//!
//! ## Crate Structure
//!
//! - `docsearch-core` - Schema registry, query parameters, error types
//! - `docsearch-search` - Orchestrator, clause builders, backends, normalization
//! - `docsearch-api` - REST API

// Re-export core types
pub use docsearch_core::{
    DocumentSchema, Error, ErrorClass, FieldMapping, FieldType, QueryParams, Result, SchemaRegistry,
};

// Re-export search
pub use docsearch_search::{
    CouchDocumentStore, DocumentStore, ElasticsearchBackend, Facet, FetchResponse, ResultNormalizer,
    SearchBackend, SearchOrchestrator, SearchResponse,
};

// Re-export API
pub use docsearch_api::RestApi;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        CouchDocumentStore, DocumentStore, ElasticsearchBackend, Error, Facet, FetchResponse, QueryParams,
        RestApi, Result, SchemaRegistry, SearchBackend, SearchOrchestrator, SearchResponse,
    };
}
