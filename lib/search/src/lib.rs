//! # docsearch Search
//!
//! Turns flat query parameters into backend search requests and backend
//! responses into the public response shape.
//!
//! - [`SearchOrchestrator`] - Validation, pagination, request assembly, fetch by id
//! - [`ResultNormalizer`] - Document projection and facet reconciliation
//! - [`builders`] - Query, filter, facet and sort clause builders
//! - [`SearchBackend`] / [`DocumentStore`] - Collaborators, with HTTP
//!   implementations in [`elasticsearch`] and [`couchdb`]

pub mod backend;
pub mod builders;
pub mod couchdb;
pub mod elasticsearch;
pub mod facet_size;
pub mod normalize;
pub mod orchestrator;
pub mod pagination;
pub mod request;

pub use backend::{BackendError, DocumentStore, RawFacet, RawHit, RawSearchResponse, SearchBackend};
pub use builders::ClauseBuilders;
pub use couchdb::CouchDocumentStore;
pub use elasticsearch::ElasticsearchBackend;
pub use facet_size::FacetSizes;
pub use normalize::{DateEntry, Facet, ResultNormalizer};
pub use orchestrator::{FetchIds, FetchResponse, SearchOrchestrator, SearchResponse, BASE_QUERY_PARAMS};
pub use pagination::{Pagination, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use request::{QueryContext, SearchRequest};
