//! Search orchestration
//!
//! A search call is one linear pipeline: validate the parameters against the
//! schema, size the page, let the clause builders assemble the request, run
//! it and normalize the answer. Validation always completes before the
//! backend is contacted.

use crate::backend::{DocumentStore, SearchBackend};
use crate::builders::ClauseBuilders;
use crate::facet_size::FacetSizes;
use crate::normalize::{Facet, ResultNormalizer};
use crate::pagination::Pagination;
use crate::request::{QueryContext, SearchRequest};
use ahash::AHashSet;
use docsearch_core::{split_list, Error, QueryParams, Result, SchemaRegistry};
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Parameters accepted on every search regardless of document type
pub const BASE_QUERY_PARAMS: [&str; 15] = [
    "q",
    "controller",
    "action",
    "sort_by",
    "sort_by_pin",
    "sort_order",
    "page",
    "page_size",
    "facets",
    "facet_size",
    "filter_facets",
    "fields",
    "callback",
    "_",
    "x",
];

/// Public search response
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResponse {
    pub count: u64,
    pub start: usize,
    pub limit: usize,
    pub docs: Vec<Map<String, Value>>,
    pub facets: BTreeMap<String, Facet>,
}

/// Public fetch response, one doc per requested id
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FetchResponse {
    pub count: usize,
    pub docs: Vec<Value>,
}

/// Ids given to [`SearchOrchestrator::fetch`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchIds(Vec<String>);

impl FetchIds {
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl From<&str> for FetchIds {
    /// Comma separated list
    fn from(ids: &str) -> Self {
        FetchIds(split_list(ids))
    }
}

impl From<String> for FetchIds {
    fn from(ids: String) -> Self {
        FetchIds::from(ids.as_str())
    }
}

impl From<Vec<String>> for FetchIds {
    fn from(ids: Vec<String>) -> Self {
        FetchIds(ids)
    }
}

impl From<&[&str]> for FetchIds {
    fn from(ids: &[&str]) -> Self {
        FetchIds(ids.iter().map(|id| id.to_string()).collect())
    }
}

/// Validates, assembles, executes and normalizes searches
pub struct SearchOrchestrator {
    schema: Arc<SchemaRegistry>,
    builders: ClauseBuilders,
    backend: Arc<dyn SearchBackend>,
    store: Arc<dyn DocumentStore>,
}

impl SearchOrchestrator {
    /// Orchestrator using the reference clause builders
    pub fn new(schema: Arc<SchemaRegistry>, backend: Arc<dyn SearchBackend>, store: Arc<dyn DocumentStore>) -> Self {
        Self::with_builders(schema, ClauseBuilders::default(), backend, store)
    }

    pub fn with_builders(
        schema: Arc<SchemaRegistry>,
        builders: ClauseBuilders,
        backend: Arc<dyn SearchBackend>,
        store: Arc<dyn DocumentStore>,
    ) -> Self {
        Self {
            schema,
            builders,
            backend,
            store,
        }
    }

    pub fn schema(&self) -> &SchemaRegistry {
        &self.schema
    }

    /// Run a search over `doc_type`
    pub fn search(&self, doc_type: &str, params: &QueryParams) -> Result<SearchResponse> {
        let request = self.compile(doc_type, params)?;
        let sizes = FacetSizes::from_params(params)?;
        let raw = self.execute(&request)?;

        let docs = ResultNormalizer::format_results(raw.hits);
        let facets = ResultNormalizer::format_facets(raw.facets, &sizes);

        info!(
            "Search on '{}': {} hit(s), returning {} doc(s) and {} facet(s)",
            doc_type,
            raw.total,
            docs.len(),
            facets.len()
        );

        Ok(SearchResponse {
            count: raw.total,
            start: request.from,
            limit: request.size,
            docs,
            facets,
        })
    }

    /// Validate `params` and assemble the backend request
    pub fn compile(&self, doc_type: &str, params: &QueryParams) -> Result<SearchRequest> {
        if !self.schema.contains(doc_type) {
            return Err(Error::UnknownResource(doc_type.to_string()));
        }

        let queryable: AHashSet<String> = self.schema.queryable_field_names(doc_type).into_iter().collect();
        validate_query_params(&queryable, params)?;
        let fields = validate_field_params(&queryable, params)?;

        let pagination = Pagination::from_params(params)?;

        let mut query = QueryContext::new();
        let has_query = self.builders.query.build_all(&self.schema, doc_type, &mut query, params)?;
        let has_filter = self.builders.filter.build_all(&self.schema, doc_type, &mut query, params)?;

        let mut request = SearchRequest::new(doc_type);
        request.query = query;
        request.from = pagination.offset;
        request.size = pagination.limit;
        request.fields = fields;

        let global = !(has_query || has_filter);
        self.builders
            .facet
            .build_all(&self.schema, doc_type, &mut request, params, global)?;
        self.builders.sort.build_sort(&self.schema, doc_type, &mut request, params)?;

        Ok(request)
    }

    fn execute(&self, request: &SearchRequest) -> Result<crate::backend::RawSearchResponse> {
        debug!("Executing search on '{}' from {} size {}", request.doc_type, request.from, request.size);

        self.backend.execute(request).map_err(|e| {
            warn!("Search on '{}' failed: {}", request.doc_type, e);
            Error::from(e)
        })
    }

    /// Fetch full documents of `doc_type` by public id
    ///
    /// Every requested id yields exactly one entry, in request order; ids
    /// without a document get `{"id": <id>, "error": "404"}`. A single id
    /// that resolves to nothing is a [`Error::NotFound`].
    pub fn fetch(&self, doc_type: &str, ids: impl Into<FetchIds>) -> Result<FetchResponse> {
        let ids = ids.into();
        let ids = ids.as_slice();
        if ids.is_empty() {
            return Err(Error::invalid_value("id", "at least one id is required"));
        }

        let private_ids = self.resolve_private_ids(doc_type, ids)?;
        if private_ids.is_empty() && ids.len() == 1 {
            warn!("Document '{}' of type '{}' not found", ids[0], doc_type);
            return Err(Error::NotFound(ids[0].clone()));
        }

        let resolved: Vec<(&String, &String)> = ids
            .iter()
            .filter_map(|id| private_ids.get(id).map(|private| (id, private)))
            .collect();
        let internal: Vec<String> = resolved.iter().map(|(_, private)| (*private).clone()).collect();

        let fetched = if internal.is_empty() {
            Vec::new()
        } else {
            self.store.fetch(&internal).map_err(|e| {
                warn!("Document store fetch failed: {}", e);
                Error::DocumentStore(e.detail().unwrap_or("request failed").to_string())
            })?
        };

        let mut found: BTreeMap<&str, Value> = BTreeMap::new();
        for ((id, _), doc) in resolved.iter().zip(fetched) {
            if let Some(doc) = doc {
                found.insert(id.as_str(), doc);
            }
        }

        let docs: Vec<Value> = ids
            .iter()
            .map(|id| match found.get(id.as_str()).cloned() {
                Some(doc) => doc,
                None => json!({ "id": id, "error": "404" }),
            })
            .collect();

        info!("Fetch on '{}': {} of {} id(s) found", doc_type, docs.len() - missing(&docs), ids.len());

        Ok(FetchResponse {
            count: docs.len(),
            docs,
        })
    }

    /// Map public ids to backend identifiers with one disjunctive query
    fn resolve_private_ids(&self, doc_type: &str, ids: &[String]) -> Result<BTreeMap<String, String>> {
        let disjunction = ids
            .iter()
            .map(|id| format!("\"{}\"", id.replace('\\', "\\\\").replace('"', "\\\"")))
            .collect::<Vec<_>>()
            .join(" OR ");

        let mut params = QueryParams::new();
        params.insert("id", disjunction);

        let mut request = self.compile(doc_type, &params)?;
        request.from = 0;
        request.size = ids.len();
        request.fields = Some(vec!["id".to_string()]);

        let raw = self.execute(&request)?;
        Ok(raw
            .hits
            .iter()
            .filter_map(|hit| hit.public_id().map(|id| (id, hit.id.clone())))
            .collect())
    }
}

fn missing(docs: &[Value]) -> usize {
    docs.iter().filter(|d| d.get("error").is_some()).count()
}

/// Every key must be a base parameter or a queryable field name
fn validate_query_params(queryable: &AHashSet<String>, params: &QueryParams) -> Result<()> {
    let invalid: Vec<String> = params
        .keys()
        .filter(|key| !BASE_QUERY_PARAMS.contains(key) && !queryable.contains(*key))
        .map(str::to_string)
        .collect();

    if invalid.is_empty() {
        Ok(())
    } else {
        Err(Error::InvalidQueryParams(invalid))
    }
}

/// The `fields` projection may only name queryable fields
fn validate_field_params(queryable: &AHashSet<String>, params: &QueryParams) -> Result<Option<Vec<String>>> {
    let fields = params.get_list("fields");
    if fields.is_empty() {
        return Ok(None);
    }

    let invalid: Vec<String> = fields.iter().filter(|f| !queryable.contains(*f)).cloned().collect();
    if invalid.is_empty() {
        Ok(Some(fields))
    } else {
        Err(Error::InvalidFieldParams(invalid))
    }
}
