//! Search request assembly
//!
//! Clause builders mutate a [`QueryContext`] and a [`SearchRequest`] owned by
//! a single orchestrator call; the finished request renders to the backend's
//! JSON body.

use serde_json::{json, Map, Value};

/// Query and filter clauses collected for one request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryContext {
    must: Vec<Value>,
    filters: Vec<Value>,
}

impl QueryContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a scoring query clause
    pub fn must(&mut self, clause: Value) {
        self.must.push(clause);
    }

    /// Add a non-scoring filter clause
    pub fn filter(&mut self, clause: Value) {
        self.filters.push(clause);
    }

    pub fn must_clauses(&self) -> &[Value] {
        &self.must
    }

    pub fn filter_clauses(&self) -> &[Value] {
        &self.filters
    }

    pub fn is_empty(&self) -> bool {
        self.must.is_empty() && self.filters.is_empty()
    }

    /// All filter clauses combined into one, if any
    pub fn combined_filter(&self) -> Option<Value> {
        match self.filters.len() {
            0 => None,
            1 => Some(self.filters[0].clone()),
            _ => Some(json!({ "and": self.filters })),
        }
    }

    /// Render as a `filtered` query
    pub fn to_query(&self) -> Value {
        let query = match self.must.len() {
            0 => json!({ "match_all": {} }),
            1 => self.must[0].clone(),
            _ => json!({ "bool": { "must": self.must } }),
        };

        match self.combined_filter() {
            Some(filter) => json!({ "filtered": { "query": query, "filter": filter } }),
            None => query,
        }
    }
}

/// A fully assembled search against one document type
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub doc_type: String,
    pub from: usize,
    pub size: usize,
    pub query: QueryContext,
    pub facets: Map<String, Value>,
    pub sort: Vec<Value>,
    /// Field projection; hits carry only these fields when set
    pub fields: Option<Vec<String>>,
}

impl SearchRequest {
    pub fn new(doc_type: impl Into<String>) -> Self {
        Self {
            doc_type: doc_type.into(),
            from: 0,
            size: 0,
            query: QueryContext::new(),
            facets: Map::new(),
            sort: Vec::new(),
            fields: None,
        }
    }

    pub fn add_facet(&mut self, name: impl Into<String>, clause: Value) {
        self.facets.insert(name.into(), clause);
    }

    pub fn add_sort(&mut self, clause: Value) {
        self.sort.push(clause);
    }

    /// JSON body sent to the search backend
    pub fn to_body(&self) -> Value {
        let mut body = Map::new();
        body.insert("from".to_string(), json!(self.from));
        body.insert("size".to_string(), json!(self.size));
        body.insert("query".to_string(), self.query.to_query());

        if !self.facets.is_empty() {
            body.insert("facets".to_string(), Value::Object(self.facets.clone()));
        }
        if !self.sort.is_empty() {
            body.insert("sort".to_string(), json!(self.sort));
        }
        if let Some(fields) = &self.fields {
            body.insert("fields".to_string(), json!(fields));
        }

        Value::Object(body)
    }
}
