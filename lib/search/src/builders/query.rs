//! Free-text and per-field query clauses

use super::ClauseBuilder;
use crate::request::QueryContext;
use docsearch_core::{QueryParams, Result, SchemaRegistry};
use serde_json::json;

/// Builds `query_string` clauses for `q` and for every field parameter
///
/// Field parameters search only their own field (or every sub-field of an
/// object field) with AND as the default operator, so `a OR b` disjunctions
/// stay available. Geo fields and derived range parameters are left to the
/// filter builder.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryClauses;

impl ClauseBuilder for QueryClauses {
    fn build_all(
        &self,
        schema: &SchemaRegistry,
        doc_type: &str,
        query: &mut QueryContext,
        params: &QueryParams,
    ) -> Result<bool> {
        let mut added = false;

        if let Some(q) = params.get_present("q") {
            query.must(json!({
                "query_string": {
                    "query": q,
                    "default_operator": "AND",
                }
            }));
            added = true;
        }

        for (name, value) in params.iter() {
            let Some(mapping) = schema.mapping(doc_type, name) else {
                continue;
            };
            if mapping.is_disabled() || mapping.is_geo_point() {
                continue;
            }

            let value = value.joined();
            if value.trim().is_empty() {
                continue;
            }

            let field = if mapping.is_object() {
                format!("{}.*", name)
            } else {
                name.to_string()
            };

            query.must(json!({
                "query_string": {
                    "fields": [field],
                    "query": value,
                    "default_operator": "AND",
                }
            }));
            added = true;
        }

        Ok(added)
    }
}
