//! Clause builder collaborators
//!
//! Each builder reads validated parameters plus schema lookups and adds
//! backend clauses to the context it is handed. The orchestrator owns that
//! context for the duration of one request.

pub mod facet;
pub mod filter;
pub mod query;
pub mod sort;

use crate::request::{QueryContext, SearchRequest};
use docsearch_core::{QueryParams, Result, SchemaRegistry};

pub use facet::{FacetClauses, FacetRequest, DEFAULT_FACET_SIZE};
pub use filter::{FilterClauses, DEFAULT_DISTANCE};
pub use query::QueryClauses;
pub use sort::SortClauses;

/// Adds query or filter clauses
pub trait ClauseBuilder: Send + Sync {
    /// Returns whether any clause was added
    fn build_all(
        &self,
        schema: &SchemaRegistry,
        doc_type: &str,
        query: &mut QueryContext,
        params: &QueryParams,
    ) -> Result<bool>;
}

/// Adds facet clauses
pub trait FacetBuilder: Send + Sync {
    /// `global` requests facets over the whole index rather than the hits
    fn build_all(
        &self,
        schema: &SchemaRegistry,
        doc_type: &str,
        request: &mut SearchRequest,
        params: &QueryParams,
        global: bool,
    ) -> Result<()>;
}

/// Adds sort clauses
pub trait SortBuilder: Send + Sync {
    fn build_sort(
        &self,
        schema: &SchemaRegistry,
        doc_type: &str,
        request: &mut SearchRequest,
        params: &QueryParams,
    ) -> Result<()>;
}

/// The four collaborators used to assemble a request
pub struct ClauseBuilders {
    pub query: Box<dyn ClauseBuilder>,
    pub filter: Box<dyn ClauseBuilder>,
    pub facet: Box<dyn FacetBuilder>,
    pub sort: Box<dyn SortBuilder>,
}

impl Default for ClauseBuilders {
    fn default() -> Self {
        Self {
            query: Box::new(QueryClauses),
            filter: Box::new(FilterClauses),
            facet: Box::new(FacetClauses),
            sort: Box::new(SortClauses),
        }
    }
}

/// Parse `lat<sep>lon` into a coordinate pair within valid bounds
pub(crate) fn parse_lat_lon(value: &str, separator: char) -> Option<(f64, f64)> {
    let (lat, lon) = value.split_once(separator)?;
    let lat: f64 = lat.trim().parse().ok()?;
    let lon: f64 = lon.trim().parse().ok()?;

    if (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon) {
        Some((lat, lon))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lat_lon() {
        assert_eq!(parse_lat_lon("42.3, -71.1", ','), Some((42.3, -71.1)));
        assert_eq!(parse_lat_lon("42:-71", ':'), Some((42.0, -71.0)));
        assert_eq!(parse_lat_lon("95,10", ','), None);
        assert_eq!(parse_lat_lon("boston", ','), None);
        assert_eq!(parse_lat_lon("42", ','), None);
    }
}
