//! Search backend and document store collaborators
//!
//! Both are synchronous, single-shot request/response calls. Timeouts and
//! retries belong to the implementation or the surrounding service.

use crate::request::SearchRequest;
use docsearch_core::Error;
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BackendError {
    /// The backend answered with its own error detail
    #[error("search backend rejected the request: {0}")]
    Rejected(String),

    /// The backend answered with something that cannot be interpreted
    #[error("unexpected response from search backend: {0}")]
    Malformed(String),

    /// No usable answer (transport failure, undecodable error body)
    #[error("search backend request failed")]
    Failed,
}

impl BackendError {
    /// Detail reported by the remote side, if any
    pub fn detail(&self) -> Option<&str> {
        match self {
            BackendError::Rejected(detail) | BackendError::Malformed(detail) => Some(detail),
            BackendError::Failed => None,
        }
    }
}

impl From<BackendError> for Error {
    fn from(e: BackendError) -> Self {
        match e {
            BackendError::Rejected(detail) | BackendError::Malformed(detail) => Error::Backend(detail),
            BackendError::Failed => Error::BackendUnavailable,
        }
    }
}

/// Executes assembled search requests
pub trait SearchBackend: Send + Sync {
    fn execute(&self, request: &SearchRequest) -> Result<RawSearchResponse, BackendError>;
}

/// Fetches full documents by internal identifier
pub trait DocumentStore: Send + Sync {
    /// One entry per requested id; `None` marks a document deleted upstream
    fn fetch(&self, ids: &[String]) -> Result<Vec<Option<Value>>, BackendError>;
}

/// Backend response before normalization
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSearchResponse {
    pub total: u64,
    pub hits: Vec<RawHit>,
    /// Facet payloads keyed by facet name, sorted by name
    pub facets: Vec<(String, RawFacet)>,
}

/// A single hit
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawHit {
    /// Backend-internal identifier
    pub id: String,
    pub score: Option<f64>,
    /// Full document, when no projection was requested
    pub source: Option<Map<String, Value>>,
    /// Projected fields, when a projection was requested
    pub fields: Option<Map<String, Value>>,
}

impl RawHit {
    /// Public `id` of the document, from the projection or the source
    pub fn public_id(&self) -> Option<String> {
        let value = self
            .fields
            .as_ref()
            .and_then(|f| f.get("id"))
            .or_else(|| self.source.as_ref().and_then(|s| s.get("id")))?;

        match value {
            Value::String(s) => Some(s.clone()),
            Value::Array(items) => items.first().and_then(Value::as_str).map(str::to_string),
            _ => None,
        }
    }
}

/// One bucket of an interval histogram
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistogramBucket {
    /// Bucket start, UTC milliseconds since the epoch
    pub time: i64,
    pub count: u64,
}

/// Facet payload keyed by the backend's `_type` tag
#[derive(Debug, Clone, PartialEq)]
pub enum RawFacet {
    DateHistogram { entries: Vec<HistogramBucket> },
    Terms { terms: Vec<Value>, extra: Map<String, Value> },
    GeoDistance { ranges: Vec<Value>, extra: Map<String, Value> },
    Range { ranges: Vec<Value>, extra: Map<String, Value> },
}

impl RawFacet {
    /// Parse a backend facet payload
    pub fn from_value(value: Value) -> Result<Self, BackendError> {
        let Value::Object(mut payload) = value else {
            return Err(BackendError::Malformed("facet payload is not an object".to_string()));
        };

        let tag = payload
            .remove("_type")
            .and_then(|t| t.as_str().map(str::to_string))
            .ok_or_else(|| BackendError::Malformed("facet payload has no _type".to_string()))?;

        match tag.as_str() {
            "date_histogram" => {
                let entries = take_array(&mut payload, "entries")?
                    .iter()
                    .map(histogram_bucket)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(RawFacet::DateHistogram { entries })
            }
            "terms" => Ok(RawFacet::Terms {
                terms: take_array(&mut payload, "terms")?,
                extra: payload,
            }),
            "geo_distance" => Ok(RawFacet::GeoDistance {
                ranges: take_array(&mut payload, "ranges")?,
                extra: payload,
            }),
            "range" => Ok(RawFacet::Range {
                ranges: take_array(&mut payload, "ranges")?,
                extra: payload,
            }),
            other => Err(BackendError::Malformed(format!("unsupported facet type '{}'", other))),
        }
    }
}

fn take_array(payload: &mut Map<String, Value>, key: &str) -> Result<Vec<Value>, BackendError> {
    match payload.remove(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(BackendError::Malformed(format!("facet '{}' is not a list", key))),
    }
}

fn histogram_bucket(value: &Value) -> Result<HistogramBucket, BackendError> {
    let time = value
        .get("time")
        .and_then(Value::as_i64)
        .ok_or_else(|| BackendError::Malformed("histogram entry without time".to_string()))?;
    let count = value.get("count").and_then(Value::as_u64).unwrap_or(0);
    Ok(HistogramBucket { time, count })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_date_histogram() {
        let facet = RawFacet::from_value(json!({
            "_type": "date_histogram",
            "entries": [{ "time": 946684800000i64, "count": 3 }]
        }))
        .unwrap();

        assert_eq!(
            facet,
            RawFacet::DateHistogram {
                entries: vec![HistogramBucket { time: 946684800000, count: 3 }]
            }
        );
    }

    #[test]
    fn test_parse_terms_keeps_extra_keys() {
        let facet = RawFacet::from_value(json!({
            "_type": "terms",
            "missing": 2,
            "terms": [{ "term": "Boston", "count": 7 }]
        }))
        .unwrap();

        match facet {
            RawFacet::Terms { terms, extra } => {
                assert_eq!(terms.len(), 1);
                assert_eq!(extra.get("missing"), Some(&json!(2)));
                assert!(extra.get("_type").is_none());
            }
            other => panic!("unexpected facet {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_type() {
        let err = RawFacet::from_value(json!({ "_type": "statistical" })).unwrap_err();
        assert!(matches!(err, BackendError::Malformed(_)));
    }

    #[test]
    fn test_backend_error_classification() {
        let err: Error = BackendError::Rejected("SearchPhaseExecutionException".to_string()).into();
        assert!(matches!(err, Error::Backend(ref d) if d == "SearchPhaseExecutionException"));

        let err: Error = BackendError::Failed.into();
        assert!(matches!(err, Error::BackendUnavailable));
    }

    #[test]
    fn test_public_id() {
        let mut fields = Map::new();
        fields.insert("id".to_string(), json!(["abc"]));
        let hit = RawHit {
            id: "internal".to_string(),
            fields: Some(fields),
            ..Default::default()
        };
        assert_eq!(hit.public_id(), Some("abc".to_string()));

        let mut source = Map::new();
        source.insert("id".to_string(), json!("def"));
        let hit = RawHit {
            id: "internal".to_string(),
            source: Some(source),
            ..Default::default()
        };
        assert_eq!(hit.public_id(), Some("def".to_string()));
    }
}
