//! Elasticsearch search backend over HTTP

use crate::backend::{BackendError, RawFacet, RawHit, RawSearchResponse, SearchBackend};
use crate::request::SearchRequest;
use reqwest::blocking::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Runs requests against `{base_url}/{index}/{doc_type}/_search`
///
/// The underlying client is blocking; construct and call it outside of an
/// async runtime (or from a blocking task).
pub struct ElasticsearchBackend {
    client: Client,
    base_url: String,
    index: String,
}

impl ElasticsearchBackend {
    pub fn new(base_url: impl Into<String>, index: impl Into<String>, timeout: Duration) -> Result<Self, BackendError> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            warn!("Failed to build search backend client: {}", e);
            BackendError::Failed
        })?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            index: index.into(),
        })
    }

    fn search_url(&self, doc_type: &str) -> String {
        format!("{}/{}/{}/_search", self.base_url, self.index, doc_type)
    }
}

impl SearchBackend for ElasticsearchBackend {
    fn execute(&self, request: &SearchRequest) -> Result<RawSearchResponse, BackendError> {
        let url = self.search_url(&request.doc_type);
        let body = request.to_body();
        debug!("POST {} {}", url, body);

        let response = self.client.post(&url).json(&body).send().map_err(|e| {
            warn!("Search backend unreachable at {}: {}", url, e);
            BackendError::Failed
        })?;

        let status = response.status();
        let payload: Value = response.json().map_err(|e| {
            warn!("Undecodable search backend response ({}): {}", status, e);
            if status.is_success() {
                BackendError::Malformed(e.to_string())
            } else {
                BackendError::Failed
            }
        })?;

        if !status.is_success() {
            return Err(match error_detail(&payload) {
                Some(detail) => BackendError::Rejected(detail),
                None => BackendError::Failed,
            });
        }

        parse_response(payload)
    }
}

/// Error detail carried by a failed backend response
fn error_detail(payload: &Value) -> Option<String> {
    match payload.get("error")? {
        Value::String(detail) => Some(detail.clone()),
        Value::Object(error) => error
            .get("reason")
            .and_then(Value::as_str)
            .or_else(|| error.get("type").and_then(Value::as_str))
            .map(str::to_string),
        _ => None,
    }
}

/// Parse a `_search` response body
pub fn parse_response(payload: Value) -> Result<RawSearchResponse, BackendError> {
    let Value::Object(mut payload) = payload else {
        return Err(BackendError::Malformed("response is not an object".to_string()));
    };

    let hits = payload
        .remove("hits")
        .ok_or_else(|| BackendError::Malformed("response has no hits".to_string()))?;

    let total = match hits.get("total") {
        Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
        Some(Value::Object(t)) => t.get("value").and_then(Value::as_u64).unwrap_or(0),
        _ => 0,
    };

    let hits = match hits.get("hits") {
        Some(Value::Array(items)) => items.iter().map(parse_hit).collect::<Result<Vec<_>, _>>()?,
        _ => Vec::new(),
    };

    let facets = match payload.remove("facets") {
        Some(Value::Object(facets)) => facets
            .into_iter()
            .map(|(name, facet)| Ok((name, RawFacet::from_value(facet)?)))
            .collect::<Result<Vec<_>, BackendError>>()?,
        _ => Vec::new(),
    };

    Ok(RawSearchResponse { total, hits, facets })
}

fn parse_hit(hit: &Value) -> Result<RawHit, BackendError> {
    let id = hit
        .get("_id")
        .and_then(Value::as_str)
        .ok_or_else(|| BackendError::Malformed("hit without _id".to_string()))?;

    Ok(RawHit {
        id: id.to_string(),
        score: hit.get("_score").and_then(Value::as_f64),
        source: hit.get("_source").and_then(Value::as_object).cloned(),
        fields: hit.get("fields").and_then(Value::as_object).cloned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::HistogramBucket;
    use serde_json::json;

    #[test]
    fn test_parse_response() {
        let response = parse_response(json!({
            "took": 3,
            "hits": {
                "total": 2,
                "max_score": 1.5,
                "hits": [
                    { "_id": "x1", "_score": 1.5, "_source": { "id": "a", "title": "Atlas" } },
                    { "_id": "x2", "_score": null, "fields": { "id": "b" } }
                ]
            },
            "facets": {
                "created.year": {
                    "_type": "date_histogram",
                    "entries": [{ "time": 0, "count": 4 }]
                }
            }
        }))
        .unwrap();

        assert_eq!(response.total, 2);
        assert_eq!(response.hits.len(), 2);
        assert_eq!(response.hits[0].score, Some(1.5));
        assert_eq!(response.hits[0].public_id(), Some("a".to_string()));
        assert_eq!(response.hits[1].score, None);
        assert!(response.hits[1].source.is_none());
        assert_eq!(
            response.facets,
            vec![(
                "created.year".to_string(),
                RawFacet::DateHistogram {
                    entries: vec![HistogramBucket { time: 0, count: 4 }]
                }
            )]
        );
    }

    #[test]
    fn test_parse_object_total_and_no_facets() {
        let response = parse_response(json!({
            "hits": { "total": { "value": 12, "relation": "eq" }, "hits": [] }
        }))
        .unwrap();

        assert_eq!(response.total, 12);
        assert!(response.hits.is_empty());
        assert!(response.facets.is_empty());
    }

    #[test]
    fn test_parse_malformed() {
        assert!(matches!(parse_response(json!([])), Err(BackendError::Malformed(_))));
        assert!(matches!(parse_response(json!({ "took": 1 })), Err(BackendError::Malformed(_))));
        assert!(matches!(
            parse_response(json!({ "hits": { "total": 1, "hits": [{ "_score": 1.0 }] } })),
            Err(BackendError::Malformed(_))
        ));
    }

    #[test]
    fn test_error_detail() {
        assert_eq!(
            error_detail(&json!({ "error": "SearchPhaseExecutionException[...]", "status": 400 })),
            Some("SearchPhaseExecutionException[...]".to_string())
        );
        assert_eq!(
            error_detail(&json!({ "error": { "type": "parsing_exception", "reason": "bad query" } })),
            Some("bad query".to_string())
        );
        assert_eq!(error_detail(&json!({ "status": 500 })), None);
    }

    #[test]
    fn test_search_url() {
        let backend = ElasticsearchBackend::new("http://localhost:9200/", "dpla", Duration::from_secs(1)).unwrap();
        assert_eq!(backend.search_url("item"), "http://localhost:9200/dpla/item/_search");
    }
}
