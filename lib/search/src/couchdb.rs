//! CouchDB document store

use crate::backend::{BackendError, DocumentStore};
use reqwest::blocking::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

/// Fetches documents in bulk through `_all_docs?include_docs=true`
pub struct CouchDocumentStore {
    client: Client,
    base_url: String,
    database: String,
}

impl CouchDocumentStore {
    pub fn new(base_url: impl Into<String>, database: impl Into<String>, timeout: Duration) -> Result<Self, BackendError> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            warn!("Failed to build document store client: {}", e);
            BackendError::Failed
        })?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            database: database.into(),
        })
    }

    fn all_docs_url(&self) -> String {
        format!("{}/{}/_all_docs?include_docs=true", self.base_url, self.database)
    }
}

impl DocumentStore for CouchDocumentStore {
    fn fetch(&self, ids: &[String]) -> Result<Vec<Option<Value>>, BackendError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let url = self.all_docs_url();
        debug!("Fetching {} document(s) from {}", ids.len(), url);

        let response = self
            .client
            .post(&url)
            .json(&json!({ "keys": ids }))
            .send()
            .map_err(|e| {
                warn!("Document store unreachable at {}: {}", url, e);
                BackendError::Failed
            })?;

        let status = response.status();
        let payload: Value = response.json().map_err(|e| {
            warn!("Undecodable document store response ({}): {}", status, e);
            BackendError::Failed
        })?;

        if !status.is_success() {
            let reason = payload.get("reason").and_then(Value::as_str);
            return Err(match reason {
                Some(reason) => BackendError::Rejected(reason.to_string()),
                None => BackendError::Failed,
            });
        }

        parse_rows(payload)
    }
}

/// Documents of an `_all_docs` response, one entry per row
///
/// Rows for missing or deleted documents carry no `doc` and map to `None`.
pub fn parse_rows(payload: Value) -> Result<Vec<Option<Value>>, BackendError> {
    let Some(Value::Array(rows)) = payload.get("rows") else {
        return Err(BackendError::Malformed("response has no rows".to_string()));
    };

    Ok(rows
        .iter()
        .map(|row| match row.get("doc") {
            Some(Value::Null) | None => None,
            Some(doc) => Some(doc.clone()),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rows() {
        let docs = parse_rows(json!({
            "total_rows": 3,
            "rows": [
                { "id": "x1", "key": "x1", "value": { "rev": "1-a" }, "doc": { "_id": "x1", "id": "a" } },
                { "id": "x2", "key": "x2", "value": { "rev": "2-b", "deleted": true }, "doc": null },
                { "key": "x3", "error": "not_found" }
            ]
        }))
        .unwrap();

        assert_eq!(docs.len(), 3);
        assert_eq!(docs[0].as_ref().unwrap()["id"], "a");
        assert!(docs[1].is_none());
        assert!(docs[2].is_none());
    }

    #[test]
    fn test_parse_rows_malformed() {
        assert!(matches!(parse_rows(json!({ "error": "x" })), Err(BackendError::Malformed(_))));
    }

    #[test]
    fn test_empty_fetch_skips_request() {
        let store = CouchDocumentStore::new("http://127.0.0.1:1", "dpla", Duration::from_millis(10)).unwrap();
        assert!(store.fetch(&[]).unwrap().is_empty());
        assert_eq!(store.all_docs_url(), "http://127.0.0.1:1/dpla/_all_docs?include_docs=true");
    }
}
