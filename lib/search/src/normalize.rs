//! Result normalization
//!
//! Turns a raw backend response into the public response shape: strips
//! internal keys from documents, and reconciles interval histograms and
//! coarse date range facets into one `date_histogram` shape.
//!
//! The date constants below work around the deployed backend's timezone
//! handling and the schema's null-date defaults. They are environment
//! specific; confirm the backend's behaviour before changing the offset.

use crate::backend::{HistogramBucket, RawFacet, RawHit};
use crate::facet_size::FacetSizes;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

/// Histogram bucket produced by the `-9999` null date default
pub const NULL_DATE_PAST_MS: i64 = -377_705_116_800_000;
/// Histogram bucket produced by the `9999` null date default
pub const NULL_DATE_FUTURE_MS: i64 = 253_370_764_800_000;
/// Forward shift applied before formatting histogram timestamps (5 hours)
pub const TIMEZONE_OFFSET_MS: i64 = 5 * 60 * 60 * 1000;

/// Keys of the source document starting with this prefix are internal
const TYPE_TAG_PREFIX: &str = "_type";

/// Coarse intervals served by range facets
const RANGE_INTERVALS: [&str; 2] = ["decade", "century"];

/// One `date_histogram` bucket in public form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateEntry {
    pub time: String,
    pub count: u64,
}

/// Normalized facet payload
#[derive(Debug, Clone, PartialEq)]
pub enum Facet {
    DateHistogram { entries: Vec<DateEntry> },
    Terms { terms: Vec<Value>, extra: Map<String, Value> },
    GeoDistance { ranges: Vec<Value>, extra: Map<String, Value> },
    Range { ranges: Vec<Value>, extra: Map<String, Value> },
}

impl Facet {
    pub fn type_tag(&self) -> &'static str {
        match self {
            Facet::DateHistogram { .. } => "date_histogram",
            Facet::Terms { .. } => "terms",
            Facet::GeoDistance { .. } => "geo_distance",
            Facet::Range { .. } => "range",
        }
    }

    /// Key the buckets are listed under
    pub fn bucket_key(&self) -> &'static str {
        match self {
            Facet::DateHistogram { .. } => "entries",
            Facet::Terms { .. } => "terms",
            Facet::GeoDistance { .. } | Facet::Range { .. } => "ranges",
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Facet::DateHistogram { entries } => entries.len(),
            Facet::Terms { terms, .. } => terms.len(),
            Facet::GeoDistance { ranges, .. } | Facet::Range { ranges, .. } => ranges.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn truncate(&mut self, size: usize) {
        match self {
            Facet::DateHistogram { entries } => entries.truncate(size),
            Facet::Terms { terms, .. } => terms.truncate(size),
            Facet::GeoDistance { ranges, .. } | Facet::Range { ranges, .. } => ranges.truncate(size),
        }
    }

    pub fn to_value(&self) -> Value {
        let (buckets, extra) = match self {
            Facet::DateHistogram { entries } => (json!(entries), None),
            Facet::Terms { terms, extra } => (json!(terms), Some(extra)),
            Facet::GeoDistance { ranges, extra } | Facet::Range { ranges, extra } => {
                (json!(ranges), Some(extra))
            }
        };

        let mut payload = extra.cloned().unwrap_or_default();
        payload.insert("_type".to_string(), json!(self.type_tag()));
        payload.insert(self.bucket_key().to_string(), buckets);
        Value::Object(payload)
    }
}

impl Serialize for Facet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

/// Raw response to public response transformations
pub struct ResultNormalizer;

impl ResultNormalizer {
    /// Project each hit into a public document
    pub fn format_results(hits: Vec<RawHit>) -> Vec<Map<String, Value>> {
        hits.into_iter().map(Self::format_hit).collect()
    }

    /// Full source minus internal keys plus `score`, or the bare projection
    pub fn format_hit(hit: RawHit) -> Map<String, Value> {
        match hit.source {
            Some(mut source) if !source.is_empty() => {
                source.retain(|key, _| !key.starts_with(TYPE_TAG_PREFIX));
                source.insert("score".to_string(), json!(hit.score));
                source
            }
            _ => hit.fields.unwrap_or_default(),
        }
    }

    /// Normalize every facet and trim it to its requested size
    pub fn format_facets(facets: Vec<(String, RawFacet)>, sizes: &FacetSizes) -> BTreeMap<String, Facet> {
        facets
            .into_iter()
            .map(|(name, raw)| {
                let size = sizes.for_facet(&name);
                let facet = Self::format_facet(&name, raw, size);
                (name, facet)
            })
            .collect()
    }

    /// Normalize a single facet
    ///
    /// Histograms lose their null-date buckets, get calendar labels and are
    /// ordered by count descending. Decade and century range facets are
    /// reshaped into the same form. Trimming to `size` happens last.
    pub fn format_facet(name: &str, raw: RawFacet, size: Option<usize>) -> Facet {
        let modifier = facet_modifier(name);

        let mut facet = match raw {
            RawFacet::DateHistogram { entries } => {
                let mut entries: Vec<DateEntry> = entries
                    .into_iter()
                    .filter(|bucket| !is_null_date(bucket))
                    .map(|bucket| DateEntry {
                        time: format_date_facet(bucket.time, modifier),
                        count: bucket.count,
                    })
                    .collect();
                sort_by_count_desc(&mut entries);
                Facet::DateHistogram { entries }
            }
            RawFacet::Range { ranges, .. } if modifier.is_some_and(|m| RANGE_INTERVALS.contains(&m)) => {
                let mut entries: Vec<DateEntry> = ranges.iter().filter_map(range_entry).collect();
                sort_by_count_desc(&mut entries);
                Facet::DateHistogram { entries }
            }
            RawFacet::Range { ranges, extra } => Facet::Range { ranges, extra },
            RawFacet::Terms { terms, extra } => Facet::Terms { terms, extra },
            RawFacet::GeoDistance { ranges, extra } => Facet::GeoDistance { ranges, extra },
        };

        if let Some(size) = size {
            facet.truncate(size);
        }
        facet
    }
}

/// Calendar label for a histogram timestamp at the given interval
///
/// `day` (the default) is `YYYY-MM-DD`, `month` is `YYYY-MM`, `year` is `YYYY`.
pub fn format_date_facet(time_ms: i64, interval: Option<&str>) -> String {
    let format = match interval {
        Some("month") => "%Y-%m",
        Some("year") => "%Y",
        _ => "%Y-%m-%d",
    };

    let secs = time_ms.saturating_add(TIMEZONE_OFFSET_MS).div_euclid(1000);
    match DateTime::<Utc>::from_timestamp(secs, 0) {
        Some(date) => date.format(format).to_string(),
        None => time_ms.to_string(),
    }
}

/// Last dotted segment of a facet name (`created.year` -> `year`)
fn facet_modifier(name: &str) -> Option<&str> {
    match name.rsplit_once('.') {
        Some((field, modifier)) if !field.is_empty() => Some(modifier),
        _ => None,
    }
}

fn is_null_date(bucket: &HistogramBucket) -> bool {
    bucket.time == NULL_DATE_PAST_MS || bucket.time == NULL_DATE_FUTURE_MS
}

/// Reshape a non-empty range bucket into a histogram entry
fn range_entry(bucket: &Value) -> Option<DateEntry> {
    let count = bucket.get("count").and_then(Value::as_u64).unwrap_or(0);
    if count == 0 {
        return None;
    }

    let time = match (bucket.get("from_str"), bucket.get("from")) {
        (Some(Value::String(label)), _) => label.clone(),
        (_, Some(Value::Number(from))) => from.to_string(),
        (_, Some(Value::String(from))) => from.clone(),
        _ => "*".to_string(),
    };

    Some(DateEntry { time, count })
}

fn sort_by_count_desc(entries: &mut [DateEntry]) {
    entries.sort_by(|a, b| b.count.cmp(&a.count));
}
