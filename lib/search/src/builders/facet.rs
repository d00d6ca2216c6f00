//! Facet clauses
//!
//! Each comma separated entry of `facets` is one of:
//!
//! - `<date field>.<interval>`: `day`, `month` or `year` histograms, or
//!   `decade` / `century` buckets emulated with range facets
//! - `<geo field>:<lat>:<lon>[:<N>mi]`: distance rings of N miles
//! - anything else: expanded to its facetable fields and faceted by term

use super::{parse_lat_lon, FacetBuilder};
use crate::facet_size::FacetSizes;
use crate::request::SearchRequest;
use ahash::AHashSet;
use docsearch_core::{Error, QueryParams, Result, SchemaRegistry};
use serde_json::{json, Value};

/// Terms requested from the backend when no facet size is given
pub const DEFAULT_FACET_SIZE: usize = 50;

/// Width of a geo distance ring when none is given, in miles
pub const DEFAULT_RING_MILES: u32 = 100;
const RING_COUNT: u32 = 10;

const HISTOGRAM_INTERVALS: [&str; 3] = ["day", "month", "year"];
const FIRST_RANGE_YEAR: u32 = 1000;
const LAST_RANGE_YEAR: u32 = 2100;

/// A parsed facet entry
#[derive(Debug, Clone, PartialEq)]
pub enum FacetRequest {
    Terms {
        name: String,
        field: String,
    },
    DateHistogram {
        name: String,
        field: String,
        interval: String,
    },
    /// Decade or century buckets over a date field
    DateRange {
        name: String,
        field: String,
        years: u32,
    },
    GeoDistance {
        name: String,
        field: String,
        lat: f64,
        lon: f64,
        ring_miles: u32,
    },
}

impl FacetRequest {
    pub fn name(&self) -> &str {
        match self {
            FacetRequest::Terms { name, .. }
            | FacetRequest::DateHistogram { name, .. }
            | FacetRequest::DateRange { name, .. }
            | FacetRequest::GeoDistance { name, .. } => name,
        }
    }

    /// Backend facet clause
    pub fn to_clause(&self, size: usize) -> Value {
        match self {
            FacetRequest::Terms { field, .. } => json!({
                "terms": { "field": field, "size": size }
            }),
            FacetRequest::DateHistogram { field, interval, .. } => json!({
                "date_histogram": { "field": field, "interval": interval }
            }),
            FacetRequest::DateRange { field, years, .. } => {
                let ranges: Vec<Value> = (FIRST_RANGE_YEAR..LAST_RANGE_YEAR)
                    .step_by(*years as usize)
                    .map(|from| json!({ "from": format!("{:04}", from), "to": format!("{:04}", from + years) }))
                    .collect();
                json!({ "range": { "field": field, "ranges": ranges } })
            }
            FacetRequest::GeoDistance { field, lat, lon, ring_miles, .. } => {
                let mut ranges: Vec<Value> = (0..RING_COUNT)
                    .map(|i| json!({ "from": i * ring_miles, "to": (i + 1) * ring_miles }))
                    .collect();
                ranges.push(json!({ "from": RING_COUNT * ring_miles }));
                json!({
                    "geo_distance": {
                        field.as_str(): { "lat": lat, "lon": lon },
                        "unit": "mi",
                        "ranges": ranges,
                    }
                })
            }
        }
    }
}

/// Parse and validate the `facets` parameter
///
/// Every entry that resolves to a non-facetable field is collected and the
/// whole list is rejected at once.
pub fn parse_facets(schema: &SchemaRegistry, doc_type: &str, params: &QueryParams) -> Result<Vec<FacetRequest>> {
    let mut facets = Vec::new();
    let mut invalid = Vec::new();

    for entry in params.get_list("facets") {
        let (path, args) = match entry.split_once(':') {
            Some((path, args)) => (path, Some(args)),
            None => (entry.as_str(), None),
        };

        if schema.mapping(doc_type, path).is_some_and(|m| m.is_geo_point()) {
            match args.and_then(parse_geo_args) {
                Some((lat, lon, ring_miles)) => facets.push(FacetRequest::GeoDistance {
                    name: path.to_string(),
                    field: path.to_string(),
                    lat,
                    lon,
                    ring_miles,
                }),
                None => invalid.push(entry.clone()),
            }
            continue;
        }

        if args.is_some() {
            invalid.push(entry.clone());
            continue;
        }

        if let Some(date_facet) = date_facet(schema, doc_type, path) {
            facets.push(date_facet);
            continue;
        }

        for name in schema.expand_facet_fields(doc_type, &[path]) {
            if schema.is_facetable(doc_type, &name) {
                let field = schema.facet_field_name(doc_type, &name);
                facets.push(FacetRequest::Terms { name, field });
            } else {
                invalid.push(name);
            }
        }
    }

    if !invalid.is_empty() {
        return Err(Error::InvalidFacetFields(invalid));
    }

    let mut seen = AHashSet::new();
    facets.retain(|f| seen.insert(f.name().to_string()));
    Ok(facets)
}

/// Interval or coarse-range facet over a date field
fn date_facet(schema: &SchemaRegistry, doc_type: &str, path: &str) -> Option<FacetRequest> {
    if schema.mapping(doc_type, path).is_some_and(|m| m.is_date()) {
        return Some(FacetRequest::DateHistogram {
            name: path.to_string(),
            field: path.to_string(),
            interval: "day".to_string(),
        });
    }

    let (field, modifier) = path.rsplit_once('.')?;
    if !schema.mapping(doc_type, field).is_some_and(|m| m.is_date()) {
        return None;
    }

    let name = path.to_string();
    let field = field.to_string();
    match modifier {
        m if HISTOGRAM_INTERVALS.contains(&m) => Some(FacetRequest::DateHistogram {
            name,
            field,
            interval: m.to_string(),
        }),
        "decade" => Some(FacetRequest::DateRange { name, field, years: 10 }),
        "century" => Some(FacetRequest::DateRange { name, field, years: 100 }),
        _ => None,
    }
}

/// `<lat>:<lon>[:<N>mi]`
fn parse_geo_args(args: &str) -> Option<(f64, f64, u32)> {
    let mut parts = args.splitn(3, ':');
    let lat = parts.next()?;
    let lon = parts.next()?;
    let (lat, lon) = parse_lat_lon(&format!("{}:{}", lat, lon), ':')?;

    let ring_miles = match parts.next() {
        None => DEFAULT_RING_MILES,
        Some(ring) => ring.trim().strip_suffix("mi")?.parse().ok().filter(|m| *m > 0)?,
    };

    Some((lat, lon, ring_miles))
}

/// Reference facet builder
#[derive(Debug, Clone, Copy, Default)]
pub struct FacetClauses;

impl FacetBuilder for FacetClauses {
    fn build_all(
        &self,
        schema: &SchemaRegistry,
        doc_type: &str,
        request: &mut SearchRequest,
        params: &QueryParams,
        global: bool,
    ) -> Result<()> {
        let facets = parse_facets(schema, doc_type, params)?;
        if facets.is_empty() {
            return Ok(());
        }

        let sizes = FacetSizes::from_params(params)?;
        let facet_filter = if params.is_truthy("filter_facets") {
            request.query.combined_filter()
        } else {
            None
        };

        for facet in facets {
            let size = sizes.for_facet(facet.name()).unwrap_or(DEFAULT_FACET_SIZE);
            let mut clause = facet.to_clause(size);

            if global {
                clause["global"] = json!(true);
            }
            if let Some(filter) = &facet_filter {
                clause["facet_filter"] = filter.clone();
            }

            request.add_facet(facet.name(), clause);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(facets: &str) -> Result<Vec<FacetRequest>> {
        let schema = SchemaRegistry::standard();
        let params = QueryParams::from_pairs([("facets", facets)]);
        parse_facets(&schema, "item", &params)
    }

    fn terms(name: &str, field: &str) -> FacetRequest {
        FacetRequest::Terms {
            name: name.to_string(),
            field: field.to_string(),
        }
    }

    #[test]
    fn test_terms_facets_expand_and_redirect() {
        let facets = parse("language,isPartOf.name,contributor").unwrap();

        assert_eq!(
            facets,
            vec![
                terms("language.name", "language.name"),
                terms("language.iso639", "language.iso639"),
                terms("isPartOf.name", "isPartOf.name.raw"),
                terms("contributor", "contributor"),
            ]
        );
    }

    #[test]
    fn test_date_facets() {
        let facets = parse("created.year,temporal.start.decade,created").unwrap();

        assert_eq!(
            facets[0],
            FacetRequest::DateHistogram {
                name: "created.year".to_string(),
                field: "created".to_string(),
                interval: "year".to_string(),
            }
        );
        assert_eq!(
            facets[1],
            FacetRequest::DateRange {
                name: "temporal.start.decade".to_string(),
                field: "temporal.start".to_string(),
                years: 10,
            }
        );
        assert!(matches!(facets[2], FacetRequest::DateHistogram { ref interval, .. } if interval == "day"));
    }

    #[test]
    fn test_geo_facet() {
        let facets = parse("spatial.coordinates:42.3:-71:25mi").unwrap();
        assert_eq!(
            facets,
            vec![FacetRequest::GeoDistance {
                name: "spatial.coordinates".to_string(),
                field: "spatial.coordinates".to_string(),
                lat: 42.3,
                lon: -71.0,
                ring_miles: 25,
            }]
        );

        let ranges = facets[0].to_clause(10)["geo_distance"]["ranges"].clone();
        assert_eq!(ranges[0], json!({ "from": 0, "to": 25 }));
        assert_eq!(ranges.as_array().unwrap().len(), RING_COUNT as usize + 1);
    }

    #[test]
    fn test_invalid_facets_all_listed() {
        let err = parse("title,subject,spatial.coordinates,created.fortnight,language").unwrap_err();

        match err {
            Error::InvalidFacetFields(invalid) => assert_eq!(
                invalid,
                vec!["title", "subject", "spatial.coordinates", "created.fortnight"]
            ),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_decade_ranges() {
        let facet = FacetRequest::DateRange {
            name: "created.decade".to_string(),
            field: "created".to_string(),
            years: 10,
        };
        let clause = facet.to_clause(5);
        let ranges = clause["range"]["ranges"].as_array().unwrap();

        assert_eq!(ranges[0], json!({ "from": "1000", "to": "1010" }));
        assert_eq!(ranges.len(), 110);
    }

    #[test]
    fn test_build_all_global_and_sizes() {
        let schema = SchemaRegistry::standard();
        let params = QueryParams::from_pairs([("facets", "contributor,created.year"), ("facet_size", "5")]);
        let mut request = SearchRequest::new("item");

        FacetClauses.build_all(&schema, "item", &mut request, &params, true).unwrap();

        assert_eq!(request.facets["contributor"]["terms"]["size"], 5);
        assert_eq!(request.facets["contributor"]["global"], true);
        assert_eq!(request.facets["created.year"]["date_histogram"]["interval"], "year");
    }

    #[test]
    fn test_build_all_filter_facets() {
        let schema = SchemaRegistry::standard();
        let params = QueryParams::from_pairs([("facets", "contributor"), ("filter_facets", "true")]);
        let mut request = SearchRequest::new("item");
        request.query.filter(json!({ "range": { "created": { "gte": "1900" } } }));

        FacetClauses.build_all(&schema, "item", &mut request, &params, false).unwrap();

        let clause = &request.facets["contributor"];
        assert!(clause.get("global").is_none());
        assert_eq!(clause["facet_filter"]["range"]["created"]["gte"], "1900");
        assert_eq!(clause["terms"]["size"], DEFAULT_FACET_SIZE);
    }

    #[test]
    fn test_no_facets_requested() {
        let schema = SchemaRegistry::standard();
        let mut request = SearchRequest::new("item");

        FacetClauses
            .build_all(&schema, "item", &mut request, &QueryParams::new(), true)
            .unwrap();
        assert!(request.facets.is_empty());
    }
}
