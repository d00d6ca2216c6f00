//! Date range and geo distance filters

use super::{parse_lat_lon, ClauseBuilder};
use crate::request::QueryContext;
use docsearch_core::schema::{AFTER_SUFFIX, BEFORE_SUFFIX, DISTANCE_SUFFIX};
use docsearch_core::{Error, FieldMapping, QueryParams, Result, SchemaRegistry};
use serde_json::{json, Value};

/// Radius used when coordinates are given without a `.distance`
pub const DEFAULT_DISTANCE: &str = "20mi";

/// Builds filter clauses from the derived `.before`, `.after` and
/// `.distance` parameters and from geo-point field parameters
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterClauses;

impl ClauseBuilder for FilterClauses {
    fn build_all(
        &self,
        schema: &SchemaRegistry,
        doc_type: &str,
        query: &mut QueryContext,
        params: &QueryParams,
    ) -> Result<bool> {
        let mut added = false;

        for (name, value) in params.iter() {
            let value = value.joined();
            if value.trim().is_empty() {
                continue;
            }

            if let Some(mapping) = schema.mapping(doc_type, name) {
                if mapping.is_geo_point() {
                    query.filter(geo_filter(params, name, &value)?);
                    added = true;
                }
                continue;
            }

            let Some((field, suffix)) = name.rsplit_once('.') else {
                continue;
            };
            let Some(mapping) = schema.mapping(doc_type, field) else {
                continue;
            };

            match suffix {
                BEFORE_SUFFIX | AFTER_SUFFIX if mapping.has_date_range() => {
                    query.filter(date_filter(field, mapping, suffix == AFTER_SUFFIX, &value));
                    added = true;
                }
                DISTANCE_SUFFIX => {
                    let geo_field = match mapping.geo_sub_field() {
                        Some(geo) => format!("{}.{}", field, geo.name),
                        None => field.to_string(),
                    };
                    if !params.contains(&geo_field) {
                        return Err(Error::invalid_value(
                            name,
                            format!("requires coordinates in {}", geo_field),
                        ));
                    }
                }
                _ => {}
            }
        }

        Ok(added)
    }
}

/// Range filter for a date bound
///
/// On an object with several date sub-fields, `.after` bounds the last one
/// and `.before` the first (`temporal.end` and `temporal.start`).
fn date_filter(field: &str, mapping: &FieldMapping, after: bool, value: &str) -> Value {
    let target = if mapping.is_date() {
        field.to_string()
    } else {
        let mut dates = mapping.indexed_sub_fields().filter(|f| f.is_date());
        let sub = if after { dates.last() } else { dates.next() };
        match sub {
            Some(sub) => format!("{}.{}", field, sub.name),
            None => field.to_string(),
        }
    };

    let bound = if after { "gte" } else { "lte" };
    json!({ "range": { target: { bound: value } } })
}

/// `geo_distance` filter around the coordinates given for `geo_field`
fn geo_filter(params: &QueryParams, geo_field: &str, coordinates: &str) -> Result<Value> {
    let (lat, lon) = parse_lat_lon(coordinates, ',')
        .ok_or_else(|| Error::invalid_value(geo_field, "expected coordinates as lat,lon"))?;

    let parent = geo_field.rsplit_once('.').map_or(geo_field, |(parent, _)| parent);
    let distance = params
        .get_present(&format!("{}.{}", parent, DISTANCE_SUFFIX))
        .unwrap_or_else(|| DEFAULT_DISTANCE.to_string());

    Ok(json!({
        "geo_distance": {
            "distance": distance,
            geo_field: { "lat": lat, "lon": lon },
        }
    }))
}
