//! Sort clauses

use super::{parse_lat_lon, SortBuilder};
use crate::request::SearchRequest;
use docsearch_core::schema::RAW_SUB_FIELD;
use docsearch_core::{Error, QueryParams, Result, SchemaRegistry};
use serde_json::{json, Value};

/// Builds the sort clause from `sort_by`, `sort_order` and `sort_by_pin`
///
/// Without `sort_by` nothing is added and the backend orders by relevance.
#[derive(Debug, Clone, Copy, Default)]
pub struct SortClauses;

impl SortBuilder for SortClauses {
    fn build_sort(
        &self,
        schema: &SchemaRegistry,
        doc_type: &str,
        request: &mut SearchRequest,
        params: &QueryParams,
    ) -> Result<()> {
        let Some(sort_by) = params.get_present("sort_by") else {
            return Ok(());
        };

        let order = match params.get_present("sort_order").as_deref() {
            None => "asc",
            Some(o) if o.eq_ignore_ascii_case("asc") => "asc",
            Some(o) if o.eq_ignore_ascii_case("desc") => "desc",
            Some(o) => return Err(Error::InvalidSort(format!("invalid sort_order '{}'", o))),
        };

        request.add_sort(sort_clause(schema, doc_type, &sort_by, order, params)?);
        Ok(())
    }
}

fn sort_clause(
    schema: &SchemaRegistry,
    doc_type: &str,
    field: &str,
    order: &str,
    params: &QueryParams,
) -> Result<Value> {
    let mapping = schema
        .mapping(doc_type, field)
        .filter(|m| !m.is_disabled())
        .ok_or_else(|| Error::InvalidSort(format!("unknown field '{}'", field)))?;

    if mapping.is_geo_point() {
        let pin = params
            .get_present("sort_by_pin")
            .ok_or_else(|| Error::InvalidSort(format!("sorting by '{}' requires sort_by_pin", field)))?;
        let (lat, lon) = parse_lat_lon(&pin, ',')
            .ok_or_else(|| Error::InvalidSort(format!("invalid sort_by_pin '{}'", pin)))?;

        return Ok(json!({
            "_geo_distance": {
                field: { "lat": lat, "lon": lon },
                "order": order,
                "unit": "mi",
            }
        }));
    }

    let target = if mapping.is_date() || (!mapping.analyzed && !mapping.is_object()) {
        field.to_string()
    } else if mapping.raw_sub_field().is_some() {
        format!("{}.{}", field, RAW_SUB_FIELD)
    } else {
        return Err(Error::InvalidSort(format!("field '{}' is not sortable", field)));
    };

    Ok(json!({ target: { "order": order } }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(pairs: &[(&str, &str)]) -> Result<Vec<Value>> {
        let schema = SchemaRegistry::standard();
        let params = QueryParams::from_pairs(pairs.iter().copied());
        let mut request = SearchRequest::new("item");
        SortClauses.build_sort(&schema, "item", &mut request, &params)?;
        Ok(request.sort)
    }

    #[test]
    fn test_no_sort() {
        assert!(build(&[("q", "maps")]).unwrap().is_empty());
        assert!(build(&[("sort_order", "desc")]).unwrap().is_empty());
    }

    #[test]
    fn test_date_and_exact_fields() {
        assert_eq!(
            build(&[("sort_by", "created"), ("sort_order", "desc")]).unwrap(),
            vec![json!({ "created": { "order": "desc" } })]
        );
        assert_eq!(
            build(&[("sort_by", "id")]).unwrap(),
            vec![json!({ "id": { "order": "asc" } })]
        );
        assert_eq!(
            build(&[("sort_by", "temporal.start")]).unwrap(),
            vec![json!({ "temporal.start": { "order": "asc" } })]
        );
    }

    #[test]
    fn test_multi_field_sorts_on_raw() {
        assert_eq!(
            build(&[("sort_by", "isPartOf.name")]).unwrap(),
            vec![json!({ "isPartOf.name.raw": { "order": "asc" } })]
        );
    }

    #[test]
    fn test_geo_sort() {
        let sort = build(&[("sort_by", "spatial.coordinates"), ("sort_by_pin", "42.3,-71.1")]).unwrap();
        assert_eq!(
            sort,
            vec![json!({
                "_geo_distance": {
                    "spatial.coordinates": { "lat": 42.3, "lon": -71.1 },
                    "order": "asc",
                    "unit": "mi"
                }
            })]
        );
    }

    #[test]
    fn test_invalid_sorts() {
        for pairs in [
            vec![("sort_by", "title")],
            vec![("sort_by", "spatial")],
            vec![("sort_by", "nope")],
            vec![("sort_by", "dplaSourceRecord")],
            vec![("sort_by", "created"), ("sort_order", "sideways")],
            vec![("sort_by", "spatial.coordinates")],
            vec![("sort_by", "spatial.coordinates"), ("sort_by_pin", "north")],
        ] {
            let err = build(&pairs).unwrap_err();
            assert!(matches!(err, Error::InvalidSort(_)), "{:?} gave {:?}", pairs, err);
            assert_eq!(err.status_code(), 400);
        }
    }
}
