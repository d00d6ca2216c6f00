//! Built-in `item` document type

use crate::schema::{DocumentSchema, FieldMapping};

pub const ITEM: &str = "item";

/// Null value indexed for a missing `temporal.start`
pub const TEMPORAL_START_NULL: &str = "-9999";
/// Null value indexed for a missing `temporal.end`
pub const TEMPORAL_END_NULL: &str = "9999";

/// Field layout of the `item` document type
pub fn item_schema() -> DocumentSchema {
    DocumentSchema::new(
        ITEM,
        vec![
            FieldMapping::exact("id"),
            FieldMapping::exact("@id"),
            FieldMapping::text("title"),
            FieldMapping::object(
                "dplaContributor",
                vec![
                    FieldMapping::exact("@id").facet(),
                    FieldMapping::exact("name").facet(),
                ],
            ),
            FieldMapping::text("creator"),
            FieldMapping::text("publisher"),
            FieldMapping::date("created"),
            FieldMapping::text("type"),
            FieldMapping::text("format"),
            FieldMapping::object(
                "language",
                vec![
                    FieldMapping::exact("name").facet(),
                    FieldMapping::exact("iso639").facet(),
                ],
            ),
            FieldMapping::object(
                "subject",
                vec![
                    FieldMapping::exact("@id"),
                    FieldMapping::text("@type"),
                    FieldMapping::text("name"),
                ],
            ),
            FieldMapping::text("description").with_null_value("NULLvalue"),
            FieldMapping::text("rights"),
            FieldMapping::object(
                "spatial",
                vec![
                    FieldMapping::text("name"),
                    FieldMapping::exact("state").facet(),
                    FieldMapping::text("city"),
                    FieldMapping::exact("iso3166-2").facet(),
                    FieldMapping::geo_point("coordinates"),
                ],
            ),
            FieldMapping::object(
                "temporal",
                vec![
                    FieldMapping::date("start").with_null_value(TEMPORAL_START_NULL),
                    FieldMapping::date("end").with_null_value(TEMPORAL_END_NULL),
                ],
            ),
            FieldMapping::text("relation"),
            FieldMapping::text("source"),
            FieldMapping::object(
                "isPartOf",
                vec![
                    FieldMapping::exact("@id").facet(),
                    FieldMapping::multi_field(
                        "name",
                        vec![
                            FieldMapping::text("name"),
                            FieldMapping::exact("raw").facet(),
                        ],
                    ),
                ],
            ),
            FieldMapping::text("contributor").facet(),
            FieldMapping::disabled("dplaSourceRecord"),
        ],
    )
}
