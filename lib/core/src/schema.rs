//! Schema registry definitions
//!
//! Declares, per document type, which fields exist, how they nest and
//! which ones support faceting. The set of query parameters a client may
//! use is derived from these declarations.

use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Suffix of the derived "on or before" date bound parameter
pub const BEFORE_SUFFIX: &str = "before";
/// Suffix of the derived "on or after" date bound parameter
pub const AFTER_SUFFIX: &str = "after";
/// Suffix of the derived geo radius parameter
pub const DISTANCE_SUFFIX: &str = "distance";
/// Name of the unanalyzed sub-field of a multi-field
pub const RAW_SUB_FIELD: &str = "raw";

/// Field type enumeration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// Text field, analyzed unless declared exact
    String,
    /// Date field, gains `.before` / `.after` range parameters
    Date,
    /// Geo coordinates, gains a `.distance` radius parameter
    GeoPoint,
    /// Indexed twice: analyzed for search, raw for exact match and faceting
    MultiField,
    /// Nested object with its own sub-fields
    Object,
    /// Stored but never indexed
    Disabled,
}

/// Mapping of a single field of a document type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldMapping {
    pub name: String,

    #[serde(rename = "type")]
    pub field_type: FieldType,

    /// Whether free-text tokenization applies
    #[serde(default)]
    pub analyzed: bool,

    /// Whether faceting over this field is permitted
    #[serde(default)]
    pub facetable: bool,

    /// Sub-fields of object and multi-field types, in declaration order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_fields: Vec<FieldMapping>,

    /// Value the backend indexes when the field is absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub null_value: Option<String>,
}

impl FieldMapping {
    fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            analyzed: false,
            facetable: false,
            sub_fields: Vec::new(),
            null_value: None,
        }
    }

    /// Analyzed text field
    pub fn text(name: impl Into<String>) -> Self {
        Self {
            analyzed: true,
            ..Self::new(name, FieldType::String)
        }
    }

    /// Unanalyzed string field with exact-match semantics
    pub fn exact(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::String)
    }

    pub fn date(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Date)
    }

    pub fn geo_point(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::GeoPoint)
    }

    pub fn object(name: impl Into<String>, sub_fields: Vec<FieldMapping>) -> Self {
        Self {
            sub_fields,
            ..Self::new(name, FieldType::Object)
        }
    }

    /// Multi-field whose `raw` sub-field (if any) carries the exact-match copy
    pub fn multi_field(name: impl Into<String>, sub_fields: Vec<FieldMapping>) -> Self {
        Self {
            analyzed: true,
            sub_fields,
            ..Self::new(name, FieldType::MultiField)
        }
    }

    /// Field omitted from the index entirely
    pub fn disabled(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Disabled)
    }

    /// Mark the field as facetable
    pub fn facet(mut self) -> Self {
        self.facetable = true;
        self
    }

    pub fn with_null_value(mut self, value: impl Into<String>) -> Self {
        self.null_value = Some(value.into());
        self
    }

    pub fn is_disabled(&self) -> bool {
        self.field_type == FieldType::Disabled
    }

    pub fn is_date(&self) -> bool {
        self.field_type == FieldType::Date
    }

    pub fn is_geo_point(&self) -> bool {
        self.field_type == FieldType::GeoPoint
    }

    pub fn is_object(&self) -> bool {
        self.field_type == FieldType::Object
    }

    /// Look up a direct sub-field of an object field
    pub fn sub_field(&self, name: &str) -> Option<&FieldMapping> {
        if !self.is_object() {
            return None;
        }
        self.sub_fields.iter().find(|f| f.name == name)
    }

    /// The raw sub-field of a multi-field
    pub fn raw_sub_field(&self) -> Option<&FieldMapping> {
        if self.field_type != FieldType::MultiField {
            return None;
        }
        self.sub_fields.iter().find(|f| f.name == RAW_SUB_FIELD)
    }

    /// Indexed sub-fields of an object field
    pub fn indexed_sub_fields(&self) -> impl Iterator<Item = &FieldMapping> {
        self.sub_fields
            .iter()
            .filter(move |f| self.is_object() && !f.is_disabled())
    }

    /// True for date fields and for objects holding at least one date sub-field
    pub fn has_date_range(&self) -> bool {
        self.is_date() || self.indexed_sub_fields().any(|f| f.is_date())
    }

    /// First geo-point sub-field of an object field
    pub fn geo_sub_field(&self) -> Option<&FieldMapping> {
        self.indexed_sub_fields().find(|f| f.is_geo_point())
    }
}

/// Field layout of one document type
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentSchema {
    pub name: String,
    pub fields: Vec<FieldMapping>,
}

impl DocumentSchema {
    pub fn new(name: impl Into<String>, fields: Vec<FieldMapping>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    /// Get a top-level field by name
    pub fn field(&self, name: &str) -> Option<&FieldMapping> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Immutable registry of document type layouts
///
/// Built once at startup and shared read-only (typically behind an `Arc`)
/// for the lifetime of the process.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    types: HashMap<String, DocumentSchema>,
}

impl SchemaRegistry {
    pub fn new(types: Vec<DocumentSchema>) -> Self {
        Self {
            types: types.into_iter().map(|t| (t.name.clone(), t)).collect(),
        }
    }

    /// Registry holding the built-in document types
    pub fn standard() -> Self {
        Self::new(vec![crate::item::item_schema()])
    }

    pub fn contains(&self, doc_type: &str) -> bool {
        self.types.contains_key(doc_type)
    }

    /// Names of all registered document types, sorted
    pub fn doc_types(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.types.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Layout of a whole document type
    pub fn document(&self, doc_type: &str) -> Option<&DocumentSchema> {
        self.types.get(doc_type)
    }

    /// Mapping for a field of `doc_type`
    ///
    /// `field` may be dotted (`"spatial.city"`), resolving through one level
    /// of object nesting. Unknown types, fields and deeper paths yield `None`.
    pub fn mapping(&self, doc_type: &str, field: &str) -> Option<&FieldMapping> {
        let doc = self.document(doc_type)?;
        match field.split_once('.') {
            Some((parent, child)) => doc.field(parent)?.sub_field(child),
            None => doc.field(field),
        }
    }

    /// Every legal query parameter name for `doc_type`, in declaration order
    pub fn queryable_field_names(&self, doc_type: &str) -> Vec<String> {
        let Some(doc) = self.document(doc_type) else {
            return Vec::new();
        };

        let mut names = Vec::new();
        for field in doc.fields.iter().filter(|f| !f.is_disabled()) {
            names.push(field.name.clone());

            if field.has_date_range() {
                names.push(format!("{}.{}", field.name, BEFORE_SUFFIX));
                names.push(format!("{}.{}", field.name, AFTER_SUFFIX));
            }

            if field.is_geo_point() {
                names.push(format!("{}.{}", field.name, DISTANCE_SUFFIX));
            }

            for sub in field.indexed_sub_fields() {
                names.push(format!("{}.{}", field.name, sub.name));
                if sub.is_geo_point() {
                    names.push(format!("{}.{}", field.name, DISTANCE_SUFFIX));
                }
            }
        }

        let mut seen = AHashSet::with_capacity(names.len());
        names.retain(|name| seen.insert(name.clone()));
        names
    }

    /// Whether faceting over `field` is permitted
    pub fn is_facetable(&self, doc_type: &str, field: &str) -> bool {
        match self.mapping(doc_type, field) {
            Some(mapping) if !mapping.is_disabled() => {
                mapping.facetable || mapping.raw_sub_field().is_some_and(|raw| raw.facetable)
            }
            _ => false,
        }
    }

    /// Expand requested facet fields into facetable fields and facetable sub-fields
    ///
    /// A field with nothing facetable under it is passed through unchanged so
    /// that facet validation rejects it instead of it being dropped.
    pub fn expand_facet_fields<S: AsRef<str>>(&self, doc_type: &str, fields: &[S]) -> Vec<String> {
        let mut expanded = Vec::new();
        let mut seen = AHashSet::new();

        for field in fields {
            let field = field.as_ref();
            let mut found = Vec::new();

            if self.is_facetable(doc_type, field) {
                found.push(field.to_string());
            }

            if let Some(mapping) = self.mapping(doc_type, field) {
                for sub in mapping.indexed_sub_fields() {
                    let name = format!("{}.{}", field, sub.name);
                    if self.is_facetable(doc_type, &name) {
                        found.push(name);
                    }
                }
            }

            if found.is_empty() {
                found.push(field.to_string());
            }

            for name in found {
                if seen.insert(name.clone()) {
                    expanded.push(name);
                }
            }
        }

        expanded
    }

    /// Physical field to facet on: `<field>.raw` for raw-backed multi-fields
    pub fn facet_field_name(&self, doc_type: &str, field: &str) -> String {
        match self.mapping(doc_type, field) {
            Some(mapping) if mapping.raw_sub_field().is_some_and(|raw| raw.facetable) => {
                format!("{}.{}", field, RAW_SUB_FIELD)
            }
            _ => field.to_string(),
        }
    }
}
