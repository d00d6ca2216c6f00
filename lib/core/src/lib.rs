//! # docsearch Core
//!
//! Core library for the docsearch document search API.
//!
//! This crate provides the pieces every other layer depends on:
//!
//! - [`SchemaRegistry`] - Immutable per-document-type field layouts
//! - [`FieldMapping`] - Declaration of a single field
//! - [`QueryParams`] - Raw parameters of one API call
//! - [`Error`] - Client and server error taxonomy
//!
//! ## Example
//!
//! ```rust
//! use docsearch_core::SchemaRegistry;
//!
//! let registry = SchemaRegistry::standard();
//! let names = registry.queryable_field_names("item");
//! assert!(names.contains(&"created.before".to_string()));
//! assert_eq!(registry.facet_field_name("item", "isPartOf.name"), "isPartOf.name.raw");
//! ```

pub mod error;
pub mod item;
pub mod params;
pub mod schema;

pub use error::{Error, ErrorClass, Result};
pub use item::{item_schema, ITEM};
pub use params::{split_list, ParamValue, QueryParams};
pub use schema::{DocumentSchema, FieldMapping, FieldType, SchemaRegistry};
