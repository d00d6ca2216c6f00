//! Requested facet sizes
//!
//! `facet_size` holds a comma separated mix of a global size (`20`) and
//! per-facet overrides (`subject.name:5`); an override wins over the global.

use docsearch_core::{Error, QueryParams, Result};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FacetSizes {
    global: Option<usize>,
    per_facet: HashMap<String, usize>,
}

impl FacetSizes {
    pub fn from_params(params: &QueryParams) -> Result<Self> {
        let mut sizes = Self::default();

        for entry in params.get_list("facet_size") {
            match entry.rsplit_once(':') {
                Some((name, size)) => {
                    sizes.per_facet.insert(name.trim().to_string(), parse_size(size)?);
                }
                None => sizes.global = Some(parse_size(&entry)?),
            }
        }

        Ok(sizes)
    }

    pub fn global(&self) -> Option<usize> {
        self.global
    }

    /// Size for the facet named `name`, if any was requested
    pub fn for_facet(&self, name: &str) -> Option<usize> {
        self.per_facet.get(name).copied().or(self.global)
    }
}

fn parse_size(value: &str) -> Result<usize> {
    value
        .trim()
        .parse::<usize>()
        .map_err(|_| Error::invalid_value("facet_size", format!("'{}' is not a non-negative integer", value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_and_override() {
        let params = QueryParams::from_pairs([("facet_size", "20, subject.name:5")]);
        let sizes = FacetSizes::from_params(&params).unwrap();

        assert_eq!(sizes.global(), Some(20));
        assert_eq!(sizes.for_facet("subject.name"), Some(5));
        assert_eq!(sizes.for_facet("language.name"), Some(20));
    }

    #[test]
    fn test_absent() {
        let sizes = FacetSizes::from_params(&QueryParams::new()).unwrap();
        assert_eq!(sizes.for_facet("anything"), None);
    }

    #[test]
    fn test_invalid_size() {
        let params = QueryParams::from_pairs([("facet_size", "lots")]);
        let err = FacetSizes::from_params(&params).unwrap_err();
        assert!(err.is_client_error());
        assert!(err.to_string().contains("lots"));
    }
}
