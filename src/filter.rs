//! Repository name filters
//!
//! A [`FilterSet`] is an ordered list of compiled regular expressions, kept
//! alongside the raw strings they were built from. The raw strings also make
//! up the data source's identifier.

use regex::Regex;

use crate::error::DataSourceError;

/// A single compiled filter and its source pattern
#[derive(Debug, Clone)]
pub struct Filter {
    raw: String,
    regex: Regex,
}

impl Filter {
    /// The pattern as supplied by the caller
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Test a repository's short name against this filter
    pub fn is_match(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }
}

/// Ordered, fully compiled set of repository name filters
#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    filters: Vec<Filter>,
}

impl FilterSet {
    /// Compile every pattern in order.
    ///
    /// Fails on the first invalid pattern; a partially compiled set is never
    /// returned.
    pub fn compile<S: AsRef<str>>(patterns: &[S]) -> Result<Self, DataSourceError> {
        let filters = patterns
            .iter()
            .map(|pattern| {
                let raw = pattern.as_ref();
                Regex::new(raw)
                    .map(|regex| Filter {
                        raw: raw.to_string(),
                        regex,
                    })
                    .map_err(|source| DataSourceError::InvalidPattern {
                        pattern: raw.to_string(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { filters })
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Filter> {
        self.filters.iter()
    }

    /// Raw patterns in input order
    pub fn raw(&self) -> Vec<String> {
        self.filters.iter().map(|f| f.raw.clone()).collect()
    }

    /// Filters that match `name`, in filter order
    pub fn matches<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Filter> + 'a {
        self.filters.iter().filter(move |f| f.is_match(name))
    }

    /// Stable identifier for a read with these filters: the raw patterns
    /// concatenated in input order, without a separator.
    pub fn resource_id(&self) -> String {
        self.filters.iter().map(|f| f.raw.as_str()).collect()
    }
}
