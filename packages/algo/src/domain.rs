//! Domain index registry
//!
//! A learner's `knowledgeState` is positional while a content item's
//! `knowledgeDomains` is keyed by name. `DomainIndex` fixes the shared
//! dimension order: slot `i` is the `i`-th domain name in lexical order.
//! The vocabulary is closed; unknown names are rejected.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::AlgoError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DomainIndex {
    domains: Vec<String>,
}

impl DomainIndex {
    /// Trims, drops blanks, sorts and deduplicates.
    pub fn new<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut domains: Vec<String> = domains
            .into_iter()
            .map(|d| d.into().trim().to_string())
            .filter(|d| !d.is_empty())
            .collect();
        domains.sort();
        domains.dedup();
        Self { domains }
    }

    /// Parses a comma separated list, e.g. `"math, physics"`.
    pub fn parse(raw: &str) -> Self {
        Self::new(raw.split(','))
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    pub fn domains(&self) -> &[String] {
        &self.domains
    }

    pub fn position(&self, domain: &str) -> Option<usize> {
        self.domains
            .binary_search_by(|probe| probe.as_str().cmp(domain))
            .ok()
    }

    pub fn contains(&self, domain: &str) -> bool {
        self.position(domain).is_some()
    }

    pub fn require(&self, domain: &str) -> Result<usize, AlgoError> {
        self.position(domain)
            .ok_or_else(|| AlgoError::UnknownDomain(domain.to_string()))
    }

    /// Lays a name-keyed weight map out in index order; absent domains are 0.
    pub fn flatten(&self, weights: &BTreeMap<String, f64>) -> Vec<f64> {
        self.domains
            .iter()
            .map(|domain| weights.get(domain).copied().unwrap_or(0.0))
            .collect()
    }
}
