//! The metrics feed produced by one scrape.

use crate::metric_names::MetricFamily;

/// One gauge sample: a family, its label values (in schema order) and the
/// value.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub family: &'static MetricFamily,
    pub labels: Vec<String>,
    pub value: f64,
}

/// Ordered set of observations collected during one scrape.
///
/// Order follows the walk (accounts, then games, then domains), so two
/// passes over unchanged cache state produce equal sets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservationSet {
    observations: Vec<Observation>,
}

impl ObservationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a sample. Label values must match the family's schema.
    pub fn push(&mut self, family: &'static MetricFamily, labels: Vec<String>, value: f64) {
        debug_assert_eq!(
            labels.len(),
            family.labels.len(),
            "label count mismatch for {}",
            family.name
        );
        self.observations.push(Observation {
            family,
            labels,
            value,
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &Observation> {
        self.observations.iter()
    }

    /// Samples of a single family, in recording order.
    pub fn family<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Observation> + 'a {
        self.observations
            .iter()
            .filter(move |o| o.family.name == name)
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

impl<'a> IntoIterator for &'a ObservationSet {
    type Item = &'a Observation;
    type IntoIter = std::slice::Iter<'a, Observation>;

    fn into_iter(self) -> Self::IntoIter {
        self.observations.iter()
    }
}
