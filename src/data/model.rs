use std::collections::HashMap;
use std::fmt;

use crate::error::{DashboardError, Result};

/// Literal label used for the aggregate-of-filtered-set choice.
pub const FILTERED_AVERAGE: &str = "Filtered Average";

// ---------------------------------------------------------------------------
// PropertyMap – ordered name → value pairs
// ---------------------------------------------------------------------------

/// Named numeric properties in source order.
///
/// Experiments carry a handful of properties, so a linear lookup is fine and
/// keeps the JSON key order for display.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyMap {
    entries: Vec<(String, f64)>,
}

impl PropertyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a value, keeping the original position on overwrite.
    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        let name = name.into();
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| *v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for PropertyMap {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        let mut map = PropertyMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

// ---------------------------------------------------------------------------
// Experiment – one recorded data point
// ---------------------------------------------------------------------------

/// A single experiment with its input settings and measured outputs.
#[derive(Debug, Clone, PartialEq)]
pub struct Experiment {
    pub id: String,
    pub inputs: PropertyMap,
    pub outputs: PropertyMap,
}

impl Experiment {
    pub fn new(id: impl Into<String>, inputs: PropertyMap, outputs: PropertyMap) -> Self {
        Self {
            id: id.into(),
            inputs,
            outputs,
        }
    }

    /// Human readable name decoded from the ID.
    pub fn display_name(&self) -> String {
        display_name(&self.id)
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded collection
// ---------------------------------------------------------------------------

/// All experiments in load order, with an ID index.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    experiments: Vec<Experiment>,
    index: HashMap<String, usize>,
    output_names: Vec<String>,
}

impl Dataset {
    /// Build the ID index and discover output names.
    ///
    /// IDs must be unique; a repeated ID is reported as a load error since
    /// the dashboard keys everything by ID.
    pub fn from_experiments(experiments: Vec<Experiment>) -> Result<Self> {
        let mut index = HashMap::with_capacity(experiments.len());
        for (pos, exp) in experiments.iter().enumerate() {
            if index.insert(exp.id.clone(), pos).is_some() {
                return Err(DashboardError::DataLoad(format!(
                    "duplicate experiment id {:?}",
                    exp.id
                )));
            }
        }
        let output_names = experiments
            .first()
            .map(|e| e.outputs.names().map(str::to_string).collect())
            .unwrap_or_default();

        Ok(Dataset {
            experiments,
            index,
            output_names,
        })
    }

    pub fn get(&self, id: &str) -> Option<&Experiment> {
        self.index.get(id).map(|&pos| &self.experiments[pos])
    }

    /// Like [`Dataset::get`], but a missing ID is a consistency error.
    pub fn require(&self, id: &str) -> Result<&Experiment> {
        self.get(id).ok_or_else(|| DashboardError::DatasetConsistency {
            id: id.to_string(),
            property: None,
        })
    }

    /// Load-order position of `id`.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Experiments in load order.
    pub fn experiments(&self) -> &[Experiment] {
        &self.experiments
    }

    /// Experiment IDs in load order.
    pub fn ids(&self) -> Vec<String> {
        self.experiments.iter().map(|e| e.id.clone()).collect()
    }

    /// Output property names, discovered from the first experiment.
    pub fn output_names(&self) -> &[String] {
        &self.output_names
    }

    /// Input property names of the first experiment.
    pub fn input_names(&self) -> Vec<String> {
        self.experiments
            .first()
            .map(|e| e.inputs.names().map(str::to_string).collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.experiments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.experiments.is_empty()
    }
}

// ---------------------------------------------------------------------------
// ID decoding
// ---------------------------------------------------------------------------

/// Decode a fixed-width experiment ID into `Experiment NN (MM/DD/YYYY)`.
///
/// Layout: `[0,4)` year, `[4,6)` month, `[6,8)` day, `[13,15)` run index.
/// Short or malformed IDs degrade to empty fields instead of failing.
pub fn display_name(id: &str) -> String {
    if id == FILTERED_AVERAGE {
        return id.to_string();
    }
    let year = substring(id, 0, 4);
    let month = substring(id, 4, 6);
    let day = substring(id, 6, 8);
    let index = substring(id, 13, 15);
    format!("Experiment {index} ({month}/{day}/{year})")
}

/// Character-offset substring clamped to the string length.
fn substring(s: &str, start: usize, end: usize) -> String {
    s.chars().skip(start).take(end.saturating_sub(start)).collect()
}

impl fmt::Display for Experiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.display_name(), self.id)
    }
}
