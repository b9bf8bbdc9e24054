//! Range predicates over input and output properties, and the filter pass
//! that turns them into the list of matching experiment IDs.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{DashboardError, Result};

use super::model::{Dataset, Experiment};
use super::schema::{PropertyKey, PropertySchema};

// ---------------------------------------------------------------------------
// Range predicates
// ---------------------------------------------------------------------------

/// Which side of an experiment a property lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PropertyCategory {
    Input,
    Output,
}

impl PropertyCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyCategory::Input => "input",
            PropertyCategory::Output => "output",
        }
    }

    fn value_of(&self, exp: &Experiment, name: &str) -> Option<f64> {
        match self {
            PropertyCategory::Input => exp.inputs.get(name),
            PropertyCategory::Output => exp.outputs.get(name),
        }
    }
}

impl fmt::Display for PropertyCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropertyCategory {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "input" | "in" | "inputs" => Ok(PropertyCategory::Input),
            "output" | "out" | "outputs" => Ok(PropertyCategory::Output),
            other => Err(DashboardError::InvalidFilter(format!(
                "unknown property category {other:?} (expected input or output)"
            ))),
        }
    }
}

/// Inclusive numeric range on one property.
///
/// Unset bounds default to `[0, +inf]`: negative values are excluded unless
/// the user types a negative minimum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangePredicate {
    pub min: f64,
    pub max: f64,
}

impl Default for RangePredicate {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: f64::INFINITY,
        }
    }
}

impl RangePredicate {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn at_least(min: f64) -> Self {
        Self {
            min,
            ..Self::default()
        }
    }

    pub fn at_most(max: f64) -> Self {
        Self {
            max,
            ..Self::default()
        }
    }

    /// Build a predicate from the raw text of the min/max input fields.
    ///
    /// Blank or missing fields take the default bound.
    pub fn from_user_input(property: &str, min: Option<&str>, max: Option<&str>) -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            min: parse_bound(property, min)?.unwrap_or(defaults.min),
            max: parse_bound(property, max)?.unwrap_or(defaults.max),
        })
    }

    /// `min <= value <= max`. NaN never matches.
    pub fn accepts(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

fn parse_bound(property: &str, raw: Option<&str>) -> Result<Option<f64>> {
    let Some(text) = raw.map(str::trim).filter(|t| !t.is_empty()) else {
        return Ok(None);
    };
    text.parse::<f64>()
        .ok()
        .filter(|v| !v.is_nan())
        .map(Some)
        .ok_or_else(|| DashboardError::InvalidBound {
            property: property.to_string(),
            input: text.to_string(),
        })
}

// ---------------------------------------------------------------------------
// FilterSet
// ---------------------------------------------------------------------------

/// Active predicates keyed by (category, property name).
/// A property absent from the set imposes no constraint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSet {
    predicates: BTreeMap<(PropertyCategory, String), RangePredicate>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) the predicate for one property.
    pub fn insert(
        &mut self,
        category: PropertyCategory,
        name: impl Into<String>,
        predicate: RangePredicate,
    ) {
        self.predicates.insert((category, name.into()), predicate);
    }

    pub fn with(
        mut self,
        category: PropertyCategory,
        name: impl Into<String>,
        predicate: RangePredicate,
    ) -> Self {
        self.insert(category, name, predicate);
        self
    }

    /// Add the predicate for a schema input, keyed by its canonical name.
    pub fn insert_input(&mut self, key: &PropertyKey, predicate: RangePredicate) {
        self.insert(PropertyCategory::Input, key.canonical_name(), predicate);
    }

    /// Parse a `category:name=min..max` expression and add it after checking
    /// the property name.
    ///
    /// Inputs resolve through `schema` when it is non-empty, otherwise
    /// against the dataset's input names; outputs must be among the
    /// dataset's output names. Unknown names are rejected rather than
    /// silently matching nothing.
    pub fn push_resolved(&mut self, spec: &str, schema: &PropertySchema, dataset: &Dataset) -> Result<()> {
        let FilterSpec {
            category,
            name,
            predicate,
        } = spec.parse()?;
        let unknown = || DashboardError::InvalidFilter(format!("unknown {category} property {name:?}"));

        match category {
            PropertyCategory::Input if !schema.is_empty() => {
                let key = schema.key_for(&name).ok_or_else(unknown)?;
                self.insert_input(&key, predicate);
            }
            PropertyCategory::Input => {
                if !dataset.input_names().contains(&name) {
                    return Err(unknown());
                }
                self.insert(category, name, predicate);
            }
            PropertyCategory::Output => {
                if !dataset.output_names().contains(&name) {
                    return Err(unknown());
                }
                self.insert(category, name, predicate);
            }
        }
        Ok(())
    }

    /// Parse and add a `category:name=min..max` expression.
    pub fn push_spec(&mut self, spec: &str) -> Result<()> {
        let FilterSpec {
            category,
            name,
            predicate,
        } = spec.parse()?;
        self.insert(category, name, predicate);
        Ok(())
    }

    pub fn get(&self, category: PropertyCategory, name: &str) -> Option<&RangePredicate> {
        self.predicates.get(&(category, name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (PropertyCategory, &str, &RangePredicate)> {
        self.predicates
            .iter()
            .map(|((cat, name), pred)| (*cat, name.as_str(), pred))
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Whether `exp` satisfies every predicate. A missing value fails.
    pub fn matches(&self, exp: &Experiment) -> bool {
        self.iter().all(|(category, name, pred)| {
            category
                .value_of(exp, name)
                .is_some_and(|value| pred.accepts(value))
        })
    }
}

// ---------------------------------------------------------------------------
// Filter expression: `input:Temperature=10..20`
// ---------------------------------------------------------------------------

/// One parsed filter expression.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSpec {
    pub category: PropertyCategory,
    pub name: String,
    pub predicate: RangePredicate,
}

impl FromStr for FilterSpec {
    type Err = DashboardError;

    /// Grammar: `CATEGORY:NAME[=[MIN]..[MAX]]`. Either bound may be blank;
    /// omitting the range entirely keeps both defaults.
    fn from_str(s: &str) -> Result<Self> {
        let (category, rest) = s
            .split_once(':')
            .ok_or_else(|| DashboardError::InvalidFilter(format!("{s:?}: missing category prefix")))?;
        let category: PropertyCategory = category.parse()?;

        let (name, range) = match rest.rsplit_once('=') {
            Some((name, range)) => (name.trim(), Some(range)),
            None => (rest.trim(), None),
        };
        if name.is_empty() {
            return Err(DashboardError::InvalidFilter(format!("{s:?}: empty property name")));
        }

        let predicate = match range {
            None => RangePredicate::default(),
            Some(range) => {
                let (min, max) = range.split_once("..").ok_or_else(|| {
                    DashboardError::InvalidFilter(format!("{s:?}: expected a MIN..MAX range"))
                })?;
                RangePredicate::from_user_input(name, Some(min), Some(max))?
            }
        };

        Ok(FilterSpec {
            category,
            name: name.to_string(),
            predicate,
        })
    }
}

// ---------------------------------------------------------------------------
// Filter application
// ---------------------------------------------------------------------------

/// Return the IDs of experiments that pass every predicate, in dataset order.
///
/// An empty filter set returns every ID.
pub fn apply_filters(dataset: &Dataset, filters: &FilterSet) -> Vec<String> {
    if filters.is_empty() {
        return dataset.ids();
    }
    for (category, name, pred) in filters.iter() {
        log::debug!("filter {category}:{name} in [{}, {}]", pred.min, pred.max);
    }
    dataset
        .experiments()
        .iter()
        .filter(|exp| filters.matches(exp))
        .map(|exp| exp.id.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::PropertyMap;

    fn dataset() -> Dataset {
        let mk = |id: &str, a: f64, b: f64| {
            Experiment::new(
                id,
                [("A", a)].into_iter().collect::<PropertyMap>(),
                [("B", b)].into_iter().collect::<PropertyMap>(),
            )
        };
        Dataset::from_experiments(vec![
            mk("20230101xxxxx01", 5.0, 10.0),
            mk("20230102xxxxx02", 15.0, 20.0),
        ])
        .unwrap()
    }

    #[test]
    fn empty_filter_set_returns_everything_in_order() {
        assert_eq!(
            apply_filters(&dataset(), &FilterSet::new()),
            vec!["20230101xxxxx01", "20230102xxxxx02"]
        );
    }

    #[test]
    fn input_range_selects_matching_experiment() {
        let f = FilterSet::new().with(PropertyCategory::Input, "A", RangePredicate::new(10.0, 20.0));
        assert_eq!(apply_filters(&dataset(), &f), vec!["20230102xxxxx02"]);
    }

    #[test]
    fn bounds_are_inclusive_and_categories_are_combined() {
        let f = FilterSet::new()
            .with(PropertyCategory::Input, "A", RangePredicate::new(5.0, 15.0))
            .with(PropertyCategory::Output, "B", RangePredicate::at_most(10.0));
        assert_eq!(apply_filters(&dataset(), &f), vec!["20230101xxxxx01"]);
    }

    #[test]
    fn missing_property_fails_the_predicate() {
        let f = FilterSet::new().with(PropertyCategory::Input, "B", RangePredicate::default());
        assert!(apply_filters(&dataset(), &f).is_empty());
    }

    #[test]
    fn default_range_excludes_negatives_only() {
        let p = RangePredicate::default();
        assert!(p.accepts(0.0));
        assert!(p.accepts(1e300));
        assert!(!p.accepts(-0.001));
        assert!(!p.accepts(f64::NAN));
    }

    #[test]
    fn user_input_blank_fields_take_defaults() {
        let p = RangePredicate::from_user_input("A", Some("  "), None).unwrap();
        assert_eq!(p, RangePredicate::default());

        let p = RangePredicate::from_user_input("A", Some("2.5"), Some("")).unwrap();
        assert_eq!(p, RangePredicate::at_least(2.5));

        let err = RangePredicate::from_user_input("A", Some("abc"), None).unwrap_err();
        assert_eq!(
            err,
            DashboardError::InvalidBound {
                property: "A".into(),
                input: "abc".into()
            }
        );
    }

    #[test]
    fn parses_filter_expressions() {
        let spec: FilterSpec = "input:Gas Flow Argon=1..2.5".parse().unwrap();
        assert_eq!(spec.category, PropertyCategory::Input);
        assert_eq!(spec.name, "Gas Flow Argon");
        assert_eq!(spec.predicate, RangePredicate::new(1.0, 2.5));

        let spec: FilterSpec = "out:Yield=-3..".parse().unwrap();
        assert_eq!(spec.category, PropertyCategory::Output);
        assert_eq!(spec.predicate, RangePredicate::at_least(-3.0));

        let spec: FilterSpec = "input:Power".parse().unwrap();
        assert_eq!(spec.predicate, RangePredicate::default());
    }

    #[test]
    fn resolved_inputs_are_keyed_by_canonical_name() {
        let schema = PropertySchema::new().with_group("Gas Flow", ["Argon"]);
        let mut f = FilterSet::new();
        f.insert_input(&PropertyKey::sub("Gas Flow", "Argon"), RangePredicate::at_least(1.0));
        assert_eq!(
            f.get(PropertyCategory::Input, "Gas Flow Argon"),
            Some(&RangePredicate::at_least(1.0))
        );

        let ds = Dataset::from_experiments(vec![Experiment::new(
            "x",
            [("Gas Flow Argon", 2.0)].into_iter().collect::<PropertyMap>(),
            PropertyMap::new(),
        )])
        .unwrap();
        let mut g = FilterSet::new();
        g.push_resolved("input:Gas Flow Argon=1..", &schema, &ds).unwrap();
        assert_eq!(g, f);
    }

    #[test]
    fn unknown_property_names_are_rejected() {
        let ds = dataset();
        let schema = PropertySchema::new().with_leaf("A");
        let mut f = FilterSet::new();

        for bad in ["input:Temprature=1..", "output:A=1..", "input:B"] {
            assert!(
                matches!(f.push_resolved(bad, &schema, &ds), Err(DashboardError::InvalidFilter(_))),
                "{bad} should be rejected"
            );
            assert!(
                matches!(
                    f.push_resolved(bad, &PropertySchema::new(), &ds),
                    Err(DashboardError::InvalidFilter(_))
                ),
                "{bad} should be rejected without a schema"
            );
        }
        assert!(f.is_empty());

        f.push_resolved("input:A=1..", &schema, &ds).unwrap();
        f.push_resolved("output:B=..15", &PropertySchema::new(), &ds).unwrap();
        assert_eq!(apply_filters(&ds, &f), vec!["20230101xxxxx01"]);
    }

    #[test]
    fn rejects_malformed_filter_expressions() {
        for bad in ["Power=1..2", "sideways:Power", "input:=1..2", "input:Power=12"] {
            assert!(
                matches!(bad.parse::<FilterSpec>(), Err(DashboardError::InvalidFilter(_))),
                "{bad} should be rejected"
            );
        }
        assert!(matches!(
            "input:Power=x..".parse::<FilterSpec>(),
            Err(DashboardError::InvalidBound { .. })
        ));
    }
}
