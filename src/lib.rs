//! Filtering and aggregation engine for an experiment dashboard.
//!
//! A dataset of experiments (numeric `inputs` and `outputs` keyed by
//! property name) is loaded once, narrowed with inclusive range predicates,
//! and summarised as rounded per-property means for one- or two-series
//! bar charts.

pub mod config;
pub mod data;
pub mod error;
pub mod report;
pub mod state;

pub use data::aggregate::{compute_average, round3, AggregateView};
pub use data::filter::{apply_filters, FilterSet, PropertyCategory, RangePredicate};
pub use data::model::{display_name, Dataset, Experiment, PropertyMap, FILTERED_AVERAGE};
pub use data::schema::{PropertyKey, PropertyKind, PropertySchema};
pub use error::{DashboardError, Result};
pub use state::{AppState, ChartView, Choice, FilterOutcome, SelectionState};
