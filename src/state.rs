//! Dashboard state: the filtered ID list, the two comparison slots, and
//! their resolution into chart input.

use std::fmt;
use std::str::FromStr;

use crate::data::aggregate::{compute_average, AggregateView};
use crate::data::filter::{apply_filters, FilterSet};
use crate::data::model::{display_name, Dataset, Experiment, PropertyMap, FILTERED_AVERAGE};
use crate::error::{DashboardError, Result};

/// Number of independent comparison slots.
pub const CHOICE_SLOTS: usize = 2;

// ---------------------------------------------------------------------------
// Choices and their resolution
// ---------------------------------------------------------------------------

/// What one comparison slot is showing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Choice {
    #[default]
    Empty,
    /// Average over the current filtered set.
    FilteredAverage,
    Experiment(String),
}

impl FromStr for Choice {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        Ok(match s {
            "" => Choice::Empty,
            FILTERED_AVERAGE | "avg" => Choice::FilteredAverage,
            id => Choice::Experiment(id.to_string()),
        })
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Choice::Empty => Ok(()),
            Choice::FilteredAverage => f.write_str(FILTERED_AVERAGE),
            Choice::Experiment(id) => f.write_str(id),
        }
    }
}

/// A chart input: either an aggregate or one experiment's own values.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedView<'a> {
    Aggregate(AggregateView),
    Experiment(&'a Experiment),
}

impl ResolvedView<'_> {
    pub fn inputs(&self) -> &PropertyMap {
        match self {
            ResolvedView::Aggregate(view) => &view.inputs,
            ResolvedView::Experiment(exp) => &exp.inputs,
        }
    }

    pub fn outputs(&self) -> &PropertyMap {
        match self {
            ResolvedView::Aggregate(view) => &view.outputs,
            ResolvedView::Experiment(exp) => &exp.outputs,
        }
    }
}

/// One labelled bar series.
#[derive(Debug, Clone, PartialEq)]
pub struct Series<'a> {
    pub label: String,
    pub view: ResolvedView<'a>,
}

/// What the renderer should draw.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartView<'a> {
    Single(Series<'a>),
    Comparison { first: Series<'a>, second: Series<'a> },
}

impl<'a> ChartView<'a> {
    /// Series in slot order.
    pub fn series(&self) -> Vec<&Series<'a>> {
        match self {
            ChartView::Single(s) => vec![s],
            ChartView::Comparison { first, second } => vec![first, second],
        }
    }

    pub fn is_comparison(&self) -> bool {
        matches!(self, ChartView::Comparison { .. })
    }
}

/// Resolve a single choice against the dataset.
///
/// `Empty` resolves to `None`; an experiment ID must exist in `dataset`.
pub fn resolve_choice<'a>(
    dataset: &'a Dataset,
    filtered_ids: &[String],
    choice: &Choice,
) -> Result<Option<ResolvedView<'a>>> {
    match choice {
        Choice::Empty => Ok(None),
        Choice::FilteredAverage => {
            compute_average(dataset, filtered_ids).map(|v| Some(ResolvedView::Aggregate(v)))
        }
        Choice::Experiment(id) => dataset
            .require(id)
            .map(|exp| Some(ResolvedView::Experiment(exp))),
    }
}

fn series_for<'a>(
    dataset: &'a Dataset,
    filtered_ids: &[String],
    choice: &Choice,
) -> Result<Option<Series<'a>>> {
    let label = match choice {
        Choice::Experiment(id) => display_name(id),
        _ => FILTERED_AVERAGE.to_string(),
    };
    Ok(resolve_choice(dataset, filtered_ids, choice)?.map(|view| Series { label, view }))
}

/// Decide between a comparison and a single series for the two slots.
///
/// Two distinct resolved choices compare side by side. Otherwise the first
/// non-empty slot is shown alone, falling back to the filtered average.
pub fn chart_view<'a>(dataset: &'a Dataset, selection: &SelectionState) -> Result<ChartView<'a>> {
    let [c1, c2] = &selection.choices;
    let ids = &selection.filtered_ids;
    let first = series_for(dataset, ids, c1)?;
    let second = series_for(dataset, ids, c2)?;

    Ok(match (first, second) {
        (Some(first), Some(second)) if c1 != c2 => ChartView::Comparison { first, second },
        (Some(series), _) | (None, Some(series)) => ChartView::Single(series),
        (None, None) => ChartView::Single(Series {
            label: FILTERED_AVERAGE.to_string(),
            view: ResolvedView::Aggregate(compute_average(dataset, ids)?),
        }),
    })
}

// ---------------------------------------------------------------------------
// Selection state
// ---------------------------------------------------------------------------

/// Current filter result plus the two comparison slots.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionState {
    /// IDs passing the last successful filter apply, in dataset order.
    pub filtered_ids: Vec<String>,
    pub choices: [Choice; CHOICE_SLOTS],
}

impl SelectionState {
    /// Everything visible, nothing chosen.
    pub fn for_dataset(dataset: &Dataset) -> Self {
        Self {
            filtered_ids: dataset.ids(),
            choices: Default::default(),
        }
    }
}

/// Result of a filter apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOutcome {
    /// No predicates were given; the filter was cleared and all experiments shown.
    Cleared(usize),
    /// The filtered list was replaced with this many IDs.
    Matched(usize),
    /// Nothing matched; the previous filtered list is kept.
    NoMatches,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Dashboard state, independent of rendering.
#[derive(Debug, Default)]
pub struct AppState {
    /// Loaded dataset (None until the one-time load completes).
    dataset: Option<Dataset>,

    /// Predicates of the last successful apply.
    pub filters: FilterSet,

    pub selection: SelectionState,

    /// Notice for the user about the last action, if any.
    pub status_message: Option<String>,
}

impl AppState {
    /// Ingest a freshly loaded dataset and reset filters and choices.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        self.selection = SelectionState::for_dataset(&dataset);
        self.filters = FilterSet::default();
        self.dataset = Some(dataset);
        self.status_message = None;
    }

    pub fn dataset(&self) -> Result<&Dataset> {
        self.dataset.as_ref().ok_or(DashboardError::NotLoaded)
    }

    pub fn is_loaded(&self) -> bool {
        self.dataset.is_some()
    }

    pub fn filtered_ids(&self) -> Result<&[String]> {
        self.dataset()?;
        Ok(&self.selection.filtered_ids)
    }

    /// Replace the filtered list with the experiments matching `filters`.
    ///
    /// An empty filter set clears filtering. When nothing matches, the
    /// previous list and filters stay in place and a notice is set.
    pub fn apply_filters(&mut self, filters: FilterSet) -> Result<FilterOutcome> {
        let dataset = self.dataset.as_ref().ok_or(DashboardError::NotLoaded)?;

        if filters.is_empty() {
            self.selection.filtered_ids = dataset.ids();
            self.filters = filters;
            self.status_message = None;
            log::info!("Filters cleared, showing all {} experiments", dataset.len());
            return Ok(FilterOutcome::Cleared(dataset.len()));
        }

        let ids = apply_filters(dataset, &filters);
        if ids.is_empty() {
            log::warn!("No experiments match {} filter(s)", filters.len());
            self.status_message = Some("No matching experiments".to_string());
            return Ok(FilterOutcome::NoMatches);
        }

        log::info!("{} of {} experiments match", ids.len(), dataset.len());
        let n = ids.len();
        self.selection.filtered_ids = ids;
        self.filters = filters;
        self.status_message = None;
        Ok(FilterOutcome::Matched(n))
    }

    /// Set one comparison slot. Experiment IDs must be loaded.
    pub fn set_choice(&mut self, slot: usize, choice: Choice) -> Result<()> {
        let dataset = self.dataset()?;
        if slot >= CHOICE_SLOTS {
            return Err(DashboardError::InvalidSlot(slot));
        }
        if let Choice::Experiment(id) = &choice {
            if !dataset.contains(id) {
                return Err(DashboardError::UnknownExperiment(id.clone()));
            }
        }
        self.selection.choices[slot] = choice;
        Ok(())
    }

    /// Resolve the current slots into chart input. Recomputed on every call.
    pub fn chart_view(&self) -> Result<ChartView<'_>> {
        chart_view(self.dataset()?, &self.selection)
    }
}
