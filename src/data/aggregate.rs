//! Per-property means over a subset of experiments, rounded to three places.

use crate::error::{DashboardError, Result};

use super::filter::PropertyCategory;
use super::model::{Dataset, Experiment, PropertyMap};

/// Per-property means over a set of experiments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateView {
    pub inputs: PropertyMap,
    pub outputs: PropertyMap,
}

/// Round to three decimal places.
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Average every input and output property across `ids`.
///
/// Property names are taken from the first listed experiment; every other
/// experiment must carry the same names. Values are summed in dataset order
/// so the rounded mean does not depend on the order of `ids`. Means are
/// rounded with [`round3`].
pub fn compute_average<S: AsRef<str>>(dataset: &Dataset, ids: &[S]) -> Result<AggregateView> {
    let mut positions = ids
        .iter()
        .map(|id| {
            let id = id.as_ref();
            dataset
                .position(id)
                .ok_or_else(|| DashboardError::DatasetConsistency {
                    id: id.to_string(),
                    property: None,
                })
        })
        .collect::<Result<Vec<usize>>>()?;

    let Some(&lead) = positions.first() else {
        return Err(DashboardError::EmptySelection);
    };
    let first = &dataset.experiments()[lead];

    positions.sort_unstable();
    let experiments: Vec<&Experiment> = positions
        .iter()
        .map(|&pos| &dataset.experiments()[pos])
        .collect();

    Ok(AggregateView {
        inputs: mean_of(&experiments, &first.inputs, PropertyCategory::Input)?,
        outputs: mean_of(&experiments, &first.outputs, PropertyCategory::Output)?,
    })
}

fn mean_of(
    experiments: &[&Experiment],
    template: &PropertyMap,
    category: PropertyCategory,
) -> Result<PropertyMap> {
    let count = experiments.len() as f64;
    let mut means = PropertyMap::new();
    for name in template.names() {
        let mut sum = 0.0;
        for exp in experiments {
            let side = match category {
                PropertyCategory::Input => &exp.inputs,
                PropertyCategory::Output => &exp.outputs,
            };
            sum += side.get(name).ok_or_else(|| DashboardError::DatasetConsistency {
                id: exp.id.clone(),
                property: Some(name.to_string()),
            })?;
        }
        means.insert(name, round3(sum / count));
    }
    Ok(means)
}
