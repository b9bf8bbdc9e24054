//! Plain-text rendering of filtered experiments and chart series.

use std::fmt::Write;

use crate::data::model::{Dataset, PropertyMap};
use crate::error::Result;
use crate::state::{ChartView, ResolvedView};

// ---------------------------------------------------------------------------
// Plain-text rendering of engine output
// ---------------------------------------------------------------------------

/// One line per ID: display name and raw ID.
///
/// An ID missing from `dataset` is a consistency error, not a skipped line.
pub fn experiment_index<S: AsRef<str>>(dataset: &Dataset, ids: &[S]) -> Result<String> {
    let mut out = String::new();
    for id in ids {
        let exp = dataset.require(id.as_ref())?;
        let _ = writeln!(out, "{exp}");
    }
    Ok(out)
}

/// Detailed listing: each experiment followed by its inputs and outputs.
pub fn experiment_details<S: AsRef<str>>(dataset: &Dataset, ids: &[S]) -> Result<String> {
    let mut out = String::new();
    for id in ids {
        let exp = dataset.require(id.as_ref())?;
        let _ = writeln!(out, "{exp}");
        write_properties(&mut out, "inputs", &exp.inputs);
        write_properties(&mut out, "outputs", &exp.outputs);
    }
    Ok(out)
}

fn write_properties(out: &mut String, title: &str, props: &PropertyMap) {
    let _ = writeln!(out, "  {title}:");
    for (name, value) in props.iter() {
        let _ = writeln!(out, "    {name}: {value}");
    }
}

/// Table of chart values: one row per property, one column per series.
pub fn chart_table(chart: &ChartView<'_>) -> String {
    let series = chart.series();
    let Some(lead) = series.first() else {
        return String::new();
    };

    let width = lead
        .view
        .inputs()
        .names()
        .chain(lead.view.outputs().names())
        .map(str::len)
        .max()
        .unwrap_or(0)
        .max("property".len());

    let mut out = String::new();
    let _ = write!(out, "{:<width$}", "property");
    for s in &series {
        let _ = write!(out, "  {:>14}", s.label);
    }
    out.push('\n');

    for (title, inputs) in [("inputs", true), ("outputs", false)] {
        let _ = writeln!(out, "[{title}]");
        for name in side(&lead.view, inputs).names() {
            let _ = write!(out, "{name:<width$}");
            for s in &series {
                match side(&s.view, inputs).get(name) {
                    Some(v) => {
                        let _ = write!(out, "  {v:>14}");
                    }
                    None => {
                        let _ = write!(out, "  {:>14}", "-");
                    }
                }
            }
            out.push('\n');
        }
    }
    out
}

fn side<'v>(view: &'v ResolvedView<'_>, inputs: bool) -> &'v PropertyMap {
    if inputs {
        view.inputs()
    } else {
        view.outputs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Experiment;
    use crate::error::DashboardError;
    use crate::state::Series;

    fn dataset() -> Dataset {
        Dataset::from_experiments(vec![Experiment::new(
            "20230315ABCDE07",
            [("Power", 12.5)].into_iter().collect(),
            [("Yield", 3.0)].into_iter().collect(),
        )])
        .unwrap()
    }

    #[test]
    fn index_lists_display_names() {
        let ds = dataset();
        assert_eq!(
            experiment_index(&ds, &["20230315ABCDE07"]).unwrap(),
            "Experiment 07 (03/15/2023) [20230315ABCDE07]\n"
        );
    }

    #[test]
    fn stale_ids_fail_the_listing() {
        let ds = dataset();
        let stale = DashboardError::DatasetConsistency {
            id: "gone".into(),
            property: None,
        };
        assert_eq!(experiment_index(&ds, &["20230315ABCDE07", "gone"]), Err(stale.clone()));
        assert_eq!(experiment_details(&ds, &["20230315ABCDE07", "gone"]), Err(stale));
    }

    #[test]
    fn details_list_inputs_and_outputs() {
        let ds = dataset();
        let text = experiment_details(&ds, &ds.ids()).unwrap();
        assert!(text.contains("  inputs:\n    Power: 12.5\n"));
        assert!(text.contains("  outputs:\n    Yield: 3\n"));
    }

    #[test]
    fn chart_table_has_a_row_per_property() {
        let ds = dataset();
        let chart = ChartView::Single(Series {
            label: "only".into(),
            view: ResolvedView::Experiment(ds.get("20230315ABCDE07").unwrap()),
        });
        let text = chart_table(&chart);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("property"));
        assert!(lines[0].ends_with("only"));
        assert_eq!(lines[1], "[inputs]");
        assert!(lines[2].starts_with("Power") && lines[2].ends_with("12.5"));
        assert_eq!(lines[3], "[outputs]");
    }
}
