use std::io::Write;

use anyhow::{Context, Result};

use crate::data::model::{display_name, Dataset};
use crate::state::ChartView;

// ---------------------------------------------------------------------------
// Experiment table
// ---------------------------------------------------------------------------

/// Write the listed experiments as CSV, one row per ID in the given order.
///
/// Columns: `id,name,<inputs…>,<outputs…>`, named after the first experiment
/// of the dataset. Missing values are left blank.
pub fn write_experiments_csv<W: Write, S: AsRef<str>>(
    writer: W,
    dataset: &Dataset,
    ids: &[S],
) -> Result<()> {
    let input_names = dataset.input_names();
    let output_names = dataset.output_names();

    let mut out = csv::Writer::from_writer(writer);
    let header = ["id", "name"]
        .into_iter()
        .map(str::to_string)
        .chain(input_names.iter().cloned())
        .chain(output_names.iter().cloned());
    out.write_record(header).context("writing CSV header")?;

    for id in ids {
        let exp = dataset.require(id.as_ref())?;
        let mut row = vec![exp.id.clone(), display_name(&exp.id)];
        row.extend(input_names.iter().map(|n| cell(exp.inputs.get(n))));
        row.extend(output_names.iter().map(|n| cell(exp.outputs.get(n))));
        out.write_record(&row)
            .with_context(|| format!("writing CSV row for {}", exp.id))?;
    }
    out.flush().context("flushing CSV output")?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Chart series
// ---------------------------------------------------------------------------

/// Write the chart series as CSV: `category,property,<series labels…>`.
///
/// Property rows follow the first series, inputs before outputs.
pub fn write_chart_csv<W: Write>(writer: W, chart: &ChartView<'_>) -> Result<()> {
    let series = chart.series();
    let mut out = csv::Writer::from_writer(writer);

    let header = ["category", "property"]
        .into_iter()
        .map(str::to_string)
        .chain(series.iter().map(|s| s.label.clone()));
    out.write_record(header).context("writing CSV header")?;

    let Some(lead) = series.first() else {
        return Ok(());
    };
    for (category, names) in [
        ("input", lead.view.inputs().names().collect::<Vec<_>>()),
        ("output", lead.view.outputs().names().collect::<Vec<_>>()),
    ] {
        for name in names {
            let mut row = vec![category.to_string(), name.to_string()];
            row.extend(series.iter().map(|s| {
                let side = if category == "input" {
                    s.view.inputs()
                } else {
                    s.view.outputs()
                };
                cell(side.get(name))
            }));
            out.write_record(&row).context("writing CSV row")?;
        }
    }
    out.flush().context("flushing CSV output")?;
    Ok(())
}

fn cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
