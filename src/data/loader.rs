use std::path::Path;

use anyhow::{Context, Result, bail};
use serde_json::{Map, Value as JsonValue};

use crate::error::DashboardError;

use super::model::{Dataset, Experiment, PropertyMap};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the experiment dataset once.  Dispatch by source form.
///
/// Supported sources:
/// * `http://…` / `https://…` – fetched with a single GET; non-2xx is fatal
/// * anything else            – read as a local file path
///
/// Any failure is reported as [`DashboardError::DataLoad`] and is not retried.
pub fn load_source(source: &str) -> Result<Dataset, DashboardError> {
    let loaded = if is_url(source) {
        fetch_text(source).and_then(|text| parse_dataset(&text))
    } else {
        load_file(Path::new(source))
    };
    loaded.map_err(|e| DashboardError::DataLoad(format!("{source}: {e:#}")))
}

/// Load a dataset from a local JSON file.
pub fn load_file(path: &Path) -> Result<Dataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    parse_dataset(&text)
}

fn is_url(source: &str) -> bool {
    let lower = source.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

// ---------------------------------------------------------------------------
// HTTP fetch
// ---------------------------------------------------------------------------

fn fetch_text(url: &str) -> Result<String> {
    log::info!("Fetching dataset from {url}");
    let response = reqwest::blocking::get(url).context("sending request")?;
    let status = response.status();
    if !status.is_success() {
        bail!("server responded with {status}");
    }
    response.text().context("reading response body")
}

// ---------------------------------------------------------------------------
// JSON parsing
// ---------------------------------------------------------------------------

/// Expected JSON schema (object of objects, keyed by experiment ID):
///
/// ```json
/// {
///   "20230315ABCDE07": {
///     "inputs":  { "Temperature": 450.0, "Gas Flow Argon": 12.5 },
///     "outputs": { "Thickness": 102.3 }
///   },
///   ...
/// }
/// ```
///
/// Key order is preserved and becomes the dataset order.
pub fn parse_dataset(text: &str) -> Result<Dataset> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;

    let records = root
        .as_object()
        .context("Expected top-level JSON object keyed by experiment ID")?;

    let mut experiments = Vec::with_capacity(records.len());

    for (id, rec) in records {
        let obj = rec
            .as_object()
            .with_context(|| format!("Experiment {id} is not a JSON object"))?;

        let inputs = json_object_to_properties(obj.get("inputs"), id, "inputs")?;
        let outputs = json_object_to_properties(obj.get("outputs"), id, "outputs")?;

        experiments.push(Experiment::new(id.clone(), inputs, outputs));
    }

    Ok(Dataset::from_experiments(experiments)?)
}

fn json_object_to_properties(val: Option<&JsonValue>, id: &str, side: &str) -> Result<PropertyMap> {
    let obj: &Map<String, JsonValue> = val
        .and_then(|v| v.as_object())
        .with_context(|| format!("Experiment {id}: missing or invalid '{side}' object"))?;

    obj.iter()
        .map(|(name, v)| {
            v.as_f64()
                .map(|value| (name.as_str(), value))
                .with_context(|| format!("Experiment {id}, {side}.{name}: not a number"))
        })
        .collect()
}
