use thiserror::Error;

/// Result alias used by every engine entry point.
pub type Result<T> = std::result::Result<T, DashboardError>;

/// Errors surfaced by the dashboard engine.
///
/// None of these cross the event boundary as a panic: each public operation
/// returns either a value or one of these variants.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DashboardError {
    /// Fetching or parsing the dataset failed. Fatal for initialisation.
    #[error("failed to load dataset: {0}")]
    DataLoad(String),

    /// An engine operation was invoked before a dataset was installed.
    #[error("no dataset loaded yet")]
    NotLoaded,

    /// An average was requested over zero experiments.
    #[error("cannot average an empty selection")]
    EmptySelection,

    /// An ID (or one of its properties) is not present in the loaded dataset.
    /// Indicates a stale ID list on the caller side.
    #[error("{}", describe_consistency(.id, .property.as_deref()))]
    DatasetConsistency {
        id: String,
        property: Option<String>,
    },

    /// A choice slot named an experiment that is not in the dataset.
    #[error("unknown experiment: {0}")]
    UnknownExperiment(String),

    /// A range bound typed by the user is not a number.
    #[error("invalid bound {input:?} for property {property:?}")]
    InvalidBound { property: String, input: String },

    /// A filter expression could not be parsed.
    #[error("invalid filter: {0}")]
    InvalidFilter(String),

    /// Only slots 0 and 1 exist.
    #[error("invalid choice slot {0} (expected 0 or 1)")]
    InvalidSlot(usize),
}

fn describe_consistency(id: &str, property: Option<&str>) -> String {
    match property {
        Some(p) => format!("experiment {id:?} has no property {p:?}"),
        None => format!("experiment {id:?} is not in the loaded dataset"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consistency_message_names_property_when_known() {
        let e = DashboardError::DatasetConsistency {
            id: "x".into(),
            property: Some("Power".into()),
        };
        assert_eq!(e.to_string(), r#"experiment "x" has no property "Power""#);

        let e = DashboardError::DatasetConsistency {
            id: "x".into(),
            property: None,
        };
        assert_eq!(e.to_string(), r#"experiment "x" is not in the loaded dataset"#);
    }
}
