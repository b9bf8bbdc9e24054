//! Property-based tests for the filter and aggregation engines.

use proptest::prelude::*;
use rusty_lab::{
    apply_filters, compute_average, round3, Dataset, Experiment, FilterSet, PropertyCategory,
    PropertyMap, RangePredicate,
};

// ============================================================================
// Strategies
// ============================================================================

/// Dataset with uniform properties `P0..P2` (inputs) and `Q0..Q1` (outputs).
fn arb_dataset(max_rows: usize) -> impl Strategy<Value = Dataset> {
    proptest::collection::vec(
        (
            proptest::collection::vec(-50.0f64..500.0, 3),
            proptest::collection::vec(-50.0f64..500.0, 2),
        ),
        1..=max_rows,
    )
    .prop_map(|rows| {
        let experiments = rows
            .into_iter()
            .enumerate()
            .map(|(i, (ins, outs))| {
                let inputs: PropertyMap =
                    ins.into_iter().enumerate().map(|(j, v)| (format!("P{j}"), v)).collect();
                let outputs: PropertyMap =
                    outs.into_iter().enumerate().map(|(j, v)| (format!("Q{j}"), v)).collect();
                Experiment::new(format!("20240101run{i:02}{i:02}"), inputs, outputs)
            })
            .collect();
        Dataset::from_experiments(experiments).unwrap()
    })
}

fn arb_filters() -> impl Strategy<Value = FilterSet> {
    proptest::collection::vec(
        (
            prop_oneof![Just(PropertyCategory::Input), Just(PropertyCategory::Output)],
            0usize..4,
            -100.0f64..300.0,
            0.0f64..400.0,
        ),
        0..4,
    )
    .prop_map(|preds| {
        let mut set = FilterSet::new();
        for (category, idx, min, span) in preds {
            let name = match category {
                PropertyCategory::Input => format!("P{idx}"),
                PropertyCategory::Output => format!("Q{idx}"),
            };
            set.insert(category, name, RangePredicate::new(min, min + span));
        }
        set
    })
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: results are a subsequence of the dataset IDs
    #[test]
    fn prop_filter_returns_ordered_subset(ds in arb_dataset(20), filters in arb_filters()) {
        let all = ds.ids();
        let result = apply_filters(&ds, &filters);
        let mut cursor = all.iter();
        for id in &result {
            prop_assert!(cursor.any(|a| a == id), "{} out of order or foreign", id);
        }
    }

    /// Property: empty filter set is the identity
    #[test]
    fn prop_empty_filter_returns_all(ds in arb_dataset(20)) {
        prop_assert_eq!(apply_filters(&ds, &FilterSet::new()), ds.ids());
    }

    /// Property: filtering is deterministic
    #[test]
    fn prop_filter_is_idempotent(ds in arb_dataset(20), filters in arb_filters()) {
        prop_assert_eq!(apply_filters(&ds, &filters), apply_filters(&ds, &filters));
    }

    /// Property: every returned experiment satisfies every predicate
    #[test]
    fn prop_results_satisfy_predicates(ds in arb_dataset(20), filters in arb_filters()) {
        for id in apply_filters(&ds, &filters) {
            prop_assert!(filters.matches(ds.get(&id).unwrap()));
        }
    }

    /// Property: the mean does not depend on ID order
    #[test]
    fn prop_average_is_order_independent(ds in arb_dataset(12), seed in any::<u64>()) {
        let ids = ds.ids();
        let mut reversed = ids.clone();
        reversed.reverse();
        let mut rotated = ids.clone();
        rotated.rotate_left((seed as usize) % ids.len());
        let forward = compute_average(&ds, &ids).unwrap();
        prop_assert_eq!(&forward, &compute_average(&ds, &reversed).unwrap());
        prop_assert_eq!(&forward, &compute_average(&ds, &rotated).unwrap());
    }

    /// Property: averaging one experiment returns its own rounded values
    #[test]
    fn prop_singleton_average_is_identity(ds in arb_dataset(8)) {
        let exp = &ds.experiments()[0];
        let view = compute_average(&ds, &[exp.id.clone()]).unwrap();
        for (name, value) in exp.inputs.iter() {
            prop_assert_eq!(view.inputs.get(name), Some(round3(value)));
        }
        for (name, value) in exp.outputs.iter() {
            prop_assert_eq!(view.outputs.get(name), Some(round3(value)));
        }
    }

    /// Property: averages carry at most three decimals
    #[test]
    fn prop_average_is_rounded(ds in arb_dataset(12)) {
        let view = compute_average(&ds, &ds.ids()).unwrap();
        for (_, value) in view.inputs.iter().chain(view.outputs.iter()) {
            prop_assert_eq!(round3(value), value);
        }
    }
}
