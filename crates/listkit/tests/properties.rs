//! Property tests for filter composition and selection consistency.

use proptest::prelude::*;

use listkit::{ChoiceMode, ListConfig, ListModel};

/// Distinct words; the `#n` suffix never matches a generated query.
fn words() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec("[abc]{1,4}", 0..12).prop_map(|words| {
        words
            .into_iter()
            .enumerate()
            .map(|(i, word)| format!("{}#{}", word, i))
            .collect()
    })
}

fn queries() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec("[abc]{1,2}", 0..4)
}

fn model_of(words: &[String]) -> ListModel<String> {
    let mut model = ListModel::filterable();
    model.add_all(words.iter().cloned()).unwrap();
    model
}

#[derive(Debug, Clone)]
enum Op {
    Add(String),
    Remove(usize),
    Enable(usize, bool),
    Select(usize),
    Trigger(usize),
    Filter(String),
    Reset(String),
    ResetAll,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        "[abc]{1,3}".prop_map(Op::Add),
        any::<usize>().prop_map(Op::Remove),
        (any::<usize>(), any::<bool>()).prop_map(|(i, on)| Op::Enable(i, on)),
        any::<usize>().prop_map(Op::Select),
        any::<usize>().prop_map(Op::Trigger),
        "[abc]{1,2}".prop_map(Op::Filter),
        "[abc]{1,2}".prop_map(Op::Reset),
        Just(Op::ResetAll),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: The visible subset is the intersection of all active filters,
    /// whatever order they were applied in.
    #[test]
    fn property_filters_compose_as_intersection(words in words(), queries in queries()) {
        let mut forward = model_of(&words);
        for query in &queries {
            forward.apply_filter(query, 0, None).unwrap();
        }
        let mut backward = model_of(&words);
        for query in queries.iter().rev() {
            backward.apply_filter(query, 0, None).unwrap();
        }

        let expected: Vec<usize> = words
            .iter()
            .enumerate()
            .filter(|(_, word)| queries.iter().all(|q| word.contains(q.as_str())))
            .map(|(i, _)| i)
            .collect();
        prop_assert_eq!(forward.visible_indices(), expected.as_slice());
        prop_assert_eq!(backward.visible_indices(), expected.as_slice());
    }

    /// PROPERTY: Interleaving applies with single-key resets leaves exactly
    /// the intersection of the keys still active.
    #[test]
    fn property_apply_and_reset_compose_as_intersection(
        words in words(),
        steps in proptest::collection::vec(("[abc]{1,2}", any::<bool>()), 0..16),
    ) {
        let mut model = model_of(&words);
        let mut active: Vec<String> = Vec::new();
        for (query, apply) in steps {
            if apply {
                let applied = model.apply_filter(&query, 0, None).unwrap().is_some();
                prop_assert_eq!(applied, !active.contains(&query));
                if applied {
                    active.push(query);
                }
            } else {
                let reset = model.reset_filter(&query, 0);
                prop_assert_eq!(reset, active.contains(&query));
                active.retain(|q| *q != query);
            }

            let expected: Vec<usize> = words
                .iter()
                .enumerate()
                .filter(|(_, word)| active.iter().all(|q| word.contains(q.as_str())))
                .map(|(i, _)| i)
                .collect();
            prop_assert_eq!(model.visible_indices(), expected.as_slice());
            prop_assert_eq!(model.active_filters().len(), active.len());
        }
    }

    /// PROPERTY: Re-applying an active filter changes nothing.
    #[test]
    fn property_reapplying_filter_is_idempotent(words in words(), query in "[abc]{1,2}") {
        let mut model = model_of(&words);
        model.apply_filter(&query, 0, None).unwrap();
        let visible = model.visible_indices().to_vec();

        prop_assert_eq!(model.apply_filter(&query, 0, None).unwrap(), None);
        prop_assert_eq!(model.visible_indices(), visible.as_slice());
        prop_assert_eq!(model.active_filters().len(), 1);
    }

    /// PROPERTY: Resetting every filter restores the full master order.
    #[test]
    fn property_reset_restores_master_order(words in words(), queries in queries()) {
        let mut model = model_of(&words);
        for query in &queries {
            model.apply_filter(query, 0, None).unwrap();
        }

        model.reset_all_filters();

        let all: Vec<usize> = (0..words.len()).collect();
        prop_assert!(!model.is_filtered());
        prop_assert_eq!(model.visible_indices(), all.as_slice());
        prop_assert_eq!(model.all_items(), words.iter().collect::<Vec<_>>());
    }

    /// PROPERTY: Single choice never holds more than one selection, and only
    /// enabled items are ever selected.
    #[test]
    fn property_single_choice_stays_consistent(
        words in words(),
        adapt in any::<bool>(),
        ops in proptest::collection::vec(op(), 0..24),
    ) {
        let config = ListConfig {
            choice_mode: ChoiceMode::Single,
            adapt_selection_automatically: adapt,
            allow_duplicates: true,
            ..ListConfig::default()
        };
        let mut model = ListModel::filterable();
        model.apply_config(&config).unwrap();
        model.add_all(words).unwrap();

        for op in ops {
            let len = model.len();
            match op {
                Op::Add(word) => {
                    model.add(word).unwrap();
                }
                Op::Remove(i) if len > 0 => {
                    model.remove_at(i % len).unwrap();
                }
                Op::Enable(i, on) if len > 0 => {
                    model.set_enabled(i % len, on).unwrap();
                }
                Op::Select(i) if len > 0 => {
                    model.select(i % len).unwrap();
                }
                Op::Trigger(i) if len > 0 => {
                    model.trigger_selection(i % len).unwrap();
                }
                Op::Filter(query) => {
                    model.apply_filter(&query, 0, None).unwrap();
                }
                Op::Reset(query) => {
                    model.reset_filter(&query, 0);
                }
                Op::ResetAll => {
                    model.reset_all_filters();
                }
                _ => {}
            }

            prop_assert!(model.selected_count() <= 1);
            for index in model.selected_indices() {
                prop_assert!(model.is_enabled(index).unwrap());
            }
        }
    }
}
