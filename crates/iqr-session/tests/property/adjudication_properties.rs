use std::sync::Arc;

use iqr_core::descriptor::{DescriptorElement, DescriptorSet};
use iqr_session::{AdjudicationStore, IqrSession};
use iqr_test_fixtures::{line_descriptors, LinearNeighborIndex, ScriptedRanker};
use proptest::prelude::*;

const UNIVERSE: usize = 8;

fn universe() -> Vec<Arc<DescriptorElement>> {
    line_descriptors("u", UNIVERSE)
}

/// Members of `universe` selected by the bits of `mask`.
fn subset(universe: &[Arc<DescriptorElement>], mask: u8) -> DescriptorSet {
    universe
        .iter()
        .enumerate()
        .filter(|(i, _)| mask & (1 << i) != 0)
        .map(|(_, d)| Arc::clone(d))
        .collect()
}

#[derive(Debug, Clone)]
enum Op {
    Adjudicate(u8, u8, u8, u8),
    External(u8, u8),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (any::<u8>(), any::<u8>(), any::<u8>(), any::<u8>())
            .prop_map(|(a, b, c, d)| Op::Adjudicate(a, b, c, d)),
        (any::<u8>(), any::<u8>()).prop_map(|(a, b)| Op::External(a, b)),
    ]
}

proptest! {
    #[test]
    fn adjudication_sets_stay_disjoint(ops in prop::collection::vec(op_strategy(), 0..30)) {
        let universe = universe();
        let mut store = AdjudicationStore::new();
        for op in ops {
            match op {
                Op::Adjudicate(np, nn, up, un) => {
                    store.adjudicate(
                        &subset(&universe, np),
                        &subset(&universe, nn),
                        &subset(&universe, up),
                        &subset(&universe, un),
                    );
                }
                Op::External(p, n) => {
                    store.set_external(&subset(&universe, p), &subset(&universe, n));
                }
            }
            prop_assert!(store.is_consistent());
        }
    }

    #[test]
    fn conflicting_new_labels_cancel(
        start_pos in any::<u8>(),
        start_neg in any::<u8>(),
        np in any::<u8>(),
        nn in any::<u8>(),
    ) {
        let universe = universe();
        let mut store = AdjudicationStore::new();
        store.adjudicate(
            &subset(&universe, start_pos & !start_neg),
            &subset(&universe, start_neg),
            &DescriptorSet::new(),
            &DescriptorSet::new(),
        );
        store.adjudicate(
            &subset(&universe, np),
            &subset(&universe, nn),
            &DescriptorSet::new(),
            &DescriptorSet::new(),
        );

        for d in subset(&universe, np & nn).iter() {
            prop_assert!(!store.positive.contains(d.uid()));
            prop_assert!(!store.negative.contains(d.uid()));
        }
        for d in subset(&universe, np & !nn).iter() {
            prop_assert!(store.positive.contains(d.uid()));
        }
        for d in subset(&universe, nn & !np).iter() {
            prop_assert!(store.negative.contains(d.uid()));
        }
    }

    #[test]
    fn external_negative_wins_overlap(p in any::<u8>(), n in any::<u8>()) {
        let universe = universe();
        let mut store = AdjudicationStore::new();
        store.set_external(&subset(&universe, p), &subset(&universe, n));
        prop_assert_eq!(store.external_negative.clone(), subset(&universe, n));
        prop_assert_eq!(store.external_positive.clone(), subset(&universe, p & !n));
    }

    #[test]
    fn growth_is_monotonic_and_idempotent(masks in prop::collection::vec(1u8..=255, 1..6), fanout in 1usize..5) {
        let universe = universe();
        let index = LinearNeighborIndex::new(universe.clone());
        let session = IqrSession::new(fanout);
        let mut previous = DescriptorSet::new();

        for mask in masks {
            let positives: Vec<_> = subset(&universe, mask).iter().cloned().collect();
            session.adjudicate(&positives, &[], &[], &[]);
            session.grow(&index).unwrap();
            let members = session.working_set();
            prop_assert!(previous.iter().all(|d| members.contains(d.uid())));

            session.grow(&index).unwrap();
            prop_assert_eq!(session.working_set(), members.clone());
            previous = members;
        }
    }

    #[test]
    fn ordered_results_never_increase(scores in prop::collection::vec(0.0f64..1.0, UNIVERSE)) {
        let universe = universe();
        let index = LinearNeighborIndex::new(universe.clone());
        let session = IqrSession::new(UNIVERSE);
        session.adjudicate(&[Arc::clone(&universe[0])], &[], &[], &[]);
        session.grow(&index).unwrap();

        let named: Vec<(String, f64)> = universe
            .iter()
            .zip(&scores)
            .map(|(d, s)| (d.uid().to_string(), *s))
            .collect();
        let table: Vec<(&str, f64)> = named.iter().map(|(u, s)| (u.as_str(), *s)).collect();
        session.refine(&ScriptedRanker::new(&table)).unwrap();

        let ordered = session.ordered_results();
        prop_assert_eq!(ordered.len(), UNIVERSE);
        prop_assert!(ordered.windows(2).all(|w| w[0].score >= w[1].score));
    }
}
