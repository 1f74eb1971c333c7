//! Property-based tests for node derivation and classification.

use geo::Coord;
use proptest::prelude::*;
use waymark_core::{
    Classification, NetworkCategory, NodeIdAllocator, Point, SynthesisRequest, TagList, classify,
    synthesize,
};

const BICYCLE_CHAIN: [&str; 4] = ["icn_ref", "ncn_ref", "rcn_ref", "lcn_ref"];

fn bicycle_references(outcomes: &[Classification]) -> Vec<&str> {
    outcomes
        .iter()
        .filter_map(|outcome| match outcome {
            Classification::Network(SynthesisRequest {
                category: NetworkCategory::Bicycle,
                reference,
            }) => Some(reference.as_str()),
            _ => None,
        })
        .collect()
}

proptest! {
    #[test]
    fn derived_ids_are_contiguous_from_start(start in 1_i64..1_000_000_000_000, count in 1_usize..64) {
        let junction = Point::new(
            1,
            Coord { x: 7.0, y: 52.0 },
            TagList::from_iter([("network:type", "node_network"), ("rcn_ref", "53")]),
        );
        let request = SynthesisRequest {
            category: NetworkCategory::Bicycle,
            reference: "53".into(),
        };
        let mut ids = NodeIdAllocator::new(start).expect("positive start");
        let mut expected = start;
        for _ in 0..count {
            let derived = synthesize(&junction, &request, &mut ids).expect("identifier available");
            prop_assert_eq!(derived.id, expected);
            expected += 1;
        }
        prop_assert_eq!(ids.allocated(), count as u64);
    }

    #[test]
    fn bicycle_chain_uses_first_present_key(present in proptest::collection::vec(any::<bool>(), 4)) {
        let mut tags = TagList::from_iter([("network:type", "node_network")]);
        // Insert in reverse so tag order cannot influence precedence.
        for (index, key) in BICYCLE_CHAIN.iter().enumerate().rev() {
            if present.get(index).copied().unwrap_or(false) {
                tags.push(*key, format!("ref-{index}"));
            }
        }
        let outcomes = classify(&tags);
        let references = bicycle_references(&outcomes);
        let first_present = present.iter().position(|flag| *flag);
        match first_present {
            Some(index) => {
                let expected = format!("ref-{index}");
                prop_assert_eq!(references, vec![expected.as_str()]);
            }
            None => prop_assert!(references.is_empty()),
        }
    }
}
