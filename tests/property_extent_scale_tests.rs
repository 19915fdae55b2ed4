use std::collections::BTreeSet;

use proptest::prelude::*;
use runscope::core::{Extent, LinearScale, Value};

fn numeric_extent() -> impl Strategy<Value = Extent> {
    (-1_000_000.0f64..1_000_000.0, -1_000_000.0f64..1_000_000.0)
        .prop_map(|(a, b)| Extent::numeric(a, b))
}

fn categorical_extent() -> impl Strategy<Value = Extent> {
    prop::collection::vec("[a-e]", 1..5).prop_map(Extent::Categorical)
}

proptest! {
    #[test]
    fn empty_is_the_merge_identity(extent in prop_oneof![numeric_extent(), categorical_extent()]) {
        prop_assert_eq!(Extent::Empty.merge(extent.clone()).expect("merge"), extent.clone());
        prop_assert_eq!(extent.clone().merge(Extent::Empty).expect("merge"), extent);
    }

    #[test]
    fn numeric_merge_is_commutative_and_covers_both(a in numeric_extent(), b in numeric_extent()) {
        let ab = a.clone().merge(b.clone()).expect("merge");
        let ba = b.clone().merge(a.clone()).expect("merge");
        prop_assert_eq!(&ab, &ba);

        let (min, max) = ab.bounds().expect("numeric");
        for piece in [a, b] {
            let (lo, hi) = piece.bounds().expect("numeric");
            prop_assert!(min <= lo && hi <= max);
        }
    }

    #[test]
    fn categorical_merge_keeps_left_order_and_every_category(
        a in categorical_extent(),
        b in categorical_extent()
    ) {
        let merged = a.clone().merge(b.clone()).expect("merge");
        let categories = merged.categories().expect("categorical");
        let left = a.categories().expect("categorical");
        prop_assert_eq!(&categories[..left.len()], left);
        for category in b.categories().expect("categorical") {
            prop_assert!(categories.contains(category));
        }
    }

    #[test]
    fn numeric_merge_is_associative(
        a in numeric_extent(),
        b in numeric_extent(),
        c in numeric_extent()
    ) {
        let left = a.clone().merge(b.clone()).and_then(|ab| ab.merge(c.clone())).expect("merge");
        let right = b.merge(c).and_then(|bc| a.merge(bc)).expect("merge");
        prop_assert_eq!(left, right);
    }

    #[test]
    fn categorical_merge_is_associative(
        a in categorical_extent(),
        b in categorical_extent(),
        c in categorical_extent()
    ) {
        let left = a.clone().merge(b.clone()).and_then(|ab| ab.merge(c.clone())).expect("merge");
        let right = b.merge(c).and_then(|bc| a.merge(bc)).expect("merge");
        prop_assert_eq!(left, right);
    }

    #[test]
    fn categorical_merge_covers_the_same_set_in_either_order(
        a in categorical_extent(),
        b in categorical_extent()
    ) {
        let as_set = |extent: Extent| -> BTreeSet<String> {
            extent.categories().expect("categorical").iter().cloned().collect()
        };
        let ab = as_set(a.clone().merge(b.clone()).expect("merge"));
        let ba = as_set(b.merge(a).expect("merge"));
        prop_assert_eq!(ab, ba);
    }

    #[test]
    fn mixing_kinds_always_fails(a in numeric_extent(), b in categorical_extent()) {
        prop_assert!(a.clone().merge(b.clone()).is_err());
        prop_assert!(b.merge(a).is_err());
    }

    #[test]
    fn extent_of_values_ignores_na_and_infinities(values in prop::collection::vec(-1_000.0f64..1_000.0, 1..50)) {
        let mut with_gaps: Vec<Value> = values.iter().copied().map(Value::from).collect();
        with_gaps.push(Value::Missing);
        with_gaps.push(Value::Number(f64::NAN));
        with_gaps.push(Value::Number(f64::INFINITY));
        with_gaps.push(Value::Number(f64::NEG_INFINITY));
        let extent = Extent::from_values(with_gaps).expect("extent");
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        prop_assert_eq!(extent, Extent::numeric(min, max));
    }

    #[test]
    fn linear_scale_round_trip(
        start in -1_000_000.0f64..1_000_000.0,
        span in 0.001f64..1_000_000.0,
        factor in 0.0f64..1.0,
        height in 1.0f64..4_000.0
    ) {
        let value = start + factor * span;
        let scale = LinearScale::new((start, start + span), (height, 0.0)).expect("scale");
        let pixel = scale.to_pixel(value).expect("to pixel");
        let recovered = scale.to_domain(pixel).expect("to domain");
        prop_assert!((recovered - value).abs() <= 1e-6 * span.max(1.0));
        prop_assert!(pixel >= -1e-2 && pixel <= height + 1e-2);
    }
}
