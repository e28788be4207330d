//! Property tests for the per-layer transforms.

use compositor::{
    apply_gamma, compose, evaluate_layer, invert, normalize, Channel, ClipBounds,
    CompositeError, CompositeRecipe, LayerRecipe, SourceExpression,
};
use proptest::prelude::*;
use sat_common::{BandArray, BandSet};

/// Any finite f64 of either sign, mixed with values at physical scales.
fn finite() -> impl Strategy<Value = f64> {
    use prop::num::f64::{NEGATIVE, NORMAL, POSITIVE, ZERO};
    prop_oneof![
        -1e3..1e3f64,
        POSITIVE | NEGATIVE | NORMAL | ZERO,
    ]
}

fn bounds() -> impl Strategy<Value = ClipBounds> {
    (finite(), finite())
        .prop_filter("bounds must differ", |(a, b)| a / 2.0 != b / 2.0)
        .prop_map(|(a, b)| ClipBounds::new(a, b))
}

proptest! {
    #[test]
    fn prop_normalized_values_are_in_unit_range(
        values in prop::collection::vec(finite(), 1..64),
        clip in bounds(),
    ) {
        let mut values = values;
        normalize(Channel::Red, &mut values, clip).unwrap();
        for v in values {
            prop_assert!((0.0..=1.0).contains(&v), "{} escaped [0, 1]", v);
        }
    }

    #[test]
    fn prop_unit_clip_is_idempotent(values in prop::collection::vec(0.0..=1.0f64, 1..64)) {
        let mut once = values.clone();
        normalize(Channel::Green, &mut once, ClipBounds::unit()).unwrap();
        prop_assert_eq!(&once, &values);

        let mut twice = once.clone();
        normalize(Channel::Green, &mut twice, ClipBounds::unit()).unwrap();
        prop_assert_eq!(twice, once);
    }

    #[test]
    fn prop_gamma_keeps_unit_range(
        values in prop::collection::vec(0.0..=1.0f64, 1..64),
        gamma in 0.1..10.0f64,
    ) {
        let mut values = values;
        apply_gamma(&mut values, gamma);
        for v in values {
            prop_assert!((0.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn prop_gamma_one_is_identity(values in prop::collection::vec(-1e6..1e6f64, 1..32)) {
        let bands: BandSet = [BandArray::new(9, 1, values.len(), values.clone()).unwrap()]
            .into_iter()
            .collect();
        let layer = LayerRecipe::new(SourceExpression::band(9)).with_gamma(1.0);
        let out = evaluate_layer(Channel::Blue, &layer, &bands).unwrap();
        prop_assert_eq!(out, values);
    }

    #[test]
    fn prop_double_inversion_restores_values(values in prop::collection::vec(0.0..=1.0f64, 1..64)) {
        let mut twice = values.clone();
        invert(&mut twice);
        invert(&mut twice);
        for (t, v) in twice.iter().zip(&values) {
            prop_assert!((t - v).abs() <= f64::EPSILON, "{} vs {}", t, v);
        }
    }

    #[test]
    fn prop_compose_requires_equal_shapes(
        rows_a in 1usize..6, cols_a in 1usize..6,
        rows_b in 1usize..6, cols_b in 1usize..6,
    ) {
        let bands: BandSet = [
            BandArray::filled(1, rows_a, cols_a, 0.5).unwrap(),
            BandArray::filled(2, rows_b, cols_b, 0.5).unwrap(),
        ]
        .into_iter()
        .collect();
        let recipe = CompositeRecipe::new(
            "pair",
            "",
            LayerRecipe::new(SourceExpression::band(1)).with_clip(0.0, 1.0),
            LayerRecipe::new(SourceExpression::band(2)).with_clip(0.0, 1.0),
            LayerRecipe::new(SourceExpression::band(1)).with_clip(0.0, 1.0),
        );

        match compose(&recipe, &bands) {
            Ok(image) => {
                prop_assert_eq!((rows_a, cols_a), (rows_b, cols_b));
                prop_assert_eq!(image.shape(), (rows_a, cols_a, 3));
            }
            Err(CompositeError::ShapeMismatch { .. }) => {
                prop_assert_ne!((rows_a, cols_a), (rows_b, cols_b));
            }
            Err(other) => prop_assert!(false, "unexpected error {}", other),
        }
    }
}

#[test]
fn test_normalize_full_f64_range() {
    let mut values = vec![f64::MAX, 0.0, -f64::MAX, 1e300];
    normalize(Channel::Red, &mut values, ClipBounds::new(-f64::MAX, f64::MAX)).unwrap();
    assert_eq!(&values[..3], &[1.0, 0.5, 0.0]);
    assert!((0.5..=1.0).contains(&values[3]));
}

#[test]
fn test_inversion_is_exact_for_dyadic_values() {
    let values = vec![0.0, 0.125, 0.25, 0.5, 0.75, 1.0];
    let mut twice = values.clone();
    invert(&mut twice);
    invert(&mut twice);
    assert_eq!(twice, values);
}
