//! Property tests for precision and shape merging.

use proptest::prelude::*;

use reactive_rules::core::{Number, NumberKind, Value, VariableStore, VectorShape, VectorValue};
use reactive_rules::operations::{
    merge_precision, merge_vector_shape, Arithmetic, NumberOperation, Rounding, VectorOperation,
};

fn number_kind() -> impl Strategy<Value = NumberKind> {
    prop_oneof![
        Just(NumberKind::Int32),
        Just(NumberKind::Float32),
        Just(NumberKind::Float64),
    ]
}

fn vector_shape() -> impl Strategy<Value = VectorShape> {
    (2usize..=4, any::<bool>()).prop_map(|(len, integer)| VectorShape::new(len, integer))
}

fn small_number() -> impl Strategy<Value = Number> {
    prop_oneof![
        (-1000i32..1000).prop_map(Number::Int),
        (-1000.0f32..1000.0).prop_map(Number::Float),
        (-1000.0f64..1000.0).prop_map(Number::Double),
    ]
}

fn small_vector() -> impl Strategy<Value = VectorValue> {
    (vector_shape(), prop::array::uniform4(-100i32..100)).prop_map(|(shape, c)| {
        VectorValue::from_components(shape, c.map(f64::from))
    })
}

proptest! {
    #[test]
    fn merge_precision_is_commutative(a in number_kind(), b in number_kind()) {
        prop_assert_eq!(merge_precision(a, b), merge_precision(b, a));
    }

    #[test]
    fn merge_precision_picks_the_wider(a in number_kind(), b in number_kind()) {
        let merged = merge_precision(a, b);
        prop_assert!(merged >= a && merged >= b);
        prop_assert!(merged == a || merged == b);
        prop_assert_eq!(merged == NumberKind::Float64, a == NumberKind::Float64 || b == NumberKind::Float64);
    }

    #[test]
    fn merge_vector_shape_rule(a in vector_shape(), b in vector_shape()) {
        let merged = merge_vector_shape(a, b);
        prop_assert_eq!(merged.len, a.len.max(b.len));
        prop_assert_eq!(merged.integer, a.integer && b.integer);
        prop_assert_eq!(merged, merge_vector_shape(b, a));
    }

    #[test]
    fn rounding_brackets_the_value(x in -1.0e6f64..1.0e6) {
        let floor = Rounding::FloorToInt.apply(x);
        let ceil = Rounding::CeilToInt.apply(x);
        let round = Rounding::RoundToInt.apply(x);
        prop_assert!(floor <= round && round <= ceil);
        prop_assert!(ceil - floor <= 1);
        prop_assert!((f64::from(round) - x).abs() <= 0.5);
    }

    #[test]
    fn rounding_halves_away_from_zero(n in -10_000i32..10_000) {
        let half = f64::from(n) + 0.5;
        let expected = if half > 0.0 { n + 1 } else { n };
        prop_assert_eq!(Rounding::RoundToInt.apply(half), expected);
    }

    #[test]
    fn number_target_keeps_its_kind(
        a in small_number(),
        b in small_number(),
        target in number_kind(),
    ) {
        let mut store = VariableStore::new();
        let id = store.declare("T", Number::zero(target)).unwrap();

        NumberOperation::new(id, Arithmetic::Add, a, b).execute(&mut store).unwrap();

        let value = store.value(id).unwrap();
        prop_assert_eq!(value.as_number().map(Number::kind), Some(target));
    }

    #[test]
    fn int_operands_add_exactly(a in -100_000i32..100_000, b in -100_000i32..100_000) {
        let mut store = VariableStore::new();
        let id = store.declare("T", 0).unwrap();

        NumberOperation::new(id, Arithmetic::Add, a, b).execute(&mut store).unwrap();
        prop_assert_eq!(store.value(id), Ok(Value::from(a + b)));
    }

    #[test]
    fn vector_target_keeps_its_shape(a in small_vector(), b in small_vector(), target in vector_shape()) {
        let mut store = VariableStore::new();
        let id = store.declare("V", VectorValue::zero(target)).unwrap();

        VectorOperation::new(id, Arithmetic::Subtract, a, b).execute(&mut store).unwrap();

        let value = store.value(id).unwrap();
        prop_assert_eq!(value.as_vector().map(|v| v.shape()), Some(target));
    }
}
