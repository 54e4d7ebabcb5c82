// Marshalling laws over the public API surface.
use poolcast::api::{Complex, Kind, Nested, Scalar, Variant, to_nested, to_variant};
use serde_json::json;

fn nested(value: serde_json::Value) -> Nested {
    Nested::from_json(&value).expect("decode")
}

/// Deterministic sample leaf for a kind and flat position.
fn sample_leaf(kind: Kind, seed: i64) -> Nested {
    match kind {
        Kind::Boolean => Nested::from(seed % 2 == 0),
        Kind::Integer => Nested::from(seed),
        Kind::Real => Nested::from(seed as f64 / 4.0),
        Kind::Complex => Nested::from(Complex::new(seed as f64, -seed as f64)),
        Kind::Text => Nested::from(format!("cell-{seed}").as_str()),
    }
}

/// Build a rectangular nested value of the given outer-to-inner shape.
fn sample_value(kind: Kind, shape: &[usize], seed: i64) -> Nested {
    match shape.split_first() {
        None => sample_leaf(kind, seed),
        Some((&len, rest)) => Nested::Seq(
            (0..len)
                .map(|i| sample_value(kind, rest, seed * 7 + i as i64))
                .collect(),
        ),
    }
}

const ALL_KINDS: [Kind; 5] = [
    Kind::Boolean,
    Kind::Integer,
    Kind::Real,
    Kind::Complex,
    Kind::Text,
];

#[test]
fn round_trip_all_kinds_ranks_zero_through_four() {
    let shapes: [&[usize]; 5] = [&[], &[3], &[2, 3], &[2, 1, 3], &[2, 3, 1, 2]];
    for kind in ALL_KINDS {
        for shape in shapes {
            let value = sample_value(kind, shape, 1);
            let variant = to_variant(&value, None).expect("marshal");
            assert_eq!(variant.rank(), shape.len());
            let back = to_nested(&variant);
            assert_eq!(back, value, "kind {kind:?} shape {shape:?}");

            // A second trip through storage changes nothing.
            let again = to_variant(&back, None).expect("marshal again");
            assert_eq!(to_nested(&again), back);
        }
    }
}

#[test]
fn shape_reversal_law() {
    let value = sample_value(Kind::Real, &[4, 3, 2], 1);
    let variant = to_variant(&value, None).expect("marshal");
    assert_eq!(variant.extents(), &[2, 3, 4]);

    let back = to_nested(&variant);
    let outer = back.as_seq().expect("outer");
    assert_eq!(outer.len(), 4);
    let mid = outer[0].as_seq().expect("mid");
    assert_eq!(mid.len(), 3);
    assert_eq!(mid[0].as_seq().expect("inner").len(), 2);
}

#[test]
fn asymmetric_two_by_three_regression() {
    let value = nested(json!([[1, 2, 3], [4, 5, 6]]));
    let variant = to_variant(&value, None).expect("marshal");
    assert_eq!(variant.extents(), &[3, 2], "extents must be (3, 2), not (2, 3)");
    assert_eq!(to_nested(&variant), value);
}

#[test]
fn scalar_identity_is_type_preserving() {
    let integer = to_variant(&nested(json!(5)), None).expect("marshal");
    assert_eq!(integer.rank(), 0);
    assert_eq!(integer.kind(), Kind::Integer);
    assert_eq!(to_nested(&integer), nested(json!(5)));

    let real = to_variant(&nested(json!(5.0)), None).expect("marshal");
    assert_eq!(real.kind(), Kind::Real);
    assert_eq!(to_nested(&real), nested(json!(5.0)));
}

#[test]
fn complex_scalar_round_trip() {
    let value = Nested::Leaf(Scalar::Complex(Complex::new(3.5, -2.0)));
    let variant = to_variant(&value, None).expect("marshal");
    assert_eq!(to_nested(&variant), value);
}

#[test]
fn type_dispatch_one_literal_per_kind() {
    let cases = [
        (json!([[true]]), Kind::Boolean),
        (json!([[7]]), Kind::Integer),
        (json!([[7.5]]), Kind::Real),
        (json!([[{ "re": 0.0, "im": 1.0 }]]), Kind::Complex),
        (json!([["wall"]]), Kind::Text),
    ];
    for (value, kind) in cases {
        let variant = to_variant(&nested(value), None).expect("marshal");
        assert_eq!(variant.kind(), kind);
    }
}

#[test]
fn ragged_input_is_rejected_consistently() {
    // The one chosen policy: every sibling mismatch raises RaggedInput,
    // whichever axis it happens on.
    let cases = [
        json!([[1, 2], [3]]),
        json!([[1, 2], [3, 4, 5]]),
        json!([[[1], [2]], [[3]]]),
        json!([1, [2]]),
        json!([[1], 2]),
    ];
    for value in cases {
        let err = to_variant(&nested(value.clone()), None).unwrap_err();
        assert_eq!(
            err.kind(),
            poolcast::api::ErrorKind::RaggedInput,
            "value {value}"
        );
    }
}

#[test]
fn variant_equality_matches_nested_equality() {
    let a = to_variant(&sample_value(Kind::Integer, &[2, 2], 3), None).expect("marshal");
    let b = to_variant(&sample_value(Kind::Integer, &[2, 2], 3), None).expect("marshal");
    assert_eq!(a, b);
    assert_eq!(to_nested(&a), to_nested(&b));

    let c = to_variant(&sample_value(Kind::Integer, &[2, 2], 4), None).expect("marshal");
    assert_ne!(to_nested(&a), to_nested(&c));
}

#[test]
fn allocate_then_read_matches_default_cells() {
    let variant = Variant::allocate(Kind::Complex, &[2]).expect("allocate");
    assert_eq!(
        to_nested(&variant),
        nested(json!([{ "re": 0.0, "im": 0.0 }, { "re": 0.0, "im": 0.0 }]))
    );
}
