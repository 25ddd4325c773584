//! Property-based tests for typenv using proptest.
//!
//! These tests check the coercion rules and candidate invariants for all
//! inputs, not just hand-picked examples.

use proptest::prelude::*;

use typenv::schema::{self, boolean, number, string, FieldSchema, ObjectSchema, SchemaExt};
use typenv::{
    build_with_env, candidate, coerce, coerce_value, ConfigError, ConfigErrors, Mapping, MockEnv,
    Semigroup, Value,
};

// ============================================================================
// Arbitrary Generators
// ============================================================================

/// Boolean literal with random casing and surrounding whitespace.
fn arb_bool_literal() -> impl Strategy<Value = (String, bool)> {
    (
        prop_oneof![
            Just(("true", true)),
            Just(("1", true)),
            Just(("yes", true)),
            Just(("false", false)),
            Just(("0", false)),
            Just(("no", false)),
            Just(("", false)),
        ],
        prop::collection::vec(any::<bool>(), 5),
        "[ \t]{0,3}",
        "[ \t]{0,3}",
    )
        .prop_map(|((literal, expected), upper, lead, trail)| {
            let cased: String = literal
                .chars()
                .zip(upper.iter().cycle())
                .map(|(c, up)| if *up { c.to_ascii_uppercase() } else { c })
                .collect();
            (format!("{}{}{}", lead, cased, trail), expected)
        })
}

/// A field schema wrapped in a random stack of modifiers.
fn arb_wrapped(base: FieldSchema) -> impl Strategy<Value = FieldSchema> {
    prop::collection::vec(0u8..5, 0..4).prop_map(move |layers| {
        layers.into_iter().fold(base.clone(), |field, layer| match layer {
            0 => field.optional(),
            1 => field.nullable(),
            2 => field.readonly(),
            3 => field.preprocess(|v| v),
            _ => schema::any().pipe(field),
        })
    })
}

fn arb_config_errors() -> impl Strategy<Value = ConfigErrors> {
    prop::collection::vec("[a-z]{1,10}", 1..5).prop_map(|paths| {
        ConfigErrors::from_vec(
            paths
                .into_iter()
                .map(|path| ConfigError::Required { path })
                .collect(),
        )
        .expect("non-empty vec")
    })
}

// ============================================================================
// Coercion Properties
// ============================================================================

mod coercion {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        /// Property: recognised boolean literals coerce regardless of case
        /// and surrounding whitespace, through any modifier stack.
        #[test]
        fn bool_literals_coerce(
            (raw, expected) in arb_bool_literal(),
            field in arb_wrapped(boolean()),
        ) {
            prop_assert_eq!(coerce(&field, Some(raw.as_str())), Some(Value::Bool(expected)));
        }

        /// Property: any other string reaches the validator unchanged.
        #[test]
        fn unknown_bool_literals_pass_through(raw in "[a-zA-Z]{2,12}") {
            let lowered = raw.to_lowercase();
            prop_assume!(!["true", "yes", "false", "no"].contains(&lowered.as_str()));
            let field: FieldSchema = boolean();
            prop_assert_eq!(coerce(&field, Some(raw.as_str())), Some(Value::String(raw.clone())));
        }

        /// Property: every i64 survives a trip through its decimal form.
        #[test]
        fn integers_coerce_exactly(n in any::<i64>(), field in arb_wrapped(number().into())) {
            prop_assert_eq!(coerce(&field, Some(n.to_string().as_str())), Some(Value::Integer(n)));
        }

        /// Property: finite floats with a fractional part stay floats.
        #[test]
        fn decimals_coerce_to_floats(f in -1.0e9f64..1.0e9) {
            prop_assume!(f.fract() != 0.0);
            let field: FieldSchema = number().into();
            prop_assert_eq!(coerce(&field, Some(f.to_string().as_str())), Some(Value::Float(f)));
        }

        /// Property: string fields never change their input.
        #[test]
        fn strings_are_untouched(raw in ".{0,40}", field in arb_wrapped(string().into())) {
            prop_assert_eq!(coerce(&field, Some(raw.as_str())), Some(Value::String(raw.clone())));
        }

        /// Property: values that already carry a native type are not altered.
        #[test]
        fn native_values_are_stable(n in any::<i64>(), b in any::<bool>()) {
            let port: FieldSchema = number().into();
            let debug: FieldSchema = boolean();
            prop_assert_eq!(coerce_value(&port, Value::Integer(n)), Value::Integer(n));
            prop_assert_eq!(coerce_value(&debug, Value::Bool(b)), Value::Bool(b));
            prop_assert_eq!(coerce_value(&debug, Value::Integer(n)), Value::Integer(n));
        }
    }
}

// ============================================================================
// Candidate and Build Properties
// ============================================================================

mod building {
    use super::*;

    fn schema() -> ObjectSchema {
        ObjectSchema::new()
            .field("port", number().int().default(80))
            .field("host", string().default("localhost"))
            .field("debug", boolean().default(false))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(128))]

        /// Property: fields without a mapping entry never enter the candidate,
        /// whatever the environment holds.
        #[test]
        fn unmapped_fields_are_absent(
            mapped in prop::sample::subsequence(vec!["port", "host", "debug"], 0..=3),
            port in "[0-9]{1,4}",
            host in "[a-z]{1,10}",
        ) {
            let env = MockEnv::new()
                .with_env("PORT", port)
                .with_env("HOST", host)
                .with_env("DEBUG", "true");
            let mapping: Mapping = mapped
                .iter()
                .map(|field| (*field, field.to_uppercase()))
                .collect();

            let candidate = candidate(&schema(), &mapping, &env);
            for field in ["port", "host", "debug"] {
                prop_assert_eq!(candidate.contains(field), mapped.contains(&field));
            }
        }

        /// Property: building twice from the same inputs gives equal results.
        #[test]
        fn build_is_idempotent(port in "[0-9a-z]{0,5}", debug in "[a-z]{0,5}") {
            let env = MockEnv::new().with_env("PORT", port).with_env("DEBUG", debug);
            let mapping = Mapping::derived(&schema(), "");

            let first = build_with_env(&schema(), &mapping, &env);
            let second = build_with_env(&schema(), &mapping, &env);
            match (first, second) {
                (Ok(a), Ok(b)) => prop_assert_eq!(a, b),
                (Err(a), Err(b)) => prop_assert_eq!(a.issues(), b.issues()),
                _ => prop_assert!(false, "outcomes differ"),
            }
        }
    }
}

// ============================================================================
// Error Accumulation Laws
// ============================================================================

mod semigroup_laws {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        /// Property: ConfigErrors combination is associative.
        #[test]
        fn config_errors_associativity(
            a in arb_config_errors(),
            b in arb_config_errors(),
            c in arb_config_errors(),
        ) {
            let left = a.clone().combine(b.clone()).combine(c.clone());
            let right = a.combine(b.combine(c));
            prop_assert_eq!(left.issues(), right.issues());
        }

        /// Property: combining preserves every error.
        #[test]
        fn config_errors_preserves_count(a in arb_config_errors(), b in arb_config_errors()) {
            let expected = a.len() + b.len();
            prop_assert_eq!(a.combine(b).len(), expected);
        }
    }
}
