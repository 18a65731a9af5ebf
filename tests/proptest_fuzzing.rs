//! Property-based testing for staged expansion
//!
//! Uses proptest to check that splitting the parameters across partial
//! expansion stages never changes the final result, for random templates
//! built from every operator.

use proptest::prelude::*;
use uritemplate::{expand, expand_partial, Params};

/// Variables bound to single values
const SCALAR_VARS: [&str; 4] = ["a", "b", "c", "d"];
/// Variables bound to lists (only used by -list, -opt and -neg)
const LIST_VARS: [&str; 2] = ["x", "y"];

fn arb_sep() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["&", "/", ";", "", "=", "?", ",", "-"])
}

fn arb_literal() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["", "/", "-", "?q=", "x", "#"])
}

fn arb_scalar_var() -> impl Strategy<Value = &'static str> {
    prop::sample::select(SCALAR_VARS.to_vec())
}

fn arb_scalar_vars() -> impl Strategy<Value = Vec<&'static str>> {
    prop::sample::subsequence(SCALAR_VARS.to_vec(), 1..=4).prop_shuffle()
}

fn arb_any_vars() -> impl Strategy<Value = Vec<&'static str>> {
    prop::sample::subsequence(vec!["a", "b", "c", "d", "x", "y"], 1..=3).prop_shuffle()
}

fn arb_expression() -> impl Strategy<Value = String> {
    prop_oneof![
        arb_scalar_var().prop_map(|v| format!("{{{}}}", v)),
        (arb_sep(), arb_any_vars()).prop_map(|(s, vs)| format!("{{-opt|{}|{}}}", s, vs.join(","))),
        (arb_sep(), arb_any_vars()).prop_map(|(s, vs)| format!("{{-neg|{}|{}}}", s, vs.join(","))),
        (arb_sep(), arb_scalar_var()).prop_map(|(s, v)| format!("{{-prefix|{}|{}}}", s, v)),
        (arb_sep(), arb_scalar_var()).prop_map(|(s, v)| format!("{{-suffix|{}|{}}}", s, v)),
        (arb_sep(), arb_scalar_vars()).prop_map(|(s, vs)| format!("{{-join|{}|{}}}", s, vs.join(","))),
        (arb_sep(), prop::sample::select(LIST_VARS.to_vec()))
            .prop_map(|(s, v)| format!("{{-list|{}|{}}}", s, v)),
    ]
}

prop_compose! {
    /// Literal text interleaved with 1-4 expressions
    fn arb_template()(
        parts in prop::collection::vec((arb_literal(), arb_expression()), 1..5),
        tail in arb_literal()
    ) -> String {
        let mut template: String = parts
            .into_iter()
            .map(|(literal, expression)| format!("{}{}", literal, expression))
            .collect();
        template.push_str(tail);
        template
    }
}

prop_compose! {
    /// Random bindings plus a stage (0..3) for every variable
    fn arb_staged_params()(
        scalars in prop::collection::vec(
            prop::option::of(prop::sample::select(vec!["", "v", "a b", "&=", "é"])),
            4
        ),
        lists in prop::collection::vec(
            prop::option::of(prop::collection::vec(prop::sample::select(vec!["p", "q r", "/"]), 0..3)),
            2
        ),
        stages in prop::collection::vec(0usize..3, 6)
    ) -> [Params; 3] {
        let mut staged = [Params::new(), Params::new(), Params::new()];
        let mut stage = stages.into_iter();

        for (name, value) in SCALAR_VARS.iter().zip(scalars) {
            let target = stage.next().unwrap_or(0);
            if let Some(value) = value {
                staged[target].insert(*name, value);
            }
        }
        for (name, value) in LIST_VARS.iter().zip(lists) {
            let target = stage.next().unwrap_or(0);
            if let Some(items) = value {
                staged[target].insert(*name, items);
            }
        }
        staged
    }
}

fn merged(stages: &[&Params]) -> Params {
    let mut all = Params::new();
    for stage in stages {
        all.extend(stage.iter().map(|(k, v)| (k.to_string(), v.clone())));
    }
    all
}

proptest! {
    /// Property: expansion never panics on arbitrary input
    #[test]
    fn test_expansion_never_panics(template in ".*") {
        let _ = expand(&template, &Params::new());
        let _ = expand_partial(&template, &Params::new());
    }

    /// Property: partial expansion with nothing bound is the identity
    #[test]
    fn test_partial_with_nothing_is_identity(template in arb_template()) {
        prop_assert_eq!(expand_partial(&template, &Params::new()).unwrap(), template);
    }

    /// Property: resolving everything partially equals full expansion
    #[test]
    fn test_partial_with_everything_is_full(template in arb_template(), staged in arb_staged_params()) {
        let all = merged(&[&staged[0], &staged[1], &staged[2]]);
        let full = expand(&template, &all).unwrap();
        let partial = expand_partial(&template, &all).unwrap();
        prop_assert_eq!(expand(&partial, &Params::new()).unwrap(), full);
    }

    /// Property: two stages in either order reproduce the single-stage result
    #[test]
    fn test_two_stage_split_invariance(template in arb_template(), staged in arb_staged_params()) {
        let a = merged(&[&staged[0]]);
        let b = merged(&[&staged[1], &staged[2]]);
        let all = merged(&[&a, &b]);
        let expected = expand(&template, &all).unwrap();

        let a_first = expand(&expand_partial(&template, &a).unwrap(), &b).unwrap();
        let b_first = expand(&expand_partial(&template, &b).unwrap(), &a).unwrap();
        prop_assert_eq!(&a_first, &expected);
        prop_assert_eq!(&b_first, &expected);
    }

    /// Property: three stages reproduce the single-stage result
    #[test]
    fn test_three_stage_split_invariance(template in arb_template(), staged in arb_staged_params()) {
        let all = merged(&[&staged[0], &staged[1], &staged[2]]);
        let expected = expand(&template, &all).unwrap();

        let first = expand_partial(&template, &staged[0]).unwrap();
        let second = expand_partial(&first, &staged[1]).unwrap();
        prop_assert_eq!(expand(&second, &staged[2]).unwrap(), expected);
    }
}
