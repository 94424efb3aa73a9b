/// Property-based tests for rule selection and matcher ordering
///
/// These verify that precedence is a deterministic total order regardless of
/// the weights and matchers involved.

use ferrous_wire::{
    ComponentCatalog, Context, ContextElement, ContextMatch, ContextPattern, FlatHierarchy,
    Injector, Named, Qualifier, QualifierMatcher, RuleSets, TypeKey,
};
use proptest::prelude::*;
use std::cmp::Ordering;
use std::sync::Arc;

fn matcher(kind: u8) -> QualifierMatcher {
    match kind % 4 {
        0 => QualifierMatcher::any(),
        1 => QualifierMatcher::by_type::<Named>().unwrap(),
        2 => QualifierMatcher::none(),
        _ => QualifierMatcher::named("primary"),
    }
}

fn context_match() -> impl Strategy<Value = ContextMatch> {
    prop_oneof![
        Just(ContextMatch::Global),
        (0usize..4, 0u8..4).prop_map(|(distance, specificity)| ContextMatch::Scoped {
            distance,
            specificity
        }),
    ]
}

proptest! {
    #[test]
    fn lowest_weight_always_selected(weights in proptest::collection::hash_set(-1000i32..1000, 1..8)) {
        let weights: Vec<i32> = weights.into_iter().collect();
        let mut rules = RuleSets::new();
        for &w in &weights {
            rules.bind::<i32>().weight(w).to_instance(Arc::new(w));
        }

        let injector = Injector::new(rules, ComponentCatalog::new());
        let selected = injector.get::<i32>().unwrap();
        prop_assert_eq!(*selected, *weights.iter().min().unwrap());
    }

    #[test]
    fn matcher_ordering_is_transitive(a in 0u8..4, b in 0u8..4, c in 0u8..4) {
        let (a, b, c) = (matcher(a), matcher(b), matcher(c));
        if a.compare(&b) != Ordering::Greater && b.compare(&c) != Ordering::Greater {
            prop_assert_ne!(a.compare(&c), Ordering::Greater);
        }
        prop_assert_eq!(a.compare(&b), b.compare(&a).reverse());
    }

    #[test]
    fn context_match_ordering_is_total(a in context_match(), b in context_match(), c in context_match()) {
        prop_assert_eq!(a.cmp(&b), b.cmp(&a).reverse());
        prop_assert_eq!(a.cmp(&b) == Ordering::Equal, a == b);
        if a <= b && b <= c {
            prop_assert!(a <= c);
        }
        if a != ContextMatch::Global {
            prop_assert!(a < ContextMatch::Global);
        }
    }

    #[test]
    fn qualified_rule_outranks_any_rule(name in "[a-z]{1,12}", weight in -5i32..5) {
        let mut rules = RuleSets::new();
        rules
            .bind::<String>()
            .weight(weight)
            .to_instance(Arc::new("fallback".to_string()))
            .bind::<String>()
            .weight(weight)
            .qualified_with(Qualifier::named(&name))
            .to_instance(Arc::new(name.clone()));

        let injector = Injector::new(rules, ComponentCatalog::new());
        let resolved = injector.get_qualified::<String>(Qualifier::named(&name)).unwrap();
        prop_assert_eq!(&*resolved, &name);
    }

    #[test]
    fn global_pattern_matches_any_depth(depth in 0usize..6) {
        let mut ctx = Context::root();
        for _ in 0..depth {
            ctx = ctx.push(ContextElement::new(TypeKey::of::<u8>(), None));
        }
        prop_assert_eq!(
            ContextPattern::global().matches(&ctx, &FlatHierarchy),
            Some(ContextMatch::Global)
        );
        prop_assert_eq!(
            ContextPattern::within::<u8>().matches(&ctx, &FlatHierarchy).is_some(),
            depth > 0
        );
    }
}
