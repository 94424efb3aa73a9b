#![no_main]

use ferrous_wire::{
    BindRule, BindTarget, ComponentCatalog, ContextPattern, Desire, DiError, InjectionPoint,
    Injector, Instantiator, QualifierMatcher, RuleSets, Satisfaction, TypeKey,
};
use libfuzzer_sys::fuzz_target;
use std::sync::Arc;

struct Slot<const N: usize>;

fn key(n: u8) -> TypeKey {
    match n % 6 {
        0 => TypeKey::of::<Slot<0>>(),
        1 => TypeKey::of::<Slot<1>>(),
        2 => TypeKey::of::<Slot<2>>(),
        3 => TypeKey::of::<Slot<3>>(),
        4 => TypeKey::of::<Slot<4>>(),
        _ => TypeKey::of::<Slot<5>>(),
    }
}

// Each rule takes four bytes: source, target, weight, flags
fuzz_target!(|data: &[u8]| {
    let mut rules = RuleSets::new();
    for chunk in data.chunks_exact(4).take(32) {
        let (source, target, weight, flags) = (chunk[0], chunk[1], chunk[2], chunk[3]);
        let target = match flags % 3 {
            0 => BindTarget::Type(key(target)),
            1 => BindTarget::Satisfaction(Satisfaction::instance(Arc::new(target as u32))),
            _ => BindTarget::Satisfaction(Satisfaction::Null(key(target))),
        };
        let mut rule = BindRule::new(key(source), target)
            .with_weight(i32::from(weight % 4))
            .terminating(flags & 0x10 != 0);
        if flags & 0x20 != 0 {
            rule = rule.with_qualifier(QualifierMatcher::none());
        }
        let pattern = if flags & 0x40 != 0 {
            ContextPattern::within::<Slot<0>>()
        } else {
            ContextPattern::global()
        };
        rules.add(pattern, rule);
    }

    let injector = Injector::new(rules, ComponentCatalog::new());
    let root = key(data.first().copied().unwrap_or(0));
    let root = Desire::new(InjectionPoint::for_type(root));
    match injector.resolve(root) {
        Ok(instantiator) => {
            let _ = instantiator.instantiate();
        }
        Err(DiError::Unresolvable(_))
        | Err(DiError::AmbiguousBinding { .. })
        | Err(DiError::Cyclic(_))
        | Err(DiError::Configuration(_)) => {}
        Err(other) => panic!("unexpected resolution error: {other}"),
    }
});
