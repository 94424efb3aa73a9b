use ferrous_wire::{
    ComponentCatalog, ComponentDescriptor, DiError, InjectionPoint, Injector, InjectorConfig,
    RuleSets,
};
use std::sync::Arc;

struct A {
    _b: Arc<B>,
}

struct B {
    _a: Arc<A>,
}

struct SelfReferencing;

fn name<T: ?Sized>() -> &'static str {
    std::any::type_name::<T>()
}

#[test]
fn test_two_level_circular() {
    let mut catalog = ComponentCatalog::new();
    catalog
        .register(
            ComponentDescriptor::builder::<A>()
                .inject_constructor(vec![InjectionPoint::of::<B>()], |args| {
                    Ok(A { _b: args.get::<B>(0)? })
                })
                .build()
                .unwrap(),
        )
        .register(
            ComponentDescriptor::builder::<B>()
                .inject_constructor(vec![InjectionPoint::of::<A>()], |args| {
                    Ok(B { _a: args.get::<A>(0)? })
                })
                .build()
                .unwrap(),
        );

    let injector = Injector::new(RuleSets::new(), catalog);
    match injector.get::<A>() {
        Err(DiError::Cyclic(path)) => assert_eq!(path, vec![name::<A>(), name::<B>(), name::<A>()]),
        other => panic!("expected cycle, got {:?}", other.err()),
    }
}

#[test]
fn test_self_circular_dependency() {
    let mut catalog = ComponentCatalog::new();
    catalog.register(
        ComponentDescriptor::builder::<SelfReferencing>()
            .inject_constructor(vec![InjectionPoint::of::<SelfReferencing>()], |_| {
                Ok(SelfReferencing)
            })
            .build()
            .unwrap(),
    );

    let injector = Injector::new(RuleSets::new(), catalog);
    match injector.get::<SelfReferencing>() {
        Err(DiError::Cyclic(path)) => {
            assert_eq!(path.len(), 2);
            assert!(path.iter().all(|p| p.contains("SelfReferencing")));
        }
        other => panic!("expected cycle, got {:?}", other.err()),
    }
}

#[test]
fn test_member_cycle_detected() {
    struct Left {
        right: Option<Arc<Right>>,
    }
    struct Right {
        left: Option<Arc<Left>>,
    }

    let mut catalog = ComponentCatalog::new();
    catalog
        .register(
            ComponentDescriptor::builder::<Left>()
                .constructor(vec![], |_| Ok(Left { right: None }))
                .field::<Right, _>("right", InjectionPoint::of::<Right>(), |l, v| l.right = v)
                .build()
                .unwrap(),
        )
        .register(
            ComponentDescriptor::builder::<Right>()
                .constructor(vec![], |_| Ok(Right { left: None }))
                .field::<Left, _>("left", InjectionPoint::of::<Left>(), |r, v| r.left = v)
                .build()
                .unwrap(),
        );

    let err = Injector::new(RuleSets::new(), catalog)
        .resolve(ferrous_wire::Desire::of::<Left>())
        .err()
        .unwrap();
    assert!(matches!(err, DiError::Cyclic(_)));
    assert!(err.to_string().contains(" -> "));
}

#[test]
fn test_rule_chain_cycle() {
    trait Port: Send + Sync {}
    struct Http;
    struct Grpc;

    let mut rules = RuleSets::new();
    rules
        .bind::<dyn Port>()
        .to_type::<Http>()
        .bind::<Http>()
        .to_type::<Grpc>()
        .bind::<Grpc>()
        .to_type::<Http>();

    match ferrous_wire::resolve(ferrous_wire::Desire::of::<dyn Port>(), &rules) {
        Err(DiError::Cyclic(path)) => {
            assert_eq!(path, vec![name::<dyn Port>(), name::<Http>(), name::<Grpc>(), name::<Http>()])
        }
        other => panic!("expected cycle, got {:?}", other.err()),
    }
}

#[test]
fn test_self_rebinding_is_not_a_cycle() {
    struct Clock;

    let clock = ComponentDescriptor::builder::<Clock>()
        .constructor(vec![], |_| Ok(Clock))
        .build()
        .unwrap();
    let mut rules = RuleSets::new();
    rules.bind::<Clock>().to_type::<Clock>();
    let mut catalog = ComponentCatalog::new();
    catalog.register(clock);

    assert!(Injector::new(rules, catalog).get::<Clock>().is_ok());
}

#[test]
fn test_max_depth_exceeded() {
    struct L1(#[allow(dead_code)] Arc<L2>);
    struct L2(#[allow(dead_code)] Arc<L3>);
    struct L3;

    let mut builder = Injector::builder().config(InjectorConfig::default().with_max_depth(2));
    builder
        .catalog_mut()
        .register(
            ComponentDescriptor::builder::<L1>()
                .inject_constructor(vec![InjectionPoint::of::<L2>()], |a| Ok(L1(a.get::<L2>(0)?)))
                .build()
                .unwrap(),
        )
        .register(
            ComponentDescriptor::builder::<L2>()
                .inject_constructor(vec![InjectionPoint::of::<L3>()], |a| Ok(L2(a.get::<L3>(0)?)))
                .build()
                .unwrap(),
        )
        .register(
            ComponentDescriptor::builder::<L3>()
                .constructor(vec![], |_| Ok(L3))
                .build()
                .unwrap(),
        );
    let injector = builder.build();

    assert!(matches!(injector.get::<L1>(), Err(DiError::DepthExceeded(2))));
    // Shallower graphs still resolve
    assert!(injector.get::<L2>().is_ok());
}

#[test]
fn test_stack_released_after_failure() {
    let mut catalog = ComponentCatalog::new();
    catalog.register(
        ComponentDescriptor::builder::<SelfReferencing>()
            .inject_constructor(vec![InjectionPoint::of::<SelfReferencing>()], |_| {
                Ok(SelfReferencing)
            })
            .build()
            .unwrap(),
    );
    let mut rules = RuleSets::new();
    rules.bind::<u32>().to_instance(Arc::new(7u32));

    let injector = Injector::new(rules, catalog);
    let mut session = injector.session();
    assert!(session.get::<SelfReferencing>().is_err());
    assert_eq!(*session.get::<u32>().unwrap(), 7);
}
