use ferrous_wire::{
    Annotation, ComponentCatalog, ComponentDescriptor, Desire, DiError, InjectionPoint, Injector,
    Qualifier, QualifierMatcher, RuleSets,
};
use std::sync::Arc;

struct Region;
impl Annotation for Region {
    const QUALIFIER: bool = true;
}

struct Documented;
impl Annotation for Documented {}

#[derive(Debug, PartialEq)]
struct Endpoint(&'static str);

#[test]
fn test_named_bindings_select_by_qualifier() {
    let mut rules = RuleSets::new();
    rules
        .bind::<Endpoint>()
        .qualified_with(Qualifier::named("primary"))
        .to_instance(Arc::new(Endpoint("db-1")))
        .bind::<Endpoint>()
        .qualified_with(Qualifier::named("replica"))
        .to_instance(Arc::new(Endpoint("db-2")))
        .bind::<Endpoint>()
        .unqualified()
        .to_instance(Arc::new(Endpoint("localhost")));
    let injector = Injector::new(rules, Default::default());

    let primary = injector.get_qualified::<Endpoint>(Qualifier::named("primary")).unwrap();
    let replica = injector.get_qualified::<Endpoint>(Qualifier::named("replica")).unwrap();
    let plain = injector.get::<Endpoint>().unwrap();

    assert_eq!(*primary, Endpoint("db-1"));
    assert_eq!(*replica, Endpoint("db-2"));
    assert_eq!(*plain, Endpoint("localhost"));
}

#[test]
fn test_unqualified_binding_rejects_qualified_desire() {
    let mut rules = RuleSets::new();
    rules
        .bind::<Endpoint>()
        .unqualified()
        .to_instance(Arc::new(Endpoint("localhost")));
    let injector = Injector::new(rules, Default::default());

    assert!(matches!(
        injector.get_qualified::<Endpoint>(Qualifier::named("primary")),
        Err(DiError::Unresolvable(_))
    ));
}

#[test]
fn test_value_matcher_outranks_any_matcher() {
    let mut rules = RuleSets::new();
    rules
        .bind::<Endpoint>()
        .to_instance(Arc::new(Endpoint("fallback")))
        .bind::<Endpoint>()
        .qualified_with(Qualifier::named("primary"))
        .to_instance(Arc::new(Endpoint("db-1")));
    let injector = Injector::new(rules, Default::default());

    let primary = injector.get_qualified::<Endpoint>(Qualifier::named("primary")).unwrap();
    assert_eq!(*primary, Endpoint("db-1"));

    let other = injector.get_qualified::<Endpoint>(Qualifier::named("other")).unwrap();
    assert_eq!(*other, Endpoint("fallback"));
}

#[test]
fn test_type_matcher_accepts_any_value() {
    let mut rules = RuleSets::new();
    rules
        .bind::<Endpoint>()
        .matching(QualifierMatcher::by_type::<Region>().unwrap())
        .to_instance(Arc::new(Endpoint("regional")));
    let injector = Injector::new(rules, Default::default());

    for region in ["eu", "us"] {
        let q = Qualifier::with_value::<Region>(region).unwrap();
        assert_eq!(*injector.get_qualified::<Endpoint>(q).unwrap(), Endpoint("regional"));
    }
    assert!(injector.get_qualified::<Endpoint>(Qualifier::named("eu")).is_err());
}

#[test]
fn test_custom_matcher() {
    let mut rules = RuleSets::new();
    rules
        .bind::<Endpoint>()
        .matching(QualifierMatcher::custom("starts-with-db", |q| {
            q.and_then(Qualifier::value).map_or(false, |v| v.starts_with("db"))
        }))
        .to_instance(Arc::new(Endpoint("database")));
    let injector = Injector::new(rules, Default::default());

    assert!(injector.get_qualified::<Endpoint>(Qualifier::named("db-main")).is_ok());
    assert!(injector.get_qualified::<Endpoint>(Qualifier::named("cache")).is_err());
}

#[test]
fn test_non_qualifier_annotation_rejected() {
    assert!(matches!(Qualifier::of::<Documented>(), Err(DiError::Configuration(_))));
    assert!(matches!(
        QualifierMatcher::by_type::<Documented>(),
        Err(DiError::Configuration(_))
    ));
    assert!(Qualifier::of::<Region>().is_ok());
}

#[test]
fn test_qualified_injection_point() {
    struct Replicated {
        primary: Arc<Endpoint>,
        replica: Arc<Endpoint>,
    }

    let mut builder = Injector::builder();
    builder.catalog_mut().register(
        ComponentDescriptor::builder::<Replicated>()
            .inject_constructor(
                vec![
                    InjectionPoint::of::<Endpoint>().qualified(Qualifier::named("primary")),
                    InjectionPoint::of::<Endpoint>().qualified(Qualifier::named("replica")),
                ],
                |args| {
                    Ok(Replicated {
                        primary: args.get::<Endpoint>(0)?,
                        replica: args.get::<Endpoint>(1)?,
                    })
                },
            )
            .build()
            .unwrap(),
    );
    builder
        .rules_mut()
        .bind::<Endpoint>()
        .qualified_with(Qualifier::named("primary"))
        .to_instance(Arc::new(Endpoint("db-1")))
        .bind::<Endpoint>()
        .qualified_with(Qualifier::named("replica"))
        .to_instance(Arc::new(Endpoint("db-2")));

    let replicated = builder.build().get::<Replicated>().unwrap();
    assert_eq!(*replicated.primary, Endpoint("db-1"));
    assert_eq!(*replicated.replica, Endpoint("db-2"));
}

#[test]
fn test_rewritten_desire_keeps_qualifier() {
    trait Cache: Send + Sync {}
    struct Redis;
    impl Cache for Redis {}

    let mut rules = RuleSets::new();
    rules
        .bind::<dyn Cache>()
        .to_type::<Redis>()
        .bind::<Redis>()
        .qualified_with(Qualifier::named("session"))
        .to_instance(Arc::new(Redis));

    let mut catalog = ComponentCatalog::new();
    catalog.declare_cast::<Redis, dyn Cache, _>(|r| r as Arc<dyn Cache>);
    let injector = Injector::new(rules, catalog);

    let desire = Desire::qualified::<dyn Cache>(Qualifier::named("session"));
    assert!(injector.resolve(desire).is_ok());
    assert!(injector.get::<dyn Cache>().is_err());
}
