use ferrous_wire::{
    resolve, CachePolicy, ComponentCatalog, ComponentDescriptor, Desire, DiError, InjectionPoint,
    Injector, InjectorConfig, InstantiatorExt, RuleSets,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

trait Store: Send + Sync {
    fn name(&self) -> &'static str;
}

#[derive(Default)]
struct MemoryStore;

impl Store for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }
}

struct Repository {
    store: Arc<dyn Store>,
}

fn memory_store() -> Arc<ComponentDescriptor> {
    ComponentDescriptor::builder::<MemoryStore>()
        .default_constructor()
        .implements::<dyn Store, _>(|s| s as Arc<dyn Store>)
        .build()
        .unwrap()
}

fn repository() -> Arc<ComponentDescriptor> {
    ComponentDescriptor::builder::<Repository>()
        .inject_constructor(vec![InjectionPoint::of::<dyn Store>()], |args| {
            Ok(Repository {
                store: args.get::<dyn Store>(0)?,
            })
        })
        .build()
        .unwrap()
}

#[test]
fn test_instance_binding_to_trait_object() {
    let store: Arc<dyn Store> = Arc::new(MemoryStore);
    let mut builder = Injector::builder();
    builder.catalog_mut().register(repository());
    builder.rules_mut().bind::<dyn Store>().to_instance(store.clone());

    let injector = builder.build();
    let repo = injector.get::<Repository>().unwrap();
    assert!(Arc::ptr_eq(&repo.store, &store));
    assert_eq!(repo.store.name(), "memory");
}

#[test]
fn test_interface_rewritten_to_implementation_type() {
    let mut builder = Injector::builder();
    builder
        .catalog_mut()
        .register(memory_store())
        .register(repository());
    builder.rules_mut().bind::<dyn Store>().to_type::<MemoryStore>();

    let repo = builder.build().get::<Repository>().unwrap();
    assert_eq!(repo.store.name(), "memory");
}

#[test]
fn test_missing_conversion_is_configuration_error() {
    let plain = ComponentDescriptor::builder::<MemoryStore>()
        .default_constructor()
        .build()
        .unwrap();

    let mut builder = Injector::builder();
    builder.catalog_mut().register(plain).register(repository());
    builder.rules_mut().bind::<dyn Store>().to_type::<MemoryStore>();

    match builder.build().get::<Repository>() {
        Err(DiError::Configuration(message)) => {
            assert!(message.contains("no conversion"));
            // The message names the rewritten desire, not the interface
            assert!(message.starts_with("Desire("));
            assert!(message.contains("MemoryStore at"));
        }
        other => panic!("expected configuration error, got {:?}", other.err()),
    }
}

#[test]
fn test_catalog_default_builds_fresh_instances() {
    static BUILT: AtomicUsize = AtomicUsize::new(0);
    struct Counter(usize);

    let mut catalog = ComponentCatalog::new();
    catalog.register(
        ComponentDescriptor::builder::<Counter>()
            .constructor(vec![], |_| Ok(Counter(BUILT.fetch_add(1, Ordering::SeqCst))))
            .build()
            .unwrap(),
    );

    let injector = Injector::new(RuleSets::new(), catalog);
    let a = injector.get::<Counter>().unwrap();
    let b = injector.get::<Counter>().unwrap();
    assert_ne!(a.0, b.0);
}

#[test]
fn test_resolution_does_not_construct() {
    static BUILT: AtomicUsize = AtomicUsize::new(0);
    struct Lazy;

    let mut catalog = ComponentCatalog::new();
    catalog.register(
        ComponentDescriptor::builder::<Lazy>()
            .constructor(vec![], |_| {
                BUILT.fetch_add(1, Ordering::SeqCst);
                Ok(Lazy)
            })
            .build()
            .unwrap(),
    );

    let injector = Injector::new(RuleSets::new(), catalog);
    let instantiator = injector.resolve(Desire::of::<Lazy>()).unwrap();
    assert_eq!(BUILT.load(Ordering::SeqCst), 0);

    instantiator.get_required::<Lazy>().unwrap();
    assert_eq!(BUILT.load(Ordering::SeqCst), 1);
}

#[test]
fn test_singleton_shared_within_session() {
    struct Pool;
    struct Client {
        first: Arc<Pool>,
        second: Arc<Pool>,
    }

    let mut builder = Injector::builder();
    builder
        .catalog_mut()
        .register(
            ComponentDescriptor::builder::<Pool>()
                .constructor(vec![], |_| Ok(Pool))
                .singleton()
                .build()
                .unwrap(),
        )
        .register(
            ComponentDescriptor::builder::<Client>()
                .inject_constructor(
                    vec![InjectionPoint::of::<Pool>(), InjectionPoint::of::<Pool>()],
                    |args| {
                        Ok(Client {
                            first: args.get::<Pool>(0)?,
                            second: args.get::<Pool>(1)?,
                        })
                    },
                )
                .build()
                .unwrap(),
        );
    let injector = builder.build();

    let client = injector.get::<Client>().unwrap();
    assert!(Arc::ptr_eq(&client.first, &client.second));

    let mut session = injector.session();
    let a = session.get::<Pool>().unwrap();
    let b = session.get::<Pool>().unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(session.memoized(), 1);

    // Separate sessions build separate graphs
    let other = injector.get::<Pool>().unwrap();
    assert!(!Arc::ptr_eq(&a, &other));
}

#[test]
fn test_rule_policy_overrides_descriptor_default() {
    struct Pool;

    let pool = ComponentDescriptor::builder::<Pool>()
        .constructor(vec![], |_| Ok(Pool))
        .singleton()
        .build()
        .unwrap();
    let mut builder = Injector::builder();
    builder.rules_mut().bind::<Pool>().unshared().to_class(&pool).unwrap();
    let injector = builder.build();

    let mut session = injector.session();
    let a = session.get::<Pool>().unwrap();
    let b = session.get::<Pool>().unwrap();
    assert!(!Arc::ptr_eq(&a, &b));
    assert_eq!(session.memoized(), 0);
}

#[test]
fn test_config_default_cache_policy_applies_last() {
    struct Pool;

    let mut builder = Injector::builder()
        .config(InjectorConfig::default().with_default_cache_policy(CachePolicy::Memoize));
    builder.catalog_mut().register(
        ComponentDescriptor::builder::<Pool>()
            .constructor(vec![], |_| Ok(Pool))
            .build()
            .unwrap(),
    );
    let injector = builder.build();

    let mut session = injector.session();
    let a = session.get::<Pool>().unwrap();
    let b = session.get::<Pool>().unwrap();
    assert!(Arc::ptr_eq(&a, &b));
}

#[test]
fn test_unbound_root_is_unresolvable() {
    struct Missing;

    match resolve(Desire::of::<Missing>(), &RuleSets::new()) {
        Err(DiError::Unresolvable(message)) => assert!(message.contains("Missing")),
        other => panic!("expected unresolvable, got {:?}", other.err()),
    }
}

#[test]
fn test_null_binding_with_optional_point() {
    struct Metrics;
    struct Service {
        metrics: Option<Arc<Metrics>>,
    }

    let mut builder = Injector::builder();
    builder.catalog_mut().register(
        ComponentDescriptor::builder::<Service>()
            .inject_constructor(vec![InjectionPoint::of::<Metrics>().optional()], |args| {
                Ok(Service {
                    metrics: args.optional::<Metrics>(0)?,
                })
            })
            .build()
            .unwrap(),
    );
    builder.rules_mut().bind::<Metrics>().to_null();

    let service = builder.build().get::<Service>().unwrap();
    assert!(service.metrics.is_none());
}
