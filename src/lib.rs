//! # ferrous-wire
//!
//! Object-graph resolution for dependency injection: given a requested type,
//! bind rules and component metadata, compute how to build a fully-wired
//! instance of that type.
//!
//! ## Features
//!
//! - **Rule-based binding**: interfaces rewritten to implementations, instances, providers or null
//! - **Qualifiers**: discriminate implementations of one type with annotation-backed qualifiers
//! - **Context-sensitive rules**: bindings that only apply beneath a given component
//! - **Deterministic selection**: context specificity, then weight, ambiguity reported
//! - **Cycle detection**: both in rule chains and in the constructed graph, with full paths
//! - **Lifecycle**: post-construct and pre-destroy hooks, supertype first
//!
//! ## Quick Start
//!
//! ```rust
//! use ferrous_wire::{ComponentDescriptor, Injector, InjectionPoint};
//! use std::sync::Arc;
//!
//! trait Store: Send + Sync {
//!     fn name(&self) -> &str;
//! }
//!
//! #[derive(Default)]
//! struct MemoryStore;
//! impl Store for MemoryStore {
//!     fn name(&self) -> &str { "memory" }
//! }
//!
//! struct Service {
//!     store: Arc<dyn Store>,
//! }
//!
//! let memory = ComponentDescriptor::builder::<MemoryStore>()
//!     .default_constructor()
//!     .implements::<dyn Store, _>(|s| s as Arc<dyn Store>)
//!     .build()
//!     .unwrap();
//! let service = ComponentDescriptor::builder::<Service>()
//!     .inject_constructor(vec![InjectionPoint::of::<dyn Store>()], |args| {
//!         Ok(Service { store: args.get::<dyn Store>(0)? })
//!     })
//!     .build()
//!     .unwrap();
//!
//! let mut builder = Injector::builder();
//! builder.catalog_mut().register(memory.clone()).register(service);
//! builder.rules_mut().bind::<dyn Store>().to_class(&memory).unwrap();
//!
//! let injector = builder.build();
//! let service = injector.get::<Service>().unwrap();
//! assert_eq!(service.store.name(), "memory");
//! ```
//!
//! ## Resolution
//!
//! Resolution never constructs anything. [`resolve`] and [`Injector::resolve`]
//! return an [`Instantiator`]; invoking it builds the graph. The cache policy
//! chosen per satisfaction decides whether repeated invocations share
//! instances within a [`BuildSession`].

pub mod cache_policy;
pub mod catalog;
pub mod component;
pub mod config;
pub mod context;
pub mod descriptor;
pub mod desire;
pub mod error;
pub mod instantiator;
pub mod key;
pub mod lifecycle;
pub mod observer;
pub mod provider;
pub mod qualifier;
pub mod resolver;
pub mod rules;
pub mod satisfaction;
pub mod types;

pub use cache_policy::CachePolicy;
pub use catalog::ComponentCatalog;
pub use component::Component;
pub use config::{InjectorConfig, DEFAULT_MAX_DEPTH};
pub use context::{Context, ContextElement, ContextMatch, ContextPattern, ElementMatcher};
pub use descriptor::{
    Arguments, ComponentDescriptor, ConstructorDescriptor, DescriptorBuilder, HookDescriptor,
    MemberDescriptor,
};
pub use desire::{Desire, InjectionKind, InjectionPoint};
pub use error::{BoxError, DiError, DiResult, SharedError};
pub use instantiator::{Instantiator, InstantiatorExt};
pub use key::{key_of_type, TypeKey};
pub use lifecycle::{Dispose, LifecycleLedger, Teardown};
pub use observer::{ResolutionObserver, TracingObserver};
pub use provider::{provider_fn, ErasedProvider, FnProvider, Provider};
pub use qualifier::{
    Annotation, AnnotationType, MatcherKind, Named, Qualifier, QualifierMatcher, QualifierPredicate,
};
pub use resolver::{resolve, BuildSession, Injector, InjectorBuilder};
pub use rules::{BindRule, BindTarget, Binding, RuleModule, RuleSets, RuleSetsExt, Scope, ScopedRules};
pub use satisfaction::Satisfaction;
pub use types::{type_distance, FlatHierarchy, TypeHierarchy};

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn instance_binding_resolves_same_object() {
        let mut rules = RuleSets::new();
        let value = Arc::new(42usize);
        rules.bind::<usize>().to_instance(value.clone());

        let instantiator = resolve(Desire::of::<usize>(), &rules).unwrap();
        let a = instantiator.get_required::<usize>().unwrap();
        let b = instantiator.get_required::<usize>().unwrap();

        assert_eq!(*a, 42);
        assert!(Arc::ptr_eq(&a, &value));
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn class_default_builds_fresh_instances() {
        static BUILT: AtomicUsize = AtomicUsize::new(0);

        struct Counter(usize);

        let descriptor = ComponentDescriptor::builder::<Counter>()
            .constructor(vec![], |_| Ok(Counter(BUILT.fetch_add(1, Ordering::SeqCst))))
            .build()
            .unwrap();
        let mut catalog = ComponentCatalog::new();
        catalog.register(descriptor);

        let injector = Injector::new(RuleSets::new(), catalog);
        let instantiator = injector.resolve(Desire::of::<Counter>()).unwrap();
        let a = instantiator.get_required::<Counter>().unwrap();
        let b = instantiator.get_required::<Counter>().unwrap();

        assert_ne!(a.0, b.0);
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn unbound_type_is_unresolvable() {
        struct Missing;
        let err = resolve(Desire::of::<Missing>(), &RuleSets::new()).err().unwrap();
        assert!(matches!(err, DiError::Unresolvable(_)));
    }

    #[test]
    fn null_binding_fails_required_root() {
        let mut rules = RuleSets::new();
        rules.bind::<String>().to_null();

        let instantiator = resolve(Desire::of::<String>(), &rules).unwrap();
        assert!(instantiator.get::<String>().unwrap().is_none());
        assert!(instantiator.get_required::<String>().is_err());
    }
}
