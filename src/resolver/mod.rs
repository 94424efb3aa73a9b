//! The resolver: turns a root desire into a tree of instantiators.

mod rewrite;
mod stack;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use crate::cache_policy::CachePolicy;
use crate::catalog::ComponentCatalog;
use crate::config::InjectorConfig;
use crate::context::{Context, ContextElement};
use crate::desire::Desire;
use crate::error::{DiError, DiResult};
use crate::instantiator::{CastInstantiator, Instantiator, InstantiatorExt, MemoizedInstantiator};
use crate::lifecycle::LifecycleLedger;
use crate::observer::{Observers, ResolutionObserver};
use crate::qualifier::Qualifier;
use crate::rules::RuleSets;
use crate::satisfaction::{Satisfaction, SatisfactionKey};

use rewrite::{rewrite, Rewritten};
use stack::ResolutionStack;

struct InjectorInner {
    rules: RuleSets,
    catalog: ComponentCatalog,
    config: InjectorConfig,
    observers: Observers,
}

/// Resolves desires against a fixed set of rules and component metadata.
///
/// The injector is immutable and cheap to clone. Every resolution runs in a
/// [`BuildSession`]; [`Injector::get`] and [`Injector::resolve`] open a fresh
/// one per call.
///
/// # Examples
///
/// ```rust
/// use ferrous_wire::{ComponentDescriptor, Injector, InjectionPoint};
/// use std::sync::Arc;
///
/// struct Config { url: String }
/// struct Database { url: String }
///
/// let database = ComponentDescriptor::builder::<Database>()
///     .inject_constructor(vec![InjectionPoint::of::<Config>()], |args| {
///         Ok(Database { url: args.get::<Config>(0)?.url.clone() })
///     })
///     .build()
///     .unwrap();
///
/// let mut builder = Injector::builder();
/// builder.catalog_mut().register(database);
/// builder
///     .rules_mut()
///     .bind::<Config>()
///     .to_instance(Arc::new(Config { url: "postgres://localhost".to_string() }));
/// let injector = builder.build();
///
/// let db = injector.get::<Database>().unwrap();
/// assert_eq!(db.url, "postgres://localhost");
/// ```
#[derive(Clone)]
pub struct Injector {
    inner: Arc<InjectorInner>,
}

/// Collects rules, metadata, settings and observers for an [`Injector`].
#[derive(Default)]
pub struct InjectorBuilder {
    rules: RuleSets,
    catalog: ComponentCatalog,
    config: InjectorConfig,
    observers: Observers,
}

impl InjectorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rules(mut self, rules: RuleSets) -> Self {
        self.rules = rules;
        self
    }

    pub fn catalog(mut self, catalog: ComponentCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn config(mut self, config: InjectorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn observer(mut self, observer: Arc<dyn ResolutionObserver>) -> Self {
        self.observers.add(observer);
        self
    }

    pub fn rules_mut(&mut self) -> &mut RuleSets {
        &mut self.rules
    }

    pub fn catalog_mut(&mut self) -> &mut ComponentCatalog {
        &mut self.catalog
    }

    pub fn build(self) -> Injector {
        tracing::debug!(
            rules = self.rules.len(),
            components = self.catalog.len(),
            max_depth = self.config.max_depth,
            "building injector"
        );
        Injector {
            inner: Arc::new(InjectorInner {
                rules: self.rules,
                catalog: self.catalog,
                config: self.config,
                observers: self.observers,
            }),
        }
    }
}

impl Injector {
    /// Injector with default settings and no observers.
    pub fn new(rules: RuleSets, catalog: ComponentCatalog) -> Self {
        Self::builder().rules(rules).catalog(catalog).build()
    }

    pub fn builder() -> InjectorBuilder {
        InjectorBuilder::new()
    }

    pub fn rules(&self) -> &RuleSets {
        &self.inner.rules
    }

    pub fn catalog(&self) -> &ComponentCatalog {
        &self.inner.catalog
    }

    pub fn config(&self) -> &InjectorConfig {
        &self.inner.config
    }

    /// New build session without lifecycle tracking.
    pub fn session(&self) -> BuildSession {
        BuildSession {
            injector: self.clone(),
            ledger: None,
            memo: HashMap::new(),
        }
    }

    /// New build session recording constructed components in `ledger`.
    pub fn session_with_ledger(&self, ledger: LifecycleLedger) -> BuildSession {
        BuildSession {
            ledger: Some(ledger),
            ..self.session()
        }
    }

    /// Resolves `desire` in a fresh session.
    pub fn resolve(&self, desire: Desire) -> DiResult<Arc<dyn Instantiator>> {
        self.session().resolve(desire)
    }

    /// Resolves and instantiates an unqualified `T`.
    pub fn get<T: ?Sized + Send + Sync + 'static>(&self) -> DiResult<Arc<T>> {
        self.session().get::<T>()
    }

    /// Resolves and instantiates `T` carrying `qualifier`.
    pub fn get_qualified<T: ?Sized + Send + Sync + 'static>(
        &self,
        qualifier: Qualifier,
    ) -> DiResult<Arc<T>> {
        self.session().get_qualified::<T>(qualifier)
    }
}

/// One graph build.
///
/// Memoized satisfactions share a single instantiator for the lifetime of the
/// session, so every desire resolving to them within the session receives the
/// same instance.
pub struct BuildSession {
    injector: Injector,
    ledger: Option<LifecycleLedger>,
    memo: HashMap<(SatisfactionKey, CachePolicy), Arc<dyn Instantiator>>,
}

impl BuildSession {
    /// Resolves `desire` into an instantiator for its declared type.
    pub fn resolve(&mut self, desire: Desire) -> DiResult<Arc<dyn Instantiator>> {
        let stack = ResolutionStack::new(self.injector.inner.config.max_depth);
        self.resolve_desire(&desire, &Context::root(), &stack)
    }

    pub fn get<T: ?Sized + Send + Sync + 'static>(&mut self) -> DiResult<Arc<T>> {
        self.resolve(Desire::of::<T>())?.get_required::<T>()
    }

    pub fn get_qualified<T: ?Sized + Send + Sync + 'static>(
        &mut self,
        qualifier: Qualifier,
    ) -> DiResult<Arc<T>> {
        self.resolve(Desire::qualified::<T>(qualifier))?.get_required::<T>()
    }

    pub fn ledger(&self) -> Option<&LifecycleLedger> {
        self.ledger.as_ref()
    }

    /// Number of memoized instantiators held by the session.
    pub fn memoized(&self) -> usize {
        self.memo.len()
    }

    fn resolve_desire(
        &mut self,
        desire: &Desire,
        context: &Context,
        stack: &ResolutionStack,
    ) -> DiResult<Arc<dyn Instantiator>> {
        let inner = self.injector.inner.clone();
        let _span = tracing::debug_span!(
            "resolve",
            desire = desire.desired_type().short_name(),
            depth = stack.depth()
        )
        .entered();

        if !inner.observers.has_observers() {
            return self.resolve_frame(&inner, desire, context, stack);
        }

        inner.observers.resolving(desire);
        let start = Instant::now();
        let result = self.resolve_frame(&inner, desire, context, stack);
        match &result {
            Ok(instantiator) => {
                inner
                    .observers
                    .resolved(desire, instantiator.produced_type(), start.elapsed())
            }
            Err(e) => inner.observers.failed(desire, e),
        }
        result
    }

    fn resolve_frame(
        &mut self,
        inner: &InjectorInner,
        desire: &Desire,
        context: &Context,
        stack: &ResolutionStack,
    ) -> DiResult<Arc<dyn Instantiator>> {
        let Rewritten {
            desire: target,
            satisfaction,
            policy,
        } = rewrite(&inner.rules, &inner.catalog, desire, context)?;
        let policy = policy
            .or(satisfaction.default_cache_policy())
            .or(inner.config.default_cache_policy);
        let memo_key = (satisfaction.key(), policy);

        let cached = if policy.is_memoized() {
            self.memo.get(&memo_key).cloned()
        } else {
            None
        };

        let instantiator = match cached {
            Some(hit) => {
                tracing::trace!(satisfaction = %satisfaction, "memoized instantiator reused");
                hit
            }
            None => {
                let erased = satisfaction.erased_type();
                let _frame = stack.enter(memo_key.0, erased.display_name())?;
                let child_context = context.push(ContextElement::new(erased, desire.qualifier().cloned()));

                let dependencies = satisfaction.dependencies()?;
                let mut resolved = Vec::with_capacity(dependencies.len());
                for dependency in &dependencies {
                    resolved.push(self.resolve_desire(dependency, &child_context, stack)?);
                }

                let built = satisfaction.make_instantiator(
                    resolved,
                    self.ledger.clone(),
                    inner.config.catch_panics,
                )?;
                if policy.is_memoized() {
                    let shared: Arc<dyn Instantiator> = Arc::new(MemoizedInstantiator::new(built));
                    self.memo.insert(memo_key, shared.clone());
                    shared
                } else {
                    built
                }
            }
        };

        adapt(inner, instantiator, &target, &satisfaction)
    }
}

/// Wraps `instantiator` so it produces the type declared at the injection
/// point of the rewritten `desire`.
fn adapt(
    inner: &InjectorInner,
    instantiator: Arc<dyn Instantiator>,
    desire: &Desire,
    satisfaction: &Satisfaction,
) -> DiResult<Arc<dyn Instantiator>> {
    let declared = desire.injection_point().declared_type();
    let produced = instantiator.produced_type();
    if produced == declared || matches!(satisfaction, Satisfaction::Null(_)) {
        return Ok(instantiator);
    }
    match inner.catalog.cast(&produced, &declared) {
        Some(cast) => Ok(Arc::new(CastInstantiator::new(instantiator, declared, cast))),
        None => Err(DiError::configuration(format!(
            "{} resolved to {} but no conversion to {} is declared",
            desire, produced, declared
        ))),
    }
}

/// Resolves `root` against `rules` with an empty component catalog.
///
/// Only explicit satisfactions (instances, providers, classes bound through
/// rules) are available; use an [`Injector`] to add default satisfactions.
pub fn resolve(root: Desire, rules: &RuleSets) -> DiResult<Arc<dyn Instantiator>> {
    Injector::new(rules.clone(), ComponentCatalog::new()).resolve(root)
}
