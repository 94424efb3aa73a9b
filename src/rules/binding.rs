use std::sync::Arc;

use crate::cache_policy::CachePolicy;
use crate::context::{Context, ContextMatch, ContextPattern};
use crate::descriptor::ComponentDescriptor;
use crate::error::DiResult;
use crate::key::TypeKey;
use crate::provider::Provider;
use crate::qualifier::{Qualifier, QualifierMatcher};
use crate::satisfaction::Satisfaction;
use crate::types::TypeHierarchy;

use super::{BindRule, BindTarget};

/// The rules bound inside one context pattern.
#[derive(Debug, Clone)]
pub struct ScopedRules {
    pattern: ContextPattern,
    rules: Vec<BindRule>,
}

impl ScopedRules {
    pub fn pattern(&self) -> &ContextPattern {
        &self.pattern
    }

    pub fn rules(&self) -> &[BindRule] {
        &self.rules
    }
}

/// Rule sets keyed by context pattern.
///
/// The global scope (empty pattern) applies everywhere. Other scopes apply
/// only while the current context matches their pattern.
///
/// # Examples
///
/// ```rust
/// use ferrous_wire::{ContextPattern, RuleSets, Qualifier};
/// use std::sync::Arc;
///
/// struct Server;
///
/// let mut rules = RuleSets::new();
/// rules
///     .bind::<u16>()
///     .to_instance(Arc::new(8080u16))
///     .bind::<String>()
///     .qualified_with(Qualifier::named("host"))
///     .to_instance(Arc::new("localhost".to_string()));
/// rules
///     .within(ContextPattern::within::<Server>())
///     .bind::<u16>()
///     .to_instance(Arc::new(9090u16));
///
/// assert_eq!(rules.len(), 3);
/// assert_eq!(rules.scopes().len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RuleSets {
    scopes: Vec<ScopedRules>,
}

impl RuleSets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `rule` to the scope for `pattern`, creating the scope if needed.
    pub fn add(&mut self, pattern: ContextPattern, rule: BindRule) -> &mut Self {
        tracing::trace!(pattern = %pattern, rule = %rule, "adding bind rule");
        match self.scopes.iter_mut().find(|s| s.pattern == pattern) {
            Some(scope) => scope.rules.push(rule),
            None => self.scopes.push(ScopedRules {
                pattern,
                rules: vec![rule],
            }),
        }
        self
    }

    pub fn add_global(&mut self, rule: BindRule) -> &mut Self {
        self.add(ContextPattern::global(), rule)
    }

    /// Starts a global binding for desires of `S`.
    pub fn bind<S: ?Sized + 'static>(&mut self) -> Binding<'_> {
        Binding::new(self, ContextPattern::global(), TypeKey::of::<S>())
    }

    /// Bindings applying only inside contexts matching `pattern`.
    pub fn within(&mut self, pattern: ContextPattern) -> Scope<'_> {
        Scope {
            rules: self,
            pattern,
        }
    }

    pub fn scopes(&self) -> &[ScopedRules] {
        &self.scopes
    }

    /// Total number of rules across every scope.
    pub fn len(&self) -> usize {
        self.scopes.iter().map(|s| s.rules.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Scopes whose pattern matches `context`, most specific first.
    pub(crate) fn applicable<H>(&self, context: &Context, hierarchy: &H) -> Vec<(usize, ContextMatch)>
    where
        H: TypeHierarchy + ?Sized,
    {
        let mut matched: Vec<_> = self
            .scopes
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.pattern.matches(context, hierarchy).map(|m| (i, m)))
            .collect();
        matched.sort_by(|a, b| a.1.cmp(&b.1));
        matched
    }

    /// Human-readable listing of every scope and rule.
    #[cfg(feature = "diagnostics")]
    pub fn to_debug_string(&self) -> String {
        use std::fmt::Write;

        let mut out = String::new();
        for scope in &self.scopes {
            let _ = writeln!(out, "{}:", scope.pattern);
            for rule in &scope.rules {
                let _ = writeln!(out, "  {}", rule);
            }
        }
        out
    }
}

/// Bindings scoped to one context pattern.
pub struct Scope<'a> {
    rules: &'a mut RuleSets,
    pattern: ContextPattern,
}

impl<'a> Scope<'a> {
    pub fn bind<S: ?Sized + 'static>(self) -> Binding<'a> {
        Binding::new(self.rules, self.pattern, TypeKey::of::<S>())
    }
}

/// Fluent builder for one bind rule.
///
/// The terminal `to_*` methods add the rule and hand the rule sets back, so
/// bindings chain.
#[must_use = "a binding does nothing until a `to_*` method is called"]
pub struct Binding<'a> {
    rules: &'a mut RuleSets,
    pattern: ContextPattern,
    source: TypeKey,
    qualifier: QualifierMatcher,
    weight: i32,
    terminate: bool,
    cache_policy: CachePolicy,
}

impl<'a> Binding<'a> {
    fn new(rules: &'a mut RuleSets, pattern: ContextPattern, source: TypeKey) -> Self {
        Self {
            rules,
            pattern,
            source,
            qualifier: QualifierMatcher::any(),
            weight: 0,
            terminate: false,
            cache_policy: CachePolicy::NoPreference,
        }
    }

    /// Restricts the binding to desires carrying `qualifier`.
    pub fn qualified_with(self, qualifier: Qualifier) -> Self {
        self.matching(QualifierMatcher::by_value(qualifier))
    }

    /// Restricts the binding to qualifiers accepted by `matcher`.
    pub fn matching(mut self, matcher: QualifierMatcher) -> Self {
        self.qualifier = matcher;
        self
    }

    /// Restricts the binding to unqualified desires.
    pub fn unqualified(self) -> Self {
        self.matching(QualifierMatcher::none())
    }

    /// Precedence among rules in equally specific scopes; lower wins.
    pub fn weight(mut self, weight: i32) -> Self {
        self.weight = weight;
        self
    }

    /// Stops rewriting once this binding is applied.
    pub fn terminate(mut self) -> Self {
        self.terminate = true;
        self
    }

    pub fn cache(mut self, policy: CachePolicy) -> Self {
        self.cache_policy = policy;
        self
    }

    /// Shorthand for `cache(CachePolicy::Memoize)`.
    pub fn shared(self) -> Self {
        self.cache(CachePolicy::Memoize)
    }

    /// Shorthand for `cache(CachePolicy::NewInstance)`.
    pub fn unshared(self) -> Self {
        self.cache(CachePolicy::NewInstance)
    }

    fn finish(self, target: BindTarget) -> &'a mut RuleSets {
        let rule = BindRule::new(self.source, target)
            .with_qualifier(self.qualifier)
            .with_weight(self.weight)
            .with_cache_policy(self.cache_policy)
            .terminating(self.terminate);
        self.rules.add(self.pattern, rule)
    }

    /// Rewrites desires to the type `T`.
    pub fn to_type<T: ?Sized + 'static>(self) -> &'a mut RuleSets {
        self.to_type_key(TypeKey::of::<T>())
    }

    pub fn to_type_key(self, ty: TypeKey) -> &'a mut RuleSets {
        self.finish(BindTarget::Type(ty))
    }

    /// Satisfies desires with a fixed satisfaction.
    pub fn to_satisfaction(self, satisfaction: Satisfaction) -> &'a mut RuleSets {
        self.finish(BindTarget::Satisfaction(satisfaction))
    }

    /// Satisfies desires by building `descriptor`.
    ///
    /// Fails when the descriptor has no usable constructor.
    pub fn to_class(self, descriptor: &Arc<ComponentDescriptor>) -> DiResult<&'a mut RuleSets> {
        let satisfaction = Satisfaction::class(descriptor.clone())?;
        Ok(self.to_satisfaction(satisfaction))
    }

    /// Satisfies desires with an existing object.
    pub fn to_instance<T: ?Sized + Send + Sync + 'static>(self, value: Arc<T>) -> &'a mut RuleSets {
        self.to_satisfaction(Satisfaction::instance(value))
    }

    /// Satisfies desires by calling `provider`.
    pub fn to_provider<P: Provider>(self, provider: P) -> &'a mut RuleSets {
        self.to_satisfaction(Satisfaction::provider(provider))
    }

    /// Satisfies desires by building the provider `descriptor`, then calling it.
    pub fn to_provider_class(
        self,
        descriptor: &Arc<ComponentDescriptor>,
    ) -> DiResult<&'a mut RuleSets> {
        let satisfaction = Satisfaction::provider_class(descriptor.clone())?;
        Ok(self.to_satisfaction(satisfaction))
    }

    /// Satisfies desires with null.
    pub fn to_null(self) -> &'a mut RuleSets {
        let source = self.source;
        self.to_satisfaction(Satisfaction::Null(source))
    }
}
