//! Bind rules and the rule sets they are organized in.

mod binding;
mod module;

pub use binding::{Binding, RuleSets, Scope, ScopedRules};
pub use module::{RuleModule, RuleSetsExt};

use std::fmt;

use crate::cache_policy::CachePolicy;
use crate::desire::Desire;
use crate::key::TypeKey;
use crate::qualifier::QualifierMatcher;
use crate::satisfaction::Satisfaction;

/// What a bind rule rewrites a desire to.
#[derive(Debug, Clone, PartialEq)]
pub enum BindTarget {
    /// A concrete satisfaction; the rewritten desire is instantiable
    Satisfaction(Satisfaction),
    /// Another type, resolved further by later rules or its default
    Type(TypeKey),
}

impl BindTarget {
    pub fn type_key(&self) -> TypeKey {
        match self {
            BindTarget::Satisfaction(s) => s.erased_type(),
            BindTarget::Type(ty) => *ty,
        }
    }
}

impl fmt::Display for BindTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindTarget::Satisfaction(s) => write!(f, "{}", s),
            BindTarget::Type(ty) => f.write_str(ty.short_name()),
        }
    }
}

/// Rewrites desires for one source type into desires for a target.
///
/// A rule matches a desire when the desired type equals the source type
/// exactly and the rule's qualifier matcher accepts the desire's qualifier.
///
/// # Examples
///
/// ```rust
/// use ferrous_wire::{BindRule, BindTarget, Desire, Qualifier, QualifierMatcher, TypeKey};
///
/// trait Store: Send + Sync {}
/// struct MemoryStore;
///
/// let rule = BindRule::new(TypeKey::of::<dyn Store>(), BindTarget::Type(TypeKey::of::<MemoryStore>()))
///     .with_qualifier(QualifierMatcher::named("cache"))
///     .with_weight(5);
///
/// let desire = Desire::qualified::<dyn Store>(Qualifier::named("cache"));
/// assert!(rule.matches(&desire));
/// assert!(!rule.matches(&Desire::of::<dyn Store>()));
///
/// let rewritten = rule.apply(&desire);
/// assert_eq!(rewritten.desired_type(), TypeKey::of::<MemoryStore>());
/// assert_eq!(rewritten.injection_point(), desire.injection_point());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct BindRule {
    source: TypeKey,
    qualifier: QualifierMatcher,
    target: BindTarget,
    cache_policy: CachePolicy,
    weight: i32,
    terminate: bool,
}

impl BindRule {
    /// Rule with an any-qualifier matcher, weight 0 and no cache preference.
    pub fn new(source: TypeKey, target: BindTarget) -> Self {
        Self {
            source,
            qualifier: QualifierMatcher::any(),
            target,
            cache_policy: CachePolicy::NoPreference,
            weight: 0,
            terminate: false,
        }
    }

    pub fn with_qualifier(mut self, qualifier: QualifierMatcher) -> Self {
        self.qualifier = qualifier;
        self
    }

    /// Lower weights win among rules with equally specific contexts.
    pub fn with_weight(mut self, weight: i32) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_cache_policy(mut self, policy: CachePolicy) -> Self {
        self.cache_policy = policy;
        self
    }

    /// Stops the rewrite chain once this rule is applied.
    pub fn terminating(mut self, terminate: bool) -> Self {
        self.terminate = terminate;
        self
    }

    pub fn source(&self) -> TypeKey {
        self.source
    }

    pub fn qualifier(&self) -> &QualifierMatcher {
        &self.qualifier
    }

    pub fn target(&self) -> &BindTarget {
        &self.target
    }

    pub fn cache_policy(&self) -> CachePolicy {
        self.cache_policy
    }

    pub fn weight(&self) -> i32 {
        self.weight
    }

    pub fn terminates_chain(&self) -> bool {
        self.terminate
    }

    pub fn matches(&self, desire: &Desire) -> bool {
        desire.desired_type() == self.source && self.qualifier.matches(desire.qualifier())
    }

    /// The rewritten desire. The injection point is kept.
    pub fn apply(&self, desire: &Desire) -> Desire {
        match &self.target {
            BindTarget::Satisfaction(s) => desire.rewrite(s.erased_type(), Some(s.clone())),
            BindTarget::Type(ty) => desire.rewrite(*ty, None),
        }
    }
}

impl fmt::Display for BindRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Bind(weight={}, {} {} -> {}",
            self.weight,
            self.source.short_name(),
            self.qualifier,
            self.target
        )?;
        if self.cache_policy != CachePolicy::NoPreference {
            write!(f, ", {:?}", self.cache_policy)?;
        }
        if self.terminate {
            f.write_str(", terminal")?;
        }
        f.write_str(")")
    }
}
