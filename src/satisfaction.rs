//! Satisfactions: the concrete ways a desire can be fulfilled.

use std::fmt;
use std::sync::Arc;

use crate::cache_policy::CachePolicy;
use crate::component::Component;
use crate::descriptor::ComponentDescriptor;
use crate::desire::Desire;
use crate::error::{DiError, DiResult};
use crate::instantiator::{
    ClassInstantiator, InstanceInstantiator, Instantiator, NullInstantiator, ProviderInstantiator,
};
use crate::key::TypeKey;
use crate::lifecycle::LifecycleLedger;
use crate::provider::{ErasedProvider, Provider};

/// A concrete way to fulfil a desire.
///
/// Satisfactions are compared by identity: instances and provider instances
/// by pointer, classes and provider classes by type.
///
/// # Examples
///
/// ```rust
/// use ferrous_wire::{Satisfaction, TypeKey};
/// use std::sync::Arc;
///
/// let shared = Arc::new(42u32);
/// let a = Satisfaction::instance(shared.clone());
/// let b = Satisfaction::instance(shared);
///
/// assert_eq!(a, b);
/// assert_eq!(a.erased_type(), TypeKey::of::<u32>());
/// assert!(a.dependencies().unwrap().is_empty());
/// assert!(!a.can_produce_null());
/// assert!(Satisfaction::null::<u32>().can_produce_null());
/// ```
#[derive(Clone)]
pub enum Satisfaction {
    /// A pre-existing object, returned as is
    Instance(Component),
    /// A component built through its injectable constructor
    Class(Arc<ComponentDescriptor>),
    /// A provider component built first, then asked for its output
    ProviderClass(Arc<ComponentDescriptor>),
    /// A provider object supplied by the caller
    ProviderInstance(Arc<dyn ErasedProvider>),
    /// Always produces no value
    Null(TypeKey),
}

/// Identity of a satisfaction, used for memoization and cycle detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum SatisfactionKey {
    Instance(usize),
    Class(TypeKey),
    ProviderClass(TypeKey),
    ProviderInstance(usize),
    Null(TypeKey),
}

impl Satisfaction {
    /// Wraps an existing object.
    pub fn instance<T: ?Sized + Send + Sync + 'static>(value: Arc<T>) -> Self {
        Satisfaction::Instance(Component::new(value))
    }

    /// Satisfaction building `descriptor` through its injectable constructor.
    ///
    /// Fails when the descriptor has no usable constructor.
    pub fn class(descriptor: Arc<ComponentDescriptor>) -> DiResult<Self> {
        descriptor.injectable_constructor()?;
        Ok(Satisfaction::Class(descriptor))
    }

    /// Satisfaction building the provider `descriptor`, then calling it.
    pub fn provider_class(descriptor: Arc<ComponentDescriptor>) -> DiResult<Self> {
        if !descriptor.is_provider() {
            return Err(DiError::configuration(format!(
                "{} is not a provider",
                descriptor.type_key()
            )));
        }
        descriptor.injectable_constructor()?;
        Ok(Satisfaction::ProviderClass(descriptor))
    }

    /// Satisfaction calling an existing provider object.
    pub fn provider<P: Provider>(provider: P) -> Self {
        Satisfaction::ProviderInstance(Arc::new(provider))
    }

    /// Satisfaction that always yields null for `T`.
    pub fn null<T: ?Sized + 'static>() -> Self {
        Satisfaction::Null(TypeKey::of::<T>())
    }

    /// The type this satisfaction produces.
    pub fn erased_type(&self) -> TypeKey {
        match self {
            Satisfaction::Instance(c) => c.type_key(),
            Satisfaction::Class(d) => d.type_key(),
            Satisfaction::ProviderClass(d) => d.provided_type().unwrap_or_else(|| d.type_key()),
            Satisfaction::ProviderInstance(p) => p.provided_type(),
            Satisfaction::Null(ty) => *ty,
        }
    }

    /// Desires that must be resolved before this satisfaction can produce.
    ///
    /// Instances, provider instances and nulls have none. Classes and provider
    /// classes need the parameters of their injectable constructor followed by
    /// every injectable member.
    pub fn dependencies(&self) -> DiResult<Vec<Desire>> {
        match self {
            Satisfaction::Class(d) | Satisfaction::ProviderClass(d) => Ok(d
                .injection_points()?
                .into_iter()
                .map(Desire::new)
                .collect()),
            _ => Ok(Vec::new()),
        }
    }

    /// Whether the produced value may be null.
    pub fn can_produce_null(&self) -> bool {
        matches!(
            self,
            Satisfaction::ProviderClass(_)
                | Satisfaction::ProviderInstance(_)
                | Satisfaction::Null(_)
        )
    }

    /// Policy applying when neither the rule nor the caller chose one.
    pub fn default_cache_policy(&self) -> CachePolicy {
        match self {
            Satisfaction::Class(d) | Satisfaction::ProviderClass(d) => d.default_cache_policy(),
            _ => CachePolicy::NoPreference,
        }
    }

    pub(crate) fn key(&self) -> SatisfactionKey {
        match self {
            Satisfaction::Instance(c) => SatisfactionKey::Instance(c.addr()),
            Satisfaction::Class(d) => SatisfactionKey::Class(d.type_key()),
            Satisfaction::ProviderClass(d) => SatisfactionKey::ProviderClass(d.type_key()),
            Satisfaction::ProviderInstance(p) => {
                SatisfactionKey::ProviderInstance(Arc::as_ptr(p) as *const () as usize)
            }
            Satisfaction::Null(ty) => SatisfactionKey::Null(*ty),
        }
    }

    /// Builds the instantiator over already-resolved dependency instantiators.
    ///
    /// `dependencies` follows the order of [`dependencies`](Self::dependencies).
    pub(crate) fn make_instantiator(
        &self,
        dependencies: Vec<Arc<dyn Instantiator>>,
        ledger: Option<LifecycleLedger>,
        catch_panics: bool,
    ) -> DiResult<Arc<dyn Instantiator>> {
        Ok(match self {
            Satisfaction::Instance(c) => Arc::new(InstanceInstantiator::new(c.clone())),
            Satisfaction::Class(d) => Arc::new(ClassInstantiator::new(
                d.clone(),
                dependencies,
                ledger,
                catch_panics,
            )?),
            Satisfaction::ProviderClass(d) => {
                let factory = ClassInstantiator::new(d.clone(), dependencies, ledger, catch_panics)?;
                Arc::new(ProviderInstantiator::built(d.clone(), factory, catch_panics)?)
            }
            Satisfaction::ProviderInstance(p) => {
                Arc::new(ProviderInstantiator::fixed(p.clone(), catch_panics))
            }
            Satisfaction::Null(ty) => Arc::new(NullInstantiator::new(*ty)),
        })
    }
}

impl PartialEq for Satisfaction {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Satisfaction {}

impl fmt::Debug for Satisfaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Satisfaction::Instance(c) => write!(f, "Instance({})", c.type_key()),
            Satisfaction::Class(d) => write!(f, "Class({})", d.type_key()),
            Satisfaction::ProviderClass(d) => write!(f, "ProviderClass({})", d.type_key()),
            Satisfaction::ProviderInstance(p) => write!(f, "ProviderInstance({})", p.provided_type()),
            Satisfaction::Null(ty) => write!(f, "Null({})", ty),
        }
    }
}

impl fmt::Display for Satisfaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
