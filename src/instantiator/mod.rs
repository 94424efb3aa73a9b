//! Instantiators: reusable handles producing instances of a resolved graph.
//!
//! Resolution does not construct anything. It produces a tree of
//! instantiators, and invoking the root one builds the whole object graph.

mod class;
mod provider;

pub(crate) use class::ClassInstantiator;
pub(crate) use provider::ProviderInstantiator;

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::component::Component;
use crate::descriptor::CastFn;
use crate::error::{BoxError, DiError, DiResult, PanicError};
use crate::key::TypeKey;

/// Handle producing instances of one type.
///
/// Depending on the cache policy chosen at resolution time, each call builds
/// a new instance or returns a shared one. `Ok(None)` is a null value.
pub trait Instantiator: Send + Sync {
    /// The type of the values produced.
    fn produced_type(&self) -> TypeKey;

    fn instantiate(&self) -> DiResult<Option<Component>>;
}

impl fmt::Debug for dyn Instantiator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Instantiator({})", self.produced_type())
    }
}

/// Typed access to instantiated values.
///
/// # Examples
///
/// ```rust
/// use ferrous_wire::{resolve, Desire, InstantiatorExt, RuleSets};
/// use std::sync::Arc;
///
/// let mut rules = RuleSets::new();
/// rules.bind::<String>().to_instance(Arc::new("hello".to_string()));
///
/// let instantiator = resolve(Desire::of::<String>(), &rules).unwrap();
/// assert_eq!(*instantiator.get_required::<String>().unwrap(), "hello");
/// ```
pub trait InstantiatorExt {
    /// Instantiates and downcasts, `None` for a null value.
    fn get<T: ?Sized + Send + Sync + 'static>(&self) -> DiResult<Option<Arc<T>>>;

    /// Instantiates and downcasts, failing on a null value.
    fn get_required<T: ?Sized + Send + Sync + 'static>(&self) -> DiResult<Arc<T>>;
}

impl<I: Instantiator + ?Sized> InstantiatorExt for I {
    fn get<T: ?Sized + Send + Sync + 'static>(&self) -> DiResult<Option<Arc<T>>> {
        self.instantiate()?.map(|c| c.downcast::<T>()).transpose()
    }

    fn get_required<T: ?Sized + Send + Sync + 'static>(&self) -> DiResult<Arc<T>> {
        self.get::<T>()?
            .ok_or_else(|| DiError::NullDependency(std::any::type_name::<T>().to_string()))
    }
}

/// Runs a user callback, turning panics into errors when `catch_panics` is set.
pub(crate) fn guarded<R>(
    catch_panics: bool,
    f: impl FnOnce() -> Result<R, BoxError>,
) -> Result<R, BoxError> {
    if !catch_panics {
        return f();
    }
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => Err(Box::new(PanicError::from_payload(payload))),
    }
}

/// Always returns the same pre-existing object.
pub(crate) struct InstanceInstantiator {
    component: Component,
}

impl InstanceInstantiator {
    pub(crate) fn new(component: Component) -> Self {
        Self { component }
    }
}

impl Instantiator for InstanceInstantiator {
    fn produced_type(&self) -> TypeKey {
        self.component.type_key()
    }

    fn instantiate(&self) -> DiResult<Option<Component>> {
        Ok(Some(self.component.clone()))
    }
}

/// Always returns a null value.
pub(crate) struct NullInstantiator {
    ty: TypeKey,
}

impl NullInstantiator {
    pub(crate) fn new(ty: TypeKey) -> Self {
        Self { ty }
    }
}

impl Instantiator for NullInstantiator {
    fn produced_type(&self) -> TypeKey {
        self.ty
    }

    fn instantiate(&self) -> DiResult<Option<Component>> {
        Ok(None)
    }
}

/// Invokes the wrapped instantiator once and replays its result.
///
/// Failed invocations are not cached, the next call tries again.
pub(crate) struct MemoizedInstantiator {
    inner: Arc<dyn Instantiator>,
    cell: OnceCell<Option<Component>>,
}

impl MemoizedInstantiator {
    pub(crate) fn new(inner: Arc<dyn Instantiator>) -> Self {
        Self {
            inner,
            cell: OnceCell::new(),
        }
    }
}

impl Instantiator for MemoizedInstantiator {
    fn produced_type(&self) -> TypeKey {
        self.inner.produced_type()
    }

    fn instantiate(&self) -> DiResult<Option<Component>> {
        self.cell
            .get_or_try_init(|| self.inner.instantiate())
            .map(Clone::clone)
    }
}

/// Converts produced values to the type declared at the injection point.
pub(crate) struct CastInstantiator {
    inner: Arc<dyn Instantiator>,
    target: TypeKey,
    cast: CastFn,
}

impl CastInstantiator {
    pub(crate) fn new(inner: Arc<dyn Instantiator>, target: TypeKey, cast: CastFn) -> Self {
        Self { inner, target, cast }
    }
}

impl Instantiator for CastInstantiator {
    fn produced_type(&self) -> TypeKey {
        self.target
    }

    fn instantiate(&self) -> DiResult<Option<Component>> {
        self.inner
            .instantiate()?
            .map(|c| (self.cast)(&c))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting {
        calls: AtomicUsize,
    }

    impl Instantiator for Counting {
        fn produced_type(&self) -> TypeKey {
            TypeKey::of::<usize>()
        }

        fn instantiate(&self) -> DiResult<Option<Component>> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Some(Component::new(Arc::new(n))))
        }
    }

    #[test]
    fn memoized_invokes_once() {
        let counting = Arc::new(Counting { calls: AtomicUsize::new(0) });
        let memo = MemoizedInstantiator::new(counting.clone());

        let a = memo.instantiate().unwrap().unwrap();
        let b = memo.instantiate().unwrap().unwrap();
        assert!(a.ptr_eq(&b));
        assert_eq!(counting.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn guarded_turns_panics_into_errors() {
        let result: Result<(), BoxError> = guarded(true, || panic!("boom"));
        let err = result.unwrap_err();
        assert_eq!(err.to_string(), "panicked: boom");
    }

    #[test]
    fn null_instantiator_yields_none() {
        let null = NullInstantiator::new(TypeKey::of::<String>());
        assert!(null.instantiate().unwrap().is_none());
        assert!(matches!(
            null.get_required::<String>(),
            Err(DiError::NullDependency(_))
        ));
    }
}
