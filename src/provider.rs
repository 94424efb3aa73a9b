//! Factory objects producing one instance of a declared type.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::component::Component;
use crate::error::BoxError;
use crate::key::TypeKey;

/// A factory whose only contract is producing an instance of `Output`.
///
/// Returning `Ok(None)` produces a null dependency, accepted only by optional
/// injection points.
///
/// # Examples
///
/// ```rust
/// use ferrous_wire::{BoxError, Provider};
/// use std::sync::Arc;
///
/// struct Counter { start: u32 }
///
/// impl Provider for Counter {
///     type Output = u32;
///     fn get(&self) -> Result<Option<Arc<u32>>, BoxError> {
///         Ok(Some(Arc::new(self.start)))
///     }
/// }
///
/// let value = Counter { start: 7 }.get().unwrap();
/// assert_eq!(value.as_deref(), Some(&7));
/// ```
pub trait Provider: Send + Sync + 'static {
    /// The produced type, recorded once when the provider is bound.
    type Output: ?Sized + Send + Sync + 'static;

    fn get(&self) -> Result<Option<Arc<Self::Output>>, BoxError>;
}

/// Object-safe view of a [`Provider`].
pub trait ErasedProvider: Send + Sync {
    fn provided_type(&self) -> TypeKey;
    fn provide(&self) -> Result<Option<Component>, BoxError>;
}

impl<P: Provider> ErasedProvider for P {
    fn provided_type(&self) -> TypeKey {
        TypeKey::of::<P::Output>()
    }

    fn provide(&self) -> Result<Option<Component>, BoxError> {
        Ok(self.get()?.map(Component::new))
    }
}

impl fmt::Debug for dyn ErasedProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Provider({})", self.provided_type())
    }
}

/// Provider backed by a closure.
pub struct FnProvider<O: ?Sized, F> {
    f: F,
    _output: PhantomData<fn() -> Arc<O>>,
}

impl<O, F> Provider for FnProvider<O, F>
where
    O: ?Sized + Send + Sync + 'static,
    F: Fn() -> Result<Option<Arc<O>>, BoxError> + Send + Sync + 'static,
{
    type Output = O;

    fn get(&self) -> Result<Option<Arc<O>>, BoxError> {
        (self.f)()
    }
}

/// Wraps a closure into a [`Provider`].
pub fn provider_fn<O, F>(f: F) -> FnProvider<O, F>
where
    O: ?Sized + Send + Sync + 'static,
    F: Fn() -> Result<Option<Arc<O>>, BoxError> + Send + Sync + 'static,
{
    FnProvider {
        f,
        _output: PhantomData,
    }
}
