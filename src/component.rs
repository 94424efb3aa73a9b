//! Type-erased component values.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::key::TypeKey;

// Type-erased Arc for storage
pub(crate) type AnyArc = Arc<dyn Any + Send + Sync>;

// Type-erased value under construction
pub(crate) type AnyBox = Box<dyn Any + Send + Sync>;

/// A constructed component, type-erased.
///
/// A component always wraps an `Arc<T>` where `T` is the type it was produced
/// as, so trait objects (`Arc<dyn Trait>`) travel through the graph the same
/// way concrete types do.
///
/// # Examples
///
/// ```rust
/// use ferrous_wire::{Component, TypeKey};
/// use std::sync::Arc;
///
/// trait Greeter: Send + Sync {
///     fn greet(&self) -> String;
/// }
/// struct English;
/// impl Greeter for English {
///     fn greet(&self) -> String { "hello".to_string() }
/// }
///
/// let component = Component::new(Arc::new(English) as Arc<dyn Greeter>);
/// assert_eq!(component.type_key(), TypeKey::of::<dyn Greeter>());
/// assert_eq!(component.downcast::<dyn Greeter>().unwrap().greet(), "hello");
/// assert!(component.downcast::<English>().is_err());
/// ```
#[derive(Clone)]
pub struct Component {
    ty: TypeKey,
    addr: usize,
    value: AnyArc,
}

impl Component {
    pub fn new<T: ?Sized + Send + Sync + 'static>(value: Arc<T>) -> Self {
        Self {
            ty: TypeKey::of::<T>(),
            addr: Arc::as_ptr(&value) as *const () as usize,
            value: Arc::new(value),
        }
    }

    /// The type this component was produced as.
    pub fn type_key(&self) -> TypeKey {
        self.ty
    }

    /// Recovers the typed `Arc<T>`.
    pub fn downcast<T: ?Sized + Send + Sync + 'static>(&self) -> DiResult<Arc<T>> {
        self.value
            .downcast_ref::<Arc<T>>()
            .cloned()
            .ok_or(DiError::TypeMismatch(std::any::type_name::<T>()))
    }

    pub fn is<T: ?Sized + Send + Sync + 'static>(&self) -> bool {
        self.value.is::<Arc<T>>()
    }

    /// True when both handles refer to the same produced value.
    pub fn ptr_eq(&self, other: &Component) -> bool {
        self.addr == other.addr && self.ty == other.ty
    }

    /// Address of the wrapped value, shared by every `Arc` clone of it.
    pub(crate) fn addr(&self) -> usize {
        self.addr
    }

    /// Borrow of the wrapped `T` as `dyn Any`, for sized component types.
    pub(crate) fn view<T: Any + Send + Sync>(&self) -> Option<&(dyn Any + Send + Sync)> {
        self.value
            .downcast_ref::<Arc<T>>()
            .map(|arc| &**arc as &(dyn Any + Send + Sync))
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Component({})", self.ty)
    }
}
