//! Type keys identifying component, provider and qualifier types.

use std::any::TypeId;
use std::fmt;

/// Key identifying a Rust type inside the resolution engine.
///
/// Keys carry the `TypeId` for lookup and the `type_name` for diagnostics.
/// Equality, ordering and hashing only look at the `TypeId`.
///
/// # Examples
///
/// ```rust
/// use ferrous_wire::TypeKey;
///
/// let key = TypeKey::of::<String>();
/// assert_eq!(key, TypeKey::of::<String>());
/// assert_ne!(key, TypeKey::of::<u32>());
/// assert_eq!(key.display_name(), "alloc::string::String");
/// assert_eq!(key.short_name(), "String");
/// ```
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    /// Key for the type `T`, including unsized types such as `dyn Trait`.
    #[inline(always)]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// The underlying `TypeId`.
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.id
    }

    /// Get the full type name for display
    pub fn display_name(&self) -> &'static str {
        self.name
    }

    /// Type name with the module path stripped, generics kept.
    pub fn short_name(&self) -> &'static str {
        let head = match self.name.find('<') {
            Some(pos) => &self.name[..pos],
            None => self.name,
        };
        match head.rfind("::") {
            Some(pos) => &self.name[pos + 2..],
            None => self.name,
        }
    }
}

impl PartialEq for TypeKey {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl PartialOrd for TypeKey {
    #[inline(always)]
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TypeKey {
    #[inline(always)]
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.id.cmp(&other.id)
    }
}

// TypeId-only hash, the name is diagnostic
impl std::hash::Hash for TypeKey {
    #[inline(always)]
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeKey({})", self.name)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

// Helper function for creating type keys
#[inline(always)]
pub fn key_of_type<T: ?Sized + 'static>() -> TypeKey {
    TypeKey::of::<T>()
}
