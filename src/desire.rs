//! Injection points and desires.

use std::fmt;

use crate::key::TypeKey;
use crate::qualifier::Qualifier;
use crate::satisfaction::Satisfaction;

/// Where an injection point sits on its owning component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InjectionKind {
    /// Requested directly by the caller
    Root,
    /// Constructor parameter at `index`
    ConstructorParameter { index: usize },
    /// Field or setter, `ordinal` is its declaration order
    Member { name: &'static str, ordinal: usize },
}

/// A parameter or member that needs a dependency.
///
/// # Examples
///
/// ```rust
/// use ferrous_wire::{InjectionPoint, Qualifier, TypeKey};
///
/// struct Database;
///
/// let point = InjectionPoint::of::<Database>()
///     .qualified(Qualifier::named("primary"))
///     .optional();
///
/// assert_eq!(point.declared_type(), TypeKey::of::<Database>());
/// assert!(point.is_optional());
/// assert_eq!(point.qualifier(), Some(&Qualifier::named("primary")));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InjectionPoint {
    ty: TypeKey,
    qualifier: Option<Qualifier>,
    optional: bool,
    kind: InjectionKind,
    owner: Option<TypeKey>,
}

impl InjectionPoint {
    /// Required, unqualified root point for `T`.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::for_type(TypeKey::of::<T>())
    }

    /// Required, unqualified root point for a type key.
    pub fn for_type(ty: TypeKey) -> Self {
        Self {
            ty,
            qualifier: None,
            optional: false,
            kind: InjectionKind::Root,
            owner: None,
        }
    }

    pub fn qualified(mut self, qualifier: Qualifier) -> Self {
        self.qualifier = Some(qualifier);
        self
    }

    /// Marks the point as accepting a null dependency.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub(crate) fn placed(mut self, owner: TypeKey, kind: InjectionKind) -> Self {
        self.owner = Some(owner);
        self.kind = kind;
        self
    }

    pub fn declared_type(&self) -> TypeKey {
        self.ty
    }

    pub fn qualifier(&self) -> Option<&Qualifier> {
        self.qualifier.as_ref()
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn kind(&self) -> InjectionKind {
        self.kind
    }

    /// Component declaring this point, `None` for root points.
    pub fn owner(&self) -> Option<TypeKey> {
        self.owner
    }
}

impl fmt::Display for InjectionPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let owner = self.owner.map(|o| o.short_name()).unwrap_or("<root>");
        match self.kind {
            InjectionKind::Root => write!(f, "root")?,
            InjectionKind::ConstructorParameter { index } => {
                write!(f, "parameter {} of {}", index, owner)?
            }
            InjectionKind::Member { name, .. } => write!(f, "member `{}` of {}", name, owner)?,
        }
        write!(f, " ({}", self.ty.short_name())?;
        if let Some(q) = &self.qualifier {
            write!(f, " {}", q)?;
        }
        if self.optional {
            f.write_str(", optional")?;
        }
        f.write_str(")")
    }
}

/// A request for a dependency: type, qualifier and injection point.
///
/// Desires are immutable. Applying a bind rule produces a new desire that
/// keeps the original injection point.
#[derive(Debug, Clone, PartialEq)]
pub struct Desire {
    desired_type: TypeKey,
    point: InjectionPoint,
    satisfaction: Option<Satisfaction>,
}

impl Desire {
    /// Desire for the declared type of `point`.
    pub fn new(point: InjectionPoint) -> Self {
        Self {
            desired_type: point.declared_type(),
            point,
            satisfaction: None,
        }
    }

    /// Unqualified root desire for `T`.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::new(InjectionPoint::of::<T>())
    }

    /// Root desire for `T` carrying `qualifier`.
    pub fn qualified<T: ?Sized + 'static>(qualifier: Qualifier) -> Self {
        Self::new(InjectionPoint::of::<T>().qualified(qualifier))
    }

    /// Same desire with `satisfaction` as its default.
    pub fn with_satisfaction(mut self, satisfaction: Satisfaction) -> Self {
        self.satisfaction = Some(satisfaction);
        self
    }

    pub(crate) fn rewrite(&self, desired_type: TypeKey, satisfaction: Option<Satisfaction>) -> Self {
        Self {
            desired_type,
            point: self.point.clone(),
            satisfaction,
        }
    }

    pub fn desired_type(&self) -> TypeKey {
        self.desired_type
    }

    pub fn qualifier(&self) -> Option<&Qualifier> {
        self.point.qualifier()
    }

    pub fn injection_point(&self) -> &InjectionPoint {
        &self.point
    }

    pub fn satisfaction(&self) -> Option<&Satisfaction> {
        self.satisfaction.as_ref()
    }

    /// True when the desire already carries a concrete satisfaction.
    pub fn is_instantiable(&self) -> bool {
        self.satisfaction.is_some()
    }
}

impl fmt::Display for Desire {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Desire({}", self.desired_type)?;
        if let Some(q) = self.qualifier() {
            write!(f, " {}", q)?;
        }
        write!(f, " at {})", self.point)
    }
}
