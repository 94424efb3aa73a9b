//! Qualifiers and qualifier matchers.
//!
//! A [`Qualifier`] discriminates between several implementations of the same
//! type at an injection point. Bind rules and context patterns select
//! qualifiers through a [`QualifierMatcher`].

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::key::TypeKey;

/// Marker trait for annotation types usable as discriminators.
///
/// Only annotation types that set `QUALIFIER = true` may back a qualifier or a
/// qualifier matcher; anything else is rejected at construction.
///
/// # Examples
///
/// ```rust
/// use ferrous_wire::{Annotation, Qualifier, QualifierMatcher};
///
/// struct Fast;
/// impl Annotation for Fast {
///     const QUALIFIER: bool = true;
/// }
///
/// struct Documented;
/// impl Annotation for Documented {}
///
/// assert!(Qualifier::of::<Fast>().is_ok());
/// assert!(QualifierMatcher::by_type::<Documented>().is_err());
/// ```
pub trait Annotation: Send + Sync + 'static {
    /// Whether this annotation type is a qualifier.
    const QUALIFIER: bool = false;
}

/// Built-in qualifier for string-named bindings.
#[derive(Debug, Clone, Copy)]
pub struct Named;

impl Annotation for Named {
    const QUALIFIER: bool = true;
}

/// Runtime handle on an annotation type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnnotationType {
    key: TypeKey,
    qualifier: bool,
}

impl AnnotationType {
    /// Handle for the annotation type `A`.
    pub fn of<A: Annotation>() -> Self {
        Self {
            key: TypeKey::of::<A>(),
            qualifier: A::QUALIFIER,
        }
    }

    /// Handle built from externally supplied metadata.
    pub fn new(key: TypeKey, qualifier: bool) -> Self {
        Self { key, qualifier }
    }

    pub fn key(&self) -> TypeKey {
        self.key
    }

    pub fn is_qualifier(&self) -> bool {
        self.qualifier
    }

    fn ensure_qualifier(self) -> DiResult<Self> {
        if self.qualifier {
            Ok(self)
        } else {
            Err(DiError::configuration(format!(
                "{} is not a qualifier annotation",
                self.key
            )))
        }
    }
}

/// Discriminator value attached to an injection point or a binding.
///
/// Two qualifiers are equal when they have the same annotation type and the
/// same value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Qualifier {
    kind: AnnotationType,
    value: Option<Arc<str>>,
}

impl Qualifier {
    /// `@Named(name)` qualifier.
    pub fn named(name: impl AsRef<str>) -> Self {
        Self {
            kind: AnnotationType::of::<Named>(),
            value: Some(Arc::from(name.as_ref())),
        }
    }

    /// Valueless qualifier of annotation type `A`.
    pub fn of<A: Annotation>() -> DiResult<Self> {
        Self::from_kind(AnnotationType::of::<A>(), None)
    }

    /// Qualifier of annotation type `A` carrying `value`.
    pub fn with_value<A: Annotation>(value: impl AsRef<str>) -> DiResult<Self> {
        Self::from_kind(AnnotationType::of::<A>(), Some(value.as_ref()))
    }

    /// Qualifier built from runtime metadata.
    pub fn from_kind(kind: AnnotationType, value: Option<&str>) -> DiResult<Self> {
        let kind = kind.ensure_qualifier()?;
        Ok(Self {
            kind,
            value: value.map(Arc::from),
        })
    }

    pub fn kind(&self) -> AnnotationType {
        self.kind
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

impl fmt::Display for Qualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(v) => write!(f, "@{}({})", self.kind.key.short_name(), v),
            None => write!(f, "@{}", self.kind.key.short_name()),
        }
    }
}

/// Predicate used by [`QualifierMatcher::custom`].
pub type QualifierPredicate = Arc<dyn Fn(Option<&Qualifier>) -> bool + Send + Sync>;

/// The kind of a [`QualifierMatcher`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatcherKind {
    /// Matches every qualifier, including none
    Any,
    /// Matches only the absence of a qualifier
    None,
    /// Matches any qualifier of one annotation type
    ByType,
    /// Matches one qualifier value
    ByValue,
    /// User-defined predicate
    Custom,
}

impl MatcherKind {
    /// Specificity rank; higher ranks take precedence.
    ///
    /// `Custom` sits above the fixed table: kinds outside it rank first.
    pub fn rank(self) -> u8 {
        match self {
            MatcherKind::Any => 0,
            MatcherKind::ByType => 1,
            MatcherKind::None | MatcherKind::ByValue => 2,
            MatcherKind::Custom => 3,
        }
    }
}

#[derive(Clone)]
enum Matcher {
    Any,
    None,
    ByType(AnnotationType),
    ByValue(Qualifier),
    Custom {
        name: &'static str,
        predicate: QualifierPredicate,
    },
}

/// Predicate over qualifiers used by bind rules and context patterns.
///
/// # Examples
///
/// ```rust
/// use ferrous_wire::{Qualifier, QualifierMatcher};
/// use std::cmp::Ordering;
///
/// let any = QualifierMatcher::any();
/// let primary = QualifierMatcher::by_value(Qualifier::named("primary"));
///
/// assert!(any.matches(None));
/// assert!(primary.matches(Some(&Qualifier::named("primary"))));
/// assert!(!primary.matches(Some(&Qualifier::named("replica"))));
///
/// // More specific matchers sort first
/// assert_eq!(primary.compare(&any), Ordering::Less);
/// ```
#[derive(Clone)]
pub struct QualifierMatcher(Matcher);

impl QualifierMatcher {
    /// Matches any qualifier, or none.
    pub fn any() -> Self {
        Self(Matcher::Any)
    }

    /// Matches only an unqualified injection point.
    pub fn none() -> Self {
        Self(Matcher::None)
    }

    /// Matches every qualifier whose annotation type is `A`.
    pub fn by_type<A: Annotation>() -> DiResult<Self> {
        Self::by_kind(AnnotationType::of::<A>())
    }

    /// Matches every qualifier of the given annotation type.
    pub fn by_kind(kind: AnnotationType) -> DiResult<Self> {
        Ok(Self(Matcher::ByType(kind.ensure_qualifier()?)))
    }

    /// Matches qualifiers equal to `qualifier`.
    pub fn by_value(qualifier: Qualifier) -> Self {
        Self(Matcher::ByValue(qualifier))
    }

    /// Shorthand for `by_value(Qualifier::named(name))`.
    pub fn named(name: impl AsRef<str>) -> Self {
        Self::by_value(Qualifier::named(name))
    }

    /// Matches whatever `predicate` accepts. Ranks above every built-in kind.
    pub fn custom<F>(name: &'static str, predicate: F) -> Self
    where
        F: Fn(Option<&Qualifier>) -> bool + Send + Sync + 'static,
    {
        Self(Matcher::Custom {
            name,
            predicate: Arc::new(predicate),
        })
    }

    pub fn kind(&self) -> MatcherKind {
        match &self.0 {
            Matcher::Any => MatcherKind::Any,
            Matcher::None => MatcherKind::None,
            Matcher::ByType(_) => MatcherKind::ByType,
            Matcher::ByValue(_) => MatcherKind::ByValue,
            Matcher::Custom { .. } => MatcherKind::Custom,
        }
    }

    /// Whether the qualifier (or its absence) is accepted.
    pub fn matches(&self, qualifier: Option<&Qualifier>) -> bool {
        match &self.0 {
            Matcher::Any => true,
            Matcher::None => qualifier.is_none(),
            Matcher::ByType(kind) => qualifier.map_or(false, |q| q.kind == *kind),
            Matcher::ByValue(expected) => qualifier == Some(expected),
            Matcher::Custom { predicate, .. } => predicate(qualifier),
        }
    }

    #[inline]
    pub fn specificity(&self) -> u8 {
        self.kind().rank()
    }

    /// Orders matchers by specificity, most specific first.
    pub fn compare(&self, other: &QualifierMatcher) -> Ordering {
        other.specificity().cmp(&self.specificity())
    }
}

impl Default for QualifierMatcher {
    fn default() -> Self {
        Self::any()
    }
}

impl PartialEq for QualifierMatcher {
    fn eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (Matcher::Any, Matcher::Any) | (Matcher::None, Matcher::None) => true,
            (Matcher::ByType(a), Matcher::ByType(b)) => a == b,
            (Matcher::ByValue(a), Matcher::ByValue(b)) => a == b,
            (
                Matcher::Custom { name: na, predicate: pa },
                Matcher::Custom { name: nb, predicate: pb },
            ) => na == nb && Arc::ptr_eq(pa, pb),
            _ => false,
        }
    }
}

impl Eq for QualifierMatcher {}

impl Hash for QualifierMatcher {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind().hash(state);
        match &self.0 {
            Matcher::Any | Matcher::None => {}
            Matcher::ByType(kind) => kind.hash(state),
            Matcher::ByValue(q) => q.hash(state),
            Matcher::Custom { name, .. } => name.hash(state),
        }
    }
}

impl fmt::Display for QualifierMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Matcher::Any => f.write_str("*"),
            Matcher::None => f.write_str("<unqualified>"),
            Matcher::ByType(kind) => write!(f, "@{}(*)", kind.key().short_name()),
            Matcher::ByValue(q) => write!(f, "{}", q),
            Matcher::Custom { name, .. } => write!(f, "custom:{}", name),
        }
    }
}

impl fmt::Debug for QualifierMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QualifierMatcher({})", self)
    }
}
