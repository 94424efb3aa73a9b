//! Resolution contexts and context patterns.
//!
//! The context of a desire is the chain of components being built above it,
//! outermost first. Rules bound inside a [`ContextPattern`] only apply while
//! the current context matches that pattern.

use std::cmp::Ordering;
use std::fmt;

use smallvec::SmallVec;

use crate::key::TypeKey;
use crate::qualifier::{Qualifier, QualifierMatcher};
use crate::types::{type_distance, TypeHierarchy};

/// One component in the current construction chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContextElement {
    ty: TypeKey,
    qualifier: Option<Qualifier>,
}

impl ContextElement {
    pub fn new(ty: TypeKey, qualifier: Option<Qualifier>) -> Self {
        Self { ty, qualifier }
    }

    pub fn type_key(&self) -> TypeKey {
        self.ty
    }

    pub fn qualifier(&self) -> Option<&Qualifier> {
        self.qualifier.as_ref()
    }
}

/// Chain of components under construction, outermost first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    elements: SmallVec<[ContextElement; 8]>,
}

impl Context {
    /// Empty context of a root desire.
    pub fn root() -> Self {
        Self::default()
    }

    /// New context one level deeper.
    pub fn push(&self, element: ContextElement) -> Self {
        let mut elements = self.elements.clone();
        elements.push(element);
        Self { elements }
    }

    pub fn elements(&self) -> &[ContextElement] {
        &self.elements
    }

    pub fn depth(&self) -> usize {
        self.elements.len()
    }

    pub fn is_root(&self) -> bool {
        self.elements.is_empty()
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, e) in self.elements.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(e.ty.short_name())?;
            if let Some(q) = &e.qualifier {
                write!(f, " {}", q)?;
            }
        }
        f.write_str("]")
    }
}

/// Matches a single context element by type (or subtype) and qualifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementMatcher {
    ty: TypeKey,
    qualifier: QualifierMatcher,
}

impl ElementMatcher {
    /// Matches `T` or any declared subtype of it, with any qualifier.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::for_type(TypeKey::of::<T>())
    }

    pub fn for_type(ty: TypeKey) -> Self {
        Self {
            ty,
            qualifier: QualifierMatcher::any(),
        }
    }

    pub fn qualified(mut self, qualifier: QualifierMatcher) -> Self {
        self.qualifier = qualifier;
        self
    }

    pub fn type_key(&self) -> TypeKey {
        self.ty
    }

    pub fn qualifier(&self) -> &QualifierMatcher {
        &self.qualifier
    }

    /// Type distance from the element up to the matched type, `None` on mismatch.
    pub fn matches<H>(&self, element: &ContextElement, hierarchy: &H) -> Option<usize>
    where
        H: TypeHierarchy + ?Sized,
    {
        let distance = type_distance(hierarchy, &element.ty, &self.ty)?;
        self.qualifier
            .matches(element.qualifier())
            .then_some(distance)
    }
}

/// Sequence of element matchers, matched as a subsequence of a context.
///
/// The empty pattern is the global scope and matches every context.
///
/// # Examples
///
/// ```rust
/// use ferrous_wire::{Context, ContextElement, ContextPattern, FlatHierarchy, TypeKey};
///
/// struct Server;
/// struct Handler;
/// struct Repository;
///
/// let ctx = Context::root()
///     .push(ContextElement::new(TypeKey::of::<Server>(), None))
///     .push(ContextElement::new(TypeKey::of::<Handler>(), None));
///
/// assert!(ContextPattern::within::<Server>().matches(&ctx, &FlatHierarchy).is_some());
/// assert!(ContextPattern::within::<Repository>().matches(&ctx, &FlatHierarchy).is_none());
/// assert!(ContextPattern::global().matches(&Context::root(), &FlatHierarchy).is_some());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ContextPattern {
    elements: Vec<ElementMatcher>,
}

impl ContextPattern {
    /// The global scope.
    pub fn global() -> Self {
        Self::default()
    }

    /// Pattern matching any context containing `T`.
    pub fn within<T: ?Sized + 'static>() -> Self {
        Self::global().then(ElementMatcher::of::<T>())
    }

    /// Appends a deeper element to the pattern.
    pub fn then(mut self, element: ElementMatcher) -> Self {
        self.elements.push(element);
        self
    }

    pub fn elements(&self) -> &[ElementMatcher] {
        &self.elements
    }

    pub fn is_global(&self) -> bool {
        self.elements.is_empty()
    }

    /// Matches the pattern against `context`.
    ///
    /// Pattern elements are matched from the deepest end of the context,
    /// each one taking the deepest remaining element it accepts. The result
    /// describes how well the last pattern element matched.
    pub fn matches<H>(&self, context: &Context, hierarchy: &H) -> Option<ContextMatch>
    where
        H: TypeHierarchy + ?Sized,
    {
        let Some(last) = self.elements.last() else {
            return Some(ContextMatch::Global);
        };

        let ctx = context.elements();
        let mut end = ctx.len();
        let mut anchor = None;
        for (i, matcher) in self.elements.iter().enumerate().rev() {
            let found = ctx[..end]
                .iter()
                .enumerate()
                .rev()
                .find_map(|(pos, e)| matcher.matches(e, hierarchy).map(|d| (pos, d)));
            let (pos, distance) = found?;
            if i == self.elements.len() - 1 {
                anchor = Some(distance);
            }
            end = pos;
        }

        Some(ContextMatch::Scoped {
            distance: anchor?,
            specificity: last.qualifier.specificity(),
        })
    }
}

impl fmt::Display for ContextPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_global() {
            return f.write_str("<global>");
        }
        for (i, e) in self.elements.iter().enumerate() {
            if i > 0 {
                f.write_str(" ... ")?;
            }
            write!(f, "{} {}", e.ty.short_name(), e.qualifier)?;
        }
        Ok(())
    }
}

/// Result of matching a pattern against a context.
///
/// Ordered most specific first: scoped matches precede the global scope, closer
/// type distances precede farther ones, and higher qualifier specificity
/// breaks remaining ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextMatch {
    /// The empty pattern
    Global,
    /// A non-empty pattern matched
    Scoped { distance: usize, specificity: u8 },
}

impl Ord for ContextMatch {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (ContextMatch::Global, ContextMatch::Global) => Ordering::Equal,
            (ContextMatch::Global, ContextMatch::Scoped { .. }) => Ordering::Greater,
            (ContextMatch::Scoped { .. }, ContextMatch::Global) => Ordering::Less,
            (
                ContextMatch::Scoped { distance: da, specificity: sa },
                ContextMatch::Scoped { distance: db, specificity: sb },
            ) => da.cmp(db).then_with(|| sb.cmp(sa)),
        }
    }
}

impl PartialOrd for ContextMatch {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
