//! Cache policies controlling instance sharing within a build session.

/// Cache policy for a resolved satisfaction
///
/// Decides whether the instantiator produced for a satisfaction is shared
/// across every resolution of that satisfaction inside one build session.
///
/// # Policy Characteristics
///
/// - **NoPreference**: Defers to the satisfaction's default, then the injector default
/// - **NewInstance**: Fresh instance on every invocation
/// - **Memoize**: One instance per build session, created on first invocation
///
/// # Examples
///
/// ```rust
/// use ferrous_wire::CachePolicy;
///
/// assert_eq!(CachePolicy::NoPreference.or(CachePolicy::Memoize), CachePolicy::Memoize);
/// assert_eq!(CachePolicy::NewInstance.or(CachePolicy::Memoize), CachePolicy::NewInstance);
/// assert!(CachePolicy::Memoize.is_memoized());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "snake_case"))]
pub enum CachePolicy {
    /// No explicit preference; the next policy in line decides
    #[default]
    NoPreference,
    /// Build a new instance every time the instantiator is invoked
    NewInstance,
    /// Share a single instance across the build session
    Memoize,
}

impl CachePolicy {
    /// Returns `self` unless it is `NoPreference`, in which case `fallback` applies.
    #[inline]
    pub fn or(self, fallback: CachePolicy) -> CachePolicy {
        match self {
            CachePolicy::NoPreference => fallback,
            explicit => explicit,
        }
    }

    /// True for [`CachePolicy::Memoize`].
    #[inline]
    pub fn is_memoized(self) -> bool {
        self == CachePolicy::Memoize
    }
}
