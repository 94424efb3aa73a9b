//! Error types for graph resolution and construction.

use std::error::Error as StdError;
use std::sync::Arc;

/// Error type returned by user-supplied constructors, setters and hooks.
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// Shared form of a user error, kept inside [`DiError`] so the error stays `Clone`.
pub type SharedError = Arc<dyn StdError + Send + Sync>;

/// Dependency resolution and construction errors
///
/// Every variant is fatal to the `resolve` or `instantiate` call that raised it.
/// Nothing is retried and no partially-built instance escapes to the caller.
///
/// # Examples
///
/// ```rust
/// use ferrous_wire::DiError;
///
/// let cyclic = DiError::Cyclic(vec!["A", "B", "A"]);
/// assert_eq!(cyclic.to_string(), "Cyclic dependency: A -> B -> A");
///
/// let missing = DiError::Unresolvable("Desire(app::Database)".to_string());
/// assert!(missing.to_string().contains("app::Database"));
/// ```
#[derive(Debug, Clone, thiserror::Error)]
pub enum DiError {
    /// No rule and no default satisfaction could satisfy the desire
    #[error("Unresolvable dependency: {0}")]
    Unresolvable(String),

    /// Two rules tie on context specificity and weight
    #[error("Ambiguous binding for {desire}: {first} and {second}")]
    AmbiguousBinding {
        desire: String,
        first: String,
        second: String,
    },

    /// A desire is reachable from itself (includes path)
    #[error("Cyclic dependency: {}", .0.join(" -> "))]
    Cyclic(Vec<&'static str>),

    /// Type has no usable injectable constructor
    #[error("Type not instantiable: {0}")]
    NotInstantiable(&'static str),

    /// A required injection point received no value
    #[error("Null dependency for required injection point {0}")]
    NullDependency(String),

    /// User constructor, member or hook failed
    #[error("Construction failed in {member}: {source}")]
    Construction {
        member: String,
        #[source]
        source: SharedError,
    },

    /// Malformed matcher, qualifier, descriptor or rule definition
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Resolved value could not be downcast to the declared type
    #[error("Type mismatch for: {0}")]
    TypeMismatch(&'static str),

    /// Maximum resolution depth exceeded
    #[error("Max depth {0} exceeded")]
    DepthExceeded(usize),
}

impl DiError {
    /// Wraps a user failure into a [`DiError::Construction`] naming the member.
    pub fn construction(member: impl Into<String>, source: BoxError) -> Self {
        DiError::Construction {
            member: member.into(),
            source: Arc::from(source),
        }
    }

    /// Builds a [`DiError::Configuration`] from any message.
    pub fn configuration(message: impl Into<String>) -> Self {
        DiError::Configuration(message.into())
    }
}

/// Result type for resolution and construction
pub type DiResult<T> = Result<T, DiError>;

/// Panic payload turned into a user error when a constructor or hook panics.
#[derive(Debug, thiserror::Error)]
#[error("panicked: {0}")]
pub(crate) struct PanicError(pub(crate) String);

impl PanicError {
    pub(crate) fn from_payload(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        PanicError(message)
    }
}
