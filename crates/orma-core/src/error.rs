use std::fmt;
use thiserror::Error as ThisError;

///
/// InternalError
///
/// Structured runtime error with a stable internal classification.
/// Not a stable API; intended for internal use and may change without notice.
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct InternalError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl InternalError {
    /// Construct an InternalError from its classification and message.
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
        }
    }

    /// Construct a query-origin invariant violation.
    pub(crate) fn query_invariant(message: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::InvariantViolation,
            ErrorOrigin::Query,
            message.into(),
        )
    }

    /// Construct a binding-origin invariant violation.
    ///
    /// Raised when positional slots and produced values disagree; this is a
    /// statement-compilation defect and never user-correctable.
    pub(crate) fn binding_invariant(message: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::InvariantViolation,
            ErrorOrigin::Binding,
            message.into(),
        )
    }

    /// Construct a fetch-origin invariant violation.
    pub(crate) fn fetch_invariant(message: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::InvariantViolation,
            ErrorOrigin::Fetch,
            message.into(),
        )
    }

    /// Construct a session-origin invariant violation.
    pub(crate) fn session_invariant(message: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::InvariantViolation,
            ErrorOrigin::Session,
            message.into(),
        )
    }

    /// Construct a binding-origin unsupported error.
    pub(crate) fn binding_unsupported(message: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::Unsupported,
            ErrorOrigin::Binding,
            message.into(),
        )
    }

    /// Construct a query-origin unsupported error.
    pub(crate) fn query_unsupported(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Unsupported, ErrorOrigin::Query, message.into())
    }

    /// Construct a model-origin not-found error.
    pub(crate) fn model_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::NotFound, ErrorOrigin::Model, message.into())
    }

    /// Construct a session-origin not-found error.
    pub(crate) fn session_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::NotFound, ErrorOrigin::Session, message.into())
    }

    /// A bound value reached the materializer with no strategy to convert it.
    pub(crate) fn unresolvable_type(parameter: impl fmt::Display) -> Self {
        Self::new(
            ErrorClass::Unsupported,
            ErrorOrigin::Binding,
            format!("parameter has no type by which it can be bound: {parameter}"),
        )
    }

    /// Construct a datasource-origin error.
    ///
    /// Datasource implementations use this to report their own failures; the
    /// core passes such errors through without rewrapping.
    pub fn datasource(message: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::Datasource,
            ErrorOrigin::Datasource,
            message.into(),
        )
    }

    #[must_use]
    pub const fn is_invariant_violation(&self) -> bool {
        matches!(self.class, ErrorClass::InvariantViolation)
    }

    #[must_use]
    pub const fn is_unsupported(&self) -> bool {
        matches!(self.class, ErrorClass::Unsupported)
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.class, ErrorClass::NotFound)
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }
}

///
/// ErrorClass
/// Internal error taxonomy for runtime classification.
/// Not a stable API; may change without notice.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    Datasource,
    Internal,
    InvariantViolation,
    NotFound,
    Unsupported,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Datasource => "datasource",
            Self::Internal => "internal",
            Self::InvariantViolation => "invariant_violation",
            Self::NotFound => "not_found",
            Self::Unsupported => "unsupported",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Internal origin taxonomy for runtime classification.
/// Not a stable API; may change without notice.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Binding,
    Config,
    Datasource,
    Fetch,
    Model,
    NaturalId,
    Query,
    Session,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Binding => "binding",
            Self::Config => "config",
            Self::Datasource => "datasource",
            Self::Fetch => "fetch",
            Self::Model => "model",
            Self::NaturalId => "natural_id",
            Self::Query => "query",
            Self::Session => "session",
        };
        write!(f, "{label}")
    }
}
