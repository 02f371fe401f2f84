use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnnotationError {
    #[error(
        "{origin}:{line}: '{key}' has {found} value(s) but the header declares {expected} column(s)"
    )]
    MalformedLine {
        origin: String,
        line: usize,
        key: String,
        expected: usize,
        found: usize,
    },

    #[error("{origin}:{line}: annotation key is empty")]
    EmptyKey { origin: String, line: usize },

    #[error("{origin}:{line}: invalid scope '{token}': {reason}")]
    InvalidScope {
        origin: String,
        line: usize,
        token: String,
        reason: String,
    },
}
