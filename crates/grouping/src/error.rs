use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GroupingError {
    #[error("{origin}:{line}: malformed group definition: {reason}")]
    MalformedRule {
        origin: String,
        line: usize,
        reason: String,
    },
}
