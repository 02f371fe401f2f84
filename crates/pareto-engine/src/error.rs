use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParetoError {
    #[error("Annotation error: {0}")]
    Annotation(#[from] annotations::AnnotationError),

    #[error("Composite error: {0}")]
    Composite(#[from] composite::CompositeError),

    #[error("Table {0} was supplied more than once")]
    DuplicateTable(String),
}
