use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {origin}: {source}")]
    Csv {
        origin: String,
        #[source]
        source: csv::Error,
    },

    #[error("{origin} has {found} week column(s); at least {expected} are needed")]
    MissingWeekColumns {
        origin: String,
        expected: usize,
        found: usize,
    },

    #[error("Invalid table: {0}")]
    Table(#[from] core_types::CoreError),
}
