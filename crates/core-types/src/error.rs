use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Unknown test step '{0}'. Expected one of: PGSRT, BURN, HSRT, CFIN")]
    UnknownStep(String),

    #[error("Unknown configuration '{0}'. Expected one of: x4, x8, x16, combo")]
    UnknownConfiguration(String),

    #[error("Unknown package type '{0}'. Expected one of: SDP, DDP")]
    UnknownPackage(String),

    #[error("Register '{register}' appears more than once in table {table}")]
    DuplicateRegister { register: String, table: String },

    #[error("Invalid input for {0}: {1}")]
    InvalidInput(String, String),
}
