use core_types::{Configuration, Package, Step, Week};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum CompositeError {
    #[error("Incomplete yields for {configuration} {package}: {step} has no {week} yield")]
    IncompleteYields {
        configuration: Configuration,
        package: Package,
        step: Step,
        week: Week,
    },
}
