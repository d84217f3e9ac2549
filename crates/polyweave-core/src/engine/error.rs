use thiserror::Error;

use super::config::ConfigError;
use super::relax::RelaxationError;

#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error("Linear polymer building does not support non-linear monomer input")]
    Morphology,

    #[error("Terminal orientation references residue '{residue}', which is not in the monomer group")]
    UnknownResidue { residue: String },

    /// Both end groups could not be produced. `residue` names a declared end group without
    /// any single-port variant; it is `None` when an orientation had to be inferred.
    #[error("{}", describe_insufficient_terminals(.found, .residue))]
    InsufficientTerminalGroups {
        found: usize,
        residue: Option<String>,
    },

    #[error("Invalid build configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error("Chain relaxation failed: {source}")]
    Relaxation {
        #[from]
        source: RelaxationError,
    },

    #[error("Internal logic error: {0}")]
    Internal(String),
}

fn describe_insufficient_terminals(found: &usize, residue: &Option<String>) -> String {
    match residue {
        Some(residue) => format!(
            "Residue '{residue}' is declared as a terminal group but has no single-port variant"
        ),
        None => format!(
            "At least two terminal groups are needed to infer an orientation, found {found}"
        ),
    }
}
