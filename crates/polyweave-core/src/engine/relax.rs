use crate::core::models::chain::PolymerChain;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct RelaxationError(pub String);

/// Geometric embedding and relaxation of an assembled chain.
///
/// Implementations are supplied by the caller (typically backed by a force-field package).
/// Relaxation never changes which units the chain holds or how they are linked.
pub trait ChainRelaxer {
    fn relax(&self, chain: &mut PolymerChain) -> Result<(), RelaxationError>;
}
