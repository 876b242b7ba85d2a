use thiserror::Error;

use crate::simulation::RoundPhase;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlackjackError {
    #[error("cannot deal from an empty deck")]
    EmptyDeck,
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("{operation} is only allowed in {expected:?} phase, current phase is {actual:?}")]
    WrongPhase {
        operation: &'static str,
        expected: RoundPhase,
        actual: RoundPhase,
    },
}
