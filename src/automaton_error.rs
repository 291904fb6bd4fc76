use thiserror::Error;

use crate::Symbol;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AutomatonError {
    #[error("the initial state `{0}` is not among the declared states.")]
    UnknownInitialState(String),
    #[error("the accepting state `{0}` is not among the declared states.")]
    UnknownAcceptingState(String),
    #[error("the edge `{from}` --{symbol}--> `{to}` references the undeclared state `{missing}`.")]
    UnknownEdgeState {
        from: String,
        symbol: Symbol,
        to: String,
        missing: String,
    },
    #[error("the edge `{from}` --{symbol}--> `{to}` uses the symbol `{symbol}` which is not in the alphabet.")]
    UnknownEdgeSymbol {
        from: String,
        symbol: Symbol,
        to: String,
    },
    #[error("the initial state `{0}` cannot be removed.")]
    InitialStateRemoval(String),
    #[error("the state `{0}` is not registered.")]
    UnknownState(String),
}
