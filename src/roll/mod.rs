mod ctx;
mod error;
mod eval;
mod roller;
mod stringify;
mod token;

pub use ctx::RollContext;
pub use error::EvalError;
pub use eval::reduce;
pub use roller::{Roller, ScriptedRoller};
pub use stringify::{MarkdownStringifier, PlainStringifier, Stringify};
pub use token::{
    CategorizedDie, DieCategory, DieGroup, OperatorToken, Place, Resolved, ResolvedDice,
    ResolvedToken, StaticValue,
};
