//! Parses and rolls tabletop dice formulas such as `2d6+5`, `1d20!`, `1d8v`
//! or the double-digit `1d66`.
//!
//! ```no_run
//! use dice_formula::{evaluate, DiceFormulaOptions};
//!
//! let result = evaluate("1d20 + 4", &DiceFormulaOptions::default().with_advantage(1))?;
//! println!("{}", result.display_string);
//! # Ok::<(), dice_formula::DiceError>(())
//! ```

pub mod common;
pub mod config;
mod engine;
mod error;
pub mod parse;
pub mod roll;

pub use common::{DiceModifiers, DiceType, Int, Operator, TensIndexing, UInt};
pub use config::{DiceFormulaOptions, EngineConfig, RollMode};
pub use engine::{DiceFormulaResult, Engine};
pub use error::DiceError;
pub use parse::{ast::FormulaToken, Variables};
pub use roll::{
    CategorizedDie, DieCategory, MarkdownStringifier, PlainStringifier, ResolvedToken, Roller,
    ScriptedRoller, Stringify,
};

/// Evaluates `formula` with the default configuration and the thread-local
/// random number generator.
pub fn evaluate(formula: &str, options: &DiceFormulaOptions) -> Result<DiceFormulaResult, DiceError> {
    Engine::default().evaluate(formula, options, &mut rand::thread_rng())
}
