use crate::common::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One element of a parsed formula, in source order.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FormulaToken {
    Static {
        value: Int,
    },
    #[serde(rename_all = "camelCase")]
    Dice {
        count: usize,
        dice_type: DiceType,
        modifiers: DiceModifiers,
    },
    Operator {
        symbol: Operator,
    },
}

impl FormulaToken {
    pub fn new_static(value: Int) -> Self {
        Self::Static { value }
    }

    pub fn new_dice(count: usize, dice_type: DiceType, modifiers: DiceModifiers) -> Self {
        Self::Dice {
            count,
            dice_type,
            modifiers,
        }
    }

    pub fn new_operator(symbol: Operator) -> Self {
        Self::Operator { symbol }
    }
}

impl fmt::Display for FormulaToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static { value } => write!(f, "{}", value),
            Self::Dice {
                count,
                dice_type,
                modifiers,
            } => write!(f, "{}{}{}", count, dice_type, modifiers),
            Self::Operator { symbol } => write!(f, "{}", symbol),
        }
    }
}
