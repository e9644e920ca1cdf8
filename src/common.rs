use serde::{Deserialize, Serialize};
use std::fmt::{self, Write};
use std::num::NonZeroU32;
pub use vec1::vec1;

pub type Int = i64;
pub type UInt = u32;
pub type NonZeroUInt = NonZeroU32;

pub type NonEmpty<T> = vec1::Vec1<T>;

/// The dice sizes a formula may roll.
///
/// `D44`, `D66` and `D88` are double-digit dice: each one is rolled as a tens
/// die and a ones die of the component size (4, 6 or 8).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(try_from = "UInt", into = "UInt")]
pub enum DiceType {
    D4,
    D6,
    D8,
    D10,
    D12,
    D20,
    D100,
    D44,
    D66,
    D88,
}

impl DiceType {
    pub const ALL: [Self; 10] = [
        Self::D4,
        Self::D6,
        Self::D8,
        Self::D10,
        Self::D12,
        Self::D20,
        Self::D100,
        Self::D44,
        Self::D66,
        Self::D88,
    ];

    pub const fn sides(self) -> UInt {
        match self {
            Self::D4 => 4,
            Self::D6 => 6,
            Self::D8 => 8,
            Self::D10 => 10,
            Self::D12 => 12,
            Self::D20 => 20,
            Self::D100 => 100,
            Self::D44 => 44,
            Self::D66 => 66,
            Self::D88 => 88,
        }
    }

    pub const fn is_double_digit(self) -> bool {
        matches!(self, Self::D44 | Self::D66 | Self::D88)
    }

    /// The size of the physical die that is rolled. For double-digit dice this
    /// is the size of each half.
    pub const fn component_sides(self) -> NonZeroUInt {
        let sides = match self {
            Self::D44 => 4,
            Self::D66 => 6,
            Self::D88 => 8,
            other => other.sides(),
        };
        match NonZeroUInt::new(sides) {
            Some(x) => x,
            None => NonZeroUInt::MIN,
        }
    }

    pub fn from_sides(sides: UInt) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.sides() == sides)
    }
}

impl fmt::Display for DiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "d{}", self.sides())
    }
}

impl From<DiceType> for UInt {
    fn from(t: DiceType) -> Self {
        t.sides()
    }
}

impl TryFrom<UInt> for DiceType {
    type Error = crate::DiceError;

    fn try_from(sides: UInt) -> Result<Self, Self::Error> {
        Self::from_sides(sides).ok_or(crate::DiceError::InvalidDiceType {
            sides: sides.into(),
        })
    }
}

/// How the tens half of a double-digit die is read.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TensIndexing {
    /// Tens face `t` counts as `t * 10`, so a d66 spans 11..=66.
    #[default]
    OneIndexed,
    /// Tens face `t` counts as `(t - 1) * 10`, so a d66 spans 1..=56.
    ZeroIndexed,
}

impl TensIndexing {
    pub const fn combine(self, tens: UInt, ones: UInt) -> UInt {
        match self {
            Self::OneIndexed => tens * 10 + ones,
            Self::ZeroIndexed => tens.saturating_sub(1) * 10 + ones,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Sub,
    #[serde(rename = "*")]
    Mul,
    #[serde(rename = "/")]
    Div,
    #[serde(rename = "(")]
    LeftParen,
    #[serde(rename = ")")]
    RightParen,
}

impl Operator {
    pub const fn is_additive(self) -> bool {
        matches!(self, Self::Add | Self::Sub)
    }

    pub const fn is_multiplicative(self) -> bool {
        matches!(self, Self::Mul | Self::Div)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            Self::Add => '+',
            Self::Sub => '-',
            Self::Mul => '*',
            Self::Div => '/',
            Self::LeftParen => '(',
            Self::RightParen => ')',
        };
        f.write_char(c)
    }
}

/// Per-token flags written after the sides, e.g. `1d20!` or `2d6v`.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct DiceModifiers {
    pub explode: bool,
    pub vicious: bool,
}

impl fmt::Display for DiceModifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.explode {
            f.write_char('!')?;
        }
        if self.vicious {
            f.write_char('v')?;
        }
        Ok(())
    }
}
