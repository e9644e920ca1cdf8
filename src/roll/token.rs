use crate::common::*;
use serde::Serialize;
use std::fmt;

/// Values every resolved token can report, whether or not it rolled dice.
#[enum_dispatch::enum_dispatch]
pub trait Resolved {
    /// The number this token contributes, or `None` for operators.
    fn value(&self) -> Option<Int> {
        None
    }

    /// Logical dice added by critical or explosion chains.
    fn num_criticals(&self) -> usize {
        0
    }

    fn is_fumble(&self) -> bool {
        false
    }

    fn is_miss(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[enum_dispatch::enum_dispatch(Resolved)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ResolvedToken {
    Static(StaticValue),
    Dice(ResolvedDice),
    Operator(OperatorToken),
}

impl ResolvedToken {
    pub fn as_operator(&self) -> Option<Operator> {
        match self {
            Self::Operator(op) => Some(op.symbol),
            _ => None,
        }
    }

    pub fn as_dice(&self) -> Option<&ResolvedDice> {
        match self {
            Self::Dice(dice) => Some(dice),
            _ => None,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct StaticValue {
    pub value: Int,
}

impl Resolved for StaticValue {
    fn value(&self) -> Option<Int> {
        Some(self.value)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct OperatorToken {
    pub symbol: Operator,
}

impl Resolved for OperatorToken {}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DieCategory {
    Normal,
    Critical,
    Explosion,
    Vicious,
    Dropped,
    Fumble,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Place {
    Single,
    Tens,
    Ones,
}

/// One physical die of a dice token.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize)]
pub struct CategorizedDie {
    pub value: UInt,
    pub size: UInt,
    pub kept: bool,
    pub category: DieCategory,
    /// Position in roll order within the token.
    pub index: usize,
    pub place: Place,
}

/// A dice sub-expression after rolling.
///
/// For double-digit dice, `dice` holds every tens half first and every ones
/// half second; tens `i` pairs with ones `i`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedDice {
    pub count: usize,
    pub dice_type: DiceType,
    pub modifiers: DiceModifiers,
    pub dice: Vec<CategorizedDie>,
    pub tens_indexing: TensIndexing,
    pub is_fumble: bool,
    pub is_miss: bool,
}

impl ResolvedDice {
    /// The logical dice of this token in roll order.
    pub fn groups(&self) -> Vec<DieGroup<'_>> {
        if self.dice_type.is_double_digit() {
            let (tens, ones) = self.dice.split_at(self.dice.len() / 2);
            tens.iter()
                .zip(ones)
                .map(|(tens, ones)| DieGroup::DoubleDigit { tens, ones })
                .collect()
        } else {
            self.dice.iter().map(DieGroup::Single).collect()
        }
    }

    pub fn subtotal(&self) -> Int {
        self.groups()
            .iter()
            .filter(|g| g.kept())
            .map(|g| Int::from(g.value(self.tens_indexing)))
            .sum()
    }

    pub fn kept(&self) -> impl Iterator<Item = &CategorizedDie> + '_ {
        self.dice.iter().filter(|d| d.kept)
    }

    pub fn dropped(&self) -> impl Iterator<Item = &CategorizedDie> + '_ {
        self.dice.iter().filter(|d| !d.kept)
    }
}

impl Resolved for ResolvedDice {
    fn value(&self) -> Option<Int> {
        Some(self.subtotal())
    }

    fn num_criticals(&self) -> usize {
        self.groups()
            .iter()
            .filter(|g| matches!(g.category(), DieCategory::Critical | DieCategory::Explosion))
            .count()
    }

    fn is_fumble(&self) -> bool {
        self.is_fumble
    }

    fn is_miss(&self) -> bool {
        self.is_miss
    }
}

impl fmt::Display for ResolvedDice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.count, self.dice_type, self.modifiers)
    }
}

/// A logical die: either one physical die or a tens/ones pair.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DieGroup<'a> {
    Single(&'a CategorizedDie),
    DoubleDigit {
        tens: &'a CategorizedDie,
        ones: &'a CategorizedDie,
    },
}

impl DieGroup<'_> {
    pub fn value(&self, indexing: TensIndexing) -> UInt {
        match self {
            Self::Single(die) => die.value,
            Self::DoubleDigit { tens, ones } => indexing.combine(tens.value, ones.value),
        }
    }

    pub fn kept(&self) -> bool {
        self.first().kept
    }

    pub fn category(&self) -> DieCategory {
        self.first().category
    }

    pub fn index(&self) -> usize {
        self.first().index
    }

    fn first(&self) -> &CategorizedDie {
        match self {
            Self::Single(die) => die,
            Self::DoubleDigit { tens, .. } => tens,
        }
    }
}
