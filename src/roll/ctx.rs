use super::roller::Roller;
use super::token::*;
use crate::common::*;
use crate::config::{DiceFormulaOptions, EngineConfig, RollMode};
use crate::parse::ast::FormulaToken;
use std::cmp::Ordering;
use tracing::{debug, trace};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Faces {
    Single(UInt),
    Pair { tens: UInt, ones: UInt },
}

/// A rolled die before it is split into physical halves.
#[derive(Debug, Copy, Clone)]
struct LogicalDie {
    faces: Faces,
    kept: bool,
    category: DieCategory,
    index: usize,
}

impl LogicalDie {
    fn drop(&mut self) {
        self.kept = false;
        self.category = DieCategory::Dropped;
    }
}

/// Rolls the dice of a parsed formula.
///
/// The first dice token of the formula is the primary one: it is the only
/// token advantage, criticals and the attack miss rule apply to.
pub struct RollContext<'a, R: ?Sized> {
    config: &'a EngineConfig,
    options: &'a DiceFormulaOptions,
    roller: &'a mut R,
    primary_seen: bool,
    next_index: usize,
}

impl<'a, R: Roller + ?Sized> RollContext<'a, R> {
    pub fn new(config: &'a EngineConfig, options: &'a DiceFormulaOptions, roller: &'a mut R) -> Self {
        Self {
            config,
            options,
            roller,
            primary_seen: false,
            next_index: 0,
        }
    }

    pub fn resolve(&mut self, tokens: Vec<FormulaToken>) -> Vec<ResolvedToken> {
        tokens
            .into_iter()
            .map(|token| -> ResolvedToken {
                match token {
                    FormulaToken::Static { value } => StaticValue { value }.into(),
                    FormulaToken::Operator { symbol } => OperatorToken { symbol }.into(),
                    FormulaToken::Dice {
                        count,
                        dice_type,
                        modifiers,
                    } => self.resolve_dice(count, dice_type, modifiers).into(),
                }
            })
            .collect()
    }

    pub fn resolve_dice(
        &mut self,
        count: usize,
        dice_type: DiceType,
        modifiers: DiceModifiers,
    ) -> ResolvedDice {
        let primary = !self.primary_seen;
        self.primary_seen = true;
        self.next_index = 0;

        let advantage = self.options.advantage_level;
        let advantaged = primary && count == 1 && advantage != 0;
        if primary && count != 1 && advantage != 0 {
            debug!(count, %dice_type, "advantage only applies to a single die; ignored");
        }

        let rolls = if advantaged {
            let wanted = 1 + advantage.unsigned_abs() as usize;
            let max = self.config.max_dice_count.max(1);
            if wanted > max {
                debug!(wanted, max, "advantage dice capped at the dice count limit");
            }
            wanted.min(max)
        } else {
            count
        };
        let mut dice: Vec<_> = (0..rolls)
            .map(|_| self.roll_die(dice_type, DieCategory::Normal))
            .collect();

        if advantaged {
            self.keep_one(&mut dice, dice_type, advantage > 0);
        }

        let single_d20 = dice_type == DiceType::D20 && count == 1;
        let mut is_fumble = false;
        let mut is_miss = false;
        if let Some(die) = dice.iter_mut().find(|d| d.kept) {
            let natural_min = Self::is_min(die);
            if natural_min && single_d20 && self.options.allow_fumbles {
                die.category = DieCategory::Fumble;
                is_fumble = true;
            }
            if natural_min && primary && count == 1 && self.options.mode == RollMode::Attack {
                is_miss = true;
            }
        }

        let explosion = if primary && self.options.criticals_enabled() {
            Some(DieCategory::Critical)
        } else if modifiers.explode || self.options.explode_all {
            Some(DieCategory::Explosion)
        } else {
            None
        };
        if let Some(category) = explosion {
            self.explode(&mut dice, dice_type, category);
        }

        if modifiers.vicious || self.options.vicious {
            let bonus = self.roll_die(dice_type, DieCategory::Vicious);
            dice.push(bonus);
        }

        ResolvedDice {
            count,
            dice_type,
            modifiers,
            dice: Self::flatten(&dice, dice_type),
            tens_indexing: self.config.tens_indexing,
            is_fumble,
            is_miss,
        }
    }

    fn roll_die(&mut self, dice_type: DiceType, category: DieCategory) -> LogicalDie {
        let sides = dice_type.component_sides();
        let index = self.next_index;
        let faces = if dice_type.is_double_digit() {
            let tens = self.roller.roll(sides);
            let ones = self.roller.roll(sides);
            self.next_index += 2;
            Faces::Pair { tens, ones }
        } else {
            self.next_index += 1;
            Faces::Single(self.roller.roll(sides))
        };
        trace!(%dice_type, ?faces, ?category, "rolled");
        LogicalDie {
            faces,
            kept: true,
            category,
            index,
        }
    }

    /// Keeps the highest (or lowest) die and drops the rest, leaving them in
    /// roll order. Ties keep the earliest die.
    fn keep_one(&self, dice: &mut [LogicalDie], dice_type: DiceType, highest: bool) {
        let indexing = self.config.tens_indexing;
        let value = |d: &LogicalDie| Self::value(d, indexing);
        let best = dice
            .iter()
            .enumerate()
            .reduce(|best, cur| {
                let ord = value(cur.1).cmp(&value(best.1));
                let better = if highest {
                    ord == Ordering::Greater
                } else {
                    ord == Ordering::Less
                };
                if better {
                    cur
                } else {
                    best
                }
            })
            .map(|(i, _)| i);

        for (i, die) in dice.iter_mut().enumerate() {
            if Some(i) != best {
                die.drop();
            }
        }
        debug!(%dice_type, highest, kept = ?best, "applied advantage");
    }

    /// Rolls an extra die for each kept die showing its maximum face, chaining
    /// on the new die up to the configured limit.
    fn explode(&mut self, dice: &mut Vec<LogicalDie>, dice_type: DiceType, category: DieCategory) {
        let max = self.config.max_explosions;
        let triggers = dice
            .iter()
            .filter(|d| d.kept && Self::is_max(d, dice_type))
            .count();

        for _ in 0..triggers {
            let mut chain = 0;
            loop {
                if chain == max {
                    debug!(%dice_type, max, "explosion chain reached its limit");
                    break;
                }
                let extra = self.roll_die(dice_type, category);
                dice.push(extra);
                chain += 1;
                if !Self::is_max(&extra, dice_type) {
                    break;
                }
            }
        }
    }

    fn value(die: &LogicalDie, indexing: TensIndexing) -> UInt {
        match die.faces {
            Faces::Single(x) => x,
            Faces::Pair { tens, ones } => indexing.combine(tens, ones),
        }
    }

    fn is_max(die: &LogicalDie, dice_type: DiceType) -> bool {
        let top = dice_type.component_sides().get();
        match die.faces {
            Faces::Single(x) => x == top,
            Faces::Pair { tens, ones } => tens == top && ones == top,
        }
    }

    fn is_min(die: &LogicalDie) -> bool {
        match die.faces {
            Faces::Single(x) => x == 1,
            Faces::Pair { tens, ones } => tens == 1 && ones == 1,
        }
    }

    fn flatten(dice: &[LogicalDie], dice_type: DiceType) -> Vec<CategorizedDie> {
        let size = dice_type.component_sides().get();
        let physical = |d: &LogicalDie, value, index, place| CategorizedDie {
            value,
            size,
            kept: d.kept,
            category: d.category,
            index,
            place,
        };

        let mut singles = Vec::with_capacity(dice.len());
        let mut tens = Vec::new();
        let mut ones = Vec::new();
        for d in dice {
            match d.faces {
                Faces::Single(x) => singles.push(physical(d, x, d.index, Place::Single)),
                Faces::Pair { tens: t, ones: o } => {
                    tens.push(physical(d, t, d.index, Place::Tens));
                    ones.push(physical(d, o, d.index + 1, Place::Ones));
                }
            }
        }
        singles.extend(tens);
        singles.extend(ones);
        singles
    }
}
