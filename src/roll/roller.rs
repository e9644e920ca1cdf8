use crate::common::{NonZeroUInt, UInt};
use rand::Rng;

/// A source of die faces.
///
/// `roll` must return a value in `1..=sides`.
pub trait Roller {
    fn roll(&mut self, sides: NonZeroUInt) -> UInt;
}

impl<R: Rng> Roller for R {
    fn roll(&mut self, sides: NonZeroUInt) -> UInt {
        self.gen_range(1..=sides.get())
    }
}

/// Replays a fixed list of faces, cycling when it runs out.
///
/// Values larger than the die wrap around (`(value - 1) % sides + 1`), and an
/// empty script always rolls the maximum face.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptedRoller {
    script: Vec<UInt>,
    position: usize,
}

impl ScriptedRoller {
    pub fn new(script: impl Into<Vec<UInt>>) -> Self {
        Self {
            script: script.into(),
            position: 0,
        }
    }

    /// How many faces have been handed out so far.
    pub fn rolls(&self) -> usize {
        self.position
    }
}

impl Roller for ScriptedRoller {
    fn roll(&mut self, sides: NonZeroUInt) -> UInt {
        if self.script.is_empty() {
            return sides.get();
        }
        let value = self.script[self.position % self.script.len()];
        self.position += 1;
        (value.max(1) - 1) % sides.get() + 1
    }
}

#[cfg(test)]
pub(crate) use max::MaxRoller;

#[cfg(test)]
mod max {
    use super::*;

    /// Always rolls the highest face and counts how often it was asked.
    #[derive(Default)]
    pub(crate) struct MaxRoller {
        pub rolls: usize,
    }

    impl Roller for MaxRoller {
        fn roll(&mut self, sides: NonZeroUInt) -> UInt {
            self.rolls += 1;
            sides.get()
        }
    }
}
