//! # Amount Distributions
//!
//! Counts, heights and depths used by populators are drawn from small
//! composable distributions rather than fixed numbers.

use std::fmt;

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

/// A possibly random quantity.
///
/// Compound variants nest, e.g. a lake height of
/// `base_with_random_addition(0, base_with_random_addition(8, 55))`.
#[derive(Clone, Debug, PartialEq)]
pub enum VariableAmount {
    /// Always the same value.
    Fixed(f64),
    /// Uniform in `[min, max)`.
    Range {
        /// Inclusive lower bound.
        min: f64,
        /// Exclusive upper bound.
        max: f64,
    },
    /// `base + U[0,1) * addition`.
    BaseWithRandomAddition {
        /// Base amount.
        base: Box<VariableAmount>,
        /// Scaled by a uniform roll.
        addition: Box<VariableAmount>,
    },
    /// `base + U[-1,1) * variance`.
    BaseWithVariance {
        /// Base amount.
        base: Box<VariableAmount>,
        /// Maximum deviation.
        variance: Box<VariableAmount>,
    },
    /// `base`, plus `addition` with probability `chance`.
    BaseWithOptionalAddition {
        /// Base amount.
        base: Box<VariableAmount>,
        /// Added when the chance roll succeeds.
        addition: Box<VariableAmount>,
        /// Probability in `[0, 1]`.
        chance: f64,
    },
}

impl VariableAmount {
    /// A fixed amount.
    #[must_use]
    pub const fn fixed(value: f64) -> Self {
        Self::Fixed(value)
    }

    /// Uniform amount in `[min, max)`.
    #[must_use]
    pub const fn range(min: f64, max: f64) -> Self {
        Self::Range { min, max }
    }

    /// `base + U[0,1) * addition`.
    #[must_use]
    pub fn base_with_random_addition(
        base: impl Into<VariableAmount>,
        addition: impl Into<VariableAmount>,
    ) -> Self {
        Self::BaseWithRandomAddition {
            base: Box::new(base.into()),
            addition: Box::new(addition.into()),
        }
    }

    /// `base + U[-1,1) * variance`.
    #[must_use]
    pub fn base_with_variance(
        base: impl Into<VariableAmount>,
        variance: impl Into<VariableAmount>,
    ) -> Self {
        Self::BaseWithVariance {
            base: Box::new(base.into()),
            variance: Box::new(variance.into()),
        }
    }

    /// `base`, plus `addition` with probability `chance`.
    #[must_use]
    pub fn base_with_optional_addition(
        base: impl Into<VariableAmount>,
        addition: impl Into<VariableAmount>,
        chance: f64,
    ) -> Self {
        Self::BaseWithOptionalAddition {
            base: Box::new(base.into()),
            addition: Box::new(addition.into()),
            chance,
        }
    }

    /// Draws an amount.
    pub fn amount<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match self {
            Self::Fixed(value) => *value,
            Self::Range { min, max } => min + rng.gen::<f64>() * (max - min),
            Self::BaseWithRandomAddition { base, addition } => {
                base.amount(rng) + rng.gen::<f64>() * addition.amount(rng)
            }
            Self::BaseWithVariance { base, variance } => {
                let base = base.amount(rng);
                let variance = variance.amount(rng);
                base + rng.gen::<f64>() * variance * 2.0 - variance
            }
            Self::BaseWithOptionalAddition {
                base,
                addition,
                chance,
            } => {
                let base = base.amount(rng);
                if rng.gen::<f64>() < *chance {
                    base + addition.amount(rng)
                } else {
                    base
                }
            }
        }
    }

    /// Draws an amount and floors it.
    pub fn floored_amount<R: Rng + ?Sized>(&self, rng: &mut R) -> i32 {
        self.amount(rng).floor() as i32
    }
}

impl From<f64> for VariableAmount {
    fn from(value: f64) -> Self {
        Self::Fixed(value)
    }
}

impl From<i32> for VariableAmount {
    fn from(value: i32) -> Self {
        Self::Fixed(f64::from(value))
    }
}

/// An amount that may additionally depend on a noise value.
///
/// Ground-cover depths use this so that dirt gets thicker or thinner with the
/// column's secondary noise.
#[derive(Clone, Debug, PartialEq)]
pub enum SeededAmount {
    /// Ignores the noise value.
    Plain(VariableAmount),
    /// `noise / divisor + base + U[0,1) * jitter`.
    NoiseScaled {
        /// Noise divisor.
        divisor: f64,
        /// Constant offset.
        base: f64,
        /// Random jitter range.
        jitter: f64,
    },
}

impl SeededAmount {
    /// A fixed depth.
    #[must_use]
    pub const fn fixed(value: f64) -> Self {
        Self::Plain(VariableAmount::Fixed(value))
    }

    /// The classic dirt depth: `noise / 3 + 3 + U[0, 0.25)`.
    #[must_use]
    pub const fn filler_depth() -> Self {
        Self::NoiseScaled {
            divisor: 3.0,
            base: 3.0,
            jitter: 0.25,
        }
    }

    /// Draws an amount for the given noise value and floors it.
    pub fn floored_amount<R: Rng + ?Sized>(&self, rng: &mut R, noise: f64) -> i32 {
        match self {
            Self::Plain(amount) => amount.floored_amount(rng),
            Self::NoiseScaled {
                divisor,
                base,
                jitter,
            } => (noise / divisor + base + rng.gen::<f64>() * jitter).floor() as i32,
        }
    }
}

impl From<VariableAmount> for SeededAmount {
    fn from(amount: VariableAmount) -> Self {
        Self::Plain(amount)
    }
}

/// A table of entries picked with probability proportional to their weight.
#[derive(Clone)]
pub struct WeightedTable<T> {
    entries: Vec<(T, f64)>,
    index: Option<WeightedIndex<f64>>,
}

impl<T> WeightedTable<T> {
    /// An empty table; rolling it yields nothing.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: None,
        }
    }

    /// Adds an entry. Non-positive weights never get picked.
    pub fn add(&mut self, value: T, weight: f64) {
        self.entries.push((value, weight.max(0.0)));
        self.index = WeightedIndex::new(self.entries.iter().map(|(_, w)| *w)).ok();
    }

    /// Builder-style [`add`](Self::add).
    #[must_use]
    pub fn with(mut self, value: T, weight: f64) -> Self {
        self.add(value, weight);
        self
    }

    /// Picks one entry, or `None` when the table has no positive weight.
    pub fn get<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<&T> {
        let index = self.index.as_ref()?;
        self.entries.get(index.sample(rng)).map(|(value, _)| value)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries with their weights.
    pub fn iter(&self) -> impl Iterator<Item = (&T, f64)> {
        self.entries.iter().map(|(value, weight)| (value, *weight))
    }
}

impl<T> Default for WeightedTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for WeightedTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.entries.iter()).finish()
    }
}
