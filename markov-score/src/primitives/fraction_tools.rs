//! Tools for snapping fractions to musical lengths.

use std::fmt::Display;
use std::str::FromStr;

use fraction::Fraction;
use serde::{Deserialize, Serialize};

use crate::error::MarkovScoreError;

use super::Length;

/// Round `value` to the nearest integer, ties going to the even one.
fn round_half_even(value: Fraction) -> Fraction {
    let floor = value.floor();
    let diff = value - floor;
    let half = Fraction::new(1u64, 2u64);
    if diff > half {
        return floor + Fraction::new(1u64, 1u64);
    }
    if diff < half {
        return floor;
    }
    let floor_is_even = floor.numer().map(|n| n % 2 == 0).unwrap_or(true);
    match floor_is_even {
        true => floor,
        false => floor + Fraction::new(1u64, 1u64),
    }
}

/// Shortest length [quantize] ever returns.
pub fn min_quantized() -> Length {
    Length::new(1, 4)
}
/// Longest length [quantize] ever returns.
pub fn max_quantized() -> Length {
    Length::new(4, 1)
}

/// Snap duration to the grid.
///
/// Rounds to the nearest multiple of `grid` (ties to even multiple).
/// Result shorter than 1/8 beat becomes 1/4, result longer than 4 beats
/// becomes 4.
///
/// # Example
/// ```
/// # use markov_score::primitives::{quantize, Length};
/// let eighth = Length::new(1, 2);
/// assert_eq!(quantize(Length::from(0.7), eighth), Length::new(1, 2));
/// assert_eq!(quantize(Length::from(0.8), eighth), Length::new(1, 1));
/// assert_eq!(quantize(Length::from(0.1), eighth), Length::new(1, 4));
/// assert_eq!(quantize(Length::from(9.0), eighth), Length::new(4, 1));
/// ```
pub fn quantize(duration: Length, grid: Length) -> Length {
    let quantized = match grid.is_valid_duration() {
        true => round_half_even(duration.get() / grid.get()) * grid.get(),
        false => duration.get(),
    };
    let quantized = Length::from(quantized);
    if quantized < Length::new(1, 8) {
        return min_quantized();
    }
    if quantized > max_quantized() {
        return max_quantized();
    }
    quantized
}

/// Quantization grids offered to the user.
#[derive(
    Debug, PartialEq, Eq, Clone, Copy, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Grid {
    Sixteenth,
    #[default]
    Eighth,
    Quarter,
    Half,
}
impl Grid {
    pub fn length(&self) -> Length {
        match self {
            Self::Sixteenth => Length::new(1, 4),
            Self::Eighth => Length::new(1, 2),
            Self::Quarter => Length::new(1, 1),
            Self::Half => Length::new(2, 1),
        }
    }
    pub fn quantize(&self, duration: Length) -> Length {
        quantize(duration, self.length())
    }
}
impl Display for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Sixteenth => "sixteenth",
            Self::Eighth => "eighth",
            Self::Quarter => "quarter",
            Self::Half => "half",
        };
        write!(f, "{name}")
    }
}
impl FromStr for Grid {
    type Err = MarkovScoreError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sixteenth" | "0.25" => Ok(Self::Sixteenth),
            "eighth" | "0.5" => Ok(Self::Eighth),
            "quarter" | "1" | "1.0" => Ok(Self::Quarter),
            "half" | "2" | "2.0" => Ok(Self::Half),
            x => Err(MarkovScoreError::parse(x, "unknown quantization grid")),
        }
    }
}
