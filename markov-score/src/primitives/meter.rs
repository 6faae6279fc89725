use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::MarkovScoreError;

use super::Length;

/// Time signature.
#[derive(
    Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct Meter {
    pub numerator: u32,
    pub denominator: u32,
}
impl Meter {
    /// # Errors
    /// on zero numerator, or denominator that is not a power of two.
    pub fn new(numerator: u32, denominator: u32) -> Result<Self, MarkovScoreError> {
        if numerator == 0 || !denominator.is_power_of_two() {
            return Err(MarkovScoreError::parse(
                format!("{numerator}/{denominator}"),
                "numerator should be positive and denominator a power of two",
            ));
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }
    /// Measure length in beats (quarter notes).
    ///
    /// # Example
    /// ```
    /// # use markov_score::primitives::{Length, Meter};
    /// assert_eq!(Meter::new(4, 4).unwrap().capacity(), Length::new(4, 1));
    /// assert_eq!(Meter::new(6, 8).unwrap().capacity(), Length::new(3, 1));
    /// assert_eq!(Meter::new(3, 8).unwrap().capacity(), Length::new(3, 2));
    /// ```
    pub fn capacity(&self) -> Length {
        Length::new(self.numerator as u64 * 4, self.denominator as u64)
    }
}
impl Default for Meter {
    fn default() -> Self {
        Self {
            numerator: 4,
            denominator: 4,
        }
    }
}
impl Display for Meter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}
impl FromStr for Meter {
    type Err = MarkovScoreError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (num, denom) = s
            .trim()
            .split_once('/')
            .ok_or_else(|| MarkovScoreError::parse(s, "expected `n/d`"))?;
        let num = num
            .trim()
            .parse()
            .map_err(|_| MarkovScoreError::parse(s, "bad numerator"))?;
        let denom = denom
            .trim()
            .parse()
            .map_err(|_| MarkovScoreError::parse(s, "bad denominator"))?;
        Self::new(num, denom)
    }
}
impl TryFrom<String> for Meter {
    type Error = MarkovScoreError;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
impl From<Meter> for String {
    fn from(value: Meter) -> Self {
        value.to_string()
    }
}
