use std::{fmt::Display, ops::Add};

use fraction::Fraction;

/// Exact length in beats (quarter notes).
///
/// All layout arithmetic is made on `Length`, so measure sums never
/// suffer from floating point drift.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
pub struct Length {
    fraction: Fraction,
}
impl Length {
    pub fn zero() -> Self {
        Self::from(Fraction::new(0u64, 1u64))
    }
    pub fn new(numerator: u64, denominator: u64) -> Self {
        Self::from(Fraction::new(numerator, denominator))
    }
    pub fn get(&self) -> Fraction {
        self.fraction
    }
    pub fn as_beats(&self) -> f64 {
        match (self.fraction.numer(), self.fraction.denom()) {
            (Some(n), Some(d)) => {
                let value = *n as f64 / *d as f64;
                match self.fraction.is_sign_negative() {
                    true => -value,
                    false => value,
                }
            }
            _ if self.fraction.is_nan() => f64::NAN,
            _ if self.fraction.is_sign_negative() => f64::NEG_INFINITY,
            _ => f64::INFINITY,
        }
    }
    pub fn is_zero(&self) -> bool {
        *self == Self::zero()
    }
    /// Positive and finite: the only lengths an event may have.
    pub fn is_valid_duration(&self) -> bool {
        !self.fraction.is_nan()
            && !self.fraction.is_infinite()
            && self.fraction.is_sign_positive()
            && !self.is_zero()
    }
    /// `None` if the result would be negative.
    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        let frac = self.fraction - rhs.fraction;
        match frac.is_sign_negative() && frac != Fraction::new(0u64, 1u64) {
            true => None,
            false => Some(Self::from(frac)),
        }
    }
}
impl From<Fraction> for Length {
    fn from(value: Fraction) -> Self {
        Self { fraction: value }
    }
}
impl From<f64> for Length {
    fn from(value: f64) -> Self {
        Self::from(Fraction::from(value))
    }
}
impl Add for Length {
    fn add(self, rhs: Self) -> Self::Output {
        Self {
            fraction: self.fraction + rhs.fraction,
        }
    }
    type Output = Self;
}
impl std::iter::Sum for Length {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), |acc, l| acc + l)
    }
}
impl Display for Length {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.fraction)
    }
}

#[cfg(test)]
mod tests {
    use fraction::Fraction;

    use crate::primitives::Length;

    #[test]
    fn length() {
        let a = Length::from(1.0);
        let b = Length::from(Fraction::from(1.0));
        assert_eq!(a, b);
        assert_eq!(a + b, Length::from(2.0));
        assert_eq!(Length::from(0.5) + Length::from(0.25), Length::new(3, 4));
        assert_eq!(Length::new(3, 2).as_beats(), 1.5);
    }
    #[test]
    fn length_checked_sub() {
        assert_eq!(Length::from(1.0).checked_sub(Length::from(2.0)), None);
        assert_eq!(
            Length::from(2.0).checked_sub(Length::from(0.5)),
            Some(Length::new(3, 2))
        );
        assert_eq!(
            Length::from(2.0).checked_sub(Length::from(2.0)),
            Some(Length::zero())
        );
    }
    #[test]
    fn length_validity() {
        assert!(Length::new(1, 4).is_valid_duration());
        assert!(!Length::zero().is_valid_duration());
        assert!(!Length::from(-1.0).is_valid_duration());
        assert!(!Length::from(f64::NAN).is_valid_duration());
        assert!(!Length::from(f64::INFINITY).is_valid_duration());
    }
}
