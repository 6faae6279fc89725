//! Positions of events inside the score.

use std::fmt::Display;

use super::Length;

/// Represents relative position (like in score): measure number and
/// distance from its start.
#[derive(Debug, Eq, PartialEq, PartialOrd, Ord, Clone, Copy, Hash)]
pub struct RelativePosition {
    measure_index: u32,
    /// distance from the start of the measure.
    measure_position: Length,
}
impl RelativePosition {
    /// # Parameters:
    /// * measure index: measure number (1-based)
    /// * measure_position: distance from start of measure.
    pub fn new(measure_index: u32, measure_position: Length) -> Self {
        Self {
            measure_index,
            measure_position,
        }
    }
    /// position in measure.
    pub fn position(&self) -> Length {
        self.measure_position
    }
    /// measure (1-based)
    pub fn measure_index(&self) -> u32 {
        self.measure_index
    }
}
impl Display for RelativePosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.measure_index, self.measure_position)
    }
}

#[cfg(test)]
mod tests {
    use crate::primitives::{Length, RelativePosition};

    #[test]
    fn relative_position() {
        let a = RelativePosition::new(2, Length::new(1, 4));
        let b = RelativePosition::new(2, Length::new(1, 2));
        let c = RelativePosition::new(3, Length::zero());
        assert!(a < b);
        assert!(b < c);
        assert_eq!(RelativePosition::new(2, Length::new(2, 4)), b);
        assert_eq!(c.measure_index(), 3);
        assert_eq!(c.to_string(), "3:0");
    }
}
