//! Instruments, their ranges, and doubled instances.
//!
//! [InstrumentKind] is a closed set with a total mapping to pitch range.
//! [InstrumentLabel] decorates a name with an optional doubling number
//! (`"Horn #3"`); lookups resolve it to the base name first.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::{MarkovScoreError, Result};
use crate::primitives::PitchRange;

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
pub enum InstrumentKind {
    Flute,
    Oboe,
    Clarinet,
    Bassoon,
    Horn,
    Trumpet,
    Trombone,
    Tuba,
    ViolinI,
    ViolinII,
    Viola,
    Violoncello,
    DoubleBass,
    Piano,
}
impl InstrumentKind {
    pub const ALL: [InstrumentKind; 14] = [
        Self::Flute,
        Self::Oboe,
        Self::Clarinet,
        Self::Bassoon,
        Self::Horn,
        Self::Trumpet,
        Self::Trombone,
        Self::Tuba,
        Self::ViolinI,
        Self::ViolinII,
        Self::Viola,
        Self::Violoncello,
        Self::DoubleBass,
        Self::Piano,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Flute => "Flute",
            Self::Oboe => "Oboe",
            Self::Clarinet => "Clarinet",
            Self::Bassoon => "Bassoon",
            Self::Horn => "Horn",
            Self::Trumpet => "Trumpet",
            Self::Trombone => "Trombone",
            Self::Tuba => "Tuba",
            Self::ViolinI => "Violin I",
            Self::ViolinII => "Violin II",
            Self::Viola => "Viola",
            Self::Violoncello => "Violoncello",
            Self::DoubleBass => "Double Bass",
            Self::Piano => "Piano",
        }
    }

    /// Written range, inclusive.
    pub fn range(&self) -> PitchRange {
        let (low, high) = match self {
            Self::Flute => ("C4", "C7"),
            Self::Oboe => ("Bb3", "A6"),
            Self::Clarinet => ("D3", "Bb6"),
            Self::Bassoon => ("Bb1", "Eb5"),
            Self::Horn => ("F2", "B5"),
            Self::Trumpet => ("Gb3", "Gb6"),
            Self::Trombone => ("E2", "Bb5"),
            Self::Tuba => ("D1", "F4"),
            Self::ViolinI | Self::ViolinII => ("G3", "A7"),
            Self::Viola => ("C3", "E6"),
            Self::Violoncello => ("C2", "C6"),
            Self::DoubleBass => ("E1", "G4"),
            Self::Piano => ("A0", "C8"),
        };
        PitchRange::from_names(low, high)
    }
}
impl Display for InstrumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
impl FromStr for InstrumentKind {
    type Err = MarkovScoreError;
    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .find(|kind| kind.name() == s.trim())
            .copied()
            .ok_or_else(|| MarkovScoreError::UnknownInstrument(s.to_string()))
    }
}

/// Range used for names, that are not an [InstrumentKind].
pub fn default_range() -> PitchRange {
    InstrumentKind::ViolinI.range()
}

const DOUBLING_SEPARATOR: &str = " #";

/// Name of a voice: instrument name with optional doubling number.
///
/// # Example
/// ```
/// # use markov_score::instrument::{InstrumentKind, InstrumentLabel};
/// let label: InstrumentLabel = "Violin I #2".parse().unwrap();
/// assert_eq!(label.base_name(), "Violin I");
/// assert_eq!(label.doubling(), Some(2));
/// assert_eq!(label.kind(), Some(InstrumentKind::ViolinI));
/// assert_eq!(label.to_string(), "Violin I #2");
/// ```
#[derive(
    Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct InstrumentLabel {
    base: String,
    doubling: Option<u32>,
}
impl InstrumentLabel {
    pub fn new(kind: InstrumentKind) -> Self {
        Self {
            base: kind.name().to_string(),
            doubling: None,
        }
    }
    pub fn doubled(kind: InstrumentKind, number: u32) -> Self {
        Self {
            base: kind.name().to_string(),
            doubling: Some(number),
        }
    }
    /// Label for any name, even not known as instrument.
    pub fn custom(base: impl Into<String>, doubling: Option<u32>) -> Self {
        Self {
            base: base.into(),
            doubling,
        }
    }
    pub fn base_name(&self) -> &str {
        &self.base
    }
    pub fn doubling(&self) -> Option<u32> {
        self.doubling
    }
    pub fn kind(&self) -> Option<InstrumentKind> {
        self.base.parse().ok()
    }
    /// Range of the base instrument, or [default_range] for unknown one.
    pub fn range(&self) -> PitchRange {
        match self.kind() {
            Some(kind) => kind.range(),
            None => {
                log::warn!(
                    "unknown instrument `{}`, using default range",
                    self.base
                );
                default_range()
            }
        }
    }
}
impl From<InstrumentKind> for InstrumentLabel {
    fn from(kind: InstrumentKind) -> Self {
        Self::new(kind)
    }
}
impl Display for InstrumentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.doubling {
            None => write!(f, "{}", self.base),
            Some(n) => write!(f, "{}{DOUBLING_SEPARATOR}{n}", self.base),
        }
    }
}
impl FromStr for InstrumentLabel {
    type Err = MarkovScoreError;

    /// Never fails on unknown names: validation is up to the caller.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(MarkovScoreError::parse(s, "empty instrument name"));
        }
        match s.rsplit_once(DOUBLING_SEPARATOR) {
            Some((base, number)) => {
                let number = number.trim().parse().map_err(|_| {
                    MarkovScoreError::parse(s, "bad doubling number")
                })?;
                Ok(Self::custom(base.trim(), Some(number)))
            }
            None => Ok(Self::custom(s, None)),
        }
    }
}
impl TryFrom<String> for InstrumentLabel {
    type Error = MarkovScoreError;
    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}
impl From<InstrumentLabel> for String {
    fn from(value: InstrumentLabel) -> Self {
        value.to_string()
    }
}

/// Expand instrument counts into labels.
///
/// Single instrument keeps the plain name, several get numbered
/// `#1..#n`.
pub fn expand_counts(
    counts: impl IntoIterator<Item = (InstrumentKind, u32)>,
) -> Vec<InstrumentLabel> {
    counts
        .into_iter()
        .flat_map(|(kind, count)| match count {
            0 => Vec::new(),
            1 => vec![InstrumentLabel::new(kind)],
            n => (1..=n).map(|i| InstrumentLabel::doubled(kind, i)).collect(),
        })
        .collect()
}

/// Standard symphony orchestra with doublings.
pub fn typical_orchestra() -> Vec<InstrumentLabel> {
    use InstrumentKind::*;
    expand_counts([
        (Flute, 2),
        (Oboe, 2),
        (Clarinet, 2),
        (Bassoon, 2),
        (Horn, 4),
        (Trumpet, 2),
        (Trombone, 3),
        (Tuba, 1),
        (ViolinI, 8),
        (ViolinII, 6),
        (Viola, 4),
        (Violoncello, 4),
        (DoubleBass, 2),
    ])
}

pub fn string_quartet() -> Vec<InstrumentLabel> {
    use InstrumentKind::*;
    expand_counts([(ViolinI, 1), (ViolinII, 1), (Viola, 1), (Violoncello, 1)])
}

#[cfg(test)]
mod tests {
    use super::{
        default_range, expand_counts, string_quartet, typical_orchestra,
        InstrumentKind, InstrumentLabel,
    };

    #[test]
    fn test_ranges_are_total() {
        for kind in InstrumentKind::ALL {
            let range = kind.range();
            assert!(
                range.high.midi() - range.low.midi() >= 11,
                "{kind} range is narrower than an octave"
            );
            assert_eq!(kind.name().parse::<InstrumentKind>().unwrap(), kind);
        }
        assert_eq!(InstrumentKind::Tuba.range().low.midi(), 26);
        assert_eq!(InstrumentKind::Piano.range().high.midi(), 108);
    }

    #[test]
    fn test_label() {
        let horn: InstrumentLabel = "Horn #3".parse().unwrap();
        assert_eq!(horn, InstrumentLabel::doubled(InstrumentKind::Horn, 3));
        assert_eq!(horn.range(), InstrumentKind::Horn.range());

        let kazoo: InstrumentLabel = "Kazoo".parse().unwrap();
        assert_eq!(kazoo.kind(), None);
        assert_eq!(kazoo.range(), default_range());

        assert!("Horn #x".parse::<InstrumentLabel>().is_err());
        assert!("".parse::<InstrumentLabel>().is_err());
    }

    #[test]
    fn test_presets() {
        let orchestra = typical_orchestra();
        assert_eq!(orchestra.len(), 42);
        assert_eq!(orchestra[0].to_string(), "Flute #1");
        assert!(orchestra.contains(&InstrumentLabel::new(InstrumentKind::Tuba)));
        assert_eq!(string_quartet().len(), 4);
        assert_eq!(string_quartet()[3].to_string(), "Violoncello");
        assert!(expand_counts([(InstrumentKind::Piano, 0)]).is_empty());
    }
}
