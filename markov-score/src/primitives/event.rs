//! A smallest piece of music, that is held by Measure.
use std::{fmt::Display, str::FromStr};

use crate::error::{MarkovScoreError, Result};

use super::{Length, Meter, PitchOrRest, RelativePosition};

/// Intensity of a rest, and of everything without explicit intensity.
pub const NEUTRAL_INTENSITY: u8 = 64;

/// Eight dynamic levels, from the softest.
#[derive(
    Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Default,
)]
pub enum Dynamic {
    Ppp,
    Pp,
    P,
    Mp,
    #[default]
    Mf,
    F,
    Ff,
    Fff,
}
impl Dynamic {
    /// Buckets of 16 steps, the last one (112..=127) is wider.
    ///
    /// # Example
    /// ```
    /// # use markov_score::primitives::Dynamic;
    /// assert_eq!(Dynamic::from_intensity(0), Dynamic::Ppp);
    /// assert_eq!(Dynamic::from_intensity(64), Dynamic::Mf);
    /// assert_eq!(Dynamic::from_intensity(127), Dynamic::Fff);
    /// ```
    pub fn from_intensity(intensity: u8) -> Self {
        match intensity {
            0..=15 => Self::Ppp,
            16..=31 => Self::Pp,
            32..=47 => Self::P,
            48..=63 => Self::Mp,
            64..=79 => Self::Mf,
            80..=95 => Self::F,
            96..=111 => Self::Ff,
            _ => Self::Fff,
        }
    }
}
impl Display for Dynamic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Ppp => "ppp",
            Self::Pp => "pp",
            Self::P => "p",
            Self::Mp => "mp",
            Self::Mf => "mf",
            Self::F => "f",
            Self::Ff => "ff",
            Self::Fff => "fff",
        };
        write!(f, "{s}")
    }
}
impl FromStr for Dynamic {
    type Err = MarkovScoreError;
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ppp" => Ok(Self::Ppp),
            "pp" => Ok(Self::Pp),
            "p" => Ok(Self::P),
            "mp" => Ok(Self::Mp),
            "mf" => Ok(Self::Mf),
            "f" => Ok(Self::F),
            "ff" => Ok(Self::Ff),
            "fff" => Ok(Self::Fff),
            x => Err(MarkovScoreError::parse(x, "unknown dynamic")),
        }
    }
}

#[derive(
    Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Default,
)]
pub enum Articulation {
    #[default]
    Normal,
    Staccato,
    Staccatissimo,
    Tenuto,
    Accent,
    StrongAccent,
}
impl Display for Articulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Normal => "normal",
            Self::Staccato => "staccato",
            Self::Staccatissimo => "staccatissimo",
            Self::Tenuto => "tenuto",
            Self::Accent => "accent",
            Self::StrongAccent => "strong accent",
        };
        write!(f, "{s}")
    }
}
impl FromStr for Articulation {
    type Err = MarkovScoreError;
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "normal" => Ok(Self::Normal),
            "staccato" => Ok(Self::Staccato),
            "staccatissimo" => Ok(Self::Staccatissimo),
            "tenuto" => Ok(Self::Tenuto),
            "accent" => Ok(Self::Accent),
            "strong accent" => Ok(Self::StrongAccent),
            x => Err(MarkovScoreError::parse(x, "unknown articulation")),
        }
    }
}

/// Atomic symbolic unit: what the Markov chains learn and produce.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
pub struct Event {
    pub pitch: PitchOrRest,
    pub length: Length,
    pub dynamic: Dynamic,
    pub articulation: Articulation,
    pub intensity: u8,
}
impl Event {
    /// Dynamic is derived from intensity. Rests get neutral intensity
    /// and dynamic whatever is passed.
    pub fn new(pitch: PitchOrRest, length: Length, intensity: u8) -> Result<Self> {
        if intensity > 127 {
            return Err(MarkovScoreError::InvalidIntensity(intensity as u32));
        }
        Ok(match pitch {
            PitchOrRest::Rest => Self::rest(length),
            PitchOrRest::Pitch(_) => Self {
                pitch,
                length,
                dynamic: Dynamic::from_intensity(intensity),
                articulation: Articulation::Normal,
                intensity,
            },
        })
    }
    pub fn rest(length: Length) -> Self {
        Self {
            pitch: PitchOrRest::Rest,
            length,
            dynamic: Dynamic::default(),
            articulation: Articulation::Normal,
            intensity: NEUTRAL_INTENSITY,
        }
    }
    pub fn is_rest(&self) -> bool {
        self.pitch.is_rest()
    }
    pub fn with_length(&self, length: Length) -> Self {
        Self { length, ..*self }
    }
    pub fn with_pitch(&self, pitch: PitchOrRest) -> Self {
        Self { pitch, ..*self }
    }
    pub fn with_articulation(&self, articulation: Articulation) -> Self {
        Self {
            articulation,
            ..*self
        }
    }
}
impl Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.pitch {
            PitchOrRest::Rest => write!(f, "R:{}", self.length),
            PitchOrRest::Pitch(p) => write!(
                f,
                "{p}:{}:{}:{}",
                self.length, self.dynamic, self.intensity
            ),
        }
    }
}

/// Tie marker of a placed fragment.
///
/// `Continue` is both the end of one tie and the start of the next:
/// it appears when a fragment fills a whole measure in the middle of a
/// long event.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub enum Tie {
    #[default]
    None,
    Start,
    Continue,
    Stop,
}
impl Tie {
    pub(crate) fn for_fragment(tied_from_previous: bool, ties_to_next: bool) -> Self {
        match (tied_from_previous, ties_to_next) {
            (false, false) => Self::None,
            (false, true) => Self::Start,
            (true, true) => Self::Continue,
            (true, false) => Self::Stop,
        }
    }
    pub fn starts(&self) -> bool {
        matches!(self, Self::Start | Self::Continue)
    }
    pub fn stops(&self) -> bool {
        matches!(self, Self::Stop | Self::Continue)
    }
}

/// Event (or its fragment), placed in measure.
#[derive(Debug, PartialEq, Clone)]
pub struct EventInfo {
    pub position: RelativePosition,
    pub event: Event,
    pub tie: Tie,
}
impl EventInfo {
    pub fn new(position: RelativePosition, event: Event, tie: Tie) -> Self {
        Self {
            position,
            event,
            tie,
        }
    }
    pub fn length(&self) -> Length {
        self.event.length
    }
}

/// Anything that can be put in measure.
///
/// Only [MeasureItem::Event] occupies time.
#[derive(Debug, PartialEq, Clone)]
pub enum MeasureItem {
    Event(EventInfo),
    Dynamic(Dynamic),
    MeterChange(Meter),
}
impl MeasureItem {
    pub fn length(&self) -> Length {
        match self {
            Self::Event(ev) => ev.length(),
            _ => Length::zero(),
        }
    }
    pub fn as_event(&self) -> Option<&EventInfo> {
        match self {
            Self::Event(ev) => Some(ev),
            _ => None,
        }
    }
}
