//! Pitches, note names and octave folding.
use std::{
    cmp::Ordering,
    fmt::Display,
    hash::{Hash, Hasher},
    str::FromStr,
    sync::OnceLock,
};

pub use musical_note::{Accidental, NoteName};

use musical_note::{Key, Note, NotesMap, ResolvedNote};

use crate::error::MarkovScoreError;

/// `musical_note` fills its table lazily without a lock, so the first
/// access is serialized here.
fn notes_map() -> &'static NotesMap {
    static NOTES: OnceLock<&'static NotesMap> = OnceLock::new();
    *NOTES.get_or_init(NotesMap::get)
}

/// Accidental, the pitch class can really be written with.
///
/// Without accidental (or with one, which does not fit, like `D` with
/// sharp) the natural name is used, and sharp for black keys.
fn spelling(midi: u8, accidental: Option<Accidental>) -> Accidental {
    let names = notes_map().get_by_midi(&midi);
    match accidental {
        Some(acc) if names.contains_key(&acc) => acc,
        _ if names.contains_key(&Accidental::White) => Accidental::White,
        _ => Accidental::Sharp,
    }
}

fn accidental_rank(accidental: Accidental) -> u8 {
    match accidental {
        Accidental::DoubleFlat => 0,
        Accidental::Flat => 1,
        Accidental::White => 2,
        Accidental::Sharp => 3,
        Accidental::DoubleSharp => 4,
    }
}

fn accidental_symbol(accidental: Accidental) -> &'static str {
    match accidental {
        Accidental::DoubleFlat => "bb",
        Accidental::Flat => "b",
        Accidental::White => "",
        Accidental::Sharp => "#",
        Accidental::DoubleSharp => "##",
    }
}

/// Written octave differs from the sounding one for `B#`, `Bx`, `Cb`
/// and `Cbb`.
fn octave_shift(name: NoteName, accidental: Accidental) -> i16 {
    match (name, accidental) {
        (NoteName::B, Accidental::Sharp | Accidental::DoubleSharp) => 1,
        (NoteName::C, Accidental::Flat | Accidental::DoubleFlat) => -1,
        _ => 0,
    }
}

/// Pitch as midi note number, keeping the spelling it was written with.
///
/// Two pitches are equal only if spelled the same: `C#4` and `Db4`, as
/// well as `B#3` and `C4`, are different Markov states, as they are
/// different written notes.
#[derive(Debug, Clone, Copy)]
pub struct Pitch {
    note: Note,
}
impl Pitch {
    pub fn from_midi(midi: u8, accidental: Option<Accidental>) -> Self {
        let midi = midi.min(127);
        Self {
            note: Note::from_midi(midi, Some(spelling(midi, accidental))),
        }
    }
    pub fn midi(&self) -> u8 {
        self.note.midi()
    }
    pub fn accidental(&self) -> Accidental {
        self.note.accidental().unwrap_or_default()
    }
    pub fn note_name(&self) -> NoteName {
        self.resolve().note
    }
    /// Written octave in scientific notation (C4 is the middle C).
    pub fn octave(&self) -> i16 {
        let resolved = self.resolve();
        resolved.octave.raw() as i16
            - 1
            - octave_shift(resolved.note, resolved.accidental)
    }
    /// Shift by whole octaves, clamped to the midi range.
    pub fn transpose_octaves(&self, octaves: i16) -> Self {
        let midi = (self.midi() as i16 + octaves * 12).clamp(0, 127);
        Self::from_midi(midi as u8, Some(self.accidental()))
    }
    /// Accidental is always one of the pitch class spellings, so the key
    /// is never consulted.
    fn resolve(&self) -> ResolvedNote {
        // table has to exist before `Note::resolve` reaches for it
        notes_map();
        self.note.resolve(Key::default())
    }
    fn identity(&self) -> (u8, u8) {
        (self.midi(), accidental_rank(self.accidental()))
    }
}
impl PartialEq for Pitch {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}
impl Eq for Pitch {}
impl PartialOrd for Pitch {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Pitch {
    fn cmp(&self, other: &Self) -> Ordering {
        self.identity().cmp(&other.identity())
    }
}
impl Hash for Pitch {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}
impl Display for Pitch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let resolved = self.resolve();
        write!(
            f,
            "{}{}{}",
            resolved.note.to_string().to_uppercase(),
            accidental_symbol(resolved.accidental),
            self.octave()
        )
    }
}
impl FromStr for Pitch {
    type Err = MarkovScoreError;

    /// Parse scientific pitch notation: `C4`, `Bb3`, `F#5`, `Cx4`.
    ///
    /// `-` is read as flat, as music21 writes it (`B-3` is `Bb3`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let mut chars = s.chars();
        let name = chars
            .next()
            .and_then(|ch| NoteName::from_str(&ch.to_string()))
            .ok_or_else(|| MarkovScoreError::parse(s, "no note name"))?;
        let rest = chars.as_str();
        let split = rest
            .find(|ch: char| !matches!(ch, '#' | 'x' | 'b' | '-'))
            .unwrap_or(rest.len());
        let (symbols, octave) = rest.split_at(split);
        let accidental = match symbols {
            "" => Accidental::White,
            "#" => Accidental::Sharp,
            "##" | "x" => Accidental::DoubleSharp,
            "b" | "-" => Accidental::Flat,
            "bb" | "--" => Accidental::DoubleFlat,
            _ => return Err(MarkovScoreError::parse(s, "bad accidental")),
        };
        let octave: i16 = octave
            .parse()
            .map_err(|_| MarkovScoreError::parse(s, "bad octave"))?;
        let pitch_class = notes_map().get_by_note(name, accidental) as i16;
        let midi =
            (octave + 1 + octave_shift(name, accidental)) * 12 + pitch_class;
        if !(0..=127).contains(&midi) {
            return Err(MarkovScoreError::parse(s, "out of midi range"));
        }
        Ok(Self::from_midi(midi as u8, Some(accidental)))
    }
}
/// Pitch of an event, or its absence.
#[derive(
    Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Default,
)]
pub enum PitchOrRest {
    #[default]
    Rest,
    Pitch(Pitch),
}
impl PitchOrRest {
    pub fn is_rest(&self) -> bool {
        matches!(self, Self::Rest)
    }
    pub fn pitch(&self) -> Option<Pitch> {
        match self {
            Self::Rest => None,
            Self::Pitch(p) => Some(*p),
        }
    }
}
impl From<Pitch> for PitchOrRest {
    fn from(value: Pitch) -> Self {
        Self::Pitch(value)
    }
}
impl Display for PitchOrRest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rest => write!(f, "R"),
            Self::Pitch(p) => write!(f, "{p}"),
        }
    }
}
impl FromStr for PitchOrRest {
    type Err = MarkovScoreError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "R" | "r" | "rest" => Ok(Self::Rest),
            x => Ok(Self::Pitch(x.parse()?)),
        }
    }
}

/// Inclusive pitch bounds of an instrument.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct PitchRange {
    pub low: Pitch,
    pub high: Pitch,
}
impl PitchRange {
    pub fn new(low: Pitch, high: Pitch) -> Self {
        Self { low, high }
    }
    /// Parse bounds written as note names. Used for the static tables.
    pub(crate) fn from_names(low: &str, high: &str) -> Self {
        match (low.parse(), high.parse()) {
            (Ok(low), Ok(high)) => Self { low, high },
            _ => Self::full(),
        }
    }
    pub fn full() -> Self {
        Self {
            low: Pitch::from_midi(0, None),
            high: Pitch::from_midi(127, None),
        }
    }
    pub fn contains(&self, pitch: &Pitch) -> bool {
        self.low.midi() <= pitch.midi() && pitch.midi() <= self.high.midi()
    }
}

/// Fold pitch into `[low, high]` by octave transposition.
///
/// Transposes up while lower than `low`, and only after that down while
/// higher than `high`. Rests are returned as is.
///
/// # Example
/// ```
/// # use markov_score::primitives::{normalize_range, PitchOrRest};
/// let c2: PitchOrRest = "C2".parse().unwrap();
/// let (low, high) = ("G3".parse().unwrap(), "A7".parse().unwrap());
/// assert_eq!(normalize_range(c2, low, high), "C4".parse().unwrap());
/// assert_eq!(
///     normalize_range(PitchOrRest::Rest, low, high),
///     PitchOrRest::Rest
/// );
/// ```
pub fn normalize_range(pitch: PitchOrRest, low: Pitch, high: Pitch) -> PitchOrRest {
    let mut pitch = match pitch {
        PitchOrRest::Rest => return pitch,
        PitchOrRest::Pitch(p) => p,
    };
    while pitch.midi() < low.midi() {
        let up = pitch.transpose_octaves(1);
        if up == pitch {
            break;
        }
        pitch = up;
    }
    while pitch.midi() > high.midi() {
        let down = pitch.transpose_octaves(-1);
        if down == pitch {
            break;
        }
        pitch = down;
    }
    PitchOrRest::Pitch(pitch)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::{
        normalize_range, Accidental, NoteName, Pitch, PitchOrRest, PitchRange,
    };

    #[test]
    fn test_parse() {
        let c4: Pitch = "C4".parse().unwrap();
        assert_eq!(c4.midi(), 60);
        assert_eq!(c4.octave(), 4);
        let bb3: Pitch = "Bb3".parse().unwrap();
        assert_eq!(bb3.midi(), 58);
        assert_eq!(bb3.accidental(), Accidental::Flat);
        assert_eq!(bb3.to_string(), "Bb3");
        let fs5: Pitch = "F#5".parse().unwrap();
        assert_eq!(fs5.midi(), 78);
        assert_eq!(fs5.to_string(), "F#5");
        assert_eq!("A0".parse::<Pitch>().unwrap().midi(), 21);
        assert_eq!("C8".parse::<Pitch>().unwrap().midi(), 108);
        assert!("H4".parse::<Pitch>().is_err());
        assert!("C".parse::<Pitch>().is_err());
        assert!("G10".parse::<Pitch>().is_err());
        assert_eq!("R".parse::<PitchOrRest>().unwrap(), PitchOrRest::Rest);
    }

    #[test]
    fn test_spelling_differs() {
        let cs: Pitch = "C#4".parse().unwrap();
        let db: Pitch = "Db4".parse().unwrap();
        assert_eq!(cs.midi(), db.midi());
        assert_ne!(cs, db);
        let set: HashSet<Pitch> = [cs, db, "C#4".parse().unwrap()].into();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_enharmonic_spelling_kept() {
        let bs3: Pitch = "B#3".parse().unwrap();
        let c4: Pitch = "C4".parse().unwrap();
        assert_eq!(bs3.midi(), 60);
        assert_ne!(bs3, c4);
        assert_eq!(bs3.note_name(), NoteName::B);
        assert_eq!(bs3.octave(), 3);
        assert_eq!(bs3.to_string(), "B#3");
        assert_eq!(c4.accidental(), Accidental::White);

        let cb4: Pitch = "Cb4".parse().unwrap();
        assert_eq!(cb4.midi(), 59);
        assert_eq!(cb4.to_string(), "Cb4");
        assert_ne!(cb4, "B3".parse().unwrap());

        assert_eq!("Ebb4".parse::<Pitch>().unwrap().midi(), 62);
        assert_eq!("Fx4".parse::<Pitch>().unwrap().to_string(), "F##4");
        assert!("C#b4".parse::<Pitch>().is_err());
    }

    #[test]
    fn test_music21_flats() {
        let b_flat: Pitch = "B-3".parse().unwrap();
        assert_eq!(b_flat, "Bb3".parse().unwrap());
        assert_eq!(b_flat.midi(), 58);
        let e_double_flat: Pitch = "E--4".parse().unwrap();
        assert_eq!(e_double_flat.accidental(), Accidental::DoubleFlat);
        assert_eq!(e_double_flat.to_string(), "Ebb4");
    }

    #[test]
    fn test_from_midi_spelling() {
        assert_eq!(Pitch::from_midi(60, None).to_string(), "C4");
        assert_eq!(Pitch::from_midi(72, None).to_string(), "C5");
        assert_eq!(Pitch::from_midi(61, None).to_string(), "C#4");
        assert_eq!(
            Pitch::from_midi(61, Some(Accidental::Flat)).to_string(),
            "Db4"
        );
        // D has no single sharp spelling.
        assert_eq!(
            Pitch::from_midi(62, Some(Accidental::Sharp)),
            "D4".parse().unwrap()
        );
        let bb3: Pitch = "Bb3".parse().unwrap();
        assert_eq!(bb3.transpose_octaves(2).to_string(), "Bb5");
        assert!(bb3 < "B3".parse().unwrap());
    }

    #[test]
    fn test_normalize_range() {
        let range = PitchRange::from_names("C4", "C7");
        for midi in 0..=127u8 {
            let folded = normalize_range(
                Pitch::from_midi(midi, None).into(),
                range.low,
                range.high,
            );
            let folded = folded.pitch().unwrap();
            assert!(range.contains(&folded), "{midi} -> {folded}");
            assert_eq!(folded.midi() % 12, midi % 12);
        }
    }

    #[test]
    fn test_normalize_up_pass_first() {
        // Range narrower than an octave: the down pass wins.
        let low: Pitch = "C4".parse().unwrap();
        let high: Pitch = "E4".parse().unwrap();
        let g3 = PitchOrRest::from("G3".parse::<Pitch>().unwrap());
        assert_eq!(normalize_range(g3, low, high), "G3".parse().unwrap());
    }
}
