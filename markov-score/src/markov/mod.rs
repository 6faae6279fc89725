//! Training and sampling of Markov chains over musical events.
//!
//! Training builds a [Model] from a corpus once; the model is then
//! only read. Generation draws from it with any [rand::Rng], so a
//! seeded source gives reproducible voices.

pub mod generator;
pub mod table;
pub mod trainer;

pub use generator::{
    generate_axes, generate_axis_sequence, generate_joint, generate_voice,
    generate_voice_with_axes, AxisSequences,
};
pub use table::{
    InitialDistribution, TransitionCounts, TransitionTable,
    PROBABILITY_TOLERANCE,
};
pub use trainer::{train_model, Model};

use crate::primitives::{
    Articulation, Dynamic, Event, Length, Pitch, PitchOrRest, NEUTRAL_INTENSITY,
};

/// Corpus used, when there is no loaded source material.
///
/// "Twinkle, Twinkle" in C major: fourteen events, two of them half
/// notes.
pub fn default_training_phrase() -> Vec<Event> {
    const PHRASE: [(u8, u64); 14] = [
        (72, 1),
        (72, 1),
        (79, 1),
        (79, 1),
        (81, 1),
        (81, 1),
        (79, 2),
        (77, 1),
        (77, 1),
        (76, 1),
        (76, 1),
        (74, 1),
        (74, 1),
        (72, 2),
    ];
    PHRASE
        .iter()
        .map(|(midi, beats)| Event {
            pitch: PitchOrRest::Pitch(Pitch::from_midi(*midi, None)),
            length: Length::new(*beats, 1),
            dynamic: Dynamic::from_intensity(NEUTRAL_INTENSITY),
            articulation: Articulation::Normal,
            intensity: NEUTRAL_INTENSITY,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::default_training_phrase;
    use crate::primitives::{Dynamic, Length};

    #[test]
    fn test_default_phrase() {
        let phrase = default_training_phrase();
        assert_eq!(phrase.len(), 14);
        assert_eq!(phrase[0].pitch.to_string(), "C5");
        assert_eq!(phrase[6].length, Length::from(2.0));
        let total: Length = phrase.iter().map(|ev| ev.length).sum();
        assert_eq!(total, Length::from(16.0));
        assert!(phrase.iter().all(|ev| ev.dynamic == Dynamic::Mf));
    }
}
