use std::collections::BTreeMap;

use itertools::Itertools;

use crate::error::{MarkovScoreError, Result};
use crate::primitives::{Event, Length, PitchOrRest};

use super::table::{InitialDistribution, TransitionCounts, TransitionTable};

/// Everything learned from one corpus.
///
/// Holds the order-k joint chain over whole events and three
/// independent first-order chains, one per event axis. Voice
/// generation samples only the axis chains.
///
/// Immutable after [train_model], so can be freely shared between
/// doublings of the same instrument.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    order: usize,
    events: Vec<Event>,
    states: Vec<Vec<Event>>,
    initial: InitialDistribution<Vec<Event>>,
    joint: TransitionTable<Vec<Event>, Event>,
    pitch: TransitionTable<PitchOrRest, PitchOrRest>,
    duration: TransitionTable<Length, Length>,
    intensity: TransitionTable<u8, u8>,
}
impl Model {
    pub fn order(&self) -> usize {
        self.order
    }
    /// Distinct events of the corpus, ordered.
    pub fn events(&self) -> &[Event] {
        &self.events
    }
    /// Every k-gram of the corpus in the order of appearance,
    /// duplicates included.
    pub fn states(&self) -> &Vec<Vec<Event>> {
        &self.states
    }
    pub fn initial(&self) -> &InitialDistribution<Vec<Event>> {
        &self.initial
    }
    pub fn joint(&self) -> &TransitionTable<Vec<Event>, Event> {
        &self.joint
    }
    pub fn pitch(&self) -> &TransitionTable<PitchOrRest, PitchOrRest> {
        &self.pitch
    }
    pub fn duration(&self) -> &TransitionTable<Length, Length> {
        &self.duration
    }
    pub fn intensity(&self) -> &TransitionTable<u8, u8> {
        &self.intensity
    }
}

/// Train all chains over the (already quantized) corpus.
///
/// # Errors
/// - [MarkovScoreError::EmptyCorpus] if there are no events.
/// - [MarkovScoreError::InvalidOrder] if order is 0.
/// - [MarkovScoreError::DataIntegrity] if normalization breaks.
///
/// # Example
/// ```
/// # use markov_score::markov::{default_training_phrase, train_model};
/// let model = train_model(&default_training_phrase(), 1).unwrap();
/// assert_eq!(model.initial().len(), 8);
/// assert!(!model.pitch().is_empty());
/// ```
pub fn train_model(corpus: &[Event], order: usize) -> Result<Model> {
    if corpus.is_empty() {
        return Err(MarkovScoreError::EmptyCorpus);
    }
    if order == 0 {
        return Err(MarkovScoreError::InvalidOrder(order));
    }
    let states: Vec<Vec<Event>> =
        corpus.windows(order).map(|w| w.to_vec()).collect();
    let initial = train_initial(&states)?;
    let joint = train_joint(corpus, order)?;
    let (pitch, duration, intensity) = train_axes(corpus)?;
    log::debug!(
        "trained order {order} model over {} events: {} initial states, \
         {} joint rows, {} pitch rows, {} duration rows, {} intensity rows",
        corpus.len(),
        initial.len(),
        joint.len(),
        pitch.len(),
        duration.len(),
        intensity.len()
    );
    Ok(Model {
        order,
        events: corpus.iter().copied().sorted().dedup().collect(),
        states,
        initial,
        joint,
        pitch,
        duration,
        intensity,
    })
}

fn train_initial(
    states: &[Vec<Event>],
) -> Result<InitialDistribution<Vec<Event>>> {
    let mut counts = BTreeMap::new();
    for state in states {
        *counts.entry(state.clone()).or_insert(0) += 1;
    }
    InitialDistribution::from_counts(counts)
}

fn train_joint(
    corpus: &[Event],
    order: usize,
) -> Result<TransitionTable<Vec<Event>, Event>> {
    let mut counts = TransitionCounts::new();
    for window in corpus.windows(order + 1) {
        counts.add(window[..order].to_vec(), window[order]);
    }
    counts.normalize()
}

type AxisTables = (
    TransitionTable<PitchOrRest, PitchOrRest>,
    TransitionTable<Length, Length>,
    TransitionTable<u8, u8>,
);

fn train_axes(corpus: &[Event]) -> Result<AxisTables> {
    let mut pitch = TransitionCounts::new();
    let mut duration = TransitionCounts::new();
    let mut intensity = TransitionCounts::new();
    for pair in corpus.windows(2) {
        let (from, to) = (&pair[0], &pair[1]);
        pitch.add(from.pitch, to.pitch);
        duration.add(from.length, to.length);
        intensity.add(from.intensity, to.intensity);
    }
    Ok((pitch.normalize()?, duration.normalize()?, intensity.normalize()?))
}

#[cfg(test)]
mod tests {
    use crate::error::MarkovScoreError;
    use crate::markov::default_training_phrase;
    use crate::primitives::{Event, Length, Pitch, PitchOrRest};

    use super::{train_model, Model};

    fn pitch(name: &str) -> PitchOrRest {
        name.parse().unwrap()
    }

    fn assert_rows_sum_to_one(model: &Model) {
        for (key, row) in model.pitch().rows() {
            let sum: f64 = row.values().sum();
            assert!((sum - 1.0).abs() < 1e-9, "pitch row {key}: {sum}");
        }
        for (_, row) in model.joint().rows() {
            let sum: f64 = row.values().sum();
            assert!((sum - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_default_phrase() {
        let model = train_model(&default_training_phrase(), 1).unwrap();
        assert_rows_sum_to_one(&model);
        // G5 -> G5, G5 -> F5 (from G5 with duration 2), G5 -> A5
        let g5 = pitch("G5");
        assert_eq!(model.pitch().row(&g5).unwrap().len(), 3);
        assert_eq!(model.pitch().probability(&pitch("C5"), &pitch("C5")), 0.5);
        assert_eq!(model.intensity().probability(&64, &64), 1.0);
        assert_eq!(
            model.duration().probability(&Length::from(2.0), &Length::from(1.0)),
            1.0
        );
        assert_eq!(model.states().len(), 14);
        assert_eq!(model.events().len(), 8);
        assert!(model.events().windows(2).all(|w| w[0] < w[1]));
        assert!(model.initial().iter().all(|(k, _)| k.len() == 1));
    }

    #[test]
    fn test_higher_order() {
        let corpus = default_training_phrase();
        let model = train_model(&corpus, 3).unwrap();
        assert_eq!(model.order(), 3);
        assert_eq!(model.states().len(), 12);
        assert!(model.joint().keys().all(|k| k.len() == 3));
        assert_rows_sum_to_one(&model);
        // axis chains are first-order regardless
        assert!(model.pitch().keys().count() <= 6);
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            train_model(&[], 1),
            Err(MarkovScoreError::EmptyCorpus)
        ));
        let corpus = default_training_phrase();
        assert!(matches!(
            train_model(&corpus, 0),
            Err(MarkovScoreError::InvalidOrder(0))
        ));
    }

    #[test]
    fn test_short_corpus() {
        let single = [Event::new(
            PitchOrRest::Pitch(Pitch::from_midi(60, None)),
            Length::from(1.0),
            64,
        )
        .unwrap()];
        let model = train_model(&single, 2).unwrap();
        assert!(model.joint().is_empty());
        assert!(model.pitch().is_empty());
        assert!(model.initial().is_empty());
        assert_eq!(model.events(), &single);
    }

    #[test]
    fn test_model_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Model>();
    }
}
