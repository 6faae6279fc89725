use itertools::izip;
use rand::{seq::IndexedRandom, Rng};

use crate::error::{MarkovScoreError, Result};
use crate::primitives::{Event, Length, PitchOrRest};

use super::table::TransitionTable;
use super::trainer::Model;

/// Raw per-axis output of a voice, before zipping into events.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AxisSequences {
    pub pitch: Vec<PitchOrRest>,
    pub duration: Vec<Length>,
    pub intensity: Vec<u8>,
}

/// Walk the chain for `length` steps.
///
/// First symbol is a uniform pick among the table keys. Every next one
/// is drawn from the row of the current symbol. Symbol without row
/// (seen only at the very end of the corpus) is replaced by a new
/// uniform pick.
///
/// # Errors
/// [MarkovScoreError::EmptyTable] if table is empty, even for zero length.
pub fn generate_axis_sequence<K, R>(
    table: &TransitionTable<K, K>,
    length: usize,
    rng: &mut R,
) -> Result<Vec<K>>
where
    K: Ord + Clone,
    R: Rng + ?Sized,
{
    let Some(first) = table.random_key(rng).cloned() else {
        return Err(MarkovScoreError::EmptyTable("axis table"));
    };
    let mut sequence = Vec::with_capacity(length);
    sequence.push(first);
    while sequence.len() < length {
        let current = &sequence[sequence.len() - 1];
        let next = match table.sample_next(current, rng) {
            Some(next) => next,
            None => table
                .random_key(rng)
                .cloned()
                .ok_or(MarkovScoreError::EmptyTable("axis table"))?,
        };
        sequence.push(next);
    }
    sequence.truncate(length);
    Ok(sequence)
}

/// Generate independent pitch, duration and intensity sequences.
pub fn generate_axes<R: Rng + ?Sized>(
    model: &Model,
    length: usize,
    rng: &mut R,
) -> Result<AxisSequences> {
    let pitch = generate_axis_sequence(model.pitch(), length, rng)
        .map_err(|_| MarkovScoreError::EmptyTable("pitch"))?;
    let duration = generate_axis_sequence(model.duration(), length, rng)
        .map_err(|_| MarkovScoreError::EmptyTable("duration"))?;
    let intensity = generate_axis_sequence(model.intensity(), length, rng)
        .map_err(|_| MarkovScoreError::EmptyTable("intensity"))?;
    Ok(AxisSequences {
        pitch,
        duration,
        intensity,
    })
}

/// Same as [generate_voice], but keeps the raw axes as well.
pub fn generate_voice_with_axes<R: Rng + ?Sized>(
    model: &Model,
    length: usize,
    rng: &mut R,
) -> Result<(Vec<Event>, AxisSequences)> {
    let axes = generate_axes(model, length, rng)?;
    let events = izip!(&axes.pitch, &axes.duration, &axes.intensity)
        .map(|(pitch, duration, intensity)| {
            Event::new(*pitch, *duration, *intensity)
        })
        .collect::<Result<Vec<_>>>()?;
    Ok((events, axes))
}

/// Generate `length` events for one voice.
///
/// Axes are sampled independently, then zipped: dynamic follows
/// intensity, articulation is always normal.
pub fn generate_voice<R: Rng + ?Sized>(
    model: &Model,
    length: usize,
    rng: &mut R,
) -> Result<Vec<Event>> {
    Ok(generate_voice_with_axes(model, length, rng)?.0)
}

/// Sample whole events from the order-k joint chain.
///
/// Starts from a k-gram drawn from the initial distribution. When the
/// last k events have no row, the next event is a uniform pick among
/// the distinct corpus events.
pub fn generate_joint<R: Rng + ?Sized>(
    model: &Model,
    length: usize,
    rng: &mut R,
) -> Result<Vec<Event>> {
    if model.joint().is_empty() {
        return Err(MarkovScoreError::EmptyTable("joint"));
    }
    let order = model.order();
    let mut sequence = model
        .initial()
        .sample(rng)
        .ok_or(MarkovScoreError::EmptyTable("initial distribution"))?;
    while sequence.len() < length {
        let window = sequence[sequence.len() - order..].to_vec();
        let next = match model.joint().sample_next(&window, rng) {
            Some(next) => next,
            None => model
                .events()
                .choose(rng)
                .copied()
                .ok_or(MarkovScoreError::EmptyTable("corpus events"))?,
        };
        sequence.push(next);
    }
    sequence.truncate(length);
    Ok(sequence)
}
