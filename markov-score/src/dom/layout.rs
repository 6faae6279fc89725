//! Packing a flat event sequence into measures.
//!
//! [LayoutAssembler] walks the events of one voice and places them
//! into measures left to right. Event that does not fit into the rest
//! of measure is split: the fitting part stays, the remainder goes to
//! the next measure, tied if it is a note. Meters are taken from the
//! shared [MeterSchedule], so all voices change meter together.

use std::sync::Arc;

use crate::error::{MarkovScoreError, Result};
use crate::instrument::InstrumentLabel;
use crate::primitives::{
    normalize_range, Dynamic, Event, Measure, MeterSchedule, Tie,
};

use super::{Score, Voice};

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum AssemblerState {
    /// There is an open measure with free space.
    FillingMeasure,
    /// Last measure is closed, next one is opened by the next event.
    MeasureFull,
    /// Terminal.
    SequenceExhausted,
}

/// State machine, laying out events of one voice.
///
/// Invariant: the open measure never holds more than its capacity,
/// and is closed exactly when it is filled up.
///
/// # Example
/// ```
/// # use markov_score::dom::LayoutAssembler;
/// # use markov_score::primitives::{Event, Length, MeterSchedule, Meter, Tie};
/// let schedule = MeterSchedule::new(Meter::default());
/// let mut assembler = LayoutAssembler::new(&schedule);
/// let note = Event::new("C4".parse().unwrap(), Length::from(3.0), 64).unwrap();
/// assembler.push(note).unwrap();
/// assembler.push(note).unwrap();
/// let measures = assembler.finish().unwrap();
/// assert_eq!(measures.len(), 2);
/// let ties: Vec<Tie> = measures
///     .iter()
///     .flat_map(|m| m.events())
///     .map(|ev| ev.tie)
///     .collect();
/// // the second note is split, and the second measure padded by rest
/// assert_eq!(ties, vec![Tie::None, Tie::Start, Tie::Stop, Tie::None]);
/// ```
#[derive(Debug)]
pub struct LayoutAssembler<'a> {
    schedule: &'a MeterSchedule,
    state: AssemblerState,
    measures: Vec<Measure>,
    open: Option<Measure>,
    last_dynamic: Option<Dynamic>,
}
impl<'a> LayoutAssembler<'a> {
    pub fn new(schedule: &'a MeterSchedule) -> Self {
        Self {
            schedule,
            state: AssemblerState::MeasureFull,
            measures: Vec::new(),
            open: None,
            last_dynamic: None,
        }
    }

    pub fn state(&self) -> AssemblerState {
        self.state
    }

    /// Index of the measure, the next event goes to.
    pub fn measure_index(&self) -> u32 {
        match &self.open {
            Some(measure) => measure.index(),
            None => self.measures.len() as u32 + 1,
        }
    }

    /// Closed measures so far.
    pub fn measures(&self) -> &Vec<Measure> {
        &self.measures
    }

    /// Place the event, splitting it over as many measures as needed.
    ///
    /// # Errors
    /// [MarkovScoreError::LayoutInvariant] if event has no positive
    /// length.
    pub fn push(&mut self, event: Event) -> Result<()> {
        if !event.length.is_valid_duration() {
            return Err(MarkovScoreError::LayoutInvariant {
                measure: self.measure_index(),
                reason: format!("invalid event duration: {}", event.length),
            });
        }
        if !event.is_rest() && self.last_dynamic != Some(event.dynamic) {
            self.open_measure()?.push_dynamic(event.dynamic);
            self.last_dynamic = Some(event.dynamic);
        }
        let mut left = event.length;
        let mut tied = false;
        loop {
            let measure = self.open_measure()?;
            let remaining = measure.remaining();
            if remaining.is_zero() {
                return Err(MarkovScoreError::LayoutInvariant {
                    measure: measure.index(),
                    reason: "open measure has no free space".to_string(),
                });
            }
            if left <= remaining {
                let tie = if event.is_rest() {
                    Tie::None
                } else {
                    Tie::for_fragment(tied, false)
                };
                return self.place(event.with_length(left), tie);
            }
            log::trace!(
                "splitting {event} at measure {}: {remaining} of {left} fits",
                measure.index()
            );
            let tie = if event.is_rest() {
                Tie::None
            } else {
                Tie::for_fragment(tied, true)
            };
            self.place(event.with_length(remaining), tie)?;
            left = left.checked_sub(remaining).ok_or_else(|| {
                MarkovScoreError::LayoutInvariant {
                    measure: self.measure_index(),
                    reason: "negative remainder".to_string(),
                }
            })?;
            tied = !event.is_rest();
        }
    }

    /// Pad the last measure with rest, or drop it if it has no events.
    pub fn finish(mut self) -> Result<Vec<Measure>> {
        if let Some(mut measure) = self.open.take() {
            if measure.is_empty() {
                log::trace!("dropping empty measure {}", measure.index());
            } else {
                if let Some(pad) = measure.pad_with_rest()? {
                    log::trace!(
                        "padded measure {} with rest of {pad}",
                        measure.index()
                    );
                }
                self.measures.push(measure);
            }
        }
        self.state = AssemblerState::SequenceExhausted;
        Ok(self.measures)
    }

    fn place(&mut self, event: Event, tie: Tie) -> Result<()> {
        let measure = self.open_measure()?;
        measure.place(event, tie)?;
        if measure.is_full() {
            if let Some(measure) = self.open.take() {
                self.measures.push(measure);
            }
            self.state = AssemblerState::MeasureFull;
        }
        Ok(())
    }

    /// Get the open measure, or open the next one.
    ///
    /// Meter of the new measure is the one of the previous, unless
    /// schedule has an entry for it.
    fn open_measure(&mut self) -> Result<&mut Measure> {
        if self.open.is_none() {
            let index = self.measures.len() as u32 + 1;
            let measure = match self.measures.last() {
                None => Measure::new(index, self.schedule.meter_at(index)),
                Some(previous) => {
                    let previous = *previous.meter();
                    let mut measure = Measure::new(index, previous);
                    match self.schedule.explicit(index) {
                        Some(meter) if *meter != previous => {
                            log::debug!(
                                "meter switches to {meter} at measure {index}"
                            );
                            measure.set_meter(*meter)?;
                        }
                        _ => (),
                    }
                    measure
                }
            };
            self.open = Some(measure);
            self.state = AssemblerState::FillingMeasure;
        }
        self.open
            .as_mut()
            .ok_or_else(|| MarkovScoreError::LayoutInvariant {
                measure: self.measures.len() as u32 + 1,
                reason: "can not open measure".to_string(),
            })
    }
}

/// Lay out the events of one voice.
pub fn assemble_voice(
    label: InstrumentLabel,
    events: impl IntoIterator<Item = Event>,
    schedule: Arc<MeterSchedule>,
) -> Result<Voice> {
    let mut assembler = LayoutAssembler::new(&schedule);
    for event in events {
        assembler.push(event)?;
    }
    let measures = assembler.finish()?;
    log::debug!("{label}: {} measures", measures.len());
    Ok(Voice::new(label, schedule, measures))
}

/// Build the score: fold every voice into its instrument range, then
/// lay it out over the shared schedule.
///
/// # Errors
/// - [MarkovScoreError::InvalidTempo] for zero tempo.
/// - [MarkovScoreError::EmptyInstrumentSelection] without labels.
/// - [MarkovScoreError::VoiceCountMismatch] if the number of event
///   lists and labels differ.
/// - [MarkovScoreError::LayoutInvariant] if any event can not be placed.
pub fn assemble_score(
    per_voice: Vec<Vec<Event>>,
    labels: &[InstrumentLabel],
    tempo: u32,
    schedule: impl Into<Arc<MeterSchedule>>,
) -> Result<Score> {
    if tempo == 0 {
        return Err(MarkovScoreError::InvalidTempo(tempo));
    }
    if labels.is_empty() {
        return Err(MarkovScoreError::EmptyInstrumentSelection);
    }
    if per_voice.len() != labels.len() {
        return Err(MarkovScoreError::VoiceCountMismatch {
            events: per_voice.len(),
            labels: labels.len(),
        });
    }
    let schedule = schedule.into();
    let voices = per_voice
        .into_iter()
        .zip(labels)
        .map(|(events, label)| {
            let range = label.range();
            let events = events.into_iter().map(|ev| {
                ev.with_pitch(normalize_range(ev.pitch, range.low, range.high))
            });
            assemble_voice(label.clone(), events, schedule.clone())
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Score {
        tempo,
        base_meter: schedule.base(),
        voices,
    })
}
