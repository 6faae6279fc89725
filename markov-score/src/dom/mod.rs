//! Assembled score: voices of measures, sharing one meter schedule.

pub mod layout;

use std::sync::Arc;

use crate::instrument::InstrumentLabel;
use crate::primitives::{EventInfo, Length, Measure, Meter, MeterSchedule};

pub use layout::{
    assemble_score, assemble_voice, AssemblerState, LayoutAssembler,
};

#[derive(Debug, PartialEq, Clone)]
pub struct Voice {
    pub label: InstrumentLabel,
    pub time_map: Arc<MeterSchedule>,
    pub measures: Vec<Measure>,
}
impl Voice {
    pub fn new(
        label: InstrumentLabel,
        time_map: Arc<MeterSchedule>,
        measures: Vec<Measure>,
    ) -> Self {
        Self {
            label,
            time_map,
            measures,
        }
    }
    /// Placed events (and fragments), in order.
    pub fn events(&self) -> impl Iterator<Item = &EventInfo> {
        self.measures.iter().flat_map(|m| m.events())
    }
    pub fn length(&self) -> Length {
        self.measures.iter().map(|m| m.filled()).sum()
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct Score {
    /// Beats per minute.
    pub tempo: u32,
    pub base_meter: Meter,
    pub voices: Vec<Voice>,
}
impl Score {
    pub fn voice(&self, label: &InstrumentLabel) -> Option<&Voice> {
        self.voices.iter().find(|v| &v.label == label)
    }
    /// Number of measures in the longest voice.
    pub fn measure_count(&self) -> usize {
        self.voices
            .iter()
            .map(|v| v.measures.len())
            .max()
            .unwrap_or(0)
    }
    /// Duration in seconds of the longest voice.
    pub fn duration_seconds(&self) -> f64 {
        let beats = self
            .voices
            .iter()
            .map(|v| v.length())
            .max()
            .unwrap_or_else(Length::zero);
        beats.as_beats() * 60.0 / self.tempo as f64
    }
}
