//! Elements, from which the score is constructed.
//!
//! At first, events are generated by the Markov chains.
//! Then MeterSchedule is created for the whole score.
//! Then every Voice is filled by events, measure by measure.
//! Then multiple voices organized in Score.

pub mod event;
pub mod fraction_tools;
pub mod length;
pub mod measure;
pub mod meter;
pub mod pitch;
pub mod position;
pub mod time_map;

pub use event::{
    Articulation, Dynamic, Event, EventInfo, MeasureItem, Tie,
    NEUTRAL_INTENSITY,
};
pub use fraction_tools::{max_quantized, min_quantized, quantize, Grid};
pub use length::Length;
pub use measure::Measure;
pub use meter::Meter;
pub use pitch::{
    normalize_range, Accidental, NoteName, Pitch, PitchOrRest, PitchRange,
};
pub use position::RelativePosition;
pub use time_map::{
    estimate_measure_count, generate_schedule, MeterSchedule,
    CANDIDATE_METERS, METER_CHANGE_PROBABILITY,
};
