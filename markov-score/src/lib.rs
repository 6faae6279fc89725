//! Markov-chain music generation with measure layout.
//!
//! A short corpus of [primitives::Event] is learned by
//! [markov::train_model], new voices are sampled from the model by
//! [markov::generate_voice], and [dom::assemble_score] packs them into
//! measures over a shared [primitives::MeterSchedule].
//!
//! [pipeline::generate] runs all the stages from one
//! [pipeline::GenerationRequest].

pub mod dom;
pub mod error;
pub mod external;
pub mod instrument;
pub mod markov;
pub mod pipeline;
pub mod primitives;

pub use dom::{assemble_score, Score, Voice};
pub use error::{ErrorKind, MarkovScoreError, Result};
pub use markov::{generate_voice, train_model, Model};
pub use pipeline::{generate, GenerationRequest, GenerationResult};
