//! Seams to the outer world: loading material, rendering results, and
//! reporting progress.
//!
//! Nothing here does IO by itself: implementors live in the host
//! application.

use std::path::Path;

use crate::dom::Score;
use crate::error::Result;
use crate::primitives::Event;

/// Source of training material: named voices of events.
///
/// Implementation should fail, if the source has no usable voice.
pub trait SourceLoader {
    fn load(&self, path: &Path) -> Result<Vec<(String, Vec<Event>)>>;
}

/// Converts the finished score into some notation format.
pub trait NotationRenderer {
    type Output;
    fn render(&self, score: &Score) -> Result<Self::Output>;
}

/// Receives human-readable stage messages during generation.
pub trait ProgressSink {
    fn progress(&mut self, message: &str);
}
impl<F: FnMut(&str)> ProgressSink for F {
    fn progress(&mut self, message: &str) {
        self(message)
    }
}

/// Sends progress messages to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;
impl ProgressSink for LogProgress {
    fn progress(&mut self, message: &str) {
        log::info!("{message}");
    }
}
