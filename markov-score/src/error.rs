/// Coarse classification of [MarkovScoreError].
///
/// Validation errors are caused by the caller input, data integrity
/// errors signal a bug in the trainer, layout invariant errors mean
/// that an event could not be placed into a measure.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ErrorKind {
    Validation,
    DataIntegrity,
    LayoutInvariant,
}

#[derive(Debug, thiserror::Error)]
pub enum MarkovScoreError {
    #[error("Training corpus is empty")]
    EmptyCorpus,
    #[error("No instrument selected")]
    EmptyInstrumentSelection,
    #[error("Can not sample from an empty transition table: {0}")]
    EmptyTable(&'static str),
    #[error("Chain order should be in 1..=3 (trainer accepts >= 1), got: {0}")]
    InvalidOrder(usize),
    #[error("Tempo should be positive, got: {0}")]
    InvalidTempo(u32),
    #[error("Intensity should be in 0..=127, got: {0}")]
    InvalidIntensity(u32),
    #[error("Unknown instrument: `{0}`")]
    UnknownInstrument(String),
    #[error("Instrument `{instrument}` is not mapped to a known source voice")]
    UnknownVoiceMapping { instrument: String },
    #[error("Got {events} event lists for {labels} instruments")]
    VoiceCountMismatch { events: usize, labels: usize },
    #[error("Can not parse `{input}`: {reason}")]
    Parse { input: String, reason: String },
    #[error("Transition row `{row}` is broken: {reason}")]
    DataIntegrity { row: String, reason: String },
    #[error("Can not place event into measure {measure}: {reason}")]
    LayoutInvariant { measure: u32, reason: String },
}
impl MarkovScoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DataIntegrity { .. } => ErrorKind::DataIntegrity,
            Self::LayoutInvariant { .. } => ErrorKind::LayoutInvariant,
            _ => ErrorKind::Validation,
        }
    }
    pub(crate) fn parse(
        input: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Parse {
            input: input.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MarkovScoreError>;

#[cfg(test)]
mod tests {
    use super::{ErrorKind, MarkovScoreError};

    #[test]
    fn test_kind() {
        assert_eq!(MarkovScoreError::EmptyCorpus.kind(), ErrorKind::Validation);
        assert_eq!(
            MarkovScoreError::EmptyTable("pitch").kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            MarkovScoreError::DataIntegrity {
                row: "C4".to_string(),
                reason: "sum is 0".to_string()
            }
            .kind(),
            ErrorKind::DataIntegrity
        );
        assert_eq!(
            MarkovScoreError::LayoutInvariant {
                measure: 3,
                reason: "negative length".to_string()
            }
            .kind(),
            ErrorKind::LayoutInvariant
        );
    }
}
