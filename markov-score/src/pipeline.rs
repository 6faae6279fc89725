//! One generation run: from request (and optional source material) to
//! assembled score.
//!
//! Stages are: training one model per base instrument, generating
//! every voice independently, building the meter schedule, and laying
//! out the voices.

use std::{collections::BTreeMap, path::Path, sync::Arc};

use derivative::Derivative;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::dom::{assemble_score, Score};
use crate::error::{MarkovScoreError, Result};
use crate::external::{NotationRenderer, ProgressSink, SourceLoader};
use crate::instrument::InstrumentLabel;
use crate::markov::{
    default_training_phrase, generate_voice_with_axes, train_model,
    AxisSequences, Model,
};
use crate::primitives::{
    estimate_measure_count, generate_schedule, Event, Grid, Meter,
    MeterSchedule,
};

/// Highest chain order, offered to the user.
pub const MAX_ORDER: usize = 3;

/// Everything the generation depends on.
///
/// Missing fields are taken from defaults, so a config may be as
/// short as `{"instruments": ["Flute"]}`.
///
/// # Example
/// ```
/// # use markov_score::pipeline::GenerationRequest;
/// # use markov_score::primitives::Grid;
/// let request = GenerationRequest::default();
/// assert_eq!(request.order, 1);
/// assert_eq!(request.grid, Grid::Eighth);
/// assert_eq!(request.length, 50);
/// assert_eq!(request.tempo, 120);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Derivative)]
#[derivative(Default)]
#[serde(default)]
pub struct GenerationRequest {
    #[derivative(Default(value = "1"))]
    pub order: usize,
    pub grid: Grid,
    /// Events per voice.
    #[derivative(Default(value = "50"))]
    pub length: usize,
    #[derivative(Default(value = "120"))]
    pub tempo: u32,
    pub base_meter: Meter,
    pub random_meter_changes: bool,
    pub instruments: Vec<InstrumentLabel>,
    /// Base instrument name to source voice name.
    pub voice_mapping: BTreeMap<String, String>,
    /// Without seed, entropy is used.
    pub seed: Option<u64>,
}
impl GenerationRequest {
    pub fn new(instruments: impl IntoIterator<Item = InstrumentLabel>) -> Self {
        Self {
            instruments: instruments.into_iter().collect(),
            ..Default::default()
        }
    }

    /// Check everything, that does not depend on source material.
    ///
    /// Voice mapping may only name selected base instruments; whether the
    /// mapped source voices exist is known only after loading.
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_ORDER).contains(&self.order) {
            return Err(MarkovScoreError::InvalidOrder(self.order));
        }
        if self.tempo == 0 {
            return Err(MarkovScoreError::InvalidTempo(self.tempo));
        }
        if self.instruments.is_empty() {
            return Err(MarkovScoreError::EmptyInstrumentSelection);
        }
        if let Some(label) = self.instruments.iter().find(|l| l.kind().is_none())
        {
            return Err(MarkovScoreError::UnknownInstrument(
                label.base_name().to_string(),
            ));
        }
        let bases = self.base_instruments();
        if let Some(name) = self
            .voice_mapping
            .keys()
            .find(|name| !bases.contains(&name.as_str()))
        {
            return Err(MarkovScoreError::UnknownVoiceMapping {
                instrument: name.clone(),
            });
        }
        Ok(())
    }

    /// Base instrument names in order of first appearance.
    pub fn base_instruments(&self) -> Vec<&str> {
        let mut bases: Vec<&str> = Vec::new();
        for label in self.instruments.iter() {
            if !bases.contains(&label.base_name()) {
                bases.push(label.base_name());
            }
        }
        bases
    }

    /// Source voice, the base instrument is trained on.
    pub fn source_voice<'c>(
        &self,
        base: &str,
        corpus: &'c [(String, Vec<Event>)],
    ) -> Result<&'c [Event]> {
        let unknown = || MarkovScoreError::UnknownVoiceMapping {
            instrument: base.to_string(),
        };
        let voice = self.voice_mapping.get(base).ok_or_else(unknown)?;
        corpus
            .iter()
            .find(|(name, _)| name == voice)
            .map(|(_, events)| events.as_slice())
            .ok_or_else(unknown)
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub score: Score,
    pub schedule: Arc<MeterSchedule>,
    /// Raw axis output of every voice, in the order of instruments.
    pub sequences: Vec<(InstrumentLabel, AxisSequences)>,
    /// Trained models by base instrument name.
    pub models: BTreeMap<String, Arc<Model>>,
}
impl GenerationResult {
    pub fn render<R: NotationRenderer>(
        &self,
        renderer: &R,
    ) -> Result<R::Output> {
        renderer.render(&self.score)
    }
}

/// Run the whole generation with random source, made from request.
///
/// Without `corpus` every instrument is trained on
/// [default_training_phrase].
pub fn generate(
    request: &GenerationRequest,
    corpus: Option<&[(String, Vec<Event>)]>,
    progress: &mut impl ProgressSink,
) -> Result<GenerationResult> {
    let mut rng = request.rng();
    generate_with_rng(request, corpus, progress, &mut rng)
}

/// Load the corpus by `loader`, then [generate].
pub fn generate_from_source(
    request: &GenerationRequest,
    loader: &impl SourceLoader,
    path: &Path,
    progress: &mut impl ProgressSink,
) -> Result<GenerationResult> {
    request.validate()?;
    progress.progress(&format!("Loading {}", path.display()));
    let corpus = loader.load(path)?;
    if corpus.iter().all(|(_, events)| events.is_empty()) {
        return Err(MarkovScoreError::EmptyCorpus);
    }
    log::info!(
        "loaded {} source voices from {}",
        corpus.len(),
        path.display()
    );
    generate(request, Some(corpus.as_slice()), progress)
}

pub fn generate_with_rng<R: Rng + ?Sized>(
    request: &GenerationRequest,
    corpus: Option<&[(String, Vec<Event>)]>,
    progress: &mut impl ProgressSink,
    rng: &mut R,
) -> Result<GenerationResult> {
    request.validate()?;

    let mut models = BTreeMap::new();
    for base in request.base_instruments() {
        let events = match corpus {
            None => default_training_phrase(),
            Some(corpus) => request.source_voice(base, corpus)?.to_vec(),
        };
        let events: Vec<Event> = events
            .into_iter()
            .map(|ev| ev.with_length(request.grid.quantize(ev.length)))
            .collect();
        progress.progress(&format!("Training {base}"));
        let model = train_model(&events, request.order)?;
        models.insert(base.to_string(), Arc::new(model));
    }
    log::info!("trained {} models", models.len());

    let mut per_voice = Vec::with_capacity(request.instruments.len());
    let mut sequences = Vec::with_capacity(request.instruments.len());
    for label in request.instruments.iter() {
        progress.progress(&format!("Generating {label}"));
        let model = models.get(label.base_name()).ok_or_else(|| {
            MarkovScoreError::UnknownVoiceMapping {
                instrument: label.to_string(),
            }
        })?;
        let (events, axes) =
            generate_voice_with_axes(model, request.length, rng)?;
        per_voice.push(events);
        sequences.push((label.clone(), axes));
    }
    log::info!(
        "generated {} voices of {} events",
        per_voice.len(),
        request.length
    );

    let schedule = Arc::new(generate_schedule(
        request.base_meter,
        estimate_measure_count(request.length),
        request.random_meter_changes,
        rng,
    ));
    progress.progress("Assembling score");
    let score = assemble_score(
        per_voice,
        &request.instruments,
        request.tempo,
        schedule.clone(),
    )?;
    log::info!(
        "assembled {} voices, {} measures",
        score.voices.len(),
        score.measure_count()
    );
    progress.progress("Done");
    Ok(GenerationResult {
        score,
        schedule,
        sequences,
        models,
    })
}

#[cfg(test)]
mod tests {
    use crate::error::MarkovScoreError;
    use crate::instrument::{string_quartet, InstrumentKind, InstrumentLabel};

    use super::{generate, GenerationRequest};

    #[test]
    fn test_validate() {
        let mut request = GenerationRequest::new(string_quartet());
        assert!(request.validate().is_ok());
        request.order = 4;
        assert!(matches!(
            request.validate(),
            Err(MarkovScoreError::InvalidOrder(4))
        ));
        request.order = 2;
        request.tempo = 0;
        assert!(matches!(
            request.validate(),
            Err(MarkovScoreError::InvalidTempo(0))
        ));
        request.tempo = 60;
        request.instruments.push("Kazoo".parse().unwrap());
        assert!(matches!(
            request.validate(),
            Err(MarkovScoreError::UnknownInstrument(_))
        ));
        assert!(matches!(
            GenerationRequest::default().validate(),
            Err(MarkovScoreError::EmptyInstrumentSelection)
        ));
    }

    #[test]
    fn test_validate_voice_mapping_keys() {
        let mut request = GenerationRequest::new([
            InstrumentLabel::doubled(InstrumentKind::Horn, 1),
            InstrumentLabel::doubled(InstrumentKind::Horn, 2),
        ]);
        request
            .voice_mapping
            .insert("Horn".to_string(), "melody".to_string());
        assert!(request.validate().is_ok());
        request
            .voice_mapping
            .insert("Tuba".to_string(), "bass".to_string());
        assert!(matches!(
            request.validate(),
            Err(MarkovScoreError::UnknownVoiceMapping { ref instrument })
                if instrument == "Tuba"
        ));
        // doubling labels are not base names
        request.voice_mapping.remove("Tuba");
        request
            .voice_mapping
            .insert("Horn #1".to_string(), "melody".to_string());
        assert!(matches!(
            request.validate(),
            Err(MarkovScoreError::UnknownVoiceMapping { ref instrument })
                if instrument == "Horn #1"
        ));
    }

    #[test]
    fn test_doublings_share_model() {
        let request = GenerationRequest {
            seed: Some(17),
            length: 12,
            ..GenerationRequest::new([
                InstrumentLabel::doubled(InstrumentKind::Horn, 1),
                InstrumentLabel::doubled(InstrumentKind::Horn, 2),
                InstrumentLabel::new(InstrumentKind::Tuba),
            ])
        };
        assert_eq!(request.base_instruments(), vec!["Horn", "Tuba"]);
        let result = generate(&request, None, &mut |_: &str| ()).unwrap();
        assert_eq!(result.models.len(), 2);
        assert_eq!(result.score.voices.len(), 3);
        assert_eq!(result.sequences.len(), 3);
        assert!(result
            .sequences
            .iter()
            .all(|(_, axes)| axes.pitch.len() == 12));
    }
}
