//! Main "ruler" of the score: which meter every measure has.
use std::collections::BTreeMap;

use rand::{seq::IndexedRandom, Rng};

use super::{Length, Meter};

/// Chance of random meter change at every measure after the first.
pub const METER_CHANGE_PROBABILITY: f64 = 0.15;

/// Meters, random schedule chooses from.
pub const CANDIDATE_METERS: [Meter; 6] = [
    Meter {
        numerator: 4,
        denominator: 4,
    },
    Meter {
        numerator: 3,
        denominator: 4,
    },
    Meter {
        numerator: 2,
        denominator: 4,
    },
    Meter {
        numerator: 3,
        denominator: 8,
    },
    Meter {
        numerator: 6,
        denominator: 8,
    },
    Meter {
        numerator: 12,
        denominator: 8,
    },
];

/// Sparse map of measure number (1-based) to meter.
///
/// Measure without explicit entry inherits the nearest earlier one.
/// Built once per score and shared by all voices, so all of them
/// change meter at the same measure.
///
/// # Example
/// ```
/// # use markov_score::primitives::{MeterSchedule, Meter};
/// let mut schedule = MeterSchedule::new(Meter::default());
/// schedule.insert(5, "3/4".parse().unwrap());
/// assert_eq!(schedule.meter_at(4), Meter::default());
/// assert_eq!(schedule.meter_at(7), "3/4".parse().unwrap());
/// assert_eq!(schedule.explicit(5), Some(&"3/4".parse().unwrap()));
/// assert_eq!(schedule.explicit(6), None);
/// ```
#[derive(Debug, PartialEq, Clone)]
pub struct MeterSchedule {
    entries: BTreeMap<u32, Meter>,
}
impl MeterSchedule {
    pub fn new(base: Meter) -> Self {
        Self {
            entries: BTreeMap::from([(1, base)]),
        }
    }
    /// Measure 1 always has an entry: inserting 0 moves to 1.
    pub fn insert(&mut self, measure_index: u32, meter: Meter) -> &mut Self {
        self.entries.insert(measure_index.max(1), meter);
        self
    }
    pub fn base(&self) -> Meter {
        self.meter_at(1)
    }
    /// Entry, explicitly set for the measure.
    pub fn explicit(&self, measure_index: u32) -> Option<&Meter> {
        self.entries.get(&measure_index)
    }
    /// Meter, active in the measure.
    pub fn meter_at(&self, measure_index: u32) -> Meter {
        self.entries
            .range(..=measure_index.max(1))
            .next_back()
            .map(|(_, meter)| *meter)
            .unwrap_or_default()
    }
    pub fn entries(&self) -> &BTreeMap<u32, Meter> {
        &self.entries
    }
    /// Total length of measures `1..=count`.
    pub fn length_of_measures(&self, count: u32) -> Length {
        (1..=count).map(|idx| self.meter_at(idx).capacity()).sum()
    }
}
impl FromIterator<(u32, Meter)> for MeterSchedule {
    /// Without entry for the first measure, 4/4 is taken.
    fn from_iter<T: IntoIterator<Item = (u32, Meter)>>(iter: T) -> Self {
        let mut schedule = Self::new(Meter::default());
        for (idx, meter) in iter {
            schedule.insert(idx, meter);
        }
        schedule
    }
}

/// Build the schedule for the whole score.
///
/// Without `random_changes` it is just `{1: base}`. Otherwise, every
/// measure from the second one, with [METER_CHANGE_PROBABILITY], gets a
/// meter from [CANDIDATE_METERS], different from the previously chosen.
pub fn generate_schedule<R: Rng + ?Sized>(
    base: Meter,
    estimated_measures: u32,
    random_changes: bool,
    rng: &mut R,
) -> MeterSchedule {
    let mut schedule = MeterSchedule::new(base);
    if !random_changes {
        return schedule;
    }
    let mut current = base;
    for measure_index in 2..=estimated_measures {
        if !rng.random_bool(METER_CHANGE_PROBABILITY) {
            continue;
        }
        let others: Vec<Meter> = CANDIDATE_METERS
            .iter()
            .filter(|m| **m != current)
            .copied()
            .collect();
        if let Some(meter) = others.choose(rng) {
            current = *meter;
            schedule.insert(measure_index, current);
        }
    }
    log::debug!(
        "meter schedule: {}",
        schedule
            .entries()
            .iter()
            .map(|(idx, m)| format!("m.{idx}:{m}"))
            .collect::<Vec<_>>()
            .join(", ")
    );
    schedule
}

/// Rough number of measures a sequence of `length` events takes.
///
/// Assumes 0.75 beats per event and 3.5 beats per measure, with
/// 10 measures of margin.
pub fn estimate_measure_count(length: usize) -> u32 {
    (length as f64 * 0.75 / 3.5) as u32 + 10
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use crate::primitives::{Length, Meter};

    use super::{estimate_measure_count, generate_schedule, MeterSchedule};

    #[test]
    fn test_inheritance() {
        let schedule = MeterSchedule::from_iter([
            (1, "4/4".parse().unwrap()),
            (5, "3/4".parse().unwrap()),
        ]);
        for idx in 1..=4 {
            assert_eq!(schedule.meter_at(idx).capacity(), Length::from(4.0));
        }
        for idx in 5..=8 {
            assert_eq!(schedule.meter_at(idx).capacity(), Length::from(3.0));
        }
        assert_eq!(schedule.length_of_measures(8), Length::from(28.0));
    }

    #[test]
    fn test_disabled() {
        let mut rng = StdRng::seed_from_u64(1);
        let base: Meter = "6/8".parse().unwrap();
        let schedule = generate_schedule(base, 100, false, &mut rng);
        assert_eq!(schedule.entries().len(), 1);
        assert_eq!(schedule.explicit(1), Some(&base));
    }

    #[test]
    fn test_random_never_repeats() {
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let base = Meter::default();
            let schedule = generate_schedule(base, 200, true, &mut rng);
            assert_eq!(schedule.explicit(1), Some(&base));
            let meters: Vec<_> = schedule.entries().values().collect();
            for pair in meters.windows(2) {
                assert_ne!(pair[0], pair[1]);
            }
            assert!(schedule.entries().keys().all(|idx| *idx <= 200));
        }
        // 199 trials with p = 0.15: some change is practically certain.
        let mut rng = StdRng::seed_from_u64(7);
        let schedule = generate_schedule(Meter::default(), 200, true, &mut rng);
        assert!(schedule.entries().len() > 1);
    }

    #[test]
    fn test_estimate() {
        assert_eq!(estimate_measure_count(0), 10);
        assert_eq!(estimate_measure_count(50), 20);
    }
}
