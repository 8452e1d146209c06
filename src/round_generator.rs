use std::ops::RangeInclusive;

use rand::Rng;
use tracing::debug;

use crate::{
    catalog::{Catalog, IntervalDef},
    util::freq_from_midi,
};

pub const SLIDER_RANGE_CENTS: f64 = 150.0;
pub const MAX_DETUNE_CENTS: f64 = 75.0;

/// Parameters for drawing rounds
#[derive(Debug, Clone, PartialEq)]
pub struct RoundGenConfig {
    /// Anchor note range, inclusive MIDI numbers.
    pub midi_range: RangeInclusive<u8>,
    /// Where the zero-error slider position may land. Kept off the edges.
    pub correct_position_range: RangeInclusive<f64>,
    pub max_detune_cents: f64,
    pub slider_range_cents: f64,
}

impl Default for RoundGenConfig {
    fn default() -> Self {
        Self {
            midi_range: 45..=64,
            correct_position_range: 0.15..=0.85,
            max_detune_cents: MAX_DETUNE_CENTS,
            slider_range_cents: SLIDER_RANGE_CENTS,
        }
    }
}

/// One exam task. Immutable once generated.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundConfig {
    pub index: usize,
    pub base_freq_hz: f64,
    pub interval: IntervalDef,
    /// True when the user moves the upper note, false for the lower one.
    pub tune_upper: bool,
    pub slider_correct_position: f64,
    pub slider_range_cents: f64,
    pub initial_detune_cents: f64,
    pub initial_slider_value: f64,
}

/// Builds the ordered round list for a session
#[derive(Debug, Clone, Default)]
pub struct RoundGenerator {
    config: RoundGenConfig,
}

impl RoundGenerator {
    pub fn new(config: RoundGenConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RoundGenConfig {
        &self.config
    }

    /// Draw `count` rounds from the intervals in `selected_ids`. An empty
    /// pool (nothing selected, or nothing matching) falls back to the whole
    /// catalog. Two consecutive rounds never share an interval unless the
    /// pool holds a single entry.
    pub fn generate<R: Rng>(
        &self,
        catalog: &Catalog,
        count: usize,
        selected_ids: &[u32],
        rng: &mut R,
    ) -> Vec<RoundConfig> {
        let filtered = catalog.filter_ids(selected_ids);
        let fallback = filtered.is_empty();
        let pool: Vec<&IntervalDef> = if fallback {
            catalog.all().iter().collect()
        } else {
            filtered
        };

        if pool.is_empty() {
            return Vec::new();
        }

        debug!(
            pool = pool.len(),
            count,
            fallback,
            "generating rounds"
        );

        let mut rounds = Vec::with_capacity(count);
        let mut previous: Option<u32> = None;

        for index in 0..count {
            let interval = self.draw_interval(&pool, previous, rng);
            previous = Some(interval.id);
            rounds.push(self.build_round(index, interval.clone(), rng));
        }

        rounds
    }

    fn draw_interval<'a, R: Rng>(
        &self,
        pool: &[&'a IntervalDef],
        previous: Option<u32>,
        rng: &mut R,
    ) -> &'a IntervalDef {
        loop {
            let candidate = pool[rng.gen_range(0..pool.len())];
            if pool.len() == 1 || Some(candidate.id) != previous {
                return candidate;
            }
        }
    }

    fn build_round<R: Rng>(
        &self,
        index: usize,
        interval: IntervalDef,
        rng: &mut R,
    ) -> RoundConfig {
        let midi = rng.gen_range(self.config.midi_range.clone());
        let tune_upper = rng.gen_bool(0.5);
        let slider_correct_position = rng.gen_range(self.config.correct_position_range.clone());
        let d = self.config.max_detune_cents;
        let initial_detune_cents = rng.gen_range(-d..=d);

        RoundConfig {
            index,
            base_freq_hz: freq_from_midi(midi),
            interval,
            tune_upper,
            slider_correct_position,
            slider_range_cents: self.config.slider_range_cents,
            initial_detune_cents,
            initial_slider_value: initial_slider_value(
                slider_correct_position,
                initial_detune_cents,
                self.config.slider_range_cents,
            ),
        }
    }
}

/// Starting slider position, offset from the correct one by the detune and
/// clamped to the slider's range.
pub fn initial_slider_value(correct_position: f64, detune_cents: f64, range_cents: f64) -> f64 {
    (correct_position + detune_cents / range_cents).clamp(0.0, 1.0)
}
