use crate::{
    round_generator::RoundConfig,
    util::{cents_to_ratio, ratio_to_cents},
};

/// Width of the window revealed by a hint, centered on the correct position.
pub const HINT_WINDOW_CENTS: f64 = 30.0;

/// Errors at or under this many cents read as locked in.
const TIGHT_CENTS: f64 = 2.0;

/// Frequencies for the audio collaborator plus the derived error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TuningState {
    /// Lower note.
    pub f1_hz: f64,
    /// Upper note.
    pub f2_hz: f64,
    /// Positive when the interval is wider than the target (sharp).
    pub error_cents: f64,
    /// Deviation of the slider from its correct position, in cents.
    pub cents_offset: f64,
    pub r_actual: f64,
}

/// Frequencies heard at `slider_value` and their signed error against the
/// target ratio.
pub fn evaluate(round: &RoundConfig, slider_value: f64) -> TuningState {
    let r_target = round.interval.ratio_value();
    let cents_offset = (slider_value - round.slider_correct_position) * round.slider_range_cents;
    let cents_factor = cents_to_ratio(cents_offset);

    let (lower, upper) = if round.tune_upper {
        let lower = round.base_freq_hz;
        (lower, lower * r_target * cents_factor)
    } else {
        let upper = round.base_freq_hz;
        (upper / r_target * cents_factor, upper)
    };

    let r_actual = lower.max(upper) / lower.min(upper);
    let error_cents = ratio_to_cents(r_actual / r_target);

    TuningState {
        f1_hz: lower,
        f2_hz: upper,
        error_cents,
        cents_offset,
        r_actual,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum PitchDirection {
    #[strum(serialize = "VERY TIGHT")]
    VeryTight,
    #[strum(serialize = "SHARP")]
    Sharp,
    #[strum(serialize = "FLAT")]
    Flat,
}

impl PitchDirection {
    pub fn from_error(error_cents: f64) -> Self {
        if error_cents.abs() <= TIGHT_CENTS {
            PitchDirection::VeryTight
        } else if error_cents > 0.0 {
            PitchDirection::Sharp
        } else {
            PitchDirection::Flat
        }
    }
}

/// Slider span revealed by a hint, clamped to [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HintWindow {
    pub start: f64,
    pub end: f64,
}

impl HintWindow {
    pub fn for_round(round: &RoundConfig, window_cents: f64) -> Self {
        let half = (window_cents / 2.0) / round.slider_range_cents;
        Self {
            start: (round.slider_correct_position - half).max(0.0),
            end: (round.slider_correct_position + half).min(1.0),
        }
    }

    pub fn width(&self) -> f64 {
        self.end - self.start
    }

    pub fn contains(&self, slider_value: f64) -> bool {
        (self.start..=self.end).contains(&slider_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::util::freq_from_midi;

    fn round(interval_id: u32, tune_upper: bool, midi: u8, correct: f64) -> RoundConfig {
        let interval = Catalog::standard().get(interval_id).unwrap().clone();
        RoundConfig {
            index: 0,
            base_freq_hz: freq_from_midi(midi),
            interval,
            tune_upper,
            slider_correct_position: correct,
            slider_range_cents: 150.0,
            initial_detune_cents: 0.0,
            initial_slider_value: correct,
        }
    }

    #[test]
    fn test_correct_position_gives_zero_error() {
        for &id in &[1, 3, 7, 15, 101, 115] {
            for &upper in &[true, false] {
                for &midi in &[45, 57, 64] {
                    let r = round(id, upper, midi, 0.37);
                    let state = evaluate(&r, 0.37);
                    assert!(state.error_cents.abs() < 1e-9, "id {id} upper {upper}");
                    assert!(state.cents_offset.abs() < 1e-12);
                }
            }
        }
    }

    #[test]
    fn test_tune_upper_keeps_lower_fixed() {
        let r = round(3, true, 57, 0.5);
        let state = evaluate(&r, 0.5);
        assert!((state.f1_hz - 220.0).abs() < 1e-9);
        assert!((state.f2_hz - 330.0).abs() < 1e-9);
        assert!((state.r_actual - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_tune_lower_keeps_upper_fixed() {
        let r = round(3, false, 69, 0.5);
        let state = evaluate(&r, 0.5);
        assert!((state.f2_hz - 440.0).abs() < 1e-9);
        assert!((state.f1_hz - 440.0 / 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_slider_offset_maps_to_cents() {
        // +0.1 of a 150 cent slider is +15 cents on the moving note
        let r = round(5, true, 60, 0.4);
        let state = evaluate(&r, 0.5);
        assert!((state.cents_offset - 15.0).abs() < 1e-9);
        assert!((state.error_cents - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_raising_lower_note_narrows_interval() {
        let r = round(5, false, 60, 0.4);
        let state = evaluate(&r, 0.5);
        assert!((state.error_cents + 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_evaluate_is_pure() {
        let r = round(6, true, 50, 0.6);
        assert_eq!(evaluate(&r, 0.21), evaluate(&r, 0.21));
    }

    #[test]
    fn test_pitch_direction() {
        assert_eq!(PitchDirection::from_error(2.0), PitchDirection::VeryTight);
        assert_eq!(PitchDirection::from_error(-1.5), PitchDirection::VeryTight);
        assert_eq!(PitchDirection::from_error(2.5), PitchDirection::Sharp);
        assert_eq!(PitchDirection::from_error(-8.0), PitchDirection::Flat);
        assert_eq!(PitchDirection::VeryTight.to_string(), "VERY TIGHT");
    }

    #[test]
    fn test_hint_window_centered() {
        let r = round(3, true, 60, 0.5);
        let w = HintWindow::for_round(&r, HINT_WINDOW_CENTS);
        assert!((w.start - 0.4).abs() < 1e-12);
        assert!((w.end - 0.6).abs() < 1e-12);
        assert!(w.contains(0.5));
        assert!(!w.contains(0.61));
    }

    #[test]
    fn test_hint_window_clamped() {
        let r = round(3, true, 60, 0.05);
        let w = HintWindow::for_round(&r, HINT_WINDOW_CENTS);
        assert_eq!(w.start, 0.0);
        assert!((w.width() - 0.15).abs() < 1e-12);
    }
}
