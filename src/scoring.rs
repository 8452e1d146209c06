use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
#[strum(serialize_all = "snake_case")]
pub enum AccuracyGrade {
    WorldClass,
    Excellent,
    Good,
    Borderline,
    Poor,
    VeryPoor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
#[strum(serialize_all = "snake_case")]
pub enum TimeGrade {
    Fast,
    Medium,
    Slow,
}

/// One row of a lookup table. `max == None` means unbounded above.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band<L> {
    pub label: L,
    pub min: f64,
    pub max: Option<f64>,
    pub min_inclusive: bool,
    pub max_inclusive: bool,
    pub points: i32,
}

impl<L> Band<L> {
    const fn half_open(label: L, min: f64, max: Option<f64>, points: i32) -> Self {
        Self {
            label,
            min,
            max,
            min_inclusive: true,
            max_inclusive: false,
            points,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        let pass_min = if self.min_inclusive {
            value >= self.min
        } else {
            value > self.min
        };
        let pass_max = match self.max {
            None => true,
            Some(max) if self.max_inclusive => value <= max,
            Some(max) => value < max,
        };
        pass_min && pass_max
    }
}

/// Absolute error in cents. First match wins.
pub static ACCURACY_BANDS: [Band<AccuracyGrade>; 6] = [
    Band::half_open(AccuracyGrade::WorldClass, 0.0, Some(2.0), 6),
    Band::half_open(AccuracyGrade::Excellent, 2.0, Some(5.0), 4),
    Band::half_open(AccuracyGrade::Good, 5.0, Some(10.0), 2),
    Band::half_open(AccuracyGrade::Borderline, 10.0, Some(20.0), 0),
    Band::half_open(AccuracyGrade::Poor, 20.0, Some(40.0), -2),
    Band::half_open(AccuracyGrade::VeryPoor, 40.0, None, -4),
];

/// Elapsed seconds, capped at the round maximum.
pub static TIME_BANDS: [Band<TimeGrade>; 3] = [
    Band::half_open(TimeGrade::Fast, 0.0, Some(6.0), 1),
    Band {
        label: TimeGrade::Medium,
        min: 6.0,
        max: Some(12.0),
        min_inclusive: true,
        max_inclusive: true,
        points: 0,
    },
    Band {
        label: TimeGrade::Slow,
        min: 12.0,
        max: Some(20.0),
        min_inclusive: false,
        max_inclusive: true,
        points: -1,
    },
];

/// Escalating cost of the n-th hint in a session.
pub const HINT_PENALTIES: [i32; 6] = [-1, -2, -3, -4, -5, -6];

/// Best possible round without hints: world_class + fast.
pub const MAX_POINTS_PER_ROUND: i32 = 7;

pub const PASS_THRESHOLD: f64 = 75.0;

/// First band containing `value`; values outside every band land in the
/// last one.
pub fn lookup<L>(table: &[Band<L>], value: f64) -> &Band<L> {
    table
        .iter()
        .find(|band| band.contains(value))
        .unwrap_or_else(|| &table[table.len() - 1])
}

pub fn accuracy_band(abs_error_cents: f64) -> &'static Band<AccuracyGrade> {
    lookup(&ACCURACY_BANDS, abs_error_cents)
}

pub fn time_band(elapsed_secs: f64) -> &'static Band<TimeGrade> {
    lookup(&TIME_BANDS, elapsed_secs)
}

/// Penalty for the hint with 1-based session index `hint_index`. Indices
/// past the table reuse its last entry.
pub fn hint_penalty(hint_index: u32) -> i32 {
    let idx = (hint_index.max(1) as usize - 1).min(HINT_PENALTIES.len() - 1);
    HINT_PENALTIES[idx]
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoundScore {
    pub delta: i32,
    pub accuracy: AccuracyGrade,
    pub time: TimeGrade,
    pub contributions: Vec<String>,
}

fn signed(points: i32) -> String {
    if points >= 0 {
        format!("+{points}")
    } else {
        points.to_string()
    }
}

fn band_line<L: Display>(kind: &str, band: &Band<L>) -> String {
    format!("{kind} band \"{}\" ({} pts)", band.label, signed(band.points))
}

/// Score one round. `hint_penalty` is 0 when no hint was used, in which
/// case `hint_index_used` is `None`.
pub fn score(
    error_cents: f64,
    elapsed_secs_capped: f64,
    hint_penalty: i32,
    hint_index_used: Option<u32>,
) -> RoundScore {
    let accuracy = accuracy_band(error_cents.abs());
    let time = time_band(elapsed_secs_capped);

    let mut contributions = vec![band_line("Accuracy", accuracy), band_line("Time", time)];
    if let Some(index) = hint_index_used {
        contributions.push(format!("Hint #{index} penalty ({hint_penalty} pts)"));
    }

    RoundScore {
        delta: accuracy.points + time.points + hint_penalty,
        accuracy: accuracy.label,
        time: time.label,
        contributions,
    }
}

/// Percentage of the hint-free maximum, clamped to [0, 100].
pub fn normalized_score(total_points: i32, total_rounds: usize) -> f64 {
    if total_rounds == 0 {
        return 0.0;
    }
    let max_total = (MAX_POINTS_PER_ROUND as f64) * total_rounds as f64;
    ((total_points as f64 / max_total) * 100.0).clamp(0.0, 100.0)
}

pub fn passed(normalized: f64) -> bool {
    normalized >= PASS_THRESHOLD
}
