use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use itertools::Itertools;
use rand::{rngs::StdRng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info, trace};

use crate::{
    audio::{IntervalAudio, SilentAudio},
    catalog::Catalog,
    round_generator::{RoundConfig, RoundGenConfig, RoundGenerator},
    runtime::{Clock, SystemClock},
    scoring::{self, hint_penalty},
    tuning::{evaluate, HintWindow, TuningState, HINT_WINDOW_CENTS},
    util::{mean, std_dev},
};

pub const TOTAL_ROUNDS: usize = 30;
pub const MAX_ROUND_DURATION: Duration = Duration::from_secs(20);
pub const MAX_HINTS_PER_SESSION: u32 = 6;
pub const DEFAULT_REFRESH: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    pub total_rounds: usize,
    pub max_round_duration: Duration,
    pub max_hints: u32,
    pub hint_window_cents: f64,
    pub refresh_interval: Duration,
    pub rounds: RoundGenConfig,
    /// Fixes the round RNG. `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            total_rounds: TOTAL_ROUNDS,
            max_round_duration: MAX_ROUND_DURATION,
            max_hints: MAX_HINTS_PER_SESSION,
            hint_window_cents: HINT_WINDOW_CENTS,
            refresh_interval: DEFAULT_REFRESH,
            rounds: RoundGenConfig::default(),
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExamPhase {
    NotStarted,
    /// Current round awaits submission.
    InProgress,
    /// Current round scored, more rounds remain.
    RoundCompleted,
    Complete,
}

/// Outcome of one scored round. Written once, never changed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundResult {
    pub round_index: usize,
    pub interval_id: u32,
    pub error_cents: f64,
    pub delta_score: i32,
    /// Elapsed time, capped at the round's maximum duration.
    pub time_seconds: f64,
    pub auto_submitted: bool,
    pub contributions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum PassStatus {
    #[strum(serialize = "PASS")]
    Pass,
    #[strum(serialize = "TARGET")]
    Target,
}

/// What changed on a tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutcome {
    pub refresh: bool,
    pub auto_submitted: bool,
}

/// Read-only view for the status bar, rebuilt on each refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplaySnapshot {
    pub phase: ExamPhase,
    /// 1-based, 0 before the exam starts.
    pub round_number: usize,
    pub total_rounds: usize,
    pub score: f64,
    pub pass_status: PassStatus,
    pub exam_elapsed_secs: f64,
    pub round_remaining_secs: f64,
    pub hints_remaining: u32,
    pub hint_window: Option<HintWindow>,
    pub last_result: Option<RoundResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntervalBreakdown {
    pub name: String,
    pub rounds: usize,
    pub mean_abs_error_cents: f64,
}

/// End-of-exam report. Serializes to JSON for export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExamSummary {
    pub started_at: Option<DateTime<Local>>,
    pub rounds_scored: usize,
    pub total_points: i32,
    pub normalized_score: f64,
    pub passed: bool,
    pub hints_used: u32,
    pub mean_abs_error_cents: Option<f64>,
    pub error_std_dev_cents: Option<f64>,
    pub auto_submitted: usize,
    pub per_interval: Vec<IntervalBreakdown>,
}

#[derive(Debug, Default, Clone, Copy)]
struct RoundTimers {
    deadline: Option<Instant>,
    refresh: Option<Instant>,
}

impl RoundTimers {
    fn arm(&mut self, now: Instant, deadline_after: Duration, refresh_every: Duration) {
        self.deadline = Some(now + deadline_after);
        self.refresh = Some(now + refresh_every);
    }

    fn cancel(&mut self) {
        self.deadline = None;
        self.refresh = None;
    }

    fn next_wakeup(&self) -> Option<Instant> {
        match (self.deadline, self.refresh) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}

/// Owns all exam state. Actions invalid in the current phase are ignored.
pub struct ExamSession<A: IntervalAudio = SilentAudio, C: Clock = SystemClock> {
    catalog: Catalog,
    generator: RoundGenerator,
    settings: SessionSettings,
    rng: StdRng,
    audio: A,
    clock: C,

    selection: Vec<u32>,
    rounds: Vec<RoundConfig>,
    results: BTreeMap<usize, RoundResult>,
    phase: ExamPhase,
    current: usize,
    slider: f64,

    total_points: i32,
    hints_used: u32,
    hint_this_round: Option<u32>,

    round_started_at: Option<Instant>,
    exam_started_at: Option<Instant>,
    exam_finished_at: Option<Instant>,
    started_wallclock: Option<DateTime<Local>>,
    timers: RoundTimers,
}

impl ExamSession {
    pub fn new(settings: SessionSettings) -> Self {
        Self::with_parts(Catalog::standard(), settings, SilentAudio::new(), SystemClock)
    }
}

impl<A: IntervalAudio, C: Clock> ExamSession<A, C> {
    pub fn with_parts(catalog: Catalog, settings: SessionSettings, audio: A, clock: C) -> Self {
        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            catalog,
            generator: RoundGenerator::new(settings.rounds.clone()),
            settings,
            rng,
            audio,
            clock,
            selection: Vec::new(),
            rounds: Vec::new(),
            results: BTreeMap::new(),
            phase: ExamPhase::NotStarted,
            current: 0,
            slider: 0.5,
            total_points: 0,
            hints_used: 0,
            hint_this_round: None,
            round_started_at: None,
            exam_started_at: None,
            exam_finished_at: None,
            started_wallclock: None,
            timers: RoundTimers::default(),
        }
    }

    /// Generate every round up front and enter the first one.
    pub fn start(&mut self, selected_ids: &[u32]) {
        self.timers.cancel();
        self.audio.stop();

        self.selection = selected_ids.to_vec();
        self.rounds = self.generator.generate(
            &self.catalog,
            self.settings.total_rounds.max(1),
            &self.selection,
            &mut self.rng,
        );
        self.results.clear();
        self.total_points = 0;
        self.hints_used = 0;
        self.current = 0;
        self.exam_finished_at = None;

        if self.rounds.is_empty() {
            self.phase = ExamPhase::NotStarted;
            return;
        }

        self.exam_started_at = Some(self.clock.now());
        self.started_wallclock = Some(Local::now());
        self.phase = ExamPhase::InProgress;
        self.enter_round();

        info!(
            rounds = self.rounds.len(),
            selected = self.selection.len(),
            "exam started"
        );
    }

    /// Start over with the previous selection.
    pub fn restart(&mut self) {
        let selection = std::mem::take(&mut self.selection);
        info!("exam restarted");
        self.start(&selection);
    }

    fn enter_round(&mut self) {
        self.audio.stop();
        self.timers.cancel();
        self.round_started_at = None;
        self.hint_this_round = None;
        if let Some(round) = self.rounds.get(self.current) {
            self.slider = round.initial_slider_value;
        }
        debug!(round = self.current, "entered round");
    }

    /// Begin the round: start the clock, arm the auto-submit deadline and
    /// sound the interval. Once per round.
    pub fn play(&mut self) {
        if self.phase != ExamPhase::InProgress || self.round_started_at.is_some() {
            return;
        }
        let Some(round) = self.rounds.get(self.current) else {
            return;
        };

        let now = self.clock.now();
        self.round_started_at = Some(now);
        self.timers.arm(
            now,
            self.settings.max_round_duration,
            self.settings.refresh_interval,
        );

        let state = evaluate(round, self.slider);
        self.audio.start_interval(&state);
        debug!(round = self.current, "round playing");
    }

    /// Move the slider. Only retunes audio; scoring reads the slider at
    /// completion.
    pub fn adjust_slider(&mut self, value: f64) {
        self.fire_expired_deadline();
        if self.phase != ExamPhase::InProgress || !value.is_finite() {
            return;
        }
        self.slider = value.clamp(0.0, 1.0);
        if self.round_started_at.is_some() {
            if let Some(round) = self.rounds.get(self.current) {
                let state = evaluate(round, self.slider);
                trace!(slider = self.slider, error = state.error_cents, "slider moved");
                self.audio.update_interval(&state);
            }
        }
    }

    pub fn nudge_slider(&mut self, delta: f64) {
        self.adjust_slider(self.slider + delta);
    }

    /// Reveal the hint window. Once per round, before submission, while the
    /// session quota lasts.
    pub fn hint(&mut self) -> Option<HintWindow> {
        self.fire_expired_deadline();
        if self.phase != ExamPhase::InProgress
            || self.hint_this_round.is_some()
            || self.hints_used >= self.settings.max_hints
        {
            return None;
        }
        self.hints_used += 1;
        self.hint_this_round = Some(self.hints_used);
        info!(round = self.current, hint = self.hints_used, "hint used");
        self.hint_window()
    }

    /// Manual submission. Ignored once the deadline has passed; the round
    /// is then scored as auto-submitted.
    pub fn done(&mut self) -> Option<&RoundResult> {
        if self.fire_expired_deadline() {
            return None;
        }
        self.complete(false)
    }

    /// Score the round from an expired deadline that no tick has seen yet.
    fn fire_expired_deadline(&mut self) -> bool {
        match self.timers.deadline {
            Some(at) if self.clock.now() >= at => {
                debug!(round = self.current, "deadline passed before action");
                self.complete(true).is_some()
            }
            _ => false,
        }
    }

    /// The single completion path for both manual and deadline submission.
    fn complete(&mut self, auto_submitted: bool) -> Option<&RoundResult> {
        if self.phase != ExamPhase::InProgress {
            return None;
        }
        let round = self.rounds.get(self.current)?;

        self.timers.cancel();
        let state = evaluate(round, self.slider);
        self.audio.stop();

        let now = self.clock.now();
        let max = self.settings.max_round_duration;
        let elapsed = self
            .round_started_at
            .map(|t| now.saturating_duration_since(t))
            .unwrap_or(max)
            .min(max)
            .as_secs_f64();

        let penalty = self.hint_this_round.map(hint_penalty).unwrap_or(0);
        let scored = scoring::score(state.error_cents, elapsed, penalty, self.hint_this_round);

        self.total_points += scored.delta;
        let result = RoundResult {
            round_index: round.index,
            interval_id: round.interval.id,
            error_cents: state.error_cents,
            delta_score: scored.delta,
            time_seconds: elapsed,
            auto_submitted,
            contributions: scored.contributions,
        };

        info!(
            round = result.round_index,
            error = result.error_cents,
            delta = result.delta_score,
            total = self.total_points,
            auto = auto_submitted,
            "round scored"
        );

        if self.current + 1 >= self.rounds.len() {
            self.phase = ExamPhase::Complete;
            self.exam_finished_at = Some(now);
            info!(
                total = self.total_points,
                score = self.normalized_score(),
                "exam complete"
            );
        } else {
            self.phase = ExamPhase::RoundCompleted;
        }

        let index = result.round_index;
        self.results.insert(index, result);
        self.results.get(&index)
    }

    /// Advance to the next round, or restart after the last one.
    pub fn next(&mut self) {
        match self.phase {
            ExamPhase::RoundCompleted if self.current + 1 < self.rounds.len() => {
                self.current += 1;
                self.phase = ExamPhase::InProgress;
                self.enter_round();
            }
            ExamPhase::Complete => self.restart(),
            _ => {}
        }
    }

    /// Fire whichever timers are due. Completion from the deadline goes
    /// through the same path as `done`.
    pub fn on_tick(&mut self) -> TickOutcome {
        let now = self.clock.now();
        let mut outcome = TickOutcome::default();

        if let Some(at) = self.timers.refresh {
            if now >= at {
                self.timers.refresh = Some(now + self.settings.refresh_interval);
                outcome.refresh = true;
            }
        }

        if self.fire_expired_deadline() {
            outcome.auto_submitted = true;
            outcome.refresh = true;
        }

        outcome
    }

    /// Earliest pending timer, for bounding the event wait.
    pub fn next_wakeup(&self) -> Option<Instant> {
        self.timers.next_wakeup()
    }

    /// Silence audio without touching exam state.
    pub fn panic_stop(&mut self) {
        self.audio.stop();
    }

    /// Cancel timers, stop audio and drop the exam.
    pub fn teardown(&mut self) {
        self.timers.cancel();
        self.audio.stop();
        self.phase = ExamPhase::NotStarted;
        self.rounds.clear();
        self.results.clear();
        self.total_points = 0;
        self.hints_used = 0;
        self.current = 0;
        self.round_started_at = None;
        self.hint_this_round = None;
        self.exam_started_at = None;
        self.exam_finished_at = None;
        self.started_wallclock = None;
        info!("exam torn down");
    }

    pub fn phase(&self) -> ExamPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase != ExamPhase::NotStarted
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn selection(&self) -> &[u32] {
        &self.selection
    }

    pub fn rounds(&self) -> &[RoundConfig] {
        &self.rounds
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_round(&self) -> Option<&RoundConfig> {
        if self.is_active() {
            self.rounds.get(self.current)
        } else {
            None
        }
    }

    pub fn slider_value(&self) -> f64 {
        self.slider
    }

    pub fn is_playing(&self) -> bool {
        self.phase == ExamPhase::InProgress && self.round_started_at.is_some()
    }

    /// Evaluation at the current slider position.
    pub fn tuning(&self) -> Option<TuningState> {
        self.current_round().map(|round| evaluate(round, self.slider))
    }

    pub fn hint_window(&self) -> Option<HintWindow> {
        self.hint_this_round?;
        self.current_round()
            .map(|round| HintWindow::for_round(round, self.settings.hint_window_cents))
    }

    pub fn hints_used(&self) -> u32 {
        self.hints_used
    }

    pub fn hints_remaining(&self) -> u32 {
        self.settings.max_hints.saturating_sub(self.hints_used)
    }

    pub fn total_points(&self) -> i32 {
        self.total_points
    }

    pub fn normalized_score(&self) -> f64 {
        scoring::normalized_score(self.total_points, self.settings.total_rounds)
    }

    pub fn results(&self) -> impl Iterator<Item = &RoundResult> {
        self.results.values()
    }

    pub fn result(&self, round_index: usize) -> Option<&RoundResult> {
        self.results.get(&round_index)
    }

    /// Result of the current round, once it has been scored.
    pub fn current_result(&self) -> Option<&RoundResult> {
        self.current_round()
            .and_then(|round| self.results.get(&round.index))
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn audio_mut(&mut self) -> &mut A {
        &mut self.audio
    }

    pub fn display(&self) -> DisplaySnapshot {
        let now = self.clock.now();
        let max = self.settings.max_round_duration.as_secs_f64();
        let score = self.normalized_score();

        let exam_elapsed_secs = match self.exam_started_at {
            Some(start) if self.is_active() => {
                let end = self.exam_finished_at.unwrap_or(now);
                end.saturating_duration_since(start).as_secs_f64()
            }
            _ => 0.0,
        };

        let round_remaining_secs = match (self.phase, self.round_started_at) {
            (ExamPhase::RoundCompleted | ExamPhase::Complete, _) => 0.0,
            (ExamPhase::InProgress, Some(start)) => {
                (max - now.saturating_duration_since(start).as_secs_f64()).max(0.0)
            }
            _ => max,
        };

        let pass_status = if self.phase == ExamPhase::Complete && scoring::passed(score) {
            PassStatus::Pass
        } else {
            PassStatus::Target
        };

        DisplaySnapshot {
            phase: self.phase,
            round_number: if self.is_active() { self.current + 1 } else { 0 },
            total_rounds: self.settings.total_rounds,
            score,
            pass_status,
            exam_elapsed_secs,
            round_remaining_secs,
            hints_remaining: self.hints_remaining(),
            hint_window: self.hint_window(),
            last_result: self.current_result().cloned(),
        }
    }

    pub fn summary(&self) -> ExamSummary {
        let errors: Vec<f64> = self.results.values().map(|r| r.error_cents).collect();
        let abs_errors: Vec<f64> = errors.iter().map(|e| e.abs()).collect();

        let per_interval = self
            .results
            .values()
            .filter_map(|r| {
                self.catalog
                    .get(r.interval_id)
                    .map(|def| (def.name.clone(), r.error_cents.abs()))
            })
            .into_group_map()
            .into_iter()
            .map(|(name, errs)| IntervalBreakdown {
                rounds: errs.len(),
                mean_abs_error_cents: mean(&errs).unwrap_or(0.0),
                name,
            })
            .sorted_by(|a, b| a.name.cmp(&b.name))
            .collect();

        let normalized = self.normalized_score();
        ExamSummary {
            started_at: self.started_wallclock,
            rounds_scored: self.results.len(),
            total_points: self.total_points,
            normalized_score: normalized,
            passed: scoring::passed(normalized),
            hints_used: self.hints_used,
            mean_abs_error_cents: mean(&abs_errors),
            error_std_dev_cents: std_dev(&errors),
            auto_submitted: self.results.values().filter(|r| r.auto_submitted).count(),
            per_interval,
        }
    }
}

impl<A: IntervalAudio, C: Clock> Drop for ExamSession<A, C> {
    fn drop(&mut self) {
        self.timers.cancel();
        self.audio.stop();
    }
}
