use std::time::Duration;

use tartini::audio::SilentAudio;
use tartini::catalog::Catalog;
use tartini::runtime::ManualClock;
use tartini::session::{ExamPhase, ExamSession, PassStatus, SessionSettings, TOTAL_ROUNDS};

type Session = ExamSession<SilentAudio, ManualClock>;

fn session(seed: u64) -> (Session, ManualClock) {
    let clock = ManualClock::new();
    let settings = SessionSettings {
        seed: Some(seed),
        ..SessionSettings::default()
    };
    let s = ExamSession::with_parts(Catalog::standard(), settings, SilentAudio::new(), clock.clone());
    (s, clock)
}

fn tune_exactly(s: &mut Session) {
    let correct = s.current_round().unwrap().slider_correct_position;
    s.adjust_slider(correct);
}

#[test]
fn perfect_exam_scores_one_hundred_and_passes() {
    let (mut s, clock) = session(1);
    s.start(&[3, 4, 5, 105]);

    for round in 0..TOTAL_ROUNDS {
        assert_eq!(s.current_index(), round);
        s.play();
        tune_exactly(&mut s);
        clock.advance_secs(2.0);
        let result = s.done().cloned().unwrap();
        assert_eq!(result.delta_score, 7);
        if round + 1 < TOTAL_ROUNDS {
            assert_eq!(s.phase(), ExamPhase::RoundCompleted);
            s.next();
        }
    }

    assert_eq!(s.phase(), ExamPhase::Complete);
    assert_eq!(s.total_points(), 7 * TOTAL_ROUNDS as i32);
    assert_eq!(s.normalized_score(), 100.0);
    assert_eq!(s.display().pass_status, PassStatus::Pass);

    let summary = s.summary();
    assert!(summary.passed);
    assert_eq!(summary.rounds_scored, TOTAL_ROUNDS);
    assert_eq!(summary.auto_submitted, 0);
    assert!(summary.per_interval.iter().all(|b| b.mean_abs_error_cents < 1e-6));
    let counted: usize = summary.per_interval.iter().map(|b| b.rounds).sum();
    assert_eq!(counted, TOTAL_ROUNDS);
}

#[test]
fn hint_penalties_escalate_and_run_out() {
    let (mut s, clock) = session(2);
    s.start(&[3]);

    let mut deltas = Vec::new();
    for _ in 0..7 {
        s.play();
        let hinted = s.hint();
        tune_exactly(&mut s);
        clock.advance_secs(1.0);
        deltas.push((hinted.is_some(), s.done().unwrap().delta_score));
        s.next();
    }

    assert_eq!(
        deltas,
        vec![
            (true, 6),
            (true, 5),
            (true, 4),
            (true, 3),
            (true, 2),
            (true, 1),
            (false, 7),
        ]
    );
    assert_eq!(s.hints_used(), 6);
    assert_eq!(s.hints_remaining(), 0);
}

#[test]
fn deadline_auto_submits_once() {
    let (mut s, clock) = session(3);
    s.start(&[5]);
    s.play();
    tune_exactly(&mut s);

    clock.advance(Duration::from_secs(19));
    assert!(!s.on_tick().auto_submitted);
    assert_eq!(s.phase(), ExamPhase::InProgress);

    clock.advance(Duration::from_secs(2));
    let outcome = s.on_tick();
    assert!(outcome.auto_submitted);
    let result = s.current_result().unwrap();
    assert!(result.auto_submitted);
    assert_eq!(result.time_seconds, 20.0);
    assert_eq!(result.delta_score, 5);

    // Neither a later tick nor a manual submission scores the round again.
    clock.advance(Duration::from_secs(30));
    assert!(!s.on_tick().auto_submitted);
    assert!(s.done().is_none());
    assert_eq!(s.total_points(), 5);
    assert_eq!(s.results().count(), 1);
}

#[test]
fn singleton_pool_repeats_the_same_interval() {
    let (mut s, _) = session(4);
    s.start(&[107]);
    assert!(s.rounds().iter().all(|r| r.interval.id == 107));
}

#[test]
fn empty_selection_falls_back_to_full_catalog() {
    let (mut s, _) = session(5);
    s.start(&[]);
    assert_eq!(s.rounds().len(), TOTAL_ROUNDS);
    assert_eq!(s.phase(), ExamPhase::InProgress);
}

#[test]
fn restart_after_completion_keeps_selection() {
    let (mut s, _) = session(6);
    s.start(&[3, 4]);
    for _ in 0..TOTAL_ROUNDS {
        s.done();
        s.next();
    }
    // The last `next` restarted the exam.
    assert_eq!(s.phase(), ExamPhase::InProgress);
    assert_eq!(s.current_index(), 0);
    assert_eq!(s.total_points(), 0);
    assert_eq!(s.results().count(), 0);
    assert_eq!(s.selection(), &[3, 4]);
    assert!(s.rounds().iter().all(|r| [3, 4].contains(&r.interval.id)));
}

#[test]
fn careless_exam_goes_negative_but_score_floors_at_zero() {
    let (mut s, clock) = session(7);
    s.start(&[3]);
    for _ in 0..TOTAL_ROUNDS {
        s.play();
        s.adjust_slider(0.0);
        clock.advance_secs(15.0);
        assert!(s.done().unwrap().delta_score <= -3);
        if s.phase() != ExamPhase::Complete {
            s.next();
        }
    }

    assert_eq!(s.phase(), ExamPhase::Complete);
    assert!(s.total_points() <= -3 * TOTAL_ROUNDS as i32);
    assert_eq!(s.normalized_score(), 0.0);
    assert_eq!(s.display().pass_status, PassStatus::Target);
    assert!(!s.summary().passed);
}
