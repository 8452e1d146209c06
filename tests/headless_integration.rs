use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tartini::audio::SilentAudio;
use tartini::catalog::Catalog;
use tartini::runtime::{ExamEvent, FixedTicker, ManualClock, Runner, TestEventSource};
use tartini::session::{ExamPhase, ExamSession, SessionSettings};

fn key(c: char) -> ExamEvent {
    ExamEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
}

// Drives a session from a channel the way the terminal loop does, with the
// exam clock under test control.
#[test]
fn headless_round_flow_completes() {
    let clock = ManualClock::new();
    let settings = SessionSettings {
        seed: Some(21),
        total_rounds: 2,
        ..SessionSettings::default()
    };
    let mut session =
        ExamSession::with_parts(Catalog::standard(), settings, SilentAudio::new(), clock.clone());
    session.start(&[3, 5]);

    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(TestEventSource::new(rx), FixedTicker::exact(Duration::from_millis(5)));

    for c in ['p', 'h', 'd', 'n', 'p', 'd'] {
        tx.send(key(c)).unwrap();
    }
    drop(tx);

    let mut ticks = 0;
    for _ in 0..50u32 {
        match runner.step() {
            ExamEvent::Tick => {
                ticks += 1;
                session.on_tick();
                if session.phase() == ExamPhase::Complete {
                    break;
                }
            }
            ExamEvent::Resize => {}
            ExamEvent::Key(k) => {
                clock.advance_secs(1.0);
                match k.code {
                    KeyCode::Char('p') => session.play(),
                    KeyCode::Char('h') => {
                        session.hint();
                    }
                    KeyCode::Char('d') => {
                        session.done();
                    }
                    KeyCode::Char('n') => session.next(),
                    _ => {}
                }
            }
        }
    }

    assert!(ticks >= 1);
    assert_eq!(session.phase(), ExamPhase::Complete);
    assert_eq!(session.results().count(), 2);
    assert_eq!(session.hints_used(), 1);
    assert!(session.audio().current().is_none());
    let first = session.result(0).unwrap();
    assert!(first.contributions.iter().any(|c| c.starts_with("Hint #1")));
}

#[test]
fn deadline_fires_from_tick_loop() {
    let clock = ManualClock::new();
    let settings = SessionSettings {
        seed: Some(22),
        ..SessionSettings::default()
    };
    let mut session =
        ExamSession::with_parts(Catalog::standard(), settings, SilentAudio::new(), clock.clone());
    session.start(&[4]);
    session.play();
    assert!(session.next_wakeup().is_some());

    let (_tx, rx) = mpsc::channel::<ExamEvent>();
    let runner = Runner::new(TestEventSource::new(rx), FixedTicker::exact(Duration::from_millis(1)));

    let mut auto = false;
    for _ in 0..40u32 {
        if let ExamEvent::Tick = runner.step() {
            clock.advance(Duration::from_secs(1));
            auto |= session.on_tick().auto_submitted;
        }
    }

    assert!(auto);
    assert_eq!(session.phase(), ExamPhase::RoundCompleted);
    assert!(session.next_wakeup().is_none());
    assert!(session.current_result().unwrap().auto_submitted);
}

// Held arrow keys arrive faster than the tick, so the loop never sees a
// Tick. The deadline still has to end the round on time.
#[test]
fn key_repeat_cannot_outrun_deadline() {
    let clock = ManualClock::new();
    let settings = SessionSettings {
        seed: Some(23),
        ..SessionSettings::default()
    };
    let mut session =
        ExamSession::with_parts(Catalog::standard(), settings, SilentAudio::new(), clock.clone());
    session.start(&[3]);
    session.play();
    session.adjust_slider(0.0);

    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(TestEventSource::new(rx), FixedTicker::exact(Duration::from_millis(100)));
    let right = ExamEvent::Key(KeyEvent::new(KeyCode::Right, KeyModifiers::NONE));
    for _ in 0..900 {
        tx.send(right.clone()).unwrap();
    }

    let mut slider_at_deadline = None;
    for _ in 0..900u32 {
        match runner.step() {
            ExamEvent::Key(k) if k.code == KeyCode::Right => {
                clock.advance(Duration::from_millis(33));
                if session.phase() == ExamPhase::InProgress {
                    slider_at_deadline = Some(session.slider_value());
                }
                session.nudge_slider(0.002);
            }
            ExamEvent::Tick => panic!("queued keys should never time out"),
            _ => {}
        }
    }

    assert_eq!(session.phase(), ExamPhase::RoundCompleted);
    let result = session.current_result().unwrap();
    assert!(result.auto_submitted);
    assert_eq!(result.time_seconds, 20.0);
    assert_eq!(session.slider_value(), slider_at_deadline.unwrap());

    // A late Enter changes nothing.
    assert!(session.done().is_none());
    assert_eq!(session.results().count(), 1);
}
