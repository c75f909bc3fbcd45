use std::sync::mpsc;

use flowtype::clock::ManualClock;
use flowtype::observer::{NullObserver, Remaining, SessionEvent};
use flowtype::rng::Mulberry32;
use flowtype::session::{CharState, Mode, Session, SessionConfig};
use flowtype::text_generator::{generate_text, ContentType, Difficulty, TextRequest};
use flowtype::tokenize::count_words;
use flowtype::{compute_stats, Stats};

fn session_on(text: &str, mode: Mode, duration: u32, clock: &ManualClock) -> Session<ManualClock> {
    Session::with_clock(
        SessionConfig {
            text: text.to_string(),
            mode,
            duration,
            allow_backspace: true,
        },
        clock.clone(),
        NullObserver,
    )
}

#[test]
fn stats_reference_values() {
    assert_eq!(
        compute_stats(25, 25, 0, 60_000),
        Stats {
            wpm: 5,
            raw: 5,
            accuracy: 100,
            errors: 0
        }
    );
    assert_eq!(
        compute_stats(20, 25, 5, 30_000),
        Stats {
            wpm: 8,
            raw: 10,
            accuracy: 80,
            errors: 5
        }
    );
}

#[test]
fn counters_match_cursor_for_generated_text() {
    let text = generate_text(&TextRequest {
        difficulty: Difficulty::Hard,
        ..TextRequest::words(40, 31337)
    });
    let chars: Vec<char> = text.chars().collect();
    let clock = ManualClock::new();
    let mut session = session_on(&text, Mode::TimeLimited, 3600, &clock);
    let mut rng = Mulberry32::new(9);

    session.start();
    for _ in 0..2_000 {
        if session.has_finished() {
            break;
        }
        clock.advance_ms(37);
        session.poll_timers();

        let before_index = session.current_index();
        if rng.chance(0.25) {
            session.handle_backspace();
            assert_eq!(session.current_index(), before_index.saturating_sub(1));
        } else {
            let expected = chars[before_index];
            let typed = if rng.chance(0.9) { expected } else { '~' };
            session.handle_char_input(typed);
            let slot = session.typed_states()[before_index];
            assert_eq!(
                slot,
                if typed == expected {
                    CharState::Correct
                } else {
                    CharState::Incorrect
                }
            );
        }

        assert_eq!(session.correct_chars() + session.errors(), session.total_chars());
        assert_eq!(session.total_chars(), session.current_index());
        assert!(session.stats().accuracy <= 100);
    }
}

#[test]
fn word_quota_counts_completed_words_only() {
    let text = generate_text(&TextRequest::words(10, 5));
    let clock = ManualClock::new();
    let mut session = session_on(&text, Mode::WordCountLimited, 3, &clock);
    session.start();

    // type everything up to (but excluding) the last char of the third word
    let chars: Vec<char> = text.chars().collect();
    let mut words_seen = 0;
    let mut idx = 0;
    while idx < chars.len() {
        let is_last_char_of_word = chars[idx].is_alphanumeric()
            && chars.get(idx + 1).map_or(true, |c| !c.is_alphanumeric());
        if is_last_char_of_word {
            words_seen += 1;
            if words_seen == 3 {
                break;
            }
        }
        session.handle_char_input(chars[idx]);
        idx += 1;
    }

    assert!(session.is_running());
    assert_eq!(session.remaining(), Remaining::Words { count: 1 });
    session.handle_char_input(chars[idx]);
    assert!(session.has_finished());
    assert_eq!(count_words(&text), session.words_total());
}

#[test]
fn pause_resume_elapsed_scenario() {
    let clock = ManualClock::new();
    let mut session = session_on("some text", Mode::TimeLimited, 60, &clock);

    session.start();
    clock.advance_ms(500);
    session.pause();
    clock.advance_ms(1_000);
    session.start();
    clock.advance_ms(500);

    assert_eq!(session.elapsed_ms(), 1_000);
}

#[test]
fn one_second_session_ends_through_deadline() {
    let clock = ManualClock::new();
    let (tx, rx) = mpsc::channel();
    let mut session = Session::with_clock(
        SessionConfig {
            text: "idle".to_string(),
            mode: Mode::TimeLimited,
            duration: 1,
            allow_backspace: false,
        },
        clock.clone(),
        tx,
    );
    session.start();

    // a single late poll, as if the host was suspended
    clock.advance_ms(1_200);
    session.poll_timers();

    assert!(session.has_finished());
    assert_eq!(session.elapsed_ms(), 1_000);
    let events: Vec<SessionEvent> = rx.try_iter().collect();
    assert!(matches!(events.last(), Some(SessionEvent::End(_))));
}

#[test]
fn generator_is_deterministic_per_content_type() {
    for content_type in [
        ContentType::Words,
        ContentType::Quotes,
        ContentType::Numbers,
        ContentType::Code,
    ] {
        let req = TextRequest {
            content_type,
            ..TextRequest::words(15, 123_456)
        };
        assert_eq!(generate_text(&req), generate_text(&req), "{content_type}");
    }
}

#[test]
fn custom_text_ignores_everything_else() {
    for seed in [0, 1, u32::MAX] {
        let req = TextRequest {
            word_count: 999,
            include_punctuation: false,
            seed,
            content_type: ContentType::Custom,
            difficulty: Difficulty::Easy,
            custom_text: "\t exactly this \n".to_string(),
        };
        assert_eq!(generate_text(&req), "exactly this");
    }
}
