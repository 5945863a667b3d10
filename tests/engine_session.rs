use std::sync::atomic::AtomicBool;

use pretty_assertions::assert_eq;

use ghostwriter::engine::TypingEngine;
use ghostwriter::layout::LayoutKind;
use ghostwriter::profile::{
    DelayRange, ImperfectionSettings, SessionConfig, TimingProfile,
};
use ghostwriter::rng::RandomSource;
use ghostwriter::sink::InjectionSink;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Event {
    Key { c: char, hold_ms: u64 },
    Backspace,
    ReleaseAll,
}

#[derive(Debug, Default)]
struct RecordingSink {
    events: Vec<Event>,
    ascii_only: bool,
}

impl RecordingSink {
    fn typed_text(&self) -> String {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Key { c, .. } => Some(*c),
                _ => None,
            })
            .collect()
    }

    fn backspace_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, Event::Backspace))
            .count()
    }
}

impl InjectionSink for RecordingSink {
    fn type_character(&mut self, c: char, hold_ms: u64) {
        self.events.push(Event::Key { c, hold_ms });
    }

    fn press_backspace(&mut self) {
        self.events.push(Event::Backspace);
    }

    fn release_all_keys(&mut self) {
        self.events.push(Event::ReleaseAll);
    }

    fn supports(&self, c: char) -> bool {
        !self.ascii_only || c.is_ascii()
    }
}

fn clean_config() -> SessionConfig {
    SessionConfig {
        profile: TimingProfile::human_advanced(),
        delays: DelayRange {
            min_ms: 50,
            max_ms: 100,
        },
        imperfections: ImperfectionSettings::disabled(),
        layout: LayoutKind::UsQwerty,
    }
}

fn drive(engine: &mut TypingEngine, sink: &mut RecordingSink) {
    let stop = AtomicBool::new(false);
    while engine.has_more() {
        engine.type_next_chunk(sink, &stop);
    }
}

#[test]
fn clean_session_types_exactly_the_input() {
    let mut sink = RecordingSink::default();
    let mut engine =
        TypingEngine::new("hi", &clean_config(), RandomSource::seeded(1)).expect("valid config");

    assert!(engine.has_more());

    let stop = AtomicBool::new(false);
    engine.type_next_chunk(&mut sink, &stop);

    assert!(!engine.has_more(), "both characters consumed in one chunk");
    assert_eq!(sink.typed_text(), "hi");
    assert_eq!(sink.backspace_count(), 0);
}

#[test]
fn multiple_words_arrive_in_order() {
    let mut sink = RecordingSink::default();
    let mut engine = TypingEngine::new("hello world", &clean_config(), RandomSource::seeded(2))
        .expect("valid config");

    drive(&mut engine, &mut sink);

    assert_eq!(sink.typed_text(), "hello world");
    assert_eq!(sink.backspace_count(), 0);
}

#[test]
fn every_hold_time_is_within_bounds() {
    let mut sink = RecordingSink::default();
    let mut engine = TypingEngine::new(
        "The quick brown fox jumps over the lazy dog.",
        &clean_config(),
        RandomSource::seeded(3),
    )
    .expect("valid config");

    drive(&mut engine, &mut sink);

    for event in &sink.events {
        if let Event::Key { hold_ms, .. } = event {
            assert!((40..=180).contains(hold_ms), "hold {hold_ms} out of range");
        }
    }
}

#[test]
fn inter_chunk_delays_stay_within_hard_bounds() {
    let mut sink = RecordingSink::default();
    let mut engine = TypingEngine::new(
        "hello world! this sentence has several chunks.\nand a second line.",
        &clean_config(),
        RandomSource::seeded(4),
    )
    .expect("valid config");

    let stop = AtomicBool::new(false);
    while engine.has_more() {
        let delay = engine.type_next_chunk(&mut sink, &stop);
        assert!((15..=8000).contains(&delay), "delay {delay} out of range");
    }
}

#[test]
fn progress_rises_monotonically_to_completion() {
    let mut sink = RecordingSink::default();
    let mut engine = TypingEngine::new(
        "a few words, punctuation! and\nnewlines to chew through",
        &clean_config(),
        RandomSource::seeded(5),
    )
    .expect("valid config");

    assert_eq!(engine.progress_percent(), 0);

    let stop = AtomicBool::new(false);
    let mut last = 0;
    while engine.has_more() {
        engine.type_next_chunk(&mut sink, &stop);
        let pct = engine.progress_percent();
        assert!(pct >= last, "progress went backwards: {last} -> {pct}");
        last = pct;
    }

    assert_eq!(engine.progress_percent(), 100);
}

#[test]
fn corrections_emit_backspace_then_the_intended_character() {
    let cfg = SessionConfig {
        imperfections: ImperfectionSettings {
            enable_typos: true,
            typo_min: 3,
            typo_max: 5,
            enable_double_keys: false,
            enable_auto_correction: true,
            correction_probability: 100,
            ..ImperfectionSettings::default()
        },
        ..clean_config()
    };

    let mut sink = RecordingSink::default();
    let mut engine =
        TypingEngine::new("abcdefghij", &cfg, RandomSource::seeded(6)).expect("valid config");

    drive(&mut engine, &mut sink);

    assert!(
        sink.backspace_count() > 0,
        "a 10-letter text with a 3-5 char typo cadence must self-correct"
    );

    // Every backspace is followed by a key press of the intended character,
    // so the visible end state matches the source text.
    let events = &sink.events;
    for (idx, event) in events.iter().enumerate() {
        if matches!(event, Event::Backspace) {
            assert!(
                matches!(events.get(idx + 1), Some(Event::Key { .. })),
                "backspace must be followed by the corrected key"
            );
        }
    }
}

#[test]
fn double_keys_repeat_the_same_character() {
    let cfg = SessionConfig {
        imperfections: ImperfectionSettings {
            enable_typos: false,
            enable_double_keys: true,
            double_min: 2,
            double_max: 3,
            enable_auto_correction: false,
            ..ImperfectionSettings::default()
        },
        ..clean_config()
    };

    let mut sink = RecordingSink::default();
    let mut engine =
        TypingEngine::new("abcdefgh", &cfg, RandomSource::seeded(7)).expect("valid config");

    drive(&mut engine, &mut sink);

    let typed = sink.typed_text();
    assert!(
        typed.len() > "abcdefgh".len(),
        "expected at least one bounced key, got {typed:?}"
    );

    let chars: Vec<char> = typed.chars().collect();
    let has_adjacent_repeat = chars.windows(2).any(|w| w[0] == w[1]);
    assert!(has_adjacent_repeat, "a bounce repeats the same character");
}

#[test]
fn seeded_sessions_replay_identically() {
    let cfg = SessionConfig {
        imperfections: ImperfectionSettings {
            enable_typos: true,
            typo_min: 2,
            typo_max: 6,
            enable_double_keys: true,
            double_min: 3,
            double_max: 7,
            enable_auto_correction: true,
            correction_probability: 50,
            ..ImperfectionSettings::default()
        },
        ..clean_config()
    };
    let text = "determinism is worth testing for.";

    let mut first = RecordingSink::default();
    let mut engine =
        TypingEngine::new(text, &cfg, RandomSource::seeded(42)).expect("valid config");
    drive(&mut engine, &mut first);

    let mut second = RecordingSink::default();
    let mut engine =
        TypingEngine::new(text, &cfg, RandomSource::seeded(42)).expect("valid config");
    drive(&mut engine, &mut second);

    assert_eq!(first.events, second.events);
}

#[test]
fn unsupported_characters_are_skipped_and_reported() {
    let mut sink = RecordingSink {
        ascii_only: true,
        ..RecordingSink::default()
    };
    let mut engine = TypingEngine::new("caf\u{e9} au lait", &clean_config(), RandomSource::seeded(8))
        .expect("valid config");

    drive(&mut engine, &mut sink);

    assert_eq!(sink.typed_text(), "caf au lait");
    assert_eq!(engine.skipped().count(), 1);
    assert_eq!(engine.skipped().preview(), ['\u{e9}']);
}

#[test]
fn invalid_config_is_rejected_up_front() {
    let cfg = SessionConfig {
        delays: DelayRange {
            min_ms: 500,
            max_ms: 100,
        },
        ..clean_config()
    };

    let result = TypingEngine::new("hello", &cfg, RandomSource::seeded(9));
    assert!(result.is_err(), "min > max delay must fail validation");
}
