use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use anyhow::Result;

use crate::chunker::TextChunker;
use crate::dynamics::TypingDynamics;
use crate::imperfection::ImperfectionGenerator;
use crate::layout::KeyboardLayout;
use crate::profile::{validate_config, SessionConfig};
use crate::rng::RandomSource;
use crate::sink::InjectionSink;

const SKIP_PREVIEW_LIMIT: usize = 8;

/// Aggregate report of characters the sink could not inject. Surfaced once
/// after the session instead of failing the whole operation.
#[derive(Debug, Default, Clone)]
pub struct SkippedChars {
    count: u64,
    preview: Vec<char>,
}

impl SkippedChars {
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// Up to eight distinct skipped characters, in first-seen order.
    pub fn preview(&self) -> &[char] {
        &self.preview
    }

    fn record(&mut self, c: char) {
        self.count += 1;
        if self.preview.len() < SKIP_PREVIEW_LIMIT && !self.preview.contains(&c) {
            self.preview.push(c);
        }
    }
}

/// The typing session state machine.
///
/// Owns one chunker, one dynamics model, one imperfection generator and one
/// random source, all built together for a single text; loading new text
/// means building a new engine, so fatigue, rhythm and typo cadence never
/// leak between unrelated texts.
///
/// The engine owns no timer. Each `type_next_chunk` call types one chunk
/// synchronously through the sink and returns the delay in milliseconds the
/// caller must wait before calling again; any scheduler that honors that
/// contract (UI timer, worker-thread sleep loop, network-driven loop) can
/// drive it. A single engine must not be driven from two threads.
pub struct TypingEngine {
    chunker: TextChunker,
    dynamics: TypingDynamics,
    imperfections: ImperfectionGenerator,
    rng: RandomSource,
    words_since_break: u32,
    skipped: SkippedChars,
}

impl TypingEngine {
    pub fn new(text: impl Into<String>, cfg: &SessionConfig, mut rng: RandomSource) -> Result<Self> {
        validate_config(cfg)?;

        let layout = KeyboardLayout::new(cfg.layout);
        let dynamics = TypingDynamics::new(cfg.profile, cfg.delays, &mut rng);
        let imperfections = ImperfectionGenerator::new(cfg.imperfections, layout, &mut rng);

        Ok(Self {
            chunker: TextChunker::new(text),
            dynamics,
            imperfections,
            rng,
            words_since_break: 0,
            skipped: SkippedChars::default(),
        })
    }

    pub fn has_more(&self) -> bool {
        self.chunker.has_more()
    }

    pub fn progress_percent(&self) -> u32 {
        self.chunker.progress_percent()
    }

    pub fn skipped(&self) -> &SkippedChars {
        &self.skipped
    }

    /// Total characters consumed from the source text so far.
    pub fn chars_typed(&self) -> u64 {
        self.dynamics.total_chars_typed()
    }

    /// Type the next chunk through `sink` and return the delay before the
    /// next call. Returns 0 when there is nothing left to type or `stop`
    /// was raised; `stop` is sampled once per character, between injection
    /// calls.
    pub fn type_next_chunk(&mut self, sink: &mut dyn InjectionSink, stop: &AtomicBool) -> u64 {
        let Some(chunk) = self.chunker.next_chunk() else {
            return 0;
        };

        for original in chunk.chars() {
            if stop.load(Ordering::SeqCst) {
                return 0;
            }

            let outcome = self.imperfections.process_character(original, &mut self.rng);

            if !sink.supports(outcome.character) || !sink.supports(original) {
                self.skipped.record(original);
            } else {
                let hold = self.dynamics.generate_hold_time(outcome.character, &mut self.rng);
                sink.type_character(outcome.character, hold);

                if outcome.double {
                    let second = self.dynamics.generate_hold_time(outcome.character, &mut self.rng);
                    pause(self.rng.range_ms(10, 40));
                    sink.type_character(outcome.character, second);
                }

                if outcome.correct {
                    pause(self.rng.range_ms(60, 160));
                    sink.press_backspace();
                    let hold = self.dynamics.generate_hold_time(original, &mut self.rng);
                    pause(self.rng.range_ms(40, 90));
                    sink.type_character(original, hold);
                }
            }

            if original.is_whitespace() {
                self.words_since_break += 1;
            }

            // The rhythm and digraph model tracks what was *meant*, not the
            // injected typo.
            self.dynamics.update_state(original);
        }

        let Some(last) = chunk.chars().last() else {
            return 0;
        };

        let is_sentence_end = matches!(last, '.' | '!' | '?');
        let is_burst = self.dynamics.should_burst(&mut self.rng);
        let is_thinking_pause = self
            .dynamics
            .should_thinking_pause(self.words_since_break, &mut self.rng);
        if is_thinking_pause {
            self.words_since_break = 0;
        }

        self.dynamics
            .calculate_delay(last, is_sentence_end, is_burst, is_thinking_pause, &mut self.rng)
    }
}

fn pause(ms: u64) {
    thread::sleep(Duration::from_millis(ms));
}
