use std::f64::consts::TAU;

use crate::profile::{DelayRange, TimingProfile};
use crate::rng::RandomSource;

const MIN_DELAY_MS: u64 = 15;
const MAX_DELAY_MS: u64 = 8000;
const MIN_HOLD_MS: u64 = 40;
const MAX_HOLD_MS: u64 = 180;

const FATIGUE_UPDATE_EVERY: u64 = 50;
const FATIGUE_FULL_AT_CHARS: f64 = 1000.0;
const FATIGUE_MAX_PENALTY: f64 = 0.25;

/// Common English digraphs typed noticeably faster than unrelated pairs.
const FAST_DIGRAPHS: [[char; 2]; 10] = [
    ['t', 'h'],
    ['h', 'e'],
    ['i', 'n'],
    ['e', 'r'],
    ['a', 'n'],
    ['r', 'e'],
    ['o', 'n'],
    ['a', 't'],
    ['e', 'n'],
    ['n', 'd'],
];

// Fixed US-layout hand partition for the same-hand slowdown.
const LEFT_HAND: &str = "qwertasdfgzxcvb";
const RIGHT_HAND: &str = "yuiophjklnm";

/// Per-character timing model: rolling rhythm phase, fatigue, burst
/// countdown and the previous character, combined with the session's
/// timing profile into hold times and inter-chunk delays.
#[derive(Debug)]
pub struct TypingDynamics {
    profile: TimingProfile,
    delays: DelayRange,

    previous_char: Option<char>,
    rhythm_phase: f64,
    fatigue_factor: f64,
    burst_remaining: u32,
    total_chars_typed: u64,
}

impl TypingDynamics {
    pub fn new(profile: TimingProfile, delays: DelayRange, rng: &mut RandomSource) -> Self {
        Self {
            profile,
            delays,
            previous_char: None,
            rhythm_phase: rng.uniform() * TAU,
            fatigue_factor: 1.0,
            burst_remaining: 0,
            total_chars_typed: 0,
        }
    }

    pub fn reset(&mut self, rng: &mut RandomSource) {
        self.previous_char = None;
        self.rhythm_phase = rng.uniform() * TAU;
        self.fatigue_factor = 1.0;
        self.burst_remaining = 0;
        self.total_chars_typed = 0;
    }

    pub fn total_chars_typed(&self) -> u64 {
        self.total_chars_typed
    }

    pub fn update_state(&mut self, current: char) {
        self.previous_char = Some(current);
        self.total_chars_typed += 1;

        if self.total_chars_typed % FATIGUE_UPDATE_EVERY == 0 {
            let progress = (self.total_chars_typed as f64 / FATIGUE_FULL_AT_CHARS).min(1.0);
            self.fatigue_factor = 1.0 + FATIGUE_MAX_PENALTY * progress;
        }
    }

    /// Whether the next chunk is part of a fast run. An active burst is
    /// consumed one character at a time; otherwise a new run of
    /// [burst_min, burst_max] characters starts with `burst_prob`.
    pub fn should_burst(&mut self, rng: &mut RandomSource) -> bool {
        if self.burst_remaining > 0 {
            self.burst_remaining -= 1;
            return true;
        }
        if rng.chance(self.profile.burst_prob) {
            self.burst_remaining =
                rng.range(self.profile.burst_min as i64, self.profile.burst_max as i64) as u32;
            return true;
        }
        false
    }

    pub fn should_thinking_pause(&self, words_since_break: u32, rng: &mut RandomSource) -> bool {
        words_since_break as i64 > rng.range(8, 15) && rng.chance(0.3)
    }

    fn rhythmic_variation(&mut self) -> f64 {
        self.rhythm_phase += 0.03;
        let rhythm = self.rhythm_phase.sin() * 0.5 + 0.5;
        0.85 + rhythm * 0.3
    }

    /// Speed factor for an ordered pair of consecutive characters. A static
    /// heuristic table: common English digraphs run fast, a few awkward
    /// cross-hand reaches run slow, same-hand pairs slightly slow.
    pub fn digraph_factor(&self, prev: char, curr: char) -> f64 {
        let pair = [prev.to_ascii_lowercase(), curr.to_ascii_lowercase()];
        if FAST_DIGRAPHS.contains(&pair) {
            return 0.75;
        }

        if matches!((prev, curr), ('q', 'z') | ('z', 'q') | ('p', 'q')) {
            return 1.4;
        }

        let both_left = LEFT_HAND.contains(pair[0]) && LEFT_HAND.contains(pair[1]);
        let both_right = RIGHT_HAND.contains(pair[0]) && RIGHT_HAND.contains(pair[1]);
        if both_left || both_right {
            return 1.08;
        }

        1.0
    }

    /// Delay in ms before the next chunk, always in [15, 8000].
    pub fn calculate_delay(
        &mut self,
        ch: char,
        is_sentence_end: bool,
        is_burst: bool,
        is_thinking_pause: bool,
        rng: &mut RandomSource,
    ) -> u64 {
        let range = self.delays.max_ms.saturating_sub(self.delays.min_ms) as f64;
        let gamma_value = rng.gamma(self.profile.gamma_shape, self.profile.gamma_scale);
        let normalized = (gamma_value / 6.0).min(1.0);

        let mut delay = self.delays.min_ms as f64 + range * normalized;
        delay *= self.rhythmic_variation();

        if ch.is_ascii_digit() {
            delay *= 1.05;
        }
        if ch.is_whitespace() {
            delay *= 1.12;
        }
        if ch == '\n' {
            delay *= 1.5;
        }
        if matches!(ch, '.' | '!' | '?') {
            delay *= 1.4;
        }

        if let Some(prev) = self.previous_char {
            delay *= self.digraph_factor(prev, ch);
        }

        if is_sentence_end {
            delay += rng.gamma(2.0, 150.0);
        }
        if is_thinking_pause {
            delay += rng.gamma(3.0, 800.0);
        }

        if rng.chance(self.profile.micro_stutter_prob) {
            delay *= 1.3 + rng.uniform() * 0.4;
        }

        if is_burst {
            delay *= 0.65;
        }

        delay *= self.fatigue_factor;

        let noise = rng.normal(0.0, self.profile.noise_level);
        delay *= 1.0 + noise;

        (delay as i64).clamp(MIN_DELAY_MS as i64, MAX_DELAY_MS as i64) as u64
    }

    /// Key hold time in ms, always in [40, 180]. Uppercase keys are held
    /// longer (the shift reach).
    pub fn generate_hold_time(&self, ch: char, rng: &mut RandomSource) -> u64 {
        let mut hold = rng.gamma(2.5, 20.0);
        if ch.is_uppercase() {
            hold *= 1.2;
        }
        hold *= 0.9 + rng.uniform() * 0.2;

        (hold as i64).clamp(MIN_HOLD_MS as i64, MAX_HOLD_MS as i64) as u64
    }
}
