use crate::layout::KeyboardLayout;
use crate::profile::ImperfectionSettings;
use crate::rng::RandomSource;

/// What to do with one character: the (possibly substituted) character to
/// emit, plus whether to bounce it twice and whether to self-correct it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImperfectionOutcome {
    pub character: char,
    pub double: bool,
    pub correct: bool,
}

/// Schedules typos and double-key bounces on a per-character cadence.
///
/// Interval scheduling (rather than a per-character probability) keeps the
/// imperfection density the user configured while leaving the placement
/// within each interval random. A disabled feature has no scheduled
/// threshold and can never fire.
#[derive(Debug)]
pub struct ImperfectionGenerator {
    settings: ImperfectionSettings,
    layout: KeyboardLayout,

    chars_since_typo: u32,
    chars_since_double: u32,
    next_typo_at: Option<u32>,
    next_double_at: Option<u32>,
}

impl ImperfectionGenerator {
    pub fn new(
        settings: ImperfectionSettings,
        layout: KeyboardLayout,
        rng: &mut RandomSource,
    ) -> Self {
        let mut gen = Self {
            settings,
            layout,
            chars_since_typo: 0,
            chars_since_double: 0,
            next_typo_at: None,
            next_double_at: None,
        };
        gen.schedule_next_typo(rng);
        gen.schedule_next_double(rng);
        gen
    }

    pub fn reset(&mut self, rng: &mut RandomSource) {
        self.chars_since_typo = 0;
        self.chars_since_double = 0;
        self.schedule_next_typo(rng);
        self.schedule_next_double(rng);
    }

    fn schedule_next_typo(&mut self, rng: &mut RandomSource) {
        self.next_typo_at = self.settings.enable_typos.then(|| {
            rng.range(self.settings.typo_min as i64, self.settings.typo_max as i64) as u32
        });
    }

    fn schedule_next_double(&mut self, rng: &mut RandomSource) {
        self.next_double_at = self.settings.enable_double_keys.then(|| {
            rng.range(
                self.settings.double_min as i64,
                self.settings.double_max as i64,
            ) as u32
        });
    }

    /// Advance the cadence counters by one character and decide its fate.
    /// The typo and double-key checks are independent; both may fire on the
    /// same character.
    pub fn process_character(
        &mut self,
        original: char,
        rng: &mut RandomSource,
    ) -> ImperfectionOutcome {
        let mut outcome = ImperfectionOutcome {
            character: original,
            double: false,
            correct: false,
        };

        self.chars_since_typo += 1;
        self.chars_since_double += 1;

        if let Some(at) = self.next_typo_at {
            if self.chars_since_typo >= at && KeyboardLayout::is_letter(original) {
                outcome.character = self.layout.neighbor_key(original, rng);
                self.chars_since_typo = 0;
                self.schedule_next_typo(rng);

                if self.settings.enable_auto_correction
                    && rng.range(0, 99) < self.settings.correction_probability as i64
                {
                    outcome.correct = true;
                }
            }
        }

        if let Some(at) = self.next_double_at {
            if self.chars_since_double >= at && !original.is_whitespace() {
                outcome.double = true;
                self.chars_since_double = 0;
                self.schedule_next_double(rng);
            }
        }

        outcome
    }
}
