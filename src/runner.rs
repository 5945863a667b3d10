use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::warn;

use crate::engine::{SkippedChars, TypingEngine};
use crate::profile::SessionConfig;
use crate::rng::RandomSource;
use crate::sink::{InjectionSink, MouseSink};

/// Liveness safety net: force-stop if nothing was typed for this long while
/// the session is active.
const WATCHDOG_TIMEOUT_MS: u64 = 10_000;

// Mouse jitter cadence (characters) and magnitude (pixels).
const JITTER_MIN_INTERVAL_CHARS: u64 = 20;
const JITTER_MAX_INTERVAL_CHARS: u64 = 60;
const JITTER_MIN_PIXELS: i64 = 3;
const JITTER_MAX_PIXELS: i64 = 15;
const JITTER_MIN_PAUSE_MS: u64 = 100;
const JITTER_MAX_PAUSE_MS: u64 = 300;

const IDLE_SCROLL_AFTER_MS: u64 = 30_000;
const SCROLL_DOWN_PROBABILITY: f64 = 0.8;

/// Sleep in ≤50 ms steps so a raised stop flag takes effect quickly even
/// inside a multi-hundred-millisecond inter-chunk delay.
pub fn sleep_interruptible(stop: &AtomicBool, ms: u64) {
    let mut remaining = ms;
    while remaining > 0 {
        if stop.load(Ordering::SeqCst) {
            return;
        }
        let step = remaining.min(50);
        thread::sleep(Duration::from_millis(step));
        remaining -= step;
    }
}

/// Monotonic record of the last typing activity, shared with the watchdog
/// and idle-scroll threads.
#[derive(Debug)]
pub struct ActivityClock {
    start: Instant,
    last_ms: AtomicU64,
}

impl ActivityClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            last_ms: AtomicU64::new(0),
        }
    }

    pub fn touch(&self) {
        let now = self.start.elapsed().as_millis() as u64;
        self.last_ms.store(now, Ordering::SeqCst);
    }

    pub fn idle_ms(&self) -> u64 {
        let now = self.start.elapsed().as_millis() as u64;
        now.saturating_sub(self.last_ms.load(Ordering::SeqCst))
    }
}

impl Default for ActivityClock {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    pub countdown_secs: u64,
    /// Console progress output; off when driven by the network agent.
    pub progress: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            countdown_secs: 5,
            progress: true,
        }
    }
}

#[derive(Debug)]
pub struct SessionOutcome {
    pub completed: bool,
    pub chars_typed: u64,
    pub skipped: SkippedChars,
}

fn spawn_watchdog(
    activity: Arc<ActivityClock>,
    stop: Arc<AtomicBool>,
    done: Arc<AtomicBool>,
) -> JoinHandle<()> {
    thread::spawn(move || loop {
        if done.load(Ordering::SeqCst) {
            return;
        }
        if activity.idle_ms() > WATCHDOG_TIMEOUT_MS && !stop.load(Ordering::SeqCst) {
            warn!("watchdog: no typing activity for 10s, force-stopping session");
            stop.store(true, Ordering::SeqCst);
        }
        sleep_interruptible(&done, 1000);
    })
}

/// Independent idle behavior: when the session has been quiet for 30 s,
/// scroll a little (mostly down). Touches only its own mouse sink, never
/// the engine.
fn spawn_idle_scroller(
    mut mouse: Box<dyn MouseSink + Send>,
    activity: Arc<ActivityClock>,
    shutdown: Arc<AtomicBool>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut rng = RandomSource::from_entropy();
        loop {
            sleep_interruptible(&shutdown, 1000);
            if shutdown.load(Ordering::SeqCst) {
                return;
            }

            if activity.idle_ms() >= IDLE_SCROLL_AFTER_MS {
                let mut amount = rng.range(1, 3) as i32;
                if !rng.chance(SCROLL_DOWN_PROBABILITY) {
                    amount = -amount;
                }
                mouse.scroll(amount);
            }
        }
    })
}

struct MouseJitter {
    mouse: Box<dyn MouseSink + Send>,
    chars_at_last_move: u64,
    next_move_after: u64,
}

impl MouseJitter {
    fn new(mouse: Box<dyn MouseSink + Send>, rng: &mut RandomSource) -> Self {
        Self {
            mouse,
            chars_at_last_move: 0,
            next_move_after: rng.range_ms(JITTER_MIN_INTERVAL_CHARS, JITTER_MAX_INTERVAL_CHARS),
        }
    }

    fn maybe_move(&mut self, chars_typed: u64, stop: &AtomicBool, rng: &mut RandomSource) {
        if chars_typed.saturating_sub(self.chars_at_last_move) < self.next_move_after {
            return;
        }

        let mut dx = rng.range(-JITTER_MAX_PIXELS, JITTER_MAX_PIXELS) as i32;
        let dy = rng.range(-JITTER_MAX_PIXELS, JITTER_MAX_PIXELS) as i32;
        if dx == 0 && dy == 0 {
            dx = rng.range(JITTER_MIN_PIXELS, JITTER_MAX_PIXELS) as i32;
        }

        self.mouse.move_relative(dx, dy);
        sleep_interruptible(stop, rng.range_ms(JITTER_MIN_PAUSE_MS, JITTER_MAX_PAUSE_MS));

        self.chars_at_last_move = chars_typed;
        self.next_move_after = rng.range_ms(JITTER_MIN_INTERVAL_CHARS, JITTER_MAX_INTERVAL_CHARS);
    }
}

/// Drive one typing session to completion on the calling thread.
///
/// Blocks through every injection and intentional sleep. The stop flag is
/// honored between characters and inside sleeps; on any exit path all keys
/// are released and skipped characters are reported in aggregate.
pub fn run_session(
    text: &str,
    cfg: &SessionConfig,
    rng: RandomSource,
    sink: &mut dyn InjectionSink,
    jitter_mouse: Option<Box<dyn MouseSink + Send>>,
    idle_mouse: Option<Box<dyn MouseSink + Send>>,
    stop: Arc<AtomicBool>,
    opts: &SessionOptions,
) -> Result<SessionOutcome> {
    let mut engine = TypingEngine::new(text, cfg, rng)?;
    let mut jitter_rng = RandomSource::from_entropy();
    let mut jitter = jitter_mouse.map(|mouse| MouseJitter::new(mouse, &mut jitter_rng));

    let activity = Arc::new(ActivityClock::new());
    let done = Arc::new(AtomicBool::new(false));
    let watchdog = spawn_watchdog(activity.clone(), stop.clone(), done.clone());
    let idle_scroller =
        idle_mouse.map(|mouse| spawn_idle_scroller(mouse, activity.clone(), done.clone()));

    if opts.countdown_secs > 0 {
        eprintln!(
            "Focus the target window. Starting in {}s...",
            opts.countdown_secs
        );
        for remaining in (1..=opts.countdown_secs).rev() {
            if stop.load(Ordering::SeqCst) {
                break;
            }
            eprintln!("{remaining}...");
            activity.touch();
            sleep_interruptible(&stop, 1000);
        }
    }

    let mut last_reported_pct = 0;
    if opts.progress && !stop.load(Ordering::SeqCst) {
        eprintln!("Typing...");
    }

    while engine.has_more() && !stop.load(Ordering::SeqCst) {
        let delay = engine.type_next_chunk(sink, &stop);
        activity.touch();

        if let Some(jitter) = &mut jitter {
            jitter.maybe_move(engine.chars_typed(), &stop, &mut jitter_rng);
        }

        let pct = engine.progress_percent();
        if opts.progress && pct >= last_reported_pct + 10 {
            eprintln!("Typing... {pct}%");
            last_reported_pct = pct - pct % 10;
        }

        if delay > 0 {
            sleep_interruptible(&stop, delay);
        }
    }

    done.store(true, Ordering::SeqCst);
    let _ = watchdog.join();
    if let Some(handle) = idle_scroller {
        let _ = handle.join();
    }

    sink.release_all_keys();

    let completed = !engine.has_more();
    let skipped = engine.skipped().clone();
    if !skipped.is_empty() {
        let preview: String = skipped.preview().iter().collect();
        warn!(
            count = skipped.count(),
            "skipped characters the backend cannot inject (e.g. {preview:?})"
        );
    }

    if opts.progress {
        eprintln!("{}", if completed { "Completed." } else { "Stopped." });
    }

    Ok(SessionOutcome {
        completed,
        chars_typed: engine.chars_typed(),
        skipped,
    })
}
