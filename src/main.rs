use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{ensure, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};

use ghostwriter::backends::{self, BackendKind};
use ghostwriter::layout::LayoutKind;
use ghostwriter::profile::{DelayRange, ImperfectionSettings, SessionConfig, TimingProfile};
use ghostwriter::rng::RandomSource;
use ghostwriter::runner::{self, SessionOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ProfileArg {
    /// Broadly varied human timing (default).
    Human,
    /// Fast typist: shorter delays, frequent bursts.
    Fast,
    /// Slow and tired: long delays, heavy stutter.
    Tired,
    /// Professional: fast, steady, long bursts.
    Professional,
}

impl ProfileArg {
    fn to_library(self) -> TimingProfile {
        match self {
            ProfileArg::Human => TimingProfile::human_advanced(),
            ProfileArg::Fast => TimingProfile::fast_human(),
            ProfileArg::Tired => TimingProfile::slow_tired(),
            ProfileArg::Professional => TimingProfile::professional(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LayoutArg {
    /// US QWERTY
    Us,
    /// UK QWERTY
    Uk,
    /// German QWERTZ
    De,
    /// French AZERTY
    Fr,
}

impl LayoutArg {
    fn to_library(self) -> LayoutKind {
        match self {
            LayoutArg::Us => LayoutKind::UsQwerty,
            LayoutArg::Uk => LayoutKind::UkQwerty,
            LayoutArg::De => LayoutKind::Qwertz,
            LayoutArg::Fr => LayoutKind::Azerty,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum BackendArg {
    /// Choose a backend based on the runtime environment
    Auto,
    /// Force X11 injection (XTEST)
    X11,
    /// Force the external ydotool helper
    Ydotool,
}

impl BackendArg {
    fn to_library(self) -> BackendKind {
        match self {
            BackendArg::Auto => BackendKind::Auto,
            BackendArg::X11 => BackendKind::X11,
            BackendArg::Ydotool => BackendKind::Ydotool,
        }
    }
}

#[derive(Debug, Args, Clone)]
struct TypingArgs {
    /// Timing profile preset.
    #[arg(long, value_enum, default_value_t = ProfileArg::Human)]
    profile: ProfileArg,

    /// Keyboard layout used for neighbor-key typos.
    #[arg(long, value_enum, default_value_t = LayoutArg::Us)]
    layout: LayoutArg,

    /// Base delay floor in ms.
    #[arg(long, default_value_t = 120)]
    min_delay: u64,

    /// Base delay ceiling in ms.
    #[arg(long, default_value_t = 2000)]
    max_delay: u64,

    /// Disable neighbor-key typos.
    #[arg(long)]
    no_typos: bool,

    /// Typo cadence lower bound (characters).
    #[arg(long, default_value_t = 300)]
    typo_min: u32,

    /// Typo cadence upper bound (characters).
    #[arg(long, default_value_t = 500)]
    typo_max: u32,

    /// Disable double-key bounces.
    #[arg(long)]
    no_double_keys: bool,

    /// Double-key cadence lower bound (characters).
    #[arg(long, default_value_t = 250)]
    double_min: u32,

    /// Double-key cadence upper bound (characters).
    #[arg(long, default_value_t = 400)]
    double_max: u32,

    /// Disable self-correction of injected typos.
    #[arg(long)]
    no_correction: bool,

    /// Chance (%) that an injected typo gets corrected.
    #[arg(long, default_value_t = 15, value_parser = clap::value_parser!(u32).range(0..=100))]
    correction_chance: u32,

    /// Injection backend.
    #[arg(long, value_enum, default_value_t = BackendArg::Auto)]
    backend: BackendArg,

    /// Countdown seconds before typing starts.
    #[arg(long, default_value_t = 5)]
    countdown: u64,
}

impl TypingArgs {
    fn to_config(&self) -> SessionConfig {
        SessionConfig {
            profile: self.profile.to_library(),
            delays: DelayRange {
                min_ms: self.min_delay,
                max_ms: self.max_delay,
            },
            imperfections: ImperfectionSettings {
                enable_typos: !self.no_typos,
                typo_min: self.typo_min,
                typo_max: self.typo_max,
                enable_double_keys: !self.no_double_keys,
                double_min: self.double_min,
                double_max: self.double_max,
                enable_auto_correction: !self.no_correction,
                correction_probability: self.correction_chance,
            },
            layout: self.layout.to_library(),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "ghostwriter")]
#[command(about = "Human-like typing simulator with local and remote injection", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Type a text file into the currently focused window
    Type {
        /// Input text file, or '-' for stdin
        #[arg(short = 'i', long, value_name = "PATH")]
        input: PathBuf,

        #[command(flatten)]
        typing: TypingArgs,

        /// Optional RNG seed (for debugging)
        #[arg(long)]
        seed: Option<u64>,

        /// Nudge the mouse a few pixels every so often while typing
        #[arg(long)]
        mouse_jitter: bool,

        /// Scroll a little after 30s without typing activity
        #[arg(long)]
        idle_scroll: bool,
    },

    /// Connect to a controller and type on its behalf
    #[cfg(feature = "net")]
    Agent {
        /// Controller WebSocket URL, e.g. ws://192.168.1.10:9999
        #[arg(long, value_name = "URL")]
        connect: String,

        #[command(flatten)]
        typing: TypingArgs,
    },

    /// Run a controller that dispatches text to connected agents
    #[cfg(feature = "net")]
    Serve {
        /// Listen address.
        #[arg(long, default_value = "0.0.0.0:9999")]
        bind: String,

        /// Input text file, or '-' for stdin
        #[arg(short = 'i', long, value_name = "PATH")]
        input: PathBuf,

        /// Base delay floor sent to agents, in ms.
        #[arg(long, default_value_t = 120)]
        min_delay: u64,

        /// Base delay ceiling sent to agents, in ms.
        #[arg(long, default_value_t = 2000)]
        max_delay: u64,

        /// Ask agents to jitter the mouse while typing.
        #[arg(long)]
        mouse_movement: bool,

        /// Ask agents to scroll when idle.
        #[arg(long)]
        idle_scroll: bool,
    },
}

fn read_input(path: &PathBuf) -> Result<String> {
    let text = if path.as_os_str() == std::ffi::OsStr::new("-") {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        buf
    } else {
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?
    };

    ensure!(!text.is_empty(), "input text is empty");
    Ok(text)
}

fn install_stop_handler() -> Result<Arc<AtomicBool>> {
    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = stop.clone();
        ctrlc::set_handler(move || {
            stop.store(true, Ordering::SeqCst);
        })
        .context("failed to install Ctrl+C handler")?;
    }
    Ok(stop)
}

fn run_type(
    input: PathBuf,
    typing: TypingArgs,
    seed: Option<u64>,
    mouse_jitter: bool,
    idle_scroll: bool,
) -> Result<()> {
    let text = read_input(&input)?;
    eprintln!(
        "Loaded {} characters from {}",
        text.chars().count(),
        input.display()
    );

    let cfg = typing.to_config();
    let backend = typing.backend.to_library();

    let mut sink = backends::create_sink(backend)?;
    let jitter_mouse = if mouse_jitter {
        backends::create_mouse(backend)?
    } else {
        None
    };
    let idle_mouse = if idle_scroll {
        backends::create_mouse(backend)?
    } else {
        None
    };

    let stop = install_stop_handler()?;
    let opts = SessionOptions {
        countdown_secs: typing.countdown,
        progress: true,
    };

    runner::run_session(
        &text,
        &cfg,
        RandomSource::from_seed_opt(seed),
        sink.as_mut(),
        jitter_mouse,
        idle_mouse,
        stop,
        &opts,
    )?;

    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Type {
            input,
            typing,
            seed,
            mouse_jitter,
            idle_scroll,
        } => run_type(input, typing, seed, mouse_jitter, idle_scroll),

        #[cfg(feature = "net")]
        Command::Agent { connect, typing } => {
            let opts = ghostwriter::net::agent::AgentOptions {
                backend: typing.backend.to_library(),
                config: typing.to_config(),
                countdown_secs: typing.countdown,
            };

            let runtime =
                tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
            runtime.block_on(ghostwriter::net::agent::run_agent(&connect, opts))
        }

        #[cfg(feature = "net")]
        Command::Serve {
            bind,
            input,
            min_delay,
            max_delay,
            mouse_movement,
            idle_scroll,
        } => {
            let text = read_input(&input)?;
            let settings = ghostwriter::net::controller::ControllerSettings {
                text,
                min_delay,
                max_delay,
                mouse_movement,
                idle_scroll,
            };

            let runtime =
                tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
            runtime.block_on(ghostwriter::net::controller::run_controller(&bind, settings))
        }
    }
}
