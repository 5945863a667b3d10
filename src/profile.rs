use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};

use crate::layout::LayoutKind;

/// Named timing configuration. Constructed once per session from a preset
/// and never mutated afterwards.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TimingProfile {
    pub base_speed_factor: f64,
    pub micro_stutter_prob: f64,
    pub idle_pause_prob: f64,
    pub burst_prob: f64,
    pub burst_min: u32,
    pub burst_max: u32,
    pub gamma_shape: f64,
    pub gamma_scale: f64,
    pub noise_level: f64,
}

impl TimingProfile {
    /// Default behavior: broadly varied timing with moderate stutter.
    pub fn human_advanced() -> Self {
        Self {
            base_speed_factor: 1.0,
            micro_stutter_prob: 0.1,
            idle_pause_prob: 0.009,
            burst_prob: 0.14,
            burst_min: 2,
            burst_max: 6,
            gamma_shape: 2.0,
            gamma_scale: 1.0,
            noise_level: 0.15,
        }
    }

    pub fn fast_human() -> Self {
        Self {
            base_speed_factor: 0.7,
            micro_stutter_prob: 0.06,
            idle_pause_prob: 0.004,
            burst_prob: 0.2,
            burst_min: 3,
            burst_max: 8,
            gamma_shape: 1.8,
            gamma_scale: 0.9,
            noise_level: 0.12,
        }
    }

    pub fn slow_tired() -> Self {
        Self {
            base_speed_factor: 1.5,
            micro_stutter_prob: 0.15,
            idle_pause_prob: 0.025,
            burst_prob: 0.08,
            burst_min: 2,
            burst_max: 4,
            gamma_shape: 2.5,
            gamma_scale: 1.3,
            noise_level: 0.22,
        }
    }

    pub fn professional() -> Self {
        Self {
            base_speed_factor: 0.75,
            micro_stutter_prob: 0.04,
            idle_pause_prob: 0.003,
            burst_prob: 0.25,
            burst_min: 4,
            burst_max: 10,
            gamma_shape: 1.6,
            gamma_scale: 0.85,
            noise_level: 0.08,
        }
    }
}

/// Floor/ceiling the base gamma draw is rescaled into, in milliseconds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DelayRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl Default for DelayRange {
    fn default() -> Self {
        Self {
            min_ms: 120,
            max_ms: 2000,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ImperfectionSettings {
    pub enable_typos: bool,
    pub typo_min: u32,
    pub typo_max: u32,

    pub enable_double_keys: bool,
    pub double_min: u32,
    pub double_max: u32,

    pub enable_auto_correction: bool,
    /// Chance (0-100) that an injected typo gets corrected.
    pub correction_probability: u32,
}

impl Default for ImperfectionSettings {
    fn default() -> Self {
        Self {
            enable_typos: true,
            typo_min: 300,
            typo_max: 500,
            enable_double_keys: true,
            double_min: 250,
            double_max: 400,
            enable_auto_correction: true,
            correction_probability: 15,
        }
    }
}

impl ImperfectionSettings {
    /// All imperfections off; `process_character` becomes the identity.
    pub fn disabled() -> Self {
        Self {
            enable_typos: false,
            enable_double_keys: false,
            enable_auto_correction: false,
            ..Self::default()
        }
    }
}

/// Everything a typing session is configured with. Validated once before
/// the session starts; constant afterwards.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SessionConfig {
    pub profile: TimingProfile,
    pub delays: DelayRange,
    pub imperfections: ImperfectionSettings,
    pub layout: LayoutKind,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            profile: TimingProfile::human_advanced(),
            delays: DelayRange::default(),
            imperfections: ImperfectionSettings::default(),
            layout: LayoutKind::UsQwerty,
        }
    }
}

pub fn validate_config(cfg: &SessionConfig) -> Result<()> {
    ensure!(
        cfg.delays.min_ms <= cfg.delays.max_ms,
        "min delay must be <= max delay"
    );

    ensure!(
        cfg.profile.gamma_shape > 0.0 && cfg.profile.gamma_scale > 0.0,
        "gamma shape and scale must be > 0"
    );
    ensure!(
        (0.0..=1.0).contains(&cfg.profile.micro_stutter_prob),
        "micro stutter probability must be between 0.0 and 1.0"
    );
    ensure!(
        (0.0..=1.0).contains(&cfg.profile.burst_prob),
        "burst probability must be between 0.0 and 1.0"
    );
    ensure!(
        cfg.profile.burst_min <= cfg.profile.burst_max,
        "burst_min must be <= burst_max"
    );
    ensure!(cfg.profile.noise_level >= 0.0, "noise level must be >= 0");

    let imp = &cfg.imperfections;
    ensure!(imp.typo_min <= imp.typo_max, "typo_min must be <= typo_max");
    ensure!(
        imp.double_min <= imp.double_max,
        "double_min must be <= double_max"
    );
    ensure!(
        imp.correction_probability <= 100,
        "correction probability is a percentage (0-100)"
    );

    Ok(())
}
