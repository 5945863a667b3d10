use ghostwriter::dynamics::TypingDynamics;
use ghostwriter::profile::{DelayRange, TimingProfile};
use ghostwriter::rng::RandomSource;

fn dynamics_with(profile: TimingProfile, rng: &mut RandomSource) -> TypingDynamics {
    let delays = DelayRange {
        min_ms: 100,
        max_ms: 200,
    };
    TypingDynamics::new(profile, delays, rng)
}

#[test]
fn delay_is_always_within_hard_bounds() {
    let mut rng = RandomSource::seeded(1);
    let mut dynamics = dynamics_with(TimingProfile::human_advanced(), &mut rng);

    for i in 0..1000 {
        let sentence_end = i % 7 == 0;
        let burst = i % 3 == 0;
        let thinking = i % 11 == 0;
        let delay = dynamics.calculate_delay('a', sentence_end, burst, thinking, &mut rng);
        assert!(
            (15..=8000).contains(&delay),
            "delay {delay} outside [15, 8000]"
        );
        dynamics.update_state('a');
    }
}

#[test]
fn delay_bounds_hold_for_every_preset() {
    let presets = [
        TimingProfile::human_advanced(),
        TimingProfile::fast_human(),
        TimingProfile::slow_tired(),
        TimingProfile::professional(),
    ];

    let mut rng = RandomSource::seeded(2);
    for profile in presets {
        let mut dynamics = dynamics_with(profile, &mut rng);
        for _ in 0..250 {
            let delay = dynamics.calculate_delay('e', false, false, false, &mut rng);
            assert!((15..=8000).contains(&delay));
        }
    }
}

#[test]
fn hold_time_is_always_within_bounds() {
    let mut rng = RandomSource::seeded(3);
    let dynamics = dynamics_with(TimingProfile::human_advanced(), &mut rng);

    for _ in 0..1000 {
        let hold = dynamics.generate_hold_time('a', &mut rng);
        assert!((40..=180).contains(&hold), "hold {hold} outside [40, 180]");
    }
}

#[test]
fn uppercase_holds_longer_on_average() {
    let mut rng = RandomSource::seeded(4);
    let dynamics = dynamics_with(TimingProfile::human_advanced(), &mut rng);

    let samples = 300;
    let mut lower_sum = 0u64;
    let mut upper_sum = 0u64;
    for _ in 0..samples {
        lower_sum += dynamics.generate_hold_time('a', &mut rng);
        upper_sum += dynamics.generate_hold_time('A', &mut rng);
    }

    assert!(
        upper_sum > lower_sum,
        "uppercase mean hold ({upper_sum}) must exceed lowercase ({lower_sum})"
    );
}

#[test]
fn digraph_factors_match_the_heuristic_table() {
    let mut rng = RandomSource::seeded(5);
    let dynamics = dynamics_with(TimingProfile::human_advanced(), &mut rng);

    // Common English pair: fast.
    assert!(dynamics.digraph_factor('t', 'h') < 1.0);
    assert!(dynamics.digraph_factor('T', 'H') < 1.0);

    // Awkward reach: slow.
    assert!(dynamics.digraph_factor('q', 'z') > 1.0);
    assert!(dynamics.digraph_factor('z', 'q') > 1.0);
    assert!(dynamics.digraph_factor('p', 'q') > 1.0);

    // Different hands, no special case: neutral.
    assert_eq!(dynamics.digraph_factor('a', 'k'), 1.0);

    // Same hand: slightly slow.
    assert_eq!(dynamics.digraph_factor('a', 's'), 1.08);
    assert_eq!(dynamics.digraph_factor('j', 'k'), 1.08);
}

#[test]
fn burst_probability_zero_never_bursts() {
    let mut rng = RandomSource::seeded(6);
    let profile = TimingProfile {
        burst_prob: 0.0,
        ..TimingProfile::human_advanced()
    };
    let mut dynamics = dynamics_with(profile, &mut rng);

    for _ in 0..500 {
        assert!(!dynamics.should_burst(&mut rng));
    }
}

#[test]
fn burst_probability_one_always_bursts() {
    let mut rng = RandomSource::seeded(7);
    let profile = TimingProfile {
        burst_prob: 1.0,
        ..TimingProfile::human_advanced()
    };
    let mut dynamics = dynamics_with(profile, &mut rng);

    for _ in 0..500 {
        assert!(dynamics.should_burst(&mut rng));
    }
}

#[test]
fn thinking_pause_needs_enough_words() {
    let mut rng = RandomSource::seeded(8);
    let dynamics = dynamics_with(TimingProfile::human_advanced(), &mut rng);

    // Below the minimum threshold draw, a pause is impossible.
    for _ in 0..1000 {
        assert!(!dynamics.should_thinking_pause(5, &mut rng));
    }

    // Far past the maximum threshold draw, the 0.3 coin eventually lands.
    let fired = (0..1000).any(|_| dynamics.should_thinking_pause(100, &mut rng));
    assert!(fired, "a long stretch of words should eventually pause");
}

#[test]
fn reset_clears_fatigue() {
    let mut rng = RandomSource::seeded(9);
    let mut dynamics = dynamics_with(TimingProfile::human_advanced(), &mut rng);

    for _ in 0..500 {
        dynamics.update_state('x');
    }
    assert_eq!(dynamics.total_chars_typed(), 500);

    dynamics.reset(&mut rng);
    assert_eq!(dynamics.total_chars_typed(), 0);

    // Post-reset delays behave like a fresh session's.
    for _ in 0..100 {
        let delay = dynamics.calculate_delay('a', false, false, false, &mut rng);
        assert!((15..=8000).contains(&delay));
    }
}
