//! Property tests for the synchronous session and its timed components.

use std::time::Duration;

use pocketpet_core::config::SleepConfig;
use pocketpet_core::minigame::{plan, RouletteAction};
use pocketpet_core::pet::evaluate_death;
use pocketpet_core::timer::SleepCycle;
use pocketpet_core::{Config, DeathCause, Event, PetSession, Sector, Stat, StatSet, StatTarget};
use proptest::prelude::*;
use tokio::time::Instant;

fn session() -> PetSession {
    let mut cfg = Config::default();
    cfg.seed = Some(3);
    PetSession::new(cfg, Instant::now()).unwrap()
}

#[test]
fn all_punishment_hits_every_stat_at_distinct_times() {
    let mut s = session();
    s.drain_events();

    let sector = Sector {
        target: StatTarget::All,
        delta: -10.0,
    };
    let roulette = s.config().roulette.clone();
    let steps = plan(sector, &roulette);

    let commit_times: Vec<Duration> = steps
        .iter()
        .filter(|step| matches!(step.action, RouletteAction::Commit { .. }))
        .map(|step| step.at)
        .collect();
    assert_eq!(commit_times.len(), 4);
    assert!(commit_times.windows(2).all(|w| w[0] < w[1]));

    for step in &steps {
        s.roulette_step(step);
    }
    assert_eq!(s.stats(), StatSet::uniform(40.0));

    let changes: Vec<(Stat, f64)> = s
        .drain_events()
        .into_iter()
        .filter_map(|e| match e {
            Event::StatChanged { stat, delta, .. } => Some((stat, delta)),
            _ => None,
        })
        .collect();
    assert_eq!(
        changes,
        vec![
            (Stat::Hunger, -10.0),
            (Stat::Sleep, -10.0),
            (Stat::Hygiene, -10.0),
            (Stat::Happiness, -10.0),
        ]
    );
}

#[test]
fn awake_pet_with_empty_hunger_and_hygiene_starves() {
    let rules = Config::default().death;
    let stats = StatSet {
        hunger: 0.0,
        sleep: 50.0,
        hygiene: 0.0,
        happiness: 50.0,
    };
    assert_eq!(
        evaluate_death(&stats, false, &rules),
        Some(DeathCause::Starvation)
    );
    assert_eq!(evaluate_death(&stats, true, &rules), None);
}

proptest! {
    #[test]
    fn change_stat_always_clamps(
        changes in proptest::collection::vec((0usize..5, -150.0f64..150.0), 1..40)
    ) {
        let mut s = session();
        for (idx, delta) in changes {
            let target = if idx == 4 {
                StatTarget::All
            } else {
                StatTarget::One(Stat::ALL[idx])
            };
            let stats = s.change_stat(target, delta);
            for stat in Stat::ALL {
                prop_assert!((0.0..=100.0).contains(&stats.get(stat)));
            }
        }
    }

    #[test]
    fn sleep_converges_to_full(minutes in 0u32..90, gain in 0.5f64..10.0) {
        let cfg = SleepConfig {
            gain_per_minute: gain,
            oversleep_happiness_per_minute: 0.5,
            optimal_hours: 6.0,
            overtime_divisor_minutes: 6.0,
        };
        let t0 = Instant::now();
        let mut stats = StatSet::uniform(50.0);
        stats.set(Stat::Sleep, 0.0);
        let mut cycle = SleepCycle::new();
        cycle.begin(t0);

        let mut full_minutes = 0u32;
        for minute in 1..=minutes {
            if stats.sleep >= 100.0 {
                full_minutes += 1;
            }
            let now = t0 + Duration::from_secs(60) * minute;
            for (stat, delta) in cycle.minute(now, stats.sleep, &cfg) {
                stats.apply(stat, delta);
            }
        }

        let expected = (f64::from(minutes) * gain).min(100.0);
        prop_assert!((stats.sleep - expected).abs() < 1e-6);
        prop_assert!((stats.happiness - (50.0 - 0.5 * f64::from(full_minutes))).abs() < 1e-9);
    }
}
