//! Background traffic seeding (the "stage-0" arrival simulation).
//!
//! Before a run, a fixed fleet is spread over a sampled subset of active
//! junctions and a short warm-up loop lets arrivals and green-phase
//! departures shape the distribution.  This shares the congestion model
//! with routing but is otherwise independent of it.

use log::info;

use gw_core::{JunctionId, SimRng};
use gw_signal::{Phase, SignalController};

use crate::CongestionModel;

/// Parameters for fleet distribution and warm-up.
#[derive(Debug, Clone, Copy)]
pub struct SeedConfig {
    /// Total vehicles to distribute.
    pub total_vehicles: u32,
    /// Minimum vehicles per active junction; also sets how many junctions
    /// become active (`total / min`).
    pub min_per_junction: u32,
    /// Warm-up loop length in ticks.
    pub warmup_ticks: u32,
    /// Per-tick arrival probability per active junction.
    pub arrival_probability: f64,
    /// Vehicles departing per tick while the junction shows green.
    pub departures_when_green: u32,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            total_vehicles: 5_000,
            min_per_junction: 50,
            warmup_ticks: 300,
            arrival_probability: 0.5,
            departures_when_green: 2,
        }
    }
}

/// Distribute the fleet across a random sample of active junctions.
///
/// `K = min(N, total / min_per_junction)` junctions are sampled; each gets at
/// least the minimum, a proportional scale-down reconciles overshoot, and any
/// remainder spreads round-robin.  Returns the active junctions in ascending
/// index order.
pub fn distribute_fleet(
    model: &mut CongestionModel,
    config: &SeedConfig,
    rng: &mut SimRng,
) -> Vec<JunctionId> {
    let n = model.junction_count();
    if n == 0 || config.total_vehicles == 0 {
        return Vec::new();
    }

    let k = ((config.total_vehicles / config.min_per_junction.max(1)) as usize)
        .clamp(1, n);

    let mut indices: Vec<u32> = (0..n as u32).collect();
    rng.shuffle(&mut indices);
    indices.truncate(k);
    indices.sort_unstable();
    let active: Vec<JunctionId> = indices.into_iter().map(JunctionId).collect();

    let base = config.total_vehicles / k as u32;
    let mut counts = vec![base.max(config.min_per_junction); k];

    let mut sum: u32 = counts.iter().sum();
    if sum > config.total_vehicles {
        let scale = config.total_vehicles as f64 / sum as f64;
        for c in &mut counts {
            *c = ((*c as f64 * scale) as u32).max(config.min_per_junction);
        }
        sum = counts.iter().sum();
    }

    let mut remainder = config.total_vehicles.saturating_sub(sum);
    let mut i = 0usize;
    while remainder > 0 {
        counts[i % k] += 1;
        remainder -= 1;
        i += 1;
    }

    for (&junction, &count) in active.iter().zip(&counts) {
        for _ in 0..count {
            model.increment_on_arrival(junction);
        }
    }

    info!(
        "seeded {} vehicles over {k} active junction(s)",
        model.total()
    );
    active
}

/// Run the warm-up loop: per tick, Bernoulli arrivals at each active
/// junction, bounded departures where the effective phase is green, then one
/// signal tick for every junction.
pub fn warm_up(
    model: &mut CongestionModel,
    signals: &mut SignalController,
    active: &[JunctionId],
    config: &SeedConfig,
    rng: &mut SimRng,
) {
    for _ in 0..config.warmup_ticks {
        for &junction in active {
            if rng.gen_bool(config.arrival_probability) {
                model.increment_on_arrival(junction);
            }
            if signals.effective(junction).phase == Phase::Green {
                for _ in 0..config.departures_when_green {
                    model.decrement_on_pass(junction);
                }
            }
        }
        signals.advance_all();
    }
}
