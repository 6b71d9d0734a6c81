//! The signal controller: one state machine per junction plus the
//! preemption override overlay.

use log::debug;
use rustc_hash::FxHashMap;

use gw_core::{JunctionId, SimRng};

use crate::{CycleConfig, Phase, SignalState, Tier, TierPartition, TierPolicy, TimingProfile};

// ── Overrides ─────────────────────────────────────────────────────────────────

/// What installed an override.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OverrideKind {
    /// Pre-pass forcing from [`SignalController::apply_tier`] (immediate band).
    Tier(Tier),
    /// Post-pass timing swap from [`SignalController::on_pass`].
    Swap,
}

/// A transient forced signal state for one junction.
///
/// While active it replaces the effective phase/timer observed by consumers;
/// the junction's underlying cycle is frozen.  Removal happens automatically
/// when `ticks_remaining` reaches zero.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PreemptionOverride {
    /// Effective state of the selected approach.
    pub forced: SignalState,
    /// Reported state of the cross streets (export only).
    pub others: SignalState,
    pub kind: OverrideKind,
    pub ticks_remaining: u32,
}

// ── SignalController ──────────────────────────────────────────────────────────

/// Owns every junction's signal state machine and the override overlay.
///
/// # Precedence
///
/// A swap override replaces any tier override on the same junction, and a
/// tier application never displaces an active swap: the swap models the
/// junction *after* the vehicle passed, which moots approach preparation.
pub struct SignalController {
    cycle: CycleConfig,
    /// Free-running cycle state per junction.  Frozen while overridden.
    base: Vec<SignalState>,
    /// Selected-approach durations; tier application scales these and the
    /// cycle reset reads them.
    selected: Vec<TimingProfile>,
    /// Cross-street durations — shape reported values only.
    others: Vec<TimingProfile>,
    overrides: FxHashMap<JunctionId, PreemptionOverride>,
}

impl SignalController {
    /// All junctions start RED with a full red timer.
    pub fn new(junction_count: usize, cycle: CycleConfig) -> Self {
        let base = vec![SignalState::new(Phase::Red, cycle.red); junction_count];
        Self::with_states(base, cycle)
    }

    /// Start from explicit per-junction states (e.g. decoded signal records).
    /// Timers are clamped to the state's phase duration.
    pub fn with_states(states: Vec<SignalState>, cycle: CycleConfig) -> Self {
        let profile = TimingProfile::from(cycle);
        let base = states
            .into_iter()
            .map(|s| SignalState::new(s.phase, s.timer.min(profile.duration(s.phase))))
            .collect::<Vec<_>>();
        let n = base.len();
        Self {
            cycle,
            base,
            selected: vec![profile; n],
            others: vec![profile; n],
            overrides: FxHashMap::default(),
        }
    }

    /// Randomized initial states — uniform phase, timer in `1..=duration` —
    /// so junctions don't transition in lockstep.
    pub fn with_random_offsets(junction_count: usize, cycle: CycleConfig, rng: &mut SimRng) -> Self {
        let states = (0..junction_count)
            .map(|_| {
                let phase = *rng
                    .choose(&[Phase::Red, Phase::Green, Phase::Yellow])
                    .unwrap_or(&Phase::Red);
                let timer = rng.gen_range(1..=cycle.duration(phase).max(1));
                SignalState::new(phase, timer)
            })
            .collect();
        Self::with_states(states, cycle)
    }

    pub fn junction_count(&self) -> usize {
        self.base.len()
    }

    pub fn cycle(&self) -> CycleConfig {
        self.cycle
    }

    /// The effective selected-approach state: the override if one is active,
    /// otherwise the free-running cycle state.
    #[inline]
    pub fn effective(&self, junction: JunctionId) -> SignalState {
        match self.overrides.get(&junction) {
            Some(ov) => ov.forced,
            None => self.base[junction.index()],
        }
    }

    /// The reported cross-street state.  Diverges from the selected approach
    /// only under an override (only the approach direction is modeled).
    #[inline]
    pub fn others_effective(&self, junction: JunctionId) -> SignalState {
        match self.overrides.get(&junction) {
            Some(ov) => ov.others,
            None => self.base[junction.index()],
        }
    }

    /// The active override on `junction`, if any.
    pub fn override_on(&self, junction: JunctionId) -> Option<&PreemptionOverride> {
        self.overrides.get(&junction)
    }

    /// Selected-approach timing profile for `junction`.
    pub fn profile(&self, junction: JunctionId) -> TimingProfile {
        self.selected[junction.index()]
    }

    // ── Tick advancement ──────────────────────────────────────────────────

    /// Advance every junction by one tick.
    ///
    /// Overridden junctions count their override down (the cycle stays
    /// frozen); all others run the cycle FSM: a timer that was 0 at the
    /// start of the tick fires the transition and reloads from the
    /// junction's selected profile, otherwise the timer decrements.
    pub fn advance_all(&mut self) {
        for index in 0..self.base.len() {
            let junction = JunctionId(index as u32);

            if let Some(ov) = self.overrides.get_mut(&junction) {
                ov.forced.timer = ov.forced.timer.saturating_sub(1);
                ov.others.timer = ov.others.timer.saturating_sub(1);
                ov.ticks_remaining -= 1;
                let expired = ov.ticks_remaining == 0;
                if expired {
                    self.overrides.remove(&junction);
                }
                continue;
            }

            let state = &mut self.base[index];
            if state.timer == 0 {
                state.phase = state.phase.next();
                state.timer = self.selected[index].duration(state.phase);
            } else {
                state.timer -= 1;
            }
        }
    }

    // ── Preemption ────────────────────────────────────────────────────────

    /// Apply the tiered preemption policy along `route`.
    ///
    /// Immediate band: selected green × `immediate_green_scale`, red ×
    /// `immediate_red_scale`, a forced-GREEN override installed for the
    /// extended green, cross streets reported red until passage.  Boosted
    /// band: green up / red down, others' green halved.  Trailing band:
    /// red reduction only.  Returns the partition so callers can flag
    /// degenerate routes.
    pub fn apply_tier(&mut self, route: &[JunctionId], policy: &TierPolicy) -> TierPartition {
        let partition = TierPartition::for_len(route.len());
        if partition.degenerate {
            debug!("degenerate tier partition for route of length {}", route.len());
        }

        for (position, &junction) in route.iter().enumerate() {
            let i = junction.index();
            match partition.tier_of(position) {
                Tier::Immediate => {
                    self.selected[i].green = scale_min1(self.cycle.green, policy.immediate_green_scale);
                    self.selected[i].red = scale_min1(self.cycle.red, policy.immediate_red_scale);
                    // Cross streets stay red until the agent passes.
                    self.others[i].green = 0;

                    let forced_green = self.selected[i].green;
                    self.install(junction, PreemptionOverride {
                        forced: SignalState::new(Phase::Green, forced_green),
                        others: SignalState::new(Phase::Red, self.cycle.red),
                        kind: OverrideKind::Tier(Tier::Immediate),
                        ticks_remaining: forced_green as u32,
                    });
                }
                Tier::Boosted => {
                    self.selected[i].green = scale_min1(self.cycle.green, policy.boosted_green_scale);
                    self.selected[i].red = scale_min1(self.cycle.red, policy.boosted_red_scale);
                    self.others[i].green =
                        scale(self.cycle.green, policy.boosted_others_green_scale);
                }
                Tier::Trailing => {
                    self.selected[i].red = scale_min1(self.cycle.red, policy.trailing_red_scale);
                }
            }
        }
        partition
    }

    /// Restore base profiles for a route being abandoned (replan) and drop
    /// its tier overrides.  Swap overrides survive — they model junctions
    /// already passed.
    pub fn reset_route(&mut self, route: &[JunctionId]) {
        let profile = TimingProfile::from(self.cycle);
        for &junction in route {
            self.selected[junction.index()] = profile;
            self.others[junction.index()] = profile;
            if matches!(
                self.overrides.get(&junction),
                Some(ov) if matches!(ov.kind, OverrideKind::Tier(_))
            ) {
                self.overrides.remove(&junction);
            }
        }
    }

    /// Post-pass swap: exchange selected and cross-street timings for one
    /// full base cycle.  The selected approach shows GREEN with the others'
    /// green duration; the cross streets report RED holding the selected
    /// green.  Replaces any tier override (see precedence above).
    pub fn on_pass(&mut self, junction: JunctionId) {
        let i = junction.index();
        let swap = PreemptionOverride {
            forced: SignalState::new(Phase::Green, self.others[i].green),
            others: SignalState::new(Phase::Red, self.selected[i].green),
            kind: OverrideKind::Swap,
            ticks_remaining: self.cycle.total(),
        };
        self.overrides.insert(junction, swap);
    }

    // ── Internals ─────────────────────────────────────────────────────────

    /// Install a tier override, honoring swap precedence.
    fn install(&mut self, junction: JunctionId, ov: PreemptionOverride) {
        if matches!(
            self.overrides.get(&junction),
            Some(existing) if existing.kind == OverrideKind::Swap
        ) {
            return;
        }
        self.overrides.insert(junction, ov);
    }
}

/// Scale a duration, flooring at 1 tick (selected-approach timings never
/// vanish entirely).
#[inline]
fn scale_min1(base: u16, factor: f64) -> u16 {
    ((base as f64 * factor) as u16).max(1)
}

/// Scale a duration, allowing zero (cross-street green may be cut to
/// nothing).
#[inline]
fn scale(base: u16, factor: f64) -> u16 {
    (base as f64 * factor) as u16
}
