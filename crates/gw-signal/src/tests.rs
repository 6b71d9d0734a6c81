//! Unit tests for gw-signal.

mod phase {
    use crate::Phase;

    #[test]
    fn cycle_order() {
        assert_eq!(Phase::Red.next(), Phase::Green);
        assert_eq!(Phase::Green.next(), Phase::Yellow);
        assert_eq!(Phase::Yellow.next(), Phase::Red);
    }

    #[test]
    fn wire_codes_roundtrip() {
        for phase in [Phase::Red, Phase::Green, Phase::Yellow] {
            assert_eq!(Phase::from_code(phase.code()), Some(phase));
        }
        assert_eq!(Phase::from_code(3), None);
    }
}

mod partition {
    use crate::TierPartition;

    #[test]
    fn length_seven_splits_1_3_3() {
        let p = TierPartition::for_len(7);
        assert_eq!((p.n1, p.n2, p.n3), (1, 3, 3));
        assert!(!p.degenerate);
    }

    #[test]
    fn invariants_hold_for_all_viable_lengths() {
        for len in 4..=400 {
            let p = TierPartition::for_len(len);
            assert!(p.n1 >= 1, "len {len}: n1 = {}", p.n1);
            assert!(p.n2 >= 3, "len {len}: n2 = {}", p.n2);
            assert_eq!(p.len(), len, "len {len}: partition must cover the route");
            assert!(!p.degenerate, "len {len} should not be degenerate");
        }
    }

    #[test]
    fn short_routes_clamp_and_flag() {
        for len in 1..4 {
            let p = TierPartition::for_len(len);
            assert!(p.degenerate, "len {len} must be flagged");
            assert_eq!(p.len(), len);
            assert!(p.n1 >= 1);
        }
    }

    #[test]
    fn tier_of_bands() {
        let p = TierPartition::for_len(10); // (2, 4, 4)
        assert_eq!((p.n1, p.n2, p.n3), (2, 4, 4));
        use crate::Tier::*;
        assert_eq!(p.tier_of(0), Immediate);
        assert_eq!(p.tier_of(1), Immediate);
        assert_eq!(p.tier_of(2), Boosted);
        assert_eq!(p.tier_of(5), Boosted);
        assert_eq!(p.tier_of(6), Trailing);
        assert_eq!(p.tier_of(9), Trailing);
    }
}

mod cycle_fsm {
    use gw_core::SimRng;

    use crate::{CycleConfig, Phase, SignalController, SignalState};

    #[test]
    fn timer_zero_fires_transition_with_profile_reload() {
        let cycle = CycleConfig { green: 6, yellow: 2, red: 4 };
        let mut ctl = SignalController::with_states(
            vec![SignalState::new(Phase::Red, 0)],
            cycle,
        );
        ctl.advance_all();
        let s = ctl.effective(gw_core::JunctionId(0));
        assert_eq!(s.phase, Phase::Green);
        assert_eq!(s.timer, 6);
    }

    #[test]
    fn nonzero_timer_only_decrements() {
        let cycle = CycleConfig::default();
        let mut ctl = SignalController::with_states(
            vec![SignalState::new(Phase::Yellow, 3)],
            cycle,
        );
        ctl.advance_all();
        let s = ctl.effective(gw_core::JunctionId(0));
        assert_eq!(s.phase, Phase::Yellow);
        assert_eq!(s.timer, 2);
    }

    #[test]
    fn cycle_invariant_over_many_ticks() {
        let cycle = CycleConfig { green: 6, yellow: 2, red: 4 };
        let mut rng = SimRng::new(99);
        let mut ctl = SignalController::with_random_offsets(16, cycle, &mut rng);

        let mut prev: Vec<SignalState> =
            (0..16).map(|i| ctl.effective(gw_core::JunctionId(i))).collect();

        for _ in 0..200 {
            ctl.advance_all();
            for i in 0..16u32 {
                let j = gw_core::JunctionId(i);
                let s = ctl.effective(j);
                if prev[i as usize].timer == 0 {
                    assert_eq!(s.phase, prev[i as usize].phase.next());
                    assert_eq!(s.timer, ctl.profile(j).duration(s.phase));
                } else {
                    assert_eq!(s.phase, prev[i as usize].phase);
                    assert_eq!(s.timer, prev[i as usize].timer - 1);
                }
                prev[i as usize] = s;
            }
        }
    }

    #[test]
    fn random_offsets_respect_phase_durations() {
        let cycle = CycleConfig::default();
        let mut rng = SimRng::new(7);
        let ctl = SignalController::with_random_offsets(64, cycle, &mut rng);
        for i in 0..64u32 {
            let s = ctl.effective(gw_core::JunctionId(i));
            assert!(s.timer >= 1);
            assert!(s.timer <= cycle.duration(s.phase));
        }
    }
}

mod preemption {
    use gw_core::JunctionId;

    use crate::{
        CycleConfig, OverrideKind, Phase, SignalController, SignalState, Tier, TierPolicy,
    };

    fn route_7() -> Vec<JunctionId> {
        (0..7).map(JunctionId).collect()
    }

    fn controller(n: usize) -> SignalController {
        SignalController::new(n, CycleConfig::default())
    }

    #[test]
    fn immediate_band_forced_green_double_time() {
        let mut ctl = controller(7);
        let partition = ctl.apply_tier(&route_7(), &TierPolicy::default());
        assert_eq!((partition.n1, partition.n2, partition.n3), (1, 3, 3));

        // Junction 0 is tier 1: forced GREEN with 2× the configured green.
        let s = ctl.effective(JunctionId(0));
        assert_eq!(s.phase, Phase::Green);
        assert_eq!(s.timer, 120);
        assert!(matches!(
            ctl.override_on(JunctionId(0)).unwrap().kind,
            OverrideKind::Tier(Tier::Immediate)
        ));
        // Cross streets report red until passage.
        assert_eq!(ctl.others_effective(JunctionId(0)).phase, Phase::Red);
    }

    #[test]
    fn boosted_and_trailing_scale_profiles_without_forcing() {
        let mut ctl = controller(7);
        ctl.apply_tier(&route_7(), &TierPolicy::default());

        // Junction 1 is tier 2: green 1.5×, red 0.5×; no override installed.
        let p1 = ctl.profile(JunctionId(1));
        assert_eq!(p1.green, 90);
        assert_eq!(p1.red, 15);
        assert!(ctl.override_on(JunctionId(1)).is_none());

        // Junction 6 is tier 3: red 0.6× only.
        let p6 = ctl.profile(JunctionId(6));
        assert_eq!(p6.red, 18);
        assert_eq!(p6.green, 60);
    }

    #[test]
    fn scaled_profile_drives_the_cycle_reload() {
        let mut ctl = SignalController::with_states(
            vec![SignalState::new(Phase::Yellow, 0); 7],
            CycleConfig::default(),
        );
        ctl.apply_tier(&route_7(), &TierPolicy::default());
        // Junction 6 transitions YELLOW→RED and reloads the *scaled* red.
        ctl.advance_all();
        let s = ctl.effective(JunctionId(6));
        assert_eq!(s.phase, Phase::Red);
        assert_eq!(s.timer, 18);
    }

    #[test]
    fn swap_holds_for_one_cycle_then_cycle_resumes() {
        let cycle = CycleConfig { green: 6, yellow: 2, red: 4 };
        let mut ctl = SignalController::with_states(
            vec![SignalState::new(Phase::Red, 3); 1],
            cycle,
        );
        let j = JunctionId(0);
        ctl.on_pass(j);

        let swapped = ctl.effective(j);
        assert_eq!(swapped.phase, Phase::Green);
        assert_eq!(swapped.timer, cycle.green, "selected shows the others' green");
        assert_eq!(ctl.others_effective(j).timer, cycle.green);

        for _ in 0..cycle.total() {
            assert!(ctl.override_on(j).is_some());
            ctl.advance_all();
        }
        // Swap expired; the frozen base state resumes untouched.
        assert!(ctl.override_on(j).is_none());
        assert_eq!(ctl.effective(j), SignalState::new(Phase::Red, 3));
    }

    #[test]
    fn swap_overrides_tier_and_resists_reapplication() {
        let mut ctl = controller(7);
        let route = route_7();
        ctl.apply_tier(&route, &TierPolicy::default());
        assert!(matches!(
            ctl.override_on(JunctionId(0)).unwrap().kind,
            OverrideKind::Tier(_)
        ));

        // Passage swaps junction 0 even though a tier override was active.
        ctl.on_pass(JunctionId(0));
        assert_eq!(ctl.override_on(JunctionId(0)).unwrap().kind, OverrideKind::Swap);

        // A later tier application (replan) must not displace the swap.
        ctl.apply_tier(&route, &TierPolicy::default());
        assert_eq!(ctl.override_on(JunctionId(0)).unwrap().kind, OverrideKind::Swap);
    }

    #[test]
    fn reset_route_restores_profiles_and_keeps_swaps() {
        let mut ctl = controller(7);
        let route = route_7();
        ctl.apply_tier(&route, &TierPolicy::default());
        ctl.on_pass(JunctionId(2));

        ctl.reset_route(&route);

        let base = crate::TimingProfile::from(CycleConfig::default());
        for &j in &route {
            assert_eq!(ctl.profile(j), base);
        }
        assert!(ctl.override_on(JunctionId(0)).is_none(), "tier override dropped");
        assert_eq!(ctl.override_on(JunctionId(2)).unwrap().kind, OverrideKind::Swap);
    }

    #[test]
    fn degenerate_partition_reported_for_direct_fallback_routes() {
        let mut ctl = controller(2);
        let partition = ctl.apply_tier(&[JunctionId(0), JunctionId(1)], &TierPolicy::default());
        assert!(partition.degenerate);
        assert_eq!(partition.len(), 2);
    }
}
