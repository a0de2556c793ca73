//! Integration tests for evac-sim.

use evac_agent::{EvacuatingAgent, Lifecycle, Profile};
use evac_core::{BehaviorParams, Cell, EvacConfig, ExitId, ExitLayout, Tick};
use evac_spatial::Occupant;

use crate::{
    ClosureReport, EngineBuilder, EngineObserver, ExitEvent, NoopObserver, ScenarioController,
    SimError, TickStats, run,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

/// 20×20 room, 50 people, 2 exits.
fn small_config(seed: u64) -> EvacConfig {
    EvacConfig { seed, ..EvacConfig::default() }
}

/// Calm agents, nearest exit always wins, no congestion term.
fn deterministic_behavior() -> BehaviorParams {
    BehaviorParams {
        softmax_temperature: 0.01,
        congestion_weight: 0.0,
        ..BehaviorParams::default()
    }
}

/// Everybody packed around the single exit of a 9×9 room at (4, 0).
fn crowd_at_exit(population: usize, exits: ExitLayout) -> EvacConfig {
    EvacConfig {
        width: 9,
        height: 9,
        population,
        exits,
        max_steps: 10_000,
        ..EvacConfig::default()
    }
}

fn around_exit(population: usize) -> Vec<Cell> {
    let ring = [
        Cell::new(3, 0),
        Cell::new(5, 0),
        Cell::new(3, 1),
        Cell::new(4, 1),
        Cell::new(5, 1),
    ];
    (0..population).map(|i| ring[i % ring.len()]).collect()
}

#[derive(Default)]
struct Recorder {
    ticks:       u64,
    evacuations: Vec<ExitEvent>,
    closures:    Vec<ClosureReport>,
    last:        Option<TickStats>,
    ended_at:    Option<Tick>,
}

impl EngineObserver for Recorder {
    fn on_tick_end(&mut self, stats: &TickStats) {
        self.ticks += 1;
        self.last = Some(*stats);
    }

    fn on_evacuation(&mut self, event: &ExitEvent, agent: &EvacuatingAgent) {
        assert_eq!(agent.id, event.agent);
        assert_eq!(agent.state, Lifecycle::Evacuated);
        assert_eq!(agent.exit_time, Some(event.time_secs));
        self.evacuations.push(*event);
    }

    fn on_exit_closed(&mut self, report: &ClosureReport) {
        self.closures.push(*report);
    }

    fn on_run_end(&mut self, final_tick: Tick) {
        self.ended_at = Some(final_tick);
    }
}

// ── Builder ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod builder_tests {
    use super::*;

    #[test]
    fn places_everybody_on_free_cells() {
        let engine = EngineBuilder::new(small_config(3)).build().unwrap();
        assert_eq!(engine.roster().active_count(), 50);
        assert_eq!(engine.grid().len(), 50 + 2);
        for agent in engine.roster().active() {
            assert!(engine.topology().is_free(agent.cell));
            assert_eq!(engine.grid().position(Occupant::Person(agent.id)), Some(agent.cell));
        }
        assert!(engine.is_running());
    }

    #[test]
    fn gates_follow_exit_widths() {
        let cfg = EvacConfig { exits: ExitLayout::Widths(vec![1.0, 2.5]), ..small_config(1) };
        let engine = EngineBuilder::new(cfg).build().unwrap();
        let caps: Vec<f64> = engine.gates().map(|g| g.capacity_ps).collect();
        assert!((caps[0] - 1.3).abs() < 1e-12);
        assert!((caps[1] - 3.25).abs() < 1e-12);
    }

    #[test]
    fn invalid_config_is_rejected_before_building() {
        let cfg = EvacConfig { population: 0, ..small_config(1) };
        assert!(matches!(EngineBuilder::new(cfg).build(), Err(SimError::Config(_))));
    }

    #[test]
    fn position_count_mismatch_errors() {
        let result = EngineBuilder::new(small_config(1))
            .initial_positions(vec![Cell::new(5, 5); 3])
            .build();
        assert!(matches!(result, Err(SimError::PopulationMismatch { got: 3, .. })));

        let result = EngineBuilder::new(small_config(1))
            .profiles(vec![Profile::calm_adult(); 49])
            .build();
        assert!(matches!(result, Err(SimError::PopulationMismatch { got: 49, .. })));
    }

    #[test]
    fn scripted_position_must_be_free() {
        let cfg = EvacConfig { population: 1, ..small_config(1) };
        let exit = cfg.exit_cells()[0];
        let result = EngineBuilder::new(cfg).initial_positions(vec![exit]).build();
        assert!(matches!(result, Err(SimError::InvalidPosition { .. })));
    }
}

// ── Tick loop ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod engine_tests {
    use super::*;

    #[test]
    fn population_is_conserved_every_tick() {
        let mut engine = EngineBuilder::new(small_config(8)).build().unwrap();
        for _ in 0..3_000 {
            let stats = engine.step(&mut NoopObserver).unwrap();
            let active = engine.roster().active_count();
            assert_eq!(active + engine.events().len(), 50);
            assert_eq!(active + engine.roster().departed().len(), 50);
            assert_eq!(stats.moving + stats.waiting, active);
            assert_eq!(engine.grid().len(), active + engine.topology().live_count());
            if !engine.is_running() {
                break;
            }
        }
        assert!(!engine.is_running());
    }

    #[test]
    fn each_person_leaves_once() {
        let outcome = run(small_config(4)).unwrap();
        let mut ids: Vec<u32> = outcome.events.iter().map(|e| e.agent.0).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), outcome.events.len());
    }

    #[test]
    fn exit_times_are_tick_starts_in_order() {
        let mut engine = EngineBuilder::new(small_config(2)).build().unwrap();
        engine.run_ticks(300, &mut NoopObserver).unwrap();
        let dt = engine.clock().tick_duration_secs;
        let mut last = 0.0;
        for e in engine.events() {
            let ticks = (e.time_secs / dt).round();
            assert_eq!(e.time_secs, ticks * dt);
            assert!(e.time_secs >= last);
            last = e.time_secs;
        }
    }

    #[test]
    fn nobody_leaves_in_the_first_ticks() {
        // 1.3 persons/s × 0.1 s: the first unit of credit is earned on tick 7.
        let mut engine = EngineBuilder::new(crowd_at_exit(20, ExitLayout::Count(1)))
            .initial_positions(around_exit(20))
            .build()
            .unwrap();
        engine.run_ticks(7, &mut NoopObserver).unwrap();
        assert!(engine.events().is_empty());
        engine.run_ticks(1, &mut NoopObserver).unwrap();
        assert_eq!(engine.events().len(), 1);
    }

    #[test]
    fn discharge_follows_capacity() {
        let ticks = 500u64;
        for (exits, capacity) in [
            (ExitLayout::Count(1), 1.3),
            (ExitLayout::Widths(vec![2.0]), 2.6),
        ] {
            let cfg = EvacConfig {
                behavior: deterministic_behavior(),
                ..crowd_at_exit(400, exits)
            };
            let mut engine = EngineBuilder::new(cfg)
                .initial_positions(around_exit(400))
                .profiles(vec![Profile::calm_adult(); 400])
                .build()
                .unwrap();
            engine.run_ticks(ticks, &mut NoopObserver).unwrap();

            let expected = (capacity * 0.1 * ticks as f64).floor() as i64;
            let served = engine.events().len() as i64;
            assert!((served - expected).abs() <= 1, "served {served}, expected {expected}");
            let gate = engine.gate(ExitId(0)).unwrap();
            assert_eq!(gate.served_total() as i64, served);
            assert!(gate.credit() >= 0.0 && gate.credit() < 1.0 + 1e-9);
        }
    }

    #[test]
    fn observer_sees_every_evacuation() {
        let mut rec = Recorder::default();
        let outcome = ScenarioController::new(small_config(6)).run_with(&mut rec).unwrap();
        assert_eq!(rec.evacuations, outcome.events);
        assert_eq!(rec.ticks, outcome.ticks);
        assert_eq!(rec.ended_at, Some(Tick(outcome.ticks)));
        let last = rec.last.unwrap();
        assert_eq!(last.active, 0);
        assert_eq!(last.evacuated, 50);
    }
}

// ── Closures ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod closure_tests {
    use super::*;

    /// 9×5 room with exits at (3, 0) and (6, 0); ten calm people queued at
    /// the first one after a single tick.
    fn queued_engine() -> crate::Engine {
        let cfg = EvacConfig {
            width: 9,
            height: 5,
            population: 10,
            exits: ExitLayout::Count(2),
            behavior: deterministic_behavior(),
            ..EvacConfig::default()
        };
        let spots = [Cell::new(2, 0), Cell::new(2, 1), Cell::new(3, 1)];
        let mut engine = EngineBuilder::new(cfg)
            .initial_positions((0..10).map(|i| spots[i % 3]).collect())
            .profiles(vec![Profile::calm_adult(); 10])
            .build()
            .unwrap();
        engine.step(&mut NoopObserver).unwrap();
        engine
    }

    #[test]
    fn closing_releases_the_queue() {
        let mut engine = queued_engine();
        assert_eq!(engine.roster().anchored_to(ExitId(0)).len(), 10);

        let mut rec = Recorder::default();
        let report = engine.close_exit(ExitId(0), &mut rec).unwrap().unwrap();
        assert_eq!(report.released, 10);
        assert_eq!(report.tick, Tick(1));
        assert_eq!(rec.closures, vec![report]);

        assert!(engine.roster().anchored_to(ExitId(0)).is_empty());
        for agent in engine.roster().active() {
            assert_eq!(agent.state, Lifecycle::Moving);
            assert_eq!(agent.target, None);
        }
        assert!(engine.gate(ExitId(0)).is_none());
        assert!(!engine.topology().is_live(ExitId(0)));
        assert_eq!(engine.grid().position(Occupant::Exit(ExitId(0))), None);
        assert_eq!(engine.topology().recomputations(), 2);
    }

    #[test]
    fn released_people_head_for_the_other_exit() {
        let mut engine = queued_engine();
        engine.close_exit(ExitId(0), &mut NoopObserver).unwrap();
        engine.step(&mut NoopObserver).unwrap();
        for agent in engine.roster().active() {
            assert_eq!(agent.target, Some(ExitId(1)));
            assert_eq!(agent.retargets, 1, "a forced move off a closed exit is a switch");
        }
    }

    #[test]
    fn closing_twice_is_a_noop() {
        let mut engine = queued_engine();
        engine.close_exit(ExitId(0), &mut NoopObserver).unwrap();
        let before = engine.topology().recomputations();
        assert!(engine.close_exit(ExitId(0), &mut NoopObserver).unwrap().is_none());
        assert!(engine.close_exit(ExitId(7), &mut NoopObserver).unwrap().is_none());
        assert_eq!(engine.topology().recomputations(), before);
        assert_eq!(engine.topology().live_count(), 1);
    }

    #[test]
    fn scripted_closure_fires_once_at_trigger() {
        let cfg = small_config(5).with_closure(2.0, 0).with_closure(2.0, 0);
        let mut rec = Recorder::default();
        let outcome = ScenarioController::new(cfg).run_with(&mut rec).unwrap();
        assert_eq!(outcome.closures_applied.len(), 1);
        assert_eq!(outcome.closures_applied[0].tick, Tick(20));
        assert_eq!(outcome.live_exits, 1);
        assert!(outcome.events.iter().all(|e| e.exit == ExitId(1) || e.time_secs < 2.0));
    }

    #[test]
    fn closure_at_zero_applies_before_first_tick() {
        let outcome = run(small_config(5).with_closure(0.0, 1)).unwrap();
        assert_eq!(outcome.closures_applied[0].tick, Tick(0));
        assert!(outcome.events.iter().all(|e| e.exit == ExitId(0)));
        assert_eq!(outcome.metrics.evacuated, 50);
    }
}

// ── Scenarios ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod scenario_tests {
    use super::*;

    #[test]
    fn same_seed_same_events() {
        let a = run(small_config(42)).unwrap();
        let b = run(small_config(42)).unwrap();
        assert_eq!(a.events, b.events);
        assert_eq!(a.ticks, b.ticks);

        let c = run(small_config(43)).unwrap();
        assert_ne!(a.events, c.events);
    }

    #[test]
    fn baseline_clears_the_room() {
        let outcome = run(EvacConfig::baseline()).unwrap();
        assert_eq!(outcome.metrics.evacuated, 300);
        assert_eq!(outcome.remaining, 0);
        assert!(!outcome.running);
        assert!(outcome.ticks < 5_000);
        assert_eq!(outcome.live_exits, 3);
        assert_eq!(outcome.metrics.per_exit.values().sum::<usize>(), 300);
    }

    #[test]
    fn closure_at_sixty_seconds_slows_evacuation() {
        let baseline = run(EvacConfig::baseline()).unwrap();
        let closed = run(EvacConfig::baseline().with_closure(60.0, 0)).unwrap();
        assert_eq!(closed.live_exits, baseline.live_exits - 1);
        assert_eq!(closed.metrics.evacuated, 300);
        assert!(closed.metrics.makespan_secs >= baseline.metrics.makespan_secs);
    }

    #[test]
    fn walled_off_population_never_leaves() {
        // Exit at (3, 0) with the rest of row 0 and all of row 1 blocked.
        let mut obstacles: Vec<Cell> = (0..7).filter(|&x| x != 3).map(|x| Cell::new(x, 0)).collect();
        obstacles.extend((0..7).map(|x| Cell::new(x, 1)));
        let cfg = EvacConfig {
            width: 7,
            height: 6,
            population: 15,
            exits: ExitLayout::Count(1),
            obstacles,
            max_steps: 200,
            ..EvacConfig::default()
        };
        let outcome = run(cfg).unwrap();
        assert!(outcome.events.is_empty());
        assert!(outcome.running);
        assert_eq!(outcome.ticks, 200);
        assert_eq!(outcome.remaining, 15);
        assert_eq!(outcome.metrics.makespan_secs, None);
    }

    #[test]
    fn budget_stops_the_run() {
        let cfg = EvacConfig { max_steps: 10, ..small_config(1) };
        let outcome = run(cfg).unwrap();
        assert_eq!(outcome.ticks, 10);
        assert!(outcome.running);
        assert_eq!(outcome.metrics.curve.len(), 11);
    }

    #[test]
    fn sweep_runs_each_exit_count() {
        let points = crate::sweep_exit_counts(&small_config(9).with_closure(5.0, 1), &[1, 2, 4]).unwrap();
        let counts: Vec<usize> = points.iter().map(|p| p.exit_count).collect();
        assert_eq!(counts, vec![1, 2, 4]);
        for p in &points {
            assert_eq!(p.outcome.metrics.evacuated, 50);
            assert_eq!(p.outcome.live_exits, p.exit_count);
        }
        assert!(points[2].outcome.metrics.makespan_secs < points[0].outcome.metrics.makespan_secs);
    }
}

// ── Metrics ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod metrics_tests {
    use super::*;
    use crate::{RunMetrics, percentile};
    use evac_core::AgentId;

    fn event(agent: u32, exit: u32, time_secs: f64) -> ExitEvent {
        ExitEvent { agent: AgentId(agent), exit: ExitId(exit), time_secs }
    }

    #[test]
    fn percentile_interpolates() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(percentile(&xs, 0.5), Some(2.5));
        assert!((percentile(&xs, 0.9).unwrap() - 3.7).abs() < 1e-12);
        assert_eq!(percentile(&xs, 0.0), Some(1.0));
        assert_eq!(percentile(&xs, 1.0), Some(4.0));
        assert_eq!(percentile(&[7.0], 0.9), Some(7.0));
        assert_eq!(percentile(&[], 0.5), None);
    }

    #[test]
    fn reduction_of_a_small_log() {
        let events = [event(3, 0, 0.3), event(0, 1, 0.0), event(1, 0, 0.1), event(2, 0, 0.1)];
        let m = RunMetrics::from_events(&events, 5, 0.1, 3);
        assert_eq!(m.evacuated, 4);
        assert_eq!(m.remaining, 1);
        assert_eq!(m.makespan_secs, Some(0.3));
        assert_eq!(m.p50_secs, Some(0.1));
        assert_eq!(m.per_exit[&ExitId(0)], 3);
        assert_eq!(m.per_exit[&ExitId(1)], 1);
        let counts: Vec<usize> = m.curve.iter().map(|p| p.evacuated).collect();
        assert_eq!(counts, vec![1, 3, 3, 4]);
        assert!((m.curve[3].percent - 80.0).abs() < 1e-9);
        assert!((m.percent_evacuated() - 80.0).abs() < 1e-9);
    }

    #[test]
    fn empty_log_has_no_times() {
        let m = RunMetrics::from_events(&[], 10, 0.1, 2);
        assert_eq!(m.makespan_secs, None);
        assert_eq!(m.mean_secs, None);
        assert_eq!(m.p90_secs, None);
        assert!(m.curve.iter().all(|p| p.evacuated == 0));
    }
}
