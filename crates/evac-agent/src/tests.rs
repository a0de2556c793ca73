//! Unit tests for evac-agent.

#[cfg(test)]
mod helpers {
    use evac_core::{AgentId, Cell, ExitId};
    use evac_spatial::{Grid, Occupant, Topology};

    use crate::{EvacuatingAgent, Profile};

    pub fn calm(id: u32, cell: Cell) -> EvacuatingAgent {
        EvacuatingAgent::new(AgentId(id), cell, Profile::calm_adult(), 0.75)
    }

    /// Room with the given exits placed on a fresh grid.
    pub fn room(width: u32, height: u32, exits: &[Cell], obstacles: &[Cell]) -> (Topology, Grid) {
        let topo = Topology::new(width, height, exits, obstacles);
        let mut grid = Grid::new(width, height);
        for site in topo.exits() {
            grid.place(Occupant::Exit(site.id), site.cell).unwrap();
        }
        (topo, grid)
    }

    pub fn put(grid: &mut Grid, agent: &EvacuatingAgent) {
        grid.place(Occupant::Person(agent.id), agent.cell).unwrap();
    }

    pub const E0: ExitId = ExitId(0);
    pub const E1: ExitId = ExitId(1);
}

// ── Profiles ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod profile {
    use evac_core::SimRng;

    use crate::profile::{MAX_SPEED_MPS, MIN_SPEED_MPS};
    use crate::{Category, Profile};

    #[test]
    fn sampling_is_deterministic() {
        let a: Vec<Profile> = {
            let mut rng = SimRng::new(11);
            (0..20).map(|_| Profile::sample(&mut rng)).collect()
        };
        let b: Vec<Profile> = {
            let mut rng = SimRng::new(11);
            (0..20).map(|_| Profile::sample(&mut rng)).collect()
        };
        assert_eq!(a, b);
    }

    #[test]
    fn sampled_values_stay_in_range() {
        let mut rng = SimRng::new(5);
        for _ in 0..2_000 {
            let p = Profile::sample(&mut rng);
            assert!((0.0..=1.0).contains(&p.panic));
            assert!((0.5..=1.0).contains(&p.compliance));
            assert!((MIN_SPEED_MPS..=MAX_SPEED_MPS).contains(&p.base_speed_mps));
            if p.category == Category::MobilityImpaired {
                assert!(p.reduced_mobility);
            }
            if p.category == Category::Child {
                assert!(p.age <= 14);
            }
        }
    }

    #[test]
    fn population_mix_is_mostly_adults() {
        let mut rng = SimRng::new(9);
        let n = 4_000;
        let adults = (0..n)
            .filter(|_| Profile::sample(&mut rng).category == Category::Adult)
            .count();
        let share = adults as f64 / n as f64;
        assert!((0.55..0.65).contains(&share), "adult share {share}");
    }

    #[test]
    fn movement_rate_tracks_speed() {
        let mut p = Profile::calm_adult();
        assert_eq!(p.movement_rate(0.75), 2);
        p.base_speed_mps = Category::OlderAdult.mean_speed_mps();
        assert_eq!(p.movement_rate(0.75), 1);
        p.base_speed_mps = 0.3;
        assert_eq!(p.movement_rate(0.75), 1);
        p.base_speed_mps = 2.0;
        assert_eq!(p.movement_rate(0.5), 4);
    }
}

// ── Softmax ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod softmax {
    use evac_core::SimRng;

    use crate::softmax_pick;

    #[test]
    fn empty_or_infinite_yields_none() {
        let mut rng = SimRng::new(1);
        assert_eq!(softmax_pick(&[], 1.0, &mut rng), None);
        assert_eq!(softmax_pick(&[f64::INFINITY], 1.0, &mut rng), None);
    }

    #[test]
    fn low_temperature_is_argmin() {
        let mut rng = SimRng::new(2);
        for _ in 0..100 {
            assert_eq!(softmax_pick(&[5.0, 2.0, 7.0], 0.01, &mut rng), Some(1));
        }
    }

    #[test]
    fn suboptimal_choices_still_happen() {
        let mut rng = SimRng::new(3);
        let picks: Vec<usize> = (0..500)
            .filter_map(|_| softmax_pick(&[0.0, 1.0], 1.0, &mut rng))
            .collect();
        let worse = picks.iter().filter(|&&i| i == 1).count();
        // P(worse) = e^-1 / (1 + e^-1) ≈ 0.27
        assert!(worse > 75 && worse < 200, "picked the worse option {worse} times");
    }
}

// ── Roster ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod roster {
    use evac_core::{AgentId, Cell};

    use super::helpers::{E0, E1, calm, put, room};
    use crate::{Lifecycle, Roster};

    #[test]
    fn evacuate_moves_agent_to_archive() {
        let mut r = Roster::new(vec![calm(0, Cell::new(0, 0)), calm(1, Cell::new(1, 1))]);
        assert_eq!(r.active_count(), 2);
        let gone = r.evacuate(AgentId(1), 3.5).unwrap();
        assert_eq!(gone.state, Lifecycle::Evacuated);
        assert_eq!(gone.exit_time, Some(3.5));
        assert_eq!(r.active_count(), 1);
        assert!(r.get(AgentId(1)).is_none());
        assert!(r.evacuate(AgentId(1), 4.0).is_none());
        assert_eq!(r.active_count() + r.departed().len(), r.initial_count());
    }

    #[test]
    fn take_and_restore() {
        let mut r = Roster::new(vec![calm(0, Cell::new(0, 0))]);
        let a = r.take(AgentId(0)).unwrap();
        assert!(r.get(AgentId(0)).is_none());
        assert_eq!(r.active_count(), 1);
        r.restore(a);
        assert!(r.get(AgentId(0)).is_some());
    }

    #[test]
    fn queue_counts_only_waiting_agents_of_that_exit() {
        let (topo, mut grid) = room(7, 3, &[Cell::new(1, 0), Cell::new(5, 0)], &[]);
        let mut agents = vec![
            calm(0, Cell::new(0, 1)),
            calm(1, Cell::new(1, 1)),
            calm(2, Cell::new(2, 1)),
            calm(3, Cell::new(1, 2)), // two rows up: outside the neighbourhood
        ];
        for a in &mut agents {
            a.state = Lifecycle::Waiting;
            a.target = Some(E0);
            put(&mut grid, a);
        }
        agents[2].target = Some(E1);
        agents[1].state = Lifecycle::Moving;
        let r = Roster::new(agents);

        let site0 = *topo.resolve(E0).unwrap();
        assert_eq!(r.queue_for(&grid, &site0), vec![AgentId(0)]);
        assert_eq!(r.anchored_to(E0), vec![AgentId(0), AgentId(3)]);
        assert_eq!(r.count_in(Lifecycle::Waiting), 3);
    }
}

// ── Decisions and turns ───────────────────────────────────────────────────────

#[cfg(test)]
mod turn {
    use evac_core::{BehaviorParams, Cell, SimRng, Tick};
    use evac_spatial::Occupant;

    use super::helpers::{E0, E1, calm, put, room};
    use crate::{Lifecycle, Roster, TurnContext};

    fn sharp() -> BehaviorParams {
        BehaviorParams { softmax_temperature: 0.01, ..BehaviorParams::default() }
    }

    #[test]
    fn walks_to_exit_then_queues() {
        let (topo, mut grid) = room(5, 5, &[Cell::new(2, 0)], &[]);
        let mut agent = calm(0, Cell::new(2, 4));
        put(&mut grid, &agent);
        let others = Roster::new(vec![]);
        let params = BehaviorParams::default();
        let mut rng = SimRng::new(1);

        let ctx = TurnContext::new(Tick(1), &topo, &params);
        agent.take_turn(&mut grid, &others, &ctx, &mut rng).unwrap();
        assert_eq!(agent.target, Some(E0));
        assert_eq!(agent.cell, Cell::new(2, 2)); // rate 2
        assert_eq!(agent.state, Lifecycle::Moving);
        assert_eq!(grid.position(Occupant::Person(agent.id)), Some(Cell::new(2, 2)));

        let ctx = TurnContext::new(Tick(2), &topo, &params);
        agent.take_turn(&mut grid, &others, &ctx, &mut rng).unwrap();
        assert_eq!(agent.cell, Cell::new(2, 1));
        assert_eq!(agent.state, Lifecycle::Waiting);

        // Waiting is sticky for a calm agent.
        let ctx = TurnContext::new(Tick(3), &topo, &params);
        agent.take_turn(&mut grid, &others, &ctx, &mut rng).unwrap();
        assert_eq!(agent.cell, Cell::new(2, 1));
        assert_eq!(agent.state, Lifecycle::Waiting);
    }

    #[test]
    fn isolated_agent_idles() {
        let wall: Vec<Cell> = (0..5).map(|x| Cell::new(x, 1)).collect();
        let (topo, mut grid) = room(5, 5, &[Cell::new(2, 0)], &wall);
        let mut agent = calm(0, Cell::new(2, 4));
        put(&mut grid, &agent);
        let params = BehaviorParams::default();
        let mut rng = SimRng::new(1);

        for t in 0..20 {
            let ctx = TurnContext::new(Tick(t), &topo, &params);
            agent.take_turn(&mut grid, &Roster::new(vec![]), &ctx, &mut rng).unwrap();
        }
        assert_eq!(agent.target, None);
        assert_eq!(agent.state, Lifecycle::Moving);
        assert_eq!(agent.cell, Cell::new(2, 4));
    }

    #[test]
    fn closed_target_sends_waiting_agent_elsewhere() {
        let (mut topo, mut grid) = room(7, 3, &[Cell::new(1, 0), Cell::new(5, 0)], &[]);
        let mut agent = calm(0, Cell::new(1, 1));
        agent.state = Lifecycle::Waiting;
        agent.target = Some(E0);
        agent.preferred = Some(E0);
        put(&mut grid, &agent);

        topo.close(E0).unwrap();
        grid.remove(Occupant::Exit(E0));

        let params = BehaviorParams::default();
        let ctx = TurnContext::new(Tick(7), &topo, &params);
        agent
            .take_turn(&mut grid, &Roster::new(vec![]), &ctx, &mut SimRng::new(4))
            .unwrap();
        assert_eq!(agent.target, Some(E1));
        assert_eq!(agent.retargets, 1);
        assert_eq!(agent.preferred, Some(E0), "preferred exit is never overwritten");
        assert_eq!(agent.cell, Cell::new(3, 0));
        assert_eq!(agent.state, Lifecycle::Moving);
    }

    #[test]
    fn released_agent_counts_the_switch() {
        let (mut topo, mut grid) = room(7, 3, &[Cell::new(1, 0), Cell::new(5, 0)], &[]);
        let mut agent = calm(0, Cell::new(1, 1));
        agent.state = Lifecycle::Waiting;
        agent.target = Some(E0);
        agent.preferred = Some(E0);
        put(&mut grid, &agent);

        agent.release();
        assert_eq!(agent.target, None);
        assert_eq!(agent.released_from, Some(E0));
        assert_eq!(agent.state, Lifecycle::Moving);

        topo.close(E0).unwrap();
        grid.remove(Occupant::Exit(E0));

        let params = BehaviorParams::default();
        let ctx = TurnContext::new(Tick(7), &topo, &params);
        agent
            .take_turn(&mut grid, &Roster::new(vec![]), &ctx, &mut SimRng::new(4))
            .unwrap();
        assert_eq!(agent.target, Some(E1));
        assert_eq!(agent.retargets, 1);
        assert_eq!(agent.released_from, None);
    }

    #[test]
    fn moving_agent_reconsiders_only_on_interval() {
        let (topo, mut grid) = room(11, 3, &[Cell::new(1, 0), Cell::new(9, 0)], &[]);
        let mut agent = calm(0, Cell::new(2, 2));
        agent.target = Some(E1);
        agent.preferred = Some(E1);
        put(&mut grid, &agent);
        let others = Roster::new(vec![]);
        let params = sharp();
        let mut rng = SimRng::new(3);

        // E0 is closer, but off-interval ticks keep the current target.
        let ctx = TurnContext::new(Tick(3), &topo, &params);
        agent.take_turn(&mut grid, &others, &ctx, &mut rng).unwrap();
        assert_eq!(agent.target, Some(E1));
        assert_eq!(agent.retargets, 0);
        assert_eq!(agent.cell, Cell::new(4, 0));

        let ctx = TurnContext::new(Tick(10), &topo, &params);
        agent.take_turn(&mut grid, &others, &ctx, &mut rng).unwrap();
        assert_eq!(agent.target, Some(E0));
        assert_eq!(agent.retargets, 1);
        assert_eq!(agent.preferred, Some(E1));
    }

    #[test]
    fn panicked_agent_can_leave_queue() {
        let (topo, mut grid) = room(5, 5, &[Cell::new(2, 0)], &[]);
        let mut agent = calm(0, Cell::new(2, 1));
        agent.profile.panic = 1.0;
        agent.state = Lifecycle::Waiting;
        agent.target = Some(E0);
        put(&mut grid, &agent);

        let params = BehaviorParams { reconsider_probability: 1.0, ..BehaviorParams::default() };
        let ctx = TurnContext::new(Tick(3), &topo, &params);
        agent
            .take_turn(&mut grid, &Roster::new(vec![]), &ctx, &mut SimRng::new(8))
            .unwrap();
        // Only one exit, so it re-picks the same one and is still adjacent.
        assert_eq!(agent.target, Some(E0));
        assert_eq!(agent.state, Lifecycle::Waiting);
        assert_eq!(agent.retargets, 0);
    }

    #[test]
    fn familiarity_breaks_symmetric_choice() {
        let (topo, grid) = room(7, 3, &[Cell::new(1, 0), Cell::new(5, 0)], &[]);
        let mut agent = calm(0, Cell::new(3, 2));
        agent.profile.familiar = true;
        agent.preferred = Some(E1);
        let params = sharp();
        let ctx = TurnContext::new(Tick(0), &topo, &params);
        let others = Roster::new(vec![]);
        let mut rng = SimRng::new(6);
        for _ in 0..50 {
            assert_eq!(agent.choose_exit(&grid, &others, &ctx, &mut rng), Some(E1));
        }

        agent.profile.familiar = false;
        let picks: Vec<_> = (0..200)
            .filter_map(|_| agent.choose_exit(&grid, &others, &ctx, &mut rng))
            .collect();
        assert!(picks.contains(&E0) && picks.contains(&E1));
    }

    #[test]
    fn panic_noise_can_outweigh_familiarity() {
        let (topo, grid) = room(7, 3, &[Cell::new(1, 0), Cell::new(5, 0)], &[]);
        let mut agent = calm(0, Cell::new(3, 2));
        agent.profile.familiar = true;
        agent.preferred = Some(E1);
        let params = sharp();
        assert!(params.panic_noise > params.familiarity_bonus);
        let ctx = TurnContext::new(Tick(0), &topo, &params);
        let others = Roster::new(vec![]);
        let mut rng = SimRng::new(9);

        agent.profile.panic = 0.0;
        for _ in 0..50 {
            assert_eq!(agent.choose_exit(&grid, &others, &ctx, &mut rng), Some(E1));
        }

        agent.profile.panic = 0.9;
        let picks: Vec<_> = (0..200)
            .filter_map(|_| agent.choose_exit(&grid, &others, &ctx, &mut rng))
            .collect();
        assert!(picks.contains(&E0) && picks.contains(&E1));
    }

    #[test]
    fn congestion_pushes_choice_away() {
        let (topo, mut grid) = room(7, 3, &[Cell::new(1, 0), Cell::new(5, 0)], &[]);
        let mut queued = Vec::new();
        for (i, x) in [0u32, 1, 2].into_iter().enumerate() {
            let mut a = calm(i as u32 + 1, Cell::new(x, 1));
            a.state = Lifecycle::Waiting;
            a.target = Some(E0);
            put(&mut grid, &a);
            queued.push(a);
        }
        let mut all = vec![calm(0, Cell::new(3, 2))];
        all.extend(queued);
        let others = Roster::new(all);
        let chooser = others.get(evac_core::AgentId(0)).unwrap().clone();

        let params = sharp();
        let ctx = TurnContext::new(Tick(0), &topo, &params);
        let mut rng = SimRng::new(12);
        for _ in 0..50 {
            assert_eq!(chooser.choose_exit(&grid, &others, &ctx, &mut rng), Some(E1));
        }
    }

    #[test]
    fn step_goes_around_pillar() {
        let (topo, grid) = room(5, 5, &[Cell::new(2, 0)], &[Cell::new(2, 1)]);
        let agent = calm(0, Cell::new(2, 2));
        let field = topo.exit_field(E0).unwrap();
        let mut rng = SimRng::new(2);
        let mut seen = Vec::new();
        for _ in 0..40 {
            let next = agent.best_neighbor_step(&grid, field, &topo, &mut rng);
            assert!(next == Cell::new(1, 1) || next == Cell::new(3, 1), "stepped to {next}");
            if !seen.contains(&next) {
                seen.push(next);
            }
        }
        assert_eq!(seen.len(), 2, "ties are broken at random");
    }
}
