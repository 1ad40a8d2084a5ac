use super::{construct_path, Trace};
use crate::common::{Agent, ConstraintSet, LowLevelOpenNode, Path, TimeState};
use crate::map::Map;
use crate::stat::Stats;

use std::collections::{BTreeSet, HashSet};
use std::iter;
use tracing::{debug, instrument, trace};

/// Shortest path over (location, time) states that honours the agent's
/// constraints. Waiting in place is a move. The goal is accepted as soon as
/// it is popped, whatever the time; the agent is then assumed to stay there.
///
/// States at `max_time_step` are not expanded, so an unreachable goal ends
/// the search with `None` instead of waiting forever.
#[instrument(skip_all, name="a_star", fields(agent = agent.id, start = format!("{:?}", agent.start), goal = format!("{:?}", agent.goal)), level = "debug")]
pub(crate) fn a_star_search(
    map: &Map,
    agent: &Agent,
    constraints: &ConstraintSet,
    max_time_step: usize,
    stats: &mut Stats,
) -> Option<Path> {
    debug!("constraints: {constraints:?}, max time step: {max_time_step:?}");

    let mut open_list = BTreeSet::new();
    let mut closed_list = HashSet::new();
    let mut trace = Trace::new();

    open_list.insert(LowLevelOpenNode {
        position: agent.start,
        f_open_cost: agent.start.manhattan(&agent.goal),
        g_cost: 0,
        time_step: 0,
    });

    while let Some(current) = open_list.pop_first() {
        trace!("expand node: {current:?}");

        // Update stats.
        stats.low_level_expand_nodes += 1;

        let current_state = TimeState::new(current.time_step, current.position);
        if current.position == agent.goal {
            return Some(construct_path(&trace, current_state));
        }

        closed_list.insert(current_state);

        if current.time_step >= max_time_step {
            continue;
        }

        let next_time_step = current.time_step + 1;
        // Assuming uniform cost.
        let tentative_g_cost = current.g_cost + 1;

        // Wait in place, then up, down, left and right.
        let current_id = map.cell_id(current.position);
        for neighbor in iter::once(current_id).chain(map.neighbors(current_id).iter().copied()) {
            let cell = map.cell(neighbor);
            if cell.is_obstacle() {
                continue;
            }

            let next_state = TimeState::new(next_time_step, cell.location());

            // Every path into a state has the same length, so the first
            // discovery is final.
            if closed_list.contains(&next_state) || trace.contains_key(&next_state) {
                continue;
            }

            // Check for constraints before exploring the neighbor.
            if constraints.is_vertex_forbidden(next_time_step, next_state.location)
                || constraints.is_edge_forbidden(
                    current.time_step,
                    current.position,
                    next_state.location,
                )
            {
                continue;
            }

            open_list.insert(LowLevelOpenNode {
                position: next_state.location,
                f_open_cost: tentative_g_cost + next_state.location.manhattan(&agent.goal),
                g_cost: tentative_g_cost,
                time_step: next_time_step,
            });
            trace.insert(next_state, current_state);
        }
        trace!("open list {open_list:?}");
    }

    debug!("cannot find solution");
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{Constraint, EdgeConstraint, Location, VertexConstraint};

    // Helper function to setup tracing
    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("debug")
            .try_init();
    }

    fn vertex(time_step: usize, x: usize, y: usize) -> Constraint {
        Constraint::Vertex(VertexConstraint {
            time_step,
            location: Location::new(x, y),
        })
    }

    fn edge(time_step: usize, from: (usize, usize), to: (usize, usize)) -> Constraint {
        Constraint::Edge(EdgeConstraint {
            time_step,
            from: Location::new(from.0, from.1),
            to: Location::new(to.0, to.1),
        })
    }

    fn test_agent() -> Agent {
        Agent::new(0, "agent0", Location::new(2, 2), Location::new(0, 0))
    }

    fn assert_valid(path: &Path, map: &Map, agent: &Agent) {
        assert_eq!(path.first().unwrap().location, agent.start);
        assert_eq!(path.last().unwrap().location, agent.goal);
        for (step, state) in path.iter().enumerate() {
            assert_eq!(state.time_step, step);
            assert!(map.is_passable(state.location));
        }
        for pair in path.windows(2) {
            assert!(pair[0].location.manhattan(&pair[1].location) <= 1);
        }
    }

    // Ideal Path
    // [(2, 2), (1, 2), (0, 2), (0, 1), (0, 0)]
    // or
    // [(2, 2), (2, 1), (2, 0), (1, 0), (0, 0)]
    #[test]
    fn test_a_star_no_constraint() {
        init_tracing();
        let agent = test_agent();
        let map = Map::from_file("map_file/test/test.map").unwrap();
        let stats = &mut Stats::default();
        let path = a_star_search(&map, &agent, &ConstraintSet::new(), 16, stats).unwrap();
        debug!("{path:?}");
        assert_eq!(path.len(), 5);
        assert_valid(&path, &map, &agent);
        assert!(stats.low_level_expand_nodes > 0);
    }

    #[test]
    fn test_a_star_in_path_vertex_constraint_alternative_path() {
        init_tracing();
        let agent = test_agent();
        let map = Map::from_file("map_file/test/test.map").unwrap();
        let mut constraints = ConstraintSet::new();
        constraints.insert(vertex(2, 0, 2));
        let stats = &mut Stats::default();
        let path = a_star_search(&map, &agent, &constraints, 16, stats).unwrap();
        debug!("{path:?}");
        assert_eq!(path.len(), 5);
        assert_valid(&path, &map, &agent);
        assert_ne!(path[2].location, Location::new(0, 2));
    }

    #[test]
    fn test_a_star_in_path_vertex_constraint_forces_wait() {
        init_tracing();
        let agent = test_agent();
        let map = Map::from_file("map_file/test/test.map").unwrap();
        let mut constraints = ConstraintSet::new();
        constraints.insert(vertex(2, 0, 2));
        constraints.insert(vertex(2, 2, 0));
        let stats = &mut Stats::default();
        let path = a_star_search(&map, &agent, &constraints, 16, stats).unwrap();
        debug!("{path:?}");
        assert_eq!(path.len(), 6);
        assert_valid(&path, &map, &agent);
    }

    #[test]
    fn test_a_star_edge_constraint_alternative_path() {
        init_tracing();
        let agent = test_agent();
        let map = Map::from_file("map_file/test/test.map").unwrap();
        let mut constraints = ConstraintSet::new();
        // Opposite direction of the route, no effect.
        constraints.insert(edge(1, (0, 2), (1, 2)));
        let stats = &mut Stats::default();
        let path = a_star_search(&map, &agent, &constraints, 16, stats).unwrap();
        debug!("{path:?}");
        assert_eq!(path.len(), 5);
    }

    #[test]
    fn test_a_star_edge_constraint() {
        init_tracing();
        let agent = test_agent();
        let map = Map::from_file("map_file/test/test.map").unwrap();
        let mut constraints = ConstraintSet::new();
        constraints.insert(edge(1, (1, 2), (0, 2)));
        constraints.insert(edge(2, (2, 0), (1, 0)));
        let stats = &mut Stats::default();
        let path = a_star_search(&map, &agent, &constraints, 16, stats).unwrap();
        debug!("{path:?}");
        assert_eq!(path.len(), 6);
        assert_valid(&path, &map, &agent);
    }

    #[test]
    fn test_a_star_ignores_constraints_after_arrival() {
        init_tracing();
        let agent = Agent::new(0, "agent0", Location::new(0, 0), Location::new(1, 0));
        let map = Map::new(3, 1);
        let mut constraints = ConstraintSet::new();
        constraints.insert(vertex(3, 1, 0));
        let stats = &mut Stats::default();
        let path = a_star_search(&map, &agent, &constraints, 16, stats).unwrap();
        assert_eq!(path.len(), 2);
    }

    #[test]
    fn test_a_star_start_is_goal() {
        let agent = Agent::new(0, "agent0", Location::new(1, 1), Location::new(1, 1));
        let map = Map::new(3, 3);
        let stats = &mut Stats::default();
        let path = a_star_search(&map, &agent, &ConstraintSet::new(), 16, stats).unwrap();
        assert_eq!(path, vec![TimeState::new(0, Location::new(1, 1))]);
    }

    #[test]
    fn test_a_star_unreachable_goal() {
        init_tracing();
        let agent = Agent::new(0, "agent0", Location::new(0, 0), Location::new(2, 0));
        let mut map = Map::new(3, 2);
        map.toggle_obstacle_at(1, 0);
        map.toggle_obstacle_at(1, 1);
        let stats = &mut Stats::default();
        assert!(a_star_search(&map, &agent, &ConstraintSet::new(), 12, stats).is_none());
    }

    #[test]
    fn test_a_star_horizon_too_short() {
        let agent = Agent::new(0, "agent0", Location::new(0, 0), Location::new(3, 3));
        let map = Map::new(4, 4);
        let stats = &mut Stats::default();
        assert!(a_star_search(&map, &agent, &ConstraintSet::new(), 5, stats).is_none());
        assert_eq!(
            a_star_search(&map, &agent, &ConstraintSet::new(), 6, stats)
                .unwrap()
                .len(),
            7
        );
    }
}
