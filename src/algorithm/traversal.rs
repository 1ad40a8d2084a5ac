use super::SearchAlgorithm;
use crate::common::{Path, TimeState};
use crate::map::{Cell, Map, SearchRecord};
use crate::stat::Stats;

use std::cmp::Ordering;
use std::collections::{BTreeSet, VecDeque};
use tracing::{debug, instrument, trace};

/// Run one static-graph search between two cell ids. The caller resets the
/// map beforehand; the search leaves its bookkeeping in the map records.
#[instrument(skip(map, stats), level = "debug")]
pub(crate) fn grid_search(
    algorithm: SearchAlgorithm,
    map: &mut Map,
    start: usize,
    goal: usize,
    stats: &mut Stats,
) -> Option<Path> {
    let path = match algorithm {
        SearchAlgorithm::Unordered => unordered_search(map, start, goal, stats),
        SearchAlgorithm::BreadthFirst => breadth_first_search(map, start, goal, stats),
        SearchAlgorithm::BestFirst => best_first_search(map, start, goal, stats),
    };
    if path.is_none() {
        debug!("cannot find solution");
    }
    path
}

fn unordered_search(map: &mut Map, start: usize, goal: usize, stats: &mut Stats) -> Option<Path> {
    let (cells, records) = map.split_mut();
    let mut stack = vec![start];
    records[start].visited = true;
    records[start].g_cost = 0;

    while let Some(current) = stack.pop() {
        stats.low_level_expand_nodes += 1;
        if current == goal {
            return Some(construct_path(cells, records, goal));
        }

        for &neighbor in cells[current].neighbors() {
            if records[neighbor].visited || cells[neighbor].is_obstacle() {
                continue;
            }
            records[neighbor] = SearchRecord {
                visited: true,
                g_cost: records[current].g_cost + 1,
                f_cost: records[current].g_cost + 1,
                parent: Some(current),
            };
            stack.push(neighbor);
        }
    }

    None
}

fn breadth_first_search(
    map: &mut Map,
    start: usize,
    goal: usize,
    stats: &mut Stats,
) -> Option<Path> {
    let (cells, records) = map.split_mut();
    let mut queue = VecDeque::from([start]);
    records[start].visited = true;
    records[start].g_cost = 0;

    while let Some(current) = queue.pop_front() {
        stats.low_level_expand_nodes += 1;
        if current == goal {
            return Some(construct_path(cells, records, goal));
        }

        for &neighbor in cells[current].neighbors() {
            if records[neighbor].visited || cells[neighbor].is_obstacle() {
                continue;
            }
            records[neighbor] = SearchRecord {
                visited: true,
                g_cost: records[current].g_cost + 1,
                f_cost: records[current].g_cost + 1,
                parent: Some(current),
            };
            queue.push_back(neighbor);
        }
    }

    None
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct OpenNode {
    id: usize,
    f_cost: usize,
    g_cost: usize,
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.f_cost
            .cmp(&other.f_cost)
            // Higher g cost has higher priority
            .then_with(|| other.g_cost.cmp(&self.g_cost))
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn best_first_search(map: &mut Map, start: usize, goal: usize, stats: &mut Stats) -> Option<Path> {
    let heuristics: Vec<usize> = (0..map.num_cells())
        .map(|id| map.heuristic(id, goal))
        .collect();
    let (cells, records) = map.split_mut();
    let heuristic = |id: usize| heuristics[id];

    let mut open_list = BTreeSet::new();
    records[start].g_cost = 0;
    records[start].f_cost = heuristic(start);
    open_list.insert(OpenNode {
        id: start,
        f_cost: records[start].f_cost,
        g_cost: 0,
    });

    while let Some(current) = open_list.pop_first() {
        // Outdated entry of a cell reached again with a lower cost.
        if records[current.id].visited {
            continue;
        }
        trace!("expand node: {current:?}");
        stats.low_level_expand_nodes += 1;

        if current.id == goal {
            return Some(construct_path(cells, records, goal));
        }
        records[current.id].visited = true;

        let tentative_g_cost = records[current.id].g_cost + 1;
        for &neighbor in cells[current.id].neighbors() {
            if cells[neighbor].is_obstacle() || records[neighbor].visited {
                continue;
            }
            if tentative_g_cost < records[neighbor].g_cost {
                let f_cost = tentative_g_cost + heuristic(neighbor);
                records[neighbor].parent = Some(current.id);
                records[neighbor].g_cost = tentative_g_cost;
                records[neighbor].f_cost = f_cost;
                open_list.insert(OpenNode {
                    id: neighbor,
                    f_cost,
                    g_cost: tentative_g_cost,
                });
            }
        }
    }

    None
}

/// Follow predecessors back from `goal` and number the cells from t = 0.
fn construct_path(cells: &[Cell], records: &[SearchRecord], goal: usize) -> Path {
    let mut ids = vec![goal];
    let mut current = goal;
    while let Some(parent) = records[current].parent {
        ids.push(parent);
        current = parent;
    }
    ids.reverse();
    ids.into_iter()
        .enumerate()
        .map(|(time_step, id)| TimeState::new(time_step, cells[id].location()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Location;
    use std::collections::HashSet;

    const ALGORITHMS: [SearchAlgorithm; 3] = [
        SearchAlgorithm::Unordered,
        SearchAlgorithm::BreadthFirst,
        SearchAlgorithm::BestFirst,
    ];

    fn run(algorithm: SearchAlgorithm, map: &mut Map, start: usize, goal: usize) -> Option<Path> {
        map.reset();
        grid_search(algorithm, map, start, goal, &mut Stats::default())
    }

    fn assert_valid(path: &Path, map: &Map, start: usize, goal: usize) {
        assert_eq!(path.first().unwrap().location, map.location(start));
        assert_eq!(path.last().unwrap().location, map.location(goal));
        let mut seen = HashSet::new();
        for (step, state) in path.iter().enumerate() {
            assert_eq!(state.time_step, step);
            assert!(map.is_passable(state.location));
            assert!(seen.insert(state.location), "cell repeated in path");
        }
        for pair in path.windows(2) {
            assert_eq!(pair[0].location.manhattan(&pair[1].location), 1);
        }
    }

    /// Obstacle layout on a 5x5 grid:
    /// ```text
    /// . . . . .
    /// . # # # .
    /// . . . # .
    /// # # . # .
    /// . . . . .
    /// ```
    fn walled_map() -> Map {
        let mut map = Map::new(5, 5);
        for (x, y) in [(1, 1), (2, 1), (3, 1), (3, 2), (3, 3), (0, 3), (1, 3)] {
            map.toggle_obstacle_at(x, y);
        }
        map
    }

    #[test]
    fn test_best_first_open_grid() {
        let mut map = Map::new(4, 4);
        let path = run(SearchAlgorithm::BestFirst, &mut map, 0, 15).unwrap();
        assert_eq!(path.len(), 7);
        assert_eq!(path.last().unwrap().time_step, 6);
        assert_valid(&path, &map, 0, 15);
    }

    #[test]
    fn test_shortest_paths_around_walls() {
        let mut map = walled_map();
        let start = map.cell_id(Location::new(0, 2));
        let goal = map.cell_id(Location::new(4, 2));

        // Through (2,2), (2,3), (2,4), (3,4), (4,4), (4,3) or over the top.
        let expected = 9;
        for algorithm in [SearchAlgorithm::BreadthFirst, SearchAlgorithm::BestFirst] {
            let path = run(algorithm, &mut map, start, goal).unwrap();
            assert_eq!(path.len(), expected, "{algorithm:?}");
            assert_valid(&path, &map, start, goal);
        }

        let path = run(SearchAlgorithm::Unordered, &mut map, start, goal).unwrap();
        assert!(path.len() >= expected);
        assert_valid(&path, &map, start, goal);
    }

    #[test]
    fn test_start_is_goal() {
        let mut map = Map::new(3, 3);
        for algorithm in ALGORITHMS {
            let path = run(algorithm, &mut map, 4, 4).unwrap();
            assert_eq!(path, vec![TimeState::new(0, Location::new(1, 1))]);
        }
    }

    #[test]
    fn test_unreachable_goal() {
        let mut map = Map::new(3, 3);
        for id in [1, 4, 7] {
            map.toggle_obstacle(id);
        }
        for algorithm in ALGORITHMS {
            assert!(run(algorithm, &mut map, 0, 2).is_none(), "{algorithm:?}");
        }
    }

    #[test]
    fn test_reset_makes_search_repeatable() {
        let mut map = walled_map();
        for algorithm in ALGORITHMS {
            let first = run(algorithm, &mut map, 0, 24);
            let second = run(algorithm, &mut map, 0, 24);
            assert!(first.is_some());
            assert_eq!(first, second, "{algorithm:?}");
        }
    }

    #[test]
    fn test_stale_records_break_search() {
        let mut map = Map::new(3, 1);
        map.reset();
        assert!(grid_search(SearchAlgorithm::BreadthFirst, &mut map, 0, 2, &mut Stats::default()).is_some());
        // Without a reset every cell is still marked visited.
        assert!(grid_search(SearchAlgorithm::BreadthFirst, &mut map, 2, 0, &mut Stats::default()).is_none());
    }

    #[test]
    fn test_best_first_leaves_costs_in_records() {
        let mut map = Map::new(4, 4);
        run(SearchAlgorithm::BestFirst, &mut map, 0, 15).unwrap();
        assert_eq!(map.record(0).g_cost, 0);
        assert_eq!(map.record(0).f_cost, map.heuristic(0, 15));
        // First step towards the goal, one move taken.
        assert_eq!(map.record(1).f_cost, 1 + map.heuristic(1, 15));
        assert_eq!(map.record(15).g_cost, 6);
        assert_eq!(map.record(15).f_cost, 6);
        assert!(map.record(15).parent.is_some());
    }
}
