//! # Grid Pathfinder
//!
//! First-step search for the pursuing agent.
//!
//! ## Search
//!
//! Breadth-first over global tile coordinates, 4-connected, across every
//! live chunk. Parent links are kept so the first step of a shortest path
//! can be read back. A node budget bounds each search.
//!
//! When no path is found the agent still moves: the axis with the larger
//! delta is tried first, then the other axis, then any open direction.

use std::collections::{HashMap, VecDeque};

use labyrinth_procedural::{Direction, TileKind, TilePos, WorldPos};

use crate::config::PathfinderConfig;
use crate::locator::{GlobalTile, Located};
use crate::window::ChunkWindow;

/// BFS pathfinder over the live window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridPathfinder {
    max_nodes: usize,
}

impl Default for GridPathfinder {
    fn default() -> Self {
        Self::new(PathfinderConfig::default())
    }
}

/// Returns true for tiles the agent wants to reach: unopened chests and
/// uncollected air tanks.
#[must_use]
pub const fn is_objective(located: &Located) -> bool {
    matches!(located.kind, TileKind::Chest | TileKind::ItemChest | TileKind::Oxygen)
}

/// Direction leading from `from` to the adjacent tile `to`.
#[must_use]
pub fn direction_between(from: GlobalTile, to: GlobalTile) -> Option<Direction> {
    Direction::ALL.into_iter().find(|d| from.offset(d.delta()) == to)
}

impl GridPathfinder {
    /// Creates a pathfinder.
    #[inline]
    #[must_use]
    pub const fn new(config: PathfinderConfig) -> Self {
        Self {
            max_nodes: config.max_nodes,
        }
    }

    /// Node budget per search.
    #[inline]
    #[must_use]
    pub const fn max_nodes(&self) -> usize {
        self.max_nodes
    }

    /// Returns true if the search may expand `tile`.
    #[must_use]
    pub fn is_expandable(window: &ChunkWindow, tile: GlobalTile) -> bool {
        let Some(located) = window.locate_tile(tile) else {
            return false;
        };
        let Some(active) = window.chunks().get(located.slot) else {
            return false;
        };
        match located.kind {
            TileKind::Wall | TileKind::Reactor | TileKind::SilverDoor | TileKind::Door | TileKind::Special => false,
            TileKind::AutoGate => !active.chunk.is_gate_closed(located.tile),
            TileKind::Floor | TileKind::Chest | TileKind::ItemChest | TileKind::Oxygen => true,
        }
    }

    /// Shortest path from `start` to the nearest tile satisfying `goal`.
    ///
    /// The path excludes `start` and ends on the goal. The player tile is
    /// never crossed, but may itself be the goal.
    pub fn path(
        &self,
        window: &ChunkWindow,
        start: GlobalTile,
        player: Option<GlobalTile>,
        goal: impl Fn(GlobalTile) -> bool,
    ) -> Option<Vec<GlobalTile>> {
        let mut parents: HashMap<GlobalTile, GlobalTile> = HashMap::new();
        let mut queue = VecDeque::new();
        parents.insert(start, start);
        queue.push_back(start);
        let mut expanded = 0;

        while let Some(current) = queue.pop_front() {
            if current != start && goal(current) {
                let mut path = vec![current];
                let mut node = current;
                while let Some(&parent) = parents.get(&node) {
                    if parent == start {
                        break;
                    }
                    path.push(parent);
                    node = parent;
                }
                path.reverse();
                return Some(path);
            }

            expanded += 1;
            if expanded > self.max_nodes {
                break;
            }

            for dir in Direction::ALL {
                let next = current.offset(dir.delta());
                if parents.contains_key(&next) {
                    continue;
                }
                if player == Some(next) && !goal(next) {
                    continue;
                }
                if !Self::is_expandable(window, next) {
                    continue;
                }
                parents.insert(next, current);
                queue.push_back(next);
            }
        }
        None
    }

    /// First step toward `target`, with the heuristic fallback. `None` once
    /// the agent stands on `target`.
    #[must_use]
    pub fn step_toward(
        &self,
        window: &ChunkWindow,
        start: GlobalTile,
        target: GlobalTile,
        player: Option<GlobalTile>,
    ) -> Option<Direction> {
        if start == target {
            return None;
        }
        match self.path(window, start, player, |tile| tile == target) {
            Some(path) => path.first().and_then(|&first| direction_between(start, first)),
            None => Self::fallback_step(window, start, target, player),
        }
    }

    /// First step toward the nearest tile satisfying `objective`.
    ///
    /// If none is reachable, falls back toward the closest one by Manhattan
    /// distance. Returns `None` when the window holds no objective at all.
    pub fn step_toward_nearest(
        &self,
        window: &ChunkWindow,
        start: GlobalTile,
        player: Option<GlobalTile>,
        objective: impl Fn(&Located) -> bool,
    ) -> Option<Direction> {
        let goal = |tile: GlobalTile| window.locate_tile(tile).is_some_and(|l| objective(&l));
        if let Some(path) = self.path(window, start, player, goal) {
            return path.first().and_then(|&first| direction_between(start, first));
        }

        let tile_size = window.tile_size();
        let nearest = window
            .chunks()
            .iter()
            .flat_map(|active| {
                let width = active.chunk.width();
                (0..active.chunk.grid.tiles().len()).map(move |i| {
                    let pos = TilePos::new(i % width, i / width);
                    GlobalTile::of_world(WorldPos::of_tile(active.offset, pos, tile_size), tile_size)
                })
            })
            .filter(|&tile| goal(tile))
            .min_by_key(|tile| tile.manhattan(start))?;
        Self::fallback_step(window, start, nearest, player)
    }

    /// Greedy step: larger-delta axis, other axis, then anything open.
    #[must_use]
    pub fn fallback_step(
        window: &ChunkWindow,
        start: GlobalTile,
        target: GlobalTile,
        player: Option<GlobalTile>,
    ) -> Option<Direction> {
        if start == target {
            return None;
        }
        let (dx, dy) = (target.x - start.x, target.y - start.y);
        let horizontal = match dx.signum() {
            1 => Some(Direction::East),
            -1 => Some(Direction::West),
            _ => None,
        };
        let vertical = match dy.signum() {
            1 => Some(Direction::South),
            -1 => Some(Direction::North),
            _ => None,
        };
        let (first, second) = if dx.abs() >= dy.abs() {
            (horizontal, vertical)
        } else {
            (vertical, horizontal)
        };

        let open = |dir: Direction| {
            let next = start.offset(dir.delta());
            player != Some(next) && Self::is_expandable(window, next)
        };
        first
            .into_iter()
            .chain(second)
            .chain(Direction::ALL)
            .find(|&dir| open(dir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WindowConfig;
    use labyrinth_procedural::{
        AutoGate, Chunk, ChunkFactory, ChunkHazards, ChunkKind, ChunkSeed, DoorSpec, RunContext, TileGrid,
    };

    const T: i64 = 16;

    /// `#` wall, `.` floor, `C` chest, `O` air tank, `D` door,
    /// `S` silver door, `G` open gate, `g` closed gate, `R` reactor.
    fn window_from(rows: &[&str]) -> ChunkWindow {
        let (width, height) = (rows[0].len(), rows.len());
        let mut grid = TileGrid::filled(width, height, TileKind::Wall);
        let mut gates = Vec::new();
        for (y, row) in rows.iter().enumerate() {
            for (x, c) in row.chars().enumerate() {
                let pos = TilePos::new(x, y);
                let kind = match c {
                    '#' => TileKind::Wall,
                    'C' => TileKind::Chest,
                    'O' => TileKind::Oxygen,
                    'D' => TileKind::Door,
                    'S' => TileKind::SilverDoor,
                    'R' => TileKind::Reactor,
                    'G' | 'g' => {
                        gates.push(AutoGate {
                            pos,
                            passed: c == 'g',
                            closed: c == 'g',
                        });
                        TileKind::AutoGate
                    }
                    _ => TileKind::Floor,
                };
                grid.set(pos, kind);
            }
        }
        let chunk = Chunk {
            index: 0,
            seed: ChunkSeed::new("path-0"),
            kind: ChunkKind::Maze,
            grid,
            entry: Direction::West,
            door: DoorSpec::on_side(Direction::East, 1, width, height),
            chest: TilePos::new(1, 1),
            entrance: TilePos::new(0, 1),
            hazards: ChunkHazards {
                auto_gates: gates,
                ..ChunkHazards::default()
            },
            attempts: 1,
            fallback: false,
            chest_opened: false,
            door_unlocked: false,
            entrance_sealed: false,
        };
        let mut window = ChunkWindow::new(WindowConfig::default(), T);
        window.push(chunk, WorldPos::default());
        window
    }

    /// Reference BFS over the local grid of a single-chunk window.
    fn bfs_distance(window: &ChunkWindow, start: GlobalTile, target: GlobalTile) -> Option<usize> {
        let mut dist: HashMap<GlobalTile, usize> = HashMap::new();
        let mut queue = VecDeque::from([start]);
        dist.insert(start, 0);
        while let Some(current) = queue.pop_front() {
            if current == target {
                return dist.get(&current).copied();
            }
            let d = dist[&current];
            for (dx, dy) in [(0, -1), (1, 0), (0, 1), (-1, 0)] {
                let next = GlobalTile::new(current.x + dx, current.y + dy);
                if dist.contains_key(&next) {
                    continue;
                }
                let passable = window.locate_tile(next).is_some_and(|l| {
                    !matches!(
                        l.kind,
                        TileKind::Wall | TileKind::Reactor | TileKind::SilverDoor | TileKind::Door | TileKind::Special
                    )
                });
                if passable {
                    dist.insert(next, d + 1);
                    queue.push_back(next);
                }
            }
        }
        None
    }

    #[test]
    fn test_first_step_on_shortest_path() {
        let window = window_from(&["#######", "#.....#", "#.###.#", "#.....#", "#######"]);
        let finder = GridPathfinder::default();
        let start = GlobalTile::new(1, 1);
        let target = GlobalTile::new(5, 3);
        let path = finder.path(&window, start, None, |t| t == target).unwrap();
        assert_eq!(path.len(), 6);
        assert_eq!(path.last(), Some(&target));
        let step = finder.step_toward(&window, start, target, None).unwrap();
        assert!(matches!(step, Direction::East | Direction::South));
    }

    #[test]
    fn test_path_length_is_optimal_in_carved_maze() {
        let factory = ChunkFactory::default();
        let mut ctx = RunContext::new("optimal");
        let chunk = factory.opening_chunk(&mut ctx);
        let start = GlobalTile::new(chunk.entrance.x as i64, chunk.entrance.y as i64);
        let (width, height) = (chunk.width(), chunk.height());
        let mut window = ChunkWindow::new(WindowConfig::default(), T);
        window.push(chunk, WorldPos::default());

        let finder = GridPathfinder::default();
        let mut checked = 0;
        for y in 0..height as i64 {
            for x in 0..width as i64 {
                let target = GlobalTile::new(x, y);
                if target == start || !GridPathfinder::is_expandable(&window, target) {
                    continue;
                }
                let expected = bfs_distance(&window, start, target);
                let found = finder.path(&window, start, None, |t| t == target).map(|p| p.len());
                assert_eq!(found, expected, "target {target:?}");
                checked += 1;
            }
        }
        assert!(checked > 0);
    }

    #[test]
    fn test_player_tile_blocks_but_can_be_target() {
        let window = window_from(&["#####", "#...#", "#####"]);
        let finder = GridPathfinder::default();
        let start = GlobalTile::new(1, 1);
        let player = GlobalTile::new(2, 1);
        assert_eq!(finder.step_toward(&window, start, GlobalTile::new(3, 1), Some(player)), None);
        assert_eq!(finder.step_toward(&window, start, player, Some(player)), Some(Direction::East));
    }

    #[test]
    fn test_standing_on_target_stays_put() {
        let window = window_from(&["#####", "#...#", "#####"]);
        let finder = GridPathfinder::default();
        let here = GlobalTile::new(2, 1);
        assert_eq!(finder.step_toward(&window, here, here, None), None);
        assert_eq!(GridPathfinder::fallback_step(&window, here, here, None), None);
    }

    #[test]
    fn test_closed_gate_forces_detour() {
        let rows_closed = ["#######", "#..g..#", "#.###.#", "#.....#", "#######"];
        let rows_open = ["#######", "#..G..#", "#.###.#", "#.....#", "#######"];
        let finder = GridPathfinder::default();
        let start = GlobalTile::new(1, 1);
        let target = GlobalTile::new(5, 1);
        let closed = window_from(&rows_closed);
        assert_eq!(finder.step_toward(&closed, start, target, None), Some(Direction::South));
        let open = window_from(&rows_open);
        assert_eq!(finder.step_toward(&open, start, target, None), Some(Direction::East));
    }

    #[test]
    fn test_barriers_block_search() {
        let window = window_from(&["#######", "#.S.D.#", "#######"]);
        let finder = GridPathfinder::default();
        let start = GlobalTile::new(1, 1);
        assert!(finder.path(&window, start, None, |t| t == GlobalTile::new(3, 1)).is_none());
        assert!(!GridPathfinder::is_expandable(&window, GlobalTile::new(4, 1)));
        assert!(!GridPathfinder::is_expandable(&window, GlobalTile::new(-3, 1)));
    }

    #[test]
    fn test_nearest_objective() {
        let window = window_from(&["#######", "#O...C#", "#######"]);
        let finder = GridPathfinder::default();
        assert_eq!(
            finder.step_toward_nearest(&window, GlobalTile::new(4, 1), None, is_objective),
            Some(Direction::East)
        );
        assert_eq!(
            finder.step_toward_nearest(&window, GlobalTile::new(2, 1), None, is_objective),
            Some(Direction::West)
        );
        let empty = window_from(&["#####", "#...#", "#####"]);
        assert_eq!(finder.step_toward_nearest(&empty, GlobalTile::new(1, 1), None, is_objective), None);
    }

    #[test]
    fn test_budget_exhaustion_uses_heuristic() {
        let window = window_from(&["#######", "#.....#", "#.###.#", "#.....#", "#######"]);
        let finder = GridPathfinder::new(PathfinderConfig { max_nodes: 1 });
        let start = GlobalTile::new(1, 1);
        let target = GlobalTile::new(5, 3);
        assert!(finder.path(&window, start, None, |t| t == target).is_none());
        assert_eq!(finder.step_toward(&window, start, target, None), Some(Direction::East));
    }
}
