//! Region search over the hex grid: ranges, rings, flood fill and the
//! connectivity search used for win detection

use crate::hex::{Coord, Cube};
use rustc_hash::{FxHashMap, FxHashSet};
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// An unordered set of cells
pub type Region = FxHashSet<Coord>;

/// All cells within `n` steps of `center`, centre included
pub fn range(center: Coord, n: u32) -> Region {
    let n = n as i32;
    let c = center.to_cube();
    let mut results = Region::default();
    for dx in -n..=n {
        for dy in (-n).max(-dx - n)..=n.min(-dx + n) {
            let delta = Cube::new(dx, dy, -dx - dy);
            results.insert((c + delta).to_offset());
        }
    }
    results
}

/// Cells at exactly `radius` steps from `center`, found by expanding the
/// frontier one layer per round. Empty for radius 0.
pub fn ring(center: Coord, radius: u32) -> Region {
    if radius == 0 {
        return Region::default();
    }

    let mut visited = Region::default();
    visited.insert(center);
    let mut frontier = Region::default();
    frontier.insert(center);

    for _ in 0..radius {
        let mut next = Region::default();
        for cell in &frontier {
            for n in cell.neighbors() {
                if visited.insert(n) {
                    next.insert(n);
                }
            }
        }
        frontier = next;
    }
    frontier
}

/// Flood fill: every cell reachable from `start` in at most `movement` steps
/// without entering `blocked`. Includes `start`.
pub fn reachable(start: Coord, movement: u32, blocked: &Region) -> Region {
    let mut visited = Region::default();
    visited.insert(start);
    let mut fringe = vec![start];

    for _ in 0..movement {
        let mut next = Vec::new();
        for cell in fringe {
            for n in cell.neighbors() {
                if !blocked.contains(&n) && visited.insert(n) {
                    next.push(n);
                }
            }
        }
        if next.is_empty() {
            break;
        }
        fringe = next;
    }
    visited
}

/// Search for a chain of cells joining `start` to `goal`, stepping only on
/// cells of `area` (anywhere when `area` is `None`).
///
/// Returns the chain from the first step up to and including `goal`, or
/// `None` when `goal` cannot be reached. The frontier is ordered by distance
/// to `goal` only; the chain connects but is not necessarily shortest. An
/// unbounded search (`area == None`) always terminates because the heuristic
/// walks straight toward the goal.
pub fn connects(start: Coord, goal: Coord, area: Option<&Region>) -> Option<Vec<Coord>> {
    if start == goal {
        return Some(Vec::new());
    }

    let mut came_from: FxHashMap<Coord, Coord> = FxHashMap::default();
    let mut frontier = BinaryHeap::new();
    let mut seq: u64 = 0;
    frontier.push(Reverse((0u32, seq, start)));

    let mut found = false;
    while let Some(Reverse((_, _, current))) = frontier.pop() {
        if current == goal {
            found = true;
            break;
        }
        for next in current.neighbors() {
            if area.is_some_and(|a| !a.contains(&next)) {
                continue;
            }
            if next == start || came_from.contains_key(&next) {
                continue;
            }
            came_from.insert(next, current);
            seq += 1;
            frontier.push(Reverse((next.distance_to(goal), seq, next)));
        }
    }

    if !found {
        return None;
    }

    let mut chain = Vec::new();
    let mut current = goal;
    while current != start {
        chain.push(current);
        current = came_from[&current];
    }
    chain.reverse();
    Some(chain)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(cells: &[(i32, i32)]) -> Region {
        cells.iter().map(|&(x, y)| Coord::new(x, y)).collect()
    }

    #[test]
    fn test_range() {
        let center = Coord::new(5, 5);
        assert_eq!(range(center, 0), region(&[(5, 5)]));
        assert_eq!(range(center, 1).len(), 7);
        assert_eq!(range(center, 2).len(), 19);
        assert!(range(center, 2).iter().all(|c| c.distance_to(center) <= 2));
    }

    #[test]
    fn test_ring() {
        let center = Coord::new(3, 4);
        assert!(ring(center, 0).is_empty());
        for radius in 1..4 {
            let r = ring(center, radius);
            assert_eq!(r.len() as u32, 6 * radius);
            assert!(r.iter().all(|c| c.distance_to(center) == radius));
        }
    }

    #[test]
    fn test_reachable_respects_blocked() {
        let start = Coord::new(0, 0);
        let free = reachable(start, 2, &Region::default());
        assert_eq!(free, range(start, 2));

        // Wall off every neighbor: nothing but the start is reachable
        let wall: Region = start.neighbors().collect();
        assert_eq!(reachable(start, 3, &wall), region(&[(0, 0)]));
    }

    #[test]
    fn test_connects_same_cell() {
        let a = Coord::new(2, 2);
        let area = region(&[(2, 2)]);
        assert_eq!(connects(a, a, Some(&area)), Some(Vec::new()));
    }

    #[test]
    fn test_connects_through_area() {
        let start = Coord::new(0, 0);
        let goal = Coord::new(4, 0);
        let area = region(&[(1, 0), (2, 0), (3, 0), (4, 0)]);
        let chain = connects(start, goal, Some(&area)).unwrap();
        assert_eq!(chain.last(), Some(&goal));
        assert!(!chain.contains(&start));
        assert!(chain.iter().all(|c| area.contains(c)));
    }

    #[test]
    fn test_connects_gap_is_unreachable() {
        let start = Coord::new(0, 0);
        let goal = Coord::new(4, 0);
        let area = region(&[(1, 0), (3, 0), (4, 0)]);
        assert_eq!(connects(start, goal, Some(&area)), None);
    }

    #[test]
    fn test_connects_detour() {
        // Straight line blocked, path must bend around through row 1
        let start = Coord::new(0, 0);
        let goal = Coord::new(3, 0);
        let area = region(&[(0, 1), (1, 1), (2, 1), (3, 0)]);
        let chain = connects(start, goal, Some(&area)).unwrap();
        assert_eq!(chain.last(), Some(&goal));
        let mut prev = start;
        for cell in chain {
            assert_eq!(prev.distance_to(cell), 1);
            prev = cell;
        }
    }

    #[test]
    fn test_connects_unbounded() {
        let start = Coord::new(0, 0);
        let goal = Coord::new(6, 9);
        let chain = connects(start, goal, None).unwrap();
        assert_eq!(chain.last(), Some(&goal));
    }
}
