//! Single-source shortest paths over a dense adjacency matrix.
//!
//! Greedy Dijkstra without a heap: each round scans every vertex for the
//! closest unvisited one, giving `O(V²)` per source. Ties go to the lowest
//! index.

use std::ops::Range;

use crate::distance::{Distance, DistanceVector};
use crate::graph::{Graph, NO_EDGE};

/// Shortest distances from `source` to every vertex of `graph`.
///
/// Weights of [`NO_EDGE`] are skipped. Vertices that cannot be reached stay
/// [`Distance::Unreachable`].
///
/// # Panics
/// Panics if `source` is not a vertex of `graph`.
pub fn solve(graph: &Graph, source: usize) -> DistanceVector {
    let n = graph.vertex_count();
    assert!(source < n, "source {source} outside {n} vertices");

    let mut dist = vec![Distance::Unreachable; n];
    let mut visited = vec![false; n];
    dist[source] = Distance::Reachable(0);

    for _ in 1..n {
        let Some(u) = nearest_unvisited(&dist, &visited) else {
            break;
        };
        visited[u] = true;

        // Everything left is unreachable once the nearest vertex is.
        let Distance::Reachable(base) = dist[u] else {
            break;
        };

        for (y, &weight) in graph.row(u).iter().enumerate() {
            if visited[y] || weight == NO_EDGE {
                continue;
            }
            let candidate = Distance::Reachable(base + u64::from(weight));
            if candidate < dist[y] {
                dist[y] = candidate;
            }
        }
    }

    dist
}

/// Solves every source in `rows`, in order.
pub fn solve_range(graph: &Graph, rows: Range<usize>) -> Vec<DistanceVector> {
    rows.map(|source| solve(graph, source)).collect()
}

/// Unvisited vertex with the smallest distance; ties go to the lowest index.
fn nearest_unvisited(dist: &[Distance], visited: &[bool]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, d) in dist.iter().enumerate() {
        if visited[i] {
            continue;
        }
        match best {
            Some(b) if dist[b] <= *d => {}
            _ => best = Some(i),
        }
    }
    best
}
