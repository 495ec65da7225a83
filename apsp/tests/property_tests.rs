//! Property-based tests for the partitioner and the shortest-path solver.

use apsp::{Distance, Graph, expected_responses, partition, solver};
use proptest::prelude::*;

// -----------------------------------------------------------------------------
// Partitioner
// -----------------------------------------------------------------------------

proptest! {
    /// Blocks are contiguous, cover every row once and differ by at most one row.
    #[test]
    fn partition_covers_rows_once(vertices in 1usize..500, workers in 1usize..64) {
        let plan = partition(vertices, workers);
        prop_assert_eq!(plan.len(), workers);

        let base = vertices / workers;
        let extra = vertices % workers;
        let mut next = 0;
        for (i, assignment) in plan.iter().enumerate() {
            prop_assert_eq!(assignment.worker.rank(), i + 1);
            prop_assert_eq!(assignment.start_row, next);
            let want = if i < extra { base + 1 } else { base };
            prop_assert_eq!(assignment.row_count, want);
            next += assignment.row_count;
        }
        prop_assert_eq!(next, vertices);
    }

    /// With more workers than rows, the first V get one row and the rest none.
    #[test]
    fn partition_with_surplus_workers(vertices in 1usize..32, surplus in 1usize..32) {
        let workers = vertices + surplus;
        let plan = partition(vertices, workers);
        for assignment in &plan {
            let want = usize::from(assignment.worker.rank() <= vertices);
            prop_assert_eq!(assignment.row_count, want);
        }
        prop_assert_eq!(expected_responses(&plan), vertices);
    }
}

// -----------------------------------------------------------------------------
// Solver vs. brute force
// -----------------------------------------------------------------------------

/// Floyd–Warshall over the same "zero means no edge" encoding.
fn brute_force(graph: &Graph) -> Vec<Vec<Option<u64>>> {
    let n = graph.vertex_count();
    let mut dist = vec![vec![None; n]; n];
    for i in 0..n {
        dist[i][i] = Some(0);
        for j in 0..n {
            let w = graph.weight(i, j);
            if i != j && w > 0 {
                dist[i][j] = Some(u64::from(w));
            }
        }
    }
    for k in 0..n {
        for i in 0..n {
            for j in 0..n {
                if let (Some(a), Some(b)) = (dist[i][k], dist[k][j]) {
                    if dist[i][j].is_none_or(|current| a + b < current) {
                        dist[i][j] = Some(a + b);
                    }
                }
            }
        }
    }
    dist
}

fn graph_strategy() -> impl Strategy<Value = Graph> {
    (1usize..=6).prop_flat_map(|n| {
        // Zero-heavy weights so that unreachable pairs show up often.
        prop::collection::vec(prop_oneof![2 => Just(0u32), 3 => 1u32..1_000], n * n)
            .prop_map(move |weights| Graph::from_raw(n, weights).unwrap())
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn solver_matches_brute_force(graph in graph_strategy()) {
        let expected = brute_force(&graph);
        for source in 0..graph.vertex_count() {
            let got = solver::solve(&graph, source);
            let want: Vec<Distance> = expected[source].iter().copied().map(Distance::from).collect();
            prop_assert_eq!(got, want, "source {}", source);
        }
    }
}
