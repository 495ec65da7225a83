use std::path::PathBuf;

use apsp::format::{self, UNREACHABLE_SENTINEL};
use apsp::{
    Distance, DistanceMatrix, Error, Graph, MatrixBuilder, PoolConfig, RunConfig, run_apsp,
    run_file,
};
use proptest::prelude::*;
use tempfile::TempDir;

fn chain() -> Graph {
    Graph::from_edges(4, [(0, 1, 1), (1, 2, 2), (0, 2, 5), (2, 3, 1)]).unwrap()
}

#[tokio::test]
async fn test_result_file_reads_back_as_graph() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("chain.out");

    let matrix = run_apsp(&chain(), &PoolConfig::default()).await.unwrap();
    format::write_matrix(&path, &matrix).await.unwrap();

    let reread = format::read_graph(&path).await.unwrap();
    assert_eq!(reread.vertex_count(), 4);
    for i in 0..4 {
        for j in 0..4 {
            let want = match matrix.get(i, j) {
                Distance::Reachable(d) => d as u32,
                Distance::Unreachable => UNREACHABLE_SENTINEL as u32,
            };
            assert_eq!(reread.weight(i, j), want, "cell ({i}, {j})");
        }
    }
}

#[tokio::test]
async fn test_run_file_derives_output_path() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("chain.in");
    format::write_graph(&input, &chain()).await.unwrap();

    let config = RunConfig {
        input: input.clone(),
        output: None,
        pool: PoolConfig {
            workers: 3,
            ..PoolConfig::default()
        },
    };
    let written = run_file(&config).await.unwrap();
    assert_eq!(written, dir.path().join("chain.out"));

    let result = format::read_graph(&written).await.unwrap();
    assert_eq!(result.row(0), &[0, 1, 3, 4]);
    assert_eq!(result.row(3), &[i32::MAX as u32, i32::MAX as u32, i32::MAX as u32, 0]);
}

#[tokio::test]
async fn test_explicit_output_path_wins() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("g");
    let output = dir.path().join("distances.bin");
    format::write_graph(&input, &Graph::from_raw(1, vec![0]).unwrap())
        .await
        .unwrap();

    let config = RunConfig {
        input,
        output: Some(output.clone()),
        pool: PoolConfig::default(),
    };
    assert_eq!(run_file(&config).await.unwrap(), output);
    assert_eq!(format::read_graph(&output).await.unwrap().row(0), &[0]);
}

#[tokio::test]
async fn test_missing_input_is_fatal() {
    let dir = TempDir::new().unwrap();
    let config = RunConfig {
        input: dir.path().join("absent.in"),
        output: None,
        pool: PoolConfig::default(),
    };
    match run_file(&config).await {
        Err(Error::InvalidInputFile { path, .. }) => assert!(path.ends_with("absent.in")),
        other => panic!("expected InvalidInputFile, got {other:?}"),
    }
    assert!(!dir.path().join("absent.out").exists());
}

#[tokio::test]
async fn test_truncated_input_is_malformed() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("short.in");
    let mut bytes = format::encode_graph(&chain()).unwrap();
    bytes.truncate(bytes.len() - 4);
    tokio::fs::write(&input, bytes).await.unwrap();

    let config = RunConfig {
        input: PathBuf::from(&input),
        output: None,
        pool: PoolConfig::default(),
    };
    assert!(matches!(
        run_file(&config).await,
        Err(Error::MalformedGraph(_))
    ));
}

fn distance_strategy() -> impl Strategy<Value = Distance> {
    prop_oneof![
        1 => Just(Distance::Unreachable),
        3 => (0..UNREACHABLE_SENTINEL as u64).prop_map(Distance::Reachable),
    ]
}

fn matrix_strategy() -> impl Strategy<Value = DistanceMatrix> {
    (1usize..=8).prop_flat_map(|n| {
        prop::collection::vec(prop::collection::vec(distance_strategy(), n), n).prop_map(
            move |rows| {
                let mut builder = MatrixBuilder::new(n);
                builder.insert_rows(0, rows).unwrap();
                builder.finish().unwrap()
            },
        )
    })
}

fn file_graph_strategy() -> impl Strategy<Value = Graph> {
    (1usize..=8).prop_flat_map(|n| {
        prop::collection::vec(0..=i32::MAX as u32, n * n)
            .prop_map(move |weights| Graph::from_raw(n, weights).unwrap())
    })
}

proptest! {
    /// A result file decodes as a graph whose weights are the distances, with
    /// the sentinel standing in for unreachable targets.
    #[test]
    fn result_file_reads_back_as_graph(matrix in matrix_strategy()) {
        let bytes = format::encode_matrix(&matrix).unwrap();
        let graph = format::decode_graph(&bytes).unwrap();
        prop_assert_eq!(graph.vertex_count(), matrix.vertex_count());
        for i in 0..matrix.vertex_count() {
            for j in 0..matrix.vertex_count() {
                let want = match matrix.get(i, j) {
                    Distance::Reachable(d) => d as u32,
                    Distance::Unreachable => UNREACHABLE_SENTINEL as u32,
                };
                prop_assert_eq!(graph.weight(i, j), want);
            }
        }
    }

    #[test]
    fn graph_file_round_trips(graph in file_graph_strategy()) {
        let bytes = format::encode_graph(&graph).unwrap();
        prop_assert_eq!(bytes.len(), 4 * (1 + graph.vertex_count() * graph.vertex_count()));
        prop_assert_eq!(format::decode_graph(&bytes).unwrap(), graph);
    }
}
