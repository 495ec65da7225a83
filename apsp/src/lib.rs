//! Distributed all-pairs shortest paths.
//!
//! `apsp` runs single-source Dijkstra from every vertex of a dense weighted
//! digraph and spreads those independent runs over a coordinator and a pool of
//! workers that share nothing and talk only through point-to-point links.
//!
//! # Protocol
//!
//! - The coordinator splits the `V` source rows into contiguous blocks, one per
//!   worker, with the remainder going to the lowest-numbered workers.
//! - Each worker receives its block header and, if the block is non-empty, a
//!   copy of the graph; it solves its rows and sends them back.
//! - The coordinator collects replies in ascending worker order and assembles
//!   the [`DistanceMatrix`]. Without workers it solves every row itself.
//!
//! # Example
//!
//! ```no_run
//! use apsp::{Distance, Graph, PoolConfig, run_apsp};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let graph = Graph::from_edges(4, [(0, 1, 1), (1, 2, 2), (0, 2, 5), (2, 3, 1)])?;
//!     let config = PoolConfig {
//!         workers: 3,
//!         ..PoolConfig::default()
//!     };
//!
//!     let matrix = run_apsp(&graph, &config).await?;
//!     assert_eq!(matrix.get(0, 3), Distance::Reachable(4));
//!     assert_eq!(matrix.get(3, 0), Distance::Unreachable);
//!     Ok(())
//! }
//! ```

mod coordinator;
mod distance;
mod error;
pub mod format;
pub mod generate;
mod graph;
mod partition;
pub mod protocol;
mod run;
pub mod solver;
pub mod transport;
mod worker;

pub use coordinator::{CollectOrder, Coordinator, CoordinatorConfig};
pub use distance::{Distance, DistanceMatrix, DistanceVector, MatrixBuilder};
pub use error::{Error, Result};
pub use graph::{Graph, NO_EDGE};
pub use partition::{WorkAssignment, WorkerId, expected_responses, partition};
pub use run::{PoolConfig, RunConfig, TransportKind, run_apsp, run_file};
pub use worker::{Worker, WorkerOutcome, WorkerState};
