//! In-process worker pools and end-to-end runs.
//!
//! Every worker is a tokio task with its own link to the coordinator and its
//! own copy of the graph. A run is all-or-nothing: if the coordinator or any
//! worker fails, the remaining workers are aborted and no matrix is returned.

use std::path::PathBuf;

use futures_util::future::try_join_all;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::coordinator::{Coordinator, CoordinatorConfig};
use crate::distance::DistanceMatrix;
use crate::format;
use crate::graph::Graph;
use crate::partition::WorkerId;
use crate::transport::{CoordinatorLink, WorkerLink, channel_pair, stream_pair};
use crate::worker::{Worker, WorkerOutcome};
use crate::{Error, Result};

/// How the coordinator talks to its in-process workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportKind {
    /// Typed messages over tokio channels.
    #[default]
    Channel,
    /// Encoded frames over in-memory byte pipes.
    Wire,
}

#[derive(Debug, Clone, Default)]
pub struct PoolConfig {
    /// Number of workers besides the coordinator. `0` solves on the coordinator.
    pub workers: usize,
    pub transport: TransportKind,
    pub coordinator: CoordinatorConfig,
}

/// A complete file-to-file run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub input: PathBuf,
    /// Explicit result path; derived from `input` when absent.
    pub output: Option<PathBuf>,
    pub pool: PoolConfig,
}

/// Computes all-pairs shortest paths of `graph` on a fresh worker pool.
pub async fn run_apsp(graph: &Graph, config: &PoolConfig) -> Result<DistanceMatrix> {
    match config.transport {
        TransportKind::Channel => {
            let (links, workers) = spawn_pool(config.workers, channel_pair);
            drive(graph, links, workers, config).await
        }
        TransportKind::Wire => {
            let (links, workers) = spawn_pool(config.workers, stream_pair);
            drive(graph, links, workers, config).await
        }
    }
}

/// Reads the graph, computes the matrix and writes it out.
///
/// The output path is settled before any work starts. Returns the path written.
pub async fn run_file(config: &RunConfig) -> Result<PathBuf> {
    let output = match &config.output {
        Some(path) => path.clone(),
        None => format::derive_output_path(&config.input)?,
    };

    let graph = format::read_graph(&config.input).await?;
    info!(
        input = %config.input.display(),
        vertices = graph.vertex_count(),
        workers = config.pool.workers,
        "graph loaded"
    );

    let matrix = run_apsp(&graph, &config.pool).await?;
    format::write_matrix(&output, &matrix).await?;
    info!(output = %output.display(), "results written");
    Ok(output)
}

type WorkerHandle = JoinHandle<Result<WorkerOutcome>>;

fn spawn_pool<C, W>(
    workers: usize,
    connect: impl Fn(WorkerId) -> (C, W),
) -> (Vec<C>, Vec<WorkerHandle>)
where
    W: WorkerLink + 'static,
{
    (1..=workers)
        .map(|rank| {
            let id = WorkerId::new(rank);
            let (link, worker_link) = connect(id);
            let handle = tokio::spawn(Worker::new(id, worker_link).run());
            (link, handle)
        })
        .unzip()
}

async fn drive<C: CoordinatorLink>(
    graph: &Graph,
    links: Vec<C>,
    workers: Vec<WorkerHandle>,
    config: &PoolConfig,
) -> Result<DistanceMatrix> {
    let coordinator = Coordinator::new(links).with_config(config.coordinator.clone());
    let matrix = match coordinator.run(graph).await {
        Ok(matrix) => matrix,
        Err(err) => return Err(abort_pool(err, workers).await),
    };

    let outcomes = try_join_all(workers)
        .await
        .map_err(|e| Error::WorkerPanicked(e.to_string()))?;
    let mut idle = 0;
    for outcome in outcomes {
        if outcome? == WorkerOutcome::Idle {
            idle += 1;
        }
    }
    debug!(idle, "worker pool drained");
    Ok(matrix)
}

/// Stops every worker after the coordinator failed with `err`.
///
/// A worker that had already failed on its own usually caused the coordinator
/// error, so its error is reported instead. Workers that only saw the
/// coordinator hang up add nothing.
async fn abort_pool(err: Error, workers: Vec<WorkerHandle>) -> Error {
    for worker in &workers {
        worker.abort();
    }

    let mut cause = None;
    for worker in workers {
        match worker.await {
            Ok(Err(Error::ChannelClosed(peer))) if peer.is_coordinator() => {}
            Ok(Err(worker_err)) if cause.is_none() => cause = Some(worker_err),
            Ok(Err(worker_err)) => debug!(error = %worker_err, "further worker failure"),
            Ok(Ok(_)) => {}
            Err(join) if join.is_cancelled() => {}
            Err(join) if cause.is_none() => cause = Some(Error::WorkerPanicked(join.to_string())),
            Err(_) => {}
        }
    }

    match cause {
        Some(cause) => {
            warn!(coordinator = %err, worker = %cause, "worker failed before the coordinator");
            cause
        }
        None => err,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::channel_pair;

    #[tokio::test]
    async fn test_worker_failure_is_reported_over_hangup() {
        let graph = Graph::from_edges(2, [(0, 1, 3)]).unwrap();
        let (link, end) = channel_pair(WorkerId::new(1));
        let worker: WorkerHandle = tokio::spawn(async move {
            drop(end);
            Err(Error::MalformedGraph("rejected by worker".to_string()))
        });

        let err = drive(&graph, vec![link], vec![worker], &PoolConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MalformedGraph(ref msg) if msg == "rejected by worker"));
    }

    #[tokio::test]
    async fn test_coordinator_error_kept_when_workers_are_fine() {
        let graph = Graph::from_edges(2, [(0, 1, 3)]).unwrap();
        let (link, end) = channel_pair(WorkerId::new(1));
        let worker: WorkerHandle = tokio::spawn(async move {
            drop(end);
            Ok(WorkerOutcome::Idle)
        });

        let err = drive(&graph, vec![link], vec![worker], &PoolConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ChannelClosed(peer) if peer == WorkerId::new(1)));
    }
}
