//! Coordinator side of the distribution protocol.
//!
//! The coordinator partitions the source rows, hands every worker its
//! assignment (and the graph, when the assignment is non-empty), then collects
//! the solved rows into a [`DistanceMatrix`]. With no workers it solves every
//! row itself.
//!
//! Collection happens in ascending worker order by default: the coordinator
//! blocks on worker `k` before looking at worker `k + 1`, even if the later one
//! finished first. [`CollectOrder::Completion`] instead takes replies as they
//! arrive. Both produce the same matrix; either way any transport failure
//! aborts the run and no matrix is returned.

use std::time::{Duration, Instant};

use futures_util::stream::{FuturesUnordered, StreamExt};
use tracing::info;

use crate::distance::{DistanceMatrix, MatrixBuilder};
use crate::graph::Graph;
use crate::partition::{WorkAssignment, WorkerId, expected_responses, partition};
use crate::protocol::{AssignmentHeader, CoordinatorMessage, RowBlock, WorkerMessage};
use crate::transport::CoordinatorLink;
use crate::worker::compute_block;
use crate::{Error, Result};

/// Order in which worker replies are collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollectOrder {
    /// Strictly by ascending worker id.
    #[default]
    Ascending,
    /// Whichever worker replies first.
    Completion,
}

#[derive(Debug, Clone, Default)]
pub struct CoordinatorConfig {
    pub collect_order: CollectOrder,
    /// Limit on every send to and receive from a worker. `None` waits forever.
    pub link_timeout: Option<Duration>,
}

/// Drives one all-pairs run over a set of worker links.
///
/// `links[k]` must lead to worker `k + 1`.
pub struct Coordinator<L> {
    links: Vec<L>,
    config: CoordinatorConfig,
}

impl<L: CoordinatorLink> Coordinator<L> {
    pub fn new(links: Vec<L>) -> Self {
        Self {
            links,
            config: CoordinatorConfig::default(),
        }
    }

    pub fn with_config(mut self, config: CoordinatorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn worker_count(&self) -> usize {
        self.links.len()
    }

    /// Computes the all-pairs distance matrix of `graph`.
    pub async fn run(mut self, graph: &Graph) -> Result<DistanceMatrix> {
        let vertex_count = graph.vertex_count();
        let assignments = partition(vertex_count, self.links.len());
        let mut builder = MatrixBuilder::new(vertex_count);
        let started = Instant::now();
        self.check_links()?;

        if self.links.is_empty() {
            info!(rows = vertex_count, offset = 0, "performing rows on coordinator");
            let rows = compute_block(graph.clone(), 0..vertex_count).await?;
            builder.insert_rows(0, rows)?;
        } else {
            self.distribute(graph, &assignments).await?;

            let expected = expected_responses(&assignments);
            let idle = assignments.len() - expected;
            if idle > 0 {
                info!(idle, "not waiting for workers without rows");
            }

            match self.config.collect_order {
                CollectOrder::Ascending => self.collect_ascending(&assignments, &mut builder).await?,
                CollectOrder::Completion => {
                    self.collect_completion(&assignments, &mut builder).await?
                }
            }
        }

        let matrix = builder.finish()?;
        info!(
            vertices = vertex_count,
            workers = self.links.len(),
            elapsed = ?started.elapsed(),
            "distance matrix assembled"
        );
        Ok(matrix)
    }

    /// Every link must lead to the worker whose rows it will carry.
    fn check_links(&self) -> Result<()> {
        for (index, link) in self.links.iter().enumerate() {
            let want = WorkerId::new(index + 1);
            if link.peer() != want {
                return Err(Error::Config(format!(
                    "link {index} leads to {}, expected {want}",
                    link.peer()
                )));
            }
        }
        Ok(())
    }

    async fn distribute(&mut self, graph: &Graph, assignments: &[WorkAssignment]) -> Result<()> {
        let vertex_count = graph.vertex_count();
        let timeout = self.config.link_timeout;
        for (assignment, link) in assignments.iter().zip(self.links.iter_mut()) {
            info!(
                worker = %assignment.worker,
                rows = assignment.row_count,
                offset = assignment.start_row,
                "sending assignment"
            );

            let header = AssignmentHeader::new(vertex_count, assignment);
            send_with_timeout(link, CoordinatorMessage::Assignment(header), timeout).await?;
            if !assignment.is_empty() {
                send_with_timeout(link, CoordinatorMessage::Graph(graph.clone()), timeout).await?;
            }
        }
        Ok(())
    }

    async fn collect_ascending(
        &mut self,
        assignments: &[WorkAssignment],
        builder: &mut MatrixBuilder,
    ) -> Result<()> {
        let timeout = self.config.link_timeout;
        for (assignment, link) in assignments.iter().zip(self.links.iter_mut()) {
            if assignment.is_empty() {
                continue;
            }
            let block = recv_rows(link, timeout).await?;
            accept(assignment, block, builder)?;
        }
        Ok(())
    }

    async fn collect_completion(
        &mut self,
        assignments: &[WorkAssignment],
        builder: &mut MatrixBuilder,
    ) -> Result<()> {
        let timeout = self.config.link_timeout;
        let mut pending: FuturesUnordered<_> = assignments
            .iter()
            .zip(self.links.iter_mut())
            .filter(|(assignment, _)| !assignment.is_empty())
            .map(|(assignment, link)| async move {
                let block = recv_rows(link, timeout).await?;
                Ok::<_, Error>((assignment, block))
            })
            .collect();

        while let Some(reply) = pending.next().await {
            let (assignment, block) = reply?;
            accept(assignment, block, builder)?;
        }
        Ok(())
    }
}

async fn send_with_timeout<L: CoordinatorLink>(
    link: &mut L,
    message: CoordinatorMessage,
    timeout: Option<Duration>,
) -> Result<()> {
    let peer = link.peer();
    match timeout {
        Some(limit) => tokio::time::timeout(limit, link.send(message))
            .await
            .map_err(|_| Error::Timeout(peer))?,
        None => link.send(message).await,
    }
}

async fn recv_rows<L: CoordinatorLink>(link: &mut L, timeout: Option<Duration>) -> Result<RowBlock> {
    let peer = link.peer();
    let message = match timeout {
        Some(limit) => tokio::time::timeout(limit, link.recv())
            .await
            .map_err(|_| Error::Timeout(peer))??,
        None => link.recv().await?,
    };
    let WorkerMessage::Rows(block) = message;
    Ok(block)
}

/// Checks a reply against its assignment and stores it.
fn accept(assignment: &WorkAssignment, block: RowBlock, builder: &mut MatrixBuilder) -> Result<()> {
    if block.start_row != assignment.start_row || block.row_count() != assignment.row_count {
        return Err(Error::AssignmentMismatch {
            peer: assignment.worker,
            want_start: assignment.start_row,
            want_count: assignment.row_count,
            got_start: block.start_row,
            got_count: block.row_count(),
        });
    }
    let rows = block.row_count();
    builder.insert_rows(block.start_row, block.rows)?;
    info!(worker = %assignment.worker, rows, filled = builder.filled(), "received rows");
    Ok(())
}
