//! Worker side of the distribution protocol.

use std::ops::Range;

use tracing::{debug, info, trace};

use crate::distance::DistanceVector;
use crate::graph::Graph;
use crate::partition::WorkerId;
use crate::protocol::{AssignmentHeader, CoordinatorMessage, RowBlock, WorkerMessage};
use crate::solver;
use crate::transport::WorkerLink;
use crate::{Error, Result};

/// Position of a worker in the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    AwaitingAssignment,
    AwaitingGraph,
    Computing,
    Reporting,
    Done,
}

/// How a worker left the protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerOutcome {
    /// Assigned no rows; exited after the header without replying.
    Idle,
    /// Solved and returned `row_count` rows starting at `start_row`.
    Completed { start_row: usize, row_count: usize },
}

/// A worker bound to its link to the coordinator.
///
/// The worker owns the graph copy it receives and never shares it; its only
/// output is the [`WorkerMessage::Rows`] it sends back.
pub struct Worker<L> {
    id: WorkerId,
    link: L,
    state: WorkerState,
}

impl<L: WorkerLink> Worker<L> {
    pub fn new(id: WorkerId, link: L) -> Self {
        Self {
            id,
            link,
            state: WorkerState::AwaitingAssignment,
        }
    }

    pub fn id(&self) -> WorkerId {
        self.id
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    /// Runs the protocol to completion.
    ///
    /// Receives the assignment header and, when rows were assigned, the graph;
    /// solves the assigned rows and sends them back in one block.
    pub async fn run(mut self) -> Result<WorkerOutcome> {
        let header = self.recv_assignment().await?;
        if header.row_count == 0 {
            debug!(worker = %self.id, "no rows assigned, leaving");
            self.transition(WorkerState::Done);
            return Ok(WorkerOutcome::Idle);
        }

        self.transition(WorkerState::AwaitingGraph);
        let graph = self.recv_graph(&header).await?;

        self.transition(WorkerState::Computing);
        let range = header.start_row..header.start_row + header.row_count;
        let rows = compute_block(graph, range).await?;

        self.transition(WorkerState::Reporting);
        self.link
            .send(WorkerMessage::Rows(RowBlock {
                start_row: header.start_row,
                rows,
            }))
            .await?;

        self.transition(WorkerState::Done);
        info!(
            worker = %self.id,
            rows = header.row_count,
            offset = header.start_row,
            "rows returned"
        );
        Ok(WorkerOutcome::Completed {
            start_row: header.start_row,
            row_count: header.row_count,
        })
    }

    async fn recv_assignment(&mut self) -> Result<AssignmentHeader> {
        match self.link.recv().await? {
            CoordinatorMessage::Assignment(header) => Ok(header),
            other => Err(Error::UnexpectedMessage {
                peer: self.link.peer(),
                expected: "assignment",
                got: other.kind(),
            }),
        }
    }

    async fn recv_graph(&mut self, header: &AssignmentHeader) -> Result<Graph> {
        let graph = match self.link.recv().await? {
            CoordinatorMessage::Graph(graph) => graph,
            other => {
                return Err(Error::UnexpectedMessage {
                    peer: self.link.peer(),
                    expected: "graph",
                    got: other.kind(),
                });
            }
        };

        let n = graph.vertex_count();
        if n != header.vertex_count || header.start_row + header.row_count > n {
            return Err(Error::MalformedGraph(format!(
                "{} got a {n}-vertex graph for rows {}..+{} of {}",
                self.id, header.start_row, header.row_count, header.vertex_count
            )));
        }
        Ok(graph)
    }

    fn transition(&mut self, next: WorkerState) {
        trace!(worker = %self.id, from = ?self.state, to = ?next, "state change");
        self.state = next;
    }
}

/// Solves `rows` of `graph` on the blocking pool.
///
/// The result is zero-based: entry `k` holds the distances from source
/// `rows.start + k`.
pub(crate) async fn compute_block(graph: Graph, rows: Range<usize>) -> Result<Vec<DistanceVector>> {
    tokio::task::spawn_blocking(move || solver::solve_range(&graph, rows))
        .await
        .map_err(|e| Error::WorkerPanicked(e.to_string()))
}
