//! Messages exchanged between the coordinator and its workers.
//!
//! A run is two exchanges per worker:
//!
//! 1. coordinator → worker: [`CoordinatorMessage::Assignment`], followed by
//!    [`CoordinatorMessage::Graph`] only when the assignment is non-empty;
//! 2. worker → coordinator: one [`WorkerMessage::Rows`] with the solved block,
//!    again only for a non-empty assignment.
//!
//! Byte-oriented transports carry these as [`apsp_types::wire::Frame`]s via
//! [`WireMessage`].

use apsp_types::wire::{self, AssignmentFrame, Frame, GraphFrame, RowsFrame, frame::Body};

use crate::distance::{Distance, DistanceVector};
use crate::graph::Graph;
use crate::partition::{WorkAssignment, WorkerId};
use crate::{Error, Result};

/// Scalars sent ahead of the graph: dimension, first row and row count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssignmentHeader {
    pub vertex_count: usize,
    pub start_row: usize,
    pub row_count: usize,
}

impl AssignmentHeader {
    pub fn new(vertex_count: usize, assignment: &WorkAssignment) -> Self {
        Self {
            vertex_count,
            start_row: assignment.start_row,
            row_count: assignment.row_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CoordinatorMessage {
    Assignment(AssignmentHeader),
    Graph(Graph),
}

/// Solved rows `start_row..start_row + rows.len()`.
#[derive(Debug, Clone, PartialEq)]
pub struct RowBlock {
    pub start_row: usize,
    pub rows: Vec<DistanceVector>,
}

impl RowBlock {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum WorkerMessage {
    Rows(RowBlock),
}

impl CoordinatorMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            CoordinatorMessage::Assignment(_) => "assignment",
            CoordinatorMessage::Graph(_) => "graph",
        }
    }
}

impl WorkerMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            WorkerMessage::Rows(_) => "rows",
        }
    }
}

fn body_kind(body: &Option<Body>) -> &'static str {
    match body {
        Some(Body::Assignment(_)) => "assignment",
        Some(Body::Graph(_)) => "graph",
        Some(Body::Rows(_)) => "rows",
        None => "empty frame",
    }
}

fn to_u32(value: usize) -> Result<u32> {
    u32::try_from(value).map_err(|_| Error::FrameTooLarge(value))
}

/// Conversion between a protocol message and its wire frame.
pub trait WireMessage: Sized + Send + 'static {
    fn into_frame(self) -> Result<Frame>;

    /// Decodes a frame received from `peer`.
    fn from_frame(frame: Frame, peer: WorkerId) -> Result<Self>;
}

impl WireMessage for CoordinatorMessage {
    fn into_frame(self) -> Result<Frame> {
        let body = match self {
            CoordinatorMessage::Assignment(header) => Body::Assignment(AssignmentFrame {
                vertex_count: to_u32(header.vertex_count)?,
                start_row: to_u32(header.start_row)?,
                row_count: to_u32(header.row_count)?,
            }),
            CoordinatorMessage::Graph(graph) => Body::Graph(GraphFrame {
                vertex_count: to_u32(graph.vertex_count())?,
                weights: graph.into_weights(),
            }),
        };
        Ok(Frame::new(body))
    }

    fn from_frame(frame: Frame, peer: WorkerId) -> Result<Self> {
        match frame.body {
            Some(Body::Assignment(a)) => Ok(CoordinatorMessage::Assignment(AssignmentHeader {
                vertex_count: a.vertex_count as usize,
                start_row: a.start_row as usize,
                row_count: a.row_count as usize,
            })),
            Some(Body::Graph(g)) => Ok(CoordinatorMessage::Graph(Graph::from_raw(
                g.vertex_count as usize,
                g.weights,
            )?)),
            other => Err(Error::UnexpectedMessage {
                peer,
                expected: "assignment or graph",
                got: body_kind(&other),
            }),
        }
    }
}

impl WireMessage for WorkerMessage {
    fn into_frame(self) -> Result<Frame> {
        let WorkerMessage::Rows(block) = self;
        let vertex_count = block.rows.first().map_or(0, Vec::len);
        let mut distances = Vec::with_capacity(block.rows.len() * vertex_count);
        for (offset, row) in block.rows.iter().enumerate() {
            for (target, d) in row.iter().enumerate() {
                distances.push(match *d {
                    Distance::Reachable(v) => {
                        i64::try_from(v).map_err(|_| Error::DistanceOverflow {
                            from: block.start_row + offset,
                            to: target,
                        })?
                    }
                    Distance::Unreachable => wire::UNREACHABLE,
                });
            }
        }
        Ok(Frame::new(Body::Rows(RowsFrame {
            start_row: to_u32(block.start_row)?,
            row_count: to_u32(block.rows.len())?,
            vertex_count: to_u32(vertex_count)?,
            distances,
        })))
    }

    fn from_frame(frame: Frame, peer: WorkerId) -> Result<Self> {
        let rows = match frame.body {
            Some(Body::Rows(rows)) => rows,
            other => {
                return Err(Error::UnexpectedMessage {
                    peer,
                    expected: "rows",
                    got: body_kind(&other),
                });
            }
        };

        let width = rows.vertex_count as usize;
        let count = rows.row_count as usize;
        if rows.distances.len() != width * count {
            return Err(Error::MalformedResult(format!(
                "{peer} sent {} distances for {count} rows of width {width}",
                rows.distances.len()
            )));
        }

        let decoded = rows
            .distances
            .iter()
            .map(|&d| match d {
                wire::UNREACHABLE => Ok(Distance::Unreachable),
                d => u64::try_from(d)
                    .map(Distance::Reachable)
                    .map_err(|_| Error::MalformedResult(format!("{peer} sent distance {d}"))),
            })
            .collect::<Result<Vec<_>>>()?;

        let block = if width == 0 {
            Vec::new()
        } else {
            decoded.chunks(width).map(<[Distance]>::to_vec).collect()
        };

        Ok(WorkerMessage::Rows(RowBlock {
            start_row: rows.start_row as usize,
            rows: block,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_frame_keeps_unreachable_distinct() {
        let message = WorkerMessage::Rows(RowBlock {
            start_row: 2,
            rows: vec![
                vec![Distance::Reachable(0), Distance::Unreachable],
                vec![Distance::Reachable(7), Distance::Reachable(0)],
            ],
        });
        let frame = message.clone().into_frame().unwrap();
        let decoded = WorkerMessage::from_frame(frame, WorkerId::new(1)).unwrap();
        assert_eq!(decoded, message);
    }

    #[test]
    fn test_wrong_direction_is_rejected() {
        let frame = CoordinatorMessage::Assignment(AssignmentHeader {
            vertex_count: 3,
            start_row: 0,
            row_count: 1,
        })
        .into_frame()
        .unwrap();
        let err = WorkerMessage::from_frame(frame, WorkerId::new(2)).unwrap_err();
        assert!(matches!(
            err,
            Error::UnexpectedMessage {
                expected: "rows",
                got: "assignment",
                ..
            }
        ));
    }

    #[test]
    fn test_short_rows_frame_is_malformed() {
        let frame = Frame::new(Body::Rows(RowsFrame {
            start_row: 0,
            row_count: 2,
            vertex_count: 2,
            distances: vec![0, 1, 2],
        }));
        assert!(matches!(
            WorkerMessage::from_frame(frame, WorkerId::new(1)),
            Err(Error::MalformedResult(_))
        ));
    }

    #[test]
    fn test_distance_beyond_wire_range_overflows() {
        let message = WorkerMessage::Rows(RowBlock {
            start_row: 3,
            rows: vec![vec![Distance::Reachable(0), Distance::Reachable(u64::MAX)]],
        });
        assert!(matches!(
            message.into_frame(),
            Err(Error::DistanceOverflow { from: 3, to: 1 })
        ));
    }
}
