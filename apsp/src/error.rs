//! Error types for apsp operations.

use std::path::PathBuf;

use thiserror::Error;

use crate::partition::WorkerId;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid input file {}: {source}", path.display())]
    InvalidInputFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed graph data: {0}")]
    MalformedGraph(String),

    #[error("cannot derive output path from {}: {reason}", path.display())]
    FilenameConstraint { path: PathBuf, reason: String },

    #[error("cannot write output file {}: {source}", path.display())]
    OutputFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("frame decode error: {0}")]
    Decode(#[from] prost::DecodeError),

    #[error("frame of {0} bytes exceeds the transport limit")]
    FrameTooLarge(usize),

    #[error("channel to {0} closed")]
    ChannelClosed(WorkerId),

    #[error("timed out waiting for {0}")]
    Timeout(WorkerId),

    #[error("unexpected message from {peer}: expected {expected}, got {got}")]
    UnexpectedMessage {
        peer: WorkerId,
        expected: &'static str,
        got: &'static str,
    },

    #[error(
        "{peer} returned rows {got_start}..+{got_count}, assigned {want_start}..+{want_count}"
    )]
    AssignmentMismatch {
        peer: WorkerId,
        want_start: usize,
        want_count: usize,
        got_start: usize,
        got_count: usize,
    },

    #[error("malformed result rows: {0}")]
    MalformedResult(String),

    #[error("distance row {0} was never filled")]
    MissingRows(usize),

    #[error("distance row {0} was filled twice")]
    DuplicateRows(usize),

    #[error("distance {from}->{to} is too large to encode")]
    DistanceOverflow { from: usize, to: usize },

    #[error("worker task failed: {0}")]
    WorkerPanicked(String),
}

pub type Result<T> = std::result::Result<T, Error>;
