//! Deterministic division of source rows among workers.

use std::fmt;

/// Rank of a participant. Rank 0 is the coordinator; workers are numbered from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WorkerId(usize);

impl WorkerId {
    pub const COORDINATOR: WorkerId = WorkerId(0);

    pub const fn new(rank: usize) -> Self {
        Self(rank)
    }

    pub fn rank(self) -> usize {
        self.0
    }

    pub fn is_coordinator(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_coordinator() {
            f.write_str("coordinator")
        } else {
            write!(f, "worker {}", self.0)
        }
    }
}

/// Contiguous block of source rows owned by one participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkAssignment {
    pub worker: WorkerId,
    pub start_row: usize,
    pub row_count: usize,
}

impl WorkAssignment {
    pub fn rows(&self) -> std::ops::Range<usize> {
        self.start_row..self.start_row + self.row_count
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }
}

/// Splits `vertex_count` rows among `workers` workers.
///
/// With `base = V / W` and `extra = V % W`, ranks `1..=extra` receive `base + 1`
/// rows and the rest `base`, in ascending rank order starting at row 0. Ranks
/// past `V` receive empty assignments when `V < W`.
///
/// With no workers the whole range is assigned to [`WorkerId::COORDINATOR`].
pub fn partition(vertex_count: usize, workers: usize) -> Vec<WorkAssignment> {
    if workers == 0 {
        return vec![WorkAssignment {
            worker: WorkerId::COORDINATOR,
            start_row: 0,
            row_count: vertex_count,
        }];
    }

    let base = vertex_count / workers;
    let extra = vertex_count % workers;
    let mut offset = 0;

    (1..=workers)
        .map(|rank| {
            let row_count = if rank <= extra { base + 1 } else { base };
            let assignment = WorkAssignment {
                worker: WorkerId::new(rank),
                start_row: offset,
                row_count,
            };
            offset += row_count;
            assignment
        })
        .collect()
}

/// Number of workers the coordinator must hear back from.
///
/// Empty assignments and the coordinator's own share never produce a response.
pub fn expected_responses(assignments: &[WorkAssignment]) -> usize {
    assignments
        .iter()
        .filter(|a| !a.is_empty() && !a.worker.is_coordinator())
        .count()
}
