//! Shortest-path distances and the all-pairs result matrix.

use std::fmt;

use crate::Error;

/// Length of a shortest path, or the absence of one.
///
/// `Reachable` orders before `Unreachable`, so the minimum over a set of
/// distances is the shortest known path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Distance {
    Reachable(u64),
    Unreachable,
}

impl From<Option<u64>> for Distance {
    fn from(value: Option<u64>) -> Self {
        value.map_or(Distance::Unreachable, Distance::Reachable)
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Distance::Reachable(d) => write!(f, "{d}"),
            Distance::Unreachable => f.write_str("∞"),
        }
    }
}

/// Distances from one source to every vertex.
pub type DistanceVector = Vec<Distance>;

/// `V × V` all-pairs result; row `i` holds distances from source `i`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistanceMatrix {
    vertex_count: usize,
    cells: Vec<Distance>,
}

impl DistanceMatrix {
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn get(&self, source: usize, target: usize) -> Distance {
        self.cells[source * self.vertex_count + target]
    }

    pub fn row(&self, source: usize) -> &[Distance] {
        let start = source * self.vertex_count;
        &self.cells[start..start + self.vertex_count]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Distance]> {
        self.cells.chunks(self.vertex_count)
    }
}

/// Assembles a [`DistanceMatrix`] from row blocks arriving in any order.
///
/// Every row must be inserted exactly once before [`MatrixBuilder::finish`]
/// succeeds.
#[derive(Debug)]
pub struct MatrixBuilder {
    vertex_count: usize,
    rows: Vec<Option<DistanceVector>>,
}

impl MatrixBuilder {
    pub fn new(vertex_count: usize) -> Self {
        Self {
            vertex_count,
            rows: vec![None; vertex_count],
        }
    }

    /// Stores `rows` at `start_row..start_row + rows.len()`.
    pub fn insert_rows(&mut self, start_row: usize, rows: Vec<DistanceVector>) -> Result<(), Error> {
        let end = start_row + rows.len();
        if end > self.vertex_count {
            return Err(Error::MalformedResult(format!(
                "rows {start_row}..{end} outside {} vertices",
                self.vertex_count
            )));
        }
        for (offset, row) in rows.into_iter().enumerate() {
            let index = start_row + offset;
            if row.len() != self.vertex_count {
                return Err(Error::MalformedResult(format!(
                    "row {index} has {} entries, expected {}",
                    row.len(),
                    self.vertex_count
                )));
            }
            let slot = &mut self.rows[index];
            if slot.is_some() {
                return Err(Error::DuplicateRows(index));
            }
            *slot = Some(row);
        }
        Ok(())
    }

    pub fn filled(&self) -> usize {
        self.rows.iter().filter(|row| row.is_some()).count()
    }

    pub fn finish(self) -> Result<DistanceMatrix, Error> {
        let mut cells = Vec::with_capacity(self.vertex_count * self.vertex_count);
        for (index, row) in self.rows.into_iter().enumerate() {
            cells.extend(row.ok_or(Error::MissingRows(index))?);
        }
        Ok(DistanceMatrix {
            vertex_count: self.vertex_count,
            cells,
        })
    }
}
