//! Dense weighted directed graph stored as a flat adjacency matrix.

use crate::Error;

/// Weight value meaning "no edge".
///
/// A zero weight and a missing edge share this encoding, so zero-weight edges
/// cannot be expressed.
pub const NO_EDGE: u32 = 0;

/// Immutable `V × V` adjacency matrix.
///
/// `weight(i, j)` is the weight of the edge `i -> j`, or [`NO_EDGE`]. Weights are
/// kept in one row-major buffer; row `i` starts at `i * V`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Graph {
    vertex_count: usize,
    weights: Vec<u32>,
}

impl Graph {
    /// Builds a graph from a row-major weight buffer of length `vertex_count²`.
    pub fn from_raw(vertex_count: usize, weights: Vec<u32>) -> Result<Self, Error> {
        if vertex_count == 0 {
            return Err(Error::MalformedGraph(
                "graph must have at least one vertex".to_string(),
            ));
        }
        let expected = vertex_count
            .checked_mul(vertex_count)
            .ok_or_else(|| Error::MalformedGraph(format!("{vertex_count} vertices overflow")))?;
        if weights.len() != expected {
            return Err(Error::MalformedGraph(format!(
                "{} weights for {} vertices, expected {}",
                weights.len(),
                vertex_count,
                expected
            )));
        }
        Ok(Self {
            vertex_count,
            weights,
        })
    }

    /// Builds a graph from nested rows; every row must be as long as the outer vector.
    pub fn from_rows(rows: Vec<Vec<u32>>) -> Result<Self, Error> {
        let n = rows.len();
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != n) {
            return Err(Error::MalformedGraph(format!(
                "row {} has {} columns, expected {}",
                i,
                row.len(),
                n
            )));
        }
        Self::from_raw(n, rows.into_iter().flatten().collect())
    }

    /// Builds a graph with `vertex_count` vertices and the given `(from, to, weight)` edges.
    pub fn from_edges(
        vertex_count: usize,
        edges: impl IntoIterator<Item = (usize, usize, u32)>,
    ) -> Result<Self, Error> {
        let mut graph = Self::from_raw(vertex_count, vec![NO_EDGE; vertex_count * vertex_count])?;
        for (from, to, weight) in edges {
            if from >= vertex_count || to >= vertex_count {
                return Err(Error::MalformedGraph(format!(
                    "edge {from}->{to} outside {vertex_count} vertices"
                )));
            }
            graph.weights[from * vertex_count + to] = weight;
        }
        Ok(graph)
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn weight(&self, from: usize, to: usize) -> u32 {
        self.weights[from * self.vertex_count + to]
    }

    /// Outgoing weights of `vertex`.
    pub fn row(&self, vertex: usize) -> &[u32] {
        let start = vertex * self.vertex_count;
        &self.weights[start..start + self.vertex_count]
    }

    pub fn has_edge(&self, from: usize, to: usize) -> bool {
        self.weight(from, to) != NO_EDGE
    }

    /// The row-major weight buffer.
    pub fn weights(&self) -> &[u32] {
        &self.weights
    }

    pub fn into_weights(self) -> Vec<u32> {
        self.weights
    }
}
