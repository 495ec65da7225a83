//! Binary graph and result files.
//!
//! Both files share one layout: a 32-bit vertex count `V` followed by `V × V`
//! 32-bit integers in row-major order, all little-endian. In a graph file entry
//! `(i, j)` is the weight of edge `i -> j` (`0` for none); in a result file it is
//! the shortest distance from `i` to `j`, with [`UNREACHABLE_SENTINEL`] for "no
//! path". A result file therefore reads back as a graph with the same integers.

use std::path::{Path, PathBuf};

use crate::distance::{Distance, DistanceMatrix};
use crate::graph::Graph;
use crate::{Error, Result};

/// Result-file value for an unreachable target.
pub const UNREACHABLE_SENTINEL: i32 = i32::MAX;

/// Longest derived output path, in bytes.
pub const MAX_OUTPUT_PATH_BYTES: usize = 255;

const WORD: usize = std::mem::size_of::<i32>();

/// Parses a graph file image.
pub fn decode_graph(bytes: &[u8]) -> Result<Graph> {
    let (head, body) = bytes
        .split_first_chunk::<WORD>()
        .ok_or_else(|| Error::MalformedGraph("missing vertex count".to_string()))?;

    let declared = i32::from_le_bytes(*head);
    if declared < 1 {
        return Err(Error::MalformedGraph(format!(
            "vertex count must be positive, got {declared}"
        )));
    }
    let vertex_count = declared as usize;

    let expected = vertex_count
        .checked_mul(vertex_count)
        .and_then(|cells| cells.checked_mul(WORD))
        .ok_or_else(|| Error::MalformedGraph(format!("{vertex_count} vertices overflow")))?;
    if body.len() != expected {
        return Err(Error::MalformedGraph(format!(
            "{vertex_count} vertices need {expected} bytes of weights, found {}",
            body.len()
        )));
    }

    let weights = body
        .chunks_exact(WORD)
        .enumerate()
        .map(|(cell, chunk)| {
            let mut word = [0u8; WORD];
            word.copy_from_slice(chunk);
            let weight = i32::from_le_bytes(word);
            u32::try_from(weight).map_err(|_| {
                Error::MalformedGraph(format!(
                    "negative weight {weight} on edge {}->{}",
                    cell / vertex_count,
                    cell % vertex_count
                ))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Graph::from_raw(vertex_count, weights)
}

/// Serialises a graph in the file layout.
pub fn encode_graph(graph: &Graph) -> Result<Vec<u8>> {
    let n = graph.vertex_count();
    let mut buf = Vec::with_capacity(WORD * (1 + n * n));
    push_word(&mut buf, n, || {
        Error::MalformedGraph(format!("{n} vertices do not fit the file format"))
    })?;
    for (cell, &weight) in graph.weights().iter().enumerate() {
        push_word(&mut buf, weight as usize, || {
            Error::MalformedGraph(format!(
                "weight {weight} on edge {}->{} does not fit the file format",
                cell / n,
                cell % n
            ))
        })?;
    }
    Ok(buf)
}

/// Serialises a distance matrix in the file layout.
///
/// Reachable distances must stay below [`UNREACHABLE_SENTINEL`].
pub fn encode_matrix(matrix: &DistanceMatrix) -> Result<Vec<u8>> {
    let n = matrix.vertex_count();
    let mut buf = Vec::with_capacity(WORD * (1 + n * n));
    push_word(&mut buf, n, || {
        Error::MalformedResult(format!("{n} vertices do not fit the file format"))
    })?;
    for (source, row) in matrix.rows().enumerate() {
        for (target, distance) in row.iter().enumerate() {
            let value = match *distance {
                Distance::Reachable(d) if d < UNREACHABLE_SENTINEL as u64 => d as i32,
                Distance::Reachable(_) => {
                    return Err(Error::DistanceOverflow {
                        from: source,
                        to: target,
                    });
                }
                Distance::Unreachable => UNREACHABLE_SENTINEL,
            };
            buf.extend_from_slice(&value.to_le_bytes());
        }
    }
    Ok(buf)
}

fn push_word(buf: &mut Vec<u8>, value: usize, err: impl FnOnce() -> Error) -> Result<()> {
    let word = i32::try_from(value).map_err(|_| err())?;
    buf.extend_from_slice(&word.to_le_bytes());
    Ok(())
}

/// Reads and validates a graph file.
pub async fn read_graph(path: &Path) -> Result<Graph> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| Error::InvalidInputFile {
            path: path.to_path_buf(),
            source,
        })?;
    decode_graph(&bytes)
}

pub async fn write_graph(path: &Path, graph: &Graph) -> Result<()> {
    write_file(path, encode_graph(graph)?).await
}

pub async fn write_matrix(path: &Path, matrix: &DistanceMatrix) -> Result<()> {
    write_file(path, encode_matrix(matrix)?).await
}

async fn write_file(path: &Path, bytes: Vec<u8>) -> Result<()> {
    tokio::fs::write(path, bytes)
        .await
        .map_err(|source| Error::OutputFile {
            path: path.to_path_buf(),
            source,
        })
}

/// Result path for `input`: its last two characters replaced by `ou`, then `t`
/// appended, so `graph.in` becomes `graph.out`.
pub fn derive_output_path(input: &Path) -> Result<PathBuf> {
    let constraint = |reason: String| Error::FilenameConstraint {
        path: input.to_path_buf(),
        reason,
    };

    let name = input
        .to_str()
        .ok_or_else(|| constraint("path is not valid UTF-8".to_string()))?;
    let cut = name
        .char_indices()
        .rev()
        .nth(1)
        .map(|(index, _)| index)
        .ok_or_else(|| constraint("path needs at least two characters".to_string()))?;

    let derived = format!("{}out", &name[..cut]);
    if derived.len() > MAX_OUTPUT_PATH_BYTES {
        return Err(constraint(format!(
            "derived path is {} bytes, limit is {MAX_OUTPUT_PATH_BYTES}",
            derived.len()
        )));
    }
    Ok(PathBuf::from(derived))
}

/// Text rendering of a graph or result file, one row per line.
pub fn render(graph: &Graph) -> String {
    let n = graph.vertex_count();
    let mut out = format!("{n}\n");
    for i in 0..n {
        let cells: Vec<String> = graph
            .row(i)
            .iter()
            .map(|&w| {
                if w == UNREACHABLE_SENTINEL as u32 {
                    "∞".to_string()
                } else {
                    w.to_string()
                }
            })
            .collect();
        out.push_str(&cells.join(" "));
        out.push('\n');
    }
    out
}
