//! Random graphs for exercising the pipeline.

use rand::Rng;

use crate::graph::{Graph, NO_EDGE};
use crate::{Error, Result};

#[derive(Debug, Clone, Copy)]
pub struct GraphSpec {
    pub vertices: usize,
    /// Probability that any ordered pair `i != j` gets an edge.
    pub density: f64,
    /// Edge weights are drawn uniformly from `1..=max_weight`.
    pub max_weight: u32,
}

impl GraphSpec {
    fn validate(&self) -> Result<()> {
        if self.vertices == 0 {
            return Err(Error::Config("vertices must be at least 1".to_string()));
        }
        if !(0.0..=1.0).contains(&self.density) {
            return Err(Error::Config(format!(
                "density must be within 0..=1, got {}",
                self.density
            )));
        }
        if self.max_weight == 0 || self.max_weight > i32::MAX as u32 {
            return Err(Error::Config(format!(
                "max weight must be within 1..={}, got {}",
                i32::MAX,
                self.max_weight
            )));
        }
        Ok(())
    }
}

/// Draws a graph without self-loops.
pub fn random_graph<R: Rng + ?Sized>(spec: &GraphSpec, rng: &mut R) -> Result<Graph> {
    spec.validate()?;
    let n = spec.vertices;
    let mut weights = vec![NO_EDGE; n * n];
    for from in 0..n {
        for to in 0..n {
            if from != to && rng.gen_bool(spec.density) {
                weights[from * n + to] = rng.gen_range(1..=spec.max_weight);
            }
        }
    }
    Graph::from_raw(n, weights)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_full_density_connects_every_pair() {
        let spec = GraphSpec {
            vertices: 5,
            density: 1.0,
            max_weight: 3,
        };
        let g = random_graph(&spec, &mut StdRng::seed_from_u64(7)).unwrap();
        for i in 0..5 {
            for j in 0..5 {
                assert_eq!(g.has_edge(i, j), i != j);
                assert!(g.weight(i, j) <= 3);
            }
        }
    }

    #[test]
    fn test_same_seed_same_graph() {
        let spec = GraphSpec {
            vertices: 8,
            density: 0.4,
            max_weight: 50,
        };
        let a = random_graph(&spec, &mut StdRng::seed_from_u64(42)).unwrap();
        let b = random_graph(&spec, &mut StdRng::seed_from_u64(42)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_rejects_bad_spec() {
        let mut rng = StdRng::seed_from_u64(1);
        for spec in [
            GraphSpec { vertices: 0, density: 0.5, max_weight: 1 },
            GraphSpec { vertices: 3, density: 1.5, max_weight: 1 },
            GraphSpec { vertices: 3, density: 0.5, max_weight: 0 },
        ] {
            assert!(matches!(random_graph(&spec, &mut rng), Err(Error::Config(_))));
        }
    }
}
