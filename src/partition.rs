use crate::config::Config;
use crate::error::{Error, Result};
use crate::graph::{try_vec, Graph};

/// Mutable 2-way partition state over one graph: per-vertex side, side
/// weights, cut cost, imbalance, flip gains, external degrees, and the
/// boundary set as a compact list with a back index.
#[derive(Clone, Debug)]
pub struct PartitionInfo {
    /// 0 or 1 per vertex.
    pub side: Vec<usize>,
    pub part_weight: [f64; 2],
    /// Sum of edge weights crossing the cut, each undirected edge once.
    pub cut_cost: f64,
    /// |W_1 / W - target_split|; side 1 is the target side, matching the
    /// QP relaxation where x = 1 carries the weight constraint.
    pub imbalance: f64,
    /// Gain from flipping: external minus internal incident weight.
    pub vertex_gains: Vec<f64>,
    /// Count of neighbors on the opposite side.
    pub external_degree: Vec<usize>,
    pub boundary_list: Vec<usize>,
    pub boundary_ptr: Vec<Option<usize>>,
}

impl PartitionInfo {
    /// Rebuild full partition state from a side assignment, walking the
    /// graph in CSC order so repeated runs reduce identically.
    pub fn from_sides(graph: &Graph, side: Vec<usize>, config: &Config) -> Result<PartitionInfo> {
        let n = graph.n;
        let mut info = PartitionInfo {
            side,
            part_weight: [0.0, 0.0],
            cut_cost: 0.0,
            imbalance: 0.0,
            vertex_gains: try_vec(0.0, n, "partition gains")?,
            external_degree: try_vec(0, n, "external degrees")?,
            boundary_list: Vec::new(),
            boundary_ptr: try_vec(None, n, "boundary back index")?,
        };

        for k in 0..n {
            info.part_weight[info.side[k]] += graph.w[k];
        }

        let mut cut2 = 0.0;
        for k in 0..n {
            let me = info.side[k];
            let mut internal = 0.0;
            let mut external = 0.0;
            let mut external_degree = 0;
            for (&j, &x) in graph.weighted_neighbors(k) {
                if info.side[j] == me {
                    internal += x;
                } else {
                    external += x;
                    external_degree += 1;
                }
            }
            info.vertex_gains[k] = external - internal;
            info.external_degree[k] = external_degree;
            if external_degree > 0 {
                info.boundary_insert(k);
                cut2 += external;
            }
        }

        info.cut_cost = cut2 / 2.0;
        info.imbalance = imbalance(graph, &info.part_weight, config);
        Ok(info)
    }

    pub fn in_boundary(&self, k: usize) -> bool {
        self.boundary_ptr[k].is_some()
    }

    pub fn boundary_insert(&mut self, k: usize) {
        self.boundary_list.push(k);
        self.boundary_ptr[k] = Some(self.boundary_list.len() - 1);
    }

    /// Swap-remove from the compact boundary list.
    pub fn boundary_delete(&mut self, k: usize) {
        let slot = self.boundary_ptr[k].take().expect("vertex not in boundary");
        let moved = self.boundary_list.pop().expect("boundary list empty");
        if moved != k {
            self.boundary_list[slot] = moved;
            self.boundary_ptr[moved] = Some(slot);
        }
    }

    /// Verify the incremental state against a from-scratch recomputation.
    pub fn check(&self, graph: &Graph, config: &Config) -> Result<()> {
        let fresh = PartitionInfo::from_sides(graph, self.side.clone(), config)?;
        let eps = graph.n as f64 * f64::EPSILON * graph.total_edge_weight.max(1.0);
        if (fresh.cut_cost - self.cut_cost).abs() > eps {
            return Err(Error::InvariantViolation {
                what: "incremental cut cost drifted from recomputation",
            });
        }
        for k in 0..graph.n {
            if fresh.external_degree[k] != self.external_degree[k] {
                return Err(Error::InvariantViolation {
                    what: "incremental external degree drifted",
                });
            }
            if self.in_boundary(k) != (self.external_degree[k] > 0) {
                return Err(Error::InvariantViolation {
                    what: "boundary membership disagrees with external degree",
                });
            }
        }
        Ok(())
    }
}

pub fn imbalance(graph: &Graph, part_weight: &[f64; 2], config: &Config) -> f64 {
    (part_weight[1] / graph.total_node_weight - config.target_split).abs()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path4() -> Graph {
        Graph::from_csc(
            4,
            vec![0, 1, 3, 5, 6],
            vec![1, 0, 2, 1, 3, 2],
            vec![1.0; 6],
            vec![1.0; 4],
        )
        .unwrap()
    }

    #[test]
    fn from_sides_computes_cut_and_boundary() {
        let g = path4();
        let config = Config::default();
        let info = PartitionInfo::from_sides(&g, vec![0, 0, 1, 1], &config).unwrap();
        assert_eq!(info.cut_cost, 1.0);
        assert_eq!(info.part_weight, [2.0, 2.0]);
        assert_eq!(info.imbalance, 0.0);
        assert_eq!(info.external_degree, vec![0, 1, 1, 0]);
        assert_eq!(info.boundary_list, vec![1, 2]);
        // flipping an interior endpoint would add an edge to the cut
        assert_eq!(info.vertex_gains, vec![-1.0, 0.0, 0.0, -1.0]);
    }

    #[test]
    fn boundary_swap_remove() {
        let g = path4();
        let config = Config::default();
        let mut info = PartitionInfo::from_sides(&g, vec![0, 0, 1, 1], &config).unwrap();
        info.boundary_delete(1);
        assert!(!info.in_boundary(1));
        assert_eq!(info.boundary_list, vec![2]);
        assert_eq!(info.boundary_ptr[2], Some(0));
        info.boundary_insert(1);
        assert!(info.in_boundary(1));
    }
}
