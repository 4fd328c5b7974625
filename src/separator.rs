use tracing::debug;

use crate::coarsen::coarsen;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::graph::{try_vec, Graph};
use crate::guess::initial_guess;
use crate::matching::{match_graph, Matching};
use crate::partition::PartitionInfo;

/// Result of a partitioning call: per-vertex side assignment, the cut
/// cost, and the achieved imbalance against the target split.
#[derive(Clone, Debug)]
pub struct Partition {
    pub side: Vec<usize>,
    pub cut_cost: f64,
    pub imbalance: f64,
}

/// Compute a balanced 2-way edge separator of `graph` with the multilevel
/// engine: match and contract until the graph is small or stops shrinking,
/// seed a bisection there, then refine while projecting back up the chain.
///
/// The graph must satisfy the data-model invariants; build it through
/// [`Graph::from_csc`](crate::Graph::from_csc) or
/// [`condition`](crate::condition).
pub fn compute_edge_separator(graph: &Graph, config: &Config) -> Result<Partition> {
    config.validate()?;

    let info = partition_level(graph, config, 0)?;

    if config.do_expensive_checks {
        check_partition(graph, &info)?;
    }

    Ok(Partition {
        cut_cost: info.cut_cost,
        imbalance: info.imbalance,
        side: info.side,
    })
}

/// One level of the multilevel recursion. Each coarse graph and its
/// matching live on this frame and drop on exit, so the chain owns exactly
/// one graph per active level and an allocation failure below unwinds
/// through `?` releasing every level it passed.
fn partition_level(graph: &Graph, config: &Config, level: usize) -> Result<PartitionInfo> {
    let mut info = if graph.n <= config.coarsen_limit {
        debug!(level, n = graph.n, "coarsest level reached, guessing");
        initial_guess(graph, config)?
    } else {
        let matching = match_graph(graph, config)?;
        let stalled = matching.cn as f64 > config.coarsen_fraction() * graph.n as f64;
        if stalled {
            // coarsening no longer makes progress; not an error, guess here
            debug!(level, n = graph.n, cn = matching.cn, "coarsening stalled");
            initial_guess(graph, config)?
        } else {
            let coarse = coarsen(graph, &matching, config)?;
            debug!(
                level,
                n = graph.n,
                coarse_n = coarse.n,
                coarse_nz = coarse.nz(),
                "coarsened"
            );
            let coarse_info = partition_level(&coarse, config, level + 1)?;
            project(graph, &matching, coarse_info, config)?
        }
    };

    waterdance(graph, &mut info, config)?;
    debug!(
        level,
        cut = info.cut_cost,
        imbalance = info.imbalance,
        "level refined"
    );
    Ok(info)
}

/// Pull a coarse partition down one level through the inverse matching and
/// rebuild boundary, cut, and imbalance on the finer graph.
fn project(
    graph: &Graph,
    matching: &Matching,
    coarse_info: PartitionInfo,
    config: &Config,
) -> Result<PartitionInfo> {
    let mut side = try_vec(0usize, graph.n, "projected sides")?;
    for k in 0..graph.n {
        side[k] = coarse_info.side[matching.matchmap[k]];
    }
    PartitionInfo::from_sides(graph, side, config)
}

/// The per-level refinement alternation: FM, then QP with an FM pass right
/// after its rounding, `num_dances` times.
fn waterdance(graph: &Graph, info: &mut PartitionInfo, config: &Config) -> Result<()> {
    for _dance in 0..config.num_dances {
        if config.use_fm {
            crate::fm::fm_refine(graph, info, config)?;
        }
        if config.use_qp_grad_proj {
            crate::qp::qp_refine(graph, info, config)?;
            if config.use_fm {
                // clean up the rounding
                crate::fm::fm_refine(graph, info, config)?;
            }
        }
    }
    Ok(())
}

fn check_partition(graph: &Graph, info: &PartitionInfo) -> Result<()> {
    let mut weight = 0.0;
    for k in 0..graph.n {
        if info.side[k] > 1 {
            return Err(Error::InvariantViolation {
                what: "vertex assigned to neither side",
            });
        }
        weight += graph.w[k];
    }
    let eps = graph.total_node_weight * f64::EPSILON * graph.n as f64;
    if (weight - graph.total_node_weight).abs() > eps {
        return Err(Error::InvariantViolation {
            what: "partitioned node weight disagrees with the graph total",
        });
    }
    Ok(())
}
