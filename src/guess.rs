use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{Config, GuessCutType};
use crate::error::Result;
use crate::graph::{try_vec, Graph};
use crate::partition::PartitionInfo;

/// Seed a bisection of the coarsest graph. Every strategy finishes with a
/// single FM dance to clean up its seams.
pub fn initial_guess(graph: &Graph, config: &Config) -> Result<PartitionInfo> {
    let mut info = match config.guess_cut_type {
        GuessCutType::Random => guess_random(graph, config)?,
        GuessCutType::NaturalOrder => guess_natural_order(graph, config)?,
        GuessCutType::Qp => guess_qp(graph, config)?,
        GuessCutType::PseudoperipheralFast => guess_pseudoperipheral(graph, config)?,
    };
    crate::fm::fm_refine_once(graph, &mut info, config)?;
    Ok(info)
}

/// Coin-flip sides from the seeded PRNG, then greedily move the best
/// vertex off the heavy side until the split is inside tolerance (or no
/// mover remains, in which case the imbalance stands and is reported).
fn guess_random(graph: &Graph, config: &Config) -> Result<PartitionInfo> {
    let mut rng = StdRng::seed_from_u64(config.random_seed);
    let side: Vec<usize> = (0..graph.n).map(|_| usize::from(rng.gen::<bool>())).collect();
    let mut info = PartitionInfo::from_sides(graph, side, config)?;

    let mut moved = try_vec(false, graph.n, "guess balance locks")?;
    while info.imbalance > config.tolerance {
        let heavy = if info.part_weight[1] >= config.target_split * graph.total_node_weight {
            1
        } else {
            0
        };
        // best gain on the heavy side, lower index on ties
        let mut pick = None;
        for k in 0..graph.n {
            if info.side[k] != heavy || moved[k] {
                continue;
            }
            let better = match pick {
                None => true,
                Some(best) => info.vertex_gains[k] > info.vertex_gains[best],
            };
            if better {
                pick = Some(k);
            }
        }
        let Some(k) = pick else {
            break;
        };
        moved[k] = true;
        let mut side = std::mem::take(&mut info.side);
        side[k] = 1 - heavy;
        info = PartitionInfo::from_sides(graph, side, config)?;
    }
    Ok(info)
}

/// First vertices in natural order fill the target side until its weight
/// reaches the target share.
fn guess_natural_order(graph: &Graph, config: &Config) -> Result<PartitionInfo> {
    let target = config.target_split * graph.total_node_weight;
    let mut side = try_vec(0usize, graph.n, "guess sides")?;
    let mut acc = 0.0;
    for k in 0..graph.n {
        if acc >= target {
            break;
        }
        side[k] = 1;
        acc += graph.w[k];
    }
    PartitionInfo::from_sides(graph, side, config)
}

/// Relax from the uniform point x = target_split and round.
fn guess_qp(graph: &Graph, config: &Config) -> Result<PartitionInfo> {
    let x0 = try_vec(config.target_split, graph.n, "guess relaxation")?;
    let x = crate::qp::qp_optimize(graph, x0, config)?;
    let side = crate::qp::round_sides(&x);
    PartitionInfo::from_sides(graph, side, config)
}

/// Locate a pseudoperipheral vertex by alternating BFS sweeps, then grow
/// the target side in BFS order from it until the target share is reached.
/// Disconnected remainders restart the sweep at the lowest untouched
/// vertex.
fn guess_pseudoperipheral(graph: &Graph, config: &Config) -> Result<PartitionInfo> {
    let mut start = 0;
    let mut eccentricity = 0;
    for _sweep in 0..config.guess_search_depth {
        let (farthest, depth) = bfs_farthest(graph, start)?;
        if depth <= eccentricity {
            break;
        }
        eccentricity = depth;
        start = farthest;
    }

    let target = config.target_split * graph.total_node_weight;
    let mut side = try_vec(0usize, graph.n, "guess sides")?;
    let mut touched = try_vec(false, graph.n, "bfs visit flags")?;
    let mut queue = try_vec(0usize, graph.n, "bfs queue")?;

    let mut acc = 0.0;
    let mut head = 0;
    let mut tail = 0;
    queue[tail] = start;
    tail += 1;
    touched[start] = true;
    let mut next_restart = 0;

    while acc < target {
        if head == tail {
            // ran out of component; restart at the lowest untouched vertex
            while next_restart < graph.n && touched[next_restart] {
                next_restart += 1;
            }
            if next_restart == graph.n {
                break;
            }
            queue[tail] = next_restart;
            tail += 1;
            touched[next_restart] = true;
            continue;
        }
        let k = queue[head];
        head += 1;
        side[k] = 1;
        acc += graph.w[k];
        for &j in graph.neighbors(k) {
            if !touched[j] {
                queue[tail] = j;
                tail += 1;
                touched[j] = true;
            }
        }
    }

    PartitionInfo::from_sides(graph, side, config)
}

/// Farthest vertex from `start` in its component (first reached among the
/// deepest BFS layer) and the layer depth.
fn bfs_farthest(graph: &Graph, start: usize) -> Result<(usize, usize)> {
    let mut depth = try_vec(usize::MAX, graph.n, "bfs depths")?;
    let mut queue = try_vec(0usize, graph.n, "bfs queue")?;
    let mut head = 0;
    let mut tail = 0;
    queue[tail] = start;
    tail += 1;
    depth[start] = 0;

    let mut farthest = start;
    while head < tail {
        let k = queue[head];
        head += 1;
        if depth[k] > depth[farthest] {
            farthest = k;
        }
        for &j in graph.neighbors(k) {
            if depth[j] == usize::MAX {
                depth[j] = depth[k] + 1;
                queue[tail] = j;
                tail += 1;
            }
        }
    }
    Ok((farthest, depth[farthest]))
}
