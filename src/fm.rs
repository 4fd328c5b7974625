use crate::config::Config;
use crate::error::Result;
use crate::graph::{try_vec, Graph};
use crate::partition::{imbalance, PartitionInfo};
use crate::priority_queue::PriorityQueue;

/// Fiduccia-Mattheyses boundary refinement: single-vertex flips drawn from
/// twin gain queues, with incremental cut/gain/boundary maintenance and
/// rollback to the best state each dance observed. The returned cut never
/// exceeds the cut at entry.
pub fn fm_refine(graph: &Graph, info: &mut PartitionInfo, config: &Config) -> Result<()> {
    refine(graph, info, config, config.fm_max_num_refinements)
}

/// A single dance; the guesses use this as their cleanup pass.
pub fn fm_refine_once(graph: &Graph, info: &mut PartitionInfo, config: &Config) -> Result<()> {
    refine(graph, info, config, 1)
}

fn refine(
    graph: &Graph,
    info: &mut PartitionInfo,
    config: &Config,
    max_dances: usize,
) -> Result<()> {
    let n = graph.n;
    let mut queues = [PriorityQueue::create(n), PriorityQueue::create(n)];
    let mut moved = try_vec(false, n, "fm move locks")?;
    let mut swaps: Vec<usize> = Vec::new();

    for _dance in 0..max_dances {
        let entry_cut = info.cut_cost;

        queues[0].reset();
        queues[1].reset();
        for &k in info.boundary_list.iter() {
            queues[info.side[k]].insert(k, info.vertex_gains[k]);
        }

        swaps.clear();
        let mut best_cut = info.cut_cost;
        let mut best_imbalance = info.imbalance;
        let mut watermark = 0;
        let mut non_improving = 0;

        for _ in 0..config.fm_search_depth {
            let candidate = pick_candidate(graph, info, config, &queues);
            let v = match candidate {
                Some(v) => v,
                None => break,
            };

            queues[info.side[v]].delete(v);
            flip_forward(graph, info, config, v, &mut queues, &moved);
            moved[v] = true;
            swaps.push(v);

            let improved = info.cut_cost < best_cut
                || (info.cut_cost == best_cut && info.imbalance < best_imbalance);
            if improved {
                best_cut = info.cut_cost;
                best_imbalance = info.imbalance;
                watermark = swaps.len();
                non_improving = 0;
            } else {
                non_improving += 1;
                if non_improving >= config.fm_consider_count {
                    break;
                }
            }
        }

        // roll back everything after the best state seen this dance
        for idx in (watermark..swaps.len()).rev() {
            flip_back(graph, info, config, swaps[idx]);
        }
        info.cut_cost = best_cut;
        info.imbalance = best_imbalance;

        for &v in swaps.iter() {
            moved[v] = false;
        }

        if best_cut >= entry_cut {
            break;
        }
    }

    if config.do_expensive_checks {
        info.check(graph, config)?;
    }
    Ok(())
}

/// Choose the next flip: highest gain across the twin queues, equal top
/// gains preferring the side whose shrink reduces imbalance. A candidate
/// whose move would leave the split outside tolerance without improving a
/// currently-violated balance is rejected; when both tops are rejected the
/// dance is over.
fn pick_candidate(
    graph: &Graph,
    info: &PartitionInfo,
    config: &Config,
    queues: &[PriorityQueue; 2],
) -> Option<usize> {
    let over_side = if info.part_weight[1] >= config.target_split * graph.total_node_weight {
        1
    } else {
        0
    };

    let preferred = match (queues[0].peek(), queues[1].peek()) {
        (None, None) => return None,
        (Some(_), None) => 0,
        (None, Some(_)) => 1,
        (Some((_, g0)), Some((_, g1))) => {
            if g0 > g1 {
                0
            } else if g1 > g0 {
                1
            } else {
                over_side
            }
        }
    };

    for side in [preferred, 1 - preferred] {
        let candidate = queues[side].peek();
        if let Some((v, _)) = candidate {
            if acceptable_move(graph, info, config, v) {
                return Some(v);
            }
        }
    }
    None
}

fn acceptable_move(graph: &Graph, info: &PartitionInfo, config: &Config, v: usize) -> bool {
    let w_v = graph.w[v];
    let new_weight = if info.side[v] == 0 {
        [info.part_weight[0] - w_v, info.part_weight[1] + w_v]
    } else {
        [info.part_weight[0] + w_v, info.part_weight[1] - w_v]
    };
    let new_imbalance = imbalance(graph, &new_weight, config);
    new_imbalance <= config.tolerance || new_imbalance < info.imbalance
}

/// Flip v and maintain all incremental state, rekeying unlocked neighbors
/// as their gains change.
fn flip_forward(
    graph: &Graph,
    info: &mut PartitionInfo,
    config: &Config,
    v: usize,
    queues: &mut [PriorityQueue; 2],
    moved: &[bool],
) {
    let to = flip_state(graph, info, config, v);

    for (&j, &x) in graph.weighted_neighbors(v) {
        let became_internal = info.side[j] == to;
        if became_internal {
            info.vertex_gains[j] -= 2.0 * x;
            info.external_degree[j] -= 1;
        } else {
            info.vertex_gains[j] += 2.0 * x;
            info.external_degree[j] += 1;
        }

        if info.external_degree[j] == 0 {
            // no longer a boundary vertex
            info.boundary_delete(j);
            if !moved[j] {
                queues[info.side[j]].delete(j);
            }
        } else if !info.in_boundary(j) {
            // just became one
            info.boundary_insert(j);
            if !moved[j] {
                queues[info.side[j]].insert(j, info.vertex_gains[j]);
            }
        } else if !moved[j] {
            queues[info.side[j]].update(j, info.vertex_gains[j]);
        }
    }
}

/// Undo a flip during rollback: identical updates, no queues to maintain.
fn flip_back(graph: &Graph, info: &mut PartitionInfo, config: &Config, v: usize) {
    let to = flip_state(graph, info, config, v);

    for (&j, &x) in graph.weighted_neighbors(v) {
        if info.side[j] == to {
            info.vertex_gains[j] -= 2.0 * x;
            info.external_degree[j] -= 1;
        } else {
            info.vertex_gains[j] += 2.0 * x;
            info.external_degree[j] += 1;
        }

        if info.external_degree[j] == 0 {
            info.boundary_delete(j);
        } else if !info.in_boundary(j) {
            info.boundary_insert(j);
        }
    }
}

/// The vertex-local part of a flip; returns the destination side.
fn flip_state(graph: &Graph, info: &mut PartitionInfo, config: &Config, v: usize) -> usize {
    let from = info.side[v];
    let to = 1 - from;

    info.side[v] = to;
    info.part_weight[to] += graph.w[v];
    info.part_weight[from] -= graph.w[v];
    info.cut_cost -= info.vertex_gains[v];
    info.imbalance = imbalance(graph, &info.part_weight, config);
    info.vertex_gains[v] = -info.vertex_gains[v];
    info.external_degree[v] = graph.degree(v) - info.external_degree[v];

    if info.external_degree[v] == 0 {
        if info.in_boundary(v) {
            info.boundary_delete(v);
        }
    } else if !info.in_boundary(v) {
        info.boundary_insert(v);
    }

    to
}
