use crate::config::Config;
use crate::error::{Error, Result};
use crate::graph::{try_vec, Graph};
use crate::matching::Matching;

/// Contract `graph` along `matching` into its coarse graph. Each coarse
/// column gathers the 1-3 fine vertices of its group, sums their node
/// weights, and scatters their edges through a column-local hash keyed by
/// coarse id; parallel edges merge by summing weights and self-loops are
/// dropped. Initial flip gains on the coarse graph are minus each column's
/// incident edge weight.
pub fn coarsen(graph: &Graph, matching: &Matching, config: &Config) -> Result<Graph> {
    let cn = matching.cn;
    let nz = graph.nz();

    let mut cp = try_vec(0usize, cn + 1, "coarse pointers")?;
    // contraction never adds entries, so the fine nz bounds the coarse nz
    let mut ci = try_vec(0usize, nz, "coarse indices")?;
    let mut cx = try_vec(0.0f64, nz, "coarse weights")?;
    let mut cw = try_vec(0.0f64, cn, "coarse node weights")?;
    let mut gains = try_vec(0.0f64, cn, "coarse vertex gains")?;

    // htable[t] holds the write position of coarse neighbor t; a value
    // below the current column start means t has not been seen this column.
    let mut htable: Vec<isize> = try_vec(-1, cn, "coarsening hash table")?;

    let mut munch = 0usize;
    let mut x_total = 0.0f64;

    for k in 0..cn {
        let group = matching.cycle(matching.invmatchmap[k]);

        let ps = munch;
        cp[k] = munch;

        let mut node_weight = 0.0;
        let mut sum_edge_weights = 0.0;
        for vertex in group.iter().flatten() {
            node_weight += graph.w[*vertex];

            for pp in graph.p[*vertex]..graph.p[*vertex + 1] {
                let to_coarse = matching.matchmap[graph.i[pp]];
                if to_coarse == k {
                    // contracted self-edge
                    continue;
                }

                let edge_weight = graph.x[pp];
                sum_edge_weights += edge_weight;

                let cp_slot = htable[to_coarse];
                if cp_slot < ps as isize {
                    htable[to_coarse] = munch as isize;
                    ci[munch] = to_coarse;
                    cx[munch] = edge_weight;
                    munch += 1;
                } else {
                    cx[cp_slot as usize] += edge_weight;
                }
            }
        }

        cw[k] = node_weight;
        x_total += sum_edge_weights;
        gains[k] = -sum_edge_weights;
    }

    cp[cn] = munch;
    ci.truncate(munch);
    cx.truncate(munch);

    let coarse = Graph {
        n: cn,
        p: cp,
        i: ci,
        x: cx,
        w: cw,
        total_node_weight: graph.total_node_weight,
        // every surviving undirected edge was accumulated from both of its
        // coarse columns
        total_edge_weight: x_total / 2.0,
        vertex_gains: gains,
    };

    if config.do_expensive_checks {
        check_coarse_graph(graph, &coarse)?;
    }
    Ok(coarse)
}

fn check_coarse_graph(fine: &Graph, coarse: &Graph) -> Result<()> {
    let mut w = 0.0;
    for k in 0..coarse.n {
        if coarse.degree(k) == 0 && coarse.n > 1 {
            return Err(Error::InvariantViolation {
                what: "coarse graph has an isolated vertex",
            });
        }
        w += coarse.w[k];
    }
    let eps = fine.total_node_weight * f64::EPSILON * fine.n as f64;
    if (w - fine.total_node_weight).abs() > eps {
        return Err(Error::InvariantViolation {
            what: "coarsening changed the total node weight",
        });
    }
    Ok(())
}
