use crate::graph::Graph;
use crate::qp::{FreeStatus, QpDelta};

/// Boundary ball optimization: walk the free variables in index order and
/// pin each to 0 or 1 whenever that strictly decreases the objective while
/// keeping w.x inside [lo, hi]. Polishes the relaxation toward an integral
/// point between gradient-projection sweeps. Returns whether anything
/// moved.
pub fn ball_opt(graph: &Graph, qp: &mut QpDelta) -> bool {
    let mut any = false;

    // the free list is maintained in ascending index order
    for slot in 0..qp.free_list.len() {
        let k = qp.free_list[slot];
        if qp.status[k] != FreeStatus::Free {
            continue;
        }

        let xk = qp.x[k];
        let g = qp.gradient[k];
        let dk = qp.d[k];
        let wk = graph.w[k];

        // moving x_k by delta changes the objective by 2 g delta - d delta^2
        let mut best: Option<(f64, f64, FreeStatus)> = None;
        for (target, status) in [(0.0, FreeStatus::Lo), (1.0, FreeStatus::Hi)] {
            let delta = target - xk;
            let b_new = qp.b + wk * delta;
            if b_new < qp.lo || b_new > qp.hi {
                continue;
            }
            let df = 2.0 * g * delta - dk * delta * delta;
            if df < 0.0 && best.map_or(true, |(best_df, _, _)| df < best_df) {
                best = Some((df, target, status));
            }
        }

        let Some((_, target, status)) = best else {
            continue;
        };

        let delta = target - qp.x[k];
        qp.x[k] = target;
        qp.b += wk * delta;
        qp.status[k] = status;
        qp.gradient[k] -= delta * dk;
        for (&j, &w) in graph.weighted_neighbors(k) {
            qp.gradient[j] -= delta * w;
        }
        any = true;
    }

    if any {
        qp.free_list.retain(|&k| qp.status[k] == FreeStatus::Free);
        qp.ib = if qp.b <= qp.lo {
            -1
        } else if qp.b < qp.hi {
            0
        } else {
            1
        };
    }
    any
}
