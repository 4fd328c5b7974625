use crate::config::Config;
use crate::error::Result;
use crate::graph::{try_vec, Graph};
use crate::qp::{refresh, FreeStatus, QpDelta};
use crate::qp_napsack::napsack;

/// Gradient projection on the relaxed cut objective. Each iteration steps
/// against the gradient, projects back onto the feasible polytope with the
/// napsack routine, and takes the exact-line-search step along the
/// projection arc; the objective is concave along any direction, so a
/// descent direction always admits the full step. Stops when the projected
/// gradient falls under `gradproj_tol`, the projection yields no descent,
/// or the iteration limit is reached.
pub fn gradproj(graph: &Graph, config: &Config, qp: &mut QpDelta) -> Result<()> {
    let n = graph.n;
    let mut y = try_vec(0.0, n, "gradproj step")?;

    for _iter in 0..config.gradproj_iteration_limit {
        // an iterate violating the weight window must keep stepping; the
        // napsack projection is what restores feasibility
        let feasible = qp.b >= qp.lo && qp.b <= qp.hi;
        if feasible && projected_gradient_norm(qp) <= config.gradproj_tol {
            break;
        }

        for k in 0..n {
            y[k] = qp.x[k] - qp.gradient[k];
        }
        napsack(&mut y, qp.lo, qp.hi, &graph.w);

        // descent test along d = y - x; the gradient here is half the
        // objective's, so df = 2 g.d
        let mut gd = 0.0;
        for k in 0..n {
            gd += qp.gradient[k] * (y[k] - qp.x[k]);
        }
        if feasible && gd >= 0.0 {
            break;
        }

        // exact line search on f(x + alpha d) = f + 2 gd alpha - q alpha^2
        // with q = d'(A + D)d >= 0: concave, so the minimum over [0, 1]
        // sits at the full step. The convex guard keeps the formula honest
        // should q ever come out negative.
        let mut q = 0.0;
        for k in 0..n {
            let dk = y[k] - qp.x[k];
            let mut ad = 0.0;
            for (&j, &w) in graph.weighted_neighbors(k) {
                ad += w * (y[j] - qp.x[j]);
            }
            q += dk * (ad + qp.d[k] * dk);
        }
        let alpha = if feasible && q < 0.0 {
            (gd / q).min(1.0)
        } else {
            1.0
        };

        if alpha >= 1.0 {
            qp.x.copy_from_slice(&y);
        } else {
            for k in 0..n {
                qp.x[k] = (qp.x[k] + alpha * (y[k] - qp.x[k])).clamp(0.0, 1.0);
            }
        }
        refresh(graph, qp);
    }
    Ok(())
}

/// Max-norm stationarity residual: |g| over free variables, one-sided
/// violations at the box bounds.
fn projected_gradient_norm(qp: &QpDelta) -> f64 {
    let mut err: f64 = 0.0;
    for (k, &status) in qp.status.iter().enumerate() {
        let g = qp.gradient[k];
        let r = match status {
            FreeStatus::Free => g.abs(),
            FreeStatus::Lo => (-g).max(0.0),
            FreeStatus::Hi => g.max(0.0),
        };
        err = err.max(r);
    }
    err
}
