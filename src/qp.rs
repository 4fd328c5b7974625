use crate::config::Config;
use crate::error::{Error, Result};
use crate::graph::{try_vec, Graph};
use crate::partition::PartitionInfo;

/// Where a relaxed variable sits relative to its box bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FreeStatus {
    /// x = 0
    Lo,
    /// 0 < x < 1
    Free,
    /// x = 1
    Hi,
}

/// Working state of the quadratic relaxation on one graph level: the cut
/// objective is minimized over x in [0,1]^n subject to lo <= w.x <= hi,
/// then rounded back to a 0/1 partition.
#[derive(Debug)]
pub struct QpDelta {
    pub x: Vec<f64>,
    /// Sum of incident edge weights per vertex.
    pub d: Vec<f64>,
    pub gradient: Vec<f64>,
    pub status: Vec<FreeStatus>,
    /// Indices with 0 < x < 1, ascending.
    pub free_list: Vec<usize>,
    pub lo: f64,
    pub hi: f64,
    /// w . x
    pub b: f64,
    /// -1 when b rests on lo, 0 interior, +1 on hi.
    pub ib: i8,
}

/// Initialize the QP state from a relaxed point. Fails if any coordinate
/// leaves the unit box.
pub fn qp_links(graph: &Graph, config: &Config, x: Vec<f64>) -> Result<QpDelta> {
    let n = graph.n;
    for (k, &xk) in x.iter().enumerate() {
        if !(0.0..=1.0).contains(&xk) {
            return Err(Error::InvalidInput {
                what: "relaxed coordinate outside [0, 1]",
                index: k,
            });
        }
    }

    let mut d = try_vec(0.0, n, "qp diagonal")?;
    for k in 0..n {
        d[k] = graph.x[graph.p[k]..graph.p[k + 1]].iter().sum();
    }

    let w_total = graph.total_node_weight;
    let mut qp = QpDelta {
        x,
        d,
        gradient: try_vec(0.0, n, "qp gradient")?,
        status: try_vec(FreeStatus::Free, n, "qp free status")?,
        free_list: Vec::new(),
        lo: (config.target_split - config.tolerance) * w_total,
        hi: (config.target_split + config.tolerance) * w_total,
        b: 0.0,
        ib: 0,
    };
    refresh(graph, &mut qp);
    Ok(qp)
}

/// Recompute gradient, b, ib, and the free-set bookkeeping from x, in CSC
/// order. gradient_k = (1/2 - x_k) d_k + sum_j (1/2 - x_j) x_kj.
pub fn refresh(graph: &Graph, qp: &mut QpDelta) {
    let n = graph.n;
    for k in 0..n {
        qp.gradient[k] = (0.5 - qp.x[k]) * qp.d[k];
    }

    qp.free_list.clear();
    let mut s = 0.0;
    for k in 0..n {
        let xk = qp.x[k];
        s += graph.w[k] * xk;
        let r = 0.5 - xk;
        for pp in graph.p[k]..graph.p[k + 1] {
            qp.gradient[graph.i[pp]] += r * graph.x[pp];
        }
        qp.status[k] = if xk >= 1.0 {
            FreeStatus::Hi
        } else if xk <= 0.0 {
            FreeStatus::Lo
        } else {
            qp.free_list.push(k);
            FreeStatus::Free
        };
    }

    qp.b = s;
    qp.ib = if s <= qp.lo {
        -1
    } else if s < qp.hi {
        0
    } else {
        1
    };
}

/// The relaxed cut objective (1 - x)' (A + D) x, which agrees with the cut
/// cost at every integral x.
pub fn objective(graph: &Graph, x: &[f64], d: &[f64]) -> f64 {
    let mut f = 0.0;
    for k in 0..graph.n {
        let mut ax = 0.0;
        for (&j, &w) in graph.weighted_neighbors(k) {
            ax += w * x[j];
        }
        f += (1.0 - x[k]) * (ax + d[k] * x[k]);
    }
    f
}

/// Run the relaxation from the current 0/1 partition and round the result
/// back, rebuilding the partition state. The driver follows with an FM
/// pass to clean up the rounding.
pub fn qp_refine(graph: &Graph, info: &mut PartitionInfo, config: &Config) -> Result<()> {
    let x0: Vec<f64> = info.side.iter().map(|&s| s as f64).collect();
    let x = qp_optimize(graph, x0, config)?;
    let side = round_sides(&x);
    *info = PartitionInfo::from_sides(graph, side, config)?;
    Ok(())
}

/// x_k >= 1/2 lands on side 1; the tie at exactly 1/2 is fixed for
/// determinism.
pub fn round_sides(x: &[f64]) -> Vec<usize> {
    x.iter().map(|&v| usize::from(v >= 0.5)).collect()
}

/// Alternate gradient projection and boundary ball optimization until
/// neither improves the objective.
pub fn qp_optimize(graph: &Graph, x0: Vec<f64>, config: &Config) -> Result<Vec<f64>> {
    // safety valve; stagnation normally exits far earlier
    const ALTERNATION_LIMIT: usize = 16;

    let mut qp = qp_links(graph, config, x0)?;
    let mut f = objective(graph, &qp.x, &qp.d);
    let eps = f64::EPSILON * graph.h().max(1.0) * graph.n as f64;

    for _ in 0..ALTERNATION_LIMIT {
        crate::qp_gradproj::gradproj(graph, config, &mut qp)?;
        if config.use_qp_ball_opt {
            crate::qp_boundary::ball_opt(graph, &mut qp);
        }
        let f_now = objective(graph, &qp.x, &qp.d);
        if f_now >= f - eps {
            break;
        }
        f = f_now;
    }
    Ok(qp.x)
}
