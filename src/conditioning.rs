use crate::error::{Error, Result};
use crate::graph::{try_vec, Graph};

/// Normalize an arbitrary CSC matrix into a well-formed graph:
/// symmetrize A <- (A + At)/2, discard the diagonal and explicit zeros,
/// take absolute edge weights, and default missing node weights to 1.
///
/// Duplicate entries within a column are summed before halving. The
/// symmetric value for each unordered pair is computed once and mirrored,
/// so the result is exactly symmetric regardless of input entry order.
pub fn condition(
    n: usize,
    p: Vec<usize>,
    i: Vec<usize>,
    x: Vec<f64>,
    w: Option<Vec<f64>>,
) -> Result<Graph> {
    if n == 0 {
        return Err(Error::InvalidInput {
            what: "graph must have at least one vertex",
            index: 0,
        });
    }
    if p.len() != n + 1 || p[0] != 0 {
        return Err(Error::InvalidInput {
            what: "column pointer array malformed",
            index: 0,
        });
    }
    let nz = p[n];
    if i.len() != nz || x.len() != nz {
        return Err(Error::InvalidInput {
            what: "array lengths disagree with column pointers",
            index: 0,
        });
    }
    for k in 0..n {
        if p[k + 1] < p[k] {
            return Err(Error::InvalidInput {
                what: "column pointers not monotone",
                index: k,
            });
        }
    }
    for (pp, &row) in i.iter().enumerate() {
        if row >= n {
            return Err(Error::InvalidInput {
                what: "adjacency index out of range",
                index: pp,
            });
        }
    }
    for (pp, &v) in x.iter().enumerate() {
        if !v.is_finite() {
            return Err(Error::InvalidInput {
                what: "edge weight not finite",
                index: pp,
            });
        }
    }

    let w = match w {
        Some(w) => {
            if w.len() != n {
                return Err(Error::InvalidInput {
                    what: "node weight array has wrong length",
                    index: 0,
                });
            }
            for (k, &v) in w.iter().enumerate() {
                if !(v > 0.0) || !v.is_finite() {
                    return Err(Error::InvalidInput {
                        what: "node weight not positive",
                        index: k,
                    });
                }
            }
            w
        }
        None => try_vec(1.0, n, "node weights")?,
    };

    let (tp, ti, tx) = crate::graph::transpose(n, &p, &i, &x)?;

    // Accumulate (A + At)/2 one column at a time, keeping only the strict
    // lower triangle; the upper triangle is mirrored afterwards so both
    // halves carry bit-identical values.
    let mut mark: Vec<isize> = try_vec(-1, n, "conditioning workspace")?;
    let mut acc = try_vec(0.0f64, n, "conditioning workspace")?;
    let mut touched: Vec<usize> = Vec::new();
    // (row, col, weight) with row > col
    let mut lower: Vec<(usize, usize, f64)> = Vec::new();

    for c in 0..n {
        touched.clear();
        for pp in p[c]..p[c + 1] {
            let r = i[pp];
            if r <= c {
                continue;
            }
            if mark[r] != c as isize {
                mark[r] = c as isize;
                acc[r] = 0.0;
                touched.push(r);
            }
            acc[r] += 0.5 * x[pp];
        }
        for pp in tp[c]..tp[c + 1] {
            let r = ti[pp];
            if r <= c {
                continue;
            }
            if mark[r] != c as isize {
                mark[r] = c as isize;
                acc[r] = 0.0;
                touched.push(r);
            }
            acc[r] += 0.5 * tx[pp];
        }
        for &r in touched.iter() {
            let v = acc[r].abs();
            if v != 0.0 {
                lower.push((r, c, v));
            }
        }
    }

    // Scatter the surviving pairs into full symmetric CSC.
    let mut cp = try_vec(0usize, n + 1, "conditioned pointers")?;
    for &(r, c, _) in lower.iter() {
        cp[r + 1] += 1;
        cp[c + 1] += 1;
    }
    for k in 0..n {
        cp[k + 1] += cp[k];
    }
    let out_nz = cp[n];
    let mut ci = try_vec(0usize, out_nz, "conditioned indices")?;
    let mut cx = try_vec(0.0f64, out_nz, "conditioned weights")?;
    let mut cursor: Vec<usize> = cp[..n].to_vec();
    for &(r, c, v) in lower.iter() {
        ci[cursor[c]] = r;
        cx[cursor[c]] = v;
        cursor[c] += 1;
        ci[cursor[r]] = c;
        cx[cursor[r]] = v;
        cursor[r] += 1;
    }

    let total_node_weight: f64 = w.iter().sum();
    let total_edge_weight: f64 = lower.iter().map(|&(_, _, v)| v).sum();
    let mut vertex_gains = try_vec(0.0, n, "vertex gains")?;
    for k in 0..n {
        vertex_gains[k] = -cx[cp[k]..cp[k + 1]].iter().sum::<f64>();
    }

    Ok(Graph {
        n,
        p: cp,
        i: ci,
        x: cx,
        w,
        total_node_weight,
        total_edge_weight,
        vertex_gains,
    })
}
