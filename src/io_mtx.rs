use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{Error, Result};
use crate::graph::Graph;

/// Read a Matrix Market coordinate file as an undirected graph. Accepts
/// real, integer, and pattern fields with symmetric or general symmetry;
/// pattern entries weigh 1. The matrix must be square. The result is
/// conditioned, so self-edges vanish, negative weights go absolute, and
/// general inputs are symmetrized as (A + At)/2.
pub fn read_graph<P: AsRef<Path>>(path: P) -> Result<Graph> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let name = path.display().to_string();
    let mut lines = BufReader::new(file).lines();

    let parse_err = |line: usize, what: &str| Error::Parse {
        file: name.clone(),
        line,
        what: what.to_string(),
    };

    // banner: %%MatrixMarket matrix coordinate <field> <symmetry>
    let banner = match lines.next() {
        Some(line) => line?,
        None => return Err(parse_err(1, "empty file")),
    };
    let words: Vec<&str> = banner.split_whitespace().collect();
    if words.len() < 5 || !words[0].eq_ignore_ascii_case("%%MatrixMarket") {
        return Err(parse_err(1, "missing MatrixMarket banner"));
    }
    if !words[1].eq_ignore_ascii_case("matrix") || !words[2].eq_ignore_ascii_case("coordinate") {
        return Err(parse_err(1, "only coordinate matrices are supported"));
    }
    let pattern = match words[3].to_ascii_lowercase().as_str() {
        "real" | "integer" => false,
        "pattern" => true,
        _ => return Err(parse_err(1, "unsupported field type")),
    };
    let symmetric = match words[4].to_ascii_lowercase().as_str() {
        "symmetric" => true,
        "general" => false,
        _ => return Err(parse_err(1, "unsupported symmetry type")),
    };

    // size line, after comments
    let mut line_no = 1;
    let size_line = loop {
        let line = match lines.next() {
            Some(line) => line?,
            None => return Err(parse_err(line_no, "missing size line")),
        };
        line_no += 1;
        if line.starts_with('%') || line.trim().is_empty() {
            continue;
        }
        break line;
    };
    let dims: Vec<usize> = size_line
        .split_whitespace()
        .take(3)
        .map(|s| s.parse())
        .collect::<std::result::Result<_, _>>()
        .map_err(|_| parse_err(line_no, "malformed size line"))?;
    if dims.len() != 3 {
        return Err(parse_err(line_no, "malformed size line"));
    }
    let (rows, cols, nnz) = (dims[0], dims[1], dims[2]);
    if rows != cols {
        return Err(parse_err(line_no, "matrix is not square"));
    }
    let n = rows;

    let mut entries: Vec<(usize, usize, f64)> = Vec::with_capacity(nnz);
    for line in lines {
        let line = line?;
        line_no += 1;
        if line.starts_with('%') || line.trim().is_empty() {
            continue;
        }
        let mut words = line.split_whitespace();
        let row: usize = words
            .next()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| parse_err(line_no, "malformed entry"))?;
        let col: usize = words
            .next()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| parse_err(line_no, "malformed entry"))?;
        let weight: f64 = if pattern {
            1.0
        } else {
            words
                .next()
                .and_then(|s| s.parse().ok())
                .ok_or_else(|| parse_err(line_no, "malformed entry"))?
        };
        if row == 0 || col == 0 || row > n || col > n {
            return Err(parse_err(line_no, "entry index out of range"));
        }
        entries.push((row - 1, col - 1, weight));
        if symmetric && row != col {
            // expand the stored triangle so conditioning sees both halves
            entries.push((col - 1, row - 1, weight));
        }
    }

    // triplets to CSC by counting sort on columns
    let mut p = vec![0usize; n + 1];
    for &(_, col, _) in entries.iter() {
        p[col + 1] += 1;
    }
    for k in 0..n {
        p[k + 1] += p[k];
    }
    let mut i = vec![0usize; entries.len()];
    let mut x = vec![0.0f64; entries.len()];
    let mut cursor = p.clone();
    for &(row, col, weight) in entries.iter() {
        let slot = cursor[col];
        cursor[col] += 1;
        i[slot] = row;
        x[slot] = weight;
    }

    crate::conditioning::condition(n, p, i, x, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(contents: &str) -> std::path::PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!(
            "edgesep-io-test-{}-{}.mtx",
            std::process::id(),
            contents.len()
        ));
        let mut f = File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn reads_symmetric_real() {
        let path = write_temp(
            "%%MatrixMarket matrix coordinate real symmetric\n\
             % a path on three vertices\n\
             3 3 3\n\
             2 1 1.0\n\
             3 2 2.0\n\
             1 1 9.0\n",
        );
        let g = read_graph(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(g.n, 3);
        // diagonal dropped, both triangles present
        assert_eq!(g.nz(), 4);
        assert_eq!(g.neighbors(1), &[0, 2]);
        assert_eq!(g.total_edge_weight, 3.0);
    }

    #[test]
    fn reads_pattern_general() {
        let path = write_temp(
            "%%MatrixMarket matrix coordinate pattern general\n\
             2 2 2\n\
             1 2\n\
             2 1\n",
        );
        let g = read_graph(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(g.n, 2);
        assert_eq!(g.nz(), 2);
        assert_eq!(g.x, vec![1.0, 1.0]);
    }

    #[test]
    fn rejects_rectangular() {
        let path = write_temp(
            "%%MatrixMarket matrix coordinate real general\n\
             2 3 1\n\
             1 2 1.0\n",
        );
        let err = read_graph(&path).unwrap_err();
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(err, Error::Parse { .. }));
    }
}
