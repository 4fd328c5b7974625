//! End-to-end scenarios with literal graphs and known-good cuts.

use approx::assert_abs_diff_eq;
use edgesep::{compute_edge_separator, Config, Graph};

fn unit_graph(n: usize, edges: &[(usize, usize)]) -> Graph {
    let mut adj = vec![Vec::new(); n];
    for &(u, v) in edges {
        adj[u].push(v);
        adj[v].push(u);
    }
    let mut p = vec![0];
    let mut i = Vec::new();
    for column in adj {
        i.extend(column);
        p.push(i.len());
    }
    let nz = i.len();
    Graph::from_csc(n, p, i, vec![1.0; nz], vec![1.0; n]).unwrap()
}

fn checked_config() -> Config {
    Config {
        do_expensive_checks: true,
        ..Config::default()
    }
}

fn assert_sides_valid(graph: &Graph, side: &[usize]) {
    assert_eq!(side.len(), graph.n);
    for &s in side {
        assert!(s == 0 || s == 1);
    }
}

#[test]
fn single_edge() {
    let g = unit_graph(2, &[(0, 1)]);
    let partition = compute_edge_separator(&g, &checked_config()).unwrap();
    assert_sides_valid(&g, &partition.side);
    assert_ne!(partition.side[0], partition.side[1]);
    assert_abs_diff_eq!(partition.cut_cost, 1.0);
    assert_abs_diff_eq!(partition.imbalance, 0.0);
}

#[test]
fn two_disconnected_edges() {
    let g = unit_graph(4, &[(0, 1), (2, 3)]);
    let partition = compute_edge_separator(&g, &Config::default()).unwrap();
    assert_sides_valid(&g, &partition.side);
    assert_abs_diff_eq!(partition.cut_cost, 0.0);
    assert_abs_diff_eq!(partition.imbalance, 0.0);
    // each edge stays whole on one side
    assert_eq!(partition.side[0], partition.side[1]);
    assert_eq!(partition.side[2], partition.side[3]);
    assert_ne!(partition.side[0], partition.side[2]);
}

#[test]
fn path_of_six() {
    let g = unit_graph(6, &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 5)]);
    let partition = compute_edge_separator(&g, &checked_config()).unwrap();
    assert_abs_diff_eq!(partition.cut_cost, 1.0);
    assert_abs_diff_eq!(partition.imbalance, 0.0);
    // the halves are contiguous: {0,1,2} vs {3,4,5} up to relabeling
    assert_eq!(partition.side[0], partition.side[1]);
    assert_eq!(partition.side[1], partition.side[2]);
    assert_eq!(partition.side[3], partition.side[4]);
    assert_eq!(partition.side[4], partition.side[5]);
    assert_ne!(partition.side[2], partition.side[3]);
}

#[test]
fn complete_graph_k4() {
    let g = unit_graph(4, &[(0, 1), (0, 2), (0, 3), (1, 2), (1, 3), (2, 3)]);
    let partition = compute_edge_separator(&g, &checked_config()).unwrap();
    // any balanced split of K4 cuts exactly 4 edges
    assert_abs_diff_eq!(partition.cut_cost, 4.0);
    assert_abs_diff_eq!(partition.imbalance, 0.0);
}

#[test]
fn star_s5_with_loose_tolerance() {
    // center 0, leaves 1..=5
    let g = unit_graph(6, &[(0, 1), (0, 2), (0, 3), (0, 4), (0, 5)]);
    let config = Config {
        tolerance: 0.2,
        do_expensive_checks: true,
        ..Config::default()
    };
    let partition = compute_edge_separator(&g, &config).unwrap();
    assert_sides_valid(&g, &partition.side);
    // the cut counts the leaves separated from the center
    assert!(partition.cut_cost == 2.0 || partition.cut_cost == 3.0);
    assert!(partition.imbalance <= config.tolerance + 1e-12);
}

#[test]
fn grid_reference_quality() {
    // 16x16 grid; the optimal balanced cut severs one row of 16 edges.
    // The engine must land within twice that reference.
    let side_len = 16;
    let n = side_len * side_len;
    let mut edges = Vec::new();
    for r in 0..side_len {
        for c in 0..side_len {
            let k = r * side_len + c;
            if c + 1 < side_len {
                edges.push((k, k + 1));
            }
            if r + 1 < side_len {
                edges.push((k, k + side_len));
            }
        }
    }
    let g = unit_graph(n, &edges);
    let config = Config {
        tolerance: 0.05,
        ..Config::default()
    };
    let partition = compute_edge_separator(&g, &config).unwrap();
    assert_sides_valid(&g, &partition.side);
    assert!(partition.cut_cost >= 16.0);
    assert!(
        partition.cut_cost <= 32.0,
        "cut {} exceeds twice the reference",
        partition.cut_cost
    );
    assert!(partition.imbalance <= config.tolerance + 1e-12);
}

#[test]
fn weighted_edges_steer_the_cut() {
    // a path whose middle edge is heavy: the engine must cut a light edge
    // even though the heavy edge is the balanced split point
    let n = 4;
    let g = Graph::from_csc(
        n,
        vec![0, 1, 3, 5, 6],
        vec![1, 0, 2, 1, 3, 2],
        vec![1.0, 1.0, 10.0, 10.0, 1.0, 1.0],
        vec![1.0; 4],
    )
    .unwrap();
    let config = Config {
        tolerance: 0.3,
        ..Config::default()
    };
    let partition = compute_edge_separator(&g, &config).unwrap();
    assert_abs_diff_eq!(partition.cut_cost, 1.0);
}

#[test]
fn respects_target_split() {
    // 10-path, quarter/three-quarter target
    let edges: Vec<(usize, usize)> = (0..9).map(|k| (k, k + 1)).collect();
    let g = unit_graph(10, &edges);
    let config = Config {
        target_split: 0.25,
        tolerance: 0.06,
        ..Config::default()
    };
    let partition = compute_edge_separator(&g, &config).unwrap();
    // side 1 is the target side
    let w1 = partition.side.iter().filter(|&&s| s == 1).count() as f64;
    let achieved = (w1 / 10.0 - 0.25).abs();
    assert_abs_diff_eq!(partition.imbalance, achieved, epsilon = 1e-12);
    assert!(partition.imbalance <= config.tolerance + 1e-12);
}
