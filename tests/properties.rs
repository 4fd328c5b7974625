//! Property tests over random symmetric positive-weight graphs.

use std::collections::BTreeMap;

use proptest::prelude::*;

use edgesep::coarsen::coarsen;
use edgesep::config::MatchingStrategy;
use edgesep::fm::fm_refine;
use edgesep::matching::match_graph;
use edgesep::partition::PartitionInfo;
use edgesep::qp::qp_optimize;
use edgesep::{compute_edge_separator, Config, Graph};

/// Random small graph: symmetric pattern, strictly positive integer-valued
/// weights (exact in f64, so symmetry survives summation bit-for-bit).
fn arb_graph() -> impl Strategy<Value = Graph> {
    (2usize..24)
        .prop_flat_map(|n| {
            (
                Just(n),
                proptest::collection::vec(((0..n), (0..n), 1u32..5), 0..2 * n),
                proptest::collection::vec(1u32..4, n),
            )
        })
        .prop_map(|(n, raw_edges, node_weights)| {
            let mut edges: BTreeMap<(usize, usize), f64> = BTreeMap::new();
            for (u, v, w) in raw_edges {
                if u == v {
                    continue;
                }
                *edges.entry((u.min(v), u.max(v))).or_insert(0.0) += w as f64;
            }
            let mut adj = vec![Vec::new(); n];
            for (&(u, v), &w) in edges.iter() {
                adj[u].push((v, w));
                adj[v].push((u, w));
            }
            let mut p = vec![0];
            let mut i = Vec::new();
            let mut x = Vec::new();
            for column in adj {
                for (j, w) in column {
                    i.push(j);
                    x.push(w);
                }
                p.push(i.len());
            }
            let w: Vec<f64> = node_weights.into_iter().map(f64::from).collect();
            Graph::from_csc(n, p, i, x, w).unwrap()
        })
}

fn recompute_cut(graph: &Graph, side: &[usize]) -> f64 {
    let mut cut2 = 0.0;
    for k in 0..graph.n {
        for (&j, &x) in graph.weighted_neighbors(k) {
            if side[k] != side[j] {
                cut2 += x;
            }
        }
    }
    cut2 / 2.0
}

proptest! {
    #[test]
    fn separator_reports_are_consistent(graph in arb_graph()) {
        let config = Config {
            tolerance: 0.3,
            do_expensive_checks: true,
            ..Config::default()
        };
        let partition = compute_edge_separator(&graph, &config).unwrap();

        // every vertex lands on a side
        prop_assert_eq!(partition.side.len(), graph.n);
        for &s in partition.side.iter() {
            prop_assert!(s == 0 || s == 1);
        }

        // partitioned node weight is conserved
        let mut part_weight = [0.0f64; 2];
        for k in 0..graph.n {
            part_weight[partition.side[k]] += graph.w[k];
        }
        let w_eps = graph.total_node_weight * f64::EPSILON * graph.n as f64;
        prop_assert!(
            ((part_weight[0] + part_weight[1]) - graph.total_node_weight).abs() <= w_eps
        );

        // reported cut matches a recomputation
        let cut = recompute_cut(&graph, &partition.side);
        let cut_eps =
            graph.n as f64 * f64::EPSILON * graph.total_edge_weight.max(1.0);
        prop_assert!((cut - partition.cut_cost).abs() <= cut_eps);

        // reported imbalance is the achieved deviation of the target side
        let achieved =
            (part_weight[1] / graph.total_node_weight - config.target_split).abs();
        prop_assert!((achieved - partition.imbalance).abs() <= w_eps);
    }

    #[test]
    fn separator_is_deterministic(graph in arb_graph()) {
        let config = Config {
            tolerance: 0.3,
            ..Config::default()
        };
        let a = compute_edge_separator(&graph, &config).unwrap();
        let b = compute_edge_separator(&graph, &config).unwrap();
        prop_assert_eq!(&a.side, &b.side);
        prop_assert_eq!(a.cut_cost.to_bits(), b.cut_cost.to_bits());
        prop_assert_eq!(a.imbalance.to_bits(), b.imbalance.to_bits());
    }

    #[test]
    fn matching_cycles_close(
        graph in arb_graph(),
        strategy in prop_oneof![
            Just(MatchingStrategy::Random),
            Just(MatchingStrategy::Hem),
            Just(MatchingStrategy::HemSr),
            Just(MatchingStrategy::HemSrDeg),
            Just(MatchingStrategy::HemPa),
            Just(MatchingStrategy::HemDavisPa),
        ],
        community in any::<bool>(),
    ) {
        let config = Config {
            matching_strategy: strategy,
            do_community_matching: community,
            do_expensive_checks: true,
            ..Config::default()
        };
        let m = match_graph(&graph, &config).unwrap();

        prop_assert!(m.cn <= graph.n);
        for k in 0..graph.n {
            prop_assert!(m.is_matched(k));
            // the cycle returns to k within three steps
            let b = m.get_match(k);
            let c = m.get_match(b);
            prop_assert!(b == k || c == k || m.get_match(c) == k);
            prop_assert_eq!(m.matchmap[k], m.matchmap[b]);
        }
        // matchmap is surjective onto 0..cn
        for c in 0..m.cn {
            prop_assert_eq!(m.matchmap[m.invmatchmap[c]], c);
        }
    }

    #[test]
    fn coarsening_conserves_node_weight(graph in arb_graph()) {
        let config = Config {
            matching_strategy: MatchingStrategy::HemDavisPa,
            do_expensive_checks: false,
            ..Config::default()
        };
        let m = match_graph(&graph, &config).unwrap();
        let coarse = coarsen(&graph, &m, &config).unwrap();

        prop_assert_eq!(coarse.n, m.cn);
        let eps = graph.total_node_weight * f64::EPSILON * graph.n as f64;
        prop_assert!((coarse.total_node_weight - graph.total_node_weight).abs() <= eps);
        prop_assert!(coarse.total_edge_weight <= graph.total_edge_weight + eps);
        // no self-loops survive contraction
        for k in 0..coarse.n {
            for &j in coarse.neighbors(k) {
                prop_assert_ne!(j, k);
            }
        }
    }

    #[test]
    fn fm_never_worsens_the_cut(
        graph in arb_graph(),
        seed_sides in proptest::collection::vec(0usize..2, 2..24),
    ) {
        let config = Config {
            tolerance: 0.3,
            do_expensive_checks: true,
            ..Config::default()
        };
        let side: Vec<usize> =
            (0..graph.n).map(|k| seed_sides[k % seed_sides.len()]).collect();
        let mut info = PartitionInfo::from_sides(&graph, side, &config).unwrap();
        let entry = info.cut_cost;
        fm_refine(&graph, &mut info, &config).unwrap();
        let eps = graph.n as f64 * f64::EPSILON * graph.total_edge_weight.max(1.0);
        prop_assert!(info.cut_cost <= entry + eps);
    }

    #[test]
    fn qp_stays_inside_its_bounds(
        graph in arb_graph(),
        seed_sides in proptest::collection::vec(0usize..2, 2..24),
    ) {
        let config = Config {
            tolerance: 0.2,
            ..Config::default()
        };
        let x0: Vec<f64> =
            (0..graph.n).map(|k| seed_sides[k % seed_sides.len()] as f64).collect();
        let x = qp_optimize(&graph, x0, &config).unwrap();

        for &v in x.iter() {
            prop_assert!((0.0..=1.0).contains(&v));
        }
        let b: f64 = graph.w.iter().zip(x.iter()).map(|(&w, &xk)| w * xk).sum();
        let lo = (config.target_split - config.tolerance) * graph.total_node_weight;
        let hi = (config.target_split + config.tolerance) * graph.total_node_weight;
        let eps = graph.total_node_weight * f64::EPSILON * graph.n as f64;
        prop_assert!(b >= lo - eps && b <= hi + eps);
    }
}
