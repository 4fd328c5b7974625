//! Balanced 2-way edge separators of large sparse undirected graphs.
//!
//! The engine is multilevel: it matches and contracts vertices until the
//! graph is small, seeds a bisection there, and refines the partition
//! while projecting it back up the chain, alternating Fiduccia-Mattheyses
//! boundary refinement with a quadratic-programming relaxation.
//!
//! ```
//! use edgesep::{compute_edge_separator, Config, Graph};
//!
//! // a path on four vertices
//! let graph = Graph::from_csc(
//!     4,
//!     vec![0, 1, 3, 5, 6],
//!     vec![1, 0, 2, 1, 3, 2],
//!     vec![1.0; 6],
//!     vec![1.0; 4],
//! )?;
//! let partition = compute_edge_separator(&graph, &Config::default())?;
//! assert_eq!(partition.cut_cost, 1.0);
//! # Ok::<(), edgesep::Error>(())
//! ```

pub mod coarsen;
pub mod conditioning;
pub mod config;
pub mod error;
pub mod fm;
pub mod graph;
pub mod guess;
pub mod io_mtx;
pub mod matching;
pub mod partition;
pub mod priority_queue;
pub mod qp;
pub mod qp_boundary;
pub mod qp_gradproj;
pub mod qp_napsack;
pub mod separator;

pub use conditioning::condition;
pub use config::{Config, GuessCutType, MatchingStrategy};
pub use error::{Error, Result};
pub use graph::Graph;
pub use io_mtx::read_graph;
pub use separator::{compute_edge_separator, Partition};
