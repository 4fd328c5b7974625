use crate::error::{Error, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchingStrategy {
    /// Deterministic first-unmatched-neighbor matching. Despite the name
    /// there is no RNG; the pass walks vertices in natural order.
    Random,
    /// Heavy-edge matching.
    Hem,
    /// Heavy-edge matching, weight ties broken toward the lower-degree
    /// neighbor.
    HemSr,
    /// As HemSr, but candidates scored by edge weight over neighbor degree.
    HemSrDeg,
    /// Heavy-edge matching followed by passive-aggressive matching.
    HemPa,
    /// Heavy-edge matching followed by PA restricted to high-degree hubs.
    HemDavisPa,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuessCutType {
    Qp,
    Random,
    NaturalOrder,
    PseudoperipheralFast,
}

#[derive(Clone, Debug)]
pub struct Config {
    /// PRNG seed for the random initial guess.
    pub random_seed: u64,

    /// Stop coarsening once the graph has at most this many vertices.
    pub coarsen_limit: usize,
    pub matching_strategy: MatchingStrategy,
    /// Allow 3-way community matches in the PA passes.
    pub do_community_matching: bool,
    /// Multiplier on average degree; PA at a hub requires degree above
    /// threshold * (nz / n).
    pub davis_brotherly_threshold: f64,

    pub guess_cut_type: GuessCutType,
    /// Alternating BFS sweeps when hunting a pseudoperipheral vertex.
    pub guess_search_depth: usize,

    /// Refinement passes per level while uncoarsening.
    pub num_dances: usize,

    pub use_fm: bool,
    /// Maximum vertex moves per dance.
    pub fm_search_depth: usize,
    /// Consecutive non-improving moves that end a dance.
    pub fm_consider_count: usize,
    /// Maximum dances per FM call.
    pub fm_max_num_refinements: usize,

    pub use_qp_grad_proj: bool,
    pub use_qp_ball_opt: bool,
    pub gradproj_tol: f64,
    pub gradproj_iteration_limit: usize,

    /// Desired fraction of total node weight in side 1, the target side.
    pub target_split: f64,
    /// Allowed deviation of W_1 / W from the target split.
    pub tolerance: f64,

    /// Run the expensive internal consistency checks.
    pub do_expensive_checks: bool,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            random_seed: 0,
            coarsen_limit: 256,
            matching_strategy: MatchingStrategy::HemDavisPa,
            do_community_matching: false,
            davis_brotherly_threshold: 2.0,
            guess_cut_type: GuessCutType::PseudoperipheralFast,
            guess_search_depth: 10,
            num_dances: 1,
            use_fm: true,
            fm_search_depth: 50,
            fm_consider_count: 3,
            fm_max_num_refinements: 20,
            use_qp_grad_proj: true,
            use_qp_ball_opt: true,
            gradproj_tol: 0.001,
            gradproj_iteration_limit: 50,
            target_split: 0.5,
            tolerance: 0.01,
            do_expensive_checks: false,
        }
    }
}

impl Config {
    /// Coarsening must shrink the vertex count below this fraction of the
    /// previous level or the chain stops.
    pub fn coarsen_fraction(&self) -> f64 {
        0.85
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.target_split > 0.0 && self.target_split < 1.0) {
            return Err(Error::InvalidInput {
                what: "target_split must lie in (0, 1)",
                index: 0,
            });
        }
        if !(self.tolerance >= 0.0 && self.tolerance < 1.0) {
            return Err(Error::InvalidInput {
                what: "tolerance must lie in [0, 1)",
                index: 0,
            });
        }
        if self.coarsen_limit == 0 {
            return Err(Error::InvalidInput {
                what: "coarsen_limit must be positive",
                index: 0,
            });
        }
        Ok(())
    }
}
