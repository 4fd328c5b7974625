use crate::config::{Config, MatchingStrategy};
use crate::error::{Error, Result};
use crate::graph::{try_vec, Graph};

/// Vertex matching produced during coarsening. `matching[k]` encodes the
/// successor of k in its group as `partner + 1`, with 0 meaning unmatched;
/// a pair (a, b) stores `matching[a] = b + 1, matching[b] = a + 1`, a
/// self-matched orphan stores `k + 1`, and a 3-way community match forms a
/// cycle a -> b -> c -> a. `matchmap` maps fine vertices to coarse ids,
/// `invmatchmap` holds one representative fine vertex per coarse id.
#[derive(Debug)]
pub struct Matching {
    pub matching: Vec<usize>,
    pub matchmap: Vec<usize>,
    pub invmatchmap: Vec<usize>,
    /// Number of coarse vertices assigned so far.
    pub cn: usize,
    /// Parked degree-0 vertex awaiting a partner.
    pub singleton: Option<usize>,
}

impl Matching {
    fn with_capacity(n: usize) -> Result<Matching> {
        let mut invmatchmap = Vec::new();
        invmatchmap
            .try_reserve_exact(n)
            .map_err(|_| Error::OutOfMemory {
                what: "inverse match map",
            })?;
        Ok(Matching {
            matching: try_vec(0, n, "matching")?,
            matchmap: try_vec(usize::MAX, n, "match map")?,
            invmatchmap,
            cn: 0,
            singleton: None,
        })
    }

    pub fn is_matched(&self, k: usize) -> bool {
        self.matching[k] != 0
    }

    /// Successor of k in its match cycle. Meaningful only once k is matched.
    pub fn get_match(&self, k: usize) -> usize {
        self.matching[k] - 1
    }

    /// The 1-3 fine vertices of k's group, starting at k.
    pub fn cycle(&self, k: usize) -> [Option<usize>; 3] {
        let mut v = [Some(k), None, None];
        let b = self.get_match(k);
        if b != k {
            v[1] = Some(b);
            let c = self.get_match(b);
            if c != k {
                v[2] = Some(c);
            }
        }
        v
    }

    /// Match a with b under a fresh coarse id; a == b creates an orphan.
    fn create_match(&mut self, a: usize, b: usize) {
        let c = self.cn;
        self.cn += 1;
        self.matchmap[a] = c;
        self.matchmap[b] = c;
        self.invmatchmap.push(a);
        if a == b {
            self.matching[a] = a + 1;
        } else {
            self.matching[a] = b + 1;
            self.matching[b] = a + 1;
        }
    }

    /// Extend h's pair (h, m) into the 3-cycle h -> m -> v -> h; no new
    /// coarse id. If h already sits in a 3-cycle, the previously appended
    /// member is detached and paired with v instead, keeping every group
    /// at three vertices or fewer.
    fn create_community_match(&mut self, h: usize, v: usize) {
        let m = self.get_match(h);
        if m == h {
            // h is an orphan; absorb v into a fresh pair under h's id.
            self.matching[h] = v + 1;
            self.matching[v] = h + 1;
            self.matchmap[v] = self.matchmap[h];
            return;
        }
        let c = self.get_match(m);
        if c != h {
            // already 3-way: close (h, m) back into a pair and match the
            // detached third with v; the detached vertex may have been the
            // group's representative, so re-anchor the inverse map on h
            self.matching[m] = h + 1;
            self.invmatchmap[self.matchmap[h]] = h;
            self.create_match(c, v);
            return;
        }
        self.matching[m] = v + 1;
        self.matching[v] = h + 1;
        self.matchmap[v] = self.matchmap[h];
    }
}

/// Compute a matching of `graph` under the configured strategy. Every
/// vertex ends up matched; `cn` is the number of coarse vertices the
/// matching contracts to.
pub fn match_graph(graph: &Graph, config: &Config) -> Result<Matching> {
    let mut m = Matching::with_capacity(graph.n)?;

    match config.matching_strategy {
        MatchingStrategy::Random => matching_random(graph, &mut m),
        MatchingStrategy::Hem => matching_hem(graph, &mut m, HemTieBreak::First),
        MatchingStrategy::HemSr => matching_hem(graph, &mut m, HemTieBreak::LowDegree),
        MatchingStrategy::HemSrDeg => matching_hem_deg(graph, &mut m),
        MatchingStrategy::HemPa => {
            matching_hem(graph, &mut m, HemTieBreak::First);
            matching_pa(graph, config, &mut m)?;
        }
        MatchingStrategy::HemDavisPa => {
            matching_hem(graph, &mut m, HemTieBreak::First);
            matching_davis_pa(graph, config, &mut m)?;
        }
    }

    matching_cleanup(graph, &mut m);

    if config.do_expensive_checks {
        check_matching(graph, &m)?;
    }
    Ok(m)
}

/// Deterministic first-unmatched-neighbor matching. The strategy keeps its
/// historical name but draws no random numbers; vertices are walked in
/// natural order and each takes its first unmatched neighbor.
fn matching_random(graph: &Graph, m: &mut Matching) {
    for k in 0..graph.n {
        if m.is_matched(k) {
            continue;
        }
        for &neighbor in graph.neighbors(k) {
            if m.is_matched(neighbor) {
                continue;
            }
            m.create_match(k, neighbor);
            break;
        }
    }
}

enum HemTieBreak {
    /// Equal weights keep the first neighbor encountered.
    First,
    /// Equal weights prefer the lower-degree neighbor (stall reduction).
    LowDegree,
}

/// Heavy-edge matching: each unmatched vertex takes its heaviest unmatched
/// neighbor.
fn matching_hem(graph: &Graph, m: &mut Matching, tie_break: HemTieBreak) {
    for k in 0..graph.n {
        if m.is_matched(k) {
            continue;
        }

        let mut heaviest_neighbor = None;
        let mut heaviest_weight = -1.0;
        for (&neighbor, &x) in graph.weighted_neighbors(k) {
            if m.is_matched(neighbor) {
                continue;
            }
            let better = match tie_break {
                HemTieBreak::First => x > heaviest_weight,
                HemTieBreak::LowDegree => {
                    x > heaviest_weight
                        || (x == heaviest_weight
                            && heaviest_neighbor
                                .map_or(false, |h| graph.degree(neighbor) < graph.degree(h)))
                }
            };
            if better {
                heaviest_weight = x;
                heaviest_neighbor = Some(neighbor);
            }
        }

        if let Some(neighbor) = heaviest_neighbor {
            m.create_match(k, neighbor);
        }
    }
}

/// Heavy-edge matching scored by edge weight over neighbor degree, so a
/// hub's many light ties lose to a low-degree neighbor of the same weight.
fn matching_hem_deg(graph: &Graph, m: &mut Matching) {
    for k in 0..graph.n {
        if m.is_matched(k) {
            continue;
        }

        let mut best_neighbor = None;
        let mut best_score = -1.0;
        for (&neighbor, &x) in graph.weighted_neighbors(k) {
            if m.is_matched(neighbor) {
                continue;
            }
            let score = x / graph.degree(neighbor) as f64;
            if score > best_score {
                best_score = score;
                best_neighbor = Some(neighbor);
            }
        }

        if let Some(neighbor) = best_neighbor {
            m.create_match(k, neighbor);
        }
    }
}

/// Passive-aggressive matching. Precondition: every unmatched vertex has a
/// matched neighbor (holds after a heavy-edge pass). Each unmatched vertex
/// routes through its heaviest neighbor h, whose unmatched neighbors pair
/// off two by two; an odd one out becomes a community 3-cycle with h when
/// enabled, else an orphan.
fn matching_pa(graph: &Graph, config: &Config, m: &mut Matching) -> Result<()> {
    if config.do_expensive_checks {
        check_pa_precondition(graph, m)?;
    }

    for k in 0..graph.n {
        if m.is_matched(k) {
            continue;
        }

        let mut heaviest_neighbor = None;
        let mut heaviest_weight = -1.0;
        for (&neighbor, &x) in graph.weighted_neighbors(k) {
            if x > heaviest_weight {
                heaviest_weight = x;
                heaviest_neighbor = Some(neighbor);
            }
        }

        if let Some(h) = heaviest_neighbor {
            brotherly_pass(graph, config, m, h);
        }
    }
    Ok(())
}

/// Davis-variant PA: only matched vertices whose degree exceeds the
/// brotherly threshold times the average degree act as hubs.
fn matching_davis_pa(graph: &Graph, config: &Config, m: &mut Matching) -> Result<()> {
    let bt = config.davis_brotherly_threshold * (graph.nz() as f64 / graph.n as f64);

    if config.do_expensive_checks {
        check_pa_precondition(graph, m)?;
    }

    for k in 0..graph.n {
        if !m.is_matched(k) {
            continue;
        }
        if (graph.degree(k) as f64) >= bt {
            brotherly_pass(graph, config, m, k);
        }
    }
    Ok(())
}

/// Pair h's unmatched neighbors two by two in adjacency order; the odd one
/// out joins h's group as a community match or becomes an orphan.
fn brotherly_pass(graph: &Graph, config: &Config, m: &mut Matching, h: usize) {
    let mut pending = None;
    for &neighbor in graph.neighbors(h) {
        if m.is_matched(neighbor) {
            continue;
        }
        match pending {
            None => pending = Some(neighbor),
            Some(v) => {
                m.create_match(v, neighbor);
                pending = None;
            }
        }
    }

    if let Some(v) = pending {
        if config.do_community_matching && m.is_matched(h) {
            m.create_community_match(h, v);
        } else {
            m.create_match(v, v);
        }
    }
}

/// Match every remaining vertex to itself. Degree-0 vertices are parked
/// and paired with the next one found, so isolated vertices contract in
/// pairs instead of stalling the coarsening ratio.
fn matching_cleanup(graph: &Graph, m: &mut Matching) {
    for k in 0..graph.n {
        if m.is_matched(k) {
            continue;
        }
        if graph.degree(k) == 0 {
            match m.singleton.take() {
                None => m.singleton = Some(k),
                Some(parked) => m.create_match(k, parked),
            }
        } else {
            m.create_match(k, k);
        }
    }

    if let Some(k) = m.singleton.take() {
        m.create_match(k, k);
    }
}

fn check_pa_precondition(graph: &Graph, m: &Matching) -> Result<()> {
    for k in 0..graph.n {
        if m.is_matched(k) {
            continue;
        }
        for &neighbor in graph.neighbors(k) {
            if !m.is_matched(neighbor) {
                return Err(Error::InvariantViolation {
                    what: "unmatched vertex with unmatched neighbor before PA pass",
                });
            }
        }
    }
    Ok(())
}

/// Post-conditions: every vertex matched, match cycles close within three
/// steps, and the coarse ids agree along each cycle.
fn check_matching(graph: &Graph, m: &Matching) -> Result<()> {
    if m.cn > graph.n {
        return Err(Error::InvariantViolation {
            what: "more coarse vertices than fine vertices",
        });
    }
    for k in 0..graph.n {
        if !m.is_matched(k) {
            return Err(Error::InvariantViolation {
                what: "unmatched vertex after matching",
            });
        }
        let b = m.get_match(k);
        let c = m.get_match(b);
        let closes = b == k || c == k || m.get_match(c) == k;
        if !closes {
            return Err(Error::InvariantViolation {
                what: "match cycle longer than three vertices",
            });
        }
        if m.matchmap[k] >= m.cn
            || m.matchmap[b] != m.matchmap[k]
            || m.matchmap[c] != m.matchmap[k]
        {
            return Err(Error::InvariantViolation {
                what: "match cycle spans coarse ids",
            });
        }
    }
    for c in 0..m.cn {
        if m.matchmap[m.invmatchmap[c]] != c {
            return Err(Error::InvariantViolation {
                what: "inverse match map disagrees with match map",
            });
        }
    }
    Ok(())
}
