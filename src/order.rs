//! Driver load-order solver.
//!
//! Turns a validated [`DriverSet`] into a single load order that honours
//! every `LOAD_BEFORE` constraint, using Kahn's algorithm:
//!
//! ```text
//! in-degree 0, input order     emit front, free successors
//! ─────────────────────────    ────────────────────────────
//! worklist = [net, disk]   →   net            worklist = [disk]
//!                              disk  (fs → 0) worklist = [fs]
//!                              fs             worklist = []
//! ```
//!
//! Ties are broken by input order and freed drivers are queued in the order
//! the emitting driver lists them, so the same input always yields the same
//! manifest. If anything is left over, the constraints contain a cycle and
//! [`OrderError::Cycle`] reports both the leftovers and one concrete cycle.

use std::collections::{HashMap, VecDeque};
use std::fmt;

use crate::driver::{DriverRecord, DriverSet};

/// The constraints cannot be satisfied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    Cycle {
        /// Drivers that could not be ordered, in input order.
        unresolved: Vec<String>,
        /// One cycle among them, first name repeated at the end.
        cycle: Vec<String>,
    },
}

impl fmt::Display for OrderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderError::Cycle { unresolved, cycle } => {
                write!(
                    f,
                    "LOAD_BEFORE constraints form a cycle ({}); {} driver(s) could not be ordered: {}",
                    cycle.join(" -> "),
                    unresolved.len(),
                    unresolved.join(", ")
                )
            }
        }
    }
}

impl std::error::Error for OrderError {}

/// Precedence graph over a driver set, nodes indexed by input position.
#[derive(Debug, Clone)]
pub struct ConstraintGraph<'a> {
    names: Vec<&'a str>,
    /// `successors[a]` holds every `b` with edge `a -> b`, in LOAD_BEFORE order.
    successors: Vec<Vec<usize>>,
}

impl<'a> ConstraintGraph<'a> {
    /// Build the graph. The set is already validated, so every target resolves.
    pub fn new(set: &'a DriverSet) -> Self {
        let records = set.records();
        let index: HashMap<&str, usize> = records
            .iter()
            .enumerate()
            .map(|(i, r)| (r.name.as_str(), i))
            .collect();

        let names = records.iter().map(|r| r.name.as_str()).collect();
        let successors = records
            .iter()
            .map(|r| {
                r.load_before
                    .iter()
                    .filter_map(|target| index.get(target.as_str()).copied())
                    .collect()
            })
            .collect();

        Self { names, successors }
    }

    pub fn node_count(&self) -> usize {
        self.names.len()
    }

    pub fn edge_count(&self) -> usize {
        self.successors.iter().map(Vec::len).sum()
    }

    /// Topologically sort the graph, returning node indices.
    pub fn solve(&self) -> Result<Vec<usize>, OrderError> {
        let n = self.names.len();

        let mut in_degree = vec![0usize; n];
        for targets in &self.successors {
            for &t in targets {
                in_degree[t] += 1;
            }
        }

        let mut worklist: VecDeque<usize> = (0..n).filter(|&i| in_degree[i] == 0).collect();
        let mut order = Vec::with_capacity(n);

        while let Some(node) = worklist.pop_front() {
            order.push(node);
            for &t in &self.successors[node] {
                in_degree[t] -= 1;
                if in_degree[t] == 0 {
                    worklist.push_back(t);
                }
            }
        }

        if order.len() == n {
            return Ok(order);
        }

        let unresolved: Vec<usize> = (0..n).filter(|&i| in_degree[i] > 0).collect();
        let cycle = self.find_cycle(&in_degree);
        Err(OrderError::Cycle {
            unresolved: unresolved.iter().map(|&i| self.names[i].to_string()).collect(),
            cycle: cycle.iter().map(|&i| self.names[i].to_string()).collect(),
        })
    }

    /// Extract one cycle from the nodes Kahn could not emit.
    ///
    /// Every leftover node still has a leftover predecessor, so walking
    /// predecessors from any of them must revisit a node.
    fn find_cycle(&self, in_degree: &[usize]) -> Vec<usize> {
        let n = self.names.len();
        let mut predecessor = vec![None; n];
        for (source, targets) in self.successors.iter().enumerate() {
            if in_degree[source] == 0 {
                continue;
            }
            for &t in targets {
                if predecessor[t].is_none() {
                    predecessor[t] = Some(source);
                }
            }
        }

        let Some(start) = (0..n).find(|&i| in_degree[i] > 0) else {
            return Vec::new();
        };

        let mut position: Vec<Option<usize>> = vec![None; n];
        let mut walk = Vec::new();
        let mut node = start;
        loop {
            if let Some(pos) = position[node] {
                // walk[pos..] is the cycle, followed backwards.
                let mut cycle: Vec<usize> = walk[pos..].to_vec();
                cycle.reverse();
                cycle.push(cycle[0]);
                return cycle;
            }
            position[node] = Some(walk.len());
            walk.push(node);
            match predecessor[node] {
                Some(p) => node = p,
                None => return walk,
            }
        }
    }
}

/// Order a validated driver set.
pub fn solve(set: &DriverSet) -> Result<Vec<&DriverRecord>, OrderError> {
    let graph = ConstraintGraph::new(set);
    let order = graph.solve()?;
    Ok(order.into_iter().map(|i| &set.records()[i]).collect())
}

/// Order drivers by name, for callers that only have names and edges.
///
/// Edges are `(before, after)` pairs. Unknown names and self-edges are
/// rejected exactly as for `driver.conf` input.
pub fn solve_names(names: &[&str], edges: &[(&str, &str)]) -> anyhow::Result<Vec<String>> {
    let mut records: Vec<DriverRecord> = names.iter().map(|n| DriverRecord::new(*n)).collect();
    for (before, after) in edges {
        match records.iter_mut().find(|r| r.name == *before) {
            Some(record) => {
                if !record.load_before.iter().any(|t| t == after) {
                    record.load_before.push(after.to_string());
                }
            }
            None => anyhow::bail!("constraint names unknown driver \"{}\"", before),
        }
    }

    let set = DriverSet::new(records)?;
    let order = solve(&set)?;
    Ok(order.into_iter().map(|r| r.name.clone()).collect())
}
