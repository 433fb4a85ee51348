//! Dependency ordering for build plan invocations.
//!
//! Invocations form a DAG through their `deps`. Execution is sequential, so
//! the only thing needed from the graph is one valid order.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::plan::Invocation;

use super::types::ExecuteError;

/// A DAG of invocations, with edges from dependency to dependent.
pub struct InvocationDag {
  /// The underlying graph. Node weights are invocation numbers.
  graph: DiGraph<usize, ()>,

  /// Map from invocation number to node index.
  nodes: HashMap<usize, NodeIndex>,
}

impl InvocationDag {
  /// Build the DAG of a set of invocations.
  ///
  /// # Errors
  ///
  /// - `DuplicateInvocation` if two invocations share a number
  /// - `MissingDependency` if a dependency names no invocation
  pub fn from_invocations(invocations: &[Invocation]) -> Result<Self, ExecuteError> {
    let mut graph = DiGraph::new();
    let mut nodes = HashMap::new();

    for inv in invocations {
      let idx = graph.add_node(inv.number);
      if nodes.insert(inv.number, idx).is_some() {
        return Err(ExecuteError::DuplicateInvocation(inv.number));
      }
    }

    for inv in invocations {
      let dependent_idx = nodes[&inv.number];
      for dep in &inv.deps {
        let Some(&dep_idx) = nodes.get(dep) else {
          return Err(ExecuteError::MissingDependency {
            invocation: inv.number,
            dependency: *dep,
          });
        };
        graph.add_edge(dep_idx, dependent_idx, ());
      }
    }

    Ok(Self { graph, nodes })
  }

  /// Invocation numbers in execution order.
  ///
  /// Among invocations whose dependencies are all placed, the lowest number
  /// goes first, so the order is stable for a given plan.
  ///
  /// # Errors
  ///
  /// Returns `Unresolvable` with the unplaced numbers if a cycle prevents
  /// placing every invocation.
  pub fn execution_order(&self) -> Result<Vec<usize>, ExecuteError> {
    let mut in_degree: HashMap<NodeIndex, usize> = self
      .graph
      .node_indices()
      .map(|idx| (idx, self.graph.neighbors_directed(idx, Direction::Incoming).count()))
      .collect();

    let mut ready: BinaryHeap<Reverse<usize>> = in_degree
      .iter()
      .filter(|&(_, &deg)| deg == 0)
      .map(|(&idx, _)| Reverse(self.graph[idx]))
      .collect();

    let mut order = Vec::with_capacity(self.nodes.len());

    while let Some(Reverse(number)) = ready.pop() {
      order.push(number);
      let idx = self.nodes[&number];

      for neighbor in self.graph.neighbors_directed(idx, Direction::Outgoing) {
        if let Some(deg) = in_degree.get_mut(&neighbor) {
          *deg = deg.saturating_sub(1);
          if *deg == 0 {
            ready.push(Reverse(self.graph[neighbor]));
          }
        }
      }
    }

    if order.len() < self.nodes.len() {
      let mut remaining: Vec<usize> = self.nodes.keys().copied().filter(|n| !order.contains(n)).collect();
      remaining.sort_unstable();
      return Err(ExecuteError::Unresolvable { remaining });
    }

    Ok(order)
  }
}

/// Order invocations so every one comes after all of its dependencies.
///
/// Nothing is returned unless every invocation can be placed.
pub fn resolve_order(invocations: Vec<Invocation>) -> Result<Vec<Invocation>, ExecuteError> {
  let dag = InvocationDag::from_invocations(&invocations)?;
  let order = dag.execution_order()?;

  let mut by_number: HashMap<usize, Invocation> = invocations.into_iter().map(|inv| (inv.number, inv)).collect();

  Ok(order.into_iter().filter_map(|number| by_number.remove(&number)).collect())
}
