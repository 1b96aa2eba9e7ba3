// ABOUTME: Dependency graph helpers - cycle detection by DFS and a stable
// ABOUTME: topological order (Kahn's algorithm, ties broken by declaration order).

use std::collections::{BTreeSet, HashMap, HashSet};

use super::TaskNode;

/// Detects a cycle in the `depends_on` graph.
///
/// Returns the cycle as a closed path, e.g. `["a", "b", "a"]`.
pub(crate) fn detect_cycle(nodes: &[TaskNode]) -> Option<Vec<String>> {
    let graph: HashMap<&str, &[String]> = nodes
        .iter()
        .map(|n| (n.id.as_str(), n.depends_on.as_slice()))
        .collect();

    let mut visited = HashSet::new();
    let mut stack = Vec::new();

    for node in nodes {
        if let Some(cycle) = dfs_cycle(&node.id, &graph, &mut visited, &mut stack) {
            return Some(cycle);
        }
    }
    None
}

fn dfs_cycle<'a>(
    node: &'a str,
    graph: &HashMap<&'a str, &'a [String]>,
    visited: &mut HashSet<&'a str>,
    stack: &mut Vec<&'a str>,
) -> Option<Vec<String>> {
    if let Some(start) = stack.iter().position(|n| *n == node) {
        let mut cycle: Vec<String> = stack[start..].iter().map(|n| n.to_string()).collect();
        cycle.push(node.to_string());
        return Some(cycle);
    }

    if !visited.insert(node) {
        return None;
    }

    stack.push(node);
    if let Some(&deps) = graph.get(node) {
        for dep in deps {
            if let Some(cycle) = dfs_cycle(dep, graph, visited, stack) {
                return Some(cycle);
            }
        }
    }
    stack.pop();
    None
}

/// Node indices in an order where every dependency precedes its dependents.
///
/// Among ready nodes the earliest declared runs first, so a linear chain
/// keeps its declared order. Returns the cycle path if there is one.
/// All dependencies must name declared nodes.
pub(crate) fn topological_order(nodes: &[TaskNode]) -> Result<Vec<usize>, Vec<String>> {
    let index: HashMap<&str, usize> = nodes
        .iter()
        .enumerate()
        .map(|(i, n)| (n.id.as_str(), i))
        .collect();

    let mut in_degree = vec![0usize; nodes.len()];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
    for (i, node) in nodes.iter().enumerate() {
        for dep in &node.depends_on {
            if let Some(&d) = index.get(dep.as_str()) {
                in_degree[i] += 1;
                dependents[d].push(i);
            }
        }
    }

    let mut ready: BTreeSet<usize> = (0..nodes.len()).filter(|&i| in_degree[i] == 0).collect();
    let mut order = Vec::with_capacity(nodes.len());

    while let Some(i) = ready.pop_first() {
        order.push(i);
        for &next in &dependents[i] {
            in_degree[next] -= 1;
            if in_degree[next] == 0 {
                ready.insert(next);
            }
        }
    }

    if order.len() == nodes.len() {
        Ok(order)
    } else {
        Err(detect_cycle(nodes).unwrap_or_default())
    }
}
