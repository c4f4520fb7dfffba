// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Structural checks run when a workflow is frozen.
//!
//! Cycle detection is a depth-first search with a recursion stack; when a
//! back edge is found the path on the stack is the cycle, which is returned
//! for the error message.

/// Find a cycle in a graph given as successor lists over node indices.
///
/// Returns the cycle as node names, closed (first name repeated at the end).
pub(crate) fn find_cycle(names: &[String], successors: &[Vec<usize>]) -> Option<Vec<String>> {
    let mut visited = vec![false; names.len()];
    let mut on_stack = vec![false; names.len()];
    let mut path = Vec::new();

    for start in 0..names.len() {
        if !visited[start] {
            if let Some(cycle) = dfs(start, successors, &mut visited, &mut on_stack, &mut path) {
                return Some(cycle.into_iter().map(|i| names[i].clone()).collect());
            }
        }
    }
    None
}

fn dfs(
    node: usize,
    successors: &[Vec<usize>],
    visited: &mut [bool],
    on_stack: &mut [bool],
    path: &mut Vec<usize>,
) -> Option<Vec<usize>> {
    visited[node] = true;
    on_stack[node] = true;
    path.push(node);

    for &next in &successors[node] {
        if !visited[next] {
            if let Some(cycle) = dfs(next, successors, visited, on_stack, path) {
                return Some(cycle);
            }
        } else if on_stack[next] {
            let start = path.iter().position(|&n| n == next).unwrap_or(0);
            let mut cycle = path[start..].to_vec();
            cycle.push(next);
            return Some(cycle);
        }
    }

    on_stack[node] = false;
    path.pop();
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(n: &[&str]) -> Vec<String> {
        n.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn diamond_is_acyclic() {
        let successors = vec![vec![1, 2], vec![3], vec![3], vec![]];
        assert_eq!(find_cycle(&names(&["a", "b", "c", "d"]), &successors), None);
    }

    #[test]
    fn reports_the_cycle_path() {
        let successors = vec![vec![1], vec![2], vec![0]];
        let cycle = find_cycle(&names(&["a", "b", "c"]), &successors).unwrap();
        assert_eq!(cycle, ["a", "b", "c", "a"]);
    }

    #[test]
    fn self_loop() {
        let successors = vec![vec![], vec![1]];
        let cycle = find_cycle(&names(&["a", "b"]), &successors).unwrap();
        assert_eq!(cycle, ["b", "b"]);
    }
}
