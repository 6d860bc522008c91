use crate::error::{PlacementError, Result};
use crate::NodeId;
use std::collections::VecDeque;

/// an undirected, connected, acyclic graph on `0..n` plus its all-pairs
/// distance table. degree-1 nodes are leaves; the sole node of a
/// single-node tree is a leaf by convention.
///
/// treated by the rest of the crate as an opaque data source: nothing
/// downstream of this module cares *how* distances were computed, only that
/// `distance(u, v)` is the unique-path edge count. BFS from every node is
/// the natural choice for an unweighted tree and is what's implemented
/// below.
pub struct TreeModel {
    n: usize,
    adjacency: Vec<Vec<NodeId>>,
    distances: Vec<Vec<u32>>,
}

impl TreeModel {
    /// builds a `TreeModel` from an adjacency list over node ids `0..n`.
    ///
    /// rejects anything that fails the tree predicate: wrong edge count,
    /// disconnection, self-loops, or parallel edges.
    pub fn new(n: usize, edges: &[(NodeId, NodeId)]) -> Result<Self> {
        if n == 0 {
            return Err(PlacementError::EmptyGraph);
        }
        if edges.len() != n.saturating_sub(1) {
            return Err(PlacementError::NotATree);
        }
        let mut adjacency = vec![Vec::new(); n];
        let mut seen_edges = std::collections::HashSet::new();
        for &(u, v) in edges {
            if u >= n || v >= n || u == v {
                return Err(PlacementError::NotATree);
            }
            let key = (u.min(v), u.max(v));
            if !seen_edges.insert(key) {
                return Err(PlacementError::NotATree);
            }
            adjacency[u].push(v);
            adjacency[v].push(u);
        }
        for neighbors in &mut adjacency {
            neighbors.sort_unstable();
        }
        if n > 1 && !Self::is_connected(&adjacency) {
            return Err(PlacementError::NotATree);
        }
        let distances = Self::all_pairs_bfs(&adjacency);
        log::debug!("tree model built: n={n}, edges={}", edges.len());
        Ok(Self {
            n,
            adjacency,
            distances,
        })
    }

    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    pub fn neighbors(&self, x: NodeId) -> &[NodeId] {
        &self.adjacency[x]
    }

    pub fn degree(&self, x: NodeId) -> usize {
        self.adjacency[x].len()
    }

    pub fn is_leaf(&self, x: NodeId) -> bool {
        self.n == 1 || self.degree(x) == 1
    }

    /// leaves in ascending node-id order.
    pub fn leaves(&self) -> Vec<NodeId> {
        (0..self.n).filter(|&x| self.is_leaf(x)).collect()
    }

    pub fn distance(&self, u: NodeId, v: NodeId) -> u32 {
        self.distances[u][v]
    }

    fn is_connected(adjacency: &[Vec<NodeId>]) -> bool {
        let n = adjacency.len();
        let mut visited = vec![false; n];
        let mut queue = VecDeque::new();
        queue.push_back(0usize);
        visited[0] = true;
        let mut count = 1;
        while let Some(x) = queue.pop_front() {
            for &y in &adjacency[x] {
                if !visited[y] {
                    visited[y] = true;
                    count += 1;
                    queue.push_back(y);
                }
            }
        }
        count == n
    }

    fn all_pairs_bfs(adjacency: &[Vec<NodeId>]) -> Vec<Vec<u32>> {
        let n = adjacency.len();
        let mut table = vec![vec![0u32; n]; n];
        for source in 0..n {
            let mut dist = vec![u32::MAX; n];
            dist[source] = 0;
            let mut queue = VecDeque::new();
            queue.push_back(source);
            while let Some(x) = queue.pop_front() {
                for &y in &adjacency[x] {
                    if dist[y] == u32::MAX {
                        dist[y] = dist[x] + 1;
                        queue.push_back(y);
                    }
                }
            }
            table[source] = dist;
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path5() -> TreeModel {
        TreeModel::new(5, &[(0, 1), (1, 2), (2, 3), (3, 4)]).unwrap()
    }

    #[test]
    fn rejects_empty_graph() {
        assert_eq!(TreeModel::new(0, &[]), Err(PlacementError::EmptyGraph));
    }

    #[test]
    fn rejects_wrong_edge_count() {
        assert_eq!(
            TreeModel::new(4, &[(0, 1), (1, 2)]),
            Err(PlacementError::NotATree)
        );
    }

    #[test]
    fn rejects_self_loop() {
        assert_eq!(
            TreeModel::new(2, &[(0, 0)]),
            Err(PlacementError::NotATree)
        );
    }

    #[test]
    fn rejects_parallel_edge() {
        assert_eq!(
            TreeModel::new(3, &[(0, 1), (0, 1)]),
            Err(PlacementError::NotATree)
        );
    }

    #[test]
    fn accepts_a_connected_chain_with_right_edge_count() {
        assert!(TreeModel::new(4, &[(0, 1), (1, 2), (2, 3)]).is_ok());
    }

    #[test]
    fn rejects_disconnected_graph_with_right_edge_count() {
        // a triangle on {0,1,2} plus an isolated node 3: n=4, edges.len()=3
        // matches n-1, but node 3 is unreachable.
        assert_eq!(
            TreeModel::new(4, &[(0, 1), (1, 2), (0, 2)]),
            Err(PlacementError::NotATree)
        );
    }

    #[test]
    fn single_node_is_a_leaf() {
        let tree = TreeModel::new(1, &[]).unwrap();
        assert_eq!(tree.leaves(), vec![0]);
    }

    #[test]
    fn path_distances_and_leaves() {
        let tree = path5();
        assert_eq!(tree.leaves(), vec![0, 4]);
        assert_eq!(tree.distance(0, 4), 4);
        assert_eq!(tree.distance(2, 2), 0);
        assert_eq!(tree.distance(1, 3), 2);
    }
}
