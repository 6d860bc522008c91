//! test-only helpers. gated behind `cfg(test)` so they never ship in the
//! library surface.

use crate::tree::TreeModel;
use crate::NodeId;
use rand::Rng;

/// builds a uniformly random labeled tree on `n` nodes via a random Prüfer
/// sequence, then maps it through [`TreeModel::new`].
pub fn random_tree(n: usize, rng: &mut impl Rng) -> TreeModel {
    assert!(n >= 2, "random_tree requires at least two nodes");
    if n == 2 {
        return TreeModel::new(2, &[(0, 1)]).expect("two-node path is a tree");
    }
    let mut prufer = Vec::with_capacity(n - 2);
    for _ in 0..n - 2 {
        prufer.push(rng.random_range(0..n));
    }
    let edges = prufer_to_edges(&prufer, n);
    TreeModel::new(n, &edges).expect("prufer decoding always yields a tree")
}

fn prufer_to_edges(prufer: &[usize], n: usize) -> Vec<(NodeId, NodeId)> {
    let mut degree = vec![1usize; n];
    for &x in prufer {
        degree[x] += 1;
    }
    let mut edges = Vec::with_capacity(n - 1);
    for &x in prufer {
        let leaf = (0..n).find(|&i| degree[i] == 1).expect("a leaf always exists");
        edges.push((leaf, x));
        degree[leaf] -= 1;
        degree[x] -= 1;
    }
    let remaining: Vec<NodeId> = (0..n).filter(|&i| degree[i] == 1).collect();
    edges.push((remaining[0], remaining[1]));
    edges
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn random_trees_are_connected_and_acyclic() {
        let mut rng = SmallRng::seed_from_u64(7);
        for n in 2..20 {
            let tree = random_tree(n, &mut rng);
            assert_eq!(tree.len(), n);
        }
    }
}
