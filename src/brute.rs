use crate::tree::TreeModel;
use crate::NodeId;
use itertools::Itertools;
use std::collections::HashMap;

/// exhaustive reference oracle (§4.3): enumerates every `budget`-subset of
/// leaves and scores it directly, used to cross-validate the DP engines on
/// small trees.
pub struct BruteOracle<'t> {
    tree: &'t TreeModel,
}

impl<'t> BruteOracle<'t> {
    pub fn new(tree: &'t TreeModel) -> Self {
        Self { tree }
    }

    /// minimum P_err over every `budget`-combination of `leaves`, and a
    /// witness combination achieving it.
    pub fn prob_err(&self, leaves: &[NodeId], budget: usize) -> (f64, Vec<NodeId>) {
        let n = self.tree.len() as f64;
        let mut best_err = f64::INFINITY;
        let mut best_sensors = Vec::new();
        for sensors in leaves.iter().copied().combinations(budget) {
            let classes = self.equivalence_classes(&sensors);
            let err: f64 = classes
                .iter()
                .map(|class| (class.len() as f64 - 1.0) / n)
                .sum();
            if err < best_err {
                best_err = err;
                best_sensors = sensors;
            }
        }
        log::debug!("brute prob_err: best={best_err}");
        (best_err, best_sensors)
    }

    /// minimum E_dist over every `budget`-combination of `leaves`, and a
    /// witness combination achieving it.
    pub fn exp_dist(&self, leaves: &[NodeId], budget: usize) -> (f64, Vec<NodeId>) {
        let n = self.tree.len() as f64;
        let mut best_exp = f64::INFINITY;
        let mut best_sensors = Vec::new();
        for sensors in leaves.iter().copied().combinations(budget) {
            let classes = self.equivalence_classes(&sensors);
            let mut exp = 0.0f64;
            for class in &classes {
                for pair in class.iter().combinations(2) {
                    let (&u, &v) = (pair[0], pair[1]);
                    exp += 2.0 * self.tree.distance(u, v) as f64 / class.len() as f64;
                }
            }
            exp /= n;
            if exp < best_exp {
                best_exp = exp;
                best_sensors = sensors;
            }
        }
        log::debug!("brute exp_dist: best={best_exp}");
        (best_exp, best_sensors)
    }

    /// partitions every node in the tree by its signature relative to the
    /// sensor set: `(D[v][s_i] - D[v][s_0])` for `i = 1..k-1`. sensor 0 is
    /// the reference and is not itself a signature coordinate (§4.3 /
    /// Glossary) — two nodes equidistant from every other sensor but at
    /// different distances from `s_0` are still the same signature, so
    /// `s_0`'s own distance must not be folded into the key.
    fn equivalence_classes(&self, sensors: &[NodeId]) -> Vec<Vec<NodeId>> {
        let mut groups: HashMap<Vec<i64>, Vec<NodeId>> = HashMap::new();
        let reference = sensors[0];
        for node in 0..self.tree.len() {
            let d0 = self.tree.distance(node, reference) as i64;
            let signature: Vec<i64> = sensors[1..]
                .iter()
                .map(|&s| self.tree.distance(node, s) as i64 - d0)
                .collect();
            groups.entry(signature).or_default().push(node);
        }
        groups.into_values().collect()
    }
}
