pub mod brute;
pub mod classdist;
pub mod edist;
pub mod error;
pub mod perr;
pub mod stats;
pub mod tree;
pub mod view;

#[cfg(test)]
pub mod support;

pub use error::{PlacementError, Result};

use brute::BruteOracle;
use classdist::ClassExpDist;
use edist::EDistDp;
use perr::PErrDp;
use stats::SubtreeStats;
use tree::TreeModel;
use view::RootedView;

/// node identifiers are dense integers in `[0, n)`.
pub type NodeId = usize;

/// dimensional analysis types, kept `f64` (not the teacher's `f32`) per the
/// `1e-9` agreement tolerance against the brute oracle (§3 of the design
/// expansion).
pub type Probability = f64;
pub type ExpDist = f64;

/// minimum-P_err sensor placement (§4.5). `root` overrides the automatic
/// smallest-id-non-leaf choice; the returned probability does not depend on
/// this choice, only the witness sensor set may.
pub fn prob_err_optimal(
    tree: &TreeModel,
    budget: usize,
    root: Option<NodeId>,
) -> Result<(Probability, Vec<NodeId>)> {
    let leaves = validate(tree, budget)?;
    if budget >= leaves.len() {
        return Ok((0.0, leaves));
    }
    let view = rooted_view(tree, root);
    let stats = SubtreeStats::compute(&view);
    let dp = PErrDp::new(&view, &stats, budget);
    let (unresolved, witness) = dp.solve();
    let perr = unresolved as f64 / tree.len() as f64;
    log::debug!("prob_err_optimal: budget={budget} perr={perr}");
    Ok((perr, witness))
}

/// minimum-E_dist sensor placement (§4.6).
pub fn exp_dist_optimal(
    tree: &TreeModel,
    budget: usize,
    root: Option<NodeId>,
) -> Result<(ExpDist, Vec<NodeId>)> {
    let leaves = validate(tree, budget)?;
    if budget >= leaves.len() {
        return Ok((0.0, leaves));
    }
    let view = rooted_view(tree, root);
    let stats = SubtreeStats::compute(&view);
    let classdist = ClassExpDist::compute(&view, &stats);
    let dp = EDistDp::new(&view, &stats, &classdist, budget);
    let (cost, witness) = dp.solve();
    let edist = cost / tree.len() as f64;
    log::debug!("exp_dist_optimal: budget={budget} edist={edist}");
    Ok((edist, witness))
}

/// exhaustive P_err reference, for cross-validation against
/// [`prob_err_optimal`] (§4.3).
pub fn prob_err_brute(tree: &TreeModel, budget: usize) -> Result<(Probability, Vec<NodeId>)> {
    let leaves = validate(tree, budget)?;
    if budget >= leaves.len() {
        return Ok((0.0, leaves));
    }
    let oracle = BruteOracle::new(tree);
    Ok(oracle.prob_err(&leaves, budget))
}

/// exhaustive E_dist reference, for cross-validation against
/// [`exp_dist_optimal`] (§4.3).
pub fn exp_dist_brute(tree: &TreeModel, budget: usize) -> Result<(ExpDist, Vec<NodeId>)> {
    let leaves = validate(tree, budget)?;
    if budget >= leaves.len() {
        return Ok((0.0, leaves));
    }
    let oracle = BruteOracle::new(tree);
    Ok(oracle.exp_dist(&leaves, budget))
}

fn validate(tree: &TreeModel, budget: usize) -> Result<Vec<NodeId>> {
    if budget < 2 {
        return Err(PlacementError::InvalidBudget { budget });
    }
    Ok(tree.leaves())
}

fn rooted_view(tree: &TreeModel, root: Option<NodeId>) -> RootedView {
    match root {
        Some(r) => RootedView::rooted_at(tree, r),
        None => RootedView::auto(tree)
            .expect("budget < |leaves| implies at least one non-leaf node exists"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn s1_path_of_five() {
        let tree = TreeModel::new(5, &[(0, 1), (1, 2), (2, 3), (3, 4)]).unwrap();
        let (perr, sensors) = prob_err_optimal(&tree, 2, None).unwrap();
        assert!((perr - 0.0).abs() < 1e-9);
        let mut sorted = sensors.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![0, 4]);

        let (edist, _) = exp_dist_optimal(&tree, 2, None).unwrap();
        assert!((edist - 0.0).abs() < 1e-9);
    }

    #[test]
    fn s2_star_k14() {
        let tree = TreeModel::new(5, &[(0, 1), (0, 2), (0, 3), (0, 4)]).unwrap();
        let (perr, sensors) = prob_err_optimal(&tree, 2, None).unwrap();
        assert!((perr - 0.4).abs() < 1e-9);
        let mut sorted = sensors.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![1, 2]);
    }

    #[test]
    fn s3_balanced_binary_depth_two() {
        let tree =
            TreeModel::new(7, &[(0, 1), (0, 2), (1, 3), (1, 4), (2, 5), (2, 6)]).unwrap();
        let (perr, _) = prob_err_optimal(&tree, 2, None).unwrap();
        assert!((perr - 3.0 / 7.0).abs() < 1e-9);
    }

    #[test]
    fn s4_path_of_four() {
        let tree = TreeModel::new(4, &[(0, 1), (1, 2), (2, 3)]).unwrap();
        let (perr, sensors) = prob_err_optimal(&tree, 2, None).unwrap();
        assert!((perr - 0.0).abs() < 1e-9);
        let mut sorted = sensors.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![0, 3]);
        let (edist, _) = exp_dist_optimal(&tree, 2, None).unwrap();
        assert!((edist - 0.0).abs() < 1e-9);
    }

    #[test]
    fn s5_caterpillar_matches_brute() {
        let tree = TreeModel::new(5, &[(0, 1), (1, 2), (1, 3), (2, 4)]).unwrap();
        let (perr_opt, _) = prob_err_optimal(&tree, 2, None).unwrap();
        let (perr_brute, _) = prob_err_brute(&tree, 2).unwrap();
        assert!((perr_opt - perr_brute).abs() < 1e-9);

        let (edist_opt, _) = exp_dist_optimal(&tree, 2, None).unwrap();
        let (edist_brute, _) = exp_dist_brute(&tree, 2).unwrap();
        assert!((edist_opt - edist_brute).abs() < 1e-9);
    }

    #[test]
    fn s6_random_trees_match_brute() {
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..200 {
            let n = rng.random_range(5..=12);
            let tree = support::random_tree(n, &mut rng);
            let leaves = tree.leaves();
            if leaves.len() < 2 {
                continue;
            }
            for &budget in &[2usize, leaves.len()] {
                if budget > leaves.len() {
                    continue;
                }
                let (perr_opt, _) = prob_err_optimal(&tree, budget, None).unwrap();
                let (perr_brute, _) = prob_err_brute(&tree, budget).unwrap();
                assert!((perr_opt - perr_brute).abs() < 1e-9, "n={n} budget={budget}");

                let (edist_opt, _) = exp_dist_optimal(&tree, budget, None).unwrap();
                let (edist_brute, _) = exp_dist_brute(&tree, budget).unwrap();
                assert!(
                    (edist_opt - edist_brute).abs() < 1e-9,
                    "n={n} budget={budget}"
                );
            }
        }
    }

    #[test]
    fn monotonic_in_budget_on_fixed_tree() {
        let tree = TreeModel::new(7, &[(0, 1), (0, 2), (1, 3), (1, 4), (2, 5), (2, 6)]).unwrap();
        let leaves = tree.leaves();
        let mut prev_perr = f64::INFINITY;
        let mut prev_edist = f64::INFINITY;
        for budget in 2..=leaves.len() {
            let (perr, _) = prob_err_optimal(&tree, budget, None).unwrap();
            let (edist, _) = exp_dist_optimal(&tree, budget, None).unwrap();
            assert!(perr <= prev_perr + 1e-9, "budget={budget} perr={perr} prev={prev_perr}");
            assert!(edist <= prev_edist + 1e-9, "budget={budget} edist={edist} prev={prev_edist}");
            prev_perr = perr;
            prev_edist = edist;
        }
    }

    #[test]
    fn monotonic_in_budget_on_random_trees() {
        let mut rng = SmallRng::seed_from_u64(99);
        for _ in 0..50 {
            let n = rng.random_range(5..=14);
            let tree = support::random_tree(n, &mut rng);
            let leaves = tree.leaves();
            if leaves.len() < 2 {
                continue;
            }
            let mut prev_perr = f64::INFINITY;
            let mut prev_edist = f64::INFINITY;
            for budget in 2..=leaves.len() {
                let (perr, _) = prob_err_optimal(&tree, budget, None).unwrap();
                let (edist, _) = exp_dist_optimal(&tree, budget, None).unwrap();
                assert!(
                    perr <= prev_perr + 1e-9,
                    "n={n} budget={budget} perr={perr} prev={prev_perr}"
                );
                assert!(
                    edist <= prev_edist + 1e-9,
                    "n={n} budget={budget} edist={edist} prev={prev_edist}"
                );
                prev_perr = perr;
                prev_edist = edist;
            }
        }
    }

    #[test]
    fn invalid_budget_rejected() {
        let tree = TreeModel::new(3, &[(0, 1), (1, 2)]).unwrap();
        assert!(matches!(
            prob_err_optimal(&tree, 1, None),
            Err(PlacementError::InvalidBudget { budget: 1 })
        ));
    }

    #[test]
    fn saturation_returns_all_leaves() {
        let tree = TreeModel::new(5, &[(0, 1), (0, 2), (0, 3), (0, 4)]).unwrap();
        let (perr, sensors) = prob_err_optimal(&tree, 4, None).unwrap();
        assert!((perr - 0.0).abs() < 1e-9);
        let mut sorted = sensors;
        sorted.sort_unstable();
        assert_eq!(sorted, vec![1, 2, 3, 4]);
    }
}
