use crate::classdist::ClassExpDist;
use crate::stats::SubtreeStats;
use crate::view::RootedView;
use crate::NodeId;
use std::cell::RefCell;
use std::collections::HashMap;

type Witness = Vec<NodeId>;
type CandidateF = (Option<f64>, Witness);

fn better_f(a: CandidateF, b: CandidateF) -> CandidateF {
    match (a.0, b.0) {
        (None, None) => a,
        (None, Some(_)) => b,
        (Some(_), None) => a,
        (Some(ca), Some(cb)) => match ca.total_cmp(&cb) {
            std::cmp::Ordering::Less => a,
            std::cmp::Ordering::Greater => b,
            std::cmp::Ordering::Equal => {
                if a.1 <= b.1 {
                    a
                } else {
                    b
                }
            }
        },
    }
}

/// tree DP minimizing total (unscaled) expected distance, consuming the
/// precomputed [`ClassExpDist`] tables (§4.6).
pub struct EDistDp<'v, 't> {
    view: &'v RootedView<'t>,
    stats: &'v SubtreeStats,
    classdist: &'v ClassExpDist,
    budget: usize,
    memo_opt: RefCell<HashMap<(NodeId, usize), CandidateF>>,
    memo_optc: RefCell<HashMap<(NodeId, usize, usize, bool, usize), CandidateF>>,
}

impl<'v, 't> EDistDp<'v, 't> {
    pub fn new(
        view: &'v RootedView<'t>,
        stats: &'v SubtreeStats,
        classdist: &'v ClassExpDist,
        budget: usize,
    ) -> Self {
        Self {
            view,
            stats,
            classdist,
            budget,
            memo_opt: RefCell::new(HashMap::new()),
            memo_optc: RefCell::new(HashMap::new()),
        }
    }

    /// returns `(unnormalized_expected_distance, sensors)` at the root; the
    /// caller divides by `n`.
    pub fn solve(&self) -> (f64, Witness) {
        let (cost, witness) = self.opt(self.view.root(), self.budget);
        let cost = cost.expect("feasible: caller ensures 2 <= budget <= |leaves|");
        log::debug!("edist dp solved: cost={cost}");
        (cost, witness)
    }

    fn opt(&self, x: NodeId, k: usize) -> CandidateF {
        if let Some(hit) = self.memo_opt.borrow().get(&(x, k)) {
            return hit.clone();
        }
        log::trace!("edist opt(x={x}, k={k})");
        let result = if self.stats.size(x) == 1 {
            match k {
                0 => (Some(0.0), Witness::new()),
                1 => (Some(0.0), vec![x]),
                _ => (None, Witness::new()),
            }
        } else {
            let parent_included = !self.view.is_root(x) && k == self.budget;
            self.optc(x, k, 0, parent_included, 0)
        };
        self.memo_opt.borrow_mut().insert((x, k), result.clone());
        result
    }

    /// `optc(x, k, children(x)[suffix..], nonsensored)` where `nonsensored`
    /// is `parent_included` (whether `p(x)` is in the canonical key) plus
    /// `skip_mask`, a bitmask over `children(x)[..suffix]` marking which of
    /// the already-examined children were skipped (sent zero sensors).
    fn optc(
        &self,
        x: NodeId,
        k: usize,
        suffix: usize,
        parent_included: bool,
        skip_mask: usize,
    ) -> CandidateF {
        let key = (x, k, suffix, parent_included, skip_mask);
        if let Some(hit) = self.memo_optc.borrow().get(&key) {
            return hit.clone();
        }
        let children = self.view.children(x);
        let result = if suffix == children.len() {
            if k > 0 {
                (None, Witness::new())
            } else {
                let subset = Self::subset_from_mask(children, skip_mask);
                let value =
                    self.classdist
                        .lookup(self.view, self.stats, x, parent_included, &subset);
                (Some(value), Witness::new())
            }
        } else if k == 0 {
            let mut full_mask = skip_mask;
            for i in suffix..children.len() {
                full_mask |= 1 << i;
            }
            let subset = Self::subset_from_mask(children, full_mask);
            let value =
                self.classdist
                    .lookup(self.view, self.stats, x, parent_included, &subset);
            (Some(value), Witness::new())
        } else {
            let mut best: CandidateF = (None, Witness::new());
            // the full local budget happens to equal the global budget: in
            // addition to the usual split, try funneling it entirely into
            // one of the remaining children. the child's own precomputed
            // class tables already aggregate everything outside its
            // subtree (including x and x's other children), so this needs
            // no extra term here.
            if !self.view.is_root(x) && k == self.budget {
                for &c in &children[suffix..] {
                    best = better_f(best, self.opt(c, k));
                }
            }
            let first = children[suffix];
            let skip = self.optc(x, k, suffix + 1, parent_included, skip_mask | (1 << suffix));
            best = better_f(best, skip);
            let h = k.min(self.budget - 1);
            for l in 1..=h {
                let (e1, o1) = self.opt(first, l);
                let (e2, o2) = self.optc(x, k - l, suffix + 1, parent_included, skip_mask);
                let combined = match (e1, e2) {
                    (Some(a), Some(b)) => Some(a + b),
                    _ => None,
                };
                let mut witness = o1;
                witness.extend(o2);
                best = better_f(best, (combined, witness));
            }
            best
        };
        self.memo_optc.borrow_mut().insert(key, result.clone());
        result
    }

    fn subset_from_mask(children: &[NodeId], mask: usize) -> Vec<NodeId> {
        children
            .iter()
            .enumerate()
            .filter(|(i, _)| mask & (1 << i) != 0)
            .map(|(_, &c)| c)
            .collect()
    }
}
