use crate::stats::SubtreeStats;
use crate::view::RootedView;
use crate::NodeId;
use std::cell::RefCell;
use std::collections::HashMap;

type Witness = Vec<NodeId>;
/// `None` is the `Infeasible` sentinel from DESIGN NOTES §9: preferred over
/// arithmetic on `+∞` so a bug can never silently produce `NaN`.
type Candidate = (Option<usize>, Witness);

fn better(a: Candidate, b: Candidate) -> Candidate {
    match (a.0, b.0) {
        (None, None) => a,
        (None, Some(_)) => b,
        (Some(_), None) => a,
        (Some(ca), Some(cb)) => {
            if ca < cb {
                a
            } else if cb < ca {
                b
            } else if a.1 <= b.1 {
                a
            } else {
                b
            }
        }
    }
}

/// tree DP minimizing unresolved-node count under a sensor budget (§4.5).
pub struct PErrDp<'v, 't> {
    view: &'v RootedView<'t>,
    stats: &'v SubtreeStats,
    budget: usize,
    memo_opt: RefCell<HashMap<(NodeId, usize), Candidate>>,
    memo_optc: RefCell<HashMap<(NodeId, usize, usize), Candidate>>,
}

impl<'v, 't> PErrDp<'v, 't> {
    pub fn new(view: &'v RootedView<'t>, stats: &'v SubtreeStats, budget: usize) -> Self {
        Self {
            view,
            stats,
            budget,
            memo_opt: RefCell::new(HashMap::new()),
            memo_optc: RefCell::new(HashMap::new()),
        }
    }

    /// returns `(unresolved_count, sensors)` at the root; the caller divides
    /// by `n` to recover the error probability.
    pub fn solve(&self) -> (usize, Witness) {
        let (cost, witness) = self.opt(self.view.root(), self.budget);
        let cost = cost.expect("feasible: caller ensures 2 <= budget <= |leaves|");
        log::debug!("perr dp solved: unresolved={cost}");
        (cost, witness)
    }

    fn opt(&self, x: NodeId, k: usize) -> Candidate {
        if let Some(hit) = self.memo_opt.borrow().get(&(x, k)) {
            return hit.clone();
        }
        log::trace!("perr opt(x={x}, k={k})");
        let result = if k == 0 {
            (Some(self.stats.size(x)), Witness::new())
        } else if self.stats.size(x) == 1 {
            if k == 1 {
                (Some(0), vec![x])
            } else {
                (None, Witness::new())
            }
        } else {
            let (mut cost, witness) = self.optc(x, k, 0);
            if !self.view.is_root(x) && k == self.budget {
                cost = cost.map(|c| c + 1);
            }
            (cost, witness)
        };
        self.memo_opt
            .borrow_mut()
            .insert((x, k), result.clone());
        result
    }

    /// `optc(x, k, children(x)[suffix..])`: splits budget `k` across the
    /// remaining children of `x`, first-child-plus-rest recursion.
    fn optc(&self, x: NodeId, k: usize, suffix: usize) -> Candidate {
        if let Some(hit) = self.memo_optc.borrow().get(&(x, k, suffix)) {
            return hit.clone();
        }
        let children = self.view.children(x);
        let result = if suffix == children.len() {
            if k > 0 {
                (None, Witness::new())
            } else {
                (Some(0), Witness::new())
            }
        } else if k == 0 {
            let size: usize = children[suffix..].iter().map(|&c| self.stats.size(c)).sum();
            (Some(size), Witness::new())
        } else {
            let first = children[suffix];
            let mut best: Candidate = (None, Witness::new());
            for l in 0..=k {
                let (e1, o1) = self.opt(first, l);
                let (e2, o2) = self.optc(x, k - l, suffix + 1);
                let combined = match (e1, e2) {
                    (Some(a), Some(b)) => Some(a + b),
                    _ => None,
                };
                let mut witness = o1;
                witness.extend(o2);
                best = better(best, (combined, witness));
            }
            best
        };
        self.memo_optc
            .borrow_mut()
            .insert((x, k, suffix), result.clone());
        result
    }
}
