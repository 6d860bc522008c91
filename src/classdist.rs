use crate::stats::SubtreeStats;
use crate::view::RootedView;
use crate::NodeId;

/// precomputed expected-distance tables for every equivalence class
/// `T(x,S) = {x} ∪ ⋃_{c∈S} subtree(c)` and its parent-inclusive variant
/// `T⁺(x,S) = T(x,S) ∪ (V ∖ subtree(x))`, for every node `x` and every
/// subset `S` of `children(x)`.
///
/// subsets are addressed internally by bitmask over `view.children(x)`
/// (ascending-id order) rather than by materialized sorted-tuple keys —
/// the public accessors translate a sorted `NodeId` subset into that mask,
/// so callers never see the bitmask representation.
pub struct ClassExpDist {
    /// `children_raw[x][mask]` = unnormalized `W(x, S)`.
    children_raw: Vec<Vec<f64>>,
    /// `parent_raw[x][mask]` = unnormalized `W⁺(x, S)`; empty for the root,
    /// which aliases `children_raw` per the base case `W⁺(root,S)=W(root,S)`.
    parent_raw: Vec<Vec<f64>>,
    /// `size_below_mask[x][mask]` = `Σ_{c∈S} size(c)`, cached for normalization.
    size_below_mask: Vec<Vec<usize>>,
}

impl ClassExpDist {
    pub fn compute(view: &RootedView, stats: &SubtreeStats) -> Self {
        let n = view.len();
        let mut children_raw: Vec<Vec<f64>> = vec![Vec::new(); n];
        let mut size_below_mask: Vec<Vec<usize>> = vec![Vec::new(); n];

        for &x in view.post_order().iter() {
            let kids = view.children(x);
            let m = kids.len();
            let masks = 1usize << m;
            let mut size_below = vec![0usize; masks];
            let mut raw = vec![0.0f64; masks];
            if m > 0 {
                let g: Vec<f64> = kids
                    .iter()
                    .map(|&c| {
                        (stats.sum_below(c) + view.distance(x, c) as i64 * stats.size(c) as i64)
                            as f64
                    })
                    .collect();
                let full_raw_child: Vec<f64> = kids
                    .iter()
                    .map(|&c| children_raw[c].last().copied().unwrap_or(0.0))
                    .collect();
                for mask in 1..masks {
                    let mut sb = 0usize;
                    for i in 0..m {
                        if mask & (1 << i) != 0 {
                            sb += stats.size(kids[i]);
                        }
                    }
                    size_below[mask] = sb;
                    let mut w = 0.0f64;
                    for i in 0..m {
                        if mask & (1 << i) == 0 {
                            continue;
                        }
                        let gi = g[i];
                        let si = stats.size(kids[i]) as f64;
                        w += full_raw_child[i];
                        w += 2.0 * gi * (sb as f64 - si);
                        w += 2.0 * gi;
                    }
                    raw[mask] = w;
                }
            }
            children_raw[x] = raw;
            size_below_mask[x] = size_below;
        }

        let mut parent_raw: Vec<Vec<f64>> = vec![Vec::new(); n];
        for &x in view.pre_order().iter() {
            if view.is_root(x) {
                continue;
            }
            let p = view.parent(x).expect("non-root has a parent");
            let kids_p = view.children(p);
            let idx_in_parent = kids_p
                .iter()
                .position(|&c| c == x)
                .expect("x is a child of p");
            let full_mask_p = (1usize << kids_p.len()) - 1;
            let mask_excl_x = full_mask_p & !(1usize << idx_in_parent);
            let parent_source = if view.is_root(p) {
                &children_raw[p]
            } else {
                &parent_raw[p]
            };
            let out_x = parent_source[mask_excl_x];

            let kids = view.children(x);
            let m = kids.len();
            let masks = 1usize << m;
            let size_above = (view.len() - stats.size(x)) as f64;
            let sum_above_x = stats.sum_above(x) as f64;
            let g: Vec<f64> = kids
                .iter()
                .map(|&c| {
                    (stats.sum_below(c) + view.distance(x, c) as i64 * stats.size(c) as i64) as f64
                })
                .collect();

            let mut pr = vec![0.0f64; masks];
            for mask in 0..masks {
                let mut sum_below_sel = 0.0f64;
                for i in 0..m {
                    if mask & (1 << i) != 0 {
                        sum_below_sel += g[i];
                    }
                }
                let size_below_incl_x = 1.0 + size_below_mask[x][mask] as f64;
                pr[mask] = children_raw[x][mask]
                    + out_x
                    + 2.0 * (sum_below_sel * size_above + sum_above_x * size_below_incl_x);
            }
            parent_raw[x] = pr;
        }

        log::debug!("class expected-distance tables computed for {n} nodes");
        Self {
            children_raw,
            parent_raw,
            size_below_mask,
        }
    }

    /// `w(x, sorted(S))`, the normalized children-only class value.
    pub fn children_value(&self, view: &RootedView, x: NodeId, children_subset: &[NodeId]) -> f64 {
        let mask = Self::mask_for(view.children(x), children_subset);
        let raw = self.children_raw[x][mask];
        let denom = 1.0 + self.size_below_mask[x][mask] as f64;
        raw / denom
    }

    /// `w(x, (p(x),) ++ sorted(S))`, the normalized parent-inclusive class
    /// value. at the root this is identical to the children-only value.
    pub fn parent_inclusive_value(
        &self,
        view: &RootedView,
        stats: &SubtreeStats,
        x: NodeId,
        children_subset: &[NodeId],
    ) -> f64 {
        let mask = Self::mask_for(view.children(x), children_subset);
        if view.is_root(x) {
            let raw = self.children_raw[x][mask];
            let denom = 1.0 + self.size_below_mask[x][mask] as f64;
            return raw / denom;
        }
        let raw = self.parent_raw[x][mask];
        let size_above = (view.len() - stats.size(x)) as f64;
        let denom = 1.0 + self.size_below_mask[x][mask] as f64 + size_above;
        raw / denom
    }

    /// dispatches to either accessor depending on whether the canonical key
    /// includes the `p(x)` sentinel in position 0.
    pub fn lookup(
        &self,
        view: &RootedView,
        stats: &SubtreeStats,
        x: NodeId,
        parent_included: bool,
        children_subset: &[NodeId],
    ) -> f64 {
        if parent_included {
            self.parent_inclusive_value(view, stats, x, children_subset)
        } else {
            self.children_value(view, x, children_subset)
        }
    }

    fn mask_for(kids: &[NodeId], subset: &[NodeId]) -> usize {
        let mut mask = 0usize;
        for &c in subset {
            let i = kids
                .iter()
                .position(|&k| k == c)
                .expect("subset element must be a child of x");
            mask |= 1 << i;
        }
        mask
    }
}
