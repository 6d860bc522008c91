use crate::view::RootedView;
use crate::NodeId;

/// per-node `size` / `sum_below` / `sum_above` aggregates over a
/// [`RootedView`]. pure function of the view; computed once and reused by
/// every downstream component.
pub struct SubtreeStats {
    size: Vec<usize>,
    sum_below: Vec<i64>,
    sum_above: Vec<i64>,
}

impl SubtreeStats {
    pub fn compute(view: &RootedView) -> Self {
        let n = view.len();
        let mut size = vec![0usize; n];
        let mut sum_below = vec![0i64; n];
        let mut sum_above = vec![0i64; n];

        // size / sum_below: children before parent
        for &x in view.post_order().iter() {
            let mut sz = 1usize;
            let mut below = 0i64;
            for &c in view.children(x) {
                sz += size[c];
                below += sum_below[c] + view.distance(x, c) as i64 * size[c] as i64;
            }
            size[x] = sz;
            sum_below[x] = below;
        }

        // sum_above: parent before children, using the identity in §3
        let n_total = n as i64;
        for &x in view.pre_order().iter() {
            sum_above[x] = match view.parent(x) {
                None => 0,
                Some(p) => {
                    let d = view.distance(x, p) as i64;
                    sum_above[p] + (sum_below[p] - sum_below[x] - d * size[x] as i64)
                        + d * (n_total - size[x] as i64)
                }
            };
        }

        log::debug!("subtree stats computed for {n} nodes");
        Self {
            size,
            sum_below,
            sum_above,
        }
    }

    pub fn size(&self, x: NodeId) -> usize {
        self.size[x]
    }

    pub fn sum_below(&self, x: NodeId) -> i64 {
        self.sum_below[x]
    }

    pub fn sum_above(&self, x: NodeId) -> i64 {
        self.sum_above[x]
    }
}
