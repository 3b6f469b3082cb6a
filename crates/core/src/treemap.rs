use crate::hierarchy::Hierarchy;
use crate::model::NodeId;

/// Golden ratio, the target aspect ratio of squarified rows.
pub const PHI: f64 = 1.618_033_988_749_895;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Rect {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x0 && x < self.x1 && y >= self.y0 && y < self.y1
    }

    pub fn intersection_area(&self, other: &Rect) -> f64 {
        let w = self.x1.min(other.x1) - self.x0.max(other.x0);
        let h = self.y1.min(other.y1) - self.y0.max(other.y0);
        if w <= 0.0 || h <= 0.0 {
            0.0
        } else {
            w * h
        }
    }

    /// Shrink by `p` on every side; an axis that would invert collapses to its midpoint.
    fn inset(self, p: f64) -> Rect {
        let (mut x0, mut y0, mut x1, mut y1) = (self.x0 + p, self.y0 + p, self.x1 - p, self.y1 - p);
        if x1 < x0 {
            x0 = (x0 + x1) / 2.0;
            x1 = x0;
        }
        if y1 < y0 {
            y0 = (y0 + y1) / 2.0;
            y1 = y0;
        }
        Rect { x0, y0, x1, y1 }
    }
}

#[derive(Clone, Debug)]
pub struct TreemapItem {
    pub id: NodeId,
    pub weight: f64,
    pub rect: Rect,
}

/// Pack one level of weighted items into `area`. Items are laid out in the
/// given order in rows along the shorter side; a row keeps growing while its
/// worst aspect ratio does not get worse than with one item fewer.
pub fn squarify(weights: &[(NodeId, f64)], area: Rect, ratio: f64) -> Vec<TreemapItem> {
    let mut out: Vec<TreemapItem> = weights
        .iter()
        .map(|&(id, weight)| TreemapItem {
            id,
            weight,
            rect: Rect::default(),
        })
        .collect();
    let n = out.len();
    let mut remaining: f64 = weights.iter().map(|(_, w)| w).sum();
    let Rect { mut x0, mut y0, x1, y1 } = area;
    let (mut i0, mut i1) = (0, 0);

    while i0 < n {
        let dx = x1 - x0;
        let dy = y1 - y0;

        // Skip leading zero weights; they join the next row.
        let mut sum;
        loop {
            sum = out[i1].weight;
            i1 += 1;
            if sum != 0.0 || i1 >= n {
                break;
            }
        }
        let mut min = sum;
        let mut max = sum;
        let alpha = (dy / dx).max(dx / dy) / (remaining * ratio);
        let mut beta = sum * sum * alpha;
        let mut worst = (max / beta).max(beta / min);

        while i1 < n {
            let w = out[i1].weight;
            sum += w;
            min = min.min(w);
            max = max.max(w);
            beta = sum * sum * alpha;
            let next = (max / beta).max(beta / min);
            if next > worst {
                sum -= w;
                break;
            }
            worst = next;
            i1 += 1;
        }

        let row = &mut out[i0..i1];
        if dx < dy {
            let y_end = if remaining > 0.0 { y0 + dy * sum / remaining } else { y1 };
            dice(row, x0, y0, x1, y_end);
            if remaining > 0.0 {
                y0 = y_end;
            }
        } else {
            let x_end = if remaining > 0.0 { x0 + dx * sum / remaining } else { x1 };
            slice(row, x0, y0, x_end, y1);
            if remaining > 0.0 {
                x0 = x_end;
            }
        }
        remaining -= sum;
        i0 = i1;
    }
    out
}

/// Lay a row out left to right across a horizontal band.
fn dice(row: &mut [TreemapItem], x0: f64, y0: f64, x1: f64, y1: f64) {
    let total: f64 = row.iter().map(|i| i.weight).sum();
    let k = if total > 0.0 { (x1 - x0) / total } else { 0.0 };
    let mut x = x0;
    for item in row {
        let next = x + item.weight * k;
        item.rect = Rect::new(x, y0, next, y1);
        x = next;
    }
}

/// Lay a row out top to bottom down a vertical band.
fn slice(row: &mut [TreemapItem], x0: f64, y0: f64, x1: f64, y1: f64) {
    let total: f64 = row.iter().map(|i| i.weight).sum();
    let k = if total > 0.0 { (y1 - y0) / total } else { 0.0 };
    let mut y = y0;
    for item in row {
        let next = y + item.weight * k;
        item.rect = Rect::new(x0, y, x1, next);
        y = next;
    }
}

/// Rectangles for every node of a hierarchy, indexed by [`NodeId`].
#[derive(Clone, Debug)]
pub struct Layout {
    pub width: f64,
    pub height: f64,
    pub rects: Vec<Rect>,
    leaves: Vec<NodeId>,
}

impl Layout {
    pub fn rect(&self, id: NodeId) -> Rect {
        self.rects[id.index()]
    }

    /// Leaf ids in document order.
    pub fn leaves(&self) -> &[NodeId] {
        &self.leaves
    }

    /// Leaf whose rectangle contains the point, if any.
    pub fn hit_test(&self, x: f64, y: f64) -> Option<NodeId> {
        self.leaves
            .iter()
            .copied()
            .find(|id| self.rect(*id).contains(x, y))
    }
}

#[derive(Clone, Copy, Debug)]
pub struct LayoutOptions {
    pub width: f64,
    pub height: f64,
    /// Gap between siblings and inset of children from their parent.
    pub padding: f64,
    pub ratio: f64,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            width: 1160.0,
            height: 560.0,
            padding: 1.0,
            ratio: PHI,
        }
    }
}

/// Lay out the whole tree. The root fills `[0,width] x [0,height]`; each
/// group's children are packed inside it with `padding` between siblings and
/// from the group's edge, largest weight first.
pub fn layout(tree: &Hierarchy, opts: &LayoutOptions) -> Layout {
    let mut rects = vec![Rect::default(); tree.nodes.len()];
    rects[tree.root.index()] = Rect::new(0.0, 0.0, opts.width.max(0.0), opts.height.max(0.0));
    let half = opts.padding.max(0.0) / 2.0;
    let ratio = if opts.ratio > 1.0 { opts.ratio } else { PHI };

    // Arena is pre-order, so a parent's rect is final before its children are placed.
    for node in &tree.nodes {
        let own = if node.node == tree.root {
            rects[node.node.index()]
        } else {
            rects[node.node.index()].inset(half)
        };
        rects[node.node.index()] = own;
        if node.children.is_empty() {
            continue;
        }
        let inner = own.inset(half);
        let mut weights: Vec<(NodeId, f64)> = node
            .children
            .iter()
            .map(|c| (*c, tree.get(*c).weight))
            .collect();
        weights.sort_by(|a, b| b.1.total_cmp(&a.1));
        for item in squarify(&weights, inner, ratio) {
            rects[item.id.index()] = item.rect;
        }
    }

    let leaves = tree.leaves().map(|n| n.node).collect();
    tracing::debug!(width = opts.width, height = opts.height, "treemap laid out");
    Layout {
        width: opts.width,
        height: opts.height,
        rects,
        leaves,
    }
}
