use crate::geometry::{Disc, MinimumEnclosingDisc};
use crate::models::Vector2D;
use crate::utils::MultipoleError;

/// Index of a node in the tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    pub fn coordinate(&self, point: Vector2D) -> f64 {
        match self {
            Axis::Horizontal => point.x,
            Axis::Vertical => point.y,
        }
    }

    pub fn other(&self) -> Axis {
        match self {
            Axis::Horizontal => Axis::Vertical,
            Axis::Vertical => Axis::Horizontal,
        }
    }

    fn slot(&self) -> usize {
        match self {
            Axis::Horizontal => 0,
            Axis::Vertical => 1,
        }
    }
}

/// A bucket of particles. The same indices are kept twice, once ordered by x
/// and once by y, so splits never have to sort again.
#[derive(Debug, Clone)]
pub struct LeafNode {
    views: [Vec<usize>; 2],
    disc: Disc,
    parent: Option<NodeId>,
}

/// Two children and the disc of everything below them.
#[derive(Debug, Clone)]
pub struct InternalNode {
    pub left: NodeId,
    pub right: NodeId,
    disc: Disc,
    parent: Option<NodeId>,
}

#[derive(Debug, Clone)]
pub enum KdNode {
    Leaf(LeafNode),
    Internal(InternalNode),
}

impl KdNode {
    pub fn disc(&self) -> &Disc {
        match self {
            KdNode::Leaf(leaf) => &leaf.disc,
            KdNode::Internal(internal) => &internal.disc,
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        match self {
            KdNode::Leaf(leaf) => leaf.parent,
            KdNode::Internal(internal) => internal.parent,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, KdNode::Leaf(_))
    }
}

impl InternalNode {
    pub fn new(disc: Disc, left: NodeId, right: NodeId, parent: Option<NodeId>) -> Self {
        InternalNode { left, right, disc, parent }
    }
}

impl LeafNode {
    /// Builds a leaf from its two sorted views and computes its enclosing disc.
    pub fn new(
        by_x: Vec<usize>,
        by_y: Vec<usize>,
        parent: Option<NodeId>,
        positions: &[Vector2D],
    ) -> Result<Self, MultipoleError> {
        debug_assert_eq!(by_x.len(), by_y.len());
        let disc = enclosing_disc(&by_x, positions)?;
        Ok(LeafNode {
            views: [by_x, by_y],
            disc,
            parent,
        })
    }

    pub fn len(&self) -> usize {
        self.views[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.views[0].is_empty()
    }

    pub fn disc(&self) -> &Disc {
        &self.disc
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Particle indices in ascending order along `axis`.
    pub fn particles_by(&self, axis: Axis) -> &[usize] {
        &self.views[axis.slot()]
    }

    pub fn particles(&self) -> &[usize] {
        self.particles_by(Axis::Horizontal)
    }

    fn extent(&self, axis: Axis, positions: &[Vector2D]) -> f64 {
        let view = self.particles_by(axis);
        match (view.first(), view.last()) {
            (Some(&first), Some(&last)) => axis.coordinate(positions[last]) - axis.coordinate(positions[first]),
            _ => 0.0,
        }
    }

    /// Splits across the wider side of the bounding box; ties split vertically.
    pub fn split_axis(&self, positions: &[Vector2D]) -> Axis {
        if self.extent(Axis::Horizontal, positions) > self.extent(Axis::Vertical, positions) {
            Axis::Horizontal
        } else {
            Axis::Vertical
        }
    }

    /// Median split: the first half of the split-axis view goes left. `side`
    /// is a scratch flag per particle used to partition the other view without
    /// sorting it again. Both children get `parent` as their parent.
    pub fn split(
        &self,
        positions: &[Vector2D],
        side: &mut [bool],
        parent: NodeId,
    ) -> Result<(LeafNode, LeafNode), MultipoleError> {
        let axis = self.split_axis(positions);
        let split_view = self.particles_by(axis);
        let n_left = self.len() / 2;

        for (i, &p) in split_view.iter().enumerate() {
            side[p] = i < n_left;
        }
        let (left_split, right_split) = split_view.split_at(n_left);
        let (left_other, right_other): (Vec<usize>, Vec<usize>) = self
            .particles_by(axis.other())
            .iter()
            .partition(|&&p| side[p]);
        debug_assert_eq!(left_other.len(), n_left);

        let (left, right) = match axis {
            Axis::Horizontal => (
                LeafNode::new(left_split.to_vec(), left_other, Some(parent), positions)?,
                LeafNode::new(right_split.to_vec(), right_other, Some(parent), positions)?,
            ),
            Axis::Vertical => (
                LeafNode::new(left_other, left_split.to_vec(), Some(parent), positions)?,
                LeafNode::new(right_other, right_split.to_vec(), Some(parent), positions)?,
            ),
        };
        Ok((left, right))
    }
}

/// Minimum enclosing disc of the particles in `view`.
///
/// The view is sorted along an axis, which is the worst order for an
/// incremental disc solver, so it is fed in a fixed strided order instead.
fn enclosing_disc(view: &[usize], positions: &[Vector2D]) -> Result<Disc, MultipoleError> {
    let points: Vec<Vector2D> = strided_order(view.len())
        .map(|i| positions[view[i]])
        .collect();
    Ok(MinimumEnclosingDisc::linear_computation(&points)?.disc)
}

/// A permutation of `0..n` stepping by a stride coprime with `n`, close to `n / φ`.
fn strided_order(n: usize) -> impl Iterator<Item = usize> {
    let mut stride = ((n as f64) * 0.618_033_988_75) as usize;
    stride = stride.max(1);
    while n > 1 && gcd(stride, n) != 1 {
        stride += 1;
    }
    (0..n).map(move |i| (i * stride) % n)
}

fn gcd(mut a: usize, mut b: usize) -> usize {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}
