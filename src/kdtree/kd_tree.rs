//! Balanced 2D kd-tree evaluating repulsive forces with multipole expansions.
//!
//! Construction sorts the particles once per axis and then repeatedly halves
//! oversized leaves at the median of their wider side, which bounds the depth
//! by `O(log n)` whatever the distribution. Every node carries the minimum
//! enclosing disc of its particles.
//!
//! A force pass expands every node about its disc center (leaves from their
//! particles, internal nodes by shifting and adding their children's
//! expansions), then lets each leaf walk the tree: nodes whose disc is well
//! separated from the leaf's disc contribute through their expansion, the rest
//! are opened, down to exact pairwise sums between overlapping leaves.
//!
//! # Example
//!
//! ```
//! use rs_multipole::kdtree::KdTree;
//! use rs_multipole::models::Particle;
//!
//! let mut particles = vec![
//!     Particle::new(0.0, 0.0),
//!     Particle::new(10.0, 0.0),
//!     Particle::new(0.0, 10.0),
//!     Particle::new(10.0, 10.0),
//! ];
//! let mut tree = KdTree::build(&particles, 1).expect("Failed to build tree");
//! tree.compute_forces(&mut particles, 5).expect("Force pass failed");
//!
//! // The bottom-left corner is pushed further down and left.
//! assert!(particles[0].force.x < 0.0);
//! assert!(particles[0].force.y < 0.0);
//! ```
use log::{debug, error, warn};
use crate::kdtree::{InternalNode, KdNode, LeafNode, NodeId, SplitQueue};
use crate::models::{Particle, Vector2D};
use crate::multipole::{ForceLaw, MultipoleCoefficients};
use crate::utils::{MultipoleConfig, MultipoleError};

/// Work done by the last force pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassStatistics {
    /// Leaf-to-node interactions resolved through an expansion.
    pub approximations: usize,
    /// Ordered particle pairs summed exactly.
    pub exact_pairs: usize,
}

#[derive(Debug, Clone)]
pub struct KdTree {
    nodes: Vec<KdNode>,
    root: NodeId,
    leaves: Vec<NodeId>,
    particle_count: usize,
    coefficients: Vec<MultipoleCoefficients>,
    statistics: PassStatistics,
}

impl KdTree {
    /// Builds a tree whose leaves hold at most `bucket_size` particles.
    ///
    /// # Errors
    /// [`MultipoleError::InvalidBucketSize`] for a zero bucket,
    /// [`MultipoleError::EmptyParticleSet`] for no particles and
    /// [`MultipoleError::NonFinitePosition`] if a coordinate is NaN or infinite.
    pub fn build(particles: &[Particle], bucket_size: usize) -> Result<Self, MultipoleError> {
        if bucket_size == 0 {
            return Err(MultipoleError::InvalidBucketSize(bucket_size));
        }
        if particles.is_empty() {
            return Err(MultipoleError::EmptyParticleSet);
        }
        if let Some(index) = particles.iter().position(|p| !p.position.is_finite()) {
            return Err(MultipoleError::NonFinitePosition(index));
        }

        let positions: Vec<Vector2D> = particles.iter().map(|p| p.position).collect();
        let mut by_x: Vec<usize> = (0..positions.len()).collect();
        by_x.sort_by(|&a, &b| positions[a].x.total_cmp(&positions[b].x));
        let mut by_y: Vec<usize> = (0..positions.len()).collect();
        by_y.sort_by(|&a, &b| positions[a].y.total_cmp(&positions[b].y));

        let root = NodeId(0);
        let mut nodes = vec![KdNode::Leaf(LeafNode::new(by_x, by_y, None, &positions)?)];
        let mut queue = SplitQueue::new(bucket_size);
        queue.enqueue_if_oversized(root, positions.len());
        let mut side = vec![false; positions.len()];

        while let Some(id) = queue.dequeue() {
            let (left, right, disc, parent) = match &nodes[id.index()] {
                KdNode::Leaf(leaf) => {
                    let (left, right) = leaf.split(&positions, &mut side, id)?;
                    (left, right, *leaf.disc(), leaf.parent())
                }
                KdNode::Internal(_) => continue,
            };
            let (left_size, right_size) = (left.len(), right.len());
            let left_id = NodeId(nodes.len());
            nodes.push(KdNode::Leaf(left));
            let right_id = NodeId(nodes.len());
            nodes.push(KdNode::Leaf(right));

            // The split leaf's slot becomes the internal node, so the parent's
            // child id needs no update.
            nodes[id.index()] = KdNode::Internal(InternalNode::new(disc, left_id, right_id, parent));
            queue.enqueue_if_oversized(left_id, left_size);
            queue.enqueue_if_oversized(right_id, right_size);
        }

        let leaves: Vec<NodeId> = nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.is_leaf())
            .map(|(i, _)| NodeId(i))
            .collect();

        let tree = KdTree {
            nodes,
            root,
            leaves,
            particle_count: positions.len(),
            coefficients: Vec::new(),
            statistics: PassStatistics::default(),
        };
        tree.report_coincident_leaves();
        debug!(
            "Built kd-tree over {} particles: {} nodes, {} leaves, depth {}",
            tree.particle_count,
            tree.nodes.len(),
            tree.leaves.len(),
            tree.depth()
        );
        Ok(tree)
    }

    /// Builds with the bucket size of `config` after validating it.
    pub fn build_with_config(particles: &[Particle], config: &MultipoleConfig) -> Result<Self, MultipoleError> {
        config.validate()?;
        KdTree::build(particles, config.bucket_size)
    }

    /// Adds the approximate repulsion from all other particles to every
    /// particle's force, using `precision` expansion terms and the default
    /// near-field law.
    ///
    /// `particles` must be the slice the tree was built from; positions may
    /// have moved since, the expansions are recomputed on every call.
    pub fn compute_forces(&mut self, particles: &mut [Particle], precision: usize) -> Result<(), MultipoleError> {
        self.compute_forces_with_law(particles, precision, &ForceLaw::default())
    }

    /// Force pass driven by a [`MultipoleConfig`].
    pub fn compute_forces_with_config(
        &mut self,
        particles: &mut [Particle],
        config: &MultipoleConfig,
    ) -> Result<(), MultipoleError> {
        config.validate()?;
        let law = ForceLaw::new(config.near_field_threshold)?;
        self.compute_forces_with_law(particles, config.precision, &law)
    }

    pub fn compute_forces_with_law(
        &mut self,
        particles: &mut [Particle],
        precision: usize,
        law: &ForceLaw,
    ) -> Result<(), MultipoleError> {
        if precision == 0 {
            return Err(MultipoleError::InvalidPrecision(precision));
        }
        if particles.len() != self.particle_count {
            error!(
                "Force pass over {} particles on a tree built for {}",
                particles.len(),
                self.particle_count
            );
            return Err(MultipoleError::ParticleCountMismatch {
                expected: self.particle_count,
                actual: particles.len(),
            });
        }

        let positions: Vec<Vector2D> = particles.iter().map(|p| p.position).collect();
        self.compute_multipole_coefficients(precision, &positions)?;

        let mut statistics = PassStatistics::default();
        for &leaf_id in &self.leaves {
            let leaf = match &self.nodes[leaf_id.index()] {
                KdNode::Leaf(leaf) => leaf,
                KdNode::Internal(_) => continue,
            };
            let members = leaf.particles();
            statistics.exact_pairs += accumulate_exact(particles, &positions, members, members, law);

            let mut stack = vec![self.root];
            while let Some(id) = stack.pop() {
                if id == leaf_id {
                    continue;
                }
                let node = &self.nodes[id.index()];
                if leaf.disc().is_separated_from(node.disc()) {
                    let expansion = &self.coefficients[id.index()];
                    for &i in members {
                        particles[i].force += expansion.approximate_force(positions[i]);
                    }
                    statistics.approximations += 1;
                    continue;
                }
                match node {
                    KdNode::Leaf(other) => {
                        statistics.exact_pairs +=
                            accumulate_exact(particles, &positions, members, other.particles(), law);
                    }
                    KdNode::Internal(internal) => {
                        stack.push(internal.left);
                        stack.push(internal.right);
                    }
                }
            }
        }

        self.statistics = statistics;
        debug!(
            "Force pass at precision {}: {} approximations, {} exact pairs",
            precision, statistics.approximations, statistics.exact_pairs
        );
        Ok(())
    }

    /// Expands every node about its disc center. Children always sit at
    /// higher arena indices than their parent, so one reverse sweep is a
    /// bottom-up pass.
    fn compute_multipole_coefficients(&mut self, precision: usize, positions: &[Vector2D]) -> Result<(), MultipoleError> {
        let count = self.nodes.len();
        let mut reversed: Vec<MultipoleCoefficients> = Vec::with_capacity(count);
        for id in (0..count).rev() {
            let node = &self.nodes[id];
            let center = node.disc().center;
            let expansion = match node {
                KdNode::Leaf(leaf) => {
                    let points: Vec<Vector2D> = leaf.particles().iter().map(|&i| positions[i]).collect();
                    MultipoleCoefficients::from_points(precision, center, &points)?
                }
                KdNode::Internal(internal) => MultipoleCoefficients::combine(
                    center,
                    &reversed[count - 1 - internal.left.index()],
                    &reversed[count - 1 - internal.right.index()],
                )?,
            };
            reversed.push(expansion);
        }
        reversed.reverse();
        self.coefficients = reversed;
        Ok(())
    }

    fn report_coincident_leaves(&self) {
        let stacked: usize = self
            .leaves
            .iter()
            .filter_map(|&id| match &self.nodes[id.index()] {
                KdNode::Leaf(leaf) if leaf.len() > 1 && leaf.disc().radius == 0.0 => Some(leaf.len()),
                _ => None,
            })
            .sum();
        if stacked > 0 {
            warn!("{} particles share their position with another; their repulsion will be clamped", stacked);
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&KdNode> {
        self.nodes.get(id.index())
    }

    pub fn nodes(&self) -> &[KdNode] {
        &self.nodes
    }

    pub fn leaves(&self) -> &[NodeId] {
        &self.leaves
    }

    /// Particle indices held by a leaf, `None` for internal or unknown ids.
    pub fn leaf_particles(&self, id: NodeId) -> Option<&[usize]> {
        match self.nodes.get(id.index()) {
            Some(KdNode::Leaf(leaf)) => Some(leaf.particles()),
            _ => None,
        }
    }

    /// Expansion of a node from the most recent force pass.
    pub fn coefficients(&self, id: NodeId) -> Option<&MultipoleCoefficients> {
        self.coefficients.get(id.index())
    }

    pub fn statistics(&self) -> PassStatistics {
        self.statistics
    }

    pub fn particle_count(&self) -> usize {
        self.particle_count
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of edges on the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self.root, 0)];
        while let Some((id, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            if let KdNode::Internal(internal) = &self.nodes[id.index()] {
                stack.push((internal.left, depth + 1));
                stack.push((internal.right, depth + 1));
            }
        }
        deepest
    }
}

/// Adds the exact repulsion of every particle in `sources` onto every distinct
/// particle in `targets`. Returns the number of ordered pairs handled.
fn accumulate_exact(
    particles: &mut [Particle],
    positions: &[Vector2D],
    targets: &[usize],
    sources: &[usize],
    law: &ForceLaw,
) -> usize {
    let mut pairs = 0;
    for &i in targets {
        for &j in sources {
            if i != j {
                particles[i].force += law.force_oriented(positions[j], positions[i], j < i);
                pairs += 1;
            }
        }
    }
    pairs
}
