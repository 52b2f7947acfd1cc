use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use crate::kdtree::{Axis, KdNode, KdTree, NodeId};
use crate::models::{reset_forces, Particle, Vector2D};
use crate::multipole::{direct_forces, ForceLaw};
use crate::utils::{MultipoleConfig, MultipoleError};

fn random_particles(seed: u64, n: usize, extent: f64) -> Vec<Particle> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| Particle::new(rng.gen_range(0.0..extent), rng.gen_range(0.0..extent)))
        .collect()
}

fn square() -> Vec<Particle> {
    vec![
        Particle::new(0.0, 0.0),
        Particle::new(10.0, 0.0),
        Particle::new(0.0, 10.0),
        Particle::new(10.0, 10.0),
    ]
}

/// Every particle index found under `id`.
fn subtree_particles(tree: &KdTree, id: NodeId) -> Vec<usize> {
    let mut found = Vec::new();
    let mut stack = vec![id];
    while let Some(current) = stack.pop() {
        match tree.node(current).expect("Dangling node id") {
            KdNode::Leaf(leaf) => found.extend_from_slice(leaf.particles()),
            KdNode::Internal(internal) => {
                stack.push(internal.left);
                stack.push(internal.right);
            }
        }
    }
    found
}

/// Per-particle error of `forces` against `exact`, scaled by the mean exact magnitude.
fn scaled_errors(forces: &[Particle], exact: &[Particle]) -> Vec<f64> {
    let scale = exact.iter().map(|p| p.force.length()).sum::<f64>() / exact.len() as f64;
    let mut errors: Vec<f64> = forces
        .iter()
        .zip(exact)
        .map(|(a, b)| (a.force - b.force).length() / (b.force.length() + scale))
        .collect();
    errors.sort_by(|a, b| a.total_cmp(b));
    errors
}

#[test]
fn test_build_rejects_bad_input() {
    let particles = square();
    assert_eq!(KdTree::build(&particles, 0).err(), Some(MultipoleError::InvalidBucketSize(0)));
    assert_eq!(KdTree::build(&[], 1).err(), Some(MultipoleError::EmptyParticleSet));

    let broken = vec![Particle::new(0.0, 0.0), Particle::new(f64::NAN, 1.0)];
    assert_eq!(KdTree::build(&broken, 1).err(), Some(MultipoleError::NonFinitePosition(1)));
}

#[test]
fn test_small_set_stays_a_single_leaf() {
    let particles = square();
    let tree = KdTree::build(&particles, 4).unwrap();
    assert_eq!(tree.len(), 1);
    assert_eq!(tree.leaves(), &[tree.root()]);
    assert_eq!(tree.depth(), 0);
    assert_eq!(tree.leaf_particles(tree.root()).map(|p| p.len()), Some(4));
}

#[test]
fn test_square_tree_shape() {
    let particles = square();
    let tree = KdTree::build(&particles, 1).unwrap();
    assert_eq!(tree.len(), 7);
    assert_eq!(tree.leaves().len(), 4);
    assert_eq!(tree.depth(), 2);

    let root = tree.node(tree.root()).unwrap();
    assert!(!root.is_leaf());
    assert_relative_eq!(root.disc().center, Vector2D::new(5.0, 5.0), epsilon = 1e-9);
    assert_relative_eq!(root.disc().radius, 50.0_f64.sqrt(), epsilon = 1e-9);
}

#[test]
fn test_partition_is_complete_and_bounded() {
    for (seed, n) in [(1, 1), (2, 2), (3, 17), (4, 100), (5, 513)] {
        let particles = random_particles(seed, n, 100.0);
        for bucket_size in [1, 2, 3, 7, 16] {
            let tree = KdTree::build(&particles, bucket_size).unwrap();
            let mut seen = vec![0usize; n];
            for &leaf_id in tree.leaves() {
                let leaf = match tree.node(leaf_id) {
                    Some(KdNode::Leaf(leaf)) => leaf,
                    other => panic!("Leaf list holds a non-leaf: {:?}", other),
                };
                assert!(leaf.len() <= bucket_size, "Leaf of {} exceeds bucket {}", leaf.len(), bucket_size);
                assert!(!leaf.is_empty());

                let by_x = leaf.particles_by(Axis::Horizontal);
                let by_y = leaf.particles_by(Axis::Vertical);
                assert_eq!(by_x.len(), by_y.len());
                let mut xs = by_x.to_vec();
                let mut ys = by_y.to_vec();
                xs.sort_unstable();
                ys.sort_unstable();
                assert_eq!(xs, ys, "Axis views of a leaf disagree");
                assert!(by_x.windows(2).all(|w| particles[w[0]].position.x <= particles[w[1]].position.x));
                assert!(by_y.windows(2).all(|w| particles[w[0]].position.y <= particles[w[1]].position.y));

                for &i in by_x {
                    seen[i] += 1;
                }
            }
            assert!(seen.iter().all(|&count| count == 1), "Particles are not partitioned exactly");
        }
    }
}

#[test]
fn test_tree_is_full_binary_with_consistent_parents() {
    let particles = random_particles(8, 300, 50.0);
    let tree = KdTree::build(&particles, 3).unwrap();
    assert_eq!(tree.node(tree.root()).unwrap().parent(), None);
    // A full binary tree has one fewer internal node than leaves.
    assert_eq!(tree.len(), 2 * tree.leaves().len() - 1);

    for (index, node) in tree.nodes().iter().enumerate() {
        if let KdNode::Internal(internal) = node {
            let id = NodeId(index);
            assert_ne!(internal.left, internal.right);
            assert_eq!(tree.node(internal.left).unwrap().parent(), Some(id));
            assert_eq!(tree.node(internal.right).unwrap().parent(), Some(id));

            for i in subtree_particles(&tree, id) {
                assert!(node.disc().contains(particles[i].position), "Internal disc misses particle {}", i);
            }
        }
    }
}

#[test]
fn test_depth_is_logarithmic() {
    // A line of points is the worst case for a spatial (non-median) split.
    let particles: Vec<Particle> = (0..1024).map(|i| Particle::new(2.0_f64.powi(i % 40), 0.0)).collect();
    let tree = KdTree::build(&particles, 1).unwrap();
    assert_eq!(tree.depth(), 10);
}

#[test]
fn test_square_scenario() {
    let mut particles = square();
    let mut tree = KdTree::build(&particles, 1).unwrap();
    tree.compute_forces(&mut particles, 5).unwrap();

    let centroid = Vector2D::new(5.0, 5.0);
    for p in &particles {
        let outward = p.position - centroid;
        assert!(p.force.dot(&outward) > 0.0, "Force {:?} does not point away from the centroid", p.force);
        let sin_angle = p.force.cross(&outward).abs() / (p.force.length() * outward.length());
        assert!(sin_angle < 0.0175, "Force {:?} deviates more than a degree from the diagonal", p.force);
    }

    let magnitude = particles[0].force.length();
    for p in &particles {
        assert_relative_eq!(p.force.length(), magnitude, max_relative = 1e-12);
    }

    // Rotating the square by 90° about its center maps 0 -> 1 -> 3 -> 2 -> 0.
    let rotate = |v: Vector2D| Vector2D::new(-v.y, v.x);
    for (from, to) in [(0, 1), (1, 3), (3, 2), (2, 0)] {
        assert_relative_eq!(rotate(particles[from].force), particles[to].force, max_relative = 0.02);
    }

    let mut exact = square();
    direct_forces(&mut exact, &ForceLaw::default());
    for (p, e) in particles.iter().zip(&exact) {
        assert_relative_eq!(p.force, e.force, max_relative = 0.02);
    }
}

#[test]
fn test_coincident_particles() {
    for bucket_size in [1, 2] {
        let mut particles = vec![Particle::new(3.0, 3.0), Particle::new(3.0, 3.0)];
        let mut tree = KdTree::build(&particles, bucket_size).unwrap();
        tree.compute_forces(&mut particles, 5).unwrap();

        let (a, b) = (particles[0].force, particles[1].force);
        assert!(a.is_finite() && b.is_finite());
        assert_relative_eq!(a.length(), 10.0);
        assert_relative_eq!(b.length(), 10.0);
        assert_eq!(a, -b);
    }
}

#[test]
fn test_single_particle_feels_nothing() {
    let mut particles = vec![Particle::new(1.0, 2.0)];
    let mut tree = KdTree::build(&particles, 1).unwrap();
    tree.compute_forces(&mut particles, 5).unwrap();
    assert_eq!(particles[0].force, Vector2D::zero());
}

#[test]
fn test_single_leaf_matches_direct_sum() {
    let mut particles = random_particles(21, 12, 10.0);
    let mut exact = particles.clone();
    let mut tree = KdTree::build(&particles, 12).unwrap();
    tree.compute_forces(&mut particles, 3).unwrap();
    direct_forces(&mut exact, &ForceLaw::default());
    for (p, e) in particles.iter().zip(&exact) {
        assert_relative_eq!(p.force, e.force, epsilon = 1e-12, max_relative = 1e-12);
    }
    assert_eq!(tree.statistics().approximations, 0);
    assert_eq!(tree.statistics().exact_pairs, 12 * 11);
}

#[test]
fn test_forces_converge_to_direct_sum() {
    let base = random_particles(77, 400, 100.0);
    let mut exact = base.clone();
    direct_forces(&mut exact, &ForceLaw::default());

    let mut tree = KdTree::build(&base, 4).unwrap();
    let mut median_errors = Vec::new();
    for precision in [2, 20] {
        let mut particles = base.clone();
        tree.compute_forces(&mut particles, precision).unwrap();
        assert!(particles.iter().all(|p| p.force.is_finite()));
        let errors = scaled_errors(&particles, &exact);
        median_errors.push(errors[errors.len() / 2]);
    }
    assert!(median_errors[1] < median_errors[0], "Median error did not shrink: {:?}", median_errors);
    assert!(median_errors[1] < 0.02, "Median error at high precision too large: {:?}", median_errors);
    assert!(tree.statistics().approximations > 0);
}

#[test]
fn test_passes_are_deterministic_and_accumulate() {
    let mut particles = random_particles(5, 150, 30.0);
    let mut tree = KdTree::build(&particles, 5).unwrap();

    tree.compute_forces(&mut particles, 6).unwrap();
    let first: Vec<Vector2D> = particles.iter().map(|p| p.force).collect();

    reset_forces(&mut particles);
    tree.compute_forces(&mut particles, 6).unwrap();
    let second: Vec<Vector2D> = particles.iter().map(|p| p.force).collect();
    assert_eq!(first, second);

    // Without a reset the second pass adds on top of the first.
    tree.compute_forces(&mut particles, 6).unwrap();
    for (p, f) in particles.iter().zip(&first) {
        assert_relative_eq!(p.force, *f * 2.0, epsilon = 1e-12, max_relative = 1e-12);
    }
}

#[test]
fn test_precision_may_change_between_passes() {
    let mut particles = random_particles(13, 60, 20.0);
    let mut tree = KdTree::build(&particles, 4).unwrap();

    tree.compute_forces(&mut particles, 3).unwrap();
    assert_eq!(tree.coefficients(tree.root()).map(|c| c.precision()), Some(3));
    tree.compute_forces(&mut particles, 9).unwrap();
    let root = tree.coefficients(tree.root()).unwrap();
    assert_eq!(root.precision(), 9);
    assert_relative_eq!(root.coefficients()[0].re, 60.0);
}

#[test]
fn test_moved_particles_are_reexpanded() {
    let mut particles = random_particles(17, 40, 20.0);
    let mut tree = KdTree::build(&particles, 4).unwrap();
    tree.compute_forces(&mut particles, 4).unwrap();
    let before = tree.coefficients(tree.leaves()[0]).unwrap().clone();

    for p in particles.iter_mut() {
        p.position += Vector2D::new(0.01, -0.02);
        p.reset_force();
    }
    tree.compute_forces(&mut particles, 4).unwrap();
    let after = tree.coefficients(tree.leaves()[0]).unwrap();
    assert_ne!(&before, after);
    assert!(particles.iter().all(|p| p.force.is_finite()));
}

#[test]
fn test_compute_forces_rejects_bad_input() {
    let mut particles = square();
    let mut tree = KdTree::build(&particles, 1).unwrap();
    assert_eq!(tree.compute_forces(&mut particles, 0), Err(MultipoleError::InvalidPrecision(0)));

    let mut fewer = square();
    fewer.pop();
    assert_eq!(
        tree.compute_forces(&mut fewer, 5),
        Err(MultipoleError::ParticleCountMismatch { expected: 4, actual: 3 })
    );
}

#[test]
fn test_config_driven_pass() {
    let mut particles = vec![
        Particle::new(0.0, 0.0),
        Particle::new(0.5, 0.0),
        Particle::new(40.0, 40.0),
        Particle::new(41.0, 40.0),
    ];
    let config = MultipoleConfig::new(Some(2), Some(6), Some(1.0));
    let mut tree = KdTree::build_with_config(&particles, &config).unwrap();
    assert_eq!(tree.leaves().len(), 2);
    tree.compute_forces_with_config(&mut particles, &config).unwrap();

    // The close pair shares a leaf and sits inside the wider clamping radius,
    // so they push each other with magnitude 1 instead of 2.
    assert!(particles[0].force.x < -0.9 && particles[0].force.x > -1.1);
    assert!(particles[1].force.x > 0.9 && particles[1].force.x < 1.1);

    let invalid = MultipoleConfig::new(Some(0), None, None);
    assert_eq!(KdTree::build_with_config(&particles, &invalid).err(), Some(MultipoleError::InvalidBucketSize(0)));
}
