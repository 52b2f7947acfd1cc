// demos/square_layout.rs

use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rs_multipole::kdtree::KdTree;
use rs_multipole::models::{reset_forces, Particle};
use rs_multipole::multipole::{direct_forces, ForceLaw};
use rs_multipole::utils::{MultipoleConfig, MultipoleError};

fn main() -> Result<(), MultipoleError> {
    env_logger::init();

    // Four corners of a square, one particle per leaf.
    let mut square = vec![
        Particle::new(0.0, 0.0),
        Particle::new(10.0, 0.0),
        Particle::new(0.0, 10.0),
        Particle::new(10.0, 10.0),
    ];
    let mut tree = KdTree::build(&square, 1)?;
    tree.compute_forces(&mut square, 5)?;

    println!("Square, precision 5:");
    for p in &square {
        println!("  particle at {:?} -> force ({:.6}, {:.6})", p.position, p.force.x, p.force.y);
    }

    // A random cloud, approximated at several precisions against the exact sum.
    let config = MultipoleConfig::default();
    let mut rng = StdRng::seed_from_u64(42);
    let mut cloud: Vec<Particle> = (0..2000)
        .map(|_| Particle::new(rng.gen_range(0.0..500.0), rng.gen_range(0.0..500.0)))
        .collect();
    let mut exact = cloud.clone();
    direct_forces(&mut exact, &ForceLaw::new(config.near_field_threshold)?);

    let mut tree = KdTree::build_with_config(&cloud, &config)?;
    info!("Cloud tree has {} nodes and depth {}", tree.len(), tree.depth());

    println!("\nRandom cloud of {} particles:", cloud.len());
    for precision in [2, 5, 10, 20] {
        reset_forces(&mut cloud);
        tree.compute_forces(&mut cloud, precision)?;
        let error: f64 = cloud.iter().zip(&exact).map(|(a, b)| (a.force - b.force).length()).sum();
        let total: f64 = exact.iter().map(|p| p.force.length()).sum();
        let stats = tree.statistics();
        println!(
            "  precision {:>2}: relative error {:.3e}, {} approximations, {} exact pairs",
            precision,
            error / total,
            stats.approximations,
            stats.exact_pairs
        );
    }

    Ok(())
}
