//! Multipole-accelerated repulsive forces for force-directed layout.
//!
//! Particles are partitioned by a balanced kd-tree whose nodes carry the
//! minimum enclosing disc of their particles. Each force pass expands every
//! node into a truncated multipole series and lets every leaf either use a
//! well separated node's expansion or fall back to exact pairwise sums.
pub mod utils;
pub mod models;
pub mod geometry;
pub mod multipole;
pub mod kdtree;
