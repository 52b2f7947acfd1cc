mod vector_2d;
mod complex;
mod particle;

pub use vector_2d::*;
pub use complex::*;
pub use particle::*;
