mod coefficients;
mod force_law;

pub use coefficients::*;
pub use force_law::*;
