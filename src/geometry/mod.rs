mod disc;
mod minimum_enclosing_disc;

pub use disc::*;
pub use minimum_enclosing_disc::*;
