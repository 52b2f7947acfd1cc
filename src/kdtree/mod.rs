mod node;
mod split_queue;
mod kd_tree;

pub use node::*;
pub use split_queue::*;
pub use kd_tree::*;

#[cfg(test)]
mod kd_tree_tests;
