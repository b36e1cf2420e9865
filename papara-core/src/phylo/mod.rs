pub mod newick;
pub mod tree;

pub use newick::parse_newick;
pub use tree::{Edge, PhyloNode, PhyloTree};
