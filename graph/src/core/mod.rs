pub mod node;
pub mod edge;
pub mod index;
pub mod view;

pub use node::{short_hash_of, Commit, Parents, SHORT_HASH_LEN};
pub use edge::{edge_key, Edge, EdgeKind, Point};
pub use index::{HashIndex, MIN_PREFIX_LEN};
pub use view::{BranchHeads, ForkPoints, GraphView, NormalizedGraph, ViewStats};
