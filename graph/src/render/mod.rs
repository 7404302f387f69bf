pub mod edges;
pub mod labels;

pub use edges::{EdgeSynthesizer, LineSegments};
pub use labels::{assign_colors, coincides_with_main, resolve_labels, BranchColors, BranchLabel};
