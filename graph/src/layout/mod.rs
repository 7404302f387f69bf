pub mod builder;
pub mod position;

pub use builder::{Columns, Layout, LayoutEngine};
pub use position::{Position, PositionMap};
