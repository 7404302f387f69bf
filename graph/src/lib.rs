pub mod config;
pub mod core;
pub mod divergence;
pub mod engine;
pub mod error;
pub mod highlight;
pub mod ingest;
pub mod layout;
pub mod reach;
pub mod render;
pub mod topology;

pub use config::EngineConfig;
pub use core::{Commit, Edge, EdgeKind, GraphView, HashIndex, NormalizedGraph, Point};
pub use divergence::{Direction, Transfer, TransferCommit};
pub use engine::{GraphEngine, RenderedGraph, RenderedView};
pub use error::{GraphError, Result};
pub use highlight::{Highlight, HighlightKind, HighlightState, MergeOutcome, MergeRequest};
pub use layout::{Position, PositionMap};
pub use render::{BranchLabel, LineSegments};
pub use topology::Attribution;
