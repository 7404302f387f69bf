pub mod cache;
pub mod error;
pub mod events;
pub mod gate;
pub mod sequencer;
pub mod session;
pub mod timer;

pub use cache::{fingerprint, GraphCache};
pub use error::{Result, SessionError};
pub use events::RefreshEvent;
pub use gate::{MutationGate, MutationPermit};
pub use sequencer::{FetchSequencer, RequestToken};
pub use session::GraphSession;
pub use timer::HighlightTimer;
