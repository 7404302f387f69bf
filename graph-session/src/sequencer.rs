use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies one fetch; later fetches get larger tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Hands out fetch tokens so a slow response can't overwrite a newer one.
#[derive(Debug, Default)]
pub struct FetchSequencer {
    latest: AtomicU64,
}

impl FetchSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> RequestToken {
        RequestToken(self.latest.fetch_add(1, Ordering::AcqRel) + 1)
    }

    /// Whether `token` belongs to the newest fetch issued
    pub fn is_current(&self, token: RequestToken) -> bool {
        token.0 == self.latest.load(Ordering::Acquire)
    }
}
