//! Short-lived overlay marking what the most recent merge touched.
//!
//! The state machine is `Idle -> Highlighting { expires_at } -> Idle`. A new merge
//! replaces whatever is live, a graph refresh clears it, and time expires it.
//! Time is always passed in, so the machine stays deterministic.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Branches named by the caller when it asks for a merge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeRequest {
    pub source_branch: String,
    pub target_branch: String,
}

impl MergeRequest {
    pub fn new(source_branch: impl Into<String>, target_branch: impl Into<String>) -> Self {
        Self {
            source_branch: source_branch.into(),
            target_branch: target_branch.into(),
        }
    }
}

/// What the backend reports after performing a merge
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeOutcome {
    #[serde(default)]
    pub fast_forward: bool,
    #[serde(default)]
    pub merge_commit_hash: Option<String>,
    #[serde(default)]
    pub has_conflict: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HighlightKind {
    Merge,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightState {
    #[serde(rename = "type")]
    pub kind: HighlightKind,
    pub source: String,
    pub target: String,
    pub commit_hash: Option<String>,
    pub fast_forward: bool,
    pub at: DateTime<Utc>,
}

impl HighlightState {
    /// Highlight for a finished merge; a conflicted merge produces none
    pub fn from_merge(request: &MergeRequest, outcome: &MergeOutcome, at: DateTime<Utc>) -> Option<Self> {
        if outcome.has_conflict {
            return None;
        }
        Some(Self {
            kind: HighlightKind::Merge,
            source: request.source_branch.clone(),
            target: request.target_branch.clone(),
            commit_hash: outcome
                .merge_commit_hash
                .clone()
                .filter(|hash| !hash.is_empty()),
            fast_forward: outcome.fast_forward,
            at,
        })
    }

    pub fn is_merge(&self) -> bool {
        self.kind == HighlightKind::Merge
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Highlight {
    #[default]
    Idle,
    Highlighting {
        state: HighlightState,
        expires_at: DateTime<Utc>,
    },
}

impl Highlight {
    /// Replace any live highlight with the result of a new merge
    pub fn apply_merge(
        &mut self,
        request: &MergeRequest,
        outcome: &MergeOutcome,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Option<&HighlightState> {
        *self = match HighlightState::from_merge(request, outcome, now) {
            Some(state) => {
                debug!(source = %state.source, target = %state.target, "merge highlight started");
                Highlight::Highlighting {
                    state,
                    expires_at: now + ttl,
                }
            }
            None => Highlight::Idle,
        };
        self.state()
    }

    /// Drop the highlight, as a graph refresh does
    pub fn clear(&mut self) {
        *self = Highlight::Idle;
    }

    /// Move to `Idle` if the highlight has run out; returns whether it did
    pub fn expire(&mut self, now: DateTime<Utc>) -> bool {
        match self {
            Highlight::Highlighting { expires_at, .. } if now >= *expires_at => {
                *self = Highlight::Idle;
                true
            }
            _ => false,
        }
    }

    /// The live highlight at `now`
    pub fn current(&self, now: DateTime<Utc>) -> Option<&HighlightState> {
        match self {
            Highlight::Highlighting { state, expires_at } if now < *expires_at => Some(state),
            _ => None,
        }
    }

    /// The highlight regardless of expiry
    pub fn state(&self) -> Option<&HighlightState> {
        match self {
            Highlight::Highlighting { state, .. } => Some(state),
            Highlight::Idle => None,
        }
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Highlight::Highlighting { expires_at, .. } => Some(*expires_at),
            Highlight::Idle => None,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Highlight::Idle)
    }
}
