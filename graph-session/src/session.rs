//! Caller-side state around the pure engine for one repository.
//!
//! Fetches are asynchronous and owned by someone else; the session only sees
//! "a fetch started" and "a fetch finished with this payload". Every start
//! issues a [`RequestToken`], and a finished fetch is applied only when its
//! token is still the newest, so a slow response never replaces a fresher one.

use crate::cache::GraphCache;
use crate::error::Result;
use crate::events::RefreshEvent;
use crate::gate::{MutationGate, MutationPermit};
use crate::sequencer::{FetchSequencer, RequestToken};
use crate::timer::HighlightTimer;
use graph::{
    Direction, EngineConfig, GraphEngine, HighlightState, MergeOutcome, MergeRequest, NormalizedGraph,
    RenderedGraph, Transfer,
};
use serde_json::Value;
use std::fmt::Display;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

pub struct GraphSession {
    repository: String,
    engine: GraphEngine,
    sequencer: FetchSequencer,
    gate: MutationGate,
    cache: GraphCache,
    timer: HighlightTimer,
    graph: Option<NormalizedGraph>,
    merge_fetch: Option<RequestToken>,
}

impl GraphSession {
    pub fn new(repository: impl Into<String>, config: EngineConfig, gate: MutationGate) -> Self {
        Self {
            repository: repository.into(),
            engine: GraphEngine::new(config),
            sequencer: FetchSequencer::new(),
            gate,
            cache: GraphCache::new(),
            timer: HighlightTimer::new(),
            graph: None,
            merge_fetch: None,
        }
    }

    pub fn repository(&self) -> &str {
        &self.repository
    }

    pub fn graph(&self) -> Option<&NormalizedGraph> {
        self.graph.as_ref()
    }

    /// A fetch is about to start because of `event`
    pub fn begin_fetch(&mut self, event: &RefreshEvent) -> RequestToken {
        let token = self.sequencer.issue();
        if let RefreshEvent::RepositoryChanged(repository) = event {
            self.repository = repository.clone();
        }
        self.merge_fetch = event.keeps_highlight().then_some(token);
        debug!(token = token.value(), event = event.label(), "graph fetch started");
        token
    }

    /// Apply a finished fetch; returns `None` when a newer fetch has started since
    pub fn complete_fetch(&mut self, token: RequestToken, raw: &Value) -> Result<Option<Arc<RenderedGraph>>> {
        if !self.sequencer.is_current(token) {
            debug!(token = token.value(), "stale graph fetch dropped");
            return Ok(None);
        }

        let graph = graph::ingest::normalize(raw, self.engine.config())?;
        if self.merge_fetch.take() != Some(token) {
            self.timer.clear();
        }
        self.graph = Some(graph);
        self.rendered()
    }

    /// A fetch failed upstream: no input, no output
    pub fn fail_fetch(&mut self, token: RequestToken, error: impl Display) {
        if !self.sequencer.is_current(token) {
            return;
        }
        warn!(repository = %self.repository, %error, "graph fetch failed");
        self.merge_fetch = None;
        self.graph = None;
        self.cache.invalidate();
        self.timer.clear();
    }

    /// Claim the repository for a merge, reset, push or pull
    pub fn begin_mutation(&self) -> Result<MutationPermit> {
        self.gate.try_acquire(&self.repository)
    }

    /// Record the backend's answer to a merge request and start its highlight.
    ///
    /// Must be called from inside a tokio runtime.
    pub fn record_merge(&mut self, request: &MergeRequest, outcome: &MergeOutcome) -> Option<HighlightState> {
        let ttl = self.engine.config().highlight_ttl();
        let state = self.timer.start(request, outcome, ttl);
        match &state {
            Some(state) => info!(
                source = %state.source,
                target = %state.target,
                fast_forward = state.fast_forward,
                "merge applied"
            ),
            None => info!(source = %request.source_branch, target = %request.target_branch, "merge conflicted"),
        }
        state
    }

    pub fn highlight(&self) -> Option<HighlightState> {
        self.timer.current()
    }

    pub fn highlight_changes(&self) -> watch::Receiver<Option<HighlightState>> {
        self.timer.subscribe()
    }

    /// Render the current graph with the live highlight, reusing the last
    /// render while neither has changed
    pub fn rendered(&mut self) -> Result<Option<Arc<RenderedGraph>>> {
        let Some(graph) = &self.graph else {
            return Ok(None);
        };
        let highlight = self.timer.current();
        let engine = &self.engine;
        let rendered = self
            .cache
            .get_or_render(graph, highlight.as_ref(), |g, h| engine.render(g, h))?;
        Ok(Some(rendered))
    }

    pub fn transfer(&self, branch: &str, direction: Direction) -> Option<Transfer> {
        self.graph
            .as_ref()
            .map(|graph| self.engine.transfer(graph, branch, direction))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn payload(head: &str) -> Value {
        json!({
            "commits": [
                { "hash": "c2", "parents": ["c1"], "branches": ["main"] },
                { "hash": "c1", "parents": [], "branches": ["main"] }
            ],
            "branchHeads": { "main": head }
        })
    }

    fn session() -> GraphSession {
        GraphSession::new("repo", EngineConfig::default(), MutationGate::new())
    }

    fn merged() -> MergeOutcome {
        MergeOutcome {
            fast_forward: false,
            merge_commit_hash: Some("c2".into()),
            has_conflict: false,
        }
    }

    #[test]
    fn test_stale_fetch_is_dropped() {
        let mut session = session();
        let slow = session.begin_fetch(&RefreshEvent::GraphDirty);
        let fast = session.begin_fetch(&RefreshEvent::GraphDirty);

        let rendered = session.complete_fetch(fast, &payload("c2")).unwrap().unwrap();
        assert_eq!(rendered.local.positions.len(), 2);

        assert!(session.complete_fetch(slow, &payload("c1")).unwrap().is_none());
        assert_eq!(session.rendered().unwrap().unwrap().local.positions.len(), 2);
    }

    #[test]
    fn test_unchanged_inputs_reuse_render() {
        let mut session = session();
        let token = session.begin_fetch(&RefreshEvent::RepositoryChanged("repo".into()));
        let first = session.complete_fetch(token, &payload("c2")).unwrap().unwrap();
        let second = session.rendered().unwrap().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_failed_fetch_empties_views() {
        let mut session = session();
        let token = session.begin_fetch(&RefreshEvent::GraphDirty);
        session.complete_fetch(token, &payload("c2")).unwrap();

        let token = session.begin_fetch(&RefreshEvent::GraphDirty);
        session.fail_fetch(token, "connection reset");
        assert!(session.graph().is_none());
        assert!(session.rendered().unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_merge_refetch_keeps_highlight_but_other_refreshes_clear_it() {
        let mut session = session();
        let token = session.begin_fetch(&RefreshEvent::GraphDirty);
        session.complete_fetch(token, &payload("c1")).unwrap();

        let _permit = session.begin_mutation().unwrap();
        assert!(session.begin_mutation().is_err());
        session.record_merge(&MergeRequest::new("feature", "main"), &merged());

        let token = session.begin_fetch(&RefreshEvent::MergeApplied);
        let rendered = session.complete_fetch(token, &payload("c2")).unwrap().unwrap();
        assert!(rendered.local.line_segments["c1->c2"].recent);

        let token = session.begin_fetch(&RefreshEvent::GraphDirty);
        let rendered = session.complete_fetch(token, &payload("c2")).unwrap().unwrap();
        assert!(session.highlight().is_none());
        assert!(!rendered.local.line_segments["c1->c2"].recent);
    }

    #[test]
    fn test_transfer_needs_a_graph() {
        let mut session = session();
        assert!(session.transfer("main", Direction::Push).is_none());

        let token = session.begin_fetch(&RefreshEvent::GraphDirty);
        session.complete_fetch(token, &payload("c2")).unwrap();
        // remote has no heads, so everything is missing there
        let transfer = session.transfer("main", Direction::Push).unwrap();
        assert_eq!(transfer.commits.len(), 2);
    }
}
