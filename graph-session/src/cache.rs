use crate::error::Result;
use graph::{HighlightState, NormalizedGraph, RenderedGraph};
use std::sync::Arc;
use tracing::trace;

const FNV_OFFSET: u64 = 1469598103934665603;
const FNV_PRIME: u64 = 1099511628211;

/// Content fingerprint of a render's inputs (FNV-1a over their JSON encoding)
pub fn fingerprint(graph: &NormalizedGraph, highlight: Option<&HighlightState>) -> Result<u64> {
    let bytes = serde_json::to_vec(&(graph, highlight))?;
    let mut hash = FNV_OFFSET;
    for b in &bytes {
        hash ^= *b as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    Ok(hash)
}

/// Remembers the last render and hands it back while the inputs are unchanged
#[derive(Debug, Default)]
pub struct GraphCache {
    last: Option<(u64, Arc<RenderedGraph>)>,
    hits: u64,
    misses: u64,
}

impl GraphCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_render<F>(
        &mut self,
        graph: &NormalizedGraph,
        highlight: Option<&HighlightState>,
        render: F,
    ) -> Result<Arc<RenderedGraph>>
    where
        F: FnOnce(&NormalizedGraph, Option<&HighlightState>) -> RenderedGraph,
    {
        let key = fingerprint(graph, highlight)?;
        if let Some((cached, rendered)) = &self.last {
            if *cached == key {
                self.hits += 1;
                trace!(key, "render cache hit");
                return Ok(Arc::clone(rendered));
            }
        }

        self.misses += 1;
        let rendered = Arc::new(render(graph, highlight));
        self.last = Some((key, Arc::clone(&rendered)));
        Ok(rendered)
    }

    pub fn invalidate(&mut self) {
        self.last = None;
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }
}
