//! Arena storage for one context's span tree.

use std::time::Duration;

use crate::DEFAULT_THRESHOLD;
use crate::span::{SpanId, SpanRecord};

/// Arena of spans forming one tree (or, transiently, a forest of one tree
/// plus orphaned records from a discarded predecessor - never observable
/// from the outside).
///
/// Spans are addressed by [`SpanId`] index. Records are never removed
/// individually; the whole arena is dropped when the context is cleared or
/// a fresh tree replaces a completed one.
#[derive(Clone, Debug, Default)]
pub(crate) struct SpanTree {
    spans: Vec<SpanRecord>,
}

impl SpanTree {
    pub(crate) fn new() -> Self {
        Self { spans: Vec::new() }
    }

    pub(crate) fn get(&self, id: SpanId) -> &SpanRecord {
        self.spans
            .get(id.0)
            .expect("span ids are only issued by this tree and spans are never removed")
    }

    pub(crate) fn get_mut(&mut self, id: SpanId) -> &mut SpanRecord {
        self.spans
            .get_mut(id.0)
            .expect("span ids are only issued by this tree and spans are never removed")
    }

    /// Allocates a new open span under `parent` (or as a root when `parent`
    /// is `None`), stamped with the given start time.
    ///
    /// The display threshold is inherited from the parent unless an explicit
    /// threshold is given; roots without an explicit threshold use
    /// [`DEFAULT_THRESHOLD`].
    pub(crate) fn add_child(
        &mut self,
        name: String,
        identity: String,
        parent: Option<SpanId>,
        threshold: Option<Duration>,
        started_at: Duration,
    ) -> SpanId {
        let threshold = threshold.unwrap_or_else(|| {
            parent.map_or(DEFAULT_THRESHOLD, |parent| self.get(parent).threshold)
        });

        let id = SpanId(self.spans.len());

        self.spans.push(SpanRecord {
            name,
            identity,
            threshold,
            started_at,
            stopped_at: None,
            failure: None,
            parent,
            children: Vec::new(),
        });

        if let Some(parent) = parent {
            self.get_mut(parent).children.push(id);
        }

        id
    }

    /// Walks up the parent links starting from `from` (inclusive) and returns
    /// the first span whose name matches.
    pub(crate) fn find_ancestor_by_name(&self, from: SpanId, name: &str) -> Option<SpanId> {
        let mut ancestor = Some(from);

        while let Some(id) = ancestor {
            if self.get(id).name == name {
                return Some(id);
            }

            ancestor = self.get(id).parent;
        }

        None
    }

    /// Walks up the parent links from `from` to the root of its tree.
    pub(crate) fn find_root(&self, from: SpanId) -> SpanId {
        let mut current = from;

        while let Some(parent) = self.get(current).parent {
            current = parent;
        }

        current
    }

    pub(crate) fn clear(&mut self) {
        self.spans.clear();
    }
}
