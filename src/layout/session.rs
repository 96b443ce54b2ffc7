//! Generation-tagged layout results.
//!
//! Every layout request takes a [`LayoutTicket`] first. Results are installed
//! through [`LayoutSession::commit`], which drops any result older than the
//! newest ticket or the layout already installed, so a slow pass can never
//! overwrite a newer one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use super::{Layout, LayoutEngine, LayoutError, compute_layout};
use crate::config::LayoutConfig;
use crate::ir::Graph;
use crate::theme::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayoutTicket {
    generation: u64,
}

impl LayoutTicket {
    pub fn generation(self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Installed,
    /// A newer ticket was issued or a newer layout is already installed.
    Stale { latest: u64 },
}

#[derive(Debug, Default)]
pub struct LayoutSession {
    issued: AtomicU64,
    current: Mutex<Option<Arc<Layout>>>,
}

impl LayoutSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new request. Any ticket handed out earlier becomes stale.
    pub fn begin(&self) -> LayoutTicket {
        let generation = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        LayoutTicket { generation }
    }

    pub fn latest_generation(&self) -> u64 {
        self.issued.load(Ordering::SeqCst)
    }

    pub fn is_current(&self, ticket: LayoutTicket) -> bool {
        ticket.generation == self.latest_generation()
    }

    pub fn commit(&self, ticket: LayoutTicket, mut layout: Layout) -> CommitOutcome {
        let mut current = match self.current.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let latest = self.latest_generation();
        let installed = current.as_ref().map_or(0, |layout| layout.generation);
        if ticket.generation != latest || ticket.generation <= installed {
            tracing::warn!(
                generation = ticket.generation,
                latest,
                installed,
                "discarding stale layout result"
            );
            return CommitOutcome::Stale { latest };
        }
        layout.generation = ticket.generation;
        *current = Some(Arc::new(layout));
        tracing::debug!(generation = ticket.generation, "layout installed");
        CommitOutcome::Installed
    }

    pub fn current(&self) -> Option<Arc<Layout>> {
        match self.current.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Takes a ticket, lays `graph` out and commits the result.
    pub fn relayout(
        &self,
        graph: &Graph,
        engine: &dyn LayoutEngine,
        theme: &Theme,
        config: &LayoutConfig,
    ) -> Result<CommitOutcome, LayoutError> {
        let ticket = self.begin();
        let layout = compute_layout(graph, engine, theme, config)?;
        Ok(self.commit(ticket, layout))
    }
}
