//! The single owner of the [`Document`].
//!
//! Writers go through [`StateStore::apply`]; readers hold [`Snapshot`]s.
//! A snapshot is an `Arc` to a document that is never mutated again, so a
//! reader either sees the state before a handler ran or after it, never
//! halfway.
//!
//! ```text
//!   apply(f) ──→ Arc::make_mut(doc) ──→ f(&mut doc) ──→ version += 1
//!                    │                                     │
//!                    └─ clones only if a snapshot          └─ watch::send_replace
//!                       still points at the old doc
//! ```

use std::sync::Arc;

use tokio::sync::watch;
use tracing::trace;

use crate::model::Document;

/// An immutable view of the document at one version.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Bumped once per applied change. Starts at 0.
    pub version: u64,
    pub document: Arc<Document>,
}

impl std::ops::Deref for Snapshot {
    type Target = Document;

    fn deref(&self) -> &Document {
        &self.document
    }
}

/// Copy-on-write document store with a snapshot channel.
#[derive(Debug)]
pub struct StateStore {
    document: Arc<Document>,
    version: u64,
    publisher: watch::Sender<Snapshot>,
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new(Document::default())
    }
}

impl StateStore {
    pub fn new(document: Document) -> Self {
        let document = Arc::new(document);
        let (publisher, _) = watch::channel(Snapshot {
            version: 0,
            document: Arc::clone(&document),
        });
        Self {
            document,
            version: 0,
            publisher,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            version: self.version,
            document: Arc::clone(&self.document),
        }
    }

    /// A receiver that always holds the latest published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.publisher.subscribe()
    }

    /// Runs `mutate` against the document.
    ///
    /// `mutate` reports whether it changed anything. Only then is the
    /// version bumped and a snapshot published. A mutator that returns
    /// `false` must not have written.
    pub fn apply<F>(&mut self, mutate: F) -> bool
    where
        F: FnOnce(&mut Document) -> bool,
    {
        let changed = mutate(Arc::make_mut(&mut self.document));
        if changed {
            self.version += 1;
            trace!(version = self.version, "document changed");
            self.publisher.send_replace(self.snapshot());
        }
        changed
    }
}
