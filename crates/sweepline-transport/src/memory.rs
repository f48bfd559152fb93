//! In-process transport used by tests and embedders.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::mpsc;

use crate::{Frame, FrameSink, FrameSource, TransportError};

/// A [`FrameSource`] fed through an unbounded channel.
///
/// Dropping every sender closes the source, which then yields `Ok(None)`.
#[derive(Debug)]
pub struct MemorySource {
    rx: mpsc::UnboundedReceiver<Frame>,
}

impl MemorySource {
    /// Creates a source and the sender that feeds it.
    pub fn channel() -> (mpsc::UnboundedSender<Frame>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self { rx })
    }

    /// A source that yields `frames` in order, then closes.
    pub fn from_frames(frames: impl IntoIterator<Item = Frame>) -> Self {
        let (tx, source) = Self::channel();
        for frame in frames {
            // The receiver is alive in `source`, so this can't fail.
            let _ = tx.send(frame);
        }
        source
    }
}

impl FrameSource for MemorySource {
    async fn recv(&mut self) -> Result<Option<Frame>, TransportError> {
        Ok(self.rx.recv().await)
    }
}

/// A [`FrameSink`] that records every frame it is given.
///
/// Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    sent: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything sent so far, oldest first.
    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.frames().clone()
    }

    /// Removes and returns everything sent so far.
    pub fn take(&self) -> Vec<Vec<u8>> {
        std::mem::take(&mut *self.frames())
    }

    fn frames(&self) -> MutexGuard<'_, Vec<Vec<u8>>> {
        self.sent.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl FrameSink for MemorySink {
    fn send(&self, frame: Vec<u8>) -> Result<(), TransportError> {
        self.frames().push(frame);
        Ok(())
    }
}
