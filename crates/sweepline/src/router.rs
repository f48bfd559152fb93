//! Inbound frame dispatch.
//!
//! A frame is decoded in full before the store is touched. If decoding
//! fails nothing is applied; if it succeeds the matching handler runs to
//! completion inside a single [`StateStore::apply`].

use sweepline_protocol::{ProtocolError, Reader, ServerMessage, ServerOpcode};
use sweepline_state::StateStore;
use tracing::debug;

use crate::handlers;

/// What happened to one inbound frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Routed {
    /// Empty frame or an opcode this client doesn't know.
    Ignored,
    /// Decoded and handed to its handler.
    Applied {
        opcode: ServerOpcode,
        /// Whether the document changed.
        changed: bool,
    },
}

impl Routed {
    pub fn changed(&self) -> bool {
        matches!(self, Self::Applied { changed: true, .. })
    }
}

/// Decodes `frame` and applies it to `store`.
///
/// # Errors
/// Any [`ProtocolError`] from decoding. The store is untouched in that
/// case.
pub fn route(store: &mut StateStore, frame: &[u8]) -> Result<Routed, ProtocolError> {
    let Some((&op, body)) = frame.split_first() else {
        debug!("ignoring empty frame");
        return Ok(Routed::Ignored);
    };
    let Some(opcode) = ServerOpcode::from_byte(op) else {
        debug!(opcode = op, "ignoring unknown opcode");
        return Ok(Routed::Ignored);
    };

    let mut reader = Reader::new(body);
    let msg = ServerMessage::read_body(opcode, &mut reader)?;
    if reader.remaining() > 0 {
        debug!(?opcode, trailing = reader.remaining(), "frame longer than its body");
    }

    let changed = store.apply(|doc| handlers::apply(doc, msg));
    Ok(Routed::Applied { opcode, changed })
}
