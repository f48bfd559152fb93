//! The client context object and its builder.
//!
//! A [`Client`] owns the three things the core needs: the [`StateStore`],
//! the outbound [`FrameSink`], and an [`IdentityStore`] for rejoining. It
//! is constructed explicitly and passed around, so tests can drive it with
//! in-memory fakes.
//!
//! ```text
//!   FrameSource ──→ Client::run ──→ router::route ──→ StateStore ──→ watch::Receiver
//!                                                                      (UI)
//!   UI intent ──→ Client::send ──→ ClientMessage::encode ──→ FrameSink
//! ```

use std::sync::Arc;
use std::time::Duration;

use sweepline_protocol::{ClientMessage, Color, JoinRequest, ServerOpcode, SettingsPatch};
use sweepline_session::{IdentityStore, MemoryIdentityStore, RememberedIdentity};
use sweepline_state::{Document, Snapshot, StateStore};
use sweepline_transport::{Frame, FrameSink, FrameSource, WebSocketSink, WebSocketSource};
use tokio::sync::watch;
use tracing::{debug, info, trace, warn};

use crate::router::{self, Routed};
use crate::SweeplineError;

// ---------------------------------------------------------------------------
// ClientConfig
// ---------------------------------------------------------------------------

/// Settings for a client connection.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// WebSocket URL of the game server.
    pub url: String,

    /// Name sent on JOIN when there is no remembered identity.
    pub name: String,

    /// Colour sent on JOIN when there is no remembered identity.
    pub color: Color,

    /// Whether to join as a participant rather than a watcher.
    pub alive: bool,

    /// How long [`Client::run`] waits for a frame before giving up.
    /// `None` waits forever.
    pub recv_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: "ws://127.0.0.1:8080".to_string(),
            name: "Player".to_string(),
            color: Color::new(0x3b, 0x82, 0xf6),
            alive: true,
            recv_timeout: None,
        }
    }
}

// ---------------------------------------------------------------------------
// ClientBuilder
// ---------------------------------------------------------------------------

/// Builder for a [`Client`].
///
/// # Example
///
/// ```rust,ignore
/// use sweepline::prelude::*;
///
/// let (mut client, source) = Client::builder()
///     .url("ws://localhost:8080")
///     .name("Bob")
///     .connect()
///     .await?;
/// client.join()?;
/// client.run(source).await
/// ```
pub struct ClientBuilder {
    config: ClientConfig,
    identity: Option<Arc<dyn IdentityStore>>,
}

impl ClientBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
            identity: None,
        }
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    pub fn url(mut self, url: &str) -> Self {
        self.config.url = url.to_string();
        self
    }

    pub fn name(mut self, name: &str) -> Self {
        self.config.name = name.to_string();
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.config.color = color;
        self
    }

    pub fn recv_timeout(mut self, timeout: Duration) -> Self {
        self.config.recv_timeout = Some(timeout);
        self
    }

    /// Where the remembered identity is loaded from and saved to.
    /// Defaults to an empty [`MemoryIdentityStore`].
    pub fn identity(mut self, store: Arc<dyn IdentityStore>) -> Self {
        self.identity = Some(store);
        self
    }

    /// Builds a client that sends through `sink`.
    pub fn build<S: FrameSink>(self, sink: S) -> Client<S> {
        Client {
            config: self.config,
            store: StateStore::default(),
            sink,
            identity: self
                .identity
                .unwrap_or_else(|| Arc::new(MemoryIdentityStore::new())),
        }
    }

    /// Connects to the configured URL over WebSocket.
    ///
    /// Returns the client (already marked connected) and the inbound half
    /// to pass to [`Client::run`].
    pub async fn connect(self) -> Result<(Client<WebSocketSink>, WebSocketSource), SweeplineError> {
        let (sink, source) = sweepline_transport::connect(&self.config.url).await?;
        let mut client = self.build(sink);
        client.on_open();
        Ok((client, source))
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// A connected (or connecting) Sweepline client.
pub struct Client<S: FrameSink> {
    config: ClientConfig,
    store: StateStore,
    sink: S,
    identity: Arc<dyn IdentityStore>,
}

impl<S: FrameSink> Client<S> {
    /// Creates a new builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The current document. Borrowed; use [`snapshot`](Self::snapshot)
    /// to keep it.
    pub fn document(&self) -> &Document {
        self.store.document()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.store.snapshot()
    }

    /// A receiver that is notified after every change.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.store.subscribe()
    }

    // -- inbound ------------------------------------------------------------

    /// Routes one inbound frame. Text frames are dropped.
    ///
    /// After a resync the remembered identity is refreshed.
    pub fn handle_frame(&mut self, frame: Frame) -> Result<Routed, SweeplineError> {
        let data = match frame {
            Frame::Binary(data) => data,
            Frame::Text(text) => {
                debug!(len = text.len(), "dropping text frame");
                return Ok(Routed::Ignored);
            }
        };

        let routed = router::route(&mut self.store, &data)?;
        if let Routed::Applied {
            opcode: ServerOpcode::LobbyState,
            ..
        } = routed
        {
            self.remember_identity();
        }
        Ok(routed)
    }

    /// Pulls frames from `source` until it closes.
    ///
    /// A frame that fails to decode is logged and dropped; the frames
    /// after it are still applied. A clean close returns `Ok(())`.
    ///
    /// # Errors
    /// [`SweeplineError::Transport`] if the source fails, or
    /// [`SweeplineError::Timeout`] if `recv_timeout` elapses.
    pub async fn run<F: FrameSource>(&mut self, mut source: F) -> Result<(), SweeplineError> {
        loop {
            let next = match self.config.recv_timeout {
                Some(limit) => match tokio::time::timeout(limit, source.recv()).await {
                    Ok(next) => next,
                    Err(_) => {
                        self.on_error("receive timed out");
                        return Err(SweeplineError::Timeout(limit));
                    }
                },
                None => source.recv().await,
            };

            match next {
                Ok(Some(frame)) => {
                    if let Err(e) = self.handle_frame(frame) {
                        warn!(error = %e, "dropping frame that failed to decode");
                    }
                }
                Ok(None) => {
                    info!("connection closed");
                    self.on_error("connection closed");
                    return Ok(());
                }
                Err(e) => {
                    self.on_error(e.to_string());
                    return Err(e.into());
                }
            }
        }
    }

    // -- outbound -----------------------------------------------------------

    /// Encodes and sends one message. Fire-and-forget.
    pub fn send(&self, msg: &ClientMessage) -> Result<(), SweeplineError> {
        let frame = msg.encode()?;
        trace!(opcode = ?msg.opcode(), len = frame.len(), "sending");
        self.sink.send(frame)?;
        Ok(())
    }

    /// Sends one SETTINGS_UPDATE per field set in `patch`.
    ///
    /// Every frame is encoded before the first is sent. Returns how many
    /// were sent.
    pub fn update_settings(&self, patch: SettingsPatch) -> Result<usize, SweeplineError> {
        let frames = ClientMessage::settings(patch)?
            .iter()
            .map(ClientMessage::encode)
            .collect::<Result<Vec<_>, _>>()?;
        let count = frames.len();
        for frame in frames {
            self.sink.send(frame)?;
        }
        Ok(count)
    }

    /// Sends JOIN, asking for the remembered seat if there is one.
    ///
    /// Returns the request that was sent.
    pub fn join(&self) -> Result<JoinRequest, SweeplineError> {
        let remembered = match self.identity.load() {
            Ok(remembered) => remembered,
            Err(e) => {
                warn!(error = %e, "cannot load remembered identity, joining fresh");
                None
            }
        };

        let request = match remembered {
            Some(identity) => JoinRequest {
                rejoin_id: Some(identity.id),
                rejoin_team_id: identity.team_id,
                color: identity.color,
                alive: self.config.alive,
                name: identity.name,
            },
            None => JoinRequest {
                rejoin_id: None,
                rejoin_team_id: None,
                color: self.config.color,
                alive: self.config.alive,
                name: self.config.name.clone(),
            },
        };

        info!(rejoin = ?request.rejoin_id, name = %request.name, "joining");
        self.send(&ClientMessage::Join(request.clone()))?;
        Ok(request)
    }

    /// Drops the remembered identity, so the next [`join`](Self::join)
    /// asks for a fresh seat.
    pub fn forget_identity(&self) -> Result<(), SweeplineError> {
        self.identity.clear()?;
        info!("remembered identity cleared");
        Ok(())
    }

    // -- connection status --------------------------------------------------

    /// Records that the transport opened.
    pub fn on_open(&mut self) {
        self.store.apply(|doc| {
            doc.connection.opened();
            true
        });
    }

    /// Records a transport failure.
    pub fn on_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.store.apply(|doc| {
            doc.connection.failed(message);
            true
        });
    }

    fn remember_identity(&self) {
        let Some(me) = self.store.document().self_player() else {
            debug!("resync did not include our own player");
            return;
        };
        let identity = RememberedIdentity {
            id: me.id,
            color: me.color,
            name: me.name.clone(),
            team_id: me.team_id,
        };
        if let Err(e) = self.identity.save(&identity) {
            warn!(player_id = %identity.id, error = %e, "cannot save remembered identity");
        }
    }
}
