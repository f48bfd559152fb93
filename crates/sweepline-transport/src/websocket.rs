//! WebSocket client transport using `tokio-tungstenite`.

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use crate::{Frame, FrameSink, FrameSource, TransportError};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Opens a WebSocket connection to `url` and splits it into halves.
///
/// Outbound frames are queued on an unbounded channel and written by a
/// background task, so [`WebSocketSink::send`] never waits on the network.
/// Dropping the sink closes the connection once the queue drains.
pub async fn connect(url: &str) -> Result<(WebSocketSink, WebSocketSource), TransportError> {
    let (ws, _response) = tokio_tungstenite::connect_async(url)
        .await
        .map_err(|e| TransportError::ConnectFailed {
            url: url.to_string(),
            source: std::io::Error::new(std::io::ErrorKind::ConnectionRefused, e),
        })?;
    tracing::info!(url, "WebSocket connected");

    let (write, read) = ws.split();
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(write_loop(write, rx));

    Ok((WebSocketSink { tx }, WebSocketSource { read }))
}

async fn write_loop(
    mut write: SplitSink<WsStream, Message>,
    mut rx: mpsc::UnboundedReceiver<Vec<u8>>,
) {
    while let Some(frame) = rx.recv().await {
        if let Err(e) = write.send(Message::Binary(frame.into())).await {
            tracing::warn!(error = %e, "WebSocket write failed, dropping outbound queue");
            return;
        }
    }
    if let Err(e) = write.close().await {
        tracing::debug!(error = %e, "WebSocket close failed");
    }
}

/// Outbound half of a WebSocket connection.
#[derive(Debug, Clone)]
pub struct WebSocketSink {
    tx: mpsc::UnboundedSender<Vec<u8>>,
}

impl FrameSink for WebSocketSink {
    fn send(&self, frame: Vec<u8>) -> Result<(), TransportError> {
        self.tx
            .send(frame)
            .map_err(|_| TransportError::ConnectionClosed("writer stopped".into()))
    }
}

/// Inbound half of a WebSocket connection.
pub struct WebSocketSource {
    read: SplitStream<WsStream>,
}

impl FrameSource for WebSocketSource {
    async fn recv(&mut self) -> Result<Option<Frame>, TransportError> {
        loop {
            match self.read.next().await {
                Some(Ok(Message::Binary(data))) => {
                    return Ok(Some(Frame::Binary(data.into())));
                }
                Some(Ok(Message::Text(text))) => {
                    return Ok(Some(Frame::Text(text.as_str().to_owned())));
                }
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                Some(Ok(_)) => continue, // skip ping/pong/frame
                Some(Err(e)) => {
                    return Err(TransportError::ReceiveFailed(std::io::Error::new(
                        std::io::ErrorKind::ConnectionReset,
                        e,
                    )));
                }
            }
        }
    }
}
