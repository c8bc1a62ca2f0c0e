//! WebSocket transport backed by tokio-tungstenite.

use super::{Connector, TransportEvent, TransportHandle};
use crate::error::{Error, Result};
use async_trait::async_trait;
use futures::{Sink, SinkExt, Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{protocol::Message as WsMessage, Error as WsError},
};
use tracing::{debug, error, warn};

/// Opens real WebSocket connections. `wss://` URLs use rustls.
#[derive(Debug, Clone, Copy, Default)]
pub struct WsConnector;

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&self, url: &str, buffer_size: usize) -> Result<TransportHandle> {
        let (ws_stream, _) = connect_async(url)
            .await
            .map_err(|e| Error::Connection(format!("Failed to connect to {}: {}", url, e)))?;

        let (write, read) = ws_stream.split();
        let (outbound_tx, outbound_rx) = mpsc::channel(buffer_size);
        let (inbound_tx, inbound_rx) = mpsc::channel(buffer_size);

        spawn_writer_handler(write, outbound_rx);
        spawn_message_handler(read, inbound_tx);

        Ok(TransportHandle {
            outbound: outbound_tx,
            inbound: inbound_rx,
        })
    }
}

/// Forwards text frames from the socket in arrival order.
fn spawn_message_handler<S>(mut read: S, tx: mpsc::Sender<TransportEvent>)
where
    S: Stream<Item = std::result::Result<WsMessage, WsError>> + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let terminal = loop {
            match read.next().await {
                Some(Ok(WsMessage::Text(text))) => {
                    if tx.send(TransportEvent::Frame(text.to_string())).await.is_err() {
                        // Receiver dropped: the manager tore the connection down.
                        return;
                    }
                }
                Some(Ok(WsMessage::Close(frame))) => {
                    warn!(?frame, "server closed the connection");
                    break TransportEvent::Closed;
                }
                Some(Ok(_)) => debug!("skipping non-text frame"),
                Some(Err(e)) => {
                    error!("Error reading message: {}", e);
                    break TransportEvent::Error(e.to_string());
                }
                None => break TransportEvent::Closed,
            }
        };
        let _ = tx.send(terminal).await;
    });
}

/// Writes outbound frames until the sender side is dropped, then closes.
fn spawn_writer_handler<S>(mut write: S, mut rx: mpsc::Receiver<String>)
where
    S: Sink<WsMessage> + Unpin + Send + 'static,
    S::Error: std::fmt::Display + Send,
{
    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if let Err(e) = write.send(WsMessage::Text(frame.into())).await {
                error!("Error sending message: {}", e);
                break;
            }
        }
        let _ = write.close().await;
    });
}
