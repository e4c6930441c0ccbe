use crate::error::ChannelError;
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::{HeaderName, HeaderValue};
use tokio_tungstenite::tungstenite::Message;

pub type Inbound = Result<Message, ChannelError>;

/// An established duplex connection, seen as a pair of queues.
#[derive(Debug)]
pub struct Link {
    pub outbound: mpsc::Sender<Message>,
    pub inbound: mpsc::Receiver<Inbound>,
}

/// Opens duplex links to analysis endpoints.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, url: &str) -> Result<Link, ChannelError>;
}

/// WebSocket connector backed by `tokio-tungstenite`.
#[derive(Debug, Clone)]
pub struct WsConnector {
    capacity: usize,
    header: Option<(String, String)>,
}

impl WsConnector {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            header: None,
        }
    }

    /// Adds a header to every handshake request.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.header = Some((name.to_string(), value.to_string()));
        self
    }
}

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&self, url: &str) -> Result<Link, ChannelError> {
        let mut request = url
            .into_client_request()
            .map_err(|e| ChannelError::Connect(e.to_string()))?;
        if let Some((name, value)) = &self.header {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ChannelError::Connect(e.to_string()))?;
            let value = HeaderValue::from_str(value).map_err(|e| ChannelError::Connect(e.to_string()))?;
            request.headers_mut().insert(name, value);
        }

        let (ws_stream, _) = tokio_tungstenite::connect_async(request)
            .await
            .map_err(|e| ChannelError::Connect(e.to_string()))?;
        tracing::info!("connected to {}", url);

        let (mut write, mut read) = ws_stream.split();
        let (out_tx, mut out_rx) = mpsc::channel::<Message>(self.capacity);
        let (in_tx, in_rx) = mpsc::channel::<Inbound>(self.capacity);

        // Ends once every outbound sender is gone, closing the socket politely.
        tokio::spawn(async move {
            while let Some(message) = out_rx.recv().await {
                if let Err(e) = write.send(message).await {
                    tracing::error!("failed to send message: {}", e);
                    break;
                }
            }
            if let Err(e) = write.close().await {
                tracing::debug!("failed to close stream: {}", e);
            }
        });

        tokio::spawn(async move {
            while let Some(message) = read.next().await {
                let message = message.map_err(|e| ChannelError::Transport(e.to_string()));
                let fatal = message.is_err();
                if in_tx.send(message).await.is_err() || fatal {
                    break;
                }
            }
        });

        Ok(Link {
            outbound: out_tx,
            inbound: in_rx,
        })
    }
}
