//! In-process doubles shared by the unit tests.

use crate::channel::{Connector, Inbound, Link};
use crate::error::ChannelError;
use crate::utils::frame::encode_data_url;
use crate::utils::{CaptureDevice, CaptureSource, EncodedFrame};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

/// The far end of a [`FakeConnector`] link.
pub(crate) struct RemoteEnd {
    pub url: String,
    /// Messages the client wrote.
    pub sent: mpsc::Receiver<Message>,
    /// Feed messages (or failures) to the client.
    pub inbound: mpsc::Sender<Inbound>,
}

#[derive(Default)]
pub(crate) struct FakeConnector {
    remotes: Mutex<VecDeque<RemoteEnd>>,
    connects: AtomicUsize,
    refuse: AtomicBool,
}

impl FakeConnector {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn refuse_connections(&self, refuse: bool) {
        self.refuse.store(refuse, Ordering::SeqCst);
    }

    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    /// Oldest connection not yet taken. Panics if there is none.
    pub fn take_remote(&self) -> RemoteEnd {
        self.remotes
            .lock()
            .unwrap()
            .pop_front()
            .expect("no connection was made")
    }
}

#[async_trait]
impl Connector for FakeConnector {
    async fn connect(&self, url: &str) -> Result<Link, ChannelError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if self.refuse.load(Ordering::SeqCst) {
            return Err(ChannelError::Connect(format!("{url}: connection refused")));
        }
        let (out_tx, out_rx) = mpsc::channel(16);
        let (in_tx, in_rx) = mpsc::channel(16);
        self.remotes.lock().unwrap().push_back(RemoteEnd {
            url: url.to_string(),
            sent: out_rx,
            inbound: in_tx,
        });
        Ok(Link {
            outbound: out_tx,
            inbound: in_rx,
        })
    }
}

/// A capture device that cannot be opened, like a camera that is missing.
pub(crate) struct MissingDevice;

impl<P> CaptureDevice<P> for MissingDevice {
    fn open(&mut self) -> anyhow::Result<Box<dyn CaptureSource<P>>> {
        Err(anyhow::anyhow!("device not found"))
    }
}

/// A camera that shows the same picture on every tick.
#[derive(Clone)]
pub(crate) struct StillCamera(EncodedFrame);

impl StillCamera {
    pub fn jpeg(bytes: &[u8]) -> Self {
        Self(encode_data_url("image/jpeg", bytes))
    }
}

impl CaptureSource<EncodedFrame> for StillCamera {
    fn capture(&mut self) -> Option<EncodedFrame> {
        Some(self.0.clone())
    }
}

impl CaptureDevice<EncodedFrame> for StillCamera {
    fn open(&mut self) -> anyhow::Result<Box<dyn CaptureSource<EncodedFrame>>> {
        Ok(Box::new(self.clone()))
    }
}
